//! Request parameter parsing shared by the listing and grant endpoints.

use crate::error::{AppError, Result};
use crate::services::visibility::{SortKey, Window};

/// Page size used when `on_page` is absent or unusable.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound for `on_page`.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Normalizes the 1-based `page_no` and `on_page` parameters into a window.
///
/// A missing, unparsable or non-positive page number means the first page. A
/// missing, unparsable or non-positive page size means [`DEFAULT_PAGE_SIZE`].
pub fn page_window(page_no: Option<&str>, on_page: Option<&str>) -> Window {
    let page = page_no
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);

    let limit = on_page
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_PAGE_SIZE))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    Window {
        offset: (page - 1).saturating_mul(limit),
        limit,
    }
}

/// Parses `order_by`; absent means [`SortKey::OwnerThenRecency`].
pub fn sort_key(order_by: Option<&str>) -> Result<SortKey> {
    match order_by {
        None => Ok(SortKey::default()),
        Some(value) => SortKey::parse(value)
            .ok_or_else(|| AppError::Validation("bad parameter order_by".to_string())),
    }
}

/// Parses a required integer ID parameter such as `track` or `user`. Surrounding
/// whitespace is ignored, as in [`page_window`].
pub fn required_id(value: Option<&str>, field: &str) -> Result<i32> {
    let value = value.ok_or_else(|| AppError::Validation(format!("{} required", field)))?;

    value
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("invalid {} value", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        assert_eq!(page_window(None, None), Window { offset: 0, limit: 10 });
    }

    #[test]
    fn bad_page_numbers_mean_first_page() {
        for page in ["-1", "abc", "0", ""] {
            assert_eq!(page_window(Some(page), Some("5")).offset, 0, "page_no={}", page);
        }
    }

    #[test]
    fn bad_page_sizes_mean_ten() {
        for size in ["-5", "abc", "0", "1.5"] {
            assert_eq!(page_window(None, Some(size)).limit, 10, "on_page={}", size);
        }
    }

    #[test]
    fn page_numbers_are_one_based() {
        assert_eq!(page_window(Some("1"), Some("2")), Window { offset: 0, limit: 2 });
        assert_eq!(page_window(Some("3"), Some("2")), Window { offset: 4, limit: 2 });
    }

    #[test]
    fn huge_values_do_not_overflow() {
        let window = page_window(Some(&i64::MAX.to_string()), Some("999999"));
        assert_eq!(window.limit, MAX_PAGE_SIZE);
        assert_eq!(window.offset, i64::MAX);
    }

    #[test]
    fn order_by_values() {
        assert_eq!(sort_key(None).unwrap(), SortKey::OwnerThenRecency);
        assert_eq!(sort_key(Some("user")).unwrap(), SortKey::OwnerThenRecency);
        assert_eq!(sort_key(Some("track")).unwrap(), SortKey::RecordOrder);
        assert!(matches!(sort_key(Some("wrong")), Err(AppError::Validation(_))));
    }

    #[test]
    fn ids_are_required_integers() {
        assert_eq!(required_id(Some("42"), "track").unwrap(), 42);
        assert_eq!(required_id(Some(" 42 "), "track").unwrap(), 42);

        match required_id(None, "track") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "track required"),
            other => panic!("unexpected {:?}", other),
        }
        match required_id(Some("1 or true"), "track") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "invalid track value"),
            other => panic!("unexpected {:?}", other),
        }
        match required_id(Some("  "), "user") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "invalid user value"),
            other => panic!("unexpected {:?}", other),
        }
        match required_id(Some("bad"), "user") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "invalid user value"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
