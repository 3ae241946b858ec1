//! Access-controlled catalog listing.
//!
//! A record is visible to a user when the user owns it or holds a grant on it.
//! A listing costs exactly two statements whatever the page size or grant fan-out:
//!
//! 1. the number of visible records;
//! 2. the page window of visible records, left-joined to their grants, as one flat
//!    row stream ordered by record and then by grantee name.
//!
//! The flat stream is folded back into records in a single pass ([`group_rows`]).
//! Both statements run in one read-only `REPEATABLE READ` transaction, so the count
//! and the page come from the same snapshot.

use deadpool_postgres::{Pool, Transaction};
use tokio_postgres::{IsolationLevel, Row};

use crate::{
    error::{AppError, Result},
    models::record::{Grantee, Record, RecordPage},
};

/// Order of a catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Owner display name descending, then record ID ascending. `order_by=user`.
    #[default]
    OwnerThenRecency,
    /// Record ID ascending. `order_by=track`.
    RecordOrder,
}

impl SortKey {
    /// Parses the `order_by` request parameter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(SortKey::OwnerThenRecency),
            "track" => Some(SortKey::RecordOrder),
            _ => None,
        }
    }

    /// ORDER BY used to pick the page window of visible records.
    fn window_order(self) -> &'static str {
        match self {
            SortKey::OwnerThenRecency => "owner_name DESC, r.id ASC",
            SortKey::RecordOrder => "r.id ASC",
        }
    }

    /// ORDER BY of the joined stream. Same record order as the window, with the
    /// grant rows ordered inside each record.
    fn stream_order(self) -> &'static str {
        match self {
            SortKey::OwnerThenRecency => "v.owner_name DESC, v.id ASC, grantee_name ASC, grantee_id ASC",
            SortKey::RecordOrder => "v.id ASC, grantee_name ASC, grantee_id ASC",
        }
    }
}

/// A page window. `limit` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

/// What a listing found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Nothing is visible to the requester.
    Empty,
    /// Records are visible, but none fall inside the window.
    OutOfRange { total_count: i64 },
    /// A non-empty page.
    Page(RecordPage),
}

/// One row of the joined stream: a record, plus at most one of its grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRow {
    pub record_id: i32,
    pub name: String,
    pub is_owner: bool,
    pub owner_id: i32,
    pub owner_name: String,
    /// `None` when the record has no grants at all (NULL side of the left join).
    pub grantee: Option<Grantee>,
}

impl ShareRow {
    fn from_row(row: &Row) -> Result<Self> {
        let grantee_id: Option<i32> = row.try_get("grantee_id")?;
        let grantee_name: Option<String> = row.try_get("grantee_name")?;

        Ok(Self {
            record_id: row.try_get("id")?,
            name: row.try_get("name")?,
            is_owner: row.try_get("is_owner")?,
            owner_id: row.try_get("owner_id")?,
            owner_name: row.try_get("owner_name")?,
            grantee: match (grantee_id, grantee_name) {
                (Some(id), Some(name)) => Some(Grantee { id, name }),
                _ => None,
            },
        })
    }

    fn into_record(self) -> (Record, Option<Grantee>) {
        let record = Record {
            id: self.record_id,
            name: self.name,
            is_owner: self.is_owner,
            owner_id: self.owner_id,
            owner_name: self.owner_name,
            shared_to: Vec::new(),
        };
        (record, self.grantee)
    }
}

/// Folds a record-ordered row stream into records with their full grant lists.
///
/// Rows of one record must be contiguous, which the stream order guarantees. A new
/// record starts whenever the record ID changes; non-NULL grant columns are appended
/// to the current record. Linear in the number of rows.
pub fn group_rows<I>(rows: I) -> Vec<Record>
where
    I: IntoIterator<Item = ShareRow>,
{
    rows.into_iter().fold(Vec::new(), |mut records: Vec<Record>, row| {
        let (record, grantee) = row.into_record();

        match records.last_mut() {
            Some(current) if current.id == record.id => {}
            _ => records.push(record),
        }

        if let (Some(current), Some(grantee)) = (records.last_mut(), grantee) {
            current.shared_to.push(grantee);
        }

        records
    })
}

const COUNT_VISIBLE: &str = r#"
    SELECT count(*)
    FROM records r
    WHERE r.owner_id = $1
       OR EXISTS (SELECT 1 FROM grants g WHERE g.record_id = r.id AND g.user_id = $1)
"#;

/// Builds the page statement for `sort`. Only the two static ORDER BY clauses of
/// [`SortKey`] are ever interpolated.
fn page_query(sort: SortKey) -> String {
    format!(
        r#"
        WITH visible AS (
            SELECT r.id,
                   concat(r.description, ' (', r.duration, ')') AS name,
                   r.owner_id,
                   COALESCE(NULLIF(o.name, ''), o.login) AS owner_name
            FROM records r
            INNER JOIN users o ON o.id = r.owner_id
            WHERE r.owner_id = $1
               OR EXISTS (SELECT 1 FROM grants g WHERE g.record_id = r.id AND g.user_id = $1)
            ORDER BY {window}
            OFFSET $2 LIMIT $3
        )
        SELECT v.id, v.name, v.owner_id = $1 AS is_owner, v.owner_id, v.owner_name,
               u.id AS grantee_id,
               COALESCE(NULLIF(u.name, ''), u.login) AS grantee_name
        FROM visible v
        LEFT JOIN grants g ON g.record_id = v.id
        LEFT JOIN users u ON u.id = g.user_id
        ORDER BY {stream}
        "#,
        window = sort.window_order(),
        stream = sort.stream_order(),
    )
}

async fn count_visible_in(tx: &Transaction<'_>, requester: i32) -> Result<i64> {
    let stmt = tx.prepare_cached(COUNT_VISIBLE).await?;
    let row = tx.query_one(&stmt, &[&requester]).await?;
    Ok(row.try_get(0)?)
}

/// Lists the records visible to `requester` in `sort` order within `window`,
/// each with every user it is shared to.
pub async fn list(pool: &Pool, requester: i32, sort: SortKey, window: Window) -> Result<Listing> {
    if window.limit <= 0 || window.offset < 0 {
        return Err(AppError::Validation("Invalid page window".to_string()));
    }

    let mut client = pool.get().await?;
    let tx = client
        .build_transaction()
        .isolation_level(IsolationLevel::RepeatableRead)
        .read_only(true)
        .start()
        .await?;

    let total_count = count_visible_in(&tx, requester).await?;
    if total_count == 0 {
        tx.commit().await?;
        tracing::debug!("📂 Nothing visible to user {}", requester);
        return Ok(Listing::Empty);
    }

    let stmt = tx.prepare_cached(&page_query(sort)).await?;
    let rows = tx
        .query(&stmt, &[&requester, &window.offset, &window.limit])
        .await?;
    tx.commit().await?;

    let share_rows = rows
        .iter()
        .map(ShareRow::from_row)
        .collect::<Result<Vec<_>>>()?;
    let records = group_rows(share_rows);

    tracing::debug!(
        "📂 User {} - {} visible, {} on page (offset {}, limit {}, {} rows)",
        requester,
        total_count,
        records.len(),
        window.offset,
        window.limit,
        rows.len()
    );

    if records.is_empty() {
        return Ok(Listing::OutOfRange { total_count });
    }

    Ok(Listing::Page(RecordPage {
        total_count,
        records,
    }))
}
