use deadpool_postgres::Pool;
use crate::{
    error::{classify_db_error, AppError, Result},
    models::{
        record::{FileRef, NewRecord},
        user::SharingUser,
    },
};

/// Creates a new record in the database.
///
/// # Arguments
///
/// * `pool` - The database connection pool.
/// * `record` - The record to insert. A missing duration is stored as zero.
///
/// # Returns
///
/// A `Result` containing the new record's ID. An unparsable duration is a
/// `Validation` error.
pub async fn create_record(pool: &Pool, record: &NewRecord) -> Result<i32> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            INSERT INTO records (
                owner_id, file_handle, description, duration,
                mime_type, checksum, size_bytes
            )
            VALUES ($1, $2, $3, COALESCE(CAST($4::text AS interval), INTERVAL '0'), $5, $6, $7)
            RETURNING id
            "#,
        )
        .await?;
    let row = client
        .query_one(
            &stmt,
            &[
                &record.owner_id,
                &record.file_handle,
                &record.description,
                &record.duration,
                &record.mime_type,
                &record.checksum,
                &record.size_bytes,
            ],
        )
        .await
        .map_err(|e| classify_db_error(e, "Record already exists", "Owner does not exist"))?;

    let id: i32 = row.try_get("id")?;
    tracing::info!("✅ Record {} created for owner {}", id, record.owner_id);
    Ok(id)
}

/// Resolves the content pointer of `record_id` for `requester`.
///
/// The visibility predicate (owner or grantee) is evaluated in the query itself.
/// A record that does not exist and a record the requester cannot see are both
/// reported as `AccessDenied`.
pub async fn resolve_for_read(pool: &Pool, record_id: i32, requester: i32) -> Result<FileRef> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT r.description, r.file_handle, r.mime_type, r.checksum, r.size_bytes
            FROM records r
            WHERE r.id = $1
              AND (r.owner_id = $2
                   OR EXISTS (SELECT 1 FROM grants g
                              WHERE g.record_id = r.id AND g.user_id = $2))
            "#,
        )
        .await?;
    let row = client
        .query_opt(&stmt, &[&record_id, &requester])
        .await?
        .ok_or(AppError::AccessDenied)?;

    Ok(FileRef {
        description: row.try_get("description")?,
        file_handle: row.try_get("file_handle")?,
        mime_type: row.try_get("mime_type")?,
        checksum: row.try_get("checksum")?,
        size_bytes: row.try_get("size_bytes")?,
    })
}

/// Counts owners that have at least one record shared to someone.
pub async fn count_sharing_users(pool: &Pool) -> Result<i64> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT count(DISTINCT r.owner_id)
            FROM records r
            WHERE EXISTS (SELECT 1 FROM grants g WHERE g.record_id = r.id)
            "#,
        )
        .await?;
    let row = client.query_one(&stmt, &[]).await?;
    Ok(row.try_get(0)?)
}

/// Lists owners that share records, with the number of records each one shares.
pub async fn list_sharing_users(pool: &Pool, offset: i64, limit: i64) -> Result<Vec<SharingUser>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT r.owner_id AS id,
                   COALESCE(NULLIF(u.name, ''), u.login) AS name,
                   count(r.id) AS shared_records
            FROM records r
            INNER JOIN users u ON u.id = r.owner_id
            WHERE EXISTS (SELECT 1 FROM grants g WHERE g.record_id = r.id)
            GROUP BY r.owner_id, COALESCE(NULLIF(u.name, ''), u.login)
            ORDER BY r.owner_id
            OFFSET $1 LIMIT $2
            "#,
        )
        .await?;
    let rows = client.query(&stmt, &[&offset, &limit]).await?;

    rows.iter()
        .map(|row| {
            Ok(SharingUser {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                shared_records: row.try_get("shared_records")?,
            })
        })
        .collect()
}
