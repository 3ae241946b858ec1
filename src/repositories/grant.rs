use deadpool_postgres::Pool;
use crate::error::{classify_db_error, AppError, Result};

/// Shares `record_id` with `grantee`.
///
/// A grantee that does not exist is a `Validation` error (foreign key), an
/// already existing grant is a `Conflict` (composite primary key).
pub async fn grant(pool: &Pool, record_id: i32, grantee: i32) -> Result<()> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("INSERT INTO grants (record_id, user_id) VALUES ($1, $2)")
        .await?;
    client
        .execute(&stmt, &[&record_id, &grantee])
        .await
        .map_err(|e| classify_db_error(e, "Track already shared to this user", "User does not exist"))?;

    tracing::info!("🔓 Record {} shared to user {}", record_id, grantee);
    Ok(())
}

/// Removes the grant of `record_id` to `grantee`.
///
/// # Returns
///
/// The number of rows removed; zero means there was nothing to revoke.
pub async fn revoke(pool: &Pool, record_id: i32, grantee: i32) -> Result<u64> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("DELETE FROM grants WHERE record_id = $1 AND user_id = $2")
        .await?;
    let removed = client.execute(&stmt, &[&record_id, &grantee]).await?;

    tracing::info!("🔒 Record {} revoked from user {} ({} rows)", record_id, grantee, removed);
    Ok(removed)
}

/// Whether `user_id` owns `record_id`. A missing record is `NotFound`.
pub async fn is_owner(pool: &Pool, record_id: i32, user_id: i32) -> Result<bool> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("SELECT owner_id = $2 AS is_owner FROM records WHERE id = $1")
        .await?;
    let row = client
        .query_opt(&stmt, &[&record_id, &user_id])
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(row.try_get("is_owner")?)
}

/// Whether `grantee` currently holds a grant on `record_id`.
pub async fn exists(pool: &Pool, record_id: i32, grantee: i32) -> Result<bool> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "SELECT EXISTS (SELECT 1 FROM grants WHERE record_id = $1 AND user_id = $2)",
        )
        .await?;
    let row = client.query_one(&stmt, &[&record_id, &grantee]).await?;
    Ok(row.try_get(0)?)
}
