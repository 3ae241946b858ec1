//! Session storage: one live token per user.
//!
//! Replacement is a single `INSERT .. ON CONFLICT (user_id) DO UPDATE`, so a new
//! login never leaves the previous token behind and needs no read-then-write.

use deadpool_postgres::Pool;
use crate::{
    crypto::token::generate_session_token,
    error::Result,
};

/// Creates a session for `user_id`, replacing any token the user already had.
///
/// # Returns
///
/// The new token.
pub async fn create(pool: &Pool, user_id: i32) -> Result<String> {
    let token = generate_session_token();
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            INSERT INTO sessions (user_id, token)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token, created_at = NOW()
            "#,
        )
        .await?;
    client.execute(&stmt, &[&user_id, &token]).await?;

    tracing::debug!("🔑 Session stored for user {}", user_id);
    Ok(token)
}

/// Resolves a token to the user it belongs to.
pub async fn resolve(pool: &Pool, token: &str) -> Result<Option<i32>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("SELECT user_id FROM sessions WHERE token = $1")
        .await?;
    let row = client.query_opt(&stmt, &[&token]).await?;
    Ok(row.map(|r| r.try_get("user_id")).transpose()?)
}

/// Destroys the session of `user_id`, if any.
pub async fn destroy(pool: &Pool, user_id: i32) -> Result<()> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("DELETE FROM sessions WHERE user_id = $1")
        .await?;
    client.execute(&stmt, &[&user_id]).await?;
    Ok(())
}
