use deadpool_postgres::Pool;
use tokio_postgres::Row;
use crate::{
    error::{classify_db_error, Result},
    models::user::{User, UserListItem},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        login: row.try_get("login")?,
        name: row.try_get("name")?,
        password: row.try_get("password")?,
    })
}

/// Creates a new user in the database.
///
/// A taken login surfaces as `AppError::Conflict`.
pub async fn create_user(
    pool: &Pool,
    login: &str,
    name: &str,
    password_hash: &str,
) -> Result<User> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            INSERT INTO users (login, name, password)
            VALUES ($1, $2, $3)
            RETURNING id, login, name, password
            "#,
        )
        .await?;
    let row = client
        .query_one(&stmt, &[&login, &name, &password_hash])
        .await
        .map_err(|e| classify_db_error(e, "Login already used", "Invalid user data"))?;
    row_to_user(&row)
}

/// Finds a user by their login.
pub async fn find_by_login(pool: &Pool, login: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, login, name, password
            FROM users
            WHERE login = $1
            "#,
        )
        .await?;
    let row = client.query_opt(&stmt, &[&login]).await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Lists registered users ordered by ID.
pub async fn list_users(pool: &Pool, offset: i64, limit: i64) -> Result<Vec<UserListItem>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, login, COALESCE(NULLIF(name, ''), login) AS name
            FROM users
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .await?;
    let rows = client.query(&stmt, &[&offset, &limit]).await?;

    rows.iter()
        .map(|row| {
            Ok(UserListItem {
                id: row.try_get("id")?,
                login: row.try_get("login")?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}
