use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::{session as session_repo, user as user_repo};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use deadpool_postgres::Pool;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

fn argon2() -> Result<Argon2<'static>> {
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    ))
}

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-encoded hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let password_hash = argon2()?
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a PHC-encoded hash.
///
/// # Returns
///
/// A `Result` containing `true` if the password matches.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Registers a new user. The login must be free.
pub async fn register(pool: &Pool, login: &str, password: &str, name: &str) -> Result<User> {
    tracing::debug!("🔐 Registering user: {}", login);

    let password = password.to_string();
    let hashed_password = tokio::task::spawn_blocking(move || {
        let mut password = password;
        let hashed = hash_password(&password);
        password.zeroize();
        hashed
    })
    .await
    .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

    let user = user_repo::create_user(pool, login, name, &hashed_password).await?;

    tracing::info!("✅ User {} registered as {} ({})", user.id, user.login, user.display_name());
    Ok(user)
}

/// Checks the credentials and opens a session, replacing any previous one.
///
/// # Returns
///
/// The user and the new session token.
pub async fn login(pool: &Pool, login: &str, password: &str) -> Result<(User, String)> {
    tracing::debug!("🔐 Authenticating user: {}", login);

    let user = user_repo::find_by_login(pool, login)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("wrong login or password".to_string()))?;

    let password = password.to_string();
    let hash = user.password.clone();
    let valid = tokio::task::spawn_blocking(move || {
        let mut password = password;
        let valid = verify_password(&password, &hash);
        password.zeroize();
        valid
    })
    .await
    .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))??;

    if !valid {
        return Err(AppError::Unauthenticated(
            "wrong login or password".to_string(),
        ));
    }

    let token = session_repo::create(pool, user.id).await?;

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hash = hash_password("SecurePass123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("SecurePass123", &hash).unwrap());
        assert!(!verify_password("WrongPass123", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("SecurePass123").unwrap();
        let b = hash_password("SecurePass123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("SecurePass123", "not-a-phc-string").is_err());
    }
}
