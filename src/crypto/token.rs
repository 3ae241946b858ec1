use rand::RngCore;
use rand::rngs::OsRng;

/// The size of the session token in bytes. Hex encoding doubles it to 32 characters.
const SESSION_TOKEN_SIZE: usize = 16;

/// Generates a new random session token.
///
/// # Returns
///
/// A lowercase hex string of 32 characters.
pub fn generate_session_token() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    hex::encode(token)
}

/// Whether `value` has the shape of a session token. Cheap pre-check before hitting the store.
pub fn is_well_formed(value: &str) -> bool {
    value.len() == SESSION_TOKEN_SIZE * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_32_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), 32);
        assert!(is_well_formed(&token));
    }

    #[test]
    fn tokens_do_not_repeat() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("3d73274ac8b18ab09528075c7fee121"));
        assert!(!is_well_formed("3d73274ac8b18ab09528075c7fee1213' OR '1'='1"));
        assert!(!is_well_formed("zz73274ac8b18ab09528075c7fee1213"));
    }
}
