// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Session token generation.
//!
//! Tokens are opaque handles handed to browsers in the session cookie. They
//! carry no data; their only property is that nobody can guess one.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/** Generate a session token
Draws from the thread-local CSPRNG (ChaCha, seeded from the OS).
# Returns
A base64 URL-safe encoded string without padding, safe to place in a cookie
value as-is */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a token with the given number of random bytes
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_generation() {
        let token1 = generate_secure_token();
        let token2 = generate_secure_token();

        assert_ne!(token1, token2);

        // 32 bytes in unpadded base64 is 43 chars
        assert_eq!(token1.len(), 43);

        let small_token = generate_secure_token_with_size(16);
        let large_token = generate_secure_token_with_size(64);

        assert!(small_token.len() < token1.len());
        assert!(large_token.len() > token1.len());
    }

    #[test]
    fn test_token_is_cookie_safe() {
        for _ in 0..64 {
            let token = generate_secure_token();
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_no_collisions_in_batch() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_secure_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
