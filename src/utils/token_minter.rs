//! Redirect token minting.
//!
//! Tokens are short, URL-safe and drawn from a 64-symbol alphabet. Minting is
//! pure and infallible; global uniqueness is enforced by the store's unique
//! constraint, and callers re-mint on collision.

use std::sync::LazyLock;

use base64::Engine as _;
use rand::Rng;
use regex::Regex;

/// Number of random bytes per token before base64 encoding.
const TOKEN_BYTES: usize = 9;

/// Length of every minted token (9 bytes -> 12 base64 characters, 72 bits).
pub const TOKEN_LENGTH: usize = 12;

/// Shape accepted on the public redirect surface.
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Source of fresh redirect tokens.
///
/// A trait so that collision handling can be exercised deterministically in tests.
#[cfg_attr(test, mockall::automock)]
pub trait TokenMinter: Send + Sync {
    /// Produces a new token. Never fails.
    fn mint(&self) -> String;
}

/// Production minter backed by the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenMinter;

impl TokenMinter for RandomTokenMinter {
    fn mint(&self) -> String {
        let mut buffer = [0u8; TOKEN_BYTES];
        rand::rng().fill(&mut buffer);

        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
    }
}

/// Returns true if `token` could have been minted by this service.
///
/// Used to reject garbage on the redirect path without touching the store.
pub fn is_well_formed_token(token: &str) -> bool {
    TOKEN_REGEX.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mint_has_fixed_length() {
        let token = RandomTokenMinter.mint();
        assert_eq!(token.len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_mint_url_safe_characters() {
        let token = RandomTokenMinter.mint();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_mint_no_padding() {
        assert!(!RandomTokenMinter.mint().contains('='));
    }

    #[test]
    fn test_mint_produces_unique_tokens() {
        let tokens: HashSet<String> = (0..1000).map(|_| RandomTokenMinter.mint()).collect();

        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_minted_tokens_are_well_formed() {
        for _ in 0..100 {
            assert!(is_well_formed_token(&RandomTokenMinter.mint()));
        }
    }

    #[test]
    fn test_well_formed_rejects_empty() {
        assert!(!is_well_formed_token(""));
    }

    #[test]
    fn test_well_formed_rejects_path_characters() {
        assert!(!is_well_formed_token("../etc"));
        assert!(!is_well_formed_token("abc def"));
        assert!(!is_well_formed_token("abc%20"));
    }

    #[test]
    fn test_well_formed_rejects_overlong() {
        assert!(!is_well_formed_token(&"a".repeat(65)));
        assert!(is_well_formed_token(&"a".repeat(64)));
    }

    #[test]
    fn test_well_formed_accepts_legacy_hex() {
        assert!(is_well_formed_token("3f2a9c1b"));
    }
}
