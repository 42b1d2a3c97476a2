//! Slug generation and validation utilities.
//!
//! Generated slugs are short random strings over an alphabet without
//! look-alike characters (`0`/`O`, `1`/`l`/`I`). Client-supplied slugs are
//! validated against a conservative character set so they are always safe
//! as a single path segment.

use rand::Rng;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

/// Alphabet for generated slugs.
pub const SLUG_ALPHABET: &[u8] = b"23456789abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of a generated slug.
pub const GENERATED_SLUG_LENGTH: usize = 6;

/// Number of generate-and-insert attempts before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

pub const MIN_SLUG_LENGTH: usize = 3;
pub const MAX_SLUG_LENGTH: usize = 64;

/// Letters, digits, `-` and `_`, starting and ending with a letter or digit.
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9_-]*[A-Za-z0-9])?$").unwrap());

/// Generates a random slug of [`GENERATED_SLUG_LENGTH`] characters.
///
/// Uniqueness is not checked here; the store enforces it on insert and
/// the caller retries with a fresh slug on collision.
pub fn generate_slug() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_SLUG_LENGTH)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Validates a client-supplied slug.
///
/// # Rules
///
/// - Length: 3-64 characters
/// - Allowed characters: ASCII letters, digits, `-`, `_`
/// - Must start and end with a letter or digit
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() < MIN_SLUG_LENGTH || slug.len() > MAX_SLUG_LENGTH {
        return Err(AppError::bad_request(
            format!("Slug must be {MIN_SLUG_LENGTH}-{MAX_SLUG_LENGTH} characters"),
            json!({ "provided_length": slug.len() }),
        ));
    }

    if !SLUG_REGEX.is_match(slug) {
        return Err(AppError::bad_request(
            "Slug can only contain letters, digits, hyphens and underscores, and must start and end with a letter or digit",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_has_correct_length() {
        assert_eq!(generate_slug().len(), GENERATED_SLUG_LENGTH);
    }

    #[test]
    fn test_generate_slug_uses_alphabet() {
        for _ in 0..100 {
            let slug = generate_slug();
            assert!(slug.bytes().all(|b| SLUG_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generate_slug_avoids_ambiguous_characters() {
        for _ in 0..100 {
            let slug = generate_slug();
            assert!(!slug.contains(['0', 'O', '1', 'l', 'I']));
        }
    }

    #[test]
    fn test_generated_slugs_pass_validation() {
        for _ in 0..100 {
            assert!(validate_custom_slug(&generate_slug()).is_ok());
        }
    }

    #[test]
    fn test_generate_slug_mostly_unique() {
        // 55^6 possible slugs; a handful of collisions in 1000 would point at a broken RNG.
        let slugs: HashSet<String> = (0..1000).map(|_| generate_slug()).collect();
        assert!(slugs.len() > 990);
    }

    #[test]
    fn test_validate_simple() {
        assert!(validate_custom_slug("abc").is_ok());
        assert!(validate_custom_slug("My_Link-2026").is_ok());
        assert!(validate_custom_slug("test-slug").is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_custom_slug("ab").unwrap_err();
        assert!(err.to_string().contains("3-64 characters"));
    }

    #[test]
    fn test_validate_too_long() {
        assert!(validate_custom_slug(&"a".repeat(65)).is_err());
        assert!(validate_custom_slug(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_rejects_special_characters() {
        assert!(validate_custom_slug("my slug").is_err());
        assert!(validate_custom_slug("my/slug").is_err());
        assert!(validate_custom_slug("my%20slug").is_err());
        assert!(validate_custom_slug("sl?ug").is_err());
    }

    #[test]
    fn test_validate_rejects_leading_or_trailing_separator() {
        assert!(validate_custom_slug("-slug").is_err());
        assert!(validate_custom_slug("slug-").is_err());
        assert!(validate_custom_slug("_slug").is_err());
        assert!(validate_custom_slug("slug_").is_err());
    }

    #[test]
    fn test_validate_empty_string() {
        assert!(validate_custom_slug("").is_err());
    }
}
