use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

const NICKNAME_MIN: usize = 3;
const NICKNAME_MAX: usize = 16;
const CHARACTER_ID_MAX: usize = 32;

fn is_valid_nickname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-'
}

fn is_valid_character_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Normalizes a client-supplied nickname: trims whitespace, and accepts it
/// verbatim if it is 3-16 characters of `[A-Za-z0-9 _-]`. Anything else
/// (missing, too short/long, disallowed characters) falls back to a
/// `Player####` name deterministically derived from `connection_id`, so the
/// same connection always gets the same fallback.
#[must_use]
pub fn normalize_nickname(raw: Option<&str>, connection_id: &str) -> String {
    if let Some(raw) = raw {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if (NICKNAME_MIN..=NICKNAME_MAX).contains(&len) && trimmed.chars().all(is_valid_nickname_char)
        {
            return trimmed.to_owned();
        }
    }
    fallback_nickname(connection_id)
}

#[must_use]
fn fallback_nickname(connection_id: &str) -> String {
    let mut hasher = FxHasher::default();
    connection_id.hash(&mut hasher);
    let digits = hasher.finish() % 10_000;
    format!("Player{digits:04}")
}

/// Normalizes a client-supplied character id: trims, accepts it if it is
/// non-empty, at most 32 characters of `[A-Za-z0-9_-]`, and present in
/// `allowlist`; otherwise falls back to `"default"`.
#[must_use]
pub fn normalize_character_id(raw: Option<&str>, allowlist: &[String]) -> String {
    if let Some(raw) = raw {
        let trimmed = raw.trim();
        if !trimmed.is_empty()
            && trimmed.chars().count() <= CHARACTER_ID_MAX
            && trimmed.chars().all(is_valid_character_id_char)
            && allowlist.iter().any(|allowed| allowed == trimmed)
        {
            return trimmed.to_owned();
        }
    }
    "default".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_valid_nickname() {
        assert_eq!(normalize_nickname(Some("Nick_01"), "conn"), "Nick_01");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_nickname(Some("  Nick  "), "conn"), "Nick");
    }

    #[test]
    fn falls_back_when_too_short() {
        let fallback = normalize_nickname(Some("ab"), "conn-1");
        assert!(fallback.starts_with("Player"));
    }

    #[test]
    fn falls_back_when_missing() {
        let fallback = normalize_nickname(None, "conn-1");
        assert!(fallback.starts_with("Player"));
    }

    #[test]
    fn fallback_is_deterministic_per_connection() {
        assert_eq!(
            normalize_nickname(None, "conn-1"),
            normalize_nickname(None, "conn-1")
        );
    }

    #[test]
    fn rejects_disallowed_characters() {
        let fallback = normalize_nickname(Some("bad!name"), "conn-2");
        assert!(fallback.starts_with("Player"));
    }

    #[test]
    fn character_id_must_be_in_allowlist() {
        let allowlist = vec!["ranger".to_owned(), "tank".to_owned()];
        assert_eq!(normalize_character_id(Some("ranger"), &allowlist), "ranger");
        assert_eq!(normalize_character_id(Some("wizard"), &allowlist), "default");
        assert_eq!(normalize_character_id(None, &allowlist), "default");
    }
}
