//! Field-keyed input validation.
//!
//! A [`Validator`] collects one message per field. Checks are independent:
//! a failing check never stops later checks from running, and the first
//! message recorded for a field is the one that is kept.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    pub errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `key` unless the key already has one.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, key: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// Check that every value appears in `permitted`.
///
/// Comparison is exact string equality on the whole token. Returns the first
/// value that is not permitted.
pub fn permitted_values<'a, S, P>(values: &'a [S], permitted: &[P]) -> Result<(), &'a str>
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    for value in values {
        let value = value.as_ref();
        if !permitted.iter().any(|p| p.as_ref() == value) {
            return Err(value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_is_valid() {
        assert!(Validator::new().valid());
    }

    #[test]
    fn test_first_error_per_key_wins() {
        let mut v = Validator::new();
        v.add_error("page_size", "must be greater than zero");
        v.add_error("page_size", "must be a maximum of 50,000");
        assert!(!v.valid());
        assert_eq!(v.errors["page_size"], "must be greater than zero");
    }

    #[test]
    fn test_checks_are_independent() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(true, "id", "never recorded");
        v.check(false, "page_size", "must be greater than zero");
        assert_eq!(v.errors.len(), 2);
        assert!(!v.errors.contains_key("id"));
    }

    #[test]
    fn test_permitted_values_accepts_subset() {
        let safe = ["id", "-id", "title", "-title"];
        assert_eq!(permitted_values(&["-id", "title"], &safe), Ok(()));
        assert_eq!(permitted_values::<&str, _>(&[], &safe), Ok(()));
    }

    #[test]
    fn test_permitted_values_returns_first_offender() {
        let safe = ["id", "-id"];
        let requested = vec!["id".to_string(), "-name".to_string(), "x".to_string()];
        assert_eq!(permitted_values(&requested, &safe), Err("-name"));
    }

    #[test]
    fn test_permitted_values_is_exact_match() {
        let safe = ["id", "-id"];
        assert_eq!(permitted_values(&["ID"], &safe), Err("ID"));
        assert_eq!(permitted_values(&["i"], &safe), Err("i"));
        assert_eq!(permitted_values(&["--id"], &safe), Err("--id"));
        assert_eq!(permitted_values(&["id; DROP TABLE posts"], &safe), Err("id; DROP TABLE posts"));
    }
}
