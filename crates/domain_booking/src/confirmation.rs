//! Confirmation codes
//!
//! A confirmation code is the short, human-legible identifier handed to
//! the customer, independent of internal database identifiers. Format:
//!
//! ```text
//! {PREFIX}-{YYYYMMDD}-{SUFFIX}
//! ```
//!
//! The date component is the *flight* date, so the code read aloud at
//! the launch field is self-describing on the day's manifest. The suffix
//! is six symbols drawn uniformly from a 32-symbol alphabet with the
//! visually confusable characters (0/O, 1/I) removed, giving a 32^6
//! (~2^30) space per day. Collision handling is the caller's
//! responsibility: the ledger retries against the store's unique index.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unambiguous code alphabet: A-Z without I and O, digits 2-9
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 6;

/// Errors from parsing a confirmation code
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Confirmation code has a malformed shape: {0}")]
    MalformedShape(String),

    #[error("Confirmation code contains a character outside the code alphabet")]
    ForbiddenCharacter,
}

/// A validated confirmation code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfirmationCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (prefix, date, suffix) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(p), Some(d), Some(x), None) => (p, d, x),
            _ => return Err(CodeError::MalformedShape(s.to_string())),
        };

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CodeError::MalformedShape(s.to_string()));
        }
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeError::MalformedShape(s.to_string()));
        }
        if suffix.len() != SUFFIX_LEN {
            return Err(CodeError::MalformedShape(s.to_string()));
        }
        if !suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(CodeError::ForbiddenCharacter);
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ConfirmationCode {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConfirmationCode> for String {
    fn from(code: ConfirmationCode) -> String {
        code.0
    }
}

/// Generates confirmation codes for a fixed brand prefix
///
/// Pure aside from consuming entropy; uniqueness is enforced by the
/// store's unique index, not here.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prefix: String,
}

impl CodeGenerator {
    /// Creates a generator with the given brand prefix (uppercased)
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_ascii_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generates a code for the given flight date
    pub fn generate<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> ConfirmationCode {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();

        ConfirmationCode(format!(
            "{}-{}-{}",
            self.prefix,
            date.format("%Y%m%d"),
            suffix
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn flight_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    #[test]
    fn test_generated_code_matches_format() {
        let generator = CodeGenerator::new("VUE");
        let code = generator.generate(flight_date(), &mut rand::thread_rng());

        let parts: Vec<&str> = code.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "VUE");
        assert_eq!(parts[1], "20260912");
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn test_suffix_stays_inside_alphabet() {
        let generator = CodeGenerator::new("VUE");
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let code = generator.generate(flight_date(), &mut rng);
            let suffix = code.as_str().rsplit('-').next().unwrap();
            assert!(
                suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)),
                "suffix {suffix} escaped the alphabet"
            );
            for forbidden in ['0', 'O', '1', 'I'] {
                assert!(!suffix.contains(forbidden));
            }
        }
    }

    #[test]
    fn test_ten_thousand_codes_do_not_collide() {
        // Birthday bound over a 32^6 space: expected collisions for
        // 10,000 draws are ~0.05, so a collision here means a broken
        // entropy source rather than bad luck.
        let generator = CodeGenerator::new("VUE");
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let code = generator.generate(flight_date(), &mut rng);
            assert!(seen.insert(code), "collision after {} codes", seen.len());
        }
    }

    #[test]
    fn test_generated_code_parses_back() {
        let generator = CodeGenerator::new("vue");
        let code = generator.generate(flight_date(), &mut rand::thread_rng());
        let parsed: ConfirmationCode = code.as_str().parse().unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_parse_rejects_malformed_shapes() {
        for bad in [
            "",
            "VUE",
            "VUE-20260912",
            "VUE-20260912-ABC",
            "VUE-2026912-ABCDEF",
            "vue-20260912-ABCDEF",
            "VUE-20260912-ABCDEF-EXTRA",
        ] {
            assert!(
                matches!(bad.parse::<ConfirmationCode>(), Err(CodeError::MalformedShape(_))),
                "expected malformed: {bad}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_confusable_characters() {
        assert_eq!(
            "VUE-20260912-ABC0EF".parse::<ConfirmationCode>(),
            Err(CodeError::ForbiddenCharacter)
        );
        assert_eq!(
            "VUE-20260912-ABCOEF".parse::<ConfirmationCode>(),
            Err(CodeError::ForbiddenCharacter)
        );
    }
}
