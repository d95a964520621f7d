//! CAS Registry Number parsing and checksum validation.
//!
//! A CAS number is three hyphen-separated digit groups, `NNNNNNN-NN-N`:
//! 2-7 digits, exactly 2 digits, and a single check digit. The check digit
//! is the weighted sum of the remaining digits mod 10, with weight 1 on the
//! rightmost of those digits, increasing by 1 per position leftward.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2,7})-(\d{2})-(\d)$").expect("CAS pattern is valid"));

/// A structurally well-formed CAS Registry Number.
///
/// `body` holds the digits of the first two groups, most-significant first;
/// the check digit is stored separately. Structural validity does not imply
/// checksum validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasNumber {
    body: Vec<u8>,
    check: u8,
}

impl CasNumber {
    /// Parse a candidate string. `None` means the string does not match the
    /// hyphenated three-group format.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = CAS_PATTERN.captures(s)?;
        let mut body = Vec::with_capacity(9);
        body.extend(caps[1].bytes().map(|b| b - b'0'));
        body.extend(caps[2].bytes().map(|b| b - b'0'));
        let check = caps[3].as_bytes()[0] - b'0';
        Some(Self { body, check })
    }

    /// The digits of the first two groups, most-significant first.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The check digit as written.
    pub fn check(&self) -> u8 {
        self.check
    }

    /// Check the written check digit against the computed one.
    pub fn is_valid(&self) -> bool {
        check_digit(&self.body) == self.check
    }
}

impl fmt::Display for CasNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = self.body.len() - 2;
        for d in &self.body[..split] {
            write!(f, "{d}")?;
        }
        write!(f, "-")?;
        for d in &self.body[split..] {
            write!(f, "{d}")?;
        }
        write!(f, "-{}", self.check)
    }
}

/// Compute the expected check digit for a digit sequence (check digit
/// excluded, most-significant first).
pub fn check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .rev()
        .zip(1u32..)
        .map(|(&d, w)| u32::from(d) * w)
        .sum();
    (sum % 10) as u8
}

/// Outcome of validating one candidate identifier. Pure data, never an
/// error: batch operations aggregate these instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// Well-formed and the checksum matches
    Valid,
    /// Does not match the three-group hyphenated digit format
    InvalidFormat,
    /// Well-formed but the check digit is wrong
    InvalidChecksum,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::InvalidFormat => write!(f, "invalid format"),
            Self::InvalidChecksum => write!(f, "invalid checksum"),
        }
    }
}

/// Validate a candidate CAS Registry Number.
pub fn validate(s: &str) -> Validity {
    match CasNumber::parse(s) {
        None => Validity::InvalidFormat,
        Some(n) if n.is_valid() => Validity::Valid,
        Some(_) => Validity::InvalidChecksum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_good_numbers() {
        // Formaldehyde, water, bisphenol A, ethanol, chromium
        for s in ["50-00-0", "7732-18-5", "80-05-7", "64-17-5", "7440-47-3"] {
            assert_eq!(validate(s), Validity::Valid, "{s}");
        }
    }

    #[test]
    fn malformed_strings() {
        for s in [
            "",
            "12345",
            "abc-12-3",
            "50-00",
            "50-00-0-0",
            "5-00-0",
            "12345678-00-0",
            "50-0-0",
            "50-000-0",
            "50-00-00",
            "50 00 0",
        ] {
            assert_eq!(validate(s), Validity::InvalidFormat, "{s:?}");
        }
    }

    #[test]
    fn altered_check_digit() {
        assert_eq!(validate("50-00-1"), Validity::InvalidChecksum);
        assert_eq!(validate("7732-18-4"), Validity::InvalidChecksum);
        // The textbook fictional compound: plausible-looking, wrong checksum
        assert_eq!(validate("123-45-6"), Validity::InvalidChecksum);
    }

    #[test]
    fn check_digit_weights() {
        // 7732-18-5: 8*1 + 1*2 + 2*3 + 3*4 + 7*5 + 7*6 = 105 -> 5
        assert_eq!(check_digit(&[7, 7, 3, 2, 1, 8]), 5);
        // 50-00-0: 0*1 + 0*2 + 0*3 + 5*4 = 20 -> 0
        assert_eq!(check_digit(&[5, 0, 0, 0]), 0);
    }

    #[test]
    fn parse_and_display_round_trip() {
        let n = CasNumber::parse("7732-18-5").unwrap();
        assert_eq!(n.body(), &[7, 7, 3, 2, 1, 8]);
        assert_eq!(n.check(), 5);
        assert_eq!(n.to_string(), "7732-18-5");

        let short = CasNumber::parse("50-00-0").unwrap();
        assert_eq!(short.to_string(), "50-00-0");
    }
}
