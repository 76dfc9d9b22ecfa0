//! Notification address validation.
//!
//! The grammar is an RFC 5322 subset: a local part of unreserved characters,
//! `@`, then one or more dot-separated domain labels. A dotless domain such as
//! `a@b` is accepted.

use std::fmt::{Display, Formatter};

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LABEL_LEN: usize = 63;
const LOCAL_PART_SPECIALS: &str = ".!#$%&'*+/=?^_`{|}~-";

/// Why an address was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    Empty,
    BadFormat,
    TooLong,
}

impl InvalidReason {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => "Email is required",
            Self::BadFormat => "Invalid email format",
            Self::TooLong => "Email address is too long",
        }
    }
}

impl Display for InvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of [`validate_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    Valid,
    Invalid(InvalidReason),
}

impl ValidationOutcome {
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    pub const fn reason(self) -> Option<InvalidReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Validates a notification address. Rules apply in order: empty, format, length.
pub fn validate_address(address: &str) -> ValidationOutcome {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return ValidationOutcome::Invalid(InvalidReason::Empty);
    }

    if !matches_grammar(trimmed) {
        return ValidationOutcome::Invalid(InvalidReason::BadFormat);
    }

    // Format is checked first, so a well-formed but oversized address is TooLong.
    if trimmed.chars().count() > MAX_ADDRESS_LEN {
        return ValidationOutcome::Invalid(InvalidReason::TooLong);
    }

    ValidationOutcome::Valid
}

fn matches_grammar(input: &str) -> bool {
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };

    if local.is_empty() || !local.chars().all(is_local_char) {
        return false;
    }

    domain.split('.').all(is_domain_label)
}

fn is_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(ch)
}

fn is_domain_label(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_are_empty() {
        assert_eq!(validate_address(""), ValidationOutcome::Invalid(InvalidReason::Empty));
        assert_eq!(validate_address("   \t"), ValidationOutcome::Invalid(InvalidReason::Empty));
    }

    #[test]
    fn dotless_domain_is_within_grammar() {
        assert_eq!(validate_address("a@b"), ValidationOutcome::Valid);
        assert_eq!(validate_address("  a@b.com  "), ValidationOutcome::Valid);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for input in [
            "plainaddress",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@-example.com",
            "user@example-.com",
            "user@example..com",
            "user@example.com.",
            "us er@example.com",
            "user@exa_mple.com",
        ] {
            assert_eq!(
                validate_address(input),
                ValidationOutcome::Invalid(InvalidReason::BadFormat),
                "input: {input}"
            );
        }
    }

    #[test]
    fn accepts_local_part_specials() {
        assert!(validate_address("o'brien+tag@mail-host.example").is_valid());
        assert!(validate_address("x.y{z}@h1.h2").is_valid());
    }

    #[test]
    fn label_length_is_bounded() {
        let ok = format!("a@{}", "b".repeat(63));
        let too_long = format!("a@{}", "b".repeat(64));
        assert!(validate_address(&ok).is_valid());
        assert_eq!(
            validate_address(&too_long),
            ValidationOutcome::Invalid(InvalidReason::BadFormat)
        );
    }

    #[test]
    fn well_formed_but_oversized_is_too_long() {
        let domain = vec!["c".repeat(60); 4].join(".");
        let address = format!("{}@{domain}", "a".repeat(16));
        assert_eq!(address.len(), 260);
        assert_eq!(
            validate_address(&address),
            ValidationOutcome::Invalid(InvalidReason::TooLong)
        );
    }

    #[test]
    fn validation_is_idempotent() {
        for input in ["", "a@b", "bad", "x@y.z"] {
            assert_eq!(validate_address(input), validate_address(input));
        }
    }
}
