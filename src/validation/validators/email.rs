//! Email address validation.
//!
//! Accepts a single address, either bare (`local@domain`) or wrapped as
//! `Display Name <local@domain>`. The address itself is checked with the
//! HTML5 email rules of the `validator` crate, which also take IP literal
//! domains such as `ops@[192.168.0.1]`.

use validator::validate_email;

use crate::validation::pipeline::RuleContext;
use crate::validation::validators::{fail, ValidatorError};

pub fn email(_ctx: &mut RuleContext<'_>, key: &str, value: &str) -> Result<(), ValidatorError> {
    if is_address(value) {
        Ok(())
    } else {
        fail(format!("{} is not a valid email address", key))
    }
}

/// Whether `input` is exactly one address.
pub fn is_address(input: &str) -> bool {
    let input = input.trim();

    let address = match input.strip_suffix('>') {
        Some(rest) => match rest.rfind('<') {
            Some(open) if !rest[..open].contains(['<', '>']) => &rest[open + 1..],
            _ => return false,
        },
        None => input,
    };

    validate_email(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for address in [
            "ana@example.com",
            "first.last+tag@sub.example.org",
            "user@localhost",
            "Ana Lopez <ana@example.com>",
            "<ana@example.com>",
            "ops@[192.168.0.1]",
        ] {
            assert!(is_address(address), "{} should be accepted", address);
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for address in [
            "",
            "not-an-email",
            "@example.com",
            "ana@",
            "ana@example..com",
            "ana lopez@example.com",
            "Ana <ana@example.com",
            "Ana <bea> <ana@example.com>",
            "a,b@example.com",
            "ana@exa mple.com",
        ] {
            assert!(!is_address(address), "{} should be rejected", address);
        }
    }
}
