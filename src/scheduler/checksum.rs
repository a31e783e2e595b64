//! Check-digit computation and formatting for 13-digit identifiers.
//!
//! An identifier is laid out as `prefix ‖ registrant code ‖ sequence ‖ check`.
//! The first twelve digits form the body; the thirteenth is the check digit,
//! computed by weighting the body digits alternately with 1 and 3 and taking
//! `(10 - (sum mod 10)) mod 10`.
//!
//! # Examples
//!
//! ```
//! use isbn_scheduler::scheduler::checksum::{compute_check_digit, format_identifier};
//!
//! assert_eq!(compute_check_digit("978123456789"), Ok(7));
//! assert_eq!(format_identifier("978", "123456", 1), "9781234560010");
//! ```

use super::error::ScheduleError;

/// Number of characters in a complete identifier.
pub const IDENTIFIER_LEN: usize = 13;

/// Number of digits covered by the check digit.
pub const BODY_LEN: usize = IDENTIFIER_LEN - 1;

/// Weighted mod-10 check digit over ASCII digits. Callers guarantee the input
/// is exactly [`BODY_LEN`] ASCII digits.
#[inline]
fn check_digit_of(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}

/// Compute the check digit for a twelve-digit body.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidIdentifier`] when `body` is not exactly
/// twelve ASCII digits.
pub fn compute_check_digit(body: &str) -> Result<u8, ScheduleError> {
    if body.len() != BODY_LEN {
        return Err(ScheduleError::invalid_identifier(
            body,
            format!("body must be {BODY_LEN} digits, got {}", body.len()),
        ));
    }
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScheduleError::invalid_identifier(
            body,
            "body contains non-digit characters",
        ));
    }
    Ok(check_digit_of(body.as_bytes()))
}

/// Number of sequence digits left once `prefix` and `registrant_code` are
/// placed in the twelve-digit body.
#[must_use]
#[inline]
pub fn sequence_width(prefix: &str, registrant_code: &str) -> usize {
    BODY_LEN.saturating_sub(prefix.len() + registrant_code.len())
}

/// Build a full identifier from its parts.
///
/// The sequence number is zero-padded to fill the body; when it has more
/// digits than fit, only the rightmost digits are kept. Non-digit characters
/// in `prefix` and `registrant_code` are ignored and an over-long
/// prefix/registrant pair is cut at twelve digits, so the result is always
/// exactly [`IDENTIFIER_LEN`] ASCII digits.
#[must_use]
pub fn format_identifier(prefix: &str, registrant_code: &str, sequence_number: u64) -> String {
    let mut body: String = prefix
        .chars()
        .chain(registrant_code.chars())
        .filter(char::is_ascii_digit)
        .take(BODY_LEN)
        .collect();

    let width = BODY_LEN - body.len();
    if width > 0 {
        // width <= 12, so the modulus always fits in a u64
        let sequence = sequence_number % 10u64.pow(width as u32);
        body.push_str(&format!("{sequence:0width$}"));
    }

    let check = check_digit_of(body.as_bytes());
    body.push(char::from(b'0' + check));
    body
}

/// Strip the hyphens and spaces commonly used when identifiers are printed.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Validate a complete identifier: length, digits and check digit.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidIdentifier`] naming the first problem
/// found.
pub fn validate_identifier(identifier: &str) -> Result<(), ScheduleError> {
    if identifier.len() != IDENTIFIER_LEN {
        return Err(ScheduleError::invalid_identifier(
            identifier,
            format!(
                "expected {IDENTIFIER_LEN} digits, got {} characters",
                identifier.chars().count()
            ),
        ));
    }
    if !identifier.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScheduleError::invalid_identifier(
            identifier,
            "contains non-digit characters",
        ));
    }

    let bytes = identifier.as_bytes();
    let expected = check_digit_of(&bytes[..BODY_LEN]);
    let actual = bytes[BODY_LEN] - b'0';
    if expected != actual {
        return Err(ScheduleError::invalid_identifier(
            identifier,
            format!("check digit {actual} does not match computed {expected}"),
        ));
    }
    Ok(())
}

/// Convenience predicate over [`validate_identifier`].
#[must_use]
#[inline]
pub fn is_valid_identifier(identifier: &str) -> bool {
    validate_identifier(identifier).is_ok()
}

/// Render an identifier in its printed, hyphenated form, e.g.
/// `978-123456-001-0`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidIdentifier`] if the identifier is invalid
/// or the group lengths leave no room for a sequence group.
pub fn hyphenate(
    identifier: &str,
    prefix_len: usize,
    registrant_len: usize,
) -> Result<String, ScheduleError> {
    validate_identifier(identifier)?;
    if prefix_len + registrant_len >= BODY_LEN {
        return Err(ScheduleError::invalid_identifier(
            identifier,
            "prefix and registrant groups leave no sequence digits",
        ));
    }
    let registrant_end = prefix_len + registrant_len;
    Ok(format!(
        "{}-{}-{}-{}",
        &identifier[..prefix_len],
        &identifier[prefix_len..registrant_end],
        &identifier[registrant_end..BODY_LEN],
        &identifier[BODY_LEN..]
    ))
}
