//! Input masking and form validation for the client form.
//!
//! Everything here is pure: no I/O, no state.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::dashboard::{ClientForm, FormField};
use crate::models::normalize_state_code;

pub const EMAIL_ERROR: &str = "Email não é valido";
pub const PHONE_ERROR: &str = "Telefone deve estar no formato (00) 00000-0000";
pub const NAME_ERROR: &str = "Nome não pode estar vazio";
pub const STATE_ERROR: &str = "UF inválida";

const PHONE_MAX_DIGITS: usize = 11;

// `\S` in regex does not exclude U+FEFF, which browsers treat as whitespace
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\s\x{FEFF}]+@[^\s\x{FEFF}]+\.[^\s\x{FEFF}]+").expect("email pattern is valid")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\([0-9]{2}\) [0-9]{5}-[0-9]{4}$").expect("phone pattern is valid")
});

/// Field name to error message. Empty means the form is valid.
pub type FieldErrors = BTreeMap<FormField, &'static str>;

/// Keep only ASCII digits, at most `max` of them.
pub fn digits_only(input: &str, max: usize) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

/// Mask a phone number as `(DD) DDDDD-DDDD`.
///
/// Non-digits are stripped first, so the mask can be reapplied to its own
/// output. Up to three digits are returned bare; four to six get the area
/// code in parentheses; seven or more get the full mask, ignoring anything
/// past the eleventh digit.
pub fn format_phone(input: &str) -> String {
    let digits = digits_only(input, PHONE_MAX_DIGITS);

    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Empty once whitespace and byte-order marks are trimmed.
pub fn is_blank(value: &str) -> bool {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .is_empty()
}

/// Check the form and collect one message per failing field.
pub fn validate(form: &ClientForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !is_valid_email(&form.email) {
        errors.insert(FormField::Email, EMAIL_ERROR);
    }
    if !is_valid_phone(&form.phone) {
        errors.insert(FormField::Phone, PHONE_ERROR);
    }
    if is_blank(&form.name) {
        errors.insert(FormField::Name, NAME_ERROR);
    }
    // No UF is allowed; a UF outside the fixed list is not
    if !form.state.is_empty() && normalize_state_code(&form.state).is_none() {
        errors.insert(FormField::State, STATE_ERROR);
    }

    errors
}
