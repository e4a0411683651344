pub mod error;

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

pub use error::Rejection;

#[cfg(test)]
mod test;

lazy_static! {
    static ref AMOUNT_RE: Regex = Regex::new(r"^(0\.\d{1,2}|[1-9]\d*(\.\d{1,2})?)$").unwrap();
    static ref POSTAL_CODE_RE: Regex = Regex::new(r"^\d+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{3,}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
}

pub fn is_amount(value: &str) -> bool { AMOUNT_RE.is_match(value) }
pub fn is_postal_code(value: &str) -> bool { POSTAL_CODE_RE.is_match(value) }
pub fn is_phone(value: &str) -> bool { PHONE_RE.is_match(value) }
pub fn is_email(value: &str) -> bool { EMAIL_RE.is_match(value) }
pub fn is_username(value: &str) -> bool { USERNAME_RE.is_match(value) }

///
/// Messages keyed by form field name. The first message recorded for
/// a field is the one shown.
///
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Adds the messages of `other` for fields that have none yet
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(&field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Formats a character limit the way the forms print it, e.g. `1,000`
fn limit(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

///
/// Collects field messages while a form is parsed into its request
/// payload. Each check returns the cleaned value, or a placeholder once
/// the field has failed; [`Validator::finish`] discards the payload
/// whenever any message was recorded.
///
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    /// Required text, `min..=max` characters after trimming
    pub fn text(&mut self, field: &str, label: &str, value: &str, min: usize, max: usize) -> String {
        let value = value.trim();
        let len = value.chars().count();
        if value.is_empty() {
            self.fail(field, format!("{label} is required"));
        } else if len < min || len > max {
            if min > 1 {
                self.fail(field, format!("{label} must be {min}-{max} characters"));
            } else {
                self.fail(field, format!("{label} must not exceed {} characters", limit(max)));
            }
        }
        value.to_string()
    }

    /// Optional text with an upper bound
    pub fn optional_text(&mut self, field: &str, label: &str, value: &str, max: usize) -> String {
        let value = value.trim();
        if value.chars().count() > max {
            self.fail(field, format!("{label} must not exceed {} characters", limit(max)));
        }
        value.to_string()
    }

    pub fn required(&mut self, field: &str, label: &str, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, format!("{label} is required"));
        }
        value.to_string()
    }

    pub fn phone(&mut self, field: &str, value: &str) -> String {
        self.pattern(field, "Phone number", value, is_phone)
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        self.pattern(field, "Email", value, is_email)
    }

    pub fn postal_code(&mut self, field: &str, value: &str) -> String {
        self.pattern(field, "Postal code", value, is_postal_code)
    }

    pub fn username(&mut self, field: &str, value: &str) -> String {
        let value = value.trim();
        let len = value.chars().count();
        if value.is_empty() {
            self.fail(field, "Username is required");
        } else if !(5..=50).contains(&len) {
            self.fail(field, "Username must be 5-50 characters");
        } else if !is_username(value) {
            self.fail(field, "Username can only contain letters (a-z, A-Z) and numbers (0-9)");
        }
        value.to_string()
    }

    /// Passwords are never trimmed
    pub fn password(&mut self, field: &str, label: &str, value: &str, required: bool) -> Option<String> {
        if value.is_empty() {
            if required {
                self.fail(field, format!("{label} is required"));
            }
            return None;
        }
        if value.chars().count() < 6 {
            self.fail(field, "Password must be at least 6 characters");
        }
        Some(value.to_string())
    }

    fn pattern(&mut self, field: &str, label: &str, value: &str, check: fn(&str) -> bool) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, format!("{label} is required"));
        } else if !check(value) {
            self.fail(field, format!("Invalid {} format", label.to_lowercase()));
        }
        value.to_string()
    }

    ///
    /// A money amount with at most two decimals. `minimum` is checked
    /// inclusively and reported with `below_minimum`.
    ///
    pub fn amount(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        minimum: Decimal,
        below_minimum: &str,
    ) -> Decimal {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, format!("{label} is required"));
            return Decimal::ZERO;
        }
        self.parse_amount(field, label, value, minimum, below_minimum).unwrap_or(Decimal::ZERO)
    }

    /// Like [`Validator::amount`], blank input is accepted as `None`
    pub fn optional_amount(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        minimum: Decimal,
        below_minimum: &str,
    ) -> Option<Decimal> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        self.parse_amount(field, label, value, minimum, below_minimum)
    }

    fn parse_amount(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        minimum: Decimal,
        below_minimum: &str,
    ) -> Option<Decimal> {
        let amount = is_amount(value)
            .then(|| value.parse::<Decimal>().ok())
            .flatten();
        match amount {
            None => {
                self.fail(field, format!("Invalid {} format", label.to_lowercase()));
                None
            }
            Some(amount) if amount < minimum => {
                self.fail(field, below_minimum);
                None
            }
            Some(amount) => Some(amount),
        }
    }

    /// A coded choice; `fallback` stands in once the field has failed
    pub fn choice<T>(&mut self, field: &str, parsed: Option<T>, fallback: T, message: &str) -> T {
        match parsed {
            Some(value) => value,
            None => {
                self.fail(field, message);
                fallback
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
