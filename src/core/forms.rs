//! Form-field parsing with field-level errors.
//!
//! Submitted forms arrive as flat string maps. [`FormFields`] reads typed
//! values out of them and collects one [`FieldError`] per bad field instead of
//! stopping at the first, so the user sees every problem at once. Blank
//! values count as missing.

use crate::errors::{Error, FieldError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Date format accepted by every date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "This field is required.";

/// A submitted form being read field by field.
#[derive(Debug)]
pub struct FormFields<'a> {
    values: &'a HashMap<String, String>,
    errors: Vec<FieldError>,
}

impl<'a> FormFields<'a> {
    #[must_use]
    pub const fn new(values: &'a HashMap<String, String>) -> Self {
        Self {
            values,
            errors: Vec::new(),
        }
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        self.values
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Records an error against `field`.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Required text. Missing values yield an empty string and an error.
    pub fn text(&mut self, name: &str) -> String {
        if let Some(value) = self.raw(name) {
            value.to_string()
        } else {
            self.reject(name, REQUIRED);
            String::new()
        }
    }

    /// Required text no longer than `max` characters.
    pub fn text_max(&mut self, name: &str, max: usize) -> String {
        let value = self.text(name);
        if value.chars().count() > max {
            self.reject(name, format!("Field cannot be longer than {max} characters."));
        }
        value
    }

    /// Optional text, `None` when blank.
    #[must_use]
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.raw(name).map(ToString::to_string)
    }

    /// Password-style field: taken verbatim (no trimming), required.
    pub fn secret(&mut self, name: &str) -> String {
        match self.values.get(name) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => {
                self.reject(name, REQUIRED);
                String::new()
            }
        }
    }

    /// Integer no smaller than `min`. When `default` is given the field may be
    /// left blank.
    pub fn integer(&mut self, name: &str, min: i32, default: Option<i32>) -> i32 {
        let Some(raw) = self.raw(name) else {
            if let Some(value) = default {
                return value;
            }
            self.reject(name, REQUIRED);
            return 0;
        };
        match raw.parse::<i32>() {
            Ok(value) if value < min => {
                self.reject(name, format!("Number must be at least {min}."));
                value
            }
            Ok(value) => value,
            Err(_) => {
                self.reject(name, "Not a valid integer value.");
                0
            }
        }
    }

    /// Required finite number no smaller than zero.
    pub fn amount(&mut self, name: &str) -> f64 {
        let Some(raw) = self.raw(name) else {
            self.reject(name, REQUIRED);
            return 0.0;
        };
        match raw.parse::<f64>() {
            Ok(value) if !value.is_finite() => {
                self.reject(name, "Not a valid float value.");
                0.0
            }
            Ok(value) if value < 0.0 => {
                self.reject(name, "Must be a non-negative value");
                value
            }
            Ok(value) => value,
            Err(_) => {
                self.reject(name, "Not a valid float value.");
                0.0
            }
        }
    }

    /// Optional `YYYY-MM-DD` date.
    pub fn date(&mut self, name: &str) -> Option<NaiveDate> {
        let raw = self.raw(name)?;
        match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                self.reject(name, "Not a valid date value.");
                None
            }
        }
    }

    /// Required value from a fixed set of choices.
    pub fn choice(&mut self, name: &str, choices: &[&str]) -> String {
        let value = self.text(name);
        if !value.is_empty() && !choices.contains(&value.as_str()) {
            self.reject(name, "Not a valid choice.");
        }
        value
    }

    /// Value from a fixed set of choices, `default` when blank.
    pub fn choice_or(&mut self, name: &str, choices: &[&str], default: &str) -> String {
        match self.raw(name) {
            None => default.to_string(),
            Some(value) if choices.contains(&value) => value.to_string(),
            Some(value) => {
                self.reject(name, "Not a valid choice.");
                value.to_string()
            }
        }
    }

    /// Returns `value` if no field was rejected, otherwise every collected error.
    pub fn finish<T>(self, value: T) -> Result<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation {
                errors: self.errors,
            })
        }
    }
}

/// Builds an owned field map, mostly for tests and programmatic callers.
#[must_use]
pub fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;

    #[test]
    fn test_collects_every_error() {
        let values = fields(&[("quantity", "0"), ("age", "abc")]);
        let mut form = FormFields::new(&values);
        let _ = form.text("breed");
        let _ = form.integer("quantity", 1, None);
        let _ = form.integer("age", 0, None);

        let Err(Error::Validation { errors }) = form.finish(()) else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors,
            vec![
                FieldError::new("breed", "This field is required."),
                FieldError::new("quantity", "Number must be at least 1."),
                FieldError::new("age", "Not a valid integer value."),
            ]
        );
    }

    #[test]
    fn test_blank_integer_uses_default() {
        let values = fields(&[("deaths", "  ")]);
        let mut form = FormFields::new(&values);
        assert_eq!(form.integer("deaths", 0, Some(0)), 0);
        assert_eq!(form.integer("sold", 0, Some(0)), 0);
        assert!(form.finish(()).is_ok());
    }

    #[test]
    fn test_dates_and_choices() {
        let values = fields(&[
            ("purchase_date", "2024-03-01"),
            ("bad_date", "03/01/2024"),
            ("currency", "GBP"),
        ]);
        let mut form = FormFields::new(&values);
        assert_eq!(
            form.date("purchase_date"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(form.date("missing"), None);
        assert_eq!(form.date("bad_date"), None);
        assert_eq!(form.choice_or("unit_currency", &["USD"], "USD"), "USD");
        let _ = form.choice_or("currency", &["USD", "EUR", "NGN"], "USD");

        let Err(Error::Validation { errors }) = form.finish(()) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "bad_date");
        assert_eq!(errors[1].message, "Not a valid choice.");
    }

    #[test]
    fn test_amount_rejects_negative_and_non_finite() {
        let values = fields(&[("cost", "-1"), ("other", "inf"), ("ok", "25.5")]);
        let mut form = FormFields::new(&values);
        let _ = form.amount("cost");
        let _ = form.amount("other");
        assert_eq!(form.amount("ok"), 25.5);
        let Err(Error::Validation { errors }) = form.finish(()) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_secret_is_not_trimmed() {
        let values = fields(&[("password", " pass word ")]);
        let mut form = FormFields::new(&values);
        assert_eq!(form.secret("password"), " pass word ");
        assert!(form.finish(()).is_ok());
    }
}
