//! Request validation: collects every failing field instead of stopping at the first.
//!
//! Request bodies are plain typed structs; each implements `Validate` and the handler
//! calls `ensure_valid` before touching the database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 10_000;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Vec<FieldError>;
}

/// Runs validation and converts a non-empty failure list into `AppError::InvalidFields`.
pub fn ensure_valid<T: Validate>(input: &T) -> Result<(), AppError> {
    let errors = input.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

/// Accumulator used by the `Validate` impls.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str, max_len: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "is required");
        } else {
            self.max_len(field, Some(value), max_len);
        }
        self
    }

    /// Same as `required` but for PATCH bodies, where absence means "unchanged".
    pub fn not_blank(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(value) = value {
            self.required(field, value, max_len);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                self.push(field, &format!("must be at most {max_len} characters"));
            }
        }
        self
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !is_http_url(value) {
                self.push(field, "must be an http(s) URL");
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !is_email(value) {
                self.push(field, "must be a valid email address");
            }
        }
        self
    }

    pub fn date_order(
        &mut self,
        field: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.push(field, "must not be before the start date");
            }
        }
        self
    }

    pub fn range(&mut self, field: &str, value: Option<i32>, min: i32, max: i32) -> &mut Self {
        if let Some(value) = value {
            if !(min..=max).contains(&value) {
                self.push(field, &format!("must be between {min} and {max}"));
            }
        }
        self
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.push(field, message);
        }
        self
    }

    pub fn finish(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.errors)
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }
}

pub fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}

fn is_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
        }
        _ => false,
    }
}
