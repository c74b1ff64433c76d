//! Field validation shared by the JSON handlers.
//!
//! Validators push messages into a [`FieldErrors`] map so one response can
//! report every bad field at once.

use crate::errors::{ApiError, FieldErrors};

pub const REQUIRED: &str = "This field is required.";

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Unwrap a required field, recording an error when it is missing.
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.error(field, REQUIRED);
        }
        value
    }

    /// Trimmed, non-blank text no longer than `max_len` characters.
    pub fn text(&mut self, field: &str, value: Option<String>, max_len: usize) -> Option<String> {
        let value = value?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.error(field, "This field may not be blank.");
            return None;
        }
        if trimmed.chars().count() > max_len {
            self.error(
                field,
                format!("Ensure this field has no more than {max_len} characters."),
            );
            return None;
        }
        Some(trimmed.to_string())
    }

    /// A finite number within `[min, max]`.
    pub fn in_range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) -> Option<f64> {
        let value = value?;
        if !value.is_finite() || value < min || value > max {
            self.error(field, format!("Ensure this value is between {min} and {max}."));
            return None;
        }
        Some(value)
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i64>) -> Option<i64> {
        let value = value?;
        if value < 0 {
            self.error(field, "Ensure this value is greater than or equal to 0.");
            return None;
        }
        Some(value)
    }

    /// `Ok` when nothing was recorded.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

pub fn latitude(v: &mut Validator, value: Option<f64>) -> Option<f64> {
    v.in_range("latitude", value, -90.0, 90.0)
}

pub fn longitude(v: &mut Validator, value: Option<f64>) -> Option<f64> {
    v.in_range("longitude", value, -180.0, 180.0)
}
