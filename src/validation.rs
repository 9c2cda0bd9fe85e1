//! Field validation for incoming DTOs.
//!
//! Request bodies are deserialized loosely (every field optional, untyped) and
//! then checked here, so a single response can name every bad field.

use std::{fmt, ops::RangeInclusive};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One or more rejected fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

/// Accumulates field errors. Every checker returns `Some` exactly when it
/// recorded no error for that field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn reject<T>(&mut self, field: &'static str, message: impl Into<String>) -> Option<T> {
        self.errors.push(FieldError::new(field, message));
        None
    }

    pub fn string(&mut self, field: &'static str, value: Option<&Value>) -> Option<String> {
        match value {
            None | Some(Value::Null) => self.reject(field, "is required"),
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::String(_)) => self.reject(field, "must not be empty"),
            Some(_) => self.reject(field, "must be a string"),
        }
    }

    pub fn email(&mut self, field: &'static str, value: Option<&Value>) -> Option<String> {
        let email = self.string(field, value)?.to_lowercase();
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.reject(field, "must be a valid email")
        }
    }

    pub fn number(
        &mut self,
        field: &'static str,
        value: Option<&Value>,
        range: RangeInclusive<f64>,
    ) -> Option<f64> {
        match value {
            None | Some(Value::Null) => self.reject(field, "is required"),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(x) => self.in_range(field, x, range),
                None => self.reject(field, "must be a number"),
            },
            Some(_) => self.reject(field, "must be a number"),
        }
    }

    pub fn integer(
        &mut self,
        field: &'static str,
        value: Option<&Value>,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        let n = match value {
            None | Some(Value::Null) => return self.reject(field, "is required"),
            Some(Value::Number(n)) => n,
            Some(_) => return self.reject(field, "must be an integer"),
        };
        let x = match (n.as_i64(), n.as_f64()) {
            (Some(x), _) => x,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return self.reject(field, "must be an integer"),
        };
        if range.contains(&x) {
            Some(x)
        } else {
            self.reject(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            )
        }
    }

    pub fn boolean(&mut self, field: &'static str, value: Option<&Value>) -> Option<bool> {
        match value {
            Some(Value::Bool(b)) => Some(*b),
            None | Some(Value::Null) => self.reject(field, "is required"),
            Some(_) => self.reject(field, "must be a boolean"),
        }
    }

    pub fn query_string(&mut self, field: &'static str, raw: Option<&str>) -> Option<String> {
        match raw.map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            Some(_) => self.reject(field, "must not be empty"),
            None => self.reject(field, "is required"),
        }
    }

    pub fn query_number(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
        range: RangeInclusive<f64>,
    ) -> Option<f64> {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return self.reject(field, "is required"),
        };
        match raw.parse::<f64>() {
            Ok(x) => self.in_range(field, x, range),
            Err(_) => self.reject(field, "must be a number"),
        }
    }

    pub fn query_integer(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return self.reject(field, "is required"),
        };
        match raw.parse::<i64>() {
            Ok(x) if range.contains(&x) => Some(x),
            Ok(_) => self.reject(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            ),
            Err(_) => self.reject(field, "must be an integer"),
        }
    }

    fn in_range(&mut self, field: &'static str, x: f64, range: RangeInclusive<f64>) -> Option<f64> {
        if !x.is_finite() {
            return self.reject(field, "must be a finite number");
        }
        if range.contains(&x) {
            Some(x)
        } else {
            self.reject(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            )
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }
}
