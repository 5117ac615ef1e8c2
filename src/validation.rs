//! Declarative argument validation for tool calls.
//!
//! A [`Validator`] walks a JSON argument object field by field. Each rule
//! either yields the typed, normalised value or records a [`Violation`];
//! nothing short-circuits, so a single call reports every bad field at once.
//! Cross-field rules go through [`Validator::check`].
//!
//! ```text
//! let mut v = Validator::new(&arguments);
//! let origin = v.airport_code("origin", Presence::Required);
//! let adults = v.integer("adults", 1..=9, Some(1));
//! v.finish()?;
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

/// Date format accepted for all travel dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Argument name (as the client spelled it).
    pub field: String,
    /// What the rule expects.
    pub message: String,
    /// The offending value, if one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {} (got {value})", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Every violation found in one set of arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    /// The recorded violations, in the order they were found.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if nothing was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns `true` if `field` has at least one violation.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl From<Vec<Violation>> for ValidationErrors {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid arguments")?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Whether a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent (or `null`) is a violation.
    Required,
    /// Absent (or `null`) yields `None`.
    Optional,
}

/// Collects violations while extracting typed values from a JSON object.
pub struct Validator<'a> {
    args: Option<&'a Map<String, Value>>,
    errors: Vec<Violation>,
}

impl<'a> Validator<'a> {
    /// Starts validating `arguments`, which must be a JSON object.
    ///
    /// `null` is treated as an empty object so that tools whose fields are all
    /// optional can be called without arguments.
    #[must_use]
    pub fn new(arguments: &'a Value) -> Self {
        let mut errors = Vec::new();
        let args = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                errors.push(Violation::new(
                    "arguments",
                    "must be a JSON object",
                    Some(other.clone()),
                ));
                None
            }
        };
        Self { args, errors }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.args
            .and_then(|map| map.get(field))
            .filter(|v| !v.is_null())
    }

    fn fail(&mut self, field: &str, message: impl Into<String>, value: Option<&Value>) {
        self.errors
            .push(Violation::new(field, message, value.cloned()));
    }

    fn lookup(&mut self, field: &str, presence: Presence) -> Option<&'a Value> {
        let value = self.get(field);
        if value.is_none() && presence == Presence::Required {
            self.fail(field, "is required", None);
        }
        value
    }

    /// A string whose trimmed length lies in `len`.
    pub fn string(
        &mut self,
        field: &str,
        presence: Presence,
        len: RangeInclusive<usize>,
    ) -> Option<String> {
        let value = self.lookup(field, presence)?;
        let Some(s) = value.as_str() else {
            self.fail(field, "must be a string", Some(value));
            return None;
        };
        let s = s.trim();
        let count = s.chars().count();
        if !len.contains(&count) {
            let message = if len.start() == len.end() {
                format!("must be exactly {} characters", len.start())
            } else {
                format!(
                    "must be between {} and {} characters",
                    len.start(),
                    len.end()
                )
            };
            self.fail(field, message, Some(value));
            return None;
        }
        Some(s.to_string())
    }

    /// An all-letter code of exactly `len` characters, upper-cased.
    pub fn letter_code(&mut self, field: &str, presence: Presence, len: usize) -> Option<String> {
        let value = self.lookup(field, presence)?;
        let code = value.as_str().map(str::trim).filter(|s| {
            s.chars().count() == len && s.chars().all(|c| c.is_ascii_alphabetic())
        });
        if let Some(code) = code {
            Some(code.to_ascii_uppercase())
        } else {
            self.fail(
                field,
                format!("must be a {len}-letter code"),
                Some(value),
            );
            None
        }
    }

    /// A 3-letter IATA airport or city code.
    pub fn airport_code(&mut self, field: &str, presence: Presence) -> Option<String> {
        let value = self.lookup(field, presence)?;
        let code = value
            .as_str()
            .map(str::trim)
            .filter(|s| s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()));
        if let Some(code) = code {
            Some(code.to_ascii_uppercase())
        } else {
            self.fail(
                field,
                "must be a 3-letter IATA airport code (e.g. LHR)",
                Some(value),
            );
            None
        }
    }

    /// A calendar date in `YYYY-MM-DD` form.
    pub fn date(&mut self, field: &str, presence: Presence) -> Option<NaiveDate> {
        let value = self.lookup(field, presence)?;
        let parsed = value
            .as_str()
            .filter(|s| s.len() == 10)
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
        if parsed.is_none() {
            self.fail(
                field,
                "must be a valid date in YYYY-MM-DD format",
                Some(value),
            );
        }
        parsed
    }

    /// An integer in `range`, falling back to `default` when absent.
    pub fn integer(
        &mut self,
        field: &str,
        range: RangeInclusive<i64>,
        default: Option<i64>,
    ) -> Option<i64> {
        let presence = if default.is_some() {
            Presence::Optional
        } else {
            Presence::Required
        };
        let Some(value) = self.lookup(field, presence) else {
            return default;
        };
        match value.as_i64() {
            Some(n) if range.contains(&n) => Some(n),
            Some(_) => {
                self.fail(
                    field,
                    format!("must be between {} and {}", range.start(), range.end()),
                    Some(value),
                );
                None
            }
            None => {
                self.fail(field, "must be an integer", Some(value));
                None
            }
        }
    }

    /// An optional integer strictly greater than zero.
    pub fn positive_integer(&mut self, field: &str) -> Option<u32> {
        let value = self.get(field)?;
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n > 0 => Some(n),
            _ => {
                self.fail(field, "must be a positive integer", Some(value));
                None
            }
        }
    }

    /// An optional boolean, falling back to `default` when absent.
    pub fn boolean(&mut self, field: &str, default: bool) -> bool {
        let Some(value) = self.get(field) else {
            return default;
        };
        value.as_bool().unwrap_or_else(|| {
            self.fail(field, "must be a boolean", Some(value));
            default
        })
    }

    /// One of `allowed` (case-insensitive), falling back to `default` when absent.
    pub fn one_of(
        &mut self,
        field: &str,
        allowed: &[&'static str],
        default: Option<&'static str>,
    ) -> Option<&'static str> {
        let Some(value) = self.get(field) else {
            return default;
        };
        let matched = value.as_str().and_then(|s| {
            allowed
                .iter()
                .copied()
                .find(|candidate| candidate.eq_ignore_ascii_case(s.trim()))
        });
        if matched.is_none() {
            self.fail(
                field,
                format!("must be one of: {}", allowed.join(", ")),
                Some(value),
            );
        }
        matched
    }

    /// A list of strings given either as an array or a comma-separated string.
    ///
    /// Blank entries are dropped; the list length must lie in `count`.
    pub fn string_list(
        &mut self,
        field: &str,
        presence: Presence,
        count: RangeInclusive<usize>,
    ) -> Option<Vec<String>> {
        let value = self.lookup(field, presence)?;
        let items: Option<Vec<String>> = match value {
            Value::String(s) => Some(s.split(',').map(|p| p.trim().to_string()).collect()),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(|s| s.trim().to_string()))
                .collect(),
            _ => None,
        };
        let Some(items) = items else {
            self.fail(
                field,
                "must be a string or an array of strings",
                Some(value),
            );
            return None;
        };
        let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
        if !count.contains(&items.len()) {
            self.fail(
                field,
                format!(
                    "must contain between {} and {} entries",
                    count.start(),
                    count.end()
                ),
                Some(value),
            );
            return None;
        }
        Some(items)
    }

    /// Records a cross-field violation when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            let value = self.get(field);
            self.fail(field, message, value);
        }
    }

    /// Hands back what was collected so far.
    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors::from(self.errors)
    }

    /// Succeeds only if no rule was violated.
    ///
    /// # Errors
    ///
    /// Returns every recorded violation.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_errors())
        }
    }
}
