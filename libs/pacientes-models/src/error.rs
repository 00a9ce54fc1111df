//! Validation failure type

use heck::ToLowerCamelCase;
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Field-level validation failure.
///
/// Maps the JSON field name (camelCase) to the first violation message
/// recorded for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for field(s): {}", self.field_names().join(", "))]
pub struct ValidationFailure {
    field_errors: BTreeMap<String, String>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.field_errors.keys().map(String::as_str).collect()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn into_field_errors(self) -> BTreeMap<String, String> {
        self.field_errors
    }

    /// `Ok(())` when nothing was recorded, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut failure = Self::new();
        for (field, violations) in errors.field_errors() {
            if let Some(first) = violations.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                failure.add(field.to_lower_camel_case(), message);
            }
        }
        failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut failure = ValidationFailure::new();
        failure.add("identityNumber", "first");
        failure.add("identityNumber", "second");

        assert_eq!(failure.get("identityNumber"), Some("first"));
        assert_eq!(failure.field_names(), vec!["identityNumber"]);
    }

    #[test]
    fn empty_failure_is_ok() {
        assert!(ValidationFailure::new().into_result().is_ok());
    }
}
