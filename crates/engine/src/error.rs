//! The module contains the errors the engine can throw.
//!
//! - [`Validation`] thrown when input is missing or malformed, with per-field detail.
//! - [`KeyNotFound`] thrown when no row matches an identifier.
//! - [`ExistingKey`] thrown when a write would break a uniqueness rule.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
use std::collections::BTreeMap;

use sea_orm::DbErr;
use thiserror::Error;

use crate::ResultEngine;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Validation messages keyed by request field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when nothing was recorded, otherwise a [`EngineError::Validation`].
    pub fn into_result(self) -> ResultEngine<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for messages in self.fields.values() {
            for message in messages {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_pass() {
        assert_eq!(FieldErrors::new().into_result(), Ok(()));
    }

    #[test]
    fn messages_are_grouped_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("name", "The name field is required.");
        errors.add("code", "The code field is required.");
        errors.add("code", "The code field must not be greater than 10 characters.");

        assert_eq!(errors.fields()["code"].len(), 2);
        assert_eq!(
            errors.to_string(),
            "The code field is required. The code field must not be greater than 10 characters. The name field is required."
        );
        assert!(matches!(errors.into_result(), Err(EngineError::Validation(_))));
    }
}
