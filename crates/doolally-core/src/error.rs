//! # Error Types
//!
//! Three families of failure, kept apart so callers can react to each one
//! differently:
//!
//! - [`ValidationError`]: the document does not conform to the schema.
//!   Carries the path of the offending position, the type information of the
//!   field active there, and a human-readable message. These are data errors:
//!   callers reject the input and never retry.
//! - [`DoolallyError::Contract`]: an internal helper was driven outside its
//!   contract (an exhausted token stream, a drain without a collection start).
//!   These are defects in the engine, never swallowed by union branch trial.
//! - [`SchemaError`]: a schema declaration is malformed (nested unions,
//!   uniqueness on a non-atomic element). Raised once, at construction time.

use std::fmt;

use thiserror::Error;

/// The two classes of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The value's runtime type does not match what the field requires
    /// (wrong JSON kind, unexpected collection shape, unrecognised key).
    Type,
    /// The value has the right type but fails a constraint (bounds, custom
    /// validator, whitelist, missing required field, union exhaustion).
    Value,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => f.write_str("type error"),
            Self::Value => f.write_str("value error"),
        }
    }
}

/// A structural violation found while walking a document.
///
/// Renders as `[path:typeInfo] - message`, or `[path] - message` when the
/// failure was detected by the tokenizer before any field was active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: ErrorKind,
    path: String,
    expected: Option<String>,
    message: String,
}

impl ValidationError {
    pub(crate) fn new(
        kind: ErrorKind,
        path: String,
        expected: Option<String>,
        message: String,
    ) -> Self {
        Self {
            kind,
            path,
            expected,
            message,
        }
    }

    /// Whether this is a type or a value error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true for [`ErrorKind::Type`].
    pub fn is_type_error(&self) -> bool {
        self.kind == ErrorKind::Type
    }

    /// Returns true for [`ErrorKind::Value`].
    pub fn is_value_error(&self) -> bool {
        self.kind == ErrorKind::Value
    }

    /// Slash-separated location of the failure, e.g. `/values/0/key`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type information of the field that rejected the value.
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// The bare message, without location prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            Some(expected) => write!(f, "[{}:{}] - {}", self.path, expected, self.message),
            None => write!(f, "[{}] - {}", self.path, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error returned by [`validate`](crate::validate) and the validation
/// internals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoolallyError {
    /// The document was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An engine helper was used outside its contract.
    #[error("contract violation: {0}")]
    Contract(String),
}

impl DoolallyError {
    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Contract(_) => None,
        }
    }

    /// Returns true when the document was rejected (as opposed to an engine defect).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Malformed schema declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A union was declared as a direct member of another union.
    #[error("union field in top level of another union: {member}")]
    NestedUnion {
        /// Type information of the offending member.
        member: String,
    },

    /// `unique_items` was requested for a non-atomic element field.
    #[error("uniqueness on non atomic element field: {element}")]
    UniqueItemsRequiresAtomic {
        /// Type information of the element field.
        element: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_field_info() {
        let err = ValidationError::new(
            ErrorKind::Value,
            "/age".to_string(),
            Some("Number(unsigned,int)".to_string()),
            "negative number invalid -1".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "[/age:Number(unsigned,int)] - negative number invalid -1"
        );
        assert!(err.is_value_error());
        assert!(!err.is_type_error());
    }

    #[test]
    fn display_without_field_info() {
        let err = ValidationError::new(
            ErrorKind::Type,
            String::new(),
            None,
            "json must be array or object, not string".to_string(),
        );
        assert_eq!(err.to_string(), "[] - json must be array or object, not string");
    }

    #[test]
    fn validation_error_converts_transparently() {
        let inner = ValidationError::new(
            ErrorKind::Type,
            "/a".to_string(),
            Some("Bool()".to_string()),
            "expected type in (boolean)".to_string(),
        );
        let err: DoolallyError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.as_validation(), Some(&inner));
        assert!(err.is_rejection());
    }

    #[test]
    fn contract_errors_are_not_rejections() {
        let err = DoolallyError::contract("token stream exhausted");
        assert!(!err.is_rejection());
        assert!(err.as_validation().is_none());
        assert!(err.to_string().contains("token stream exhausted"));
    }
}
