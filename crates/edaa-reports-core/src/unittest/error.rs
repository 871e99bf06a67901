use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the unit test report model, its adapters and documents.
#[derive(Debug, Error)]
pub enum UnittestError {
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("File already exists and overwrite is disabled: {}", .path.display())]
    FileExists { path: PathBuf },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document {}: {message}", .path.display())]
    MalformedDocument { path: PathBuf, message: String },

    #[error("Unexpected root element in {}: expected <{expected}>, found <{found}>", .path.display())]
    UnexpectedRootElement {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Missing attribute '{attribute}' on <{element}> in {}", .path.display())]
    MissingAttribute {
        path: PathBuf,
        element: String,
        attribute: String,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}> in {}: {reason}", .path.display())]
    InvalidAttribute {
        path: PathBuf,
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("Structure error at '{entity}': {message}")]
    Structure { entity: String, message: String },

    #[error("Duplicate {kind} name '{name}' in '{parent}'")]
    DuplicateName {
        parent: String,
        kind: &'static str,
        name: String,
    },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Inconsistent {field} at '{entity}': stored {stored}, computed {computed}")]
    AggregationConsistency {
        entity: String,
        field: &'static str,
        stored: String,
        computed: String,
    },

    #[error("Unknown dialect '{identifier}' (known: {known})")]
    UnknownDialect { identifier: String, known: String },

    #[error("Dialect mismatch: adapter handles {expected}, report is {found}")]
    DialectMismatch { expected: String, found: String },

    #[error("Document {} has not been analyzed yet", .path.display())]
    NotAnalyzed { path: PathBuf },
}

impl UnittestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UnittestError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        UnittestError::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn structure(entity: impl ToString, message: impl Into<String>) -> Self {
        UnittestError::Structure {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        UnittestError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
