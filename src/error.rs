// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;
use thiserror::Error;

use crate::value::ValueKind;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ArborError>;

/// The main error type for tree loading, lookup, mutation and persistence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArborError {
    /// Malformed source text.
    #[error("[ARBOR] Parse Error in {}:{line}: {message}", .file.as_deref().unwrap_or("<string>"))]
    ParseFailure {
        file: Option<String>,
        line: usize,
        message: String,
    },

    /// Open, read or write failure against the backing store.
    #[error("[ARBOR] I/O Error '{path}': {message}")]
    IoFailure { path: String, message: String },

    #[error("[ARBOR] Type Error: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("[ARBOR] Setting '{path}' not found")]
    NotFound { path: String },

    #[error("[ARBOR] Index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("[ARBOR] Setting '{name}' already exists in this group")]
    DuplicateName { name: String },

    /// Raised when a group member name does not match `[A-Za-z*][-A-Za-z0-9_*]*`.
    #[error("[ARBOR] Invalid setting name '{name}'")]
    InvalidName { name: String },

    /// A value the text format cannot represent, such as a non-finite float.
    #[error("[ARBOR] Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("[ARBOR] No configuration loaded")]
    NotLoaded,
}

impl ArborError {
    pub(crate) fn parse(file: Option<&str>, line: usize, message: impl Into<String>) -> Self {
        ArborError::ParseFailure {
            file: file.map(str::to_string),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        ArborError::IoFailure {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        ArborError::NotFound { path: path.into() }
    }

    pub(crate) fn mismatch(expected: ValueKind, found: ValueKind) -> Self {
        ArborError::TypeMismatch { expected, found }
    }

    /// True for the lookup failure family (`NotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArborError::NotFound { .. })
    }
}

/// Coarse category recorded in [`ErrorInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ErrorKind {
    #[default]
    None,
    IoFailure,
    ParseFailure,
}

/// Diagnostic snapshot of the most recent failing operation on a tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub file: Option<String>,
    pub line: usize,
    pub message: String,
}

impl From<&ArborError> for ErrorInfo {
    fn from(err: &ArborError) -> Self {
        match err {
            ArborError::ParseFailure { file, line, message } => ErrorInfo {
                kind: ErrorKind::ParseFailure,
                file: file.clone(),
                line: *line,
                message: message.clone(),
            },
            ArborError::IoFailure { path, message } => ErrorInfo {
                kind: ErrorKind::IoFailure,
                file: Some(path.clone()),
                line: 0,
                message: message.clone(),
            },
            other => ErrorInfo {
                kind: ErrorKind::None,
                file: None,
                line: 0,
                message: other.to_string(),
            },
        }
    }
}
