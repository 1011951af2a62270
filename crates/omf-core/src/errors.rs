//! Structured error types shared across the unfolding crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`OmfError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (lengths, paths, parameter names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the unfolding workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OmfError {
    /// Invalid or inconsistent inputs detected before any training starts.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// A saved model artifact was requested but does not exist.
    #[error("missing artifact: {0}")]
    MissingArtifact(ErrorInfo),
    /// Classifier or regressor training/evaluation failures.
    #[error("training error: {0}")]
    Training(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Encoding and decoding failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Invalid histogram axes or contents.
    #[error("histogram error: {0}")]
    Histogram(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl OmfError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            OmfError::Config(info)
            | OmfError::MissingArtifact(info)
            | OmfError::Training(info)
            | OmfError::Io(info)
            | OmfError::Serde(info)
            | OmfError::Histogram(info) => info,
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        OmfError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a training error.
    pub fn training(code: &str, message: impl Into<String>) -> Self {
        OmfError::Training(ErrorInfo::new(code, message))
    }
}
