// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for ProviderFile

use thiserror::Error;

/// Result type alias
pub type PfResult<T> = Result<T, PfError>;

/// Main error type
#[derive(Error, Debug)]
pub enum PfError {
    /// The handle has no structure to operate on (e.g. listing a single document).
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Provider error ({authority}): {message}")]
    Provider { authority: String, message: String },

    #[error("Column error: {0}")]
    Column(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl PfError {
    pub fn unsupported(operation: impl Into<String>) -> Self {
        PfError::Unsupported(operation.into())
    }

    pub fn provider(authority: impl Into<String>, message: impl Into<String>) -> Self {
        PfError::Provider {
            authority: authority.into(),
            message: message.into(),
        }
    }

    /// Contract violations, as opposed to runtime conditions.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, PfError::Unsupported(_))
    }

    /// Failures that handle operations fold into `false`/`None`/`0`.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PfError::NotFound(_)
                | PfError::AlreadyExists(_)
                | PfError::PermissionDenied(_)
                | PfError::Provider { .. }
                | PfError::Column(_)
                | PfError::Io(_)
        )
    }
}
