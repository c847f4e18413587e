//! Error types for promptvault operations.
//!
//! Provides a structured error hierarchy with error codes for programmatic
//! handling. Every mutating operation either fully succeeds or fails with one
//! of these errors while leaving stored state untouched.

use thiserror::Error;

/// Result type alias for promptvault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Main error type for all promptvault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        field: Option<String>,
    },

    /// Prompt or version not found.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        entity_id: Option<String>,
    },

    /// A referenced version does not belong to the given prompt.
    #[error("Invalid reference: {message}")]
    InvalidReference { message: String, code: ErrorCode },

    /// A storage transaction failed mid-mutation and was rolled back.
    #[error("Transaction error: {message}")]
    Transaction {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValEmptyField,

    // Entities (PRM_xxx / VER_xxx)
    PromptNotFound,
    VersionNotFound,
    VersionWrongPrompt,

    // Transactions (TXN_xxx)
    TxnAborted,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptyField => "VAL_002",
            ErrorCode::PromptNotFound => "PRM_001",
            ErrorCode::VersionNotFound => "VER_001",
            ErrorCode::VersionWrongPrompt => "VER_002",
            ErrorCode::TxnAborted => "TXN_001",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl VaultError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            field: None,
        }
    }

    /// Create a validation error for a required field that is missing or empty.
    pub fn empty_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Validation {
            message: format!("Field '{}' must not be empty", field),
            code: ErrorCode::ValEmptyField,
            field: Some(field),
        }
    }

    /// Create a not found error for a prompt id.
    pub fn prompt_not_found(prompt_id: impl Into<String>) -> Self {
        let id = prompt_id.into();
        Self::NotFound {
            message: format!("Prompt with id '{}' not found", id),
            code: ErrorCode::PromptNotFound,
            entity_id: Some(id),
        }
    }

    /// Create a not found error for a version id.
    pub fn version_not_found(version_id: impl Into<String>) -> Self {
        let id = version_id.into();
        Self::NotFound {
            message: format!("Version with id '{}' not found", id),
            code: ErrorCode::VersionNotFound,
            entity_id: Some(id),
        }
    }

    /// Create an invalid reference error for a version owned by another prompt.
    pub fn wrong_prompt(version_id: impl Into<String>, prompt_id: impl Into<String>) -> Self {
        Self::InvalidReference {
            message: format!(
                "Version '{}' does not belong to prompt '{}'",
                version_id.into(),
                prompt_id.into()
            ),
            code: ErrorCode::VersionWrongPrompt,
        }
    }

    /// Create a transaction error.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
            code: ErrorCode::TxnAborted,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::InvalidReference { code, .. } => *code,
            Self::Transaction { code, .. } => *code,
            Self::Database { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
