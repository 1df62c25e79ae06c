use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocTrackError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {action} a document in status '{status}'")]
    InvalidWorkflowTransition { action: String, status: String },

    #[error("Not allowed to {action}: {reason}")]
    UnauthorizedWorkflowAction { action: String, reason: String },

    #[error("Invalid custody action: {message}")]
    InvalidDocumentCustodyAction { message: String },

    #[error("Split needs {requested} suffixes but only {available} remain")]
    SplitCapacityExceeded { requested: usize, available: usize },

    #[error("Sequence '{scope}' exhausted for period {period}")]
    SequenceExhausted { scope: String, period: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },
}

/// 錯誤分類，用於決定回應碼與日誌等級
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Workflow,
    Permission,
    Missing,
    Internal,
}

impl DocTrackError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn transition(action: &str, status: impl ToString) -> Self {
        Self::InvalidWorkflowTransition {
            action: action.to_string(),
            status: status.to_string(),
        }
    }

    pub fn unauthorized(action: &str, reason: impl Into<String>) -> Self {
        Self::UnauthorizedWorkflowAction {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    pub fn custody(message: impl Into<String>) -> Self {
        Self::InvalidDocumentCustodyAction {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. }
            | Self::SplitCapacityExceeded { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigError { .. }
            | Self::TomlError(_) => ErrorCategory::Input,
            Self::InvalidWorkflowTransition { .. }
            | Self::InvalidDocumentCustodyAction { .. }
            | Self::Conflict { .. }
            | Self::SequenceExhausted { .. } => ErrorCategory::Workflow,
            Self::UnauthorizedWorkflowAction { .. } | Self::Unauthenticated { .. } => {
                ErrorCategory::Permission
            }
            Self::NotFound { .. } => ErrorCategory::Missing,
            Self::DatabaseError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    /// 給終端使用者看的訊息，內部錯誤不外洩細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Internal => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocTrackError>;
