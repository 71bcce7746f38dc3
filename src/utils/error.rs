use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input for {field} ({value}): {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Match {match_id} is waiting for the opponent's scores")]
    MissingCounterpart { match_id: String },

    #[error("Match day {match_day} is {status} and no longer accepts scores")]
    StateViolation { match_day: String, status: String },

    #[error("Illegal match day transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    State,
    Storage,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EngineError {
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidInput { .. } => ErrorCategory::Validation,
            EngineError::MissingCounterpart { .. }
            | EngineError::StateViolation { .. }
            | EngineError::InvalidTransition { .. } => ErrorCategory::State,
            EngineError::NotFound { .. } | EngineError::Storage { .. } => ErrorCategory::Storage,
            EngineError::ConfigError { .. } | EngineError::TomlError(_) => {
                ErrorCategory::Configuration
            }
            EngineError::IoError(_)
            | EngineError::SerializationError(_)
            | EngineError::CsvError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 對手成績尚未送出，稍後再算即可
            EngineError::MissingCounterpart { .. } => ErrorSeverity::Low,
            EngineError::StateViolation { .. } | EngineError::InvalidTransition { .. } => {
                ErrorSeverity::Medium
            }
            EngineError::InvalidInput { .. }
            | EngineError::NotFound { .. }
            | EngineError::ConfigError { .. }
            | EngineError::TomlError(_) => ErrorSeverity::High,
            EngineError::Storage { .. }
            | EngineError::IoError(_)
            | EngineError::SerializationError(_)
            | EngineError::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EngineError::InvalidInput { field, reason, .. } => {
                format!("The value for '{}' was rejected: {}", field, reason)
            }
            EngineError::MissingCounterpart { match_id } => {
                format!("Match {} cannot be scored until both players have scores", match_id)
            }
            EngineError::StateViolation { match_day, .. } => {
                format!("Match day {} is locked; its scores can no longer change", match_day)
            }
            EngineError::NotFound { entity, id } => format!("Unknown {} '{}'", entity, id),
            EngineError::ConfigError { .. } | EngineError::TomlError(_) => {
                format!("The league file could not be used: {}", self)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => {
                "Check hole counts, scores and slope ratings against the course definition"
            }
            ErrorCategory::State => {
                "Only the most recently scored match day can be corrected; earlier days are locked"
            }
            ErrorCategory::Storage => "Verify the referenced ids exist and retry the submission",
            ErrorCategory::Configuration => "Fix the league TOML file and run again",
            ErrorCategory::Io => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
