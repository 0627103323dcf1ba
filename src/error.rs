//! Error types for Coach Apply.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures while sending a draft to the submission endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The request never produced a response (DNS, connect, timeout...).
    #[error("{0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status and an error message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The endpoint answered with something that isn't JSON.
    #[error("Invalid response from endpoint: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    /// Text shown to the applicant. Endpoint and transport messages pass
    /// through, anything else becomes "Submission failed".
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } if !message.is_empty() => message.clone(),
            Self::Transport(reason) if !reason.is_empty() => reason.clone(),
            _ => "Submission failed".to_string(),
        }
    }
}

/// Wizard navigation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Step index {index} out of range (0..{len})")]
    StepOutOfRange { index: usize, len: usize },
}
