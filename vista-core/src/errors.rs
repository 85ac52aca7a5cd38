//! Error types shared across Vista crates.

use thiserror::Error;

/// Errors produced by a search capability.
///
/// The coordinator never lets these escape to the view: they are turned into
/// `Status::Error` plus the string returned by [`SearchError::user_message`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Provider credentials are missing or still set to a placeholder.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The request never produced a usable HTTP response.
    #[error("Network error: {reason}")]
    Transport { reason: String },

    /// The provider answered with an error payload or non-success status.
    #[error("Provider error: {reason}")]
    Provider { reason: String },

    /// The response body could not be decoded.
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl SearchError {
    /// Returns a message suitable for display next to the results.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Configuration { reason } => reason.clone(),
            SearchError::Transport { .. } => {
                "Failed to fetch results. Check your connection and try again.".to_string()
            }
            SearchError::Provider { reason } => reason.clone(),
            SearchError::Parse { .. } => {
                "Received an unexpected response from the data provider.".to_string()
            }
        }
    }

    /// Configuration problems cannot be fixed by retrying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SearchError::Configuration { .. })
    }
}

/// Errors returned by a coordinator handle.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Search coordinator has shut down")]
    Shutdown,
}

/// Top-level errors that can bubble up from any Vista subsystem.
#[derive(Debug, Error)]
pub enum VistaError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Server error: {reason}")]
    Server { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VistaError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            VistaError::Configuration { reason } => reason.clone(),
            VistaError::Search(e) => e.user_message(),
            VistaError::Coordinator(_) => "Search was stopped".to_string(),
            VistaError::Server { reason } => format!("Server error: {reason}"),
            VistaError::Io(_) => "File system or network error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user-supplied configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            VistaError::Configuration { .. }
                | VistaError::Search(SearchError::Configuration { .. })
        )
    }
}
