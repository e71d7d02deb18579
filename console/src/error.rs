//! Error handling and display for the console.

use colored::Colorize;
use thiserror::Error;

/// Console-specific errors.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Not authenticated. Run `tutorlink login` to authenticate.")]
    NotAuthenticated,

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("API error: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ConsoleError {
    /// Create an API error from response details.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The text surfaced as a notification for this failure.
    ///
    /// Validation and server messages speak for themselves; transport and
    /// decode failures use the operation's own fallback wording.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ConsoleError::SessionExpired | ConsoleError::NotAuthenticated => self.to_string(),
            ConsoleError::Api { message, .. } => message.clone(),
            ConsoleError::Validation(message) => message.clone(),
            ConsoleError::Network(_) | ConsoleError::Decode(_) | ConsoleError::Other(_) => {
                fallback.to_string()
            }
        }
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    // Check for specific error types and provide hints
    if let Some(console_err) = err.downcast_ref::<ConsoleError>() {
        match console_err {
            ConsoleError::NotAuthenticated => {
                eprintln!(
                    "\n{}",
                    "Hint: Run `tutorlink login` to authenticate.".yellow()
                );
            }
            ConsoleError::SessionExpired => {
                eprintln!(
                    "\n{}",
                    "Hint: Your session has expired. Run `tutorlink login`.".yellow()
                );
            }
            ConsoleError::Network(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check your network connection and API endpoint.".yellow()
                );
            }
            _ => {}
        }
    }
}
