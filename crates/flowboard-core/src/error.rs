// ── Core error types ──
//
// User-facing errors from flowboard-core. Simulated remote failures are
// NOT errors here: they become a rollback plus a failure notification.
// Only backend faults the simulator should never produce surface as
// `UnexpectedRemote`, after the same rollback has been applied.

use thiserror::Error;

use crate::notification::MutationKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("No active session -- log in first")]
    NotLoggedIn,

    // ── Remote errors ────────────────────────────────────────────────
    /// The remote answered with something it never should. The mutation
    /// was rolled back before this was returned.
    #[error("Unexpected remote error during {operation}: {message}")]
    UnexpectedRemote {
        operation: MutationKind,
        message: String,
    },

    // ── State errors ─────────────────────────────────────────────────
    #[error("Invalid board state: {message}")]
    InvalidState { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Errors the user caused and can correct by changing input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotLoggedIn)
    }
}

// ── Conversion from simulator errors ─────────────────────────────────

impl From<flowboard_api::Error> for CoreError {
    fn from(err: flowboard_api::Error) -> Self {
        match err {
            flowboard_api::Error::InvalidConfig { reason } => CoreError::Config { message: reason },
            flowboard_api::Error::Simulated { operation, reason } => CoreError::UnexpectedRemote {
                operation: operation.into(),
                message: reason,
            },
            flowboard_api::Error::MalformedResponse { operation, detail } => {
                CoreError::UnexpectedRemote {
                    operation: operation.into(),
                    message: detail,
                }
            }
        }
    }
}
