use thiserror::Error;

use crate::types::Operation;

/// Top-level error type for the `flowboard-api` crate.
///
/// Separates the expected, frequent simulated failures from responses the
/// backend should never produce. `flowboard-core` rolls back on both but
/// reports them differently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // ── Simulated unreliability ─────────────────────────────────────
    /// The injected failure. Expected, frequent, always recoverable.
    #[error("{operation} failed: {reason}")]
    Simulated { operation: Operation, reason: String },

    // ── Backend faults ──────────────────────────────────────────────
    /// The backend answered with something that is not a valid response.
    #[error("malformed {operation} response: {detail}")]
    MalformedResponse { operation: Operation, detail: String },

    // ── Configuration ───────────────────────────────────────────────
    #[error("invalid simulator config: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Returns `true` for the injected failures that drive ordinary rollback.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated { .. })
    }

    /// The operation the error belongs to, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Simulated { operation, .. } | Self::MalformedResponse { operation, .. } => {
                Some(*operation)
            }
            Self::InvalidConfig { .. } => None,
        }
    }
}
