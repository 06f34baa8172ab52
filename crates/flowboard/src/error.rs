//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use flowboard_config::ConfigError;
use flowboard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFLICT: i32 = 6;
    pub const REMOTE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(flowboard::validation))]
    Validation { field: String, reason: String },

    #[error("No active session")]
    #[diagnostic(
        code(flowboard::not_logged_in),
        help("Mutations require a login. Run: flowboard demo --identity <name>")
    )]
    NotLoggedIn,

    // ── Remote ───────────────────────────────────────────────────────

    #[error("Remote returned an unexpected response during {operation}")]
    #[diagnostic(
        code(flowboard::remote),
        help("The change was rolled back. Details: {message}")
    )]
    Remote { operation: String, message: String },

    // ── State ────────────────────────────────────────────────────────

    #[error("Invalid board state: {message}")]
    #[diagnostic(code(flowboard::invalid_state))]
    InvalidState { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(flowboard::config),
        help("Check the file shown by: flowboard config path")
    )]
    Config { message: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(flowboard::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(flowboard::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(flowboard::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::NotLoggedIn => exit_code::AUTH,
            Self::Remote { .. } => exit_code::REMOTE,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::NotLoggedIn => CliError::NotLoggedIn,
            CoreError::UnexpectedRemote { operation, message } => CliError::Remote {
                operation: operation.to_string(),
                message,
            },
            CoreError::InvalidState { message } => CliError::InvalidState { message },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config {
                message: e.to_string(),
            },
        }
    }
}

impl From<flowboard_api::Error> for CliError {
    fn from(err: flowboard_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
