//! Command dispatch: bridges CLI args -> Board operations -> output formatting.

pub mod board;
pub mod config_cmd;
pub mod demo;

use flowboard_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Load configuration from `--config` (or the default path) plus environment.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = match &global.config {
        Some(path) => flowboard_config::load_config_from(path)?,
        None => flowboard_config::load_config()?,
    };
    Ok(cfg)
}

/// Dispatch a board-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Demo(args) => demo::handle(args, cfg, global).await,
        Command::Board => board::handle(&cfg, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
