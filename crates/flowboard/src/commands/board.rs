//! Board rendering and the `board` command.

use tabled::Tabled;

use flowboard_api::RemoteSimulator;
use flowboard_config::Config;
use flowboard_core::{Board, BoardSnapshot, Stage, WorkItem};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Stage")]
    stage: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Created")]
    created_at: u64,
}

impl From<&WorkItem> for ItemRow {
    fn from(item: &WorkItem) -> Self {
        Self {
            stage: item.stage.label(),
            id: item.id.to_string(),
            title: item.title.clone(),
            created_at: item.created_at,
        }
    }
}

/// Table rows grouped by stage, in stage order.
fn rows(snapshot: &BoardSnapshot) -> Vec<ItemRow> {
    Stage::ALL
        .iter()
        .flat_map(|&stage| snapshot.stage(stage).map(ItemRow::from))
        .collect()
}

/// Render a board snapshot in the selected output format.
pub fn render(snapshot: &BoardSnapshot, global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(global.output, snapshot, || rows(snapshot))
}

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let remote = RemoteSimulator::new(cfg.simulator_config()?)?;
    let board = Board::new(cfg.board_config()?, remote)?;
    let out = render(&board.snapshot(), global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
