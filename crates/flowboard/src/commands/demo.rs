//! Scripted demo session: log in, fire concurrent mutations, show outcomes.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

use flowboard_api::RemoteSimulator;
use flowboard_config::Config;
use flowboard_core::{Board, BoardSnapshot, ItemId, Notification, Stage};

use crate::cli::{DemoArgs, GlobalOpts, OutputFormat};
use crate::commands::board;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct DemoReport {
    notifications: Vec<Notification>,
    board: BoardSnapshot,
}

pub async fn handle(args: DemoArgs, mut cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(latency) = args.latency_ms {
        cfg.remote.latency_ms = latency;
    }
    if let Some(rate) = args.failure_rate {
        cfg.remote.failure_rate = rate;
    }
    if let Some(seed) = args.seed {
        cfg.remote.rng_seed = Some(seed);
    }

    let remote = RemoteSimulator::new(cfg.simulator_config()?)?;
    let board = Board::new(cfg.board_config()?, remote)?;
    let session = board.login(&args.identity)?;
    info!(identity = %session.identity, "demo session started");

    let live = global.output == OutputFormat::Table && !global.quiet;
    let color = output::should_color(global.color);
    let printer = tokio::spawn(collect(board.notifications(), live, color));

    let first = ItemId::from("1");
    let second = ItemId::from("2");
    let third = ItemId::from("3");
    let (a, b, c, d, e) = tokio::join!(
        board.create("Write release notes"),
        board.create("Review pull request"),
        board.move_item(&first, Stage::InProgress),
        board.rename(&second, "Set up CI pipeline"),
        board.remove(&third),
    );
    let results = [a, b, c, d, e];
    let settled = results
        .iter()
        .filter(|r| matches!(r, Ok(s) if s.is_settled()))
        .count();
    debug!(settled, "demo mutations finished");

    let snapshot = board.snapshot();
    // Dropping the board closes the notification channel and ends the printer.
    drop(board);
    let notifications = printer.await.unwrap_or_default();

    for result in results {
        if let Err(e) = result {
            return Err(e.into());
        }
    }

    let out = if global.output == OutputFormat::Table {
        board::render(&snapshot, global)?
    } else {
        let report = DemoReport {
            notifications,
            board: snapshot,
        };
        output::render_json(&report, global.output == OutputFormat::JsonCompact)?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Drain notifications until the board goes away, printing them if `live`.
async fn collect(
    mut rx: broadcast::Receiver<Notification>,
    live: bool,
    color: bool,
) -> Vec<Notification> {
    let mut seen = Vec::new();
    loop {
        match rx.recv().await {
            Ok(n) => {
                if live {
                    output::print_output(&output::notification_line(&n, color), false);
                }
                seen.push(n);
            }
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "notification printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
    seen
}
