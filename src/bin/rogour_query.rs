//! Looks up a single board's win probability in a saved database, given its
//! 5-character share code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{AdaptiveFormat, Logger, WriteMode};
use rogour::prelude::*;

#[derive(Clone, Debug, Parser)]
#[command(about = "Look up P(win) for a board, given a saved database and a share code")]
struct QueryOptions {
    #[arg(short, long)]
    log_level: Option<String>,

    /// Database previously written by `rogour-solve`.
    #[arg(short, long, default_value = "rogour.db")]
    database: PathBuf,

    /// 5-character board share code.
    code: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let options = QueryOptions::parse();
    let _logger = Logger::try_with_env_or_str(
        options.log_level.clone().unwrap_or_else(|| "info".into()),
    )?
    .write_mode(WriteMode::BufferAndFlush)
    .log_to_stderr()
    .adaptive_format_for_stderr(match cfg!(debug_assertions) {
        true => AdaptiveFormat::WithThread,
        false => AdaptiveFormat::Default,
    })
    .start()?;

    let db = ProbDb::load(&options.database)
        .with_context(|| format!("loading {}", options.database.display()))?;

    let board = code_to_board(&options.code)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("decoding code {:?}", options.code))?;

    log::debug!("{}", board::board_as_string(&board));

    match db.a_get(&board) {
        Some(p) => println!("{p:.6}"),
        None => {
            log::warn!("no entry for this board: was the database fully solved?");
            println!("unknown");
        }
    }
    Ok(())
}
