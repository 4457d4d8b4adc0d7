//! Runs the retrograde solver end to end and writes the resulting
//! probability database to disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{AdaptiveFormat, Logger, WriteMode};
use rogour::prelude::*;

#[derive(Clone, Debug, Parser)]
#[command(about = "Solve the Royal Game of Ur to an exact win-probability database")]
struct SolveOptions {
    #[arg(short, long)]
    log_level: Option<String>,

    /// Where to write the finished database.
    #[arg(short, long, default_value = "rogour.db")]
    output: PathBuf,

    /// Use 2-byte (quantized) entries instead of 4-byte exact entries.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Convergence tolerance for each stratum's fixed-point sweep.
    #[arg(short, long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Resume from an existing database at `--output` rather than starting
    /// from an empty one. Strata already solved in a prior run are
    /// re-swept to the same fixed point, which is cheap once converged.
    #[arg(long, default_value_t = false)]
    resume: bool,

    /// Write the database to `--output` after every stratum instead of only
    /// at the end, so a killed run can `--resume` near where it left off.
    #[arg(long, default_value_t = false)]
    checkpoint: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let options = SolveOptions::parse();
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

    let width = if options.compact {
        Width::TwoBytes
    } else {
        Width::FourBytes
    };

    let mut db = if options.resume {
        log::info!("resuming from {}", options.output.display());
        ProbDb::load(&options.output)
            .with_context(|| format!("loading {}", options.output.display()))?
    } else {
        ProbDb::new_empty(width)
    };

    solve(&mut db, options.tolerance, |db, report| {
        log::info!(
            "stratum ({},{}) converged: {} pairs, {} rounds, max_error={:.3e}",
            report.g_off,
            report.r_off,
            report.pairs,
            report.rounds,
            report.final_max_error
        );
        if options.checkpoint {
            if let Err(e) = db.save(&options.output) {
                log::error!("checkpoint save failed: {e}");
            }
        }
    });

    db.save(&options.output)
        .with_context(|| format!("writing {}", options.output.display()))?;
    log::info!("wrote {}", options.output.display());
    Ok(())
}
