//! Scenario runner: drives a preset simulation and logs the final summary.
//!
//! Usage: `surgesim [bays|grid]`. `bays` runs the elastic loading-bay
//! scenario, `grid` the degrading processing-grid scenario.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use surgepool::builders::CoordinatorBuilder;
use surgepool::config::SimConfig;
use surgepool::core::{AppResult, RunSummary};
use surgepool::infra::stimulus::{TieredStimulus, UniformStimulus};
use surgepool::util::telemetry::init_tracing;

fn main() -> ExitCode {
    init_tracing();
    let scenario = std::env::args().nth(1).unwrap_or_else(|| "bays".into());
    let outcome = match scenario.as_str() {
        "bays" => run_loading_bays(),
        "grid" => run_degrading_grid(),
        other => {
            eprintln!("unknown scenario `{other}`; expected `bays` or `grid`");
            return ExitCode::FAILURE;
        }
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}

/// Ten arrivals on a fixed half-second cadence compete for five loading
/// bays; long service times build a backlog that exercises expansion,
/// contraction, and the accelerated catch-up mode.
fn run_loading_bays() -> AppResult<()> {
    let summary = CoordinatorBuilder::new(SimConfig::loading_bays())
        .with_stimulus(Arc::new(UniformStimulus::new((500, 500), (3000, 6000), 0)))
        .build()?
        .run();
    report(&summary);
    Ok(())
}

/// Six sources feed a priority queue over three processing units; each
/// service carries a small chance of breaking its unit for good.
fn run_degrading_grid() -> AppResult<()> {
    let summary = CoordinatorBuilder::new(SimConfig::degrading_grid())
        .with_stimulus(Arc::new(TieredStimulus::new(
            (100, 300),
            Duration::from_millis(100),
            Duration::from_millis(200),
            2,
            5000,
        )))
        .build()?
        .run();
    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    let broken = &summary.broken;
    tracing::info!(
        run_id = %summary.run_id,
        completed = summary.completed,
        dropped = summary.dropped,
        aborted = summary.aborted,
        ?broken,
        healthy_remaining = summary.healthy_remaining,
        halted = summary.halted,
        elapsed = ?summary.elapsed,
        "final summary"
    );
}
