//! Independent runs evaluated in parallel.

use crate::error::{DecomError, DecomResult};
use crate::integrator::WaveSpeed;
use crate::path::Path;
use crate::problem::ProblemDefinition;
use crate::results::{ResultTable, RunSummary};
use rayon::prelude::*;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub path: Path,
    pub table: ResultTable,
}

/// Build and run one problem to completion.
pub fn run_one(problem: ProblemDefinition) -> DecomResult<RunOutcome> {
    let mut ws = WaveSpeed::new(problem)?;
    ws.run()?;
    outcome(&ws)
}

fn outcome(ws: &WaveSpeed) -> DecomResult<RunOutcome> {
    match (ws.summary(), ws.path(), ws.result_table()) {
        (Some(summary), Some(path), Some(table)) => Ok(RunOutcome {
            summary,
            path: path.clone(),
            table,
        }),
        _ => Err(DecomError::Backend {
            message: "run did not complete".into(),
        }),
    }
}

/// Run every problem on the rayon pool, each with its own backend instance.
///
/// Results are returned in input order.
pub fn run_batch(problems: Vec<ProblemDefinition>) -> Vec<DecomResult<RunOutcome>> {
    tracing::info!(runs = problems.len(), "starting batch");
    problems.into_par_iter().map(run_one).collect()
}
