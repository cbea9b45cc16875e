// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::{
    engine::{
        result::{RunMeta, SolveResult, reference_gap},
        telemetry::{Progress, RunSummary},
    },
    eval::evaluator::ScheduleEvaluator,
    operators::stats::OperatorStatsTable,
    schedule::Schedule,
};
use std::time::Instant;

pub mod config;
pub mod err;
pub mod pool;
pub mod result;
pub mod sa;
pub mod tabu;
pub mod telemetry;

/// Re-scores the best schedule, completes `meta` and emits the summary.
pub(crate) fn conclude(
    evaluator: &ScheduleEvaluator<'_>,
    mut best: Schedule,
    mut meta: RunMeta,
    stats: &OperatorStatsTable,
    progress: &mut Progress<'_>,
    started: Instant,
) -> SolveResult {
    let objective = evaluator.evaluate_schedule(&mut best);
    meta.best_objective = objective;
    meta.breakdown = evaluator.breakdown(&best);
    meta.accepted_moves = progress.accepted;
    meta.restarts = progress.restarts;
    meta.acceptance_rate = progress.acceptance_rate(meta.iterations);
    meta.operator_stats = stats.snapshot();
    meta.reference_gap = meta.reference_objective.map(|r| reference_gap(r, objective));
    meta.runtime_ms = started.elapsed().as_secs_f64() * 1_000.0;

    progress.finish(&RunSummary {
        algorithm: meta.algorithm,
        iterations: meta.iterations,
        initial_objective: meta.initial_objective,
        best_objective: objective,
        acceptance_rate: meta.acceptance_rate,
        restarts: meta.restarts,
        runtime_ms: meta.runtime_ms,
        operator_stats: meta.operator_stats.clone(),
    });
    tracing::info!(
        algorithm = %meta.algorithm,
        objective,
        initial = meta.initial_objective,
        restarts = meta.restarts,
        runtime_ms = meta.runtime_ms,
        "search complete"
    );

    SolveResult {
        objective,
        assignments: best.to_assignments(evaluator.problem()),
        meta,
        schedule: best,
    }
}
