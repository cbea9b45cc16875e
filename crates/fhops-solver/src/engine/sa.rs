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
        conclude,
        config::{SaConfig, ShakeBoost},
        err::ConfigError,
        pool::ScoringPool,
        result::{Algorithm, RunMeta, SolveResult},
        telemetry::{Progress, SolveHooks},
    },
    eval::evaluator::{ScheduleEvaluator, ScoreBreakdown},
    greedy::init_greedy_schedule,
    model::operational::OperationalProblem,
    operators::{OperatorContext, neighbors::generate_neighbors, stats::OperatorStatsTable},
};
use fhops_model::prelude::Problem;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Lowest temperature the cooling schedule reaches.
pub const MIN_TEMPERATURE: f64 = 1e-6;

const SHAKE_OPERATOR: &str = "mobilisation_shake";

/// Metropolis test for a maximisation objective. The rng is only drawn
/// for worsening moves.
#[inline]
fn metropolis<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    delta >= 0.0 || rng.random::<f64>() < (delta / temperature).exp()
}

#[inline]
pub fn initial_temperature(objective: f64) -> f64 {
    (objective / 10.0).max(1.0)
}

/// Simulated annealing from the greedy seed.
pub fn solve_sa(problem: &Problem, config: &SaConfig) -> Result<SolveResult, ConfigError> {
    solve_sa_with(problem, config, SolveHooks::default())
}

#[tracing::instrument(
    level = "debug",
    name = "SA Search",
    skip(problem, config, hooks),
    fields(scenario = %problem.scenario().name(), iters = config.iters, seed = config.seed)
)]
pub fn solve_sa_with(
    problem: &Problem,
    config: &SaConfig,
    hooks: SolveHooks<'_>,
) -> Result<SolveResult, ConfigError> {
    config.validate()?;
    let started = Instant::now();

    let op = OperationalProblem::new(problem);
    let profile = config.selection.wants_profile(&op);
    let mut registry = config.selection.build_registry::<ChaCha8Rng>(&op)?;
    let boost: Option<ShakeBoost> = config
        .shake_boost
        .or_else(|| profile.then(ShakeBoost::default));

    let evaluator = ScheduleEvaluator::new(&op, config.evaluator);
    let sanitizer = op.build_sanitizer();
    let batch = config.batch_size.unwrap_or(1);
    let pool = ScoringPool::new(config.max_workers, batch);
    let restart_interval = config.effective_restart_interval();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut stats = OperatorStatsTable::new();
    let mut progress = Progress::new(Algorithm::Sa, hooks, config.telemetry_interval);

    tracing::debug!(%config, profile, workers = pool.workers(), "starting simulated annealing");

    let mut current = init_greedy_schedule(&op);
    let mut current_score = evaluator.evaluate_schedule(&mut current);
    let initial_objective = current_score;
    let mut best = current.clone();
    let mut best_score = current_score;

    let t0 = initial_temperature(best_score);
    let mut temperature = t0;
    let mut stall = 0usize;
    let mut boosted_from: Option<f64> = None;
    let mut shake_boosts = 0u64;

    for iteration in 1..=config.iters {
        let ctx = OperatorContext::new(&op, &current, &sanitizer, &config.tuning);
        let candidates = generate_neighbors(&ctx, &registry, &mut rng, &mut stats, Some(batch));
        let scored = pool.score(&evaluator, candidates);

        let mut taken = None;
        for cand in scored {
            let accept = metropolis(cand.objective - current_score, temperature, &mut rng);
            stats.record_outcome(cand.operator, accept);
            if accept {
                taken = Some(cand);
                break;
            }
        }

        match taken {
            Some(cand) => {
                current = cand.schedule;
                current_score = cand.objective;
                progress.accepted += 1;
                progress.last_operator = Some(cand.operator);
                stall = 0;
                if current_score > best_score {
                    best = current.clone();
                    best_score = current_score;
                }
                if let Some(old) = boosted_from.take() {
                    registry.set_weight(SHAKE_OPERATOR, old)?;
                    tracing::debug!(iteration, "shake boost released");
                }
            }
            None => stall += 1,
        }

        temperature = (temperature * config.cooling_rate).max(MIN_TEMPERATURE);

        if let Some(b) = boost
            && boosted_from.is_none()
            && stall >= b.stall_threshold
            && let Some(old) = registry.scale_weight(SHAKE_OPERATOR, b.factor)
        {
            boosted_from = Some(old);
            shake_boosts += 1;
            tracing::debug!(iteration, stall, factor = b.factor, "shake boost engaged");
        }

        if stall >= restart_interval {
            current = init_greedy_schedule(&op);
            current_score = evaluator.evaluate_schedule(&mut current);
            temperature = t0;
            stall = 0;
            progress.restarts += 1;
            tracing::debug!(iteration, objective = current_score, "restarting from greedy seed");
        }

        progress.step(iteration, current_score, best_score, Some(temperature));
    }

    if let Some(old) = boosted_from.take() {
        registry.set_weight(SHAKE_OPERATOR, old)?;
    }

    let meta = RunMeta {
        algorithm: Algorithm::Sa,
        iterations: config.iters,
        seed: config.seed,
        initial_objective,
        best_objective: best_score,
        accepted_moves: 0,
        acceptance_rate: 0.0,
        restarts: 0,
        batch_size: batch,
        workers: pool.workers(),
        final_temperature: Some(temperature),
        tenure: None,
        profile: profile.then_some("mobilisation"),
        shake_boosts,
        operator_weights: registry
            .weights()
            .into_iter()
            .map(|(n, w)| (n.to_string(), w))
            .collect(),
        operator_stats: Default::default(),
        reference_objective: config.reference_objective,
        reference_gap: None,
        breakdown: ScoreBreakdown::default(),
        runtime_ms: 0.0,
    };
    Ok(conclude(&evaluator, best, meta, &stats, &mut progress, started))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{telemetry::testing::RecordingSink, testing},
        operators::testing as small,
    };
    use std::collections::HashMap;

    fn check_invariants(problem: &Problem, result: &SolveResult) {
        let op = OperationalProblem::new(problem);
        let mut per_landing: HashMap<(u32, String, usize), u32> = HashMap::new();
        for row in &result.assignments {
            let m = op.machine_index_by_name(&row.machine_id).unwrap();
            let b = op.block_index_by_name(&row.block_id).unwrap();
            let s = op.shift_index(row.day, &row.shift_id).unwrap();
            *per_landing
                .entry((row.day, row.shift_id.clone(), op.landing_of(b).get()))
                .or_default() += 1;
            if op.is_locked(m, s) {
                continue;
            }
            assert!(op.window_contains(b, row.day), "{:?} outside window", row);
            assert!(op.can_work(m, b), "{:?} not workable", row);
            assert!(op.slot_open(m, s), "{:?} in closed slot", row);
        }
        for ((_, _, l), used) in per_landing {
            assert!(used <= op.landing_capacity(l.into()));
        }
        for (m, day, b) in op.locks() {
            for s in op.shifts_of_day(day) {
                assert_eq!(result.schedule.get(m, s.into()), Some(b));
            }
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let p = testing::mixed();
        let cfg = SaConfig::new(300, 7);
        let a = solve_sa(&p, &cfg).unwrap();
        let b = solve_sa(&p, &cfg).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.objective, b.objective);
    }

    #[test]
    fn test_result_respects_hard_rules() {
        let p = testing::mixed();
        let cfg = SaConfig::new(400, 3).with_batch_size(3);
        let res = solve_sa(&p, &cfg).unwrap();
        check_invariants(&p, &res);
        assert!(res.objective >= res.meta.initial_objective);
        assert_eq!(res.meta.algorithm, Algorithm::Sa);
        assert_eq!(res.meta.batch_size, 3);
    }

    #[test]
    fn test_best_never_decreases() {
        let p = testing::mixed();
        let mut sink = RecordingSink::default();
        let cfg = SaConfig::new(200, 11).with_telemetry_interval(1);
        let res = solve_sa_with(&p, &cfg, SolveHooks::new().with_telemetry(&mut sink)).unwrap();
        assert_eq!(sink.steps.len(), 200);
        for pair in sink.steps.windows(2) {
            assert!(pair[1].best_objective >= pair[0].best_objective);
        }
        let summary = sink.summary.unwrap();
        assert_eq!(summary.best_objective, res.objective);
    }

    #[test]
    fn test_parallel_scoring_is_deterministic() {
        let p = testing::mixed();
        let seq = SaConfig::new(150, 5).with_batch_size(4);
        let par = seq.clone().with_max_workers(3);
        let a = solve_sa(&p, &seq).unwrap();
        let b = solve_sa(&p, &par).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.objective, b.objective);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let p = testing::mixed();
        let err = solve_sa(&p, &SaConfig::new(10, 1).with_cooling_rate(1.5)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter(_)));
        let err = solve_sa(&p, &SaConfig::new(10, 1).with_operators(["warp"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOperator(_)));
    }

    #[test]
    fn test_restart_after_stall() {
        // a single slot leaves no operator anything to do
        let p = small::one_machine(1, &[("B1", 1, 1)]);
        let cfg = SaConfig::new(20, 2).with_restart_interval(5);
        let res = solve_sa(&p, &cfg).unwrap();
        assert_eq!(res.meta.restarts, 4);
        assert_eq!(res.meta.accepted_moves, 0);
        check_invariants(&p, &res);
    }

    #[test]
    fn test_shake_boost_restores_weight() {
        let p = testing::mixed();
        let cfg = SaConfig::new(120, 9)
            .with_operator_weights([("mobilisation_shake", 0.5)])
            .with_shake_boost(ShakeBoost::new(2, 4.0))
            .with_cooling_rate(0.01);
        let res = solve_sa(&p, &cfg).unwrap();
        assert_eq!(res.meta.operator_weights["mobilisation_shake"], 0.5);
    }

    #[test]
    fn test_reference_gap_reported() {
        let p = testing::mixed();
        let res = solve_sa(&p, &SaConfig::new(50, 1).with_reference_objective(1_000.0)).unwrap();
        let gap = res.meta.reference_gap.unwrap();
        assert!((gap - (1_000.0 - res.objective) / 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_metropolis_accepts_improvements_without_drawing() {
        let mut a = ChaCha8Rng::seed_from_u64(1);
        let b = a.clone();
        assert!(metropolis(0.0, 1.0, &mut a));
        assert!(metropolis(3.0, 1.0, &mut a));
        assert_eq!(a, b);
        assert!(!metropolis(-1e9, MIN_TEMPERATURE, &mut a));
    }
}
