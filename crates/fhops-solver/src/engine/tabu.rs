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
        config::TabuConfig,
        err::ConfigError,
        pool::{ScoredCandidate, ScoringPool},
        result::{Algorithm, RunMeta, SolveResult},
        telemetry::{Progress, SolveHooks},
    },
    eval::evaluator::{ScheduleEvaluator, ScoreBreakdown},
    greedy::init_greedy_schedule,
    model::operational::OperationalProblem,
    operators::{OperatorContext, neighbors::generate_neighbors, stats::OperatorStatsTable},
    schedule::{MoveDiff, Schedule},
};
use fhops_model::prelude::Problem;
use fxhash::FxHashSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{collections::VecDeque, time::Instant};

/// Sorted slot differences between the current schedule and a candidate.
pub type MoveSignature = Vec<MoveDiff>;

/// Fixed-length FIFO of recent move signatures with O(1) membership.
#[derive(Debug, Clone)]
pub struct TabuList {
    tenure: usize,
    queue: VecDeque<MoveSignature>,
    members: FxHashSet<MoveSignature>,
}

impl TabuList {
    pub fn new(tenure: usize) -> Self {
        let tenure = tenure.max(1);
        Self {
            tenure,
            queue: VecDeque::with_capacity(tenure),
            members: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn tenure(&self) -> usize {
        self.tenure
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn contains(&self, signature: &MoveSignature) -> bool {
        self.members.contains(signature)
    }

    pub fn push(&mut self, signature: MoveSignature) {
        if self.members.contains(&signature) {
            return;
        }
        while self.queue.len() >= self.tenure {
            self.evict_oldest();
        }
        self.members.insert(signature.clone());
        self.queue.push_back(signature);
    }

    pub fn evict_oldest(&mut self) -> Option<MoveSignature> {
        let old = self.queue.pop_front()?;
        self.members.remove(&old);
        Some(old)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.members.clear();
    }
}

/// Index of the highest objective among `items` that pass `admit`. Ties go
/// to the earliest candidate.
fn best_index<F>(items: &[(ScoredCandidate, MoveSignature)], mut admit: F) -> Option<usize>
where
    F: FnMut(&ScoredCandidate, &MoveSignature) -> bool,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, (cand, sig)) in items.iter().enumerate() {
        if !admit(cand, sig) {
            continue;
        }
        if best.is_none_or(|(_, obj)| cand.objective > obj) {
            best = Some((i, cand.objective));
        }
    }
    best.map(|(i, _)| i)
}

/// Best non-tabu candidate, or a tabu one that beats `best_score`. When
/// every candidate is tabu and none aspirates, the oldest entry is evicted
/// and the best candidate is taken anyway.
fn select_move(
    entries: &[(ScoredCandidate, MoveSignature)],
    tabu: &mut TabuList,
    best_score: f64,
) -> Option<usize> {
    let admissible = best_index(entries, |c, sig| {
        !tabu.contains(sig) || c.objective > best_score
    });
    match admissible {
        Some(i) => Some(i),
        None if !entries.is_empty() => {
            tabu.evict_oldest();
            best_index(entries, |_, _| true)
        }
        None => None,
    }
}

fn signed(current: &Schedule, scored: Vec<ScoredCandidate>) -> Vec<(ScoredCandidate, MoveSignature)> {
    scored
        .into_iter()
        .filter_map(|c| {
            let sig = current.diff(&c.schedule);
            (!sig.is_empty()).then_some((c, sig))
        })
        .collect()
}

/// Tabu search from the greedy seed.
pub fn solve_tabu(problem: &Problem, config: &TabuConfig) -> Result<SolveResult, ConfigError> {
    solve_tabu_with(problem, config, SolveHooks::default())
}

#[tracing::instrument(
    level = "debug",
    name = "Tabu Search",
    skip(problem, config, hooks),
    fields(scenario = %problem.scenario().name(), iters = config.iters, seed = config.seed)
)]
pub fn solve_tabu_with(
    problem: &Problem,
    config: &TabuConfig,
    hooks: SolveHooks<'_>,
) -> Result<SolveResult, ConfigError> {
    config.validate()?;
    let started = Instant::now();

    let op = OperationalProblem::new(problem);
    let profile = config.selection.wants_profile(&op);
    let registry = config.selection.build_registry::<ChaCha8Rng>(&op)?;

    let evaluator = ScheduleEvaluator::new(&op, config.evaluator);
    let sanitizer = op.build_sanitizer();
    let pool = ScoringPool::new(config.max_workers, config.batch_size);
    let stall_limit = config.effective_stall_limit();
    let mut tabu = TabuList::new(config.effective_tenure(op.machines_len()));
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut stats = OperatorStatsTable::new();
    let mut progress = Progress::new(Algorithm::Tabu, hooks, config.telemetry_interval);

    tracing::debug!(%config, profile, tenure = tabu.tenure(), "starting tabu search");

    let mut current = init_greedy_schedule(&op);
    let mut current_score = evaluator.evaluate_schedule(&mut current);
    let initial_objective = current_score;
    let mut best = current.clone();
    let mut best_score = current_score;
    let mut stall = 0usize;

    for iteration in 1..=config.iters {
        let ctx = OperatorContext::new(&op, &current, &sanitizer, &config.tuning);
        let candidates =
            generate_neighbors(&ctx, &registry, &mut rng, &mut stats, Some(config.batch_size));
        let mut entries = signed(&current, pool.score(&evaluator, candidates));

        let chosen = select_move(&entries, &mut tabu, best_score);

        let mut improved = false;
        if let Some(i) = chosen {
            for (j, (c, _)) in entries.iter().enumerate() {
                stats.record_outcome(c.operator, i == j);
            }
            let (cand, sig) = entries.swap_remove(i);
            tabu.push(sig);
            current = cand.schedule;
            current_score = cand.objective;
            progress.accepted += 1;
            progress.last_operator = Some(cand.operator);
            if current_score > best_score {
                best = current.clone();
                best_score = current_score;
                improved = true;
            }
        }

        if improved {
            stall = 0;
        } else {
            stall += 1;
        }

        if stall >= stall_limit {
            current = init_greedy_schedule(&op);
            current_score = evaluator.evaluate_schedule(&mut current);
            tabu.clear();
            stall = 0;
            progress.restarts += 1;
            tracing::debug!(iteration, objective = current_score, "restarting from greedy seed");
        }

        progress.step(iteration, current_score, best_score, None);
    }

    let meta = RunMeta {
        algorithm: Algorithm::Tabu,
        iterations: config.iters,
        seed: config.seed,
        initial_objective,
        best_objective: best_score,
        accepted_moves: 0,
        acceptance_rate: 0.0,
        restarts: 0,
        batch_size: config.batch_size,
        workers: pool.workers(),
        final_temperature: None,
        tenure: Some(tabu.tenure()),
        profile: profile.then_some("mobilisation"),
        shake_boosts: 0,
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
        model::index::{BlockIndex, MachineIndex, ShiftIndex},
    };

    fn sig(m: usize, s: usize) -> MoveSignature {
        vec![MoveDiff {
            machine: MachineIndex(m),
            shift: ShiftIndex(s),
            old: None,
            new: Some(BlockIndex(0)),
        }]
    }

    #[test]
    fn test_tabu_list_is_bounded_fifo() {
        let mut t = TabuList::new(2);
        t.push(sig(0, 0));
        t.push(sig(0, 1));
        t.push(sig(0, 2));
        assert_eq!(t.len(), 2);
        assert!(!t.contains(&sig(0, 0)));
        assert!(t.contains(&sig(0, 2)));
        assert_eq!(t.evict_oldest(), Some(sig(0, 1)));
        assert!(!t.contains(&sig(0, 1)));
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn test_duplicate_push_keeps_one_entry() {
        let mut t = TabuList::new(3);
        t.push(sig(1, 1));
        t.push(sig(1, 1));
        assert_eq!(t.len(), 1);
    }

    fn entries(objectives: &[f64]) -> Vec<(ScoredCandidate, MoveSignature)> {
        let p = testing::mixed();
        let op = OperationalProblem::new(&p);
        objectives
            .iter()
            .enumerate()
            .map(|(i, &objective)| {
                let cand = ScoredCandidate {
                    operator: "swap",
                    schedule: Schedule::empty_for(&op),
                    objective,
                };
                (cand, sig(i, 0))
            })
            .collect()
    }

    #[test]
    fn test_select_skips_tabu_candidate() {
        let items = entries(&[5.0, 3.0]);
        let mut t = TabuList::new(4);
        t.push(sig(0, 0));
        assert_eq!(select_move(&items, &mut t, 10.0), Some(1));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_tabu_candidate_aspirates_past_best() {
        let items = entries(&[12.0, 3.0]);
        let mut t = TabuList::new(4);
        t.push(sig(0, 0));
        assert_eq!(select_move(&items, &mut t, 10.0), Some(0));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_all_tabu_evicts_oldest_and_takes_best() {
        let items = entries(&[4.0, 7.0, 6.0]);
        let mut t = TabuList::new(4);
        t.push(sig(0, 0));
        t.push(sig(1, 0));
        t.push(sig(2, 0));
        assert_eq!(select_move(&items, &mut t, 10.0), Some(1));
        assert_eq!(t.len(), 2);
        assert!(!t.contains(&sig(0, 0)));
        assert!(t.contains(&sig(1, 0)));
    }

    #[test]
    fn test_select_on_empty_batch_leaves_list_alone() {
        let mut t = TabuList::new(2);
        t.push(sig(0, 0));
        assert_eq!(select_move(&[], &mut t, 0.0), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_same_seed_same_result() {
        let p = testing::mixed();
        let cfg = TabuConfig::new(120, 4);
        let a = solve_tabu(&p, &cfg).unwrap();
        let b = solve_tabu(&p, &cfg).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.objective, b.objective);
        assert_eq!(a.meta.tenure, Some(10));
    }

    #[test]
    fn test_best_never_decreases() {
        let p = testing::mixed();
        let mut sink = RecordingSink::default();
        let cfg = TabuConfig::new(100, 8)
            .with_batch_size(4)
            .with_telemetry_interval(1);
        let res = solve_tabu_with(&p, &cfg, SolveHooks::new().with_telemetry(&mut sink)).unwrap();
        for pair in sink.steps.windows(2) {
            assert!(pair[1].best_objective >= pair[0].best_objective);
        }
        assert!(res.objective >= res.meta.initial_objective);
        assert!(sink.steps.iter().all(|s| s.temperature.is_none()));
    }

    #[test]
    fn test_locks_and_windows_hold() {
        let p = testing::mixed();
        let res = solve_tabu(&p, &TabuConfig::new(150, 1).with_max_workers(2)).unwrap();
        let op = OperationalProblem::new(&p);
        for (m, day, b) in op.locks() {
            for s in op.shifts_of_day(day) {
                assert_eq!(res.schedule.get(m, s.into()), Some(b));
            }
        }
        for (m, s, b) in res.schedule.assigned() {
            if op.is_locked(m, s) {
                continue;
            }
            assert!(op.window_contains(b, op.shift_day(s)));
            assert!(op.can_work(m, b));
            assert!(op.slot_open(m, s));
        }
    }

    #[test]
    fn test_restart_clears_after_stall() {
        let p = testing::mixed();
        let res = solve_tabu(&p, &TabuConfig::new(80, 2).with_stall_limit(3)).unwrap();
        assert!(res.meta.restarts >= 1);
    }

    #[test]
    fn test_rejects_zero_batch() {
        let p = testing::mixed();
        assert!(matches!(
            solve_tabu(&p, &TabuConfig::new(10, 1).with_batch_size(0)),
            Err(ConfigError::InvalidParameter(_))
        ));
    }
}
