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
    eval::config::EvaluatorConfig,
    model::{
        index::{BlockIndex, MachineIndex},
        ledger::RoleWorkLedger,
        operational::{OperationalProblem, WORK_EPSILON},
    },
    schedule::Schedule,
};
use fhops_model::prelude::{Day, ObjectiveWeights};
use serde::Serialize;

/// Weight of unfinished work relative to finished work.
pub const LEFTOVER_FACTOR: f64 = 5.0;
/// Share of the production weight paid per unit produced.
pub const PRODUCTION_CREDIT: f64 = 0.1;

/// The terms behind one objective value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub production_total: f64,
    pub completion_bonus: f64,
    pub leftover_total: f64,
    pub mobilisation_total: f64,
    pub transition_count: u64,
    pub landing_slack_total: f64,
    pub penalty_total: f64,
    pub completed_blocks: usize,
    pub objective: f64,
}

impl ScoreBreakdown {
    fn finish(mut self, w: &ObjectiveWeights) -> Self {
        self.objective = w.production * (self.completion_bonus - LEFTOVER_FACTOR * self.leftover_total)
            + w.production * PRODUCTION_CREDIT * self.production_total
            - w.mobilisation * self.mobilisation_total
            - w.transitions * self.transition_count as f64
            - w.landing_slack * self.landing_slack_total
            - self.penalty_total;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Locked(BlockIndex),
    Free(BlockIndex),
    Idle,
}

/// Repairs a schedule while scoring it.
///
/// Shifts are walked in day-major order and machines in scenario order. Each
/// slot resolves to its lock, to the block the machine is still busy with,
/// to the planned block when that is workable, or to the best alternate.
/// The resolved value is what gets scored.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEvaluator<'a> {
    problem: &'a OperationalProblem<'a>,
    config: EvaluatorConfig,
}

impl<'a> ScheduleEvaluator<'a> {
    #[inline]
    pub fn new(problem: &'a OperationalProblem<'a>, config: EvaluatorConfig) -> Self {
        Self { problem, config }
    }

    #[inline]
    pub fn problem(&self) -> &'a OperationalProblem<'a> {
        self.problem
    }

    #[inline]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Repairs `schedule` in place and returns its objective.
    #[inline]
    pub fn evaluate_schedule(&self, schedule: &mut Schedule) -> f64 {
        self.walk(schedule).objective
    }

    #[inline]
    pub fn repair(&self, schedule: &Schedule) -> Schedule {
        let mut repaired = schedule.clone();
        self.walk(&mut repaired);
        repaired
    }

    #[inline]
    pub fn score(&self, schedule: &Schedule) -> f64 {
        self.breakdown(schedule).objective
    }

    #[inline]
    pub fn breakdown(&self, schedule: &Schedule) -> ScoreBreakdown {
        let mut scratch = schedule.clone();
        self.walk(&mut scratch)
    }

    fn workable(&self, ledger: &RoleWorkLedger, m: MachineIndex, b: BlockIndex, day: Day) -> bool {
        let op = self.problem;
        op.can_work(m, b)
            && op.window_contains(b, day)
            && op.prerequisite_allowance(ledger, b, op.machine_role(m)) > WORK_EPSILON
    }

    /// Best workable stand-in for an infeasible planned block. Blocks the
    /// plan does not mention anywhere come first, then higher rates.
    fn alternate(
        &self,
        ledger: &RoleWorkLedger,
        usage: &[u32],
        refs: &[u32],
        m: MachineIndex,
        day: Day,
        slack_priced: bool,
    ) -> Option<BlockIndex> {
        let op = self.problem;
        let mut best: Option<(bool, f64, BlockIndex)> = None;
        for b in op.block_indices() {
            let l = op.landing_of(b);
            if !slack_priced && usage[l.get()] >= op.landing_capacity(l) {
                continue;
            }
            if !self.workable(ledger, m, b, day) {
                continue;
            }
            let fresh = refs[b.get()] == 0;
            let rate = op.rate(m, b);
            let better = match best {
                None => true,
                Some((best_fresh, best_rate, _)) => {
                    (fresh && !best_fresh) || (fresh == best_fresh && rate > best_rate)
                }
            };
            if better {
                best = Some((fresh, rate, b));
            }
        }
        best.map(|(_, _, b)| b)
    }

    fn walk(&self, schedule: &mut Schedule) -> ScoreBreakdown {
        let op = self.problem;
        let cfg = &self.config;
        let slack_priced = op.weights().prices_landing_slack();

        let mut ledger = op.new_ledger();
        let mut usage = vec![0u32; op.landings_len()];
        let mut prev: Vec<Option<BlockIndex>> = vec![None; op.machines_len()];
        let mut refs = vec![0u32; op.blocks_len()];
        for (_, _, b) in schedule.assigned() {
            refs[b.get()] += 1;
        }
        let mut out = ScoreBreakdown::default();

        for s in op.shift_indices() {
            usage.fill(0);
            let day = op.shift_day(s);

            for m in op.machine_indices() {
                let stated = schedule.get(m, s);
                let role = op.machine_role(m);

                let resolved = if let Some(locked) = op.locked_block(m, day) {
                    if stated != Some(locked) {
                        out.penalty_total += cfg.lock_mismatch_penalty;
                        tracing::warn!(
                            machine = %op.machine_id(m),
                            slot = %op.shift_slot(s),
                            "schedule disagrees with a lock"
                        );
                    }
                    Resolved::Locked(locked)
                } else if !op.slot_open(m, s) {
                    if stated.is_some() {
                        out.penalty_total += cfg.unavailable_penalty;
                    }
                    prev[m.get()] = None;
                    Resolved::Idle
                } else if let Some(p) = prev[m.get()]
                    && self.workable(&ledger, m, p, day)
                {
                    Resolved::Free(p)
                } else {
                    match stated {
                        Some(b) if self.workable(&ledger, m, b, day) => Resolved::Free(b),
                        Some(_) => self
                            .alternate(&ledger, &usage, &refs, m, day, slack_priced)
                            .map_or(Resolved::Idle, Resolved::Free),
                        None => Resolved::Idle,
                    }
                };

                let block = match resolved {
                    Resolved::Idle => None,
                    Resolved::Locked(b) | Resolved::Free(b) => {
                        let l = op.landing_of(b);
                        if usage[l.get()] < op.landing_capacity(l) {
                            Some(b)
                        } else if slack_priced {
                            out.landing_slack_total += 1.0;
                            Some(b)
                        } else {
                            out.penalty_total += cfg.landing_overflow_penalty;
                            matches!(resolved, Resolved::Locked(_)).then_some(b)
                        }
                    }
                };

                if let Some(b) = block {
                    let allowance = op.prerequisite_allowance(&ledger, b, role);
                    if matches!(resolved, Resolved::Locked(_))
                        && allowance <= WORK_EPSILON
                        && !op.prereq_roles(b, role).is_empty()
                        && op.role_remaining(&ledger, b, role) > WORK_EPSILON
                    {
                        out.penalty_total += cfg.prerequisite_penalty;
                    }
                    let amount = op.rate(m, b).max(0.0).min(allowance);
                    ledger.record(b, op.work_key(b, role), amount);
                    out.production_total += amount;
                    usage[op.landing_of(b).get()] += 1;

                    if let Some(p) = prev[m.get()]
                        && p != b
                    {
                        out.transition_count += 1;
                        out.mobilisation_total += op.transition_cost(m, p, b);
                    }
                    prev[m.get()] = Some(b);
                }

                if block != stated {
                    if let Some(old) = stated {
                        refs[old.get()] = refs[old.get()].saturating_sub(1);
                    }
                    if let Some(new) = block {
                        refs[new.get()] += 1;
                    }
                    schedule.set(m, s, block);
                }
            }
        }

        for b in op.block_indices() {
            let remaining = op.block_remaining(&ledger, b);
            if remaining <= WORK_EPSILON {
                out.completion_bonus += op.work_required(b);
                out.completed_blocks += 1;
            } else {
                out.leftover_total += remaining;
            }
        }

        out.finish(op.weights())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::index::ShiftIndex;
    use fhops_model::prelude::*;

    const EPS: f64 = 1e-9;

    fn single(work: f64, rate: f64, days: Day, window: (Day, Day)) -> Problem {
        let mut b = ScenarioBuilder::new("single", days)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([Block::new("B1", "L1", work, window.0, window.1)]);
        b.add_rate(ProductionRate::new("M1", "B1", rate));
        Problem::new(b.build().unwrap()).unwrap()
    }

    fn cell(m: usize, s: usize) -> (MachineIndex, ShiftIndex) {
        (MachineIndex(m), ShiftIndex(s))
    }

    #[test]
    fn test_completed_block_scores_bonus_and_credit() {
        let p = single(10.0, 4.0, 3, (1, 3));
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        for d in 0..3 {
            let (m, sh) = cell(0, d);
            s.set(m, sh, Some(BlockIndex(0)));
        }
        let bd = ev.breakdown(&s);
        assert!((bd.production_total - 10.0).abs() < EPS);
        assert_eq!(bd.completed_blocks, 1);
        assert!((bd.objective - 11.0).abs() < EPS);
        assert_eq!(bd.transition_count, 0);
    }

    #[test]
    fn test_machine_continues_unfinished_block() {
        let p = single(10.0, 4.0, 3, (1, 3));
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let score = ev.evaluate_schedule(&mut s);
        assert!((score - 11.0).abs() < EPS);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(2)), Some(BlockIndex(0)));
    }

    #[test]
    fn test_unfinished_block_charged_leftover() {
        let p = single(10.0, 4.0, 2, (1, 1));
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let bd = ev.breakdown(&s);
        assert!((bd.leftover_total - 6.0).abs() < EPS);
        assert!((bd.objective - (-30.0 + 0.4)).abs() < EPS);
    }

    #[test]
    fn test_untouched_block_charged_full_leftover() {
        let mut b = ScenarioBuilder::new("idle", 1)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([
                Block::new("B1", "L1", 5.0, 1, 1),
                Block::new("B2", "L1", 10.0, 1, 1),
            ]);
        b.add_rate(ProductionRate::new("M1", "B1", 5.0));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.completed_blocks, 1);
        assert!((bd.leftover_total - 10.0).abs() < EPS);
        assert!((bd.objective - (5.0 - 50.0 + 0.5)).abs() < EPS);

        // an empty plan owes the full quota of every block
        let idle = Schedule::empty_for(&op);
        assert!((ev.breakdown(&idle).leftover_total - 15.0).abs() < EPS);
    }

    #[test]
    fn test_window_violation_released() {
        let p = single(10.0, 4.0, 2, (2, 2));
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let repaired = ev.repair(&s);
        assert_eq!(repaired.get(MachineIndex(0), ShiftIndex(0)), None);
        // score and breakdown leave the input alone
        let _ = ev.score(&s);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(0)));
    }

    #[test]
    fn test_lock_forced_and_mismatch_penalised() {
        let mut b = ScenarioBuilder::new("lock", 2)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([
                Block::new("B1", "L1", 4.0, 1, 2),
                Block::new("B2", "L1", 4.0, 1, 2),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 4.0),
            ProductionRate::new("M1", "B2", 4.0),
        ]);
        b.add_lock(ScheduleLock::new("M1", 1, "B1"));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());

        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(1)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.penalty_total, 1000.0);
        ev.evaluate_schedule(&mut s);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(0)));

        let mut clean = Schedule::empty_for(&op);
        clean.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        assert_eq!(ev.breakdown(&clean).penalty_total, 0.0);
    }

    #[test]
    fn test_unavailable_slot_penalised_only_when_planned() {
        let mut b = ScenarioBuilder::new("cal", 2)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([Block::new("B1", "L1", 4.0, 1, 2)]);
        b.add_rate(ProductionRate::new("M1", "B1", 4.0));
        b.add_calendar(CalendarEntry::new("M1", 1, false));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());

        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.penalty_total, 1000.0);
        assert_eq!(bd.production_total, 0.0);
        assert_eq!(ev.repair(&s).get(MachineIndex(0), ShiftIndex(0)), None);

        let idle = Schedule::empty_for(&op);
        assert_eq!(ev.breakdown(&idle).penalty_total, 0.0);

        let custom = ScheduleEvaluator::new(&op, EvaluatorConfig::default().with_unavailable_penalty(0.0));
        assert_eq!(custom.breakdown(&s).penalty_total, 0.0);
    }

    #[test]
    fn test_mobilisation_and_transitions() {
        let mut b = ScenarioBuilder::new("mob", 2)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([
                Block::new("B1", "L1", 5.0, 1, 2),
                Block::new("B2", "L1", 5.0, 1, 2),
            ])
            .with_objective_weights(ObjectiveWeights::default().with_transitions(2.0))
            .with_mobilisation(
                MobilisationConfig::new()
                    .with_machine(
                        MachineMobilisation::new("M1")
                            .with_walk(1.0, 100.0)
                            .with_move_cost_flat(500.0)
                            .with_setup_cost(10.0),
                    )
                    .with_distance(BlockDistance::new("B1", "B2", 50.0)),
            );
        b.extend_rates([
            ProductionRate::new("M1", "B1", 5.0),
            ProductionRate::new("M1", "B2", 5.0),
        ]);
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        s.set(MachineIndex(0), ShiftIndex(1), Some(BlockIndex(1)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.transition_count, 1);
        assert!((bd.mobilisation_total - 60.0).abs() < EPS);
        assert!((bd.objective - (10.0 + 1.0 - 60.0 - 2.0)).abs() < EPS);
    }

    fn crowded(slack_weight: f64) -> Problem {
        let mut b = ScenarioBuilder::new("crowd", 1)
            .with_machines([Machine::new("M1", "X"), Machine::new("M2", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([Block::new("B1", "L1", 100.0, 1, 1)])
            .with_objective_weights(ObjectiveWeights::default().with_landing_slack(slack_weight));
        b.extend_rates([
            ProductionRate::new("M1", "B1", 10.0),
            ProductionRate::new("M2", "B1", 10.0),
        ]);
        Problem::new(b.build().unwrap()).unwrap()
    }

    #[test]
    fn test_landing_overflow_dropped_without_slack_weight() {
        let p = crowded(0.0);
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        s.set(MachineIndex(1), ShiftIndex(0), Some(BlockIndex(0)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.penalty_total, 1000.0);
        assert_eq!(bd.production_total, 10.0);
        assert_eq!(bd.landing_slack_total, 0.0);
        ev.evaluate_schedule(&mut s);
        assert_eq!(s.get(MachineIndex(1), ShiftIndex(0)), None);
    }

    #[test]
    fn test_landing_overflow_priced_with_slack_weight() {
        let p = crowded(0.5);
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        s.set(MachineIndex(1), ShiftIndex(0), Some(BlockIndex(0)));
        let bd = ev.breakdown(&s);
        assert_eq!(bd.penalty_total, 0.0);
        assert_eq!(bd.production_total, 20.0);
        assert_eq!(bd.landing_slack_total, 1.0);
    }

    #[test]
    fn test_downstream_role_waits_for_upstream() {
        let mut b = ScenarioBuilder::new("seq", 2)
            .with_machines([Machine::new("S", "skidder"), Machine::new("F", "feller")])
            .with_landings([Landing::new("L1", 2)])
            .with_blocks([Block::new("B1", "L1", 20.0, 1, 2).with_harvest_system("gb")]);
        b.add_harvest_system(HarvestSystem::new(
            "gb",
            [
                SystemJob::new("fell", "feller", Vec::<String>::new()),
                SystemJob::new("skid", "skidder", ["fell"]),
            ],
        ));
        b.extend_rates([
            ProductionRate::new("F", "B1", 10.0),
            ProductionRate::new("S", "B1", 8.0),
        ]);
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        for m in 0..2 {
            for d in 0..2 {
                s.set(MachineIndex(m), ShiftIndex(d), Some(BlockIndex(0)));
            }
        }
        let bd = ev.breakdown(&s);
        assert!((bd.production_total - 28.0).abs() < EPS);
        assert!((bd.leftover_total - 12.0).abs() < EPS);
        assert_eq!(bd.completed_blocks, 0);
        ev.evaluate_schedule(&mut s);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), None);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(1)), Some(BlockIndex(0)));
    }

    #[test]
    fn test_alternate_prefers_unplanned_blocks() {
        let mut b = ScenarioBuilder::new("alt", 2)
            .with_machines([Machine::new("M1", "X"), Machine::new("M2", "X")])
            .with_landings([Landing::new("L1", 3)])
            .with_blocks([
                Block::new("B1", "L1", 50.0, 2, 2),
                Block::new("B2", "L1", 50.0, 1, 2),
                Block::new("B3", "L1", 50.0, 1, 2),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 5.0),
            ProductionRate::new("M1", "B2", 5.0),
            ProductionRate::new("M1", "B3", 9.0),
            ProductionRate::new("M2", "B3", 9.0),
        ]);
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        s.set(MachineIndex(1), ShiftIndex(1), Some(BlockIndex(2)));
        ev.evaluate_schedule(&mut s);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(1)));
    }
}
