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
    model::{
        index::{BlockIndex, MachineIndex, ShiftIndex},
        ledger::RoleWorkLedger,
        operational::{OperationalProblem, WORK_EPSILON},
    },
    schedule::Schedule,
};

/// Per-shift landing usage while the seed is assembled.
struct LandingUsage {
    landings_len: usize,
    counts: Vec<u32>, // len = S * L
}

impl LandingUsage {
    fn new(problem: &OperationalProblem<'_>) -> Self {
        let landings_len = problem.landings_len();
        Self {
            landings_len,
            counts: vec![0; problem.shifts_len() * landings_len],
        }
    }

    #[inline]
    fn has_room(&self, problem: &OperationalProblem<'_>, s: ShiftIndex, b: BlockIndex) -> bool {
        let l = problem.landing_of(b);
        self.counts[s.get() * self.landings_len + l.get()] < problem.landing_capacity(l)
    }

    #[inline]
    fn add(&mut self, problem: &OperationalProblem<'_>, s: ShiftIndex, b: BlockIndex) {
        let l = problem.landing_of(b);
        self.counts[s.get() * self.landings_len + l.get()] += 1;
    }
}

struct Seed<'a, 'p> {
    problem: &'a OperationalProblem<'p>,
    schedule: Schedule,
    usage: LandingUsage,
    ledger: RoleWorkLedger,
}

impl<'a, 'p> Seed<'a, 'p> {
    fn new(problem: &'a OperationalProblem<'p>) -> Self {
        Self {
            problem,
            schedule: Schedule::empty_for(problem),
            usage: LandingUsage::new(problem),
            ledger: problem.new_ledger(),
        }
    }

    fn assign(&mut self, m: MachineIndex, s: ShiftIndex, b: BlockIndex) {
        let op = self.problem;
        self.schedule.set(m, s, Some(b));
        self.usage.add(op, s, b);
        let role = op.machine_role(m);
        self.ledger.record(b, op.work_key(b, role), op.rate(m, b));
    }

    /// Empty, open, unlocked, window-valid slot that the machine can use
    /// for `b` without overfilling the landing or the role's remaining work.
    fn admits(&self, m: MachineIndex, s: ShiftIndex, b: BlockIndex) -> bool {
        let op = self.problem;
        self.schedule.get(m, s).is_none()
            && op.slot_open(m, s)
            && !op.is_locked(m, s)
            && op.window_contains(b, op.shift_day(s))
            && op.can_work(m, b)
            && op.role_remaining(&self.ledger, b, op.machine_role(m)) > WORK_EPSILON
            && self.usage.has_room(op, s, b)
    }

    fn apply_locks(&mut self) {
        let op = self.problem;
        for (m, day, b) in op.locks() {
            for s in op.shifts_of_day(day).map(ShiftIndex) {
                self.assign(m, s, b);
            }
        }
    }

    /// Gives every untouched block its best single slot, earliest windows
    /// first.
    fn coverage_pass(&mut self) -> usize {
        let op = self.problem;
        let mut order: Vec<BlockIndex> = op.block_indices().collect();
        order.sort_by(|&a, &b| {
            op.window(a)
                .cmp(&op.window(b))
                .then_with(|| op.block_id(a).cmp(op.block_id(b)))
        });

        let mut covered = 0;
        for b in order {
            if self.schedule.contains_block(b) {
                continue;
            }
            let mut best: Option<(f64, ShiftIndex, MachineIndex)> = None;
            for s in op.shift_indices() {
                for m in op.machine_indices() {
                    if !self.admits(m, s, b) {
                        continue;
                    }
                    let rate = op.rate(m, b);
                    if best.is_none_or(|(r, _, _)| rate > r) {
                        best = Some((rate, s, m));
                    }
                }
            }
            if let Some((_, s, m)) = best {
                self.assign(m, s, b);
                covered += 1;
            }
        }
        covered
    }

    /// Fills each remaining slot with the machine's highest-rate block.
    fn fill_pass(&mut self) -> usize {
        let op = self.problem;
        let mut filled = 0;
        for s in op.shift_indices() {
            for m in op.machine_indices() {
                let mut best: Option<(f64, BlockIndex)> = None;
                for b in op.block_indices() {
                    if !self.admits(m, s, b) {
                        continue;
                    }
                    let rate = op.rate(m, b);
                    if best.is_none_or(|(r, _)| rate > r) {
                        best = Some((rate, b));
                    }
                }
                if let Some((_, b)) = best {
                    self.assign(m, s, b);
                    filled += 1;
                }
            }
        }
        filled
    }
}

/// Builds the starting schedule: locks verbatim, then one slot per block,
/// then rate-greedy filling. Deterministic for a given scenario order.
pub fn init_greedy_schedule(problem: &OperationalProblem<'_>) -> Schedule {
    let mut seed = Seed::new(problem);
    seed.apply_locks();
    let covered = seed.coverage_pass();
    let filled = seed.fill_pass();
    tracing::debug!(covered, filled, "greedy seed built");
    seed.schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhops_model::prelude::*;

    fn two_machine_problem(window: (Day, Day)) -> Problem {
        let mut b = ScenarioBuilder::new("greedy", 2)
            .with_shifts(["AM"])
            .with_machines([Machine::new("M1", "X"), Machine::new("M2", "X")])
            .with_landings([Landing::new("L1", 10)])
            .with_blocks([Block::new("B1", "L1", 10.0, window.0, window.1)]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 10.0),
            ProductionRate::new("M2", "B1", 10.0),
        ]);
        b.add_calendar(CalendarEntry::new("M2", 1, false));
        Problem::new(b.build().unwrap()).unwrap()
    }

    #[test]
    fn test_available_machine_takes_day_one() {
        let p = two_machine_problem((1, 2));
        let op = OperationalProblem::new(&p);
        let s = init_greedy_schedule(&op);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(0)));
        assert_eq!(s.get(MachineIndex(1), ShiftIndex(0)), None);
        // the single shift finishes the block, nothing else is needed
        assert_eq!(s.assigned_count(), 1);
    }

    #[test]
    fn test_locks_fill_every_shift_of_the_day() {
        let mut b = ScenarioBuilder::new("locks", 2)
            .with_shifts(["AM", "PM"])
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([
                Block::new("B1", "L1", 100.0, 1, 2),
                Block::new("B2", "L1", 100.0, 1, 2),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 1.0),
            ProductionRate::new("M1", "B2", 50.0),
        ]);
        b.add_lock(ScheduleLock::new("M1", 1, "B1"));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let s = init_greedy_schedule(&op);
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(0)));
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(1)), Some(BlockIndex(0)));
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(2)), Some(BlockIndex(1)));
        assert_eq!(s.get(MachineIndex(0), ShiftIndex(3)), Some(BlockIndex(1)));
    }

    #[test]
    fn test_coverage_reaches_low_rate_block() {
        // fill-by-rate alone would spend every slot on B2
        let mut b = ScenarioBuilder::new("cover", 2)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([
                Block::new("B1", "L1", 5.0, 1, 2),
                Block::new("B2", "L1", 100.0, 1, 2),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 1.0),
            ProductionRate::new("M1", "B2", 10.0),
        ]);
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let s = init_greedy_schedule(&op);
        assert!(s.contains_block(BlockIndex(0)));
        assert!(s.contains_block(BlockIndex(1)));
    }

    #[test]
    fn test_landing_capacity_respected() {
        let mut b = ScenarioBuilder::new("cap", 1)
            .with_machines([
                Machine::new("M1", "X"),
                Machine::new("M2", "X"),
                Machine::new("M3", "X"),
            ])
            .with_landings([Landing::new("L1", 2)])
            .with_blocks([Block::new("B1", "L1", 100.0, 1, 1)]);
        for m in ["M1", "M2", "M3"] {
            b.add_rate(ProductionRate::new(m, "B1", 5.0));
        }
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let s = init_greedy_schedule(&op);
        assert_eq!(s.assigned_count(), 2);
        assert_eq!(s.get(MachineIndex(2), ShiftIndex(0)), None);
    }

    #[test]
    fn test_block_without_capable_machine_left_alone() {
        let mut b = ScenarioBuilder::new("orphan", 1)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([Block::new("B1", "L1", 5.0, 1, 1)]);
        b.add_rate(ProductionRate::new("M1", "B1", 0.0));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let s = init_greedy_schedule(&op);
        assert_eq!(s.assigned_count(), 0);
    }
}
