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
        operational::OperationalProblem,
        sanitizer::Sanitizer,
    },
    schedule::Schedule,
};
use fhops_model::prelude::Day;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod block_insertion;
pub mod cross_exchange;
pub mod mobilisation_shake;
pub mod neighbors;
pub mod registry;
pub mod relocate;
pub mod stats;
pub mod swap;

/// Knobs shared by all neighbourhood operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorTuning {
    /// Source slots an operator samples before giving up.
    pub attempts: usize,
    /// Smallest day distance a mobilisation shake must cover.
    pub min_day_delta: Day,
}

impl Default for OperatorTuning {
    fn default() -> Self {
        Self {
            attempts: 16,
            min_day_delta: 2,
        }
    }
}

impl OperatorTuning {
    #[inline]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    #[inline]
    pub fn with_min_day_delta(mut self, delta: Day) -> Self {
        self.min_day_delta = delta;
        self
    }
}

impl std::fmt::Display for OperatorTuning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OperatorTuning(attempts={}, min_day_delta={})",
            self.attempts, self.min_day_delta
        )
    }
}

/// Everything an operator reads. The schedule is borrowed immutably;
/// operators build and return a fresh one.
#[derive(Debug, Clone, Copy)]
pub struct OperatorContext<'a> {
    pub problem: &'a OperationalProblem<'a>,
    pub schedule: &'a Schedule,
    pub sanitizer: &'a Sanitizer<'a>,
    pub tuning: &'a OperatorTuning,
}

impl<'a> OperatorContext<'a> {
    #[inline]
    pub fn new(
        problem: &'a OperationalProblem<'a>,
        schedule: &'a Schedule,
        sanitizer: &'a Sanitizer<'a>,
        tuning: &'a OperatorTuning,
    ) -> Self {
        Self {
            problem,
            schedule,
            sanitizer,
            tuning,
        }
    }

    /// Assigned slots that no lock pins.
    pub fn movable_slots(&self) -> Vec<(MachineIndex, ShiftIndex, BlockIndex)> {
        self.schedule
            .assigned()
            .filter(|&(m, s, _)| !self.problem.is_locked(m, s))
            .collect()
    }

    /// Whether `m` may take `b` in shift `s` as far as the operator is
    /// concerned: open, unlocked, capable and inside the block window.
    #[inline]
    pub fn slot_accepts(&self, m: MachineIndex, s: ShiftIndex, b: BlockIndex) -> bool {
        let op = self.problem;
        op.slot_open(m, s)
            && !op.is_locked(m, s)
            && op.can_work(m, b)
            && op.window_contains(b, op.shift_day(s))
    }

    /// Sanitises `candidate`; `None` when nothing changed.
    #[inline]
    pub fn finish(&self, candidate: Schedule) -> Option<Schedule> {
        let candidate = self.sanitizer.apply(candidate);
        (candidate != *self.schedule).then_some(candidate)
    }
}

/// A named neighbourhood move.
pub trait Operator<R: Rng>: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule>;
}

#[inline]
pub(crate) fn pick<T: Copy, R: Rng>(items: &[T], rng: &mut R) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())])
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use fhops_model::prelude::*;

    /// One block, two machines of the same role, the second one unavailable
    /// on day one.
    pub fn single_block(window: (Day, Day)) -> Problem {
        let mut b = ScenarioBuilder::new("insertion", 2)
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

    /// Two machines, two blocks, one day with one shift.
    pub fn two_by_two(cross_rates: bool) -> Problem {
        let mut b = ScenarioBuilder::new("pair", 1)
            .with_machines([Machine::new("M1", "X"), Machine::new("M2", "X")])
            .with_landings([Landing::new("L1", 10)])
            .with_blocks([
                Block::new("B1", "L1", 10.0, 1, 1),
                Block::new("B2", "L1", 10.0, 1, 1),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 5.0),
            ProductionRate::new("M2", "B2", 5.0),
        ]);
        if cross_rates {
            b.extend_rates([
                ProductionRate::new("M1", "B2", 5.0),
                ProductionRate::new("M2", "B1", 5.0),
            ]);
        }
        Problem::new(b.build().unwrap()).unwrap()
    }

    /// One machine, blocks open over several days.
    pub fn one_machine(days: Day, blocks: &[(&str, Day, Day)]) -> Problem {
        let mut b = ScenarioBuilder::new("solo", days)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)]);
        for &(id, lo, hi) in blocks {
            b.add_block(Block::new(id, "L1", 50.0, lo, hi));
            b.add_rate(ProductionRate::new("M1", id, 5.0));
        }
        Problem::new(b.build().unwrap()).unwrap()
    }
}
