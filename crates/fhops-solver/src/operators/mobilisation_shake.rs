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
    model::index::ShiftIndex,
    operators::{Operator, OperatorContext, pick, relocate::relocate_within_machine},
    schedule::Schedule,
};
use rand::Rng;

/// Relocates an assignment at least `min_day_delta` days away on the same
/// machine. Locked slots never move.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobilisationShakeOperator;

impl<R: Rng> Operator<R> for MobilisationShakeOperator {
    fn name(&self) -> &'static str {
        "mobilisation_shake"
    }

    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule> {
        let op = ctx.problem;
        let min_delta = ctx.tuning.min_day_delta;
        let slots = ctx.movable_slots();
        for _ in 0..ctx.tuning.attempts {
            let (m, from, b) = pick(&slots, rng)?;
            let day = op.shift_day(from);
            let targets: Vec<ShiftIndex> = op
                .shift_indices()
                .filter(|&to| op.shift_day(to).abs_diff(day) >= min_delta)
                .filter(|&to| ctx.schedule.get(m, to) != Some(b))
                .filter(|&to| ctx.slot_accepts(m, to, b))
                .collect();
            let Some(to) = pick(&targets, rng) else {
                continue;
            };
            if let Some(next) = relocate_within_machine(ctx, m, from, to, b) {
                return Some(next);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            index::{BlockIndex, MachineIndex},
            operational::OperationalProblem,
        },
        operators::{OperatorTuning, testing},
    };
    use fhops_model::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_locked_assignment_never_moves() {
        let mut b = ScenarioBuilder::new("locked", 5)
            .with_machines([Machine::new("M1", "X")])
            .with_landings([Landing::new("L1", 1)])
            .with_blocks([Block::new("B1", "L1", 50.0, 1, 5)]);
        b.add_rate(ProductionRate::new("M1", "B1", 5.0));
        b.add_lock(ScheduleLock::new("M1", 1, "B1"));
        let p = Problem::new(b.build().unwrap()).unwrap();
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default();
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert!(MobilisationShakeOperator.apply(&ctx, &mut rng).is_none());
        }
    }

    #[test]
    fn test_respects_min_day_delta() {
        let p = testing::one_machine(4, &[("B1", 1, 4)]);
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default().with_min_day_delta(2);
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(1), Some(BlockIndex(0)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let next = MobilisationShakeOperator.apply(&ctx, &mut rng).unwrap();
            // from day two only day four is far enough
            assert_eq!(next.get(MachineIndex(0), ShiftIndex(3)), Some(BlockIndex(0)));
            assert_eq!(next.assigned_count(), 1);
        }
    }
}
