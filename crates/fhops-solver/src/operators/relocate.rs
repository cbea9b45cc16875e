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
    model::index::{BlockIndex, MachineIndex, ShiftIndex},
    operators::{Operator, OperatorContext, pick},
    schedule::Schedule,
};
use rand::Rng;

/// Moves an assignment to another shift of the same machine. Whatever the
/// target held comes back to the source slot when its window allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOperator;

impl<R: Rng> Operator<R> for MoveOperator {
    fn name(&self) -> &'static str {
        "move"
    }

    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule> {
        let op = ctx.problem;
        let slots = ctx.movable_slots();
        for _ in 0..ctx.tuning.attempts {
            let (m, from, b) = pick(&slots, rng)?;
            let targets: Vec<ShiftIndex> = op
                .shift_indices()
                .filter(|&to| to != from && ctx.schedule.get(m, to) != Some(b))
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

/// Puts `b` on `to` and hands the displaced block, if any and if it fits,
/// back to `from`.
pub(crate) fn relocate_within_machine(
    ctx: &OperatorContext<'_>,
    m: MachineIndex,
    from: ShiftIndex,
    to: ShiftIndex,
    b: BlockIndex,
) -> Option<Schedule> {
    let op = ctx.problem;
    let mut next = ctx.schedule.clone();
    let displaced = next.get(m, to);
    next.set(m, to, Some(b));
    let back = displaced.filter(|&d| op.window_contains(d, op.shift_day(from)));
    next.set(m, from, back);
    ctx.finish(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::operational::OperationalProblem,
        operators::{OperatorTuning, testing},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_moves_within_window() {
        let p = testing::one_machine(3, &[("B1", 2, 3)]);
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default();
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(1), Some(BlockIndex(0)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = MoveOperator.apply(&ctx, &mut rng).unwrap();
        // day three is the only other day inside the window
        assert_eq!(next.get(MachineIndex(0), ShiftIndex(2)), Some(BlockIndex(0)));
        assert_eq!(next.get(MachineIndex(0), ShiftIndex(1)), None);
        assert_eq!(next.get(MachineIndex(0), ShiftIndex(0)), None);
    }

    #[test]
    fn test_displaced_block_returns_when_it_fits() {
        let p = testing::one_machine(2, &[("B1", 1, 2), ("B2", 1, 2)]);
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default();
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        s.set(MachineIndex(0), ShiftIndex(1), Some(BlockIndex(1)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let next = MoveOperator.apply(&ctx, &mut rng).unwrap();
        assert_eq!(next.get(MachineIndex(0), ShiftIndex(0)), Some(BlockIndex(1)));
        assert_eq!(next.get(MachineIndex(0), ShiftIndex(1)), Some(BlockIndex(0)));
    }

    #[test]
    fn test_nothing_to_move_in_single_day_window() {
        let p = testing::one_machine(2, &[("B1", 1, 1)]);
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default();
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(MoveOperator.apply(&ctx, &mut rng).is_none());
    }
}
