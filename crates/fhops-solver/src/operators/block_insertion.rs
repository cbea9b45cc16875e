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
    model::index::{MachineIndex, ShiftIndex},
    operators::{Operator, OperatorContext, pick},
    schedule::Schedule,
};
use rand::Rng;

/// Moves an assignment into an empty slot, possibly on another machine,
/// that lies inside the block window.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockInsertionOperator;

impl<R: Rng> Operator<R> for BlockInsertionOperator {
    fn name(&self) -> &'static str {
        "block_insertion"
    }

    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule> {
        let op = ctx.problem;
        let slots = ctx.movable_slots();
        for _ in 0..ctx.tuning.attempts {
            let (m, s, b) = pick(&slots, rng)?;
            let targets: Vec<(MachineIndex, ShiftIndex)> = op
                .machine_indices()
                .flat_map(|m2| op.shift_indices().map(move |s2| (m2, s2)))
                .filter(|&(m2, s2)| (m2, s2) != (m, s))
                .filter(|&(m2, s2)| ctx.schedule.get(m2, s2).is_none())
                .filter(|&(m2, s2)| ctx.slot_accepts(m2, s2, b))
                .collect();
            let Some((m2, s2)) = pick(&targets, rng) else {
                continue;
            };
            let mut next = ctx.schedule.clone();
            next.set(m, s, None);
            next.set(m2, s2, Some(b));
            if let Some(next) = ctx.finish(next) {
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
        model::{index::BlockIndex, operational::OperationalProblem},
        operators::{OperatorTuning, testing},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(window: (u32, u32), seed: u64) -> Option<Schedule> {
        let p = testing::single_block(window);
        let op = OperationalProblem::new(&p);
        let san = op.build_sanitizer();
        let tuning = OperatorTuning::default();
        let mut s = Schedule::empty_for(&op);
        s.set(MachineIndex(0), ShiftIndex(0), Some(BlockIndex(0)));
        let ctx = OperatorContext::new(&op, &s, &san, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        BlockInsertionOperator.apply(&ctx, &mut rng)
    }

    #[test]
    fn test_moves_block_to_second_day() {
        for seed in 0..8 {
            let next = run((2, 2), seed).unwrap();
            assert_eq!(next.get(MachineIndex(0), ShiftIndex(0)), None);
            let placed: Vec<_> = next.assigned().collect();
            assert_eq!(placed.len(), 1);
            assert_eq!(placed[0].1, ShiftIndex(1));
            assert_eq!(placed[0].2, BlockIndex(0));
        }
    }

    #[test]
    fn test_no_target_inside_single_day_window() {
        // M2 is down on day one and M1 already holds the only other slot.
        assert!(run((1, 1), 5).is_none());
    }
}
