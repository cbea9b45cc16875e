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

/// Exchanges the blocks two machines hold in the same shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapOperator;

impl<R: Rng> Operator<R> for SwapOperator {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule> {
        let op = ctx.problem;
        let slots = ctx.movable_slots();
        for _ in 0..ctx.tuning.attempts {
            let (m1, s, b1) = pick(&slots, rng)?;
            let partners: Vec<MachineIndex> = op
                .machine_indices()
                .filter(|&m2| m2 != m1 && !op.is_locked(m2, s))
                .filter(|&m2| match ctx.schedule.get(m2, s) {
                    Some(b2) => b2 != b1 && op.can_work(m1, b2) && op.can_work(m2, b1),
                    None => false,
                })
                .collect();
            let Some(m2) = pick(&partners, rng) else {
                continue;
            };
            if let Some(next) = swap_in_shift(ctx, s, m1, m2) {
                return Some(next);
            }
        }
        None
    }
}

fn swap_in_shift(
    ctx: &OperatorContext<'_>,
    s: ShiftIndex,
    m1: MachineIndex,
    m2: MachineIndex,
) -> Option<Schedule> {
    let mut next = ctx.schedule.clone();
    let a = next.get(m1, s);
    let b = next.get(m2, s);
    next.set(m1, s, b);
    next.set(m2, s, a);
    ctx.finish(next)
}
