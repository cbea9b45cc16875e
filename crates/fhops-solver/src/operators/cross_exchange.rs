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

/// Exchanges two different blocks between two different machines. The two
/// slots may sit in different shifts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossExchangeOperator;

impl CrossExchangeOperator {
    fn compatible(
        ctx: &OperatorContext<'_>,
        (m1, s1, b1): (MachineIndex, ShiftIndex, BlockIndex),
        (m2, s2, b2): (MachineIndex, ShiftIndex, BlockIndex),
    ) -> bool {
        let op = ctx.problem;
        m1 != m2
            && b1 != b2
            && op.can_work(m1, b2)
            && op.can_work(m2, b1)
            && op.window_contains(b2, op.shift_day(s1))
            && op.window_contains(b1, op.shift_day(s2))
    }
}

impl<R: Rng> Operator<R> for CrossExchangeOperator {
    fn name(&self) -> &'static str {
        "cross_exchange"
    }

    fn apply(&self, ctx: &OperatorContext<'_>, rng: &mut R) -> Option<Schedule> {
        let slots = ctx.movable_slots();
        for _ in 0..ctx.tuning.attempts {
            let first = pick(&slots, rng)?;
            let partners: Vec<_> = slots
                .iter()
                .copied()
                .filter(|&second| Self::compatible(ctx, first, second))
                .collect();
            let Some((m2, s2, b2)) = pick(&partners, rng) else {
                continue;
            };
            let (m1, s1, b1) = first;
            let mut next = ctx.schedule.clone();
            next.set(m1, s1, Some(b2));
            next.set(m2, s2, Some(b1));
            if let Some(next) = ctx.finish(next) {
                return Some(next);
            }
        }
        None
    }
}
