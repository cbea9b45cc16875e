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
    },
    schedule::Schedule,
};

/// Hard-feasibility gate every candidate passes before scoring.
///
/// Per shift, locks are written first and count toward landing usage. The
/// remaining slots are visited in machine order and cleared when the machine
/// is unavailable or blacked out, when its role may not work the block, or
/// when the block's landing is already full.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    problem: &'a OperationalProblem<'a>,
}

impl<'a> Sanitizer<'a> {
    #[inline]
    pub fn new(problem: &'a OperationalProblem<'a>) -> Self {
        Self { problem }
    }

    pub fn apply(&self, mut schedule: Schedule) -> Schedule {
        let op = self.problem;
        let mut usage = vec![0u32; op.landings_len()];

        for s in op.shift_indices() {
            usage.fill(0);
            let day = op.shift_day(s);

            for m in op.machine_indices() {
                if let Some(b) = op.locked_block(m, day) {
                    schedule.set(m, s, Some(b));
                    usage[op.landing_of(b).get()] += 1;
                }
            }

            for m in op.machine_indices() {
                if op.locked_block(m, day).is_some() {
                    continue;
                }
                let Some(b) = schedule.get(m, s) else {
                    continue;
                };
                if !self.slot_admits(m, s, b) {
                    schedule.set(m, s, None);
                    continue;
                }
                let l = op.landing_of(b);
                if usage[l.get()] >= op.landing_capacity(l) {
                    schedule.set(m, s, None);
                    continue;
                }
                usage[l.get()] += 1;
            }
        }
        schedule
    }

    #[inline]
    fn slot_admits(&self, m: MachineIndex, s: ShiftIndex, b: BlockIndex) -> bool {
        self.problem.slot_open(m, s) && self.problem.role_allowed(b, self.problem.machine_role(m))
    }
}
