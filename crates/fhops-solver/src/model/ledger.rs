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

use crate::model::index::{BlockIndex, RoleIndex};

/// Whose work a ledger entry tracks. Blocks without a harvest system pool
/// every role under one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkKey {
    Role(RoleIndex),
    Pooled,
}

/// Cumulative units and worked shifts per block and role, built up while a
/// schedule is walked shift by shift.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleWorkLedger {
    roles_len: usize,
    units: Vec<f64>,  // len = B * (R + 1)
    shifts: Vec<u32>, // len = B * (R + 1)
}

impl RoleWorkLedger {
    pub fn new(blocks_len: usize, roles_len: usize) -> Self {
        let n = blocks_len * (roles_len + 1);
        Self {
            roles_len,
            units: vec![0.0; n],
            shifts: vec![0; n],
        }
    }

    #[inline(always)]
    fn flat_index(&self, block: BlockIndex, key: WorkKey) -> usize {
        let k = match key {
            WorkKey::Role(r) => {
                debug_assert!(r.get() < self.roles_len);
                r.get()
            }
            WorkKey::Pooled => self.roles_len,
        };
        block.get() * (self.roles_len + 1) + k
    }

    #[inline]
    pub fn units(&self, block: BlockIndex, key: WorkKey) -> f64 {
        self.units[self.flat_index(block, key)]
    }

    #[inline]
    pub fn shifts_worked(&self, block: BlockIndex, key: WorkKey) -> u32 {
        self.shifts[self.flat_index(block, key)]
    }

    /// Books one worked shift producing `units`.
    #[inline]
    pub fn record(&mut self, block: BlockIndex, key: WorkKey, units: f64) {
        let i = self.flat_index(block, key);
        self.units[i] += units.max(0.0);
        self.shifts[i] = self.shifts[i].saturating_add(1);
    }

    pub fn clear(&mut self) {
        self.units.fill(0.0);
        self.shifts.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates_per_key() {
        let mut l = RoleWorkLedger::new(2, 2);
        let b = BlockIndex(1);
        l.record(b, WorkKey::Role(RoleIndex(0)), 4.0);
        l.record(b, WorkKey::Role(RoleIndex(0)), 3.0);
        l.record(b, WorkKey::Pooled, 1.0);
        assert_eq!(l.units(b, WorkKey::Role(RoleIndex(0))), 7.0);
        assert_eq!(l.shifts_worked(b, WorkKey::Role(RoleIndex(0))), 2);
        assert_eq!(l.units(b, WorkKey::Role(RoleIndex(1))), 0.0);
        assert_eq!(l.units(b, WorkKey::Pooled), 1.0);
        assert_eq!(l.units(BlockIndex(0), WorkKey::Pooled), 0.0);
    }

    #[test]
    fn test_zero_unit_shift_still_counts() {
        let mut l = RoleWorkLedger::new(1, 1);
        l.record(BlockIndex(0), WorkKey::Pooled, 0.0);
        assert_eq!(l.shifts_worked(BlockIndex(0), WorkKey::Pooled), 1);
        assert_eq!(l.units(BlockIndex(0), WorkKey::Pooled), 0.0);
        l.clear();
        assert_eq!(l.shifts_worked(BlockIndex(0), WorkKey::Pooled), 0);
    }
}
