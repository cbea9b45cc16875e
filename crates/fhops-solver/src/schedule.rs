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

use crate::model::{
    index::{BlockIndex, MachineIndex, ShiftIndex},
    operational::OperationalProblem,
};
use fhops_model::prelude::Day;
use serde::{Deserialize, Serialize};

/// One worked slot in the flattened output table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub machine_id: String,
    pub block_id: String,
    pub day: Day,
    pub shift_id: String,
    #[serde(default = "one")]
    pub assigned: u8,
}

fn one() -> u8 {
    1
}

impl AssignmentRow {
    pub fn new(
        machine_id: impl Into<String>,
        block_id: impl Into<String>,
        day: Day,
        shift_id: impl Into<String>,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            block_id: block_id.into(),
            day,
            shift_id: shift_id.into(),
            assigned: 1,
        }
    }
}

/// A single slot that differs between two schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveDiff {
    pub machine: MachineIndex,
    pub shift: ShiftIndex,
    pub old: Option<BlockIndex>,
    pub new: Option<BlockIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAssignmentError {
    row: AssignmentRow,
}

impl UnknownAssignmentError {
    pub fn new(row: AssignmentRow) -> Self {
        Self { row }
    }

    pub fn row(&self) -> &AssignmentRow {
        &self.row
    }
}

impl std::fmt::Display for UnknownAssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Assignment {} -> {} on day {} shift {} does not match the scenario",
            self.row.machine_id, self.row.block_id, self.row.day, self.row.shift_id
        )
    }
}

impl std::error::Error for UnknownAssignmentError {}

/// Machine by shift grid of assigned blocks.
///
/// Local search never edits a schedule it was handed; it clones, edits the
/// clone and returns it. Only the evaluator repairs in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schedule {
    machines_len: usize,
    shifts_len: usize,
    cells: Vec<Option<BlockIndex>>, // len = M * S
}

impl Schedule {
    pub fn new(machines_len: usize, shifts_len: usize) -> Self {
        Self {
            machines_len,
            shifts_len,
            cells: vec![None; machines_len * shifts_len],
        }
    }

    #[inline]
    pub fn empty_for(problem: &OperationalProblem<'_>) -> Self {
        Self::new(problem.machines_len(), problem.shifts_len())
    }

    #[inline]
    pub fn machines_len(&self) -> usize {
        self.machines_len
    }

    #[inline]
    pub fn shifts_len(&self) -> usize {
        self.shifts_len
    }

    #[inline(always)]
    fn flat_index(&self, machine: MachineIndex, shift: ShiftIndex) -> usize {
        debug_assert!(machine.get() < self.machines_len);
        debug_assert!(shift.get() < self.shifts_len);

        machine.get() * self.shifts_len + shift.get()
    }

    #[inline]
    pub fn get(&self, machine: MachineIndex, shift: ShiftIndex) -> Option<BlockIndex> {
        self.cells[self.flat_index(machine, shift)]
    }

    #[inline]
    pub fn set(&mut self, machine: MachineIndex, shift: ShiftIndex, block: Option<BlockIndex>) {
        let i = self.flat_index(machine, shift);
        self.cells[i] = block;
    }

    /// The row of one machine, indexed by shift.
    #[inline]
    pub fn machine_row(&self, machine: MachineIndex) -> &[Option<BlockIndex>] {
        let start = machine.get() * self.shifts_len;
        &self.cells[start..start + self.shifts_len]
    }

    /// Assigned slots in machine-major order.
    pub fn assigned(&self) -> impl Iterator<Item = (MachineIndex, ShiftIndex, BlockIndex)> + '_ {
        let shifts = self.shifts_len.max(1);
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.map(|b| (MachineIndex(i / shifts), ShiftIndex(i % shifts), b))
        })
    }

    #[inline]
    pub fn assigned_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    #[inline]
    pub fn contains_block(&self, block: BlockIndex) -> bool {
        self.cells.contains(&Some(block))
    }

    /// Slots whose block differs from `other`, sorted.
    pub fn diff(&self, other: &Schedule) -> Vec<MoveDiff> {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        let shifts = self.shifts_len.max(1);
        let mut out: Vec<MoveDiff> = self
            .cells
            .iter()
            .zip(other.cells.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, (&old, &new))| MoveDiff {
                machine: MachineIndex(i / shifts),
                shift: ShiftIndex(i % shifts),
                old,
                new,
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Flattens to rows sorted by day, shift order, machine id, block id.
    pub fn to_assignments(&self, problem: &OperationalProblem<'_>) -> Vec<AssignmentRow> {
        let mut keyed: Vec<(ShiftIndex, &str, &str, AssignmentRow)> = self
            .assigned()
            .map(|(m, s, b)| {
                let slot = problem.shift_slot(s);
                let mid = problem.machine_id(m).as_str();
                let bid = problem.block_id(b).as_str();
                (
                    s,
                    mid,
                    bid,
                    AssignmentRow::new(mid, bid, slot.day, slot.shift_id.as_str()),
                )
            })
            .collect();
        keyed.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));
        keyed.into_iter().map(|(_, _, _, row)| row).collect()
    }

    /// Rebuilds a schedule from rows. Rows with `assigned == 0` are ignored.
    pub fn from_assignments(
        problem: &OperationalProblem<'_>,
        rows: &[AssignmentRow],
    ) -> Result<Self, UnknownAssignmentError> {
        let mut schedule = Self::empty_for(problem);
        for row in rows.iter().filter(|r| r.assigned != 0) {
            let m = problem.machine_index_by_name(&row.machine_id);
            let b = problem.block_index_by_name(&row.block_id);
            let s = problem.shift_index(row.day, &row.shift_id);
            match (m, b, s) {
                (Some(m), Some(b), Some(s)) => schedule.set(m, s, Some(b)),
                _ => return Err(UnknownAssignmentError::new(row.clone())),
            }
        }
        Ok(schedule)
    }
}
