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

use crate::common::{BlockId, Day, MachineId};
use rangemap::RangeInclusiveSet;
use serde::{Deserialize, Serialize};

/// Shift label used when a scenario does not name its shifts.
pub const DEFAULT_SHIFT_ID: &str = "S1";

/// Pins every shift of `day` for `machine_id` to `block_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleLock {
    pub machine_id: MachineId,
    pub day: Day,
    pub block_id: BlockId,
}

impl ScheduleLock {
    #[inline]
    pub fn new(machine_id: impl Into<MachineId>, day: Day, block_id: impl Into<BlockId>) -> Self {
        Self {
            machine_id: machine_id.into(),
            day,
            block_id: block_id.into(),
        }
    }
}

/// An inclusive range of days on which no machine may work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start_day: Day,
    pub end_day: Day,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BlackoutWindow {
    #[inline]
    pub fn new(start_day: Day, end_day: Day) -> Self {
        Self {
            start_day,
            end_day,
            reason: None,
        }
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub shift_ids: Vec<String>,
    #[serde(default)]
    pub blackouts: Vec<BlackoutWindow>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shifts<I, S>(mut self, shift_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shift_ids = shift_ids.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_blackout(mut self, window: BlackoutWindow) -> Self {
        self.blackouts.push(window);
        self
    }

    /// Shift labels in order, falling back to [`DEFAULT_SHIFT_ID`].
    pub fn effective_shift_ids(&self) -> Vec<String> {
        if self.shift_ids.is_empty() {
            vec![DEFAULT_SHIFT_ID.to_owned()]
        } else {
            self.shift_ids.clone()
        }
    }

    /// Union of all blackout windows. Inverted windows are ignored.
    pub fn blackout_days(&self) -> RangeInclusiveSet<Day> {
        let mut set = RangeInclusiveSet::new();
        for w in &self.blackouts {
            if w.start_day <= w.end_day {
                set.insert(w.start_day..=w.end_day);
            }
        }
        set
    }
}
