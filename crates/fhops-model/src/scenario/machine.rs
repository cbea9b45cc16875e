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

use crate::common::{Day, MachineId};
use serde::{Deserialize, Serialize};

fn default_daily_hours() -> f64 {
    24.0
}

fn default_available() -> bool {
    true
}

/// A harvesting machine. The role decides which blocks and harvest-system
/// jobs it may work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    id: MachineId,
    role: String,
    #[serde(default = "default_daily_hours")]
    daily_hours: f64,
}

impl Machine {
    #[inline]
    pub fn new(id: impl Into<MachineId>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            daily_hours: default_daily_hours(),
        }
    }

    #[inline]
    pub fn with_daily_hours(mut self, hours: f64) -> Self {
        self.daily_hours = hours;
        self
    }

    #[inline]
    pub fn id(&self) -> &MachineId {
        &self.id
    }

    #[inline]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[inline]
    pub fn daily_hours(&self) -> f64 {
        self.daily_hours
    }
}

/// Day-level availability of a machine. Days without an entry are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub machine_id: MachineId,
    pub day: Day,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl CalendarEntry {
    #[inline]
    pub fn new(machine_id: impl Into<MachineId>, day: Day, available: bool) -> Self {
        Self {
            machine_id: machine_id.into(),
            day,
            available,
        }
    }
}

/// Shift-level availability of a machine. Shifts without an entry are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendarEntry {
    pub machine_id: MachineId,
    pub day: Day,
    pub shift_id: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl ShiftCalendarEntry {
    #[inline]
    pub fn new(
        machine_id: impl Into<MachineId>,
        day: Day,
        shift_id: impl Into<String>,
        available: bool,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            day,
            shift_id: shift_id.into(),
            available,
        }
    }
}
