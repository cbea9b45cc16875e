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
    common::Day,
    scenario::{err::ScenarioError, scen::Scenario},
};
use rangemap::RangeInclusiveSet;
use serde::{Deserialize, Serialize};

/// One schedulable shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub day: Day,
    pub shift_id: String,
}

impl ShiftSlot {
    #[inline]
    pub fn new(day: Day, shift_id: impl Into<String>) -> Self {
        Self {
            day,
            shift_id: shift_id.into(),
        }
    }
}

impl std::fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.day, self.shift_id)
    }
}

/// A validated scenario together with its shift grid.
#[derive(Debug, Clone)]
pub struct Problem {
    scenario: Scenario,
    shift_ids: Vec<String>,
    shifts: Vec<ShiftSlot>,
    blackout_days: RangeInclusiveSet<Day>,
}

impl Problem {
    pub fn new(scenario: Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let shift_ids = scenario.timeline().effective_shift_ids();
        let shifts = (1..=scenario.num_days())
            .flat_map(|day| shift_ids.iter().map(move |s| ShiftSlot::new(day, s.as_str())))
            .collect();
        let blackout_days = scenario.timeline().blackout_days();
        Ok(Self {
            scenario,
            shift_ids,
            shifts,
            blackout_days,
        })
    }

    #[inline]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Shift labels in their per-day order.
    #[inline]
    pub fn shift_ids(&self) -> &[String] {
        &self.shift_ids
    }

    /// All shifts ordered by day, then shift label order.
    #[inline]
    pub fn shifts(&self) -> &[ShiftSlot] {
        &self.shifts
    }

    #[inline]
    pub fn num_days(&self) -> Day {
        self.scenario.num_days()
    }

    #[inline]
    pub fn is_blackout(&self, day: Day) -> bool {
        self.blackout_days.contains(&day)
    }

    #[inline]
    pub fn blackout_days(&self) -> &RangeInclusiveSet<Day> {
        &self.blackout_days
    }

    /// Position of `shift_id` within a day.
    #[inline]
    pub fn shift_position(&self, shift_id: &str) -> Option<usize> {
        self.shift_ids.iter().position(|s| s == shift_id)
    }
}

impl TryFrom<Scenario> for Problem {
    type Error = ScenarioError;

    fn try_from(scenario: Scenario) -> Result<Self, Self::Error> {
        Problem::new(scenario)
    }
}
