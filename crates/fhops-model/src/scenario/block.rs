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

use crate::common::{BlockId, Day, HarvestSystemId, LandingId, MachineId};
use serde::{Deserialize, Serialize};

/// A harvest unit with a work quota and a window of valid days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    landing_id: LandingId,
    work_required: f64,
    earliest_start: Day,
    latest_finish: Day,
    #[serde(default)]
    harvest_system_id: Option<HarvestSystemId>,
}

impl Block {
    #[inline]
    pub fn new(
        id: impl Into<BlockId>,
        landing_id: impl Into<LandingId>,
        work_required: f64,
        earliest_start: Day,
        latest_finish: Day,
    ) -> Self {
        Self {
            id: id.into(),
            landing_id: landing_id.into(),
            work_required,
            earliest_start,
            latest_finish,
            harvest_system_id: None,
        }
    }

    #[inline]
    pub fn with_harvest_system(mut self, system: impl Into<HarvestSystemId>) -> Self {
        self.harvest_system_id = Some(system.into());
        self
    }

    #[inline]
    pub fn with_window(mut self, earliest_start: Day, latest_finish: Day) -> Self {
        self.earliest_start = earliest_start;
        self.latest_finish = latest_finish;
        self
    }

    #[inline]
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    #[inline]
    pub fn landing_id(&self) -> &LandingId {
        &self.landing_id
    }

    #[inline]
    pub fn work_required(&self) -> f64 {
        self.work_required
    }

    #[inline]
    pub fn earliest_start(&self) -> Day {
        self.earliest_start
    }

    #[inline]
    pub fn latest_finish(&self) -> Day {
        self.latest_finish
    }

    #[inline]
    pub fn harvest_system_id(&self) -> Option<&HarvestSystemId> {
        self.harvest_system_id.as_ref()
    }

    /// Whether `day` lies inside `[earliest_start, latest_finish]`.
    #[inline]
    pub fn window_contains(&self, day: Day) -> bool {
        self.earliest_start <= day && day <= self.latest_finish
    }
}

/// A log-collection point. `daily_capacity` bounds the number of machines
/// working its blocks in any one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landing {
    id: LandingId,
    daily_capacity: u32,
}

impl Landing {
    #[inline]
    pub fn new(id: impl Into<LandingId>, daily_capacity: u32) -> Self {
        Self {
            id: id.into(),
            daily_capacity,
        }
    }

    #[inline]
    pub fn id(&self) -> &LandingId {
        &self.id
    }

    #[inline]
    pub fn daily_capacity(&self) -> u32 {
        self.daily_capacity
    }
}

/// Production units per shift when `machine_id` works `block_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRate {
    pub machine_id: MachineId,
    pub block_id: BlockId,
    pub rate: f64,
}

impl ProductionRate {
    #[inline]
    pub fn new(machine_id: impl Into<MachineId>, block_id: impl Into<BlockId>, rate: f64) -> Self {
        Self {
            machine_id: machine_id.into(),
            block_id: block_id.into(),
            rate,
        }
    }
}
