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
    common::{Day, HarvestSystemId},
    scenario::{
        block::{Block, Landing, ProductionRate},
        constraints::{ScheduleLock, Timeline},
        err::{
            DayOutOfRangeError, DuplicateIdError, EmptyHorizonError, InvalidQuantityError,
            InvalidWindowError, ScenarioError, UnknownPrerequisiteError, UnknownReferenceError,
        },
        machine::{CalendarEntry, Machine, ShiftCalendarEntry},
        mobilisation::MobilisationConfig,
        objective::ObjectiveWeights,
        system::HarvestSystem,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything a planning run consumes. Entities are kept in the order they
/// were given; that order breaks ties throughout the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    num_days: Day,
    #[serde(default)]
    machines: Vec<Machine>,
    #[serde(default)]
    blocks: Vec<Block>,
    #[serde(default)]
    landings: Vec<Landing>,
    #[serde(default)]
    calendar: Vec<CalendarEntry>,
    #[serde(default)]
    shift_calendar: Vec<ShiftCalendarEntry>,
    #[serde(default)]
    production_rates: Vec<ProductionRate>,
    #[serde(default)]
    harvest_systems: Vec<HarvestSystem>,
    #[serde(default)]
    mobilisation: Option<MobilisationConfig>,
    #[serde(default)]
    locked_assignments: Vec<ScheduleLock>,
    #[serde(default)]
    objective_weights: ObjectiveWeights,
    #[serde(default)]
    timeline: Timeline,
}

impl Scenario {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        num_days: Day,
        machines: Vec<Machine>,
        blocks: Vec<Block>,
        landings: Vec<Landing>,
        calendar: Vec<CalendarEntry>,
        shift_calendar: Vec<ShiftCalendarEntry>,
        production_rates: Vec<ProductionRate>,
        harvest_systems: Vec<HarvestSystem>,
        mobilisation: Option<MobilisationConfig>,
        locked_assignments: Vec<ScheduleLock>,
        objective_weights: ObjectiveWeights,
        timeline: Timeline,
    ) -> Self {
        Self {
            name,
            num_days,
            machines,
            blocks,
            landings,
            calendar,
            shift_calendar,
            production_rates,
            harvest_systems,
            mobilisation,
            locked_assignments,
            objective_weights,
            timeline,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_days(&self) -> Day {
        self.num_days
    }

    #[inline]
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn landings(&self) -> &[Landing] {
        &self.landings
    }

    #[inline]
    pub fn calendar(&self) -> &[CalendarEntry] {
        &self.calendar
    }

    #[inline]
    pub fn shift_calendar(&self) -> &[ShiftCalendarEntry] {
        &self.shift_calendar
    }

    #[inline]
    pub fn production_rates(&self) -> &[ProductionRate] {
        &self.production_rates
    }

    #[inline]
    pub fn harvest_systems(&self) -> &[HarvestSystem] {
        &self.harvest_systems
    }

    #[inline]
    pub fn harvest_system(&self, id: &HarvestSystemId) -> Option<&HarvestSystem> {
        self.harvest_systems.iter().find(|s| s.id() == id)
    }

    #[inline]
    pub fn mobilisation(&self) -> Option<&MobilisationConfig> {
        self.mobilisation.as_ref()
    }

    #[inline]
    pub fn locked_assignments(&self) -> &[ScheduleLock] {
        &self.locked_assignments
    }

    #[inline]
    pub fn objective_weights(&self) -> &ObjectiveWeights {
        &self.objective_weights
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Checks internal consistency. A block naming a harvest system that is
    /// not defined is accepted and treated as open to every role.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.num_days == 0 {
            return Err(EmptyHorizonError.into());
        }
        let n = self.num_days;
        let day_ok = |d: Day| (1..=n).contains(&d);

        let machines = unique_ids("machine", self.machines.iter().map(|m| m.id().as_str()))?;
        let blocks = unique_ids("block", self.blocks.iter().map(|b| b.id().as_str()))?;
        let landings = unique_ids("landing", self.landings.iter().map(|l| l.id().as_str()))?;
        unique_ids(
            "harvest system",
            self.harvest_systems.iter().map(|s| s.id().as_str()),
        )?;
        let shifts = unique_ids(
            "shift",
            self.timeline.shift_ids.iter().map(String::as_str),
        )?;

        for m in &self.machines {
            check_quantity(format!("daily_hours of {}", m.id()), m.daily_hours())?;
        }

        for b in &self.blocks {
            if !landings.contains(b.landing_id().as_str()) {
                return Err(UnknownReferenceError::new(
                    "landing",
                    b.landing_id().as_str(),
                    b.id().to_string(),
                )
                .into());
            }
            if b.earliest_start() < 1
                || b.earliest_start() > b.latest_finish()
                || b.latest_finish() > n
            {
                return Err(InvalidWindowError::new(
                    b.id().clone(),
                    b.earliest_start(),
                    b.latest_finish(),
                    n,
                )
                .into());
            }
            check_quantity(format!("work_required of {}", b.id()), b.work_required())?;
        }

        for r in &self.production_rates {
            let who = format!("rate {}/{}", r.machine_id.as_str(), r.block_id.as_str());
            require(&machines, "machine", r.machine_id.as_str(), &who)?;
            require(&blocks, "block", r.block_id.as_str(), &who)?;
            check_quantity(who, r.rate)?;
        }

        for c in &self.calendar {
            require(&machines, "machine", c.machine_id.as_str(), "calendar")?;
            if !day_ok(c.day) {
                return Err(DayOutOfRangeError::new("calendar", c.day, n).into());
            }
        }

        for c in &self.shift_calendar {
            require(&machines, "machine", c.machine_id.as_str(), "shift calendar")?;
            if !day_ok(c.day) {
                return Err(DayOutOfRangeError::new("shift calendar", c.day, n).into());
            }
            let known = if shifts.is_empty() {
                c.shift_id == crate::scenario::constraints::DEFAULT_SHIFT_ID
            } else {
                shifts.contains(c.shift_id.as_str())
            };
            if !known {
                return Err(
                    UnknownReferenceError::new("shift", c.shift_id.as_str(), "shift calendar")
                        .into(),
                );
            }
        }

        for lock in &self.locked_assignments {
            let who = format!("lock {}@{}", lock.machine_id.as_str(), lock.day);
            require(&machines, "machine", lock.machine_id.as_str(), &who)?;
            require(&blocks, "block", lock.block_id.as_str(), &who)?;
            if !day_ok(lock.day) {
                return Err(DayOutOfRangeError::new(who, lock.day, n).into());
            }
        }

        for w in &self.timeline.blackouts {
            for d in [w.start_day, w.end_day] {
                if !day_ok(d) {
                    return Err(DayOutOfRangeError::new("blackout window", d, n).into());
                }
            }
        }

        for sys in &self.harvest_systems {
            for job in sys.jobs() {
                for pre in &job.prerequisites {
                    if !sys.jobs().iter().any(|j| &j.name == pre) {
                        return Err(UnknownPrerequisiteError::new(
                            sys.id().clone(),
                            job.name.as_str(),
                            pre.as_str(),
                        )
                        .into());
                    }
                }
            }
            if let Some(v) = sys.loader_batch_volume() {
                check_quantity(format!("loader_batch_volume of {}", sys.id()), v)?;
            }
        }

        if let Some(mob) = &self.mobilisation {
            for p in &mob.machine_params {
                require(&machines, "machine", p.machine_id.as_str(), "mobilisation")?;
                for (what, v) in [
                    ("walk_cost_per_meter", p.walk_cost_per_meter),
                    ("move_cost_flat", p.move_cost_flat),
                    ("walk_threshold_m", p.walk_threshold_m),
                    ("setup_cost", p.setup_cost),
                ] {
                    check_quantity(format!("{what} of {}", p.machine_id), v)?;
                }
            }
            for d in &mob.distances {
                require(&blocks, "block", d.from_block.as_str(), "distance table")?;
                require(&blocks, "block", d.to_block.as_str(), "distance table")?;
                check_quantity("distance_m", d.distance_m)?;
            }
        }

        Ok(())
    }
}

fn unique_ids<'a, I>(kind: &'static str, ids: I) -> Result<HashSet<&'a str>, DuplicateIdError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DuplicateIdError::new(kind, id));
        }
    }
    Ok(seen)
}

fn require(
    known: &HashSet<&str>,
    kind: &'static str,
    id: &str,
    referenced_by: &str,
) -> Result<(), UnknownReferenceError> {
    if known.contains(id) {
        Ok(())
    } else {
        Err(UnknownReferenceError::new(kind, id, referenced_by))
    }
}

fn check_quantity(what: impl Into<String>, value: f64) -> Result<(), InvalidQuantityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidQuantityError::new(what, value))
    }
}
