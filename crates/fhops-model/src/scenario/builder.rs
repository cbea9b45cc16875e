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
    scenario::{
        block::{Block, Landing, ProductionRate},
        constraints::{BlackoutWindow, ScheduleLock, Timeline},
        err::ScenarioError,
        machine::{CalendarEntry, Machine, ShiftCalendarEntry},
        mobilisation::MobilisationConfig,
        objective::ObjectiveWeights,
        scen::Scenario,
        system::HarvestSystem,
    },
};

#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
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
}

impl ScenarioBuilder {
    #[inline]
    pub fn new(name: impl Into<String>, num_days: Day) -> Self {
        Self {
            name: name.into(),
            num_days,
            machines: Vec::new(),
            blocks: Vec::new(),
            landings: Vec::new(),
            calendar: Vec::new(),
            shift_calendar: Vec::new(),
            production_rates: Vec::new(),
            harvest_systems: Vec::new(),
            mobilisation: None,
            locked_assignments: Vec::new(),
            objective_weights: ObjectiveWeights::default(),
            timeline: Timeline::default(),
        }
    }

    #[inline]
    pub fn with_machines<I>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = Machine>,
    {
        self.machines.clear();
        self.machines.extend(machines);
        self
    }

    #[inline]
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.clear();
        self.blocks.extend(blocks);
        self
    }

    #[inline]
    pub fn with_landings<I>(mut self, landings: I) -> Self
    where
        I: IntoIterator<Item = Landing>,
    {
        self.landings.clear();
        self.landings.extend(landings);
        self
    }

    #[inline]
    pub fn with_shifts<I, S>(mut self, shift_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timeline = self.timeline.with_shifts(shift_ids);
        self
    }

    #[inline]
    pub fn with_objective_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.objective_weights = weights;
        self
    }

    #[inline]
    pub fn with_mobilisation(mut self, config: MobilisationConfig) -> Self {
        self.mobilisation = Some(config);
        self
    }

    #[inline]
    pub fn add_machine(&mut self, machine: Machine) -> &mut Self {
        self.machines.push(machine);
        self
    }

    #[inline]
    pub fn add_block(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    #[inline]
    pub fn add_landing(&mut self, landing: Landing) -> &mut Self {
        self.landings.push(landing);
        self
    }

    #[inline]
    pub fn add_rate(&mut self, rate: ProductionRate) -> &mut Self {
        self.production_rates.push(rate);
        self
    }

    #[inline]
    pub fn extend_rates<I>(&mut self, rates: I) -> &mut Self
    where
        I: IntoIterator<Item = ProductionRate>,
    {
        self.production_rates.extend(rates);
        self
    }

    #[inline]
    pub fn add_calendar(&mut self, entry: CalendarEntry) -> &mut Self {
        self.calendar.push(entry);
        self
    }

    #[inline]
    pub fn add_shift_calendar(&mut self, entry: ShiftCalendarEntry) -> &mut Self {
        self.shift_calendar.push(entry);
        self
    }

    #[inline]
    pub fn add_harvest_system(&mut self, system: HarvestSystem) -> &mut Self {
        self.harvest_systems.push(system);
        self
    }

    #[inline]
    pub fn add_lock(&mut self, lock: ScheduleLock) -> &mut Self {
        self.locked_assignments.push(lock);
        self
    }

    #[inline]
    pub fn add_blackout(&mut self, window: BlackoutWindow) -> &mut Self {
        self.timeline.blackouts.push(window);
        self
    }

    #[inline]
    pub fn build(self) -> Result<Scenario, ScenarioError> {
        let scenario = Scenario::from_parts(
            self.name,
            self.num_days,
            self.machines,
            self.blocks,
            self.landings,
            self.calendar,
            self.shift_calendar,
            self.production_rates,
            self.harvest_systems,
            self.mobilisation,
            self.locked_assignments,
            self.objective_weights,
            self.timeline,
        );
        scenario.validate()?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{mobilisation::BlockDistance, system::SystemJob};

    fn base() -> ScenarioBuilder {
        let mut b = ScenarioBuilder::new("tiny", 3)
            .with_machines([Machine::new("M1", "feller"), Machine::new("M2", "skidder")])
            .with_landings([Landing::new("L1", 2)])
            .with_blocks([Block::new("B1", "L1", 20.0, 1, 3)]);
        b.add_rate(ProductionRate::new("M1", "B1", 10.0));
        b
    }

    #[test]
    fn test_build_valid() {
        let s = base().build().unwrap();
        assert_eq!(s.name(), "tiny");
        assert_eq!(s.num_days(), 3);
        assert_eq!(s.machines().len(), 2);
        assert_eq!(s.production_rates().len(), 1);
    }

    #[test]
    fn test_zero_days_rejected() {
        let err = ScenarioBuilder::new("empty", 0).build().unwrap_err();
        assert!(matches!(err, ScenarioError::EmptyHorizon(_)));
    }

    #[test]
    fn test_duplicate_machine_rejected() {
        let mut b = base();
        b.add_machine(Machine::new("M1", "loader"));
        let err = b.build().unwrap_err();
        match err {
            ScenarioError::DuplicateId(e) => {
                assert_eq!(e.kind(), "machine");
                assert_eq!(e.id(), "M1");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_unknown_landing_rejected() {
        let mut b = base();
        b.add_block(Block::new("B2", "L9", 5.0, 1, 1));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::UnknownReference(_)
        ));
    }

    #[test]
    fn test_window_outside_horizon_rejected() {
        let mut b = base();
        b.add_block(Block::new("B2", "L1", 5.0, 2, 4));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::InvalidWindow(_)
        ));
        let mut b = base();
        b.add_block(Block::new("B3", "L1", 5.0, 3, 2));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::InvalidWindow(_)
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut b = base();
        b.add_rate(ProductionRate::new("M2", "B1", -1.0));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::InvalidQuantity(_)
        ));
    }

    #[test]
    fn test_lock_day_out_of_range_rejected() {
        let mut b = base();
        b.add_lock(ScheduleLock::new("M1", 4, "B1"));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::DayOutOfRange(_)
        ));
    }

    #[test]
    fn test_unknown_shift_in_shift_calendar_rejected() {
        let mut b = base().with_shifts(["AM", "PM"]);
        b.add_shift_calendar(ShiftCalendarEntry::new("M1", 1, "NIGHT", false));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::UnknownReference(_)
        ));

        let mut b = base();
        b.add_shift_calendar(ShiftCalendarEntry::new("M1", 1, "S1", false));
        assert!(b.build().is_ok());
    }

    #[test]
    fn test_unknown_job_prerequisite_rejected() {
        let mut b = base();
        b.add_harvest_system(HarvestSystem::new(
            "ground",
            [SystemJob::new("skidding", "skidder", ["felling"])],
        ));
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::UnknownPrerequisite(_)
        ));
    }

    #[test]
    fn test_unknown_distance_block_rejected() {
        let b = base().with_mobilisation(
            MobilisationConfig::new().with_distance(BlockDistance::new("B1", "B7", 100.0)),
        );
        assert!(matches!(
            b.build().unwrap_err(),
            ScenarioError::UnknownReference(_)
        ));
    }

    #[test]
    fn test_undefined_harvest_system_is_tolerated() {
        let mut b = base();
        b.add_block(Block::new("B2", "L1", 5.0, 1, 2).with_harvest_system("missing"));
        assert!(b.build().is_ok());
    }
}
