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
    index::{BlockIndex, LandingIndex, MachineIndex, RoleIndex, ShiftIndex},
    ledger::{RoleWorkLedger, WorkKey},
    sanitizer::Sanitizer,
};
use fhops_model::prelude::{
    BlockId, Day, MachineId, MachineMobilisation, ObjectiveWeights, Problem, ShiftSlot,
};
use std::{collections::HashMap, ops::Range};

/// Remaining work at or below this is treated as done.
pub const WORK_EPSILON: f64 = 1e-6;

/// Dense, read-only view of a [`Problem`] shaped for the search.
///
/// Built once per solve and shared by reference between the greedy seed,
/// the sanitizer, the evaluator and every operator.
#[derive(Debug, Clone)]
pub struct OperationalProblem<'p> {
    problem: &'p Problem,
    machines_len: usize,
    blocks_len: usize,
    landings_len: usize,
    shifts_len: usize,
    shifts_per_day: usize,
    num_days: usize,
    machine_lookup: HashMap<&'p str, MachineIndex>,
    block_lookup: HashMap<&'p str, BlockIndex>,
    role_names: Vec<String>,
    machine_role: Vec<RoleIndex>,              // len = M
    machines_by_role: Vec<Vec<MachineIndex>>,  // len = R
    rates: Vec<f64>,                           // len = M * B
    block_landing: Vec<LandingIndex>,          // len = B
    landing_capacity: Vec<u32>,                // len = L
    block_windows: Vec<(Day, Day)>,            // len = B
    work_required: Vec<f64>,                   // len = B
    allowed_roles: Vec<Option<Vec<RoleIndex>>>, // len = B
    prereq_roles: Vec<Vec<RoleIndex>>,         // len = B * R
    headstart_shifts: Vec<u32>,                // len = B * R
    terminal_roles: Vec<Vec<RoleIndex>>,       // len = B
    loader_batch: Vec<Option<f64>>,            // len = B
    shift_day: Vec<Day>,                       // len = S
    available: Vec<bool>,                      // len = M * S
    blackout_shifts: Vec<bool>,                // len = S
    locks: Vec<Option<BlockIndex>>,            // len = M * D
    mobilisation: Vec<Option<MachineMobilisation>>, // len = M
    distances: Vec<f64>,                       // len = B * B
    weights: ObjectiveWeights,
}

impl<'p> OperationalProblem<'p> {
    pub fn new(problem: &'p Problem) -> Self {
        let scenario = problem.scenario();
        let machines = scenario.machines();
        let blocks = scenario.blocks();
        let landings = scenario.landings();
        let machines_len = machines.len();
        let blocks_len = blocks.len();
        let shifts_len = problem.shifts().len();
        let shifts_per_day = problem.shift_ids().len().max(1);
        let num_days = scenario.num_days() as usize;

        let machine_lookup: HashMap<&str, MachineIndex> = machines
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id().as_str(), MachineIndex(i)))
            .collect();
        let block_lookup: HashMap<&str, BlockIndex> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id().as_str(), BlockIndex(i)))
            .collect();
        let landing_lookup: HashMap<&str, LandingIndex> = landings
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id().as_str(), LandingIndex(i)))
            .collect();

        let mut role_names: Vec<String> = Vec::new();
        let mut machine_role = Vec::with_capacity(machines_len);
        for m in machines {
            let r = match role_names.iter().position(|n| n == m.role()) {
                Some(r) => r,
                None => {
                    role_names.push(m.role().to_owned());
                    role_names.len() - 1
                }
            };
            machine_role.push(RoleIndex(r));
        }
        let roles_len = role_names.len();
        let role_of = |name: &str| role_names.iter().position(|n| n == name).map(RoleIndex);

        let mut machines_by_role = vec![Vec::new(); roles_len];
        for (i, r) in machine_role.iter().enumerate() {
            machines_by_role[r.get()].push(MachineIndex(i));
        }

        let mut rates = vec![0.0; machines_len * blocks_len];
        for pr in scenario.production_rates() {
            if let (Some(m), Some(b)) = (
                machine_lookup.get(pr.machine_id.as_str()),
                block_lookup.get(pr.block_id.as_str()),
            ) {
                rates[m.get() * blocks_len + b.get()] = pr.rate;
            }
        }

        let block_landing: Vec<LandingIndex> = blocks
            .iter()
            .map(|b| {
                landing_lookup
                    .get(b.landing_id().as_str())
                    .copied()
                    .unwrap_or(LandingIndex(0))
            })
            .collect();
        let landing_capacity: Vec<u32> = landings.iter().map(|l| l.daily_capacity()).collect();
        let block_windows = blocks
            .iter()
            .map(|b| (b.earliest_start(), b.latest_finish()))
            .collect();
        let work_required = blocks.iter().map(|b| b.work_required()).collect();

        let mut allowed_roles = Vec::with_capacity(blocks_len);
        let mut prereq_roles = vec![Vec::new(); blocks_len * roles_len];
        let mut headstart_shifts = vec![0; blocks_len * roles_len];
        let mut terminal_roles = vec![Vec::new(); blocks_len];
        let mut loader_batch = vec![None; blocks_len];
        for (bi, block) in blocks.iter().enumerate() {
            let Some(system) = block
                .harvest_system_id()
                .and_then(|sid| scenario.harvest_system(sid))
            else {
                allowed_roles.push(None);
                continue;
            };
            let present: Vec<RoleIndex> = system.roles().into_iter().filter_map(role_of).collect();
            for &r in &present {
                let name = role_names[r.get()].as_str();
                prereq_roles[bi * roles_len + r.get()] = system
                    .prerequisite_roles(name)
                    .into_iter()
                    .filter_map(role_of)
                    .collect();
                headstart_shifts[bi * roles_len + r.get()] = system.headstart_for(name);
            }
            terminal_roles[bi] = present
                .iter()
                .copied()
                .filter(|&r| {
                    !present
                        .iter()
                        .any(|&q| prereq_roles[bi * roles_len + q.get()].contains(&r))
                })
                .collect();
            loader_batch[bi] = system.loader_batch_volume();
            allowed_roles.push(Some(present));
        }

        let shift_day: Vec<Day> = problem.shifts().iter().map(|s| s.day).collect();
        let blackout_shifts = shift_day.iter().map(|&d| problem.is_blackout(d)).collect();

        let mut available = vec![true; machines_len * shifts_len];
        for entry in scenario.calendar().iter().filter(|e| !e.available) {
            if let Some(m) = machine_lookup.get(entry.machine_id.as_str()) {
                for s in day_range(entry.day, shifts_per_day, shifts_len) {
                    available[m.get() * shifts_len + s] = false;
                }
            }
        }
        for entry in scenario.shift_calendar().iter().filter(|e| !e.available) {
            if let (Some(m), Some(pos)) = (
                machine_lookup.get(entry.machine_id.as_str()),
                problem.shift_position(&entry.shift_id),
            ) {
                let s = (entry.day as usize - 1) * shifts_per_day + pos;
                if s < shifts_len {
                    available[m.get() * shifts_len + s] = false;
                }
            }
        }

        let mut locks = vec![None; machines_len * num_days];
        for lock in scenario.locked_assignments() {
            if let (Some(m), Some(b)) = (
                machine_lookup.get(lock.machine_id.as_str()),
                block_lookup.get(lock.block_id.as_str()),
            ) && lock.day >= 1
                && (lock.day as usize) <= num_days
            {
                locks[m.get() * num_days + lock.day as usize - 1] = Some(*b);
            }
        }

        let mut mobilisation = vec![None; machines_len];
        let mut distances = vec![0.0; blocks_len * blocks_len];
        if let Some(config) = scenario.mobilisation() {
            for params in &config.machine_params {
                if let Some(m) = machine_lookup.get(params.machine_id.as_str()) {
                    mobilisation[m.get()] = Some(params.clone());
                }
            }
            let pairs: Vec<(usize, usize, f64)> = config
                .distances
                .iter()
                .filter_map(|d| {
                    let a = block_lookup.get(d.from_block.as_str())?;
                    let b = block_lookup.get(d.to_block.as_str())?;
                    Some((a.get(), b.get(), d.distance_m))
                })
                .collect();
            // Fill both directions first so an explicitly listed reverse
            // direction overrides the mirrored value.
            for &(a, b, d) in &pairs {
                distances[a * blocks_len + b] = d;
                distances[b * blocks_len + a] = d;
            }
            for &(a, b, d) in &pairs {
                distances[a * blocks_len + b] = d;
            }
        }

        Self {
            problem,
            machines_len,
            blocks_len,
            landings_len: landings.len(),
            shifts_len,
            shifts_per_day,
            num_days,
            machine_lookup,
            block_lookup,
            role_names,
            machine_role,
            machines_by_role,
            rates,
            block_landing,
            landing_capacity,
            block_windows,
            work_required,
            allowed_roles,
            prereq_roles,
            headstart_shifts,
            terminal_roles,
            loader_batch,
            shift_day,
            available,
            blackout_shifts,
            locks,
            mobilisation,
            distances,
            weights: *scenario.objective_weights(),
        }
    }

    #[inline]
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    #[inline]
    pub fn machines_len(&self) -> usize {
        self.machines_len
    }

    #[inline]
    pub fn blocks_len(&self) -> usize {
        self.blocks_len
    }

    #[inline]
    pub fn landings_len(&self) -> usize {
        self.landings_len
    }

    #[inline]
    pub fn roles_len(&self) -> usize {
        self.role_names.len()
    }

    #[inline]
    pub fn shifts_len(&self) -> usize {
        self.shifts_len
    }

    #[inline]
    pub fn shifts_per_day(&self) -> usize {
        self.shifts_per_day
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    #[inline]
    pub fn machine_indices(&self) -> impl Iterator<Item = MachineIndex> + use<> {
        (0..self.machines_len).map(MachineIndex)
    }

    #[inline]
    pub fn block_indices(&self) -> impl Iterator<Item = BlockIndex> + use<> {
        (0..self.blocks_len).map(BlockIndex)
    }

    #[inline]
    pub fn shift_indices(&self) -> impl Iterator<Item = ShiftIndex> + use<> {
        (0..self.shifts_len).map(ShiftIndex)
    }

    #[inline]
    pub fn machine_id(&self, m: MachineIndex) -> &'p MachineId {
        self.problem.scenario().machines()[m.get()].id()
    }

    #[inline]
    pub fn block_id(&self, b: BlockIndex) -> &'p BlockId {
        self.problem.scenario().blocks()[b.get()].id()
    }

    #[inline]
    pub fn machine_index_by_name(&self, id: &str) -> Option<MachineIndex> {
        self.machine_lookup.get(id).copied()
    }

    #[inline]
    pub fn block_index_by_name(&self, id: &str) -> Option<BlockIndex> {
        self.block_lookup.get(id).copied()
    }

    #[inline]
    pub fn shift_slot(&self, s: ShiftIndex) -> &'p ShiftSlot {
        &self.problem.shifts()[s.get()]
    }

    #[inline]
    pub fn shift_index(&self, day: Day, shift_id: &str) -> Option<ShiftIndex> {
        if day == 0 || day as usize > self.num_days {
            return None;
        }
        let pos = self.problem.shift_position(shift_id)?;
        Some(ShiftIndex((day as usize - 1) * self.shifts_per_day + pos))
    }

    #[inline]
    pub fn shift_day(&self, s: ShiftIndex) -> Day {
        debug_assert!(s.get() < self.shifts_len);
        self.shift_day[s.get()]
    }

    /// Shift indices falling on `day`.
    #[inline]
    pub fn shifts_of_day(&self, day: Day) -> Range<usize> {
        day_range(day, self.shifts_per_day, self.shifts_len)
    }

    #[inline]
    pub fn machine_role(&self, m: MachineIndex) -> RoleIndex {
        self.machine_role[m.get()]
    }

    #[inline]
    pub fn role_name(&self, r: RoleIndex) -> &str {
        &self.role_names[r.get()]
    }

    #[inline]
    pub fn machines_by_role(&self, r: RoleIndex) -> &[MachineIndex] {
        &self.machines_by_role[r.get()]
    }

    #[inline]
    pub fn rate(&self, m: MachineIndex, b: BlockIndex) -> f64 {
        debug_assert!(m.get() < self.machines_len);
        debug_assert!(b.get() < self.blocks_len);
        self.rates[m.get() * self.blocks_len + b.get()]
    }

    #[inline]
    pub fn landing_of(&self, b: BlockIndex) -> LandingIndex {
        self.block_landing[b.get()]
    }

    #[inline]
    pub fn landing_capacity(&self, l: LandingIndex) -> u32 {
        self.landing_capacity[l.get()]
    }

    #[inline]
    pub fn window(&self, b: BlockIndex) -> (Day, Day) {
        self.block_windows[b.get()]
    }

    #[inline]
    pub fn window_contains(&self, b: BlockIndex, day: Day) -> bool {
        let (lo, hi) = self.block_windows[b.get()];
        lo <= day && day <= hi
    }

    #[inline]
    pub fn work_required(&self, b: BlockIndex) -> f64 {
        self.work_required[b.get()]
    }

    /// `None` when any role may work the block.
    #[inline]
    pub fn allowed_roles(&self, b: BlockIndex) -> Option<&[RoleIndex]> {
        self.allowed_roles[b.get()].as_deref()
    }

    #[inline]
    pub fn is_restricted(&self, b: BlockIndex) -> bool {
        self.allowed_roles[b.get()].is_some()
    }

    #[inline]
    pub fn role_allowed(&self, b: BlockIndex, r: RoleIndex) -> bool {
        self.allowed_roles(b).is_none_or(|roles| roles.contains(&r))
    }

    /// Role-eligible with a positive rate.
    #[inline]
    pub fn can_work(&self, m: MachineIndex, b: BlockIndex) -> bool {
        self.rate(m, b) > 0.0 && self.role_allowed(b, self.machine_role(m))
    }

    #[inline]
    pub fn prereq_roles(&self, b: BlockIndex, r: RoleIndex) -> &[RoleIndex] {
        if self.roles_len() == 0 {
            return &[];
        }
        &self.prereq_roles[b.get() * self.roles_len() + r.get()]
    }

    #[inline]
    pub fn headstart_shifts(&self, b: BlockIndex, r: RoleIndex) -> u32 {
        if self.roles_len() == 0 {
            return 0;
        }
        self.headstart_shifts[b.get() * self.roles_len() + r.get()]
    }

    #[inline]
    pub fn terminal_roles(&self, b: BlockIndex) -> &[RoleIndex] {
        &self.terminal_roles[b.get()]
    }

    #[inline]
    pub fn loader_batch_volume(&self, b: BlockIndex) -> Option<f64> {
        self.loader_batch[b.get()]
    }

    #[inline]
    pub fn is_available(&self, m: MachineIndex, s: ShiftIndex) -> bool {
        self.available[m.get() * self.shifts_len + s.get()]
    }

    #[inline]
    pub fn is_blackout(&self, s: ShiftIndex) -> bool {
        self.blackout_shifts[s.get()]
    }

    /// Available and not blacked out.
    #[inline]
    pub fn slot_open(&self, m: MachineIndex, s: ShiftIndex) -> bool {
        self.is_available(m, s) && !self.is_blackout(s)
    }

    #[inline]
    pub fn locked_block(&self, m: MachineIndex, day: Day) -> Option<BlockIndex> {
        if day == 0 || day as usize > self.num_days {
            return None;
        }
        self.locks[m.get() * self.num_days + day as usize - 1]
    }

    #[inline]
    pub fn locked_at(&self, m: MachineIndex, s: ShiftIndex) -> Option<BlockIndex> {
        self.locked_block(m, self.shift_day(s))
    }

    #[inline]
    pub fn is_locked(&self, m: MachineIndex, s: ShiftIndex) -> bool {
        self.locked_at(m, s).is_some()
    }

    /// Every `(machine, day, block)` lock.
    pub fn locks(&self) -> impl Iterator<Item = (MachineIndex, Day, BlockIndex)> + '_ {
        let days = self.num_days.max(1);
        self.locks.iter().enumerate().filter_map(move |(i, l)| {
            l.map(|b| (MachineIndex(i / days), (i % days) as Day + 1, b))
        })
    }

    #[inline]
    pub fn mobilisation(&self, m: MachineIndex) -> Option<&MachineMobilisation> {
        self.mobilisation[m.get()].as_ref()
    }

    /// Missing pairs are zero apart.
    #[inline]
    pub fn distance(&self, from: BlockIndex, to: BlockIndex) -> f64 {
        self.distances[from.get() * self.blocks_len + to.get()]
    }

    /// Zero for machines without mobilisation parameters.
    #[inline]
    pub fn transition_cost(&self, m: MachineIndex, from: BlockIndex, to: BlockIndex) -> f64 {
        self.mobilisation(m)
            .map_or(0.0, |p| p.transition_cost(self.distance(from, to)))
    }

    #[inline]
    pub fn weights(&self) -> &ObjectiveWeights {
        &self.weights
    }

    #[inline]
    pub fn new_ledger(&self) -> RoleWorkLedger {
        RoleWorkLedger::new(self.blocks_len, self.roles_len())
    }

    #[inline]
    pub fn work_key(&self, b: BlockIndex, r: RoleIndex) -> WorkKey {
        if self.is_restricted(b) {
            WorkKey::Role(r)
        } else {
            WorkKey::Pooled
        }
    }

    /// Work role `r` still has to do on `b`. Under a harvest system every
    /// role handles the full volume.
    #[inline]
    pub fn role_remaining(&self, ledger: &RoleWorkLedger, b: BlockIndex, r: RoleIndex) -> f64 {
        (self.work_required(b) - ledger.units(b, self.work_key(b, r))).max(0.0)
    }

    /// Work left before the block counts as complete: the pooled counter, or
    /// the slowest terminal role.
    pub fn block_remaining(&self, ledger: &RoleWorkLedger, b: BlockIndex) -> f64 {
        let work = self.work_required(b);
        if !self.is_restricted(b) {
            return (work - ledger.units(b, WorkKey::Pooled)).max(0.0);
        }
        let terminal = self.terminal_roles(b);
        if terminal.is_empty() {
            return work;
        }
        terminal
            .iter()
            .map(|&t| (work - ledger.units(b, WorkKey::Role(t))).max(0.0))
            .fold(0.0, f64::max)
    }

    /// Units role `r` may still bank on `b` this shift given what its
    /// prerequisite roles have produced. Head-start and loader-batch rules
    /// can hold it at zero.
    pub fn prerequisite_allowance(&self, ledger: &RoleWorkLedger, b: BlockIndex, r: RoleIndex) -> f64 {
        let remaining = self.role_remaining(ledger, b, r);
        if remaining <= WORK_EPSILON {
            return 0.0;
        }
        let prereqs = self.prereq_roles(b, r);
        if prereqs.is_empty() {
            return remaining;
        }

        let work = self.work_required(b);
        let headstart = self.headstart_shifts(b, r);
        let mut upstream = f64::INFINITY;
        let mut upstream_done = true;
        for &p in prereqs {
            let key = WorkKey::Role(p);
            if headstart > 0 && ledger.shifts_worked(b, key) < headstart {
                return 0.0;
            }
            let u = ledger.units(b, key);
            upstream = upstream.min(u);
            if work - u > WORK_EPSILON {
                upstream_done = false;
            }
        }
        let buffer = (upstream - ledger.units(b, WorkKey::Role(r))).max(0.0);

        if let Some(batch) = self.loader_batch_volume(b)
            && !upstream_done
            && buffer + WORK_EPSILON < batch
            && self.terminal_roles(b).contains(&r)
        {
            return 0.0;
        }
        buffer.min(remaining)
    }

    #[inline]
    pub fn build_sanitizer(&self) -> Sanitizer<'_> {
        Sanitizer::new(self)
    }
}

#[inline]
fn day_range(day: Day, shifts_per_day: usize, shifts_len: usize) -> Range<usize> {
    if day == 0 {
        return 0..0;
    }
    let start = ((day as usize - 1) * shifts_per_day).min(shifts_len);
    let end = (start + shifts_per_day).min(shifts_len);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhops_model::prelude::*;

    fn system_scenario() -> Problem {
        let mut b = ScenarioBuilder::new("sys", 3)
            .with_shifts(["AM", "PM"])
            .with_machines([
                Machine::new("F1", "feller"),
                Machine::new("S1", "skidder"),
                Machine::new("L1", "loader"),
                Machine::new("F2", "feller"),
            ])
            .with_landings([Landing::new("LD", 2)])
            .with_blocks([
                Block::new("B1", "LD", 20.0, 1, 3).with_harvest_system("ground"),
                Block::new("B2", "LD", 10.0, 2, 3),
            ])
            .with_mobilisation(
                MobilisationConfig::new()
                    .with_machine(
                        MachineMobilisation::new("F1")
                            .with_walk(1.0, 500.0)
                            .with_move_cost_flat(900.0)
                            .with_setup_cost(50.0),
                    )
                    .with_distance(BlockDistance::new("B1", "B2", 300.0)),
            );
        b.add_harvest_system(
            HarvestSystem::new(
                "ground",
                [
                    SystemJob::new("fell", "feller", Vec::<String>::new()),
                    SystemJob::new("skid", "skidder", ["fell"]),
                    SystemJob::new("process", "processor", ["skid"]),
                    SystemJob::new("load", "loader", ["process", "skid"]),
                ],
            )
            .with_headstart("skidder", 1)
            .with_loader_batch_volume(8.0),
        );
        b.extend_rates([
            ProductionRate::new("F1", "B1", 10.0),
            ProductionRate::new("S1", "B1", 8.0),
            ProductionRate::new("L1", "B1", 12.0),
            ProductionRate::new("F2", "B2", 5.0),
        ]);
        b.add_calendar(CalendarEntry::new("F2", 2, false));
        b.add_shift_calendar(ShiftCalendarEntry::new("S1", 3, "PM", false));
        b.add_lock(ScheduleLock::new("F1", 1, "B1"));
        b.add_blackout(BlackoutWindow::new(3, 3));
        Problem::new(b.build().unwrap()).unwrap()
    }

    #[test]
    fn test_roles_and_grouping() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        assert_eq!(op.roles_len(), 3);
        assert_eq!(op.role_name(RoleIndex(0)), "feller");
        assert_eq!(
            op.machines_by_role(RoleIndex(0)),
            &[MachineIndex(0), MachineIndex(3)]
        );
        assert_eq!(op.shifts_len(), 6);
        assert_eq!(op.shifts_of_day(2), 2..4);
    }

    #[test]
    fn test_allowed_roles_and_prerequisites() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        let b1 = BlockIndex(0);
        let b2 = BlockIndex(1);
        let (feller, skidder, loader) = (RoleIndex(0), RoleIndex(1), RoleIndex(2));
        assert_eq!(op.allowed_roles(b1), Some(&[feller, skidder, loader][..]));
        assert!(op.allowed_roles(b2).is_none());
        assert!(op.role_allowed(b2, loader));
        assert!(op.prereq_roles(b1, feller).is_empty());
        assert_eq!(op.prereq_roles(b1, skidder), &[feller]);
        // processor is absent so only the skidder gates the loader
        assert_eq!(op.prereq_roles(b1, loader), &[skidder]);
        assert_eq!(op.terminal_roles(b1), &[loader]);
        assert_eq!(op.headstart_shifts(b1, skidder), 1);
    }

    #[test]
    fn test_availability_blackout_and_locks() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        let f1 = MachineIndex(0);
        let s1 = MachineIndex(1);
        let f2 = MachineIndex(3);
        assert!(!op.is_available(f2, ShiftIndex(2)));
        assert!(!op.is_available(f2, ShiftIndex(3)));
        assert!(op.is_available(f2, ShiftIndex(0)));
        assert!(!op.is_available(s1, ShiftIndex(5)));
        assert!(op.is_available(s1, ShiftIndex(4)));
        assert!(op.is_blackout(ShiftIndex(4)));
        assert!(!op.slot_open(s1, ShiftIndex(4)));
        assert_eq!(op.locked_block(f1, 1), Some(BlockIndex(0)));
        assert_eq!(op.locked_at(f1, ShiftIndex(1)), Some(BlockIndex(0)));
        assert!(!op.is_locked(f1, ShiftIndex(2)));
        assert_eq!(op.locks().collect::<Vec<_>>(), vec![(f1, 1, BlockIndex(0))]);
    }

    #[test]
    fn test_mobilisation_costs() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        let (b1, b2) = (BlockIndex(0), BlockIndex(1));
        assert_eq!(op.distance(b1, b2), 300.0);
        assert_eq!(op.distance(b2, b1), 300.0);
        assert_eq!(op.transition_cost(MachineIndex(0), b1, b2), 350.0);
        assert_eq!(op.transition_cost(MachineIndex(1), b1, b2), 0.0);
    }

    #[test]
    fn test_prerequisite_allowance_follows_upstream() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        let b1 = BlockIndex(0);
        let (feller, skidder, loader) = (RoleIndex(0), RoleIndex(1), RoleIndex(2));
        let mut ledger = op.new_ledger();
        assert_eq!(op.prerequisite_allowance(&ledger, b1, feller), 20.0);
        assert_eq!(op.prerequisite_allowance(&ledger, b1, skidder), 0.0);

        ledger.record(b1, WorkKey::Role(feller), 10.0);
        assert_eq!(op.prerequisite_allowance(&ledger, b1, skidder), 10.0);

        ledger.record(b1, WorkKey::Role(skidder), 6.0);
        // buffer 6 is below the batch volume of 8
        assert_eq!(op.prerequisite_allowance(&ledger, b1, loader), 0.0);
        ledger.record(b1, WorkKey::Role(skidder), 4.0);
        assert_eq!(op.prerequisite_allowance(&ledger, b1, loader), 10.0);
        assert_eq!(op.block_remaining(&ledger, b1), 20.0);
    }

    #[test]
    fn test_headstart_holds_downstream_role() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        let b1 = BlockIndex(0);
        let mut ledger = op.new_ledger();
        // no feller shift booked yet, so the skidder must wait
        assert_eq!(op.prerequisite_allowance(&ledger, b1, RoleIndex(1)), 0.0);
        ledger.record(b1, WorkKey::Role(RoleIndex(0)), 5.0);
        assert_eq!(op.prerequisite_allowance(&ledger, b1, RoleIndex(1)), 5.0);
    }

    #[test]
    fn test_shift_index_lookup() {
        let p = system_scenario();
        let op = OperationalProblem::new(&p);
        assert_eq!(op.shift_index(2, "PM"), Some(ShiftIndex(3)));
        assert_eq!(op.shift_index(4, "AM"), None);
        assert_eq!(op.shift_index(1, "NIGHT"), None);
        assert_eq!(op.shift_slot(ShiftIndex(3)).shift_id, "PM");
    }
}
