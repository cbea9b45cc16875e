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
    eval::{config::EvaluatorConfig, evaluator::ScheduleEvaluator},
    model::operational::OperationalProblem,
    schedule::{AssignmentRow, Schedule, UnknownAssignmentError},
};
use fhops_model::prelude::Problem;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KpiError {
    UnknownAssignment(UnknownAssignmentError),
}

impl std::fmt::Display for KpiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KpiError::UnknownAssignment(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for KpiError {}

impl From<UnknownAssignmentError> for KpiError {
    fn from(err: UnknownAssignmentError) -> Self {
        KpiError::UnknownAssignment(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MachineUtilisation {
    pub assigned_slots: usize,
    pub available_slots: usize,
    pub utilisation: f64,
}

impl MachineUtilisation {
    fn new(assigned_slots: usize, available_slots: usize) -> Self {
        Self {
            assigned_slots,
            available_slots,
            utilisation: ratio(assigned_slots, available_slots),
        }
    }
}

/// Indicators for a replayed plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiResult {
    pub objective: f64,
    pub production_total: f64,
    pub completed_blocks: usize,
    pub leftover_total: f64,
    pub mobilisation_cost: f64,
    pub transitions: u64,
    pub landing_slack: f64,
    pub penalty_total: f64,
    pub assigned_slots: usize,
    pub available_slots: usize,
    /// Assigned slots over slots the machines could have worked.
    pub utilisation: f64,
    pub machines: BTreeMap<String, MachineUtilisation>,
}

#[inline]
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

pub trait KpiCalculator {
    fn compute(&self, problem: &Problem, rows: &[AssignmentRow]) -> Result<KpiResult, KpiError>;
}

/// Replays rows through the evaluator with the given penalties.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKpiCalculator {
    evaluator: EvaluatorConfig,
}

impl DefaultKpiCalculator {
    #[inline]
    pub fn new(evaluator: EvaluatorConfig) -> Self {
        Self { evaluator }
    }
}

impl KpiCalculator for DefaultKpiCalculator {
    fn compute(&self, problem: &Problem, rows: &[AssignmentRow]) -> Result<KpiResult, KpiError> {
        let op = OperationalProblem::new(problem);
        let planned = Schedule::from_assignments(&op, rows)?;
        let evaluator = ScheduleEvaluator::new(&op, self.evaluator);
        let repaired = evaluator.repair(&planned);
        let bd = evaluator.breakdown(&repaired);

        let mut machines = BTreeMap::new();
        let (mut assigned_total, mut available_total) = (0, 0);
        for m in op.machine_indices() {
            let available = op.shift_indices().filter(|&s| op.slot_open(m, s)).count();
            let assigned = repaired
                .machine_row(m)
                .iter()
                .filter(|b| b.is_some())
                .count();
            assigned_total += assigned;
            available_total += available;
            machines.insert(
                op.machine_id(m).to_string(),
                MachineUtilisation::new(assigned, available),
            );
        }

        Ok(KpiResult {
            objective: bd.objective,
            production_total: bd.production_total,
            completed_blocks: bd.completed_blocks,
            leftover_total: bd.leftover_total,
            mobilisation_cost: bd.mobilisation_total,
            transitions: bd.transition_count,
            landing_slack: bd.landing_slack_total,
            penalty_total: bd.penalty_total,
            assigned_slots: assigned_total,
            available_slots: available_total,
            utilisation: ratio(assigned_total, available_total),
            machines,
        })
    }
}

/// Replays `rows` with default penalties.
pub fn compute_kpis(problem: &Problem, rows: &[AssignmentRow]) -> Result<KpiResult, KpiError> {
    DefaultKpiCalculator::default().compute(problem, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{config::SaConfig, sa::solve_sa, testing};
    use fhops_model::prelude::*;

    fn problem() -> Problem {
        let mut b = ScenarioBuilder::new("kpi", 3)
            .with_machines([Machine::new("M1", "X"), Machine::new("M2", "X")])
            .with_landings([Landing::new("L1", 2)])
            .with_blocks([
                Block::new("B1", "L1", 8.0, 1, 3),
                Block::new("B2", "L1", 30.0, 1, 3),
            ]);
        b.extend_rates([
            ProductionRate::new("M1", "B1", 4.0),
            ProductionRate::new("M2", "B2", 5.0),
        ]);
        b.add_calendar(CalendarEntry::new("M2", 3, false));
        Problem::new(b.build().unwrap()).unwrap()
    }

    #[test]
    fn test_replay_counts_production_and_utilisation() {
        let p = problem();
        let rows = vec![
            AssignmentRow::new("M1", "B1", 1, "S1"),
            AssignmentRow::new("M1", "B1", 2, "S1"),
            AssignmentRow::new("M2", "B2", 1, "S1"),
        ];
        let k = compute_kpis(&p, &rows).unwrap();
        assert_eq!(k.completed_blocks, 1);
        // M2 keeps going on B2 on day two
        assert!((k.production_total - 18.0).abs() < 1e-9);
        assert!((k.leftover_total - 20.0).abs() < 1e-9);
        assert_eq!(k.available_slots, 5);
        assert_eq!(k.assigned_slots, 4);
        assert!((k.utilisation - 0.8).abs() < 1e-12);
        assert_eq!(k.machines["M2"].available_slots, 2);
        assert_eq!(k.machines["M2"].assigned_slots, 2);
    }

    #[test]
    fn test_unknown_row_is_an_error() {
        let p = problem();
        let rows = vec![AssignmentRow::new("M9", "B1", 1, "S1")];
        assert!(matches!(
            compute_kpis(&p, &rows),
            Err(KpiError::UnknownAssignment(_))
        ));
        let rows = vec![AssignmentRow::new("M1", "B1", 7, "S1")];
        assert!(compute_kpis(&p, &rows).is_err());
    }

    #[test]
    fn test_replay_of_solver_output_matches_objective() {
        let p = testing::mixed();
        let res = solve_sa(&p, &SaConfig::new(100, 6)).unwrap();
        let k = compute_kpis(&p, &res.assignments).unwrap();
        assert!((k.objective - res.objective).abs() < 1e-6);
        assert_eq!(k.completed_blocks, res.meta.breakdown.completed_blocks);
    }
}
