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

pub mod engine;
pub mod eval;
pub mod greedy;
pub mod kpi;
pub mod model;
pub mod operators;
pub mod schedule;

pub mod prelude {
    pub use crate::engine::config::{
        LARGE_SCENARIO_THRESHOLD, OperatorSelection, SaConfig, ShakeBoost, TabuConfig,
        default_restart_interval,
    };
    pub use crate::engine::err::{
        ConfigError, InvalidParameterError, MalformedWeightError, NoOperatorsEnabledError,
        UnknownOperatorError,
    };
    pub use crate::engine::pool::{ScoredCandidate, ScoringPool};
    pub use crate::engine::result::{Algorithm, RunMeta, SolveResult, reference_gap};
    pub use crate::engine::sa::{solve_sa, solve_sa_with};
    pub use crate::engine::tabu::{TabuList, solve_tabu, solve_tabu_with};
    pub use crate::engine::telemetry::{
        JsonlTelemetry, RunSummary, SolveHooks, StepRecord, TelemetrySink, TracingTelemetry,
        WatchSink, WatchSnapshot,
    };
    pub use crate::eval::config::EvaluatorConfig;
    pub use crate::eval::evaluator::{ScheduleEvaluator, ScoreBreakdown};
    pub use crate::greedy::init_greedy_schedule;
    pub use crate::kpi::{
        DefaultKpiCalculator, KpiCalculator, KpiError, KpiResult, MachineUtilisation, compute_kpis,
    };
    pub use crate::model::index::{BlockIndex, LandingIndex, MachineIndex, RoleIndex, ShiftIndex};
    pub use crate::model::operational::OperationalProblem;
    pub use crate::model::sanitizer::Sanitizer;
    pub use crate::operators::neighbors::{Candidate, generate_neighbors};
    pub use crate::operators::registry::{
        MOBILISATION_PROFILE, OPERATOR_NAMES, OperatorRegistry, parse_operator_names,
        parse_operator_weights,
    };
    pub use crate::operators::stats::{OperatorStats, OperatorStatsSnapshot, OperatorStatsTable};
    pub use crate::operators::{Operator, OperatorContext, OperatorTuning};
    pub use crate::schedule::{AssignmentRow, MoveDiff, Schedule, UnknownAssignmentError};
}
