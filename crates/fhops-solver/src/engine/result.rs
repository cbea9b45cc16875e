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
    eval::evaluator::ScoreBreakdown, operators::stats::OperatorStatsSnapshot,
    schedule::{AssignmentRow, Schedule},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which driver produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Sa,
    Tabu,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Sa => write!(f, "sa"),
            Algorithm::Tabu => write!(f, "tabu"),
        }
    }
}

/// Run statistics reported next to the best schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMeta {
    pub algorithm: Algorithm,
    pub iterations: usize,
    pub seed: u64,
    pub initial_objective: f64,
    pub best_objective: f64,
    pub accepted_moves: u64,
    pub acceptance_rate: f64,
    pub restarts: u64,
    pub batch_size: usize,
    pub workers: usize,
    /// Temperature when the run ended (SA only).
    pub final_temperature: Option<f64>,
    /// Tabu queue length (tabu only).
    pub tenure: Option<usize>,
    /// Name of the weight profile switched on automatically, if any.
    pub profile: Option<&'static str>,
    /// Number of times the shake boost fired (SA only).
    pub shake_boosts: u64,
    pub operator_weights: BTreeMap<String, f64>,
    pub operator_stats: BTreeMap<String, OperatorStatsSnapshot>,
    pub reference_objective: Option<f64>,
    /// `(reference - objective) / max(|reference|, 1e-9)`.
    pub reference_gap: Option<f64>,
    pub breakdown: ScoreBreakdown,
    pub runtime_ms: f64,
}

/// Relative distance to a reference objective. Positive means worse.
#[inline]
pub fn reference_gap(reference: f64, objective: f64) -> f64 {
    (reference - objective) / reference.abs().max(1e-9)
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveResult {
    pub objective: f64,
    pub assignments: Vec<AssignmentRow>,
    pub meta: RunMeta,
    #[serde(skip)]
    pub schedule: Schedule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_gap_sign() {
        assert!((reference_gap(100.0, 90.0) - 0.1).abs() < 1e-12);
        assert!(reference_gap(100.0, 110.0) < 0.0);
        assert!((reference_gap(0.0, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_algorithm_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Algorithm::Tabu).unwrap(), "\"tabu\"");
        assert_eq!(Algorithm::Sa.to_string(), "sa");
    }
}
