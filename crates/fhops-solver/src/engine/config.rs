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
    engine::err::{ConfigError, InvalidParameterError, NoOperatorsEnabledError},
    eval::config::EvaluatorConfig,
    model::operational::OperationalProblem,
    operators::{OperatorTuning, registry::OperatorRegistry},
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scenarios with at least this many blocks or days get the mobilisation
/// operator profile unless the caller chose operators.
pub const LARGE_SCENARIO_THRESHOLD: usize = 30;

/// Temporarily multiplies the `mobilisation_shake` weight once the search
/// has gone `stall_threshold` iterations without an acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeBoost {
    pub stall_threshold: usize,
    pub factor: f64,
}

impl Default for ShakeBoost {
    fn default() -> Self {
        Self {
            stall_threshold: 200,
            factor: 5.0,
        }
    }
}

impl ShakeBoost {
    #[inline]
    pub fn new(stall_threshold: usize, factor: f64) -> Self {
        Self {
            stall_threshold,
            factor,
        }
    }
}

/// Operator selection shared by both drivers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSelection {
    /// Restrict the search to these operators, each with weight one.
    pub operators: Option<Vec<String>>,
    /// Explicit weights, applied after `operators`.
    pub operator_weights: Option<Vec<(String, f64)>>,
    /// Switch to the mobilisation profile on large scenarios when neither
    /// of the above is set.
    pub auto_profile: bool,
}

impl OperatorSelection {
    #[inline]
    fn is_explicit(&self) -> bool {
        self.operators.is_some() || self.operator_weights.is_some()
    }

    /// Whether the mobilisation profile kicks in for `problem`.
    pub fn wants_profile(&self, problem: &OperationalProblem<'_>) -> bool {
        self.auto_profile
            && !self.is_explicit()
            && (problem.blocks_len() >= LARGE_SCENARIO_THRESHOLD
                || problem.num_days() >= LARGE_SCENARIO_THRESHOLD)
    }

    /// Builds the registry this selection describes.
    pub fn build_registry<R: Rng>(
        &self,
        problem: &OperationalProblem<'_>,
    ) -> Result<OperatorRegistry<R>, ConfigError> {
        let mut registry = OperatorRegistry::new();
        if self.wants_profile(problem) {
            registry.apply_mobilisation_profile();
        }
        if let Some(names) = &self.operators {
            registry.enable_only(names.iter().map(String::as_str))?;
        }
        if let Some(weights) = &self.operator_weights {
            registry.set_weights(weights.iter().map(|(n, w)| (n.as_str(), *w)))?;
        }
        if !registry.has_enabled() {
            return Err(NoOperatorsEnabledError.into());
        }
        Ok(registry)
    }
}

fn positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(InvalidParameterError::new(name, value, "a positive integer").into());
    }
    Ok(())
}

fn positive_opt(name: &'static str, value: Option<usize>) -> Result<(), ConfigError> {
    value.map_or(Ok(()), |v| positive(name, v))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaConfig {
    pub iters: usize,
    pub seed: u64,
    pub selection: OperatorSelection,
    /// Candidates per iteration; one when unset.
    pub batch_size: Option<usize>,
    /// Threads used to score a batch.
    pub max_workers: Option<usize>,
    pub cooling_rate: f64,
    /// Iterations without an acceptance before reseeding; defaults to
    /// `max(1000, iters / 5)`.
    pub restart_interval: Option<usize>,
    pub shake_boost: Option<ShakeBoost>,
    /// Objective of a known solution, used to report a gap.
    pub reference_objective: Option<f64>,
    pub evaluator: EvaluatorConfig,
    pub tuning: OperatorTuning,
    /// Iterations between telemetry records.
    pub telemetry_interval: usize,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            iters: 2_000,
            seed: 42,
            selection: OperatorSelection {
                auto_profile: true,
                ..OperatorSelection::default()
            },
            batch_size: None,
            max_workers: None,
            cooling_rate: 0.999,
            restart_interval: None,
            shake_boost: None,
            reference_objective: None,
            evaluator: EvaluatorConfig::default(),
            tuning: OperatorTuning::default(),
            telemetry_interval: 100,
        }
    }
}

impl SaConfig {
    #[inline]
    pub fn new(iters: usize, seed: u64) -> Self {
        Self {
            iters,
            seed,
            ..Self::default()
        }
    }

    pub fn with_iters(mut self, iters: usize) -> Self {
        self.iters = iters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_operators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.operators = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_operator_weights<I, S>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.selection.operator_weights =
            Some(weights.into_iter().map(|(n, w)| (n.into(), w)).collect());
        self
    }

    pub fn with_auto_profile(mut self, yes: bool) -> Self {
        self.selection.auto_profile = yes;
        self
    }

    pub fn with_batch_size(mut self, batch: usize) -> Self {
        self.batch_size = Some(batch);
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_restart_interval(mut self, interval: usize) -> Self {
        self.restart_interval = Some(interval);
        self
    }

    pub fn with_shake_boost(mut self, boost: ShakeBoost) -> Self {
        self.shake_boost = Some(boost);
        self
    }

    pub fn with_reference_objective(mut self, objective: f64) -> Self {
        self.reference_objective = Some(objective);
        self
    }

    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_tuning(mut self, tuning: OperatorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_telemetry_interval(mut self, every: usize) -> Self {
        self.telemetry_interval = every.max(1);
        self
    }

    #[inline]
    pub fn effective_restart_interval(&self) -> usize {
        self.restart_interval
            .unwrap_or_else(|| default_restart_interval(self.iters))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("iteration count", self.iters)?;
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(InvalidParameterError::new(
                "cooling rate",
                self.cooling_rate,
                "a value in (0, 1)",
            )
            .into());
        }
        positive_opt("batch size", self.batch_size)?;
        positive_opt("worker count", self.max_workers)?;
        positive_opt("restart interval", self.restart_interval)?;
        if let Some(boost) = self.shake_boost {
            positive("shake stall threshold", boost.stall_threshold)?;
            if !boost.factor.is_finite() || boost.factor <= 0.0 {
                return Err(InvalidParameterError::new(
                    "shake boost factor",
                    boost.factor,
                    "a finite positive factor",
                )
                .into());
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SaConfig(iters={}, seed={}, batch={:?}, workers={:?}, cooling={}, restart={})",
            self.iters,
            self.seed,
            self.batch_size,
            self.max_workers,
            self.cooling_rate,
            self.effective_restart_interval()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabuConfig {
    pub iters: usize,
    pub seed: u64,
    pub selection: OperatorSelection,
    /// Candidates per iteration.
    pub batch_size: usize,
    pub max_workers: Option<usize>,
    /// Length of the tabu queue; defaults to `max(10, machines)`.
    pub tenure: Option<usize>,
    /// Iterations without a new best before reseeding; defaults to
    /// `max(1000, iters / 5)`.
    pub stall_limit: Option<usize>,
    pub reference_objective: Option<f64>,
    pub evaluator: EvaluatorConfig,
    pub tuning: OperatorTuning,
    pub telemetry_interval: usize,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            iters: 2_000,
            seed: 42,
            selection: OperatorSelection {
                auto_profile: true,
                ..OperatorSelection::default()
            },
            batch_size: 8,
            max_workers: None,
            tenure: None,
            stall_limit: None,
            reference_objective: None,
            evaluator: EvaluatorConfig::default(),
            tuning: OperatorTuning::default(),
            telemetry_interval: 100,
        }
    }
}

impl TabuConfig {
    #[inline]
    pub fn new(iters: usize, seed: u64) -> Self {
        Self {
            iters,
            seed,
            ..Self::default()
        }
    }

    pub fn with_iters(mut self, iters: usize) -> Self {
        self.iters = iters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_operators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.operators = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_operator_weights<I, S>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.selection.operator_weights =
            Some(weights.into_iter().map(|(n, w)| (n.into(), w)).collect());
        self
    }

    pub fn with_auto_profile(mut self, yes: bool) -> Self {
        self.selection.auto_profile = yes;
        self
    }

    pub fn with_batch_size(mut self, batch: usize) -> Self {
        self.batch_size = batch;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn with_tenure(mut self, tenure: usize) -> Self {
        self.tenure = Some(tenure);
        self
    }

    pub fn with_stall_limit(mut self, limit: usize) -> Self {
        self.stall_limit = Some(limit);
        self
    }

    pub fn with_reference_objective(mut self, objective: f64) -> Self {
        self.reference_objective = Some(objective);
        self
    }

    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_tuning(mut self, tuning: OperatorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_telemetry_interval(mut self, every: usize) -> Self {
        self.telemetry_interval = every.max(1);
        self
    }

    #[inline]
    pub fn effective_tenure(&self, machines: usize) -> usize {
        self.tenure.unwrap_or_else(|| machines.max(10))
    }

    #[inline]
    pub fn effective_stall_limit(&self) -> usize {
        self.stall_limit
            .unwrap_or_else(|| default_restart_interval(self.iters))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("iteration count", self.iters)?;
        positive("batch size", self.batch_size)?;
        positive_opt("worker count", self.max_workers)?;
        positive_opt("tabu tenure", self.tenure)?;
        positive_opt("stall limit", self.stall_limit)?;
        Ok(())
    }
}

impl std::fmt::Display for TabuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TabuConfig(iters={}, seed={}, batch={}, workers={:?}, tenure={:?}, stall_limit={})",
            self.iters,
            self.seed,
            self.batch_size,
            self.max_workers,
            self.tenure,
            self.effective_stall_limit()
        )
    }
}

#[inline]
pub fn default_restart_interval(iters: usize) -> usize {
    (iters / 5).max(1_000)
}
