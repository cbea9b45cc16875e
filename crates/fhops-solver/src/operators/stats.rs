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

use fhops_core::prelude::Ewma;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

#[inline]
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

/// Per-operator counters with smoothed runtime and acceptance.
#[derive(Debug, Clone)]
pub struct OperatorStats {
    /// `apply()` calls, including ones that produced nothing
    pub proposals: u64,
    /// calls that produced a candidate
    pub produced: u64,
    /// calls that returned `None`
    pub skipped: u64,
    /// produced candidates the driver accepted
    pub accepted: u64,

    /// wall time per `apply()` in milliseconds
    pub ew_runtime_ms: Ewma<f64>,
    /// acceptance probability over produced candidates
    pub ew_accept: Ewma<f64>,
}

impl Default for OperatorStats {
    fn default() -> Self {
        Self::new(0.20, 0.25)
    }
}

impl OperatorStats {
    pub fn new(runtime_alpha: f64, accept_alpha: f64) -> Self {
        Self {
            proposals: 0,
            produced: 0,
            skipped: 0,
            accepted: 0,
            ew_runtime_ms: Ewma::clamped(runtime_alpha),
            ew_accept: Ewma::clamped(accept_alpha),
        }
    }

    /// Record one `apply()` call started at `start`.
    pub fn record_propose(&mut self, start: Instant, produced: bool) {
        self.proposals = self.proposals.saturating_add(1);
        self.ew_runtime_ms.observe(duration_ms(start.elapsed()));
        if produced {
            self.produced = self.produced.saturating_add(1);
        } else {
            self.skipped = self.skipped.saturating_add(1);
        }
    }

    /// Record whether a produced candidate was taken by the driver.
    pub fn record_outcome(&mut self, accepted: bool) {
        if accepted {
            self.accepted = self.accepted.saturating_add(1);
            self.ew_accept.observe(1.0);
        } else {
            self.ew_accept.observe(0.0);
        }
    }

    /// How often the operator yields a candidate.
    #[inline]
    pub fn production_ratio(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.produced as f64 / self.proposals as f64
        }
    }

    /// Acceptance ratio conditional on a candidate being produced.
    #[inline]
    pub fn acceptance_ratio(&self) -> f64 {
        if self.produced == 0 {
            0.0
        } else {
            self.accepted as f64 / self.produced as f64
        }
    }

    pub fn snapshot(&self) -> OperatorStatsSnapshot {
        OperatorStatsSnapshot {
            proposals: self.proposals,
            produced: self.produced,
            skipped: self.skipped,
            accepted: self.accepted,
            acceptance_ratio: self.acceptance_ratio(),
            ew_runtime_ms: self.ew_runtime_ms.value_or(0.0),
            ew_accept: self.ew_accept.value_or(0.0),
        }
    }
}

/// Serialisable view of [`OperatorStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorStatsSnapshot {
    pub proposals: u64,
    pub produced: u64,
    pub skipped: u64,
    pub accepted: u64,
    pub acceptance_ratio: f64,
    pub ew_runtime_ms: f64,
    pub ew_accept: f64,
}

/// Stats for every operator that has run, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct OperatorStatsTable {
    entries: BTreeMap<&'static str, OperatorStats>,
}

impl OperatorStatsTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&OperatorStats> {
        self.entries.get(name)
    }

    #[inline]
    pub fn entry(&mut self, name: &'static str) -> &mut OperatorStats {
        self.entries.entry(name).or_default()
    }

    #[inline]
    pub fn record_propose(&mut self, name: &'static str, start: Instant, produced: bool) {
        self.entry(name).record_propose(start, produced);
    }

    #[inline]
    pub fn record_outcome(&mut self, name: &'static str, accepted: bool) {
        self.entry(name).record_outcome(accepted);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OperatorStats)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn total_proposals(&self) -> u64 {
        self.entries.values().map(|s| s.proposals).sum()
    }

    pub fn snapshot(&self) -> BTreeMap<String, OperatorStatsSnapshot> {
        self.entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.snapshot()))
            .collect()
    }
}
