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

use crate::{engine::result::Algorithm, operators::stats::OperatorStatsSnapshot};
use fhops_core::prelude::RollingMean;
use serde::Serialize;
use std::{collections::BTreeMap, io::Write};

/// Progress of a run, emitted every `telemetry_interval` iterations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub algorithm: Algorithm,
    pub iteration: usize,
    pub current_objective: f64,
    pub best_objective: f64,
    pub accepted_moves: u64,
    pub acceptance_rate: f64,
    pub restarts: u64,
    pub temperature: Option<f64>,
    /// Operator behind the most recent accepted move.
    pub last_operator: Option<&'static str>,
}

/// Emitted once when a run ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub algorithm: Algorithm,
    pub iterations: usize,
    pub initial_objective: f64,
    pub best_objective: f64,
    pub acceptance_rate: f64,
    pub restarts: u64,
    pub runtime_ms: f64,
    pub operator_stats: BTreeMap<String, OperatorStatsSnapshot>,
}

/// Live view for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchSnapshot {
    pub iteration: usize,
    pub current_objective: f64,
    pub best_objective: f64,
    pub acceptance_rate: f64,
    pub temperature: Option<f64>,
    pub rolling_mean_objective: f64,
}

pub trait TelemetrySink {
    fn record_step(&mut self, step: &StepRecord);
    fn finish(&mut self, summary: &RunSummary);
}

pub trait WatchSink {
    fn snapshot(&mut self, snapshot: &WatchSnapshot);
}

/// Forwards telemetry to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record_step(&mut self, step: &StepRecord) {
        tracing::debug!(
            algorithm = %step.algorithm,
            iteration = step.iteration,
            current = step.current_objective,
            best = step.best_objective,
            acceptance = step.acceptance_rate,
            restarts = step.restarts,
            temperature = ?step.temperature,
            "search progress"
        );
    }

    fn finish(&mut self, summary: &RunSummary) {
        tracing::info!(
            algorithm = %summary.algorithm,
            iterations = summary.iterations,
            initial = summary.initial_objective,
            best = summary.best_objective,
            acceptance = summary.acceptance_rate,
            restarts = summary.restarts,
            runtime_ms = summary.runtime_ms,
            "search finished"
        );
    }
}

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum JsonlRecord<'a> {
    Step(&'a StepRecord),
    Summary(&'a RunSummary),
}

/// Writes one JSON object per line. Write failures are logged once and
/// counted; they never abort the search.
#[derive(Debug)]
pub struct JsonlTelemetry<W: Write> {
    writer: W,
    failures: usize,
}

impl<W: Write> JsonlTelemetry<W> {
    #[inline]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failures: 0,
        }
    }

    #[inline]
    pub fn failures(&self) -> usize {
        self.failures
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, record: JsonlRecord<'_>) {
        let res = serde_json::to_writer(&mut self.writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(err) = res {
            if self.failures == 0 {
                tracing::warn!(error = %err, "telemetry write failed");
            }
            self.failures += 1;
        }
    }
}

impl<W: Write> TelemetrySink for JsonlTelemetry<W> {
    fn record_step(&mut self, step: &StepRecord) {
        self.write(JsonlRecord::Step(step));
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.write(JsonlRecord::Summary(summary));
        if let Err(err) = self.writer.flush() {
            tracing::warn!(error = %err, "telemetry flush failed");
            self.failures += 1;
        }
    }
}

/// Optional observers for a run.
#[derive(Default)]
pub struct SolveHooks<'h> {
    pub telemetry: Option<&'h mut dyn TelemetrySink>,
    pub watch: Option<&'h mut dyn WatchSink>,
}

impl<'h> SolveHooks<'h> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_telemetry(mut self, sink: &'h mut dyn TelemetrySink) -> Self {
        self.telemetry = Some(sink);
        self
    }

    #[inline]
    pub fn with_watch(mut self, sink: &'h mut dyn WatchSink) -> Self {
        self.watch = Some(sink);
        self
    }
}

const ROLLING_WINDOW: usize = 50;

/// Per-run bookkeeping shared by both drivers.
pub(crate) struct Progress<'h> {
    algorithm: Algorithm,
    hooks: SolveHooks<'h>,
    interval: usize,
    rolling: RollingMean<f64>,
    pub accepted: u64,
    pub restarts: u64,
    pub last_operator: Option<&'static str>,
}

impl<'h> Progress<'h> {
    pub fn new(algorithm: Algorithm, hooks: SolveHooks<'h>, interval: usize) -> Self {
        Self {
            algorithm,
            hooks,
            interval: interval.max(1),
            rolling: RollingMean::new(ROLLING_WINDOW),
            accepted: 0,
            restarts: 0,
            last_operator: None,
        }
    }

    #[inline]
    pub fn acceptance_rate(&self, iterations: usize) -> f64 {
        if iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / iterations as f64
        }
    }

    /// Called after every iteration; `iteration` is 1-based.
    pub fn step(&mut self, iteration: usize, current: f64, best: f64, temperature: Option<f64>) {
        let rolling_mean = self.rolling.push(current);
        let due = iteration % self.interval == 0;
        if !due {
            return;
        }
        let acceptance_rate = self.acceptance_rate(iteration);
        if let Some(sink) = self.hooks.telemetry.as_deref_mut() {
            sink.record_step(&StepRecord {
                algorithm: self.algorithm,
                iteration,
                current_objective: current,
                best_objective: best,
                accepted_moves: self.accepted,
                acceptance_rate,
                restarts: self.restarts,
                temperature,
                last_operator: self.last_operator,
            });
        }
        if let Some(watch) = self.hooks.watch.as_deref_mut() {
            watch.snapshot(&WatchSnapshot {
                iteration,
                current_objective: current,
                best_objective: best,
                acceptance_rate,
                temperature,
                rolling_mean_objective: rolling_mean,
            });
        }
    }

    pub fn finish(&mut self, summary: &RunSummary) {
        if let Some(sink) = self.hooks.telemetry.as_deref_mut() {
            sink.finish(summary);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Keeps every record for inspection.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub steps: Vec<StepRecord>,
        pub summary: Option<RunSummary>,
        pub snapshots: Vec<WatchSnapshot>,
    }

    impl TelemetrySink for RecordingSink {
        fn record_step(&mut self, step: &StepRecord) {
            self.steps.push(step.clone());
        }

        fn finish(&mut self, summary: &RunSummary) {
            self.summary = Some(summary.clone());
        }
    }

    impl WatchSink for RecordingSink {
        fn snapshot(&mut self, snapshot: &WatchSnapshot) {
            self.snapshots.push(snapshot.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{testing::RecordingSink, *};

    fn summary() -> RunSummary {
        RunSummary {
            algorithm: Algorithm::Sa,
            iterations: 4,
            initial_objective: 1.0,
            best_objective: 2.0,
            acceptance_rate: 0.5,
            restarts: 0,
            runtime_ms: 1.0,
            operator_stats: BTreeMap::new(),
        }
    }

    #[test]
    fn test_progress_respects_interval() {
        let mut sink = RecordingSink::default();
        let mut watch = RecordingSink::default();
        {
            let hooks = SolveHooks::new()
                .with_telemetry(&mut sink)
                .with_watch(&mut watch);
            let mut p = Progress::new(Algorithm::Sa, hooks, 2);
            for i in 1..=5 {
                p.accepted = i as u64;
                p.step(i, i as f64, 10.0, Some(1.0));
            }
            p.finish(&summary());
        }
        let its: Vec<_> = sink.steps.iter().map(|s| s.iteration).collect();
        assert_eq!(its, vec![2, 4]);
        assert_eq!(watch.snapshots.len(), 2);
        // mean of 1..=4
        assert!((watch.snapshots[1].rolling_mean_objective - 2.5).abs() < 1e-12);
        assert!(sink.summary.is_some());
        assert!(watch.summary.is_none());
    }

    #[test]
    fn test_jsonl_writes_one_line_per_record() {
        let mut sink = JsonlTelemetry::new(Vec::<u8>::new());
        sink.record_step(&StepRecord {
            algorithm: Algorithm::Tabu,
            iteration: 10,
            current_objective: 1.5,
            best_objective: 2.5,
            accepted_moves: 3,
            acceptance_rate: 0.3,
            restarts: 0,
            temperature: None,
            last_operator: Some("swap"),
        });
        sink.finish(&summary());
        assert_eq!(sink.failures(), 0);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["record"], "step");
        assert_eq!(first["algorithm"], "tabu");
        assert_eq!(first["last_operator"], "swap");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["record"], "summary");
    }
}
