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

use chrono::{DateTime, Utc};
use fhops_model::prelude::{Problem, ScenarioLoader};
use fhops_solver::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

const USAGE: &str = "\
usage: fhops --scenario <file.json> [options]

  --solver sa|tabu              search driver (default sa)
  --iters N                     iterations (default 2000)
  --seed N                      rng seed (default 42)
  --operators a,b               enable only these operators
  --operator-weight name=w,...  explicit operator weights
  --batch-size N                candidates per iteration
  --workers N                   threads used to score a batch
  --cooling-rate f              SA cooling factor in (0, 1)
  --restart-interval N          SA/tabu iterations before reseeding
  --tenure N                    tabu queue length
  --reference-objective f       report the gap to this objective
  --telemetry out.jsonl         write progress records as JSON lines
  --out run.json                write the run record here instead of stdout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverKind {
    Sa,
    Tabu,
}

#[derive(Debug, Clone, PartialEq)]
struct Args {
    scenario: PathBuf,
    solver: SolverKind,
    iters: Option<usize>,
    seed: Option<u64>,
    operators: Option<Vec<String>>,
    operator_weights: Option<Vec<(String, f64)>>,
    batch_size: Option<usize>,
    workers: Option<usize>,
    cooling_rate: Option<f64>,
    restart_interval: Option<usize>,
    tenure: Option<usize>,
    reference_objective: Option<f64>,
    telemetry: Option<PathBuf>,
    out: Option<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Config(ConfigError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, CliError> {
    raw.parse()
        .map_err(|_| CliError::Usage(format!("invalid value '{}' for {}", raw, flag)))
}

fn parse_args<I>(args: I) -> Result<Args, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut it = args.into_iter();
    let mut scenario = None;
    let mut parsed = Args {
        scenario: PathBuf::new(),
        solver: SolverKind::Sa,
        iters: None,
        seed: None,
        operators: None,
        operator_weights: None,
        batch_size: None,
        workers: None,
        cooling_rate: None,
        restart_interval: None,
        tenure: None,
        reference_objective: None,
        telemetry: None,
        out: None,
    };

    while let Some(flag) = it.next() {
        if flag == "-h" || flag == "--help" {
            return Err(CliError::Usage(USAGE.to_string()));
        }
        let value = it
            .next()
            .ok_or_else(|| CliError::Usage(format!("missing value for {}", flag)))?;
        match flag.as_str() {
            "--scenario" => scenario = Some(PathBuf::from(value)),
            "--solver" => {
                parsed.solver = match value.as_str() {
                    "sa" => SolverKind::Sa,
                    "tabu" => SolverKind::Tabu,
                    other => return Err(CliError::Usage(format!("unknown solver '{}'", other))),
                }
            }
            "--iters" => parsed.iters = Some(parse_value(&flag, &value)?),
            "--seed" => parsed.seed = Some(parse_value(&flag, &value)?),
            "--operators" => parsed.operators = Some(parse_operator_names(&value)?),
            "--operator-weight" => parsed.operator_weights = Some(parse_operator_weights(&value)?),
            "--batch-size" => parsed.batch_size = Some(parse_value(&flag, &value)?),
            "--workers" => parsed.workers = Some(parse_value(&flag, &value)?),
            "--cooling-rate" => parsed.cooling_rate = Some(parse_value(&flag, &value)?),
            "--restart-interval" => parsed.restart_interval = Some(parse_value(&flag, &value)?),
            "--tenure" => parsed.tenure = Some(parse_value(&flag, &value)?),
            "--reference-objective" => {
                parsed.reference_objective = Some(parse_value(&flag, &value)?)
            }
            "--telemetry" => parsed.telemetry = Some(PathBuf::from(value)),
            "--out" => parsed.out = Some(PathBuf::from(value)),
            other => return Err(CliError::Usage(format!("unknown option '{}'", other))),
        }
    }

    parsed.scenario =
        scenario.ok_or_else(|| CliError::Usage("--scenario is required".to_string()))?;
    Ok(parsed)
}

fn sa_config(args: &Args) -> SaConfig {
    let mut cfg = SaConfig::default();
    if let Some(n) = args.iters {
        cfg = cfg.with_iters(n);
    }
    if let Some(s) = args.seed {
        cfg = cfg.with_seed(s);
    }
    if let Some(names) = &args.operators {
        cfg = cfg.with_operators(names.iter().cloned());
    }
    if let Some(weights) = &args.operator_weights {
        cfg = cfg.with_operator_weights(weights.iter().cloned());
    }
    if let Some(b) = args.batch_size {
        cfg = cfg.with_batch_size(b);
    }
    if let Some(w) = args.workers {
        cfg = cfg.with_max_workers(w);
    }
    if let Some(c) = args.cooling_rate {
        cfg = cfg.with_cooling_rate(c);
    }
    if let Some(r) = args.restart_interval {
        cfg = cfg.with_restart_interval(r);
    }
    if let Some(r) = args.reference_objective {
        cfg = cfg.with_reference_objective(r);
    }
    cfg
}

fn tabu_config(args: &Args) -> TabuConfig {
    let mut cfg = TabuConfig::default();
    if let Some(n) = args.iters {
        cfg = cfg.with_iters(n);
    }
    if let Some(s) = args.seed {
        cfg = cfg.with_seed(s);
    }
    if let Some(names) = &args.operators {
        cfg = cfg.with_operators(names.iter().cloned());
    }
    if let Some(weights) = &args.operator_weights {
        cfg = cfg.with_operator_weights(weights.iter().cloned());
    }
    if let Some(b) = args.batch_size {
        cfg = cfg.with_batch_size(b);
    }
    if let Some(w) = args.workers {
        cfg = cfg.with_max_workers(w);
    }
    if let Some(r) = args.restart_interval {
        cfg = cfg.with_stall_limit(r);
    }
    if let Some(t) = args.tenure {
        cfg = cfg.with_tenure(t);
    }
    if let Some(r) = args.reference_objective {
        cfg = cfg.with_reference_objective(r);
    }
    cfg
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    scenario: String,
    solver: Algorithm,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    objective: f64,
    kpis: KpiResult,
    assignments: Vec<AssignmentRow>,
    meta: RunMeta,
}

fn solve(
    problem: &Problem,
    args: &Args,
    telemetry: &mut dyn TelemetrySink,
) -> Result<SolveResult, ConfigError> {
    let hooks = SolveHooks::new().with_telemetry(telemetry);
    match args.solver {
        SolverKind::Sa => solve_sa_with(problem, &sa_config(args), hooks),
        SolverKind::Tabu => solve_tabu_with(problem, &tabu_config(args), hooks),
    }
}

fn run(args: &Args) -> ExitCode {
    // Configuration problems surface before the scenario is even read.
    let valid = match args.solver {
        SolverKind::Sa => sa_config(args).validate(),
        SolverKind::Tabu => tabu_config(args).validate(),
    };
    if let Err(e) = valid {
        tracing::error!("Invalid configuration: {}", e);
        return ExitCode::from(2);
    }

    let problem = match ScenarioLoader::default()
        .from_path(&args.scenario)
        .map_err(|e| e.to_string())
        .and_then(|s| Problem::new(s).map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", args.scenario.display(), e);
            return ExitCode::from(1);
        }
    };

    tracing::info!(
        "Solving {} with {} machines, {} blocks over {} days",
        problem.scenario().name(),
        problem.scenario().machines().len(),
        problem.scenario().blocks().len(),
        problem.num_days()
    );

    let start_ts = Utc::now();
    let t0 = Instant::now();

    let outcome = match &args.telemetry {
        Some(path) => match File::create(path) {
            Ok(f) => {
                let mut sink = JsonlTelemetry::new(BufWriter::new(f));
                solve(&problem, args, &mut sink)
            }
            Err(e) => {
                tracing::error!("Failed to open {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        },
        None => solve(&problem, args, &mut TracingTelemetry),
    };
    let result = match outcome {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    let kpis = match compute_kpis(&problem, &result.assignments) {
        Ok(k) => k,
        Err(e) => {
            tracing::error!("KPI replay failed: {}", e);
            return ExitCode::from(1);
        }
    };

    tracing::info!(
        "Finished {}: objective={:.3}, completed={}, runtime={:?}",
        problem.scenario().name(),
        result.objective,
        kpis.completed_blocks,
        runtime
    );

    let record = RunRecord {
        scenario: problem.scenario().name().to_string(),
        solver: result.meta.algorithm,
        start_ts,
        end_ts,
        runtime_ms: runtime.as_millis(),
        objective: result.objective,
        kpis,
        assignments: result.assignments,
        meta: result.meta,
    };

    let written = serde_json::to_string_pretty(&record)
        .map_err(std::io::Error::from)
        .and_then(|json| match &args.out {
            Some(path) => File::create(path).and_then(|mut f| f.write_all(json.as_bytes())),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(json.as_bytes())
                    .and_then(|_| stdout.write_all(b"\n"))
            }
        });
    match written {
        Ok(()) => {
            if let Some(path) = &args.out {
                tracing::info!("Wrote run record to {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to write run record: {}", e);
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    enable_tracing();

    match parse_args(std::env::args().skip(1)) {
        Ok(args) => run(&args),
        Err(CliError::Usage(msg)) => {
            eprintln!("{}", msg);
            ExitCode::from(2)
        }
        Err(CliError::Config(e)) => {
            tracing::error!("Invalid configuration: {}", e);
            ExitCode::from(2)
        }
    }
}
