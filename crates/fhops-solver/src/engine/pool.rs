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

use crate::{eval::evaluator::ScheduleEvaluator, operators::neighbors::Candidate, schedule::Schedule};
use rayon::{
    ThreadPool, ThreadPoolBuilder,
    iter::{IntoParallelIterator, ParallelIterator},
};

/// A candidate after repair, with its objective.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub operator: &'static str,
    pub schedule: Schedule,
    pub objective: f64,
}

/// Scores candidate batches, on a dedicated rayon pool when more than one
/// worker is requested and batches hold more than one candidate.
pub struct ScoringPool {
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for ScoringPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScoringPool(workers={})", self.workers())
    }
}

impl ScoringPool {
    pub fn new(max_workers: Option<usize>, batch_size: usize) -> Self {
        let workers = max_workers.unwrap_or(1);
        if workers <= 1 || batch_size <= 1 {
            return Self::sequential();
        }
        match ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(err) => {
                tracing::warn!(workers, error = %err, "scoring pool unavailable, scoring sequentially");
                Self::sequential()
            }
        }
    }

    #[inline]
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }

    /// Repairs and scores every candidate. Output order matches input order.
    pub fn score(
        &self,
        evaluator: &ScheduleEvaluator<'_>,
        candidates: Vec<Candidate>,
    ) -> Vec<ScoredCandidate> {
        let score_one = |c: Candidate| {
            let mut schedule = c.schedule;
            let objective = evaluator.evaluate_schedule(&mut schedule);
            ScoredCandidate {
                operator: c.operator,
                schedule,
                objective,
            }
        };
        match &self.pool {
            Some(pool) if candidates.len() > 1 => {
                pool.install(|| candidates.into_par_iter().map(score_one).collect())
            }
            _ => candidates.into_iter().map(score_one).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        eval::config::EvaluatorConfig,
        model::{
            index::{BlockIndex, MachineIndex, ShiftIndex},
            operational::OperationalProblem,
        },
        operators::testing,
    };

    fn candidates(op: &OperationalProblem<'_>) -> Vec<Candidate> {
        (0..op.shifts_len())
            .map(|s| {
                let mut schedule = Schedule::empty_for(op);
                schedule.set(MachineIndex(0), ShiftIndex(s), Some(BlockIndex(0)));
                Candidate {
                    operator: "move",
                    schedule,
                }
            })
            .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let p = testing::one_machine(6, &[("B1", 2, 4)]);
        let op = OperationalProblem::new(&p);
        let ev = ScheduleEvaluator::new(&op, EvaluatorConfig::default());
        let seq = ScoringPool::sequential().score(&ev, candidates(&op));
        let par_pool = ScoringPool::new(Some(3), 6);
        let par = par_pool.score(&ev, candidates(&op));
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.objective, b.objective);
            assert_eq!(a.schedule, b.schedule);
        }
    }

    #[test]
    fn test_single_worker_stays_sequential() {
        assert_eq!(ScoringPool::new(Some(1), 8).workers(), 1);
        assert_eq!(ScoringPool::new(Some(4), 1).workers(), 1);
        assert_eq!(ScoringPool::new(None, 8).workers(), 1);
    }
}
