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
    operators::{Operator, OperatorContext, registry::OperatorRegistry, stats::OperatorStatsTable},
    schedule::Schedule,
};
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};
use std::time::Instant;

/// A neighbour together with the operator that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub operator: &'static str,
    pub schedule: Schedule,
}

/// Order in which enabled operators run this pass: insertion order when
/// all weights agree, otherwise a weighted draw without replacement.
fn pass_order<'r, R: Rng>(
    registry: &'r OperatorRegistry<R>,
    rng: &mut R,
) -> Vec<&'r dyn Operator<R>> {
    let mut pool: Vec<(&'r dyn Operator<R>, f64)> = registry.enabled().collect();
    let uniform = pool.windows(2).all(|w| w[0].1 == w[1].1);
    if uniform {
        return pool.into_iter().map(|(op, _)| op).collect();
    }

    let mut order = Vec::with_capacity(pool.len());
    while !pool.is_empty() {
        let Ok(dist) = WeightedIndex::new(pool.iter().map(|(_, w)| *w)) else {
            break;
        };
        let (op, _) = pool.remove(dist.sample(rng));
        order.push(op);
    }
    order.extend(pool.into_iter().map(|(op, _)| op));
    order
}

/// Runs the enabled operators against `ctx` and collects their candidates.
///
/// With `batch_size = None` every enabled operator runs once. With
/// `Some(k)` passes repeat until `k` candidates exist, a pass yields
/// nothing, or `k` passes have run. Every call is tallied into `stats`.
pub fn generate_neighbors<R: Rng>(
    ctx: &OperatorContext<'_>,
    registry: &OperatorRegistry<R>,
    rng: &mut R,
    stats: &mut OperatorStatsTable,
    batch_size: Option<usize>,
) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    let (limit, max_passes) = match batch_size {
        None => (usize::MAX, 1),
        Some(k) => (k.max(1), k.max(1)),
    };

    for _ in 0..max_passes {
        let before = out.len();
        for op in pass_order(registry, rng) {
            if out.len() >= limit {
                break;
            }
            let start = Instant::now();
            let produced = op.apply(ctx, rng);
            stats.record_propose(op.name(), start, produced.is_some());
            if let Some(schedule) = produced {
                out.push(Candidate {
                    operator: op.name(),
                    schedule,
                });
            }
        }
        if out.len() >= limit || out.len() == before {
            break;
        }
    }
    out
}
