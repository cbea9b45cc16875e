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

use crate::common::{BlockId, MachineId};
use serde::{Deserialize, Serialize};

/// Cost parameters applied whenever a machine changes blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineMobilisation {
    pub machine_id: MachineId,
    #[serde(default)]
    pub walk_cost_per_meter: f64,
    #[serde(default)]
    pub move_cost_flat: f64,
    #[serde(default)]
    pub walk_threshold_m: f64,
    #[serde(default)]
    pub setup_cost: f64,
}

impl MachineMobilisation {
    pub fn new(machine_id: impl Into<MachineId>) -> Self {
        Self {
            machine_id: machine_id.into(),
            walk_cost_per_meter: 0.0,
            move_cost_flat: 0.0,
            walk_threshold_m: 0.0,
            setup_cost: 0.0,
        }
    }

    #[inline]
    pub fn with_walk(mut self, cost_per_meter: f64, threshold_m: f64) -> Self {
        self.walk_cost_per_meter = cost_per_meter;
        self.walk_threshold_m = threshold_m;
        self
    }

    #[inline]
    pub fn with_move_cost_flat(mut self, cost: f64) -> Self {
        self.move_cost_flat = cost;
        self
    }

    #[inline]
    pub fn with_setup_cost(mut self, cost: f64) -> Self {
        self.setup_cost = cost;
        self
    }

    /// Cost of one transition over `distance_m`: walk within the threshold,
    /// flat relocation beyond it, setup either way.
    #[inline]
    pub fn transition_cost(&self, distance_m: f64) -> f64 {
        let travel = if distance_m <= self.walk_threshold_m {
            self.walk_cost_per_meter * distance_m
        } else {
            self.move_cost_flat
        };
        self.setup_cost + travel
    }
}

/// Distance between two blocks. Distances are symmetric unless both
/// directions are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDistance {
    pub from_block: BlockId,
    pub to_block: BlockId,
    pub distance_m: f64,
}

impl BlockDistance {
    pub fn new(from_block: impl Into<BlockId>, to_block: impl Into<BlockId>, distance_m: f64) -> Self {
        Self {
            from_block: from_block.into(),
            to_block: to_block.into(),
            distance_m,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilisationConfig {
    #[serde(default)]
    pub machine_params: Vec<MachineMobilisation>,
    #[serde(default)]
    pub distances: Vec<BlockDistance>,
}

impl MobilisationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_machine(mut self, params: MachineMobilisation) -> Self {
        self.machine_params.push(params);
        self
    }

    #[inline]
    pub fn with_distance(mut self, distance: BlockDistance) -> Self {
        self.distances.push(distance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_below_threshold() {
        let p = MachineMobilisation::new("M1")
            .with_walk(2.0, 100.0)
            .with_move_cost_flat(500.0)
            .with_setup_cost(10.0);
        assert_eq!(p.transition_cost(50.0), 110.0);
        assert_eq!(p.transition_cost(100.0), 210.0);
    }

    #[test]
    fn test_flat_cost_above_threshold() {
        let p = MachineMobilisation::new("M1")
            .with_walk(2.0, 100.0)
            .with_move_cost_flat(500.0)
            .with_setup_cost(10.0);
        assert_eq!(p.transition_cost(100.5), 510.0);
    }

    #[test]
    fn test_zero_distance_is_setup_only() {
        let p = MachineMobilisation::new("M1").with_setup_cost(7.0);
        assert_eq!(p.transition_cost(0.0), 7.0);
    }
}
