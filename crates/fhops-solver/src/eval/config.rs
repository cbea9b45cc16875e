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

use serde::{Deserialize, Serialize};

/// Fixed penalties charged by the evaluator for slots it had to repair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Charged when the plan names a block in a slot the machine cannot
    /// work (calendar or blackout).
    pub unavailable_penalty: f64,
    /// Charged when the plan disagrees with a lock.
    pub lock_mismatch_penalty: f64,
    /// Charged for each machine dropped from a full landing.
    pub landing_overflow_penalty: f64,
    /// Charged when a locked slot cannot produce because upstream roles
    /// have not banked enough work.
    pub prerequisite_penalty: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            unavailable_penalty: 1000.0,
            lock_mismatch_penalty: 1000.0,
            landing_overflow_penalty: 1000.0,
            prerequisite_penalty: 1000.0,
        }
    }
}

impl EvaluatorConfig {
    #[inline]
    pub fn with_unavailable_penalty(mut self, penalty: f64) -> Self {
        self.unavailable_penalty = penalty;
        self
    }

    #[inline]
    pub fn with_lock_mismatch_penalty(mut self, penalty: f64) -> Self {
        self.lock_mismatch_penalty = penalty;
        self
    }

    #[inline]
    pub fn with_landing_overflow_penalty(mut self, penalty: f64) -> Self {
        self.landing_overflow_penalty = penalty;
        self
    }

    #[inline]
    pub fn with_prerequisite_penalty(mut self, penalty: f64) -> Self {
        self.prerequisite_penalty = penalty;
        self
    }
}

impl std::fmt::Display for EvaluatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EvaluatorConfig(unavailable={}, lock_mismatch={}, landing_overflow={}, prerequisite={})",
            self.unavailable_penalty,
            self.lock_mismatch_penalty,
            self.landing_overflow_penalty,
            self.prerequisite_penalty
        )
    }
}
