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

fn one() -> f64 {
    1.0
}

/// Weights of the objective terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    #[serde(default = "one")]
    pub production: f64,
    #[serde(default = "one")]
    pub mobilisation: f64,
    #[serde(default)]
    pub transitions: f64,
    #[serde(default)]
    pub landing_slack: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            production: 1.0,
            mobilisation: 1.0,
            transitions: 0.0,
            landing_slack: 0.0,
        }
    }
}

impl ObjectiveWeights {
    #[inline]
    pub fn with_production(mut self, w: f64) -> Self {
        self.production = w;
        self
    }

    #[inline]
    pub fn with_mobilisation(mut self, w: f64) -> Self {
        self.mobilisation = w;
        self
    }

    #[inline]
    pub fn with_transitions(mut self, w: f64) -> Self {
        self.transitions = w;
        self
    }

    #[inline]
    pub fn with_landing_slack(mut self, w: f64) -> Self {
        self.landing_slack = w;
        self
    }

    /// Landing overflow is priced instead of forbidden.
    #[inline]
    pub fn prices_landing_slack(&self) -> bool {
        self.landing_slack > 0.0
    }
}

impl std::fmt::Display for ObjectiveWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ObjectiveWeights(production={}, mobilisation={}, transitions={}, landing_slack={})",
            self.production, self.mobilisation, self.transitions, self.landing_slack
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let w: ObjectiveWeights = serde_json::from_str(r#"{"transitions": 2.5}"#).unwrap();
        assert_eq!(w.production, 1.0);
        assert_eq!(w.mobilisation, 1.0);
        assert_eq!(w.transitions, 2.5);
        assert!(!w.prices_landing_slack());
    }
}
