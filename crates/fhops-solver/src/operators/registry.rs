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
    engine::err::{ConfigError, MalformedWeightError, UnknownOperatorError},
    operators::{
        Operator, block_insertion::BlockInsertionOperator, cross_exchange::CrossExchangeOperator,
        mobilisation_shake::MobilisationShakeOperator, relocate::MoveOperator, swap::SwapOperator,
    },
};
use rand::Rng;

/// Names of the built-in operators, in registration order.
pub const OPERATOR_NAMES: [&str; 5] = [
    "swap",
    "move",
    "block_insertion",
    "cross_exchange",
    "mobilisation_shake",
];

/// Weights used for large scenarios where mobilisation dominates.
pub const MOBILISATION_PROFILE: [(&str, f64); 5] = [
    ("swap", 1.0),
    ("move", 1.0),
    ("block_insertion", 0.6),
    ("cross_exchange", 0.6),
    ("mobilisation_shake", 0.2),
];

struct Entry<R: Rng> {
    operator: Box<dyn Operator<R>>,
    weight: f64,
}

/// Ordered set of operators with relative weights. A weight of zero
/// disables an operator.
pub struct OperatorRegistry<R: Rng> {
    entries: Vec<Entry<R>>,
}

impl<R: Rng> Default for OperatorRegistry<R> {
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register(Box::new(SwapOperator), 1.0);
        reg.register(Box::new(MoveOperator), 1.0);
        reg.register(Box::new(BlockInsertionOperator), 0.0);
        reg.register(Box::new(CrossExchangeOperator), 0.0);
        reg.register(Box::new(MobilisationShakeOperator), 0.0);
        reg
    }
}

impl<R: Rng> std::fmt::Debug for OperatorRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.weights()).finish()
    }
}

impl<R: Rng> OperatorRegistry<R> {
    /// The built-in operators with their default weights.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds `operator`, replacing one registered under the same name.
    pub fn register(&mut self, operator: Box<dyn Operator<R>>, weight: f64) -> &mut Self {
        let weight = sanitize_weight(weight);
        match self
            .entries
            .iter_mut()
            .find(|e| e.operator.name() == operator.name())
        {
            Some(e) => {
                e.operator = operator;
                e.weight = weight;
            }
            None => self.entries.push(Entry { operator, weight }),
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.operator.name())
    }

    #[inline]
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.operator.name() == name)
            .map(|e| e.weight)
    }

    pub fn set_weight(&mut self, name: &str, weight: f64) -> Result<(), ConfigError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(MalformedWeightError::new(format!("{}={}", name, weight)).into());
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.operator.name() == name)
            .ok_or_else(|| UnknownOperatorError::new(name))?;
        entry.weight = weight;
        Ok(())
    }

    /// Applies several weights; stops at the first unknown name.
    pub fn set_weights<'n, I>(&mut self, weights: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (&'n str, f64)>,
    {
        for (name, w) in weights {
            self.set_weight(name, w)?;
        }
        Ok(())
    }

    /// Enables exactly the listed operators with weight one.
    pub fn enable_only<'n, I>(&mut self, names: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut wanted: Vec<&str> = Vec::new();
        for name in names {
            if self.weight(name).is_none() {
                return Err(UnknownOperatorError::new(name).into());
            }
            wanted.push(name);
        }
        for e in &mut self.entries {
            e.weight = if wanted.contains(&e.operator.name()) {
                1.0
            } else {
                0.0
            };
        }
        Ok(())
    }

    pub fn apply_mobilisation_profile(&mut self) {
        for (name, w) in MOBILISATION_PROFILE {
            if let Some(e) = self.entries.iter_mut().find(|e| e.operator.name() == name) {
                e.weight = w;
            }
        }
    }

    /// Multiplies the weight of `name` by `factor`; returns the old weight.
    pub fn scale_weight(&mut self, name: &str, factor: f64) -> Option<f64> {
        let e = self.entries.iter_mut().find(|e| e.operator.name() == name)?;
        let old = e.weight;
        e.weight = sanitize_weight(old * factor);
        Some(old)
    }

    #[inline]
    pub fn has_enabled(&self) -> bool {
        self.entries.iter().any(|e| e.weight > 0.0)
    }

    /// Operators with a positive weight, in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = (&dyn Operator<R>, f64)> + '_ {
        self.entries
            .iter()
            .filter(|e| e.weight > 0.0)
            .map(|e| (e.operator.as_ref(), e.weight))
    }

    pub fn weights(&self) -> Vec<(&'static str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.operator.name(), e.weight))
            .collect()
    }
}

#[inline]
fn sanitize_weight(w: f64) -> f64 {
    if w.is_finite() { w.max(0.0) } else { 0.0 }
}

fn check_known(name: &str) -> Result<(), ConfigError> {
    if OPERATOR_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(UnknownOperatorError::new(name).into())
    }
}

/// Parses `"swap=1,move=0.5"`. Empty items are ignored.
pub fn parse_operator_weights(spec: &str) -> Result<Vec<(String, f64)>, ConfigError> {
    let mut out = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| MalformedWeightError::new(item))?;
        let name = name.trim();
        let weight: f64 = value
            .trim()
            .parse()
            .map_err(|_| MalformedWeightError::new(item))?;
        if name.is_empty() || !weight.is_finite() || weight < 0.0 {
            return Err(MalformedWeightError::new(item).into());
        }
        check_known(name)?;
        out.push((name.to_string(), weight));
    }
    Ok(out)
}

/// Parses `"swap,move"`.
pub fn parse_operator_names(spec: &str) -> Result<Vec<String>, ConfigError> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| check_known(name).map(|_| name.to_string()))
        .collect()
}
