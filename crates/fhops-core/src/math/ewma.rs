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

use num_traits::Float;
use std::fmt::Debug;

/// Exponentially weighted moving average over a floating point signal.
///
/// The first observation seeds the average; later observations are blended
/// with weight `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma<F> {
    alpha: F,
    value: Option<F>,
}

/// Error type for an invalid smoothing factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidAlphaError<F> {
    value: F,
}

impl<F: Float + Debug> InvalidAlphaError<F> {
    #[inline]
    pub fn new(value: F) -> Self {
        Self { value }
    }

    #[inline]
    pub fn value(&self) -> F {
        self.value
    }
}

impl<F: Float + Debug> std::fmt::Display for InvalidAlphaError<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid smoothing factor {:?}. Allowed range is (0.0, 1.0].",
            self.value
        )
    }
}

impl<F: Float + Debug> std::error::Error for InvalidAlphaError<F> {}

impl<F: Float + Debug> Ewma<F> {
    #[inline]
    pub fn new(alpha: F) -> Result<Self, InvalidAlphaError<F>> {
        if !alpha.is_finite() || alpha <= F::zero() || alpha > F::one() {
            return Err(InvalidAlphaError::new(alpha));
        }
        Ok(Self { alpha, value: None })
    }

    /// Like [`Ewma::new`] but forces `alpha` into `(0, 1]`. A non-finite
    /// alpha becomes `1`, which tracks the last observation.
    #[inline]
    pub fn clamped(alpha: F) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.max(F::epsilon()).min(F::one())
        } else {
            F::one()
        };
        Self { alpha, value: None }
    }

    /// Builds a smoother whose weight of an observation halves every
    /// `half_life_steps` observations.
    #[inline]
    pub fn from_half_life(half_life_steps: F) -> Result<Self, InvalidAlphaError<F>> {
        if !half_life_steps.is_finite() || half_life_steps <= F::zero() {
            return Err(InvalidAlphaError::new(half_life_steps));
        }
        let half = F::one() / (F::one() + F::one());
        Self::new(F::one() - half.powf(F::one() / half_life_steps))
    }

    #[inline]
    pub fn alpha(&self) -> F {
        self.alpha
    }

    #[inline]
    pub fn initialized(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn value(&self) -> Option<F> {
        self.value
    }

    #[inline]
    pub fn value_or(&self, fallback: F) -> F {
        self.value.unwrap_or(fallback)
    }

    #[inline]
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn observe(&mut self, x: F) -> F {
        let next = match self.value {
            None => x,
            Some(cur) => self.alpha * x + (F::one() - self.alpha) * cur,
        };
        self.value = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_alpha_rejected() {
        assert!(Ewma::new(0.0_f64).is_err());
        assert!(Ewma::new(1.5_f64).is_err());
        assert!(Ewma::new(f64::NAN).is_err());
        assert!(Ewma::new(-0.2_f64).is_err());
        assert!(Ewma::new(1.0_f64).is_ok());
    }

    #[test]
    fn test_first_observation_seeds_value() {
        let mut ew = Ewma::new(0.25_f64).unwrap();
        assert_eq!(ew.value(), None);
        assert_eq!(ew.observe(8.0), 8.0);
        assert!(ew.initialized());
    }

    #[test]
    fn test_blend_uses_alpha() {
        let mut ew = Ewma::new(0.5_f64).unwrap();
        ew.observe(10.0);
        let v = ew.observe(20.0);
        assert!((v - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_half_life_gives_valid_alpha() {
        let ew = Ewma::from_half_life(4.0_f64).unwrap();
        assert!(ew.alpha() > 0.0 && ew.alpha() < 1.0);
        assert!(Ewma::from_half_life(0.0_f64).is_err());
        assert!(Ewma::from_half_life(f64::INFINITY).is_err());
    }

    #[test]
    fn test_clamped_keeps_alpha_in_range() {
        assert_eq!(Ewma::clamped(0.3_f64).alpha(), 0.3);
        assert_eq!(Ewma::clamped(4.0_f64).alpha(), 1.0);
        assert_eq!(Ewma::clamped(f64::NAN).alpha(), 1.0);
        assert!(Ewma::clamped(-1.0_f64).alpha() > 0.0);
    }

    #[test]
    fn test_reset_clears_value() {
        let mut ew = Ewma::new(0.3_f64).unwrap();
        ew.observe(1.0);
        ew.reset();
        assert!(!ew.initialized());
        assert_eq!(ew.value_or(-1.0), -1.0);
    }
}
