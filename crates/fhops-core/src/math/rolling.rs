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
use std::collections::VecDeque;

/// Arithmetic mean over the last `window` observations.
#[derive(Debug, Clone)]
pub struct RollingMean<F> {
    window: usize,
    values: VecDeque<F>,
    sum: F,
}

impl<F: Float> RollingMean<F> {
    /// A window of zero is treated as a window of one.
    #[inline]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: F::zero(),
        }
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, x: F) -> F {
        if self.values.len() == self.window
            && let Some(old) = self.values.pop_front()
        {
            self.sum = self.sum - old;
        }
        self.values.push_back(x);
        self.sum = self.sum + x;
        self.mean().unwrap_or(x)
    }

    #[inline]
    pub fn mean(&self) -> Option<F> {
        if self.values.is_empty() {
            return None;
        }
        F::from(self.values.len()).map(|n| self.sum / n)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = F::zero();
    }
}
