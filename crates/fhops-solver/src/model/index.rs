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

macro_rules! dense_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub fn get(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(value: usize) -> Self {
                Self::new(value)
            }
        }
    };
}

dense_index!(
    /// Position of a machine in scenario order.
    MachineIndex
);
dense_index!(
    /// Position of a block in scenario order.
    BlockIndex
);
dense_index!(LandingIndex);
dense_index!(
    /// Roles are numbered in order of first appearance among the machines.
    RoleIndex
);
dense_index!(
    /// Position in the day-major shift grid.
    ShiftIndex
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_index() {
        assert_eq!(MachineIndex::new(3).to_string(), "MachineIndex(3)");
        assert_eq!(ShiftIndex::from(0).to_string(), "ShiftIndex(0)");
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut v = vec![BlockIndex(4), BlockIndex(1), BlockIndex(2)];
        v.sort();
        assert_eq!(v, vec![BlockIndex(1), BlockIndex(2), BlockIndex(4)]);
        assert_eq!(v[0].get(), 1);
    }
}
