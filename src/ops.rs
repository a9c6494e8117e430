use std::fmt::{Debug, Formatter};

/// Range with both bounds included.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct RangeInclusive<T: Copy> {
    pub start: T,
    pub end: T,
}

impl<T: Copy + Debug> Debug for RangeInclusive<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.start, self.end)
    }
}

impl<T: Copy> RangeInclusive<T> {
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

impl<T: Copy + PartialOrd> RangeInclusive<T> {
    #[must_use]
    pub fn contains(self, other: T) -> bool {
        (self.start <= other) && (other <= self.end)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start > self.end
    }

    /// Check whether the two ranges share at least one point.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        (self.start <= other.end) && (other.start <= self.end)
    }
}
