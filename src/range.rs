use std::fmt;

use num_bigint::{BigInt, BigUint};

/// A closed interval `[min, max]` of arbitrary-precision integers.
///
/// # Invariants
///
/// - `min <= max` (there is no empty range; empty sets are empty
///   [domains][crate::domain::IntegerDomain])
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IntegerRange {
    min: BigInt,
    max: BigInt,
}

impl IntegerRange {
    /// Creates the range `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn new(min: impl Into<BigInt>, max: impl Into<BigInt>) -> Self {
        let min = min.into();
        let max = max.into();
        assert!(min <= max, "Range [{}, {}] is malformed", min, max);
        Self { min, max }
    }

    /// Creates the single-point range `[value, value]`.
    pub fn point(value: impl Into<BigInt>) -> Self {
        let value = value.into();
        Self {
            min: value.clone(),
            max: value,
        }
    }

    pub fn min(&self) -> &BigInt {
        &self.min
    }

    pub fn max(&self) -> &BigInt {
        &self.max
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Returns the number of values in the range, `max - min + 1`.
    pub fn size(&self) -> BigUint {
        let size: BigInt = &self.max - &self.min + 1;
        size.magnitude().clone()
    }

    pub fn contains(&self, value: &BigInt) -> bool {
        self.min <= *value && *value <= self.max
    }

    pub fn overlaps(&self, other: &IntegerRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Returns the common part of two ranges, if any.
    pub fn intersect(&self, other: &IntegerRange) -> Option<IntegerRange> {
        if !self.overlaps(other) {
            return None;
        }
        let min = std::cmp::max(&self.min, &other.min).clone();
        let max = std::cmp::min(&self.max, &other.max).clone();
        Some(IntegerRange { min, max })
    }

    /// Returns true if the ranges overlap or are adjacent, i.e. their union is a range.
    pub(crate) fn touches(&self, other: &IntegerRange) -> bool {
        self.min <= &other.max + 1 && other.min <= &self.max + 1
    }
}

impl fmt::Display for IntegerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_point() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}
