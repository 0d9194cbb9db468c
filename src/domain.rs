//! Integer domains: the set of values a variable may still take.
//!
//! A domain is kept as a sorted list of disjoint, non-adjacent [ranges][IntegerRange],
//! so a full 64-bit domain costs one range rather than 2^64 values. All set operations
//! mutate the domain in place and keep that normal form. An empty domain is an ordinary
//! value: it means the variable has no admissible value left.
//!
//! ```rust
//! use intsolve_rs::domain::IntegerDomain;
//! use intsolve_rs::range::IntegerRange;
//!
//! let mut d = IntegerDomain::full(4);         // {[0, 15]}
//! d.exclude_range(&IntegerRange::new(4, 11)); // {[0, 3], [12, 15]}
//! d.intersect_range(&IntegerRange::new(2, 13));
//! assert_eq!(d.to_string(), "{[2, 3], [12, 13]}");
//! assert_eq!(d.size(), num_bigint::BigUint::from(4u32));
//! ```

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use crate::range::IntegerRange;

/// Order in which values are enumerated from a domain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ValueOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct IntegerDomain {
    /// Sorted, pairwise disjoint and non-adjacent.
    ranges: Vec<IntegerRange>,
}

impl IntegerDomain {
    /// Creates the empty domain.
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Creates the domain of all `width`-bit unsigned values, `[0, 2^width - 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `width == 0`.
    pub fn full(width: u32) -> Self {
        assert_ne!(width, 0, "Domain width must be positive");
        let max = (BigInt::one() << width) - 1;
        Self::from_range(IntegerRange::new(BigInt::zero(), max))
    }

    /// Creates the singleton domain `{value}`.
    pub fn fixed(value: impl Into<BigInt>) -> Self {
        Self::from_range(IntegerRange::point(value))
    }

    pub fn from_range(range: IntegerRange) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    /// Creates the union of the given ranges (in any order, possibly overlapping).
    pub fn from_ranges(ranges: impl IntoIterator<Item = IntegerRange>) -> Self {
        let mut sorted: Vec<IntegerRange> = ranges.into_iter().collect();
        sorted.sort_by(|a, b| a.min().cmp(b.min()));

        let mut merged: Vec<IntegerRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if last.touches(&range) => {
                    let max = std::cmp::max(last.max(), range.max()).clone();
                    *last = IntegerRange::new(last.min().clone(), max);
                }
                _ => merged.push(range),
            }
        }

        Self { ranges: merged }
    }

    pub fn ranges(&self) -> &[IntegerRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns true if the domain contains exactly one value.
    pub fn is_singular(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].is_point()
    }

    /// Returns the number of values in the domain.
    pub fn size(&self) -> BigUint {
        self.ranges.iter().map(|r| r.size()).sum()
    }

    pub fn contains(&self, value: &BigInt) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.max() < value {
                    std::cmp::Ordering::Less
                } else if r.min() > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn min(&self) -> Option<&BigInt> {
        self.ranges.first().map(|r| r.min())
    }

    pub fn max(&self) -> Option<&BigInt> {
        self.ranges.last().map(|r| r.max())
    }

    /// Returns the first value in the given enumeration order.
    pub fn first_in(&self, order: ValueOrder) -> Option<&BigInt> {
        match order {
            ValueOrder::Ascending => self.min(),
            ValueOrder::Descending => self.max(),
        }
    }

    /// Replaces the domain wholesale.
    pub fn set(&mut self, other: IntegerDomain) {
        *self = other;
    }

    /// Replaces the domain with the singleton `{value}`.
    pub fn set_value(&mut self, value: impl Into<BigInt>) {
        *self = Self::fixed(value);
    }

    /// Keeps only the values that lie in `range`.
    pub fn intersect_range(&mut self, range: &IntegerRange) {
        self.ranges = self
            .ranges
            .iter()
            .filter_map(|r| r.intersect(range))
            .collect();
    }

    /// Keeps only the values that are also in `other`.
    pub fn intersect(&mut self, other: &IntegerDomain) {
        self.ranges = self.intersection_ranges(other);
    }

    /// Returns the intersection as a new domain, leaving both operands untouched.
    pub fn intersection(&self, other: &IntegerDomain) -> IntegerDomain {
        Self {
            ranges: self.intersection_ranges(other),
        }
    }

    fn intersection_ranges(&self, other: &IntegerDomain) -> Vec<IntegerRange> {
        let (a, b) = (&self.ranges, &other.ranges);
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);

        // Pieces cut from normalized inputs are separated by gaps of either input,
        // so the output is normalized as well.
        while i < a.len() && j < b.len() {
            if let Some(r) = a[i].intersect(&b[j]) {
                result.push(r);
            }
            if a[i].max() < b[j].max() {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }

    /// Removes the values that lie in `range`.
    pub fn exclude_range(&mut self, range: &IntegerRange) {
        if !self.ranges.iter().any(|r| r.overlaps(range)) {
            return;
        }

        let mut result = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if !r.overlaps(range) {
                result.push(r);
                continue;
            }
            if r.min() < range.min() {
                result.push(IntegerRange::new(r.min().clone(), range.min() - 1));
            }
            if r.max() > range.max() {
                result.push(IntegerRange::new(range.max() + 1, r.max().clone()));
            }
        }
        self.ranges = result;
    }

    /// Removes a single value.
    pub fn exclude_value(&mut self, value: &BigInt) {
        self.exclude_range(&IntegerRange::point(value.clone()));
    }

    /// Removes the values that are in `other`.
    pub fn exclude(&mut self, other: &IntegerDomain) {
        for range in &other.ranges {
            if self.is_empty() {
                break;
            }
            self.exclude_range(range);
        }
    }

    /// Returns true if the domains share at least one value.
    pub fn overlaps(&self, other: &IntegerDomain) -> bool {
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            if a[i].overlaps(&b[j]) {
                return true;
            }
            if a[i].max() < b[j].max() {
                i += 1;
            } else {
                j += 1;
            }
        }

        false
    }

    /// Returns an ascending enumerator over the values.
    pub fn iter(&self) -> DomainIter<'_> {
        DomainIter::new(self, ValueOrder::Ascending)
    }

    /// Returns an enumerator over the values in the given order.
    pub fn iter_in(&self, order: ValueOrder) -> DomainIter<'_> {
        DomainIter::new(self, order)
    }
}

impl fmt::Display for IntegerDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", range)?;
        }
        write!(f, "}}")
    }
}

impl From<IntegerRange> for IntegerDomain {
    fn from(range: IntegerRange) -> Self {
        Self::from_range(range)
    }
}

/// Restartable enumerator over the values of a domain.
///
/// The enumerator is finite and visits every value exactly once;
/// [`init`][DomainIter::init] rewinds it to the first value.
#[derive(Debug, Clone)]
pub struct DomainIter<'a> {
    domain: &'a IntegerDomain,
    order: ValueOrder,
    /// Index of the range holding `current`, counted in enumeration order.
    range: usize,
    current: Option<BigInt>,
}

impl<'a> DomainIter<'a> {
    fn new(domain: &'a IntegerDomain, order: ValueOrder) -> Self {
        let mut iter = Self {
            domain,
            order,
            range: 0,
            current: None,
        };
        iter.init();
        iter
    }

    fn nth_range(&self, index: usize) -> Option<&'a IntegerRange> {
        let domain: &'a IntegerDomain = self.domain;
        let ranges = &domain.ranges;
        match self.order {
            ValueOrder::Ascending => ranges.get(index),
            ValueOrder::Descending => ranges.len().checked_sub(index + 1).map(|i| &ranges[i]),
        }
    }

    fn start_of(&self, range: &IntegerRange) -> BigInt {
        match self.order {
            ValueOrder::Ascending => range.min().clone(),
            ValueOrder::Descending => range.max().clone(),
        }
    }

    /// Rewinds to the first value.
    pub fn init(&mut self) {
        self.range = 0;
        self.current = self.nth_range(0).map(|r| self.start_of(r));
    }

    /// Returns true if the enumerator has not been exhausted.
    pub fn has_value(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the current value without advancing.
    pub fn value(&self) -> Option<&BigInt> {
        self.current.as_ref()
    }
}

impl Iterator for DomainIter<'_> {
    type Item = BigInt;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.current.take()?;
        let range = self.nth_range(self.range)?;

        let at_end = match self.order {
            ValueOrder::Ascending => value == *range.max(),
            ValueOrder::Descending => value == *range.min(),
        };

        self.current = if at_end {
            self.range += 1;
            self.nth_range(self.range).map(|r| self.start_of(r))
        } else {
            match self.order {
                ValueOrder::Ascending => Some(&value + 1),
                ValueOrder::Descending => Some(&value - 1),
            }
        };

        Some(value)
    }
}
