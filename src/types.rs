//! Integer variables and the dense indices the solver uses for them.
//!
//! An [`IntegerVariable`] is what callers see: a named, fixed-width integer that may
//! carry a concrete value. Inside a solve, every declared variable gets a [`VarId`],
//! an index into the solver's arena of domains and adjacency rows.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{One, Signed};

/// A dense variable index (0-indexed) into the solver state.
///
/// Indices follow the declaration order of the variables handed to the solver.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    /// Creates a new index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit into `u32`.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Variable index {} is too large", index);
        VarId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<VarId> for usize {
    fn from(id: VarId) -> Self {
        id.index()
    }
}

/// A fixed-width unsigned integer variable.
///
/// Variables are identified by name: two variables with the same name are the same
/// variable, regardless of width or value. Cloning is cheap (the name is shared).
///
/// # Invariants
///
/// - The width is positive.
/// - A fixed value lies in `[0, 2^width - 1]`.
#[derive(Debug, Clone)]
pub struct IntegerVariable {
    name: Arc<str>,
    width: u32,
    value: Option<BigInt>,
}

impl IntegerVariable {
    /// Creates an unconstrained variable of the given bit width.
    ///
    /// # Panics
    ///
    /// Panics if `width == 0`.
    pub fn new(name: impl Into<Arc<str>>, width: u32) -> Self {
        let name = name.into();
        assert_ne!(width, 0, "Variable {} must have a positive width", name);
        Self {
            name,
            width,
            value: None,
        }
    }

    /// Creates a variable whose value is already known.
    ///
    /// # Panics
    ///
    /// Panics if `width == 0` or the value does not fit into `width` bits.
    pub fn fixed(name: impl Into<Arc<str>>, width: u32, value: impl Into<BigInt>) -> Self {
        let mut var = Self::new(name, width);
        let value = value.into();
        assert!(
            var.admits(&value),
            "Value {} of variable {} does not fit into {} bits",
            value,
            var.name,
            width
        );
        var.value = Some(value);
        var
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the fixed value, if any.
    pub fn value(&self) -> Option<&BigInt> {
        self.value.as_ref()
    }

    pub fn is_fixed(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the largest value representable in the variable's width, `2^width - 1`.
    pub fn max_value(&self) -> BigInt {
        (BigInt::one() << self.width) - 1
    }

    /// Returns true if `value` lies in `[0, 2^width - 1]`.
    pub fn admits(&self, value: &BigInt) -> bool {
        !value.is_negative() && *value <= self.max_value()
    }
}

impl PartialEq for IntegerVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IntegerVariable {}

impl Hash for IntegerVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Prints the name; the alternate form (`{:#}`) also prints the width and the fixed value.
impl fmt::Display for IntegerVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}:{}", self.name, self.width)?;
            if let Some(value) = &self.value {
                write!(f, "={}", value)?;
            }
            Ok(())
        } else {
            write!(f, "{}", self.name)
        }
    }
}
