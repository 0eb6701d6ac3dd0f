//! Raw cell values and their generalized counterparts.
//!
//! Both types are used as grouping keys when counting equivalence classes, so
//! equality and hashing are structural. Reals compare by bit pattern with
//! `-0.0` folded into `0.0`.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of an input record.
#[derive(Debug, Clone)]
pub enum Value {
    /// Missing cell.
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            Self::Null | Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn real_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => real_bits(*a) == real_bits(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Integer(v) => v.hash(state),
            Self::Real(v) => real_bits(*v).hash(state),
            Self::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Half-open numeric range `[lo, hi)`.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    #[must_use]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Mean of the two bounds, used when a range has to be stored as a scalar.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        f64::midpoint(self.lo, self.hi)
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value < self.hi
    }

    /// True when `other` lies entirely within this range.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        real_bits(self.lo) == real_bits(other.lo) && real_bits(self.hi) == real_bits(other.hi)
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        real_bits(self.lo).hash(state);
        real_bits(self.hi).hash(state);
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

/// Output of a generalizer for one cell at one level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Generalized {
    /// Level 0: the untouched input.
    Original(Value),
    Range(Interval),
    Label(String),
    /// Fully generalized; every suppressed cell is equal to every other.
    Suppressed,
}

impl Generalized {
    /// Collapse to a storable scalar: ranges become their midpoint, suppressed
    /// cells become `Null`.
    #[must_use]
    pub fn to_scalar(&self) -> Value {
        match self {
            Self::Original(value) => value.clone(),
            Self::Range(interval) => Value::Real(interval.midpoint()),
            Self::Label(label) => Value::Text(label.clone()),
            Self::Suppressed => Value::Null,
        }
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

impl fmt::Display for Generalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original(value) => write!(f, "{value}"),
            Self::Range(interval) => write!(f, "{interval}"),
            Self::Label(label) => f.write_str(label),
            Self::Suppressed => f.write_str("*"),
        }
    }
}
