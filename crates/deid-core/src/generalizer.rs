//! Per-attribute value generalization.
//!
//! A generalizer maps a raw value and a level in `0..levels` to a
//! [`Generalized`] value. Level 0 reproduces the input, the top level
//! collapses every input to [`Generalized::Suppressed`] (or to one common
//! label for nominal hierarchies), and the levels in between coarsen
//! monotonically.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{DeidError, Result};
use crate::value::{Generalized, Interval, Value};

/// Upper bound on interval levels; the finest band has `2^(levels-2)` segments.
pub const MAX_INTERVAL_LEVELS: usize = 32;

/// Closed set of generalization strategies.
#[derive(Debug, Clone)]
pub enum Generalizer {
    Interval(IntervalGeneralizer),
    Nominal(NominalGeneralizer),
}

impl Generalizer {
    /// Number of levels, including identity (0) and the top level.
    #[must_use]
    pub fn levels(&self) -> usize {
        match self {
            Self::Interval(g) => g.levels(),
            Self::Nominal(g) => g.levels(),
        }
    }

    /// Highest valid level.
    #[must_use]
    pub fn top_level(&self) -> usize {
        self.levels() - 1
    }

    /// Generalize `value` to `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.levels()`.
    #[must_use]
    pub fn generalize(&self, value: &Value, level: usize) -> Generalized {
        match self {
            Self::Interval(g) => g.generalize(value, level),
            Self::Nominal(g) => g.generalize(value, level),
        }
    }

    /// Short name of the strategy, for reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Interval(_) => "interval",
            Self::Nominal(_) => "nominal",
        }
    }
}

impl From<IntervalGeneralizer> for Generalizer {
    fn from(value: IntervalGeneralizer) -> Self {
        Self::Interval(value)
    }
}

impl From<NominalGeneralizer> for Generalizer {
    fn from(value: NominalGeneralizer) -> Self {
        Self::Nominal(value)
    }
}

/// Buckets numeric values into progressively wider ranges of `[min, max)`.
///
/// Level `l` (for `0 < l < levels - 1`) splits the domain into
/// `2^(levels - 1 - l)` equal half-open segments. Segment edges are
/// `min + (max - min) * i / segments`, so each segment nests exactly inside
/// the one above it. Values outside `[min, max)`, `max` included, are
/// suppressed. Every resolved `(value, level)` pair is memoized.
#[derive(Debug, Clone)]
pub struct IntervalGeneralizer {
    min: f64,
    max: f64,
    levels: usize,
    cache: RefCell<HashMap<(Value, usize), Generalized>>,
}

impl IntervalGeneralizer {
    /// Build the range ladder for `[min, max)`.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::InvalidIntervalLevels`] if `levels` is outside
    /// `3..=MAX_INTERVAL_LEVELS` and [`DeidError::InvalidIntervalBounds`] if the
    /// bounds are not finite or `min > max`.
    pub fn new(min: f64, max: f64, levels: usize) -> Result<Self> {
        if !(3..=MAX_INTERVAL_LEVELS).contains(&levels) {
            return Err(DeidError::InvalidIntervalLevels { levels });
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(DeidError::InvalidIntervalBounds { min, max });
        }
        Ok(Self {
            min,
            max,
            levels,
            cache: RefCell::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Segments at an intermediate `level`; `None` for level 0 and the top.
    #[must_use]
    pub fn segment_count(&self, level: usize) -> Option<usize> {
        (level > 0 && level + 1 < self.levels).then(|| 1 << (self.levels - 1 - level))
    }

    /// Segment `index` of `level`, counted from `min`.
    #[must_use]
    pub fn segment(&self, level: usize, index: usize) -> Option<Interval> {
        let count = self.segment_count(level)?;
        (index < count).then(|| Interval::new(self.edge(index, count), self.edge(index + 1, count)))
    }

    /// Generalize `value` to `level`.
    ///
    /// Non-numeric values and numbers outside `[min, max)` are suppressed at
    /// every level above 0.
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.levels()`.
    #[must_use]
    pub fn generalize(&self, value: &Value, level: usize) -> Generalized {
        assert!(
            level < self.levels,
            "level {level} out of range for {} levels",
            self.levels
        );
        let key = (value.clone(), level);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }
        let resolved = self.resolve(value, level);
        self.cache.borrow_mut().insert(key, resolved.clone());
        resolved
    }

    #[allow(clippy::cast_precision_loss)]
    fn edge(&self, index: usize, count: usize) -> f64 {
        if index == count {
            return self.max;
        }
        self.min + (self.max - self.min) * (index as f64 / count as f64)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn resolve(&self, value: &Value, level: usize) -> Generalized {
        if level == 0 {
            return Generalized::Original(value.clone());
        }
        let Some(count) = self.segment_count(level) else {
            return Generalized::Suppressed;
        };
        let Some(number) = value.as_f64() else {
            return Generalized::Suppressed;
        };
        if !(self.min..self.max).contains(&number) {
            return Generalized::Suppressed;
        }

        // The float estimate can land one off near an edge; settle on the
        // segment whose edges actually enclose the value.
        let estimate = ((number - self.min) / (self.max - self.min) * count as f64).floor();
        let mut index = (estimate as usize).min(count - 1);
        while index > 0 && number < self.edge(index, count) {
            index -= 1;
        }
        while index + 1 < count && number >= self.edge(index + 1, count) {
            index += 1;
        }
        Generalized::Range(Interval::new(
            self.edge(index, count),
            self.edge(index + 1, count),
        ))
    }
}

/// Maps categorical values through an explicit hierarchy of labels.
#[derive(Debug, Clone)]
pub struct NominalGeneralizer {
    levels: usize,
    tree: HashMap<Value, Vec<Generalized>>,
    /// Shared top-level value of every sequence.
    top: Generalized,
}

impl NominalGeneralizer {
    /// Build from full per-value sequences, level 0 included.
    ///
    /// # Errors
    ///
    /// Fails when there are no entries, sequences differ in length, a
    /// sequence does not start with `Generalized::Original(value)`, or the
    /// sequences do not all end in the same top-level value.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Value, Vec<Generalized>)>,
    {
        let mut tree = HashMap::new();
        let mut levels = None;
        let mut top: Option<Generalized> = None;
        for (value, sequence) in entries {
            if sequence.is_empty() {
                return Err(DeidError::EmptyHierarchy);
            }
            let expected = *levels.get_or_insert(sequence.len());
            if sequence.len() != expected {
                return Err(DeidError::HierarchyLengthMismatch {
                    value: value.to_string(),
                    expected,
                    found: sequence.len(),
                });
            }
            if !matches!(&sequence[0], Generalized::Original(v) if *v == value) {
                return Err(DeidError::HierarchyIdentity {
                    value: value.to_string(),
                });
            }
            let last = &sequence[expected - 1];
            match &top {
                Some(shared) if shared != last => {
                    return Err(DeidError::HierarchyTopLevel {
                        value: value.to_string(),
                        expected: shared.to_string(),
                        found: last.to_string(),
                    });
                }
                Some(_) => {}
                None => top = Some(last.clone()),
            }
            tree.insert(value, sequence);
        }
        let levels = levels.ok_or(DeidError::EmptyHierarchy)?;
        let top = top.ok_or(DeidError::EmptyHierarchy)?;
        Ok(Self { levels, tree, top })
    }

    /// Build from label sequences that exclude level 0; `None` means suppressed.
    ///
    /// # Errors
    ///
    /// Same as [`NominalGeneralizer::new`].
    pub fn from_labels<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Value, Vec<Option<String>>)>,
    {
        Self::new(entries.into_iter().map(|(value, labels)| {
            let mut sequence = Vec::with_capacity(labels.len() + 1);
            sequence.push(Generalized::Original(value.clone()));
            sequence.extend(labels.into_iter().map(|label| match label {
                Some(label) => Generalized::Label(label),
                None => Generalized::Suppressed,
            }));
            (value, sequence)
        }))
    }

    /// Two-level hierarchy: each value maps to itself, then to suppressed.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::EmptyHierarchy`] if `values` is empty.
    pub fn suppress_only<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        Self::from_labels(values.into_iter().map(|value| (value, vec![None])))
    }

    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Whether `value` has an explicit hierarchy entry.
    #[must_use]
    pub fn covers(&self, value: &Value) -> bool {
        self.tree.contains_key(value)
    }

    /// Generalize `value` to `level`.
    ///
    /// Values without a hierarchy entry keep their identity at level 0 and
    /// jump straight to the shared top-level value above it.
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.levels()`.
    #[must_use]
    pub fn generalize(&self, value: &Value, level: usize) -> Generalized {
        assert!(
            level < self.levels,
            "level {level} out of range for {} levels",
            self.levels
        );
        match self.tree.get(value) {
            Some(sequence) => sequence[level].clone(),
            None if level == 0 => Generalized::Original(value.clone()),
            None => self.top.clone(),
        }
    }
}
