//! Load-factor bounds and the grow/shrink decisions derived from them

use crate::error::{Error, Result};

/// Lower bound used by `ChainedMap::new`
pub const DEFAULT_LOWER_LOAD_FACTOR: f64 = 0.25;

/// Upper bound used by `ChainedMap::new`
pub const DEFAULT_UPPER_LOAD_FACTOR: f64 = 0.75;

/// Initial bucket count, and the floor shrinking never goes below
pub const MIN_CAPACITY: usize = 16;

/// Validated pair of load-factor bounds, `0 < lower < upper < 1`.
///
/// The bounds are fixed for the lifetime of the map that owns them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadFactors {
    /// Shrink once `size / capacity` drops below this
    lower: f64,
    /// Grow before `size / capacity` would exceed this
    upper: f64,
}

/// Capacity change requested by the load-factor policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// The current capacity satisfies the bounds
    Keep,
    /// Double to the contained capacity
    Grow(usize),
    /// Halve to the contained capacity
    Shrink(usize),
}

impl Resize {
    /// The capacity to rehash into, if any
    #[must_use]
    pub fn target(self) -> Option<usize> {
        match self {
            Self::Keep => None,
            Self::Grow(capacity) | Self::Shrink(capacity) => Some(capacity),
        }
    }
}

impl Default for LoadFactors {
    fn default() -> Self {
        Self { lower: DEFAULT_LOWER_LOAD_FACTOR, upper: DEFAULT_UPPER_LOAD_FACTOR }
    }
}

impl LoadFactors {
    /// Creates a bound pair, rejecting anything outside `0 < lower < upper < 1`.
    ///
    /// NaN bounds fail every comparison and are rejected as well.
    ///
    /// Shrinking halves the table, so with `lower > upper / 2` a shrink can
    /// leave the load above `upper` (at most `2 * lower`). The next insert then
    /// grows the table back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the bounds are out of order or range.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower > 0.0 && lower < upper && upper < 1.0 {
            Ok(Self { lower, upper })
        } else {
            Err(Error::InvalidConfiguration { lower, upper })
        }
    }

    /// Returns the lower bound
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper bound
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Decides whether a table holding `size` entries must grow before one more is added.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn plan_insert(&self, size: usize, capacity: usize) -> Resize {
        let projected = size.saturating_add(1) as f64 / capacity as f64;
        if projected > self.upper {
            capacity.checked_mul(2).map_or(Resize::Keep, Resize::Grow)
        } else {
            Resize::Keep
        }
    }

    /// Decides whether a table left with `size` entries after a removal must shrink.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn plan_remove(&self, size: usize, capacity: usize) -> Resize {
        if capacity <= MIN_CAPACITY {
            return Resize::Keep;
        }
        if (size as f64 / capacity as f64) < self.lower {
            Resize::Shrink((capacity / 2).max(MIN_CAPACITY))
        } else {
            Resize::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let factors = LoadFactors::default();
        assert!((factors.lower() - 0.25).abs() < f64::EPSILON);
        assert!((factors.upper() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_invalid_bounds() {
        assert_eq!(
            LoadFactors::new(0.8, 0.5),
            Err(Error::InvalidConfiguration { lower: 0.8, upper: 0.5 })
        );
        assert!(LoadFactors::new(0.5, 0.5).is_err());
        assert!(LoadFactors::new(0.0, 0.5).is_err());
        assert!(LoadFactors::new(0.2, 1.0).is_err());
        assert!(LoadFactors::new(-0.1, 0.5).is_err());
        assert!(LoadFactors::new(f64::NAN, 0.5).is_err());
        assert!(LoadFactors::new(0.1, f64::NAN).is_err());
        assert!(LoadFactors::new(0.1, 0.9).is_ok());
    }

    #[test]
    fn test_plan_insert_checks_projected_load() {
        let factors = LoadFactors::default();
        // 12 entries + 1 = 13/16 = 0.8125 > 0.75
        assert_eq!(factors.plan_insert(12, 16), Resize::Grow(32));
        // 11 entries + 1 = 12/16 = 0.75 is not above the bound
        assert_eq!(factors.plan_insert(11, 16), Resize::Keep);
        assert_eq!(factors.plan_insert(0, 16), Resize::Keep);
    }

    #[test]
    fn test_plan_remove_respects_floor() {
        let factors = LoadFactors::default();
        assert_eq!(factors.plan_remove(7, 32), Resize::Shrink(16));
        assert_eq!(factors.plan_remove(8, 32), Resize::Keep);
        assert_eq!(factors.plan_remove(0, 16), Resize::Keep);
        assert_eq!(factors.plan_remove(1, 128), Resize::Shrink(64));
    }

    #[test]
    fn test_shrink_can_overshoot_narrow_bounds() {
        let Ok(factors) = LoadFactors::new(0.45, 0.5) else {
            panic!("valid bounds");
        };
        // 39/128 is below 0.45, halving gives 39/64 = 0.609 above 0.5
        assert_eq!(factors.plan_remove(39, 128), Resize::Shrink(64));
        // 40/64 breaches the upper bound, so the next insert grows back
        assert_eq!(factors.plan_insert(39, 64), Resize::Grow(128));
    }

    #[test]
    fn test_resize_target() {
        assert_eq!(Resize::Keep.target(), None);
        assert_eq!(Resize::Grow(64).target(), Some(64));
        assert_eq!(Resize::Shrink(16).target(), Some(16));
    }
}
