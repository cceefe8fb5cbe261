//! Percentage engine.
//!
//! Pure numeric mapping from a value and an optional pair of bounds to a
//! position on the bar, expressed in percent (0.0 to 100.0).
//!
//! # Examples
//!
//! ```rust
//! use step_progress::percent::percent_of;
//!
//! assert_eq!(percent_of(Some(25.0), Some(0.0), Some(100.0)), Some(25.0));
//! assert_eq!(percent_of(Some(-5.0), Some(0.0), Some(100.0)), Some(0.0));
//! assert_eq!(percent_of(Some(3.0), None, None), Some(100.0));
//! assert_eq!(percent_of(None, Some(0.0), Some(100.0)), None);
//! ```

use crate::step::Step;

/// Maps `value` onto the `[min, max]` range as a percentage.
///
/// - No value: `None`.
/// - No bounds at all: `100.0`, nothing to scale against.
/// - A single bound: binary threshold, `0.0` below it and `100.0` at or above it.
/// - Both bounds: clamped linear interpolation.
///
/// The clamp branches run before the division. With `min == max` the only
/// value that survives them is `value == min == max`, which maps to `100.0`
/// instead of dividing by zero.
pub fn percent_of(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> Option<f64> {
    let value = value?;
    let percent = match (min, max) {
        (None, None) => 100.0,
        (None, Some(max)) => threshold(value, max),
        (Some(min), None) => threshold(value, min),
        (Some(min), Some(max)) => {
            if value < min {
                0.0
            } else if value > max {
                100.0
            } else if max == min {
                // min <= value <= max collapses to value == min == max.
                100.0
            } else {
                (value - min) / (max - min) * 100.0
            }
        }
    };
    Some(percent)
}

fn threshold(value: f64, bound: f64) -> f64 {
    if value < bound {
        0.0
    } else {
        100.0
    }
}

/// The smallest and largest step of a collection.
///
/// Indices point into the slice passed to [`bounds_of`]; they are only valid
/// until that slice is mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Index of the step with the smallest value.
    pub min_index: usize,
    /// Index of the step with the largest value.
    pub max_index: usize,
    /// Smallest step value.
    pub min: f64,
    /// Largest step value.
    pub max: f64,
}

/// Finds the minimum and maximum step in a single left-to-right scan.
///
/// Returns `None` for an empty slice. Comparisons are strict, so on ties the
/// first occurrence wins. The slice does not need to be sorted.
pub fn bounds_of(steps: &[Step]) -> Option<Bounds> {
    let first = steps.first()?;
    let mut bounds = Bounds {
        min_index: 0,
        max_index: 0,
        min: first.value(),
        max: first.value(),
    };

    for (index, step) in steps.iter().enumerate().skip(1) {
        let value = step.value();
        if value < bounds.min {
            bounds.min = value;
            bounds.min_index = index;
        }
        if value > bounds.max {
            bounds.max = value;
            bounds.max_index = index;
        }
    }

    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_is_absent() {
        assert_eq!(percent_of(None, None, None), None);
        assert_eq!(percent_of(None, Some(1.0), Some(2.0)), None);
    }

    #[test]
    fn test_no_bounds_is_complete() {
        assert_eq!(percent_of(Some(-1000.0), None, None), Some(100.0));
    }

    #[test]
    fn test_single_bound_thresholds() {
        assert_eq!(percent_of(Some(4.0), None, Some(5.0)), Some(0.0));
        assert_eq!(percent_of(Some(5.0), None, Some(5.0)), Some(100.0));
        assert_eq!(percent_of(Some(4.0), Some(5.0), None), Some(0.0));
        assert_eq!(percent_of(Some(6.0), Some(5.0), None), Some(100.0));
    }

    #[test]
    fn test_interpolation_and_clamp() {
        assert_eq!(percent_of(Some(50.0), Some(0.0), Some(200.0)), Some(25.0));
        assert_eq!(percent_of(Some(-1.0), Some(0.0), Some(200.0)), Some(0.0));
        assert_eq!(percent_of(Some(201.0), Some(0.0), Some(200.0)), Some(100.0));
        assert_eq!(percent_of(Some(0.0), Some(0.0), Some(200.0)), Some(0.0));
        assert_eq!(percent_of(Some(200.0), Some(0.0), Some(200.0)), Some(100.0));
    }

    #[test]
    fn test_equal_bounds_never_divide_by_zero() {
        assert_eq!(percent_of(Some(9.0), Some(10.0), Some(10.0)), Some(0.0));
        assert_eq!(percent_of(Some(11.0), Some(10.0), Some(10.0)), Some(100.0));
        assert_eq!(percent_of(Some(10.0), Some(10.0), Some(10.0)), Some(100.0));
    }

    #[test]
    fn test_bounds_of_empty() {
        assert_eq!(bounds_of(&[]), None);
    }

    #[test]
    fn test_bounds_of_unsorted() {
        let steps = vec![Step::new(30.0), Step::new(-2.0), Step::new(90.0), Step::new(5.0)];
        let bounds = bounds_of(&steps).expect("non-empty");
        assert_eq!(bounds.min, -2.0);
        assert_eq!(bounds.min_index, 1);
        assert_eq!(bounds.max, 90.0);
        assert_eq!(bounds.max_index, 2);
    }

    #[test]
    fn test_bounds_of_ties_keep_first() {
        let steps = vec![Step::new(1.0), Step::new(7.0), Step::new(1.0), Step::new(7.0)];
        let bounds = bounds_of(&steps).expect("non-empty");
        assert_eq!(bounds.min_index, 0);
        assert_eq!(bounds.max_index, 1);
    }
}
