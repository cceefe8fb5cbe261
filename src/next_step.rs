//! Next-step tracking.
//!
//! The next step is the nearest step strictly above the current value. At
//! most one step carries the flag at any time.

use crate::model::Steps;

/// Flags the next step relative to `current` and returns its index.
///
/// - No steps: nothing changes, `None`.
/// - No current value: the step with the largest value is next, the end goal.
/// - Otherwise the smallest value strictly greater than `current`; when the
///   current value is at or past the last step, no step is flagged.
///
/// Every other step has its flag cleared.
pub fn mark_next_step(steps: &mut Steps, current: Option<f64>) -> Option<usize> {
    if steps.is_empty() {
        return None;
    }

    let next = match current {
        None => steps.bounds().map(|bounds| bounds.max_index),
        Some(current) => find_next_index(steps, current),
    };

    for (index, step) in steps.as_mut_slice().iter_mut().enumerate() {
        step.set_next_step(Some(index) == next);
    }
    next
}

fn find_next_index(steps: &Steps, current: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, step) in steps.iter().enumerate() {
        let value = step.value();
        if value <= current {
            continue;
        }
        match best {
            Some((_, best_value)) if value >= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
