//! The ordered, deduplicated step collection.
//!
//! [`Steps`] enforces the collection invariants of a step progress bar:
//! after [`Steps::normalize`] the steps are sorted ascending by value and no
//! two steps share a value. Percentages are always recomputed from the
//! current bounds, never cached across mutations.
//!
//! Lookups are linear scans. Bars carry tens of steps, not thousands.

use crate::percent::{bounds_of, percent_of, Bounds};
use crate::step::Step;
use crate::surface::NodeHandle;

/// The step collection of one progress bar.
#[derive(Debug, Clone, Default)]
pub struct Steps {
    items: Vec<Step>,
}

impl Steps {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps steps as given. Call [`Steps::normalize`] before relying on order.
    pub fn from_vec(items: Vec<Step>) -> Self {
        Self { items }
    }

    /// The steps in their current order.
    pub fn as_slice(&self) -> &[Step] {
        &self.items
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Step] {
        &mut self.items
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when there are no steps.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the steps in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.items.iter()
    }

    /// Appends a step without normalizing.
    pub fn push(&mut self, step: Step) {
        self.items.push(step);
    }

    /// Stable ascending sort by value.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| a.value().total_cmp(&b.value()));
    }

    /// Collapses runs of equal values into their first step.
    ///
    /// Must run on sorted steps. Within a run, later steps are folded into
    /// the first one left to right, with a field already set on the earlier
    /// step winning. Their indices are removed in descending order. Returns
    /// the render handles of dropped steps that the surviving step could not
    /// adopt; the caller owns releasing them.
    pub fn merge_duplicates(&mut self) -> Vec<NodeHandle> {
        let mut duplicates = Vec::new();
        let mut anchor = 0;
        for index in 1..self.items.len() {
            if self.items[index].value() == self.items[anchor].value() {
                duplicates.push(index);
            } else {
                anchor = index;
            }
        }

        // Removal from the back keeps earlier indices valid; the removed
        // steps come out last-first and are folded back in run order.
        let mut removed: Vec<Step> = duplicates
            .into_iter()
            .rev()
            .map(|index| self.items.remove(index))
            .collect();
        removed.reverse();

        let mut orphans = Vec::new();
        for duplicate in removed {
            let value = duplicate.value();
            if let Some(survivor) = self.items.iter_mut().find(|s| s.value() == value) {
                orphans.extend(survivor.absorb(duplicate));
            }
        }
        orphans
    }

    /// Current bounds of the collection.
    pub fn bounds(&self) -> Option<Bounds> {
        bounds_of(&self.items)
    }

    /// Sets every step's position from the current bounds. No-op when empty.
    pub fn recompute_percentages(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        for step in &mut self.items {
            let percent = percent_of(Some(step.value()), Some(bounds.min), Some(bounds.max));
            step.set_progress_percent(percent);
        }
    }

    /// Fill percentage of the bar for `current`.
    ///
    /// A bar without steps is always full. With steps, `current` is scaled
    /// against their bounds; an absent `current` also renders full, since
    /// there is no position to fall short of.
    pub fn bar_percent(&self, current: Option<f64>) -> f64 {
        match self.bounds() {
            None => 100.0,
            Some(bounds) => {
                percent_of(current, Some(bounds.min), Some(bounds.max)).unwrap_or(100.0)
            }
        }
    }

    /// The first step with exactly this value.
    pub fn find(&self, value: f64) -> Option<&Step> {
        self.items.iter().find(|step| step.value() == value)
    }

    /// Removes the first step with exactly this value.
    ///
    /// The returned step still carries its render handles.
    pub fn remove(&mut self, value: f64) -> Option<Step> {
        let index = self.items.iter().position(|step| step.value() == value)?;
        Some(self.items.remove(index))
    }

    /// Sorts, then merges duplicates. Returns handles to release.
    pub fn normalize(&mut self) -> Vec<NodeHandle> {
        self.sort();
        self.merge_duplicates()
    }
}

impl<'a> IntoIterator for &'a Steps {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RenderSlot;

    fn values(steps: &Steps) -> Vec<f64> {
        steps.iter().map(Step::value).collect()
    }

    #[test]
    fn test_sort_is_ascending() {
        let mut steps = Steps::from_vec(vec![Step::new(5.0), Step::new(-1.0), Step::new(3.0)]);
        steps.sort();
        assert_eq!(values(&steps), vec![-1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut steps = Steps::from_vec(vec![
            Step::new(2.0).with_top_label("first"),
            Step::new(1.0),
            Step::new(2.0).with_top_label("second"),
        ]);
        steps.sort();
        assert_eq!(steps.as_slice()[1].top_label(), Some("first"));
        assert_eq!(steps.as_slice()[2].top_label(), Some("second"));
    }

    #[test]
    fn test_merge_two_duplicates() {
        let mut steps = Steps::from_vec(vec![
            Step::new(20.0).with_bottom_label("A"),
            Step::new(20.0),
        ]);
        let orphans = steps.normalize();
        assert!(orphans.is_empty());
        assert_eq!(steps.len(), 1);
        assert_eq!(steps.as_slice()[0].bottom_label(), Some("A"));
    }

    #[test]
    fn test_merge_top_label_from_first_set() {
        let mut steps = Steps::from_vec(vec![Step::new(7.0).with_top_label("X"), Step::new(7.0)]);
        steps.normalize();
        assert_eq!(steps.as_slice()[0].top_label(), Some("X"));
    }

    #[test]
    fn test_merge_run_of_three_folds_left_to_right() {
        let mut steps = Steps::from_vec(vec![
            Step::new(1.0),
            Step::new(5.0),
            Step::new(5.0).with_bottom_label("b"),
            Step::new(5.0).with_top_label("t").with_bottom_label("ignored"),
            Step::new(9.0),
        ]);
        steps.normalize();
        assert_eq!(values(&steps), vec![1.0, 5.0, 9.0]);
        let merged = &steps.as_slice()[1];
        assert_eq!(merged.top_label(), Some("t"));
        assert_eq!(merged.bottom_label(), Some("b"));
    }

    #[test]
    fn test_merge_signed_zeros_keeps_first() {
        let mut steps = Steps::from_vec(vec![
            Step::new(0.0).with_top_label("A"),
            Step::new(-0.0).with_top_label("B"),
        ]);
        steps.normalize();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps.as_slice()[0].top_label(), Some("A"));
        assert!(steps.as_slice()[0].value().is_sign_positive());
    }

    #[test]
    fn test_merge_multiple_runs() {
        let mut steps = Steps::from_vec(vec![
            Step::new(3.0),
            Step::new(1.0),
            Step::new(3.0),
            Step::new(1.0),
            Step::new(2.0),
        ]);
        steps.normalize();
        assert_eq!(values(&steps), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_merge_reports_colliding_handles() {
        let mut a = Step::new(4.0);
        a.handles.marker = RenderSlot::Attached(NodeHandle::new(10));
        let mut b = Step::new(4.0);
        b.handles.marker = RenderSlot::Attached(NodeHandle::new(11));
        let mut steps = Steps::from_vec(vec![a, b]);
        assert_eq!(steps.normalize(), vec![NodeHandle::new(11)]);
        assert_eq!(
            steps.as_slice()[0].handles().marker.handle(),
            Some(NodeHandle::new(10))
        );
    }

    #[test]
    fn test_recompute_percentages() {
        let mut steps = Steps::from_vec(vec![Step::new(0.0), Step::new(50.0), Step::new(200.0)]);
        steps.recompute_percentages();
        let percents: Vec<_> = steps.iter().map(Step::progress_percent).collect();
        assert_eq!(percents, vec![Some(0.0), Some(25.0), Some(100.0)]);
    }

    #[test]
    fn test_recompute_percentages_empty_is_noop() {
        let mut steps = Steps::new();
        steps.recompute_percentages();
        assert!(steps.is_empty());
    }

    #[test]
    fn test_bar_percent() {
        let steps = Steps::from_vec(vec![Step::new(0.0), Step::new(50.0), Step::new(100.0)]);
        assert_eq!(steps.bar_percent(Some(25.0)), 25.0);
        assert_eq!(steps.bar_percent(Some(-5.0)), 0.0);
        assert_eq!(steps.bar_percent(Some(500.0)), 100.0);
        assert_eq!(steps.bar_percent(None), 100.0);
        assert_eq!(Steps::new().bar_percent(Some(3.0)), 100.0);
    }

    #[test]
    fn test_find_and_remove() {
        let mut steps = Steps::from_vec(vec![Step::new(1.0), Step::new(2.0)]);
        assert!(steps.find(2.0).is_some());
        assert!(steps.find(3.0).is_none());
        assert_eq!(steps.remove(2.0).map(|s| s.value()), Some(2.0));
        assert!(steps.remove(2.0).is_none());
        assert_eq!(values(&steps), vec![1.0]);
    }
}
