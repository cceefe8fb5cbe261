//! Incremental reconciliation of steps against a render surface.
//!
//! Nodes are created the first time a step appears and reused afterwards:
//! a refresh only repositions existing nodes, refreshes their text and
//! reapplies the first/last classification. Nodes are released when their
//! step is removed or absorbed into a duplicate.

use crate::model::Steps;
use crate::step::Step;
use crate::surface::{NodeHandle, NodeKind, RenderSlot, RenderSurface, VisualState};
use tracing::trace;

/// Brings the surface in line with `steps`.
///
/// Steps must already be normalized and have their percentages computed.
/// A step without a position is skipped entirely.
pub fn reconcile<S: RenderSurface + ?Sized>(steps: &mut Steps, surface: &mut S, unit: &str) {
    let last = steps.len().saturating_sub(1);
    for (index, step) in steps.as_mut_slice().iter_mut().enumerate() {
        let Some(percent) = step.progress_percent() else {
            continue;
        };
        let first = index == 0;
        let is_last = index == last;
        let top_text = step.top_label_text(unit);
        let value = step.value();

        let marker = ensure(&mut step.handles.marker, NodeKind::StepMarker, surface, value);
        place(surface, marker, percent, first, is_last);

        let top = ensure(&mut step.handles.top_label, NodeKind::TopLabel, surface, value);
        place(surface, top, percent, first, is_last);
        surface.set_text(top, &top_text);

        let bottom = ensure(
            &mut step.handles.bottom_label,
            NodeKind::BottomLabel,
            surface,
            value,
        );
        place(surface, bottom, percent, first, is_last);
        surface.set_text(bottom, step.bottom_label_text());
    }
}

/// Applies or clears the next-step state on every rendered step.
///
/// Steps that have no nodes yet are skipped.
pub fn apply_next_step_markers<S: RenderSurface + ?Sized>(steps: &Steps, surface: &mut S) {
    for step in steps {
        for handle in step.handles().attached() {
            if step.is_next_step() {
                surface.add_visual_state(handle, VisualState::NextStep);
            } else {
                surface.remove_visual_state(handle, VisualState::NextStep);
            }
        }
    }
}

/// Releases every node of a step and detaches its slots.
pub fn release_step<S: RenderSurface + ?Sized>(step: &mut Step, surface: &mut S) {
    let value = step.value();
    for handle in step.handles.take_all() {
        trace!(value, handle = handle.raw(), "releasing step node");
        surface.remove(handle);
    }
}

/// Releases loose handles, such as those left over from merged duplicates.
pub fn release_handles<S: RenderSurface + ?Sized>(
    handles: impl IntoIterator<Item = NodeHandle>,
    surface: &mut S,
) {
    for handle in handles {
        trace!(handle = handle.raw(), "releasing orphaned node");
        surface.remove(handle);
    }
}

fn ensure<S: RenderSurface + ?Sized>(
    slot: &mut RenderSlot,
    kind: NodeKind,
    surface: &mut S,
    value: f64,
) -> NodeHandle {
    if let Some(handle) = slot.handle() {
        return handle;
    }
    let handle = surface.create_node(kind);
    trace!(value, ?kind, handle = handle.raw(), "created step node");
    *slot = RenderSlot::Attached(handle);
    handle
}

fn place<S: RenderSurface + ?Sized>(
    surface: &mut S,
    handle: NodeHandle,
    percent: f64,
    first: bool,
    last: bool,
) {
    surface.set_position(handle, percent);
    surface.remove_visual_state(handle, VisualState::First);
    surface.remove_visual_state(handle, VisualState::Last);
    if first {
        surface.add_visual_state(handle, VisualState::First);
    }
    if last {
        surface.add_visual_state(handle, VisualState::Last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use crate::next_step::mark_next_step;

    fn prepared(values: &[f64]) -> Steps {
        let mut steps = Steps::from_vec(values.iter().copied().map(Step::new).collect());
        steps.normalize();
        steps.recompute_percentages();
        steps
    }

    #[test]
    fn test_creates_three_nodes_per_step() {
        let mut steps = prepared(&[0.0, 50.0, 100.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "%");

        assert_eq!(surface.created_count(), 9);
        let middle = &steps.as_slice()[1];
        let marker = middle.handles().marker.handle().expect("marker attached");
        assert_eq!(surface.node(marker).and_then(|n| n.position), Some(50.0));
        let top = middle.handles().top_label.handle().expect("top attached");
        assert_eq!(surface.node(top).map(|n| n.text.as_str()), Some("50%"));
    }

    #[test]
    fn test_second_pass_reuses_nodes() {
        let mut steps = prepared(&[0.0, 100.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");
        let before = *steps.as_slice()[1].handles();

        reconcile(&mut steps, &mut surface, "");
        assert_eq!(surface.created_count(), 6);
        assert_eq!(*steps.as_slice()[1].handles(), before);
    }

    #[test]
    fn test_boundary_classification_moves() {
        let mut steps = prepared(&[10.0, 20.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");
        let old_last = steps.as_slice()[1].handles().marker.handle().expect("attached");
        assert!(surface.node(old_last).expect("live").has_state(VisualState::Last));

        steps.push(Step::new(30.0));
        steps.normalize();
        steps.recompute_percentages();
        reconcile(&mut steps, &mut surface, "");

        let node = surface.node(old_last).expect("live");
        assert!(!node.has_state(VisualState::Last));
        assert!(!node.has_state(VisualState::First));
        assert_eq!(node.position, Some(50.0));
    }

    #[test]
    fn test_single_step_is_first_and_last() {
        let mut steps = prepared(&[5.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");
        for handle in steps.as_slice()[0].handles().attached() {
            let node = surface.node(handle).expect("live");
            assert!(node.has_state(VisualState::First));
            assert!(node.has_state(VisualState::Last));
        }
    }

    #[test]
    fn test_unpositioned_step_is_skipped() {
        let mut steps = Steps::from_vec(vec![Step::new(1.0)]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");
        assert_eq!(surface.created_count(), 0);
        assert!(steps.as_slice()[0].handles().is_empty());
    }

    #[test]
    fn test_next_step_markers_follow_flag() {
        let mut steps = prepared(&[0.0, 10.0, 20.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");

        mark_next_step(&mut steps, Some(5.0));
        apply_next_step_markers(&steps, &mut surface);
        let flagged: Vec<_> = surface
            .nodes()
            .filter(|(_, n)| n.has_state(VisualState::NextStep))
            .map(|(h, _)| h)
            .collect();
        let expected: Vec<_> = steps.as_slice()[1].handles().attached().collect();
        assert_eq!(flagged, expected);

        mark_next_step(&mut steps, Some(20.0));
        apply_next_step_markers(&steps, &mut surface);
        assert!(surface
            .nodes()
            .all(|(_, n)| !n.has_state(VisualState::NextStep)));
    }

    #[test]
    fn test_release_step_removes_each_node_once() {
        let mut steps = prepared(&[1.0]);
        let mut surface = MemorySurface::new();
        reconcile(&mut steps, &mut surface, "");
        let handles: Vec<_> = steps.as_slice()[0].handles().attached().collect();

        let mut step = steps.remove(1.0).expect("present");
        release_step(&mut step, &mut surface);
        release_step(&mut step, &mut surface);

        assert_eq!(surface.live_count(), 0);
        for handle in handles {
            assert_eq!(surface.removal_count(handle), 1);
        }
    }
}
