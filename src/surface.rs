//! The rendering capability the step model drives.
//!
//! The model never draws anything itself. It asks a [`RenderSurface`] to
//! create nodes, position them along the bar, set their text and toggle
//! visual states, and it releases them when a step goes away. Handles are
//! owned by the surface; the model only keeps a back-reference in a
//! [`RenderSlot`].

/// Opaque identifier of a node created by a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// Wraps a surface-specific identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the surface-specific identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The kinds of node the model asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The filled portion of the bar.
    BarFill,
    /// A step marker on the bar.
    StepMarker,
    /// Label above a step marker.
    TopLabel,
    /// Label below a step marker.
    BottomLabel,
}

/// Visual states toggled on nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualState {
    /// The node belongs to the first step.
    First,
    /// The node belongs to the last step.
    Last,
    /// The node belongs to the next upcoming step.
    NextStep,
    /// Rounded bar ends.
    Rounded,
}

/// Whether a step currently has a node of a given kind on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderSlot {
    /// Nothing has been created yet, or the node was released.
    #[default]
    Detached,
    /// A live node on the surface.
    Attached(NodeHandle),
}

impl RenderSlot {
    /// Returns the handle if attached.
    pub fn handle(self) -> Option<NodeHandle> {
        match self {
            RenderSlot::Attached(handle) => Some(handle),
            RenderSlot::Detached => None,
        }
    }

    /// Returns `true` if a node is attached.
    pub fn is_attached(self) -> bool {
        matches!(self, RenderSlot::Attached(_))
    }

    /// Detaches the slot and returns the handle it held.
    pub fn take(&mut self) -> Option<NodeHandle> {
        std::mem::take(self).handle()
    }
}

/// Synchronous rendering capability.
///
/// Every call completes before returning. Implementations own the nodes;
/// handles passed back in always come from an earlier [`create_node`] on the
/// same surface and are never used after [`remove`].
///
/// [`create_node`]: RenderSurface::create_node
/// [`remove`]: RenderSurface::remove
pub trait RenderSurface {
    /// Creates a node and returns its handle.
    fn create_node(&mut self, kind: NodeKind) -> NodeHandle;

    /// Positions a node along the bar axis, `percent` in `0.0..=100.0`.
    fn set_position(&mut self, handle: NodeHandle, percent: f64);

    /// Replaces the text of a node.
    fn set_text(&mut self, handle: NodeHandle, text: &str);

    /// Adds a visual state. Adding a state twice is a no-op.
    fn add_visual_state(&mut self, handle: NodeHandle, state: VisualState);

    /// Removes a visual state. Removing a missing state is a no-op.
    fn remove_visual_state(&mut self, handle: NodeHandle, state: VisualState);

    /// Releases a node.
    fn remove(&mut self, handle: NodeHandle);

    /// Receives the layout breakpoint configured on the bar.
    ///
    /// The model does not interpret the value; surfaces that have a notion
    /// of responsive layout use it, the rest ignore it.
    fn set_responsive_limit(&mut self, _limit: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_default_is_detached() {
        let slot = RenderSlot::default();
        assert!(!slot.is_attached());
        assert_eq!(slot.handle(), None);
    }

    #[test]
    fn test_slot_take_detaches() {
        let mut slot = RenderSlot::Attached(NodeHandle::new(7));
        assert_eq!(slot.take(), Some(NodeHandle::new(7)));
        assert_eq!(slot, RenderSlot::Detached);
        assert_eq!(slot.take(), None);
    }
}
