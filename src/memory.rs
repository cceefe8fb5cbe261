//! Headless in-memory render surface.
//!
//! [`MemorySurface`] keeps every node it is asked to create in a map and
//! counts creations and removals, which makes it suitable for snapshotting a
//! bar's rendered state without a terminal and for checking that nodes are
//! reused rather than rebuilt.
//!
//! # Examples
//!
//! ```rust
//! use step_progress::memory::MemorySurface;
//! use step_progress::progressbar::{new, with_steps};
//! use step_progress::step::Step;
//! use step_progress::surface::NodeKind;
//!
//! let bar = new(
//!     MemorySurface::new(),
//!     &[with_steps(vec![Step::new(0.0), Step::new(100.0)])],
//! )
//! .unwrap();
//!
//! assert_eq!(bar.surface().nodes_of_kind(NodeKind::StepMarker).len(), 2);
//! ```

use crate::surface::{NodeHandle, NodeKind, RenderSurface, VisualState};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A node as last set by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node displays.
    pub kind: NodeKind,
    /// Position along the bar, once set.
    pub position: Option<f64>,
    /// Text content.
    pub text: String,
    /// Active visual states.
    pub states: BTreeSet<VisualState>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: None,
            text: String::new(),
            states: BTreeSet::new(),
        }
    }

    /// Returns `true` if `state` is active.
    pub fn has_state(&self, state: VisualState) -> bool {
        self.states.contains(&state)
    }
}

/// A [`RenderSurface`] that records nodes in memory.
///
/// Intended for tests and snapshots. Removal counts are kept per handle for
/// the lifetime of the surface, so the record grows with every node a
/// long-running bar ever drops.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    last_id: u64,
    nodes: BTreeMap<NodeHandle, Node>,
    created: usize,
    removals: HashMap<NodeHandle, usize>,
    total_removals: usize,
    responsive_limit: Option<f64>,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live node behind `handle`.
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    /// All live nodes, oldest first.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter().map(|(handle, node)| (*handle, node))
    }

    /// Live nodes of one kind, oldest first.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<(NodeHandle, &Node)> {
        self.nodes().filter(|(_, node)| node.kind == kind).collect()
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// How many times `handle` was removed.
    pub fn removal_count(&self, handle: NodeHandle) -> usize {
        self.removals.get(&handle).copied().unwrap_or(0)
    }

    /// Total number of removals.
    pub fn total_removals(&self) -> usize {
        self.total_removals
    }

    /// The breakpoint handed over by the bar, if any.
    pub fn responsive_limit(&self) -> Option<f64> {
        self.responsive_limit
    }
}

impl RenderSurface for MemorySurface {
    fn create_node(&mut self, kind: NodeKind) -> NodeHandle {
        self.last_id += 1;
        let handle = NodeHandle::new(self.last_id);
        self.nodes.insert(handle, Node::new(kind));
        self.created += 1;
        handle
    }

    fn set_position(&mut self, handle: NodeHandle, percent: f64) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.position = Some(percent);
        }
    }

    fn set_text(&mut self, handle: NodeHandle, text: &str) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.text = text.to_string();
        }
    }

    fn add_visual_state(&mut self, handle: NodeHandle, state: VisualState) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.states.insert(state);
        }
    }

    fn remove_visual_state(&mut self, handle: NodeHandle, state: VisualState) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.states.remove(&state);
        }
    }

    fn remove(&mut self, handle: NodeHandle) {
        self.nodes.remove(&handle);
        *self.removals.entry(handle).or_insert(0) += 1;
        self.total_removals += 1;
    }

    fn set_responsive_limit(&mut self, limit: f64) {
        self.responsive_limit = Some(limit);
    }
}
