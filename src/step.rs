//! Steps: labeled milestones on a progress bar.
//!
//! A [`Step`] is identified by its numeric value. Labels and callbacks are
//! caller data; the progress position, the next-step flag and the render
//! handles are owned by the bar and cannot be set from outside the crate.
//!
//! # Examples
//!
//! ```rust
//! use step_progress::step::Step;
//!
//! let step = Step::new(50.0)
//!     .with_top_label("Halfway")
//!     .with_bottom_label("Checkpoint")
//!     .with_on_click(|step: &Step| println!("clicked {}", step.value()));
//!
//! assert_eq!(step.top_label_text("%"), "Halfway");
//! assert_eq!(Step::new(50.0).top_label_text("%"), "50%");
//! ```

use crate::surface::{NodeHandle, RenderSlot};
use std::fmt;
use std::sync::Arc;

/// A callback attached to a step.
///
/// The bar stores callbacks and hands them to whoever renders it; it never
/// calls them itself.
#[derive(Clone)]
pub struct StepCallback(Arc<dyn Fn(&Step) + Send + Sync>);

impl StepCallback {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&Step) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the callback. Meant for renderers dispatching user input.
    pub fn call(&self, step: &Step) {
        (self.0)(step)
    }

    /// Returns `true` if both wrap the same closure.
    pub fn ptr_eq(&self, other: &StepCallback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StepCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepCallback(..)")
    }
}

/// The surface nodes that display one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepHandles {
    /// Marker on the bar.
    pub marker: RenderSlot,
    /// Label above the bar.
    pub top_label: RenderSlot,
    /// Label below the bar.
    pub bottom_label: RenderSlot,
}

impl StepHandles {
    /// Returns every attached handle, marker first.
    pub fn attached(&self) -> impl Iterator<Item = NodeHandle> {
        [self.marker, self.top_label, self.bottom_label]
            .into_iter()
            .filter_map(RenderSlot::handle)
    }

    /// Returns `true` when no node is attached.
    pub fn is_empty(&self) -> bool {
        self.attached().next().is_none()
    }

    /// Detaches every slot and returns the handles that were attached.
    pub(crate) fn take_all(&mut self) -> Vec<NodeHandle> {
        [
            self.marker.take(),
            self.top_label.take(),
            self.bottom_label.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fills detached slots from `other`; returns `other`'s handles that had
    /// nowhere to go.
    fn adopt(&mut self, mut other: StepHandles) -> Vec<NodeHandle> {
        let mut orphans = Vec::new();
        for (mine, theirs) in [
            (&mut self.marker, &mut other.marker),
            (&mut self.top_label, &mut other.top_label),
            (&mut self.bottom_label, &mut other.bottom_label),
        ] {
            if let Some(handle) = theirs.take() {
                if mine.is_attached() {
                    orphans.push(handle);
                } else {
                    *mine = RenderSlot::Attached(handle);
                }
            }
        }
        orphans
    }
}

/// One labeled point on the progress bar.
#[derive(Debug, Clone)]
pub struct Step {
    value: f64,
    top_label: Option<String>,
    bottom_label: Option<String>,
    on_hover: Option<StepCallback>,
    on_click: Option<StepCallback>,
    progress_percent: Option<f64>,
    is_next_step: bool,
    pub(crate) handles: StepHandles,
}

impl Step {
    /// Creates a step at `value` with no labels or callbacks.
    ///
    /// `-0.0` is stored as `0.0`, so equal values also sort together.
    pub fn new(value: f64) -> Self {
        Self {
            value: if value == 0.0 { 0.0 } else { value },
            top_label: None,
            bottom_label: None,
            on_hover: None,
            on_click: None,
            progress_percent: None,
            is_next_step: false,
            handles: StepHandles::default(),
        }
    }

    /// Sets the label shown above the bar instead of `value + unit`.
    pub fn with_top_label(mut self, label: impl Into<String>) -> Self {
        self.top_label = Some(label.into());
        self
    }

    /// Sets the label shown below the bar.
    pub fn with_bottom_label(mut self, label: impl Into<String>) -> Self {
        self.bottom_label = Some(label.into());
        self
    }

    /// Attaches a hover callback.
    pub fn with_on_hover(mut self, f: impl Fn(&Step) + Send + Sync + 'static) -> Self {
        self.on_hover = Some(StepCallback::new(f));
        self
    }

    /// Attaches a click callback.
    pub fn with_on_click(mut self, f: impl Fn(&Step) + Send + Sync + 'static) -> Self {
        self.on_click = Some(StepCallback::new(f));
        self
    }

    /// The identity of the step.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The explicit top label, if any.
    pub fn top_label(&self) -> Option<&str> {
        self.top_label.as_deref()
    }

    /// The bottom label, if any.
    pub fn bottom_label(&self) -> Option<&str> {
        self.bottom_label.as_deref()
    }

    /// The hover callback, if any.
    pub fn on_hover(&self) -> Option<&StepCallback> {
        self.on_hover.as_ref()
    }

    /// The click callback, if any.
    pub fn on_click(&self) -> Option<&StepCallback> {
        self.on_click.as_ref()
    }

    /// Position on the bar in percent, once computed.
    pub fn progress_percent(&self) -> Option<f64> {
        self.progress_percent
    }

    /// Whether this is the next upcoming step.
    pub fn is_next_step(&self) -> bool {
        self.is_next_step
    }

    /// The surface nodes currently displaying this step.
    pub fn handles(&self) -> &StepHandles {
        &self.handles
    }

    /// Text for the top label: the explicit label when non-empty, otherwise
    /// the value followed by `unit`.
    pub fn top_label_text(&self, unit: &str) -> String {
        match self.top_label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("{}{}", self.value, unit),
        }
    }

    /// Text for the bottom label, verbatim, empty when unset.
    pub fn bottom_label_text(&self) -> &str {
        self.bottom_label.as_deref().unwrap_or("")
    }

    /// Strips render state, leaving only what a caller may supply.
    ///
    /// Steps entering a bar go through here, so handles copied along with a
    /// cloned step never reach the surface of any bar.
    pub(crate) fn detached(mut self) -> Self {
        self.handles = StepHandles::default();
        self.progress_percent = None;
        self.is_next_step = false;
        self
    }

    pub(crate) fn set_progress_percent(&mut self, percent: Option<f64>) {
        self.progress_percent = percent;
    }

    pub(crate) fn set_next_step(&mut self, next: bool) {
        self.is_next_step = next;
    }

    /// Merges a duplicate of this step into it.
    ///
    /// Field by field, a field of `self` that is set (and for labels,
    /// non-empty) wins; otherwise `other`'s field is taken. Render handles
    /// fill detached slots; any of `other`'s handles that collide with an
    /// attached slot are returned so the caller can release them.
    pub(crate) fn absorb(&mut self, other: Step) -> Vec<NodeHandle> {
        if !label_is_set(&self.top_label) {
            self.top_label = other.top_label;
        }
        if !label_is_set(&self.bottom_label) {
            self.bottom_label = other.bottom_label;
        }
        if self.on_hover.is_none() {
            self.on_hover = other.on_hover;
        }
        if self.on_click.is_none() {
            self.on_click = other.on_click;
        }
        self.handles.adopt(other.handles)
    }
}

fn label_is_set(label: &Option<String>) -> bool {
    label.as_deref().is_some_and(|l| !l.is_empty())
}
