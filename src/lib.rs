#![warn(missing_docs)]

//! # step-progress
//!
//! The state core of a step progress bar: a bar filled according to a
//! current value, with labeled milestones ("steps") placed along it.
//!
//! ## Overview
//!
//! Given a current value and an unordered, possibly duplicated set of steps,
//! the bar keeps the steps sorted and unique by value, computes the fill of
//! the bar and the position of every step in percent, flags the next step
//! above the current value, and keeps a render surface in sync. Nodes on the
//! surface are created the first time a step appears and reused afterwards,
//! so a mutation only repositions what is already there.
//!
//! ## Features
//!
//! - **Normalized steps**: sorted ascending, duplicates merged field by field
//! - **Graceful percentages**: missing bounds or values fall back to 0%/100%
//! - **Incremental rendering** against any [`surface::RenderSurface`]
//! - **Terminal rendering** with lipgloss styles via [`terminal::TerminalSurface`]
//! - **bubbletea-rs integration**: a terminal bar is a `bubbletea_rs::Model`
//!
//! ## Quick Start
//!
//! ```rust
//! use step_progress::prelude::*;
//!
//! let mut bar = progressbar::new(
//!     MemorySurface::new(),
//!     &[
//!         with_steps(vec![Step::new(0.0), Step::new(50.0), Step::new(100.0)]),
//!         with_current_value(Some(25.0)),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(bar.bar_percent(), 25.0);
//! assert_eq!(bar.next_step().map(|s| s.value()), Some(50.0));
//!
//! bar.add_step(Step::new(50.0).with_bottom_label("Halfway")).unwrap();
//! assert_eq!(bar.steps().len(), 3);
//! assert_eq!(bar.find_step(50.0).and_then(|s| s.bottom_label()), Some("Halfway"));
//! ```
//!
//! ## Component Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`percent`] | Value to percentage mapping and step bounds |
//! | [`step`] | The `Step` type and its callbacks |
//! | [`model`] | Sorted, deduplicated step collection |
//! | [`next_step`] | Next-step flagging |
//! | [`sync`] | Reconciliation against a render surface |
//! | [`surface`] | The `RenderSurface` trait and node handles |
//! | [`memory`] | Headless in-memory surface |
//! | [`terminal`] | Styled terminal surface |
//! | [`progressbar`] | The controller tying it all together |

pub mod error;
pub mod memory;
pub mod model;
pub mod next_step;
pub mod percent;
pub mod progressbar;
pub mod step;
pub mod surface;
pub mod sync;
pub mod terminal;

pub use error::StepError;
pub use memory::MemorySurface;
pub use progressbar::Model as StepProgress;
pub use step::{Step, StepCallback};
pub use surface::{NodeHandle, NodeKind, RenderSlot, RenderSurface, VisualState};
pub use terminal::TerminalSurface;

/// Prelude module for convenient imports.
///
/// ```rust
/// use step_progress::prelude::*;
///
/// let bar = StepProgress::with_defaults(MemorySurface::new());
/// assert_eq!(bar.bar_percent(), 100.0);
/// ```
pub mod prelude {
    pub use crate::error::StepError;
    pub use crate::memory::MemorySurface;
    pub use crate::progressbar::{
        self, with_current_value, with_progress_label, with_responsive_limit, with_rounded,
        with_steps, with_unit, AddStepMsg, Model as StepProgress, ProgressLabelArgs,
        RemoveStepMsg, SetCurrentValueMsg, StepProgressOption,
    };
    pub use crate::step::{Step, StepCallback};
    pub use crate::surface::{NodeHandle, NodeKind, RenderSlot, RenderSurface, VisualState};
    pub use crate::terminal::{self, TerminalSurface};
}
