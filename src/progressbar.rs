//! Step progress bar controller.
//!
//! [`Model`] owns the current value, the step collection and the render
//! surface. Every mutation runs the full refresh pipeline before returning:
//!
//! 1. sort the steps by value,
//! 2. merge steps that share a value,
//! 3. position the bar fill,
//! 4. position every step,
//! 5. flag the next step,
//! 6. reconcile the surface, reusing nodes that already exist.
//!
//! # Basic Usage
//!
//! ```rust
//! use step_progress::memory::MemorySurface;
//! use step_progress::progressbar::{new, with_current_value, with_steps, with_unit};
//! use step_progress::step::Step;
//!
//! let mut bar = new(
//!     MemorySurface::new(),
//!     &[
//!         with_steps(vec![Step::new(100.0), Step::new(0.0), Step::new(50.0)]),
//!         with_current_value(Some(25.0)),
//!         with_unit("%"),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(bar.bar_percent(), 25.0);
//! assert_eq!(bar.next_step().map(|s| s.value()), Some(50.0));
//!
//! bar.set_current_value(Some(60.0)).unwrap();
//! assert_eq!(bar.next_step().map(|s| s.value()), Some(100.0));
//! ```
//!
//! # Integration with bubbletea-rs
//!
//! A bar drawn on a [`TerminalSurface`] is a bubbletea model. Mutations can
//! be sent as messages:
//!
//! ```rust
//! use step_progress::progressbar::{AddStepMsg, Model, SetCurrentValueMsg};
//! use step_progress::step::Step;
//! use step_progress::terminal;
//!
//! let mut bar = Model::with_defaults(terminal::new(&[]));
//! bar.update(Box::new(AddStepMsg(Step::new(10.0))));
//! bar.update(Box::new(SetCurrentValueMsg(Some(5.0))));
//! assert_eq!(bar.bar_percent(), 0.0);
//! println!("{}", bar.view());
//! ```

use crate::error::{validate_current_value, validate_step_value, StepError};
use crate::model::Steps;
use crate::next_step::mark_next_step;
use crate::step::Step;
use crate::surface::{NodeKind, RenderSlot, RenderSurface, VisualState};
use crate::sync::{apply_next_step_markers, reconcile, release_handles, release_step};
use crate::terminal::{self, TerminalSurface};
use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_CURRENT_VALUE: f64 = 0.0;
const DEFAULT_RESPONSIVE_LIMIT: f64 = 480.0;

/// Values handed to the progress label formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressLabelArgs {
    /// The current value.
    pub current: Option<f64>,
    /// The smallest step value, if there are steps.
    pub min: Option<f64>,
    /// The largest step value, if there are steps.
    pub max: Option<f64>,
    /// Fill of the bar in percent.
    pub percent: f64,
}

/// Formats the text shown with the bar fill.
pub type ProgressLabelFn = Arc<dyn Fn(&ProgressLabelArgs) -> String + Send + Sync>;

fn default_progress_label() -> ProgressLabelFn {
    Arc::new(|args: &ProgressLabelArgs| format!("{:.0}%", args.percent))
}

/// Configuration options for a step progress bar.
///
/// # Examples
///
/// ```rust
/// use step_progress::memory::MemorySurface;
/// use step_progress::progressbar::{new, with_rounded, with_steps, with_unit};
/// use step_progress::step::Step;
///
/// let bar = new(
///     MemorySurface::new(),
///     &[
///         with_steps(vec![Step::new(0.0), Step::new(10.0)]),
///         with_unit("km"),
///         with_rounded(false),
///     ],
/// )
/// .unwrap();
/// assert_eq!(bar.unit(), "km");
/// assert!(!bar.rounded());
/// ```
pub enum StepProgressOption {
    /// Initial current value. `None` means no value yet.
    WithCurrentValue(Option<f64>),
    /// Initial steps, in any order, duplicates allowed.
    WithSteps(Vec<Step>),
    /// Rounded or square bar ends.
    WithRounded(bool),
    /// Suffix appended to step values in default top labels.
    WithUnit(String),
    /// Layout breakpoint forwarded to the surface.
    WithResponsiveLimit(f64),
    /// Formatter for the text shown with the bar fill.
    WithProgressLabel(ProgressLabelFn),
}

impl StepProgressOption {
    fn apply<S: RenderSurface>(&self, m: &mut Model<S>) {
        match self {
            StepProgressOption::WithCurrentValue(value) => m.current_value = *value,
            StepProgressOption::WithSteps(steps) => {
                m.steps = Steps::from_vec(steps.iter().cloned().map(Step::detached).collect());
            }
            StepProgressOption::WithRounded(rounded) => m.rounded = *rounded,
            StepProgressOption::WithUnit(unit) => m.unit = unit.clone(),
            StepProgressOption::WithResponsiveLimit(limit) => m.responsive_limit = *limit,
            StepProgressOption::WithProgressLabel(f) => m.progress_label = Arc::clone(f),
        }
    }
}

/// Sets the initial current value (default `Some(0.0)`).
pub fn with_current_value(value: Option<f64>) -> StepProgressOption {
    StepProgressOption::WithCurrentValue(value)
}

/// Sets the initial steps (default none).
pub fn with_steps(steps: Vec<Step>) -> StepProgressOption {
    StepProgressOption::WithSteps(steps)
}

/// Chooses rounded (default) or square bar ends.
pub fn with_rounded(rounded: bool) -> StepProgressOption {
    StepProgressOption::WithRounded(rounded)
}

/// Sets the unit suffix (default empty).
pub fn with_unit(unit: impl Into<String>) -> StepProgressOption {
    StepProgressOption::WithUnit(unit.into())
}

/// Sets the responsive layout breakpoint (default 480).
pub fn with_responsive_limit(limit: f64) -> StepProgressOption {
    StepProgressOption::WithResponsiveLimit(limit)
}

/// Sets the progress label formatter (default `"{percent}%"`, rounded).
pub fn with_progress_label(
    f: impl Fn(&ProgressLabelArgs) -> String + Send + Sync + 'static,
) -> StepProgressOption {
    StepProgressOption::WithProgressLabel(Arc::new(f))
}

/// Sets the current value and refreshes the bar.
#[derive(Debug, Clone, Copy)]
pub struct SetCurrentValueMsg(pub Option<f64>);

/// Adds a step and refreshes the bar.
#[derive(Debug, Clone)]
pub struct AddStepMsg(pub Step);

/// Removes the step with this value and refreshes the bar.
#[derive(Debug, Clone, Copy)]
pub struct RemoveStepMsg(pub f64);

/// A step progress bar bound to a render surface.
#[derive(Clone)]
pub struct Model<S: RenderSurface> {
    current_value: Option<f64>,
    steps: Steps,
    unit: String,
    rounded: bool,
    responsive_limit: f64,
    progress_label: ProgressLabelFn,
    bar_fill: RenderSlot,
    surface: S,
}

/// Creates a step progress bar on `surface` and renders it.
///
/// Fails without touching the surface if a configured step value or the
/// current value is NaN or infinite.
pub fn new<S: RenderSurface>(
    surface: S,
    opts: &[StepProgressOption],
) -> Result<Model<S>, StepError> {
    let mut m = Model::unrendered(surface);
    for opt in opts {
        opt.apply(&mut m);
    }

    validate_current_value(m.current_value)?;
    for step in &m.steps {
        validate_step_value(step.value())?;
    }

    m.surface.set_responsive_limit(m.responsive_limit);
    m.refresh();
    Ok(m)
}

impl<S: RenderSurface> Model<S> {
    fn unrendered(surface: S) -> Self {
        Self {
            current_value: Some(DEFAULT_CURRENT_VALUE),
            steps: Steps::new(),
            unit: String::new(),
            rounded: true,
            responsive_limit: DEFAULT_RESPONSIVE_LIMIT,
            progress_label: default_progress_label(),
            bar_fill: RenderSlot::Detached,
            surface,
        }
    }

    /// Creates a bar with default settings and no steps.
    pub fn with_defaults(surface: S) -> Self {
        let mut m = Self::unrendered(surface);
        m.surface.set_responsive_limit(m.responsive_limit);
        m.refresh();
        m
    }

    /// The current value.
    pub fn current_value(&self) -> Option<f64> {
        self.current_value
    }

    /// Sets the current value and refreshes.
    ///
    /// # Errors
    ///
    /// [`StepError::InvalidCurrentValue`] for NaN or infinity; the bar is
    /// left unchanged.
    pub fn set_current_value(&mut self, value: impl Into<Option<f64>>) -> Result<(), StepError> {
        let value = validate_current_value(value.into()).map_err(|err| {
            warn!(%err, "rejected current value");
            err
        })?;
        self.current_value = value;
        self.refresh();
        Ok(())
    }

    /// The step with exactly this value.
    pub fn find_step(&self, value: f64) -> Option<&Step> {
        self.steps.find(value)
    }

    /// Adds a step and refreshes. A step whose value already exists is
    /// merged into the existing one. Render handles carried by a cloned
    /// step are dropped; this bar's own nodes display it.
    ///
    /// # Errors
    ///
    /// [`StepError::InvalidStep`] for NaN or infinite values; the bar is
    /// left unchanged.
    pub fn add_step(&mut self, step: Step) -> Result<(), StepError> {
        validate_step_value(step.value()).map_err(|err| {
            warn!(%err, "rejected step");
            err
        })?;
        self.steps.push(step.detached());
        self.refresh();
        Ok(())
    }

    /// Removes the step with this value, releasing its nodes, and refreshes.
    ///
    /// The bar is refreshed whether or not a step matched. Returns the
    /// removed step, detached from the surface.
    pub fn remove_step(&mut self, value: f64) -> Option<Step> {
        let removed = self.steps.remove(value).map(|mut step| {
            release_step(&mut step, &mut self.surface);
            step
        });
        if removed.is_none() {
            debug!(value, "no step to remove");
        }
        self.refresh();
        removed
    }

    /// Runs the refresh pipeline.
    pub fn refresh(&mut self) {
        let orphans = self.steps.normalize();
        release_handles(orphans, &mut self.surface);

        let bar_percent = self.steps.bar_percent(self.current_value);
        self.render_bar_fill(bar_percent);

        self.steps.recompute_percentages();
        let next = mark_next_step(&mut self.steps, self.current_value);
        reconcile(&mut self.steps, &mut self.surface, &self.unit);
        apply_next_step_markers(&self.steps, &mut self.surface);

        debug!(
            steps = self.steps.len(),
            current = ?self.current_value,
            bar_percent,
            next_step = ?next.map(|i| self.steps.as_slice()[i].value()),
            "refreshed step progress bar"
        );
    }

    /// Fill of the bar in percent.
    pub fn bar_percent(&self) -> f64 {
        self.steps.bar_percent(self.current_value)
    }

    /// The text for the bar fill, as produced by the configured formatter.
    pub fn progress_label(&self) -> String {
        let bounds = self.steps.bounds();
        (self.progress_label)(&ProgressLabelArgs {
            current: self.current_value,
            min: bounds.map(|b| b.min),
            max: bounds.map(|b| b.max),
            percent: self.bar_percent(),
        })
    }

    /// The step flagged as next, if any.
    pub fn next_step(&self) -> Option<&Step> {
        self.steps.iter().find(|step| step.is_next_step())
    }

    /// The steps, sorted ascending by value.
    pub fn steps(&self) -> &[Step] {
        self.steps.as_slice()
    }

    /// The unit suffix.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Whether the bar has rounded ends.
    pub fn rounded(&self) -> bool {
        self.rounded
    }

    /// The responsive layout breakpoint.
    pub fn responsive_limit(&self) -> f64 {
        self.responsive_limit
    }

    /// The render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Releases every node this bar created.
    ///
    /// The data stays; a later mutation or [`Model::refresh`] renders the
    /// bar again from scratch.
    pub fn destroy(&mut self) {
        for step in self.steps.as_mut_slice() {
            release_step(step, &mut self.surface);
        }
        if let Some(handle) = self.bar_fill.take() {
            self.surface.remove(handle);
        }
        debug!(steps = self.steps.len(), "released step progress bar nodes");
    }

    /// Handles bar messages. Always returns `None`; the bar has no
    /// animation of its own.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(SetCurrentValueMsg(value)) = msg.downcast_ref::<SetCurrentValueMsg>() {
            if let Err(err) = self.set_current_value(*value) {
                debug!(%err, "dropped SetCurrentValueMsg");
            }
        } else if let Some(AddStepMsg(step)) = msg.downcast_ref::<AddStepMsg>() {
            if let Err(err) = self.add_step(step.clone()) {
                debug!(%err, "dropped AddStepMsg");
            }
        } else if let Some(RemoveStepMsg(value)) = msg.downcast_ref::<RemoveStepMsg>() {
            self.remove_step(*value);
        }
        None
    }

    fn render_bar_fill(&mut self, percent: f64) {
        let handle = match self.bar_fill.handle() {
            Some(handle) => handle,
            None => {
                let handle = self.surface.create_node(NodeKind::BarFill);
                self.bar_fill = RenderSlot::Attached(handle);
                handle
            }
        };
        if self.rounded {
            self.surface.add_visual_state(handle, VisualState::Rounded);
        } else {
            self.surface.remove_visual_state(handle, VisualState::Rounded);
        }
        self.surface.set_position(handle, percent);
        let label = self.progress_label();
        self.surface.set_text(handle, &label);
    }
}

impl Model<TerminalSurface> {
    /// Renders the bar to styled terminal text.
    pub fn view(&self) -> String {
        self.surface.view()
    }
}

impl<S: RenderSurface + fmt::Debug> fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("current_value", &self.current_value)
            .field("steps", &self.steps)
            .field("unit", &self.unit)
            .field("rounded", &self.rounded)
            .field("responsive_limit", &self.responsive_limit)
            .field("bar_fill", &self.bar_fill)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl BubbleTeaModel for Model<TerminalSurface> {
    fn init() -> (Self, Option<Cmd>) {
        (Model::with_defaults(terminal::new(&[])), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for Model<TerminalSurface> {
    fn default() -> Self {
        Model::with_defaults(TerminalSurface::default())
    }
}
