//! Terminal render surface.
//!
//! [`TerminalSurface`] draws a step progress bar as three text rows: the top
//! labels, the bar itself with a marker for every step, and the bottom
//! labels. Colors are applied with lipgloss styles; the node marked as the
//! next step is highlighted on all three rows.
//!
//! # Basic Usage
//!
//! ```rust
//! use step_progress::progressbar::{new, with_current_value, with_steps, with_unit};
//! use step_progress::step::Step;
//! use step_progress::terminal::{self, with_width};
//!
//! let bar = new(
//!     terminal::new(&[with_width(30)]),
//!     &[
//!         with_steps(vec![Step::new(0.0), Step::new(5.0), Step::new(10.0)]),
//!         with_current_value(Some(4.0)),
//!         with_unit("km"),
//!     ],
//! )
//! .unwrap();
//!
//! println!("{}", bar.view());
//! ```

use crate::surface::{NodeHandle, NodeKind, RenderSurface, VisualState};
use lipgloss_extras::lipgloss;
use lipgloss_extras::lipgloss::Style;
use std::collections::{BTreeMap, BTreeSet};
use unicode_width::UnicodeWidthChar;

const DEFAULT_WIDTH: usize = 40;

/// Configuration options for the terminal surface.
///
/// # Examples
///
/// ```rust
/// use step_progress::terminal::{new, with_fill_characters, with_solid_fill, with_width};
///
/// let surface = new(&[
///     with_width(60),
///     with_solid_fill("#2ed573".to_string()),
///     with_fill_characters('=', '-'),
/// ]);
/// assert_eq!(surface.width, 60);
/// ```
pub enum TerminalOption {
    /// Sets the total width of the bar row in columns, end caps included.
    WithWidth(usize),
    /// Characters for the filled and empty portions of the bar.
    WithFillCharacters(char, char),
    /// Color of the filled portion.
    WithSolidFill(String),
    /// Color of the empty portion.
    WithEmptyColor(String),
    /// Character and color of step markers.
    WithMarker(char, String),
    /// Color used for the next step's marker and labels.
    WithNextStepColor(String),
    /// Hides the progress label printed after the bar.
    WithoutProgressLabel,
}

impl TerminalOption {
    fn apply(&self, s: &mut TerminalSurface) {
        match self {
            TerminalOption::WithWidth(width) => s.width = *width,
            TerminalOption::WithFillCharacters(full, empty) => {
                s.full = *full;
                s.empty = *empty;
            }
            TerminalOption::WithSolidFill(color) => s.full_color = color.clone(),
            TerminalOption::WithEmptyColor(color) => s.empty_color = color.clone(),
            TerminalOption::WithMarker(marker, color) => {
                s.marker = *marker;
                s.marker_color = color.clone();
            }
            TerminalOption::WithNextStepColor(color) => s.next_step_color = color.clone(),
            TerminalOption::WithoutProgressLabel => s.show_progress_label = false,
        }
    }
}

/// Sets the total width of the bar row in columns.
pub fn with_width(width: usize) -> TerminalOption {
    TerminalOption::WithWidth(width)
}

/// Sets the characters used for the filled and empty portions.
pub fn with_fill_characters(full: char, empty: char) -> TerminalOption {
    TerminalOption::WithFillCharacters(full, empty)
}

/// Sets the color of the filled portion.
pub fn with_solid_fill(color: String) -> TerminalOption {
    TerminalOption::WithSolidFill(color)
}

/// Sets the color of the empty portion.
pub fn with_empty_color(color: String) -> TerminalOption {
    TerminalOption::WithEmptyColor(color)
}

/// Sets the step marker character and its color.
pub fn with_marker(marker: char, color: String) -> TerminalOption {
    TerminalOption::WithMarker(marker, color)
}

/// Sets the highlight color of the next step.
pub fn with_next_step_color(color: String) -> TerminalOption {
    TerminalOption::WithNextStepColor(color)
}

/// Hides the progress label.
pub fn without_progress_label() -> TerminalOption {
    TerminalOption::WithoutProgressLabel
}

#[derive(Debug, Clone)]
struct TermNode {
    kind: NodeKind,
    position: Option<f64>,
    text: String,
    states: BTreeSet<VisualState>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Blank,
    Glyph(char, bool),
    // Second column of a double-width glyph.
    Continuation,
}

/// A [`RenderSurface`] that renders to styled terminal text.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    /// Total width of the bar row, including end caps.
    pub width: usize,
    /// "Filled" sections of the bar.
    pub full: char,
    /// Color of the filled portion.
    pub full_color: String,
    /// "Empty" sections of the bar.
    pub empty: char,
    /// Color of the empty portion.
    pub empty_color: String,
    /// Step marker character.
    pub marker: char,
    /// Step marker color.
    pub marker_color: String,
    /// Color of the next step's marker and labels.
    pub next_step_color: String,
    /// Whether the progress label is printed after the bar.
    pub show_progress_label: bool,
    /// Style applied to the progress label.
    pub label_style: Style,

    last_id: u64,
    nodes: BTreeMap<NodeHandle, TermNode>,
    responsive_limit: Option<f64>,
}

/// Creates a terminal surface with the given options.
///
/// Defaults: 40 columns, `█`/`░` fill in `#7571F9`/`#606060`, `●` markers,
/// next step highlighted in `#EE6FF8`, progress label shown.
pub fn new(opts: &[TerminalOption]) -> TerminalSurface {
    let mut s = TerminalSurface {
        width: DEFAULT_WIDTH,
        full: '█',
        full_color: "#7571F9".to_string(),
        empty: '░',
        empty_color: "#606060".to_string(),
        marker: '●',
        marker_color: "#FAFAFA".to_string(),
        next_step_color: "#EE6FF8".to_string(),
        show_progress_label: true,
        label_style: Style::new(),
        last_id: 0,
        nodes: BTreeMap::new(),
        responsive_limit: None,
    };

    for opt in opts {
        opt.apply(&mut s);
    }

    s
}

impl Default for TerminalSurface {
    fn default() -> Self {
        new(&[])
    }
}

impl TerminalSurface {
    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The breakpoint handed over by the bar, if any.
    pub fn responsive_limit(&self) -> Option<f64> {
        self.responsive_limit
    }

    /// Renders the bar and its labels.
    ///
    /// Rows without any label text are omitted, so a bar without steps
    /// renders as a single line.
    pub fn view(&self) -> String {
        let inner = self.inner_width();
        let mut rows = Vec::with_capacity(3);

        if let Some(top) = self.label_row(NodeKind::TopLabel, inner) {
            rows.push(top);
        }
        rows.push(self.bar_row(inner));
        if let Some(bottom) = self.label_row(NodeKind::BottomLabel, inner) {
            rows.push(bottom);
        }

        rows.join("\n")
    }

    fn inner_width(&self) -> usize {
        std::cmp::max(1, self.width.saturating_sub(2))
    }

    fn column(percent: f64, inner: usize) -> usize {
        let span = (inner - 1) as f64;
        let col = (span * percent.clamp(0.0, 100.0) / 100.0).round() as usize;
        std::cmp::min(col, inner - 1)
    }

    fn bar_fill(&self) -> Option<&TermNode> {
        self.nodes.values().find(|n| n.kind == NodeKind::BarFill)
    }

    fn bar_row(&self, inner: usize) -> String {
        let fill = self.bar_fill();
        let percent = fill.and_then(|n| n.position).unwrap_or(0.0);
        let rounded = fill.is_some_and(|n| n.states.contains(&VisualState::Rounded));
        let filled = std::cmp::min(
            inner,
            ((inner as f64) * percent.clamp(0.0, 100.0) / 100.0).round() as usize,
        );

        let mut markers: BTreeMap<usize, bool> = BTreeMap::new();
        for node in self.nodes.values() {
            if node.kind != NodeKind::StepMarker {
                continue;
            }
            if let Some(position) = node.position {
                let next = node.states.contains(&VisualState::NextStep);
                let entry = markers.entry(Self::column(position, inner)).or_insert(false);
                *entry |= next;
            }
        }

        let full = Style::new()
            .foreground(lipgloss::Color::from(self.full_color.as_str()))
            .render(&self.full.to_string());
        let empty = Style::new()
            .foreground(lipgloss::Color::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());
        let marker = Style::new()
            .foreground(lipgloss::Color::from(self.marker_color.as_str()))
            .render(&self.marker.to_string());
        let next_marker = Style::new()
            .foreground(lipgloss::Color::from(self.next_step_color.as_str()))
            .render(&self.marker.to_string());

        let (open, close) = if rounded { ('(', ')') } else { ('[', ']') };
        let mut result = String::new();
        result.push(open);
        for col in 0..inner {
            match markers.get(&col) {
                Some(true) => result.push_str(&next_marker),
                Some(false) => result.push_str(&marker),
                None if col < filled => result.push_str(&full),
                None => result.push_str(&empty),
            }
        }
        result.push(close);

        if self.show_progress_label {
            if let Some(text) = fill.map(|n| n.text.as_str()).filter(|t| !t.is_empty()) {
                result.push(' ');
                result.push_str(&self.label_style.render(text));
            }
        }

        result
    }

    fn label_row(&self, kind: NodeKind, inner: usize) -> Option<String> {
        let total = inner + 2;
        let mut cells = vec![Cell::Blank; total];

        for node in self.nodes.values() {
            if node.kind != kind || node.text.is_empty() {
                continue;
            }
            let Some(position) = node.position else {
                continue;
            };
            let next = node.states.contains(&VisualState::NextStep);
            let text_width: usize = node.text.chars().map(|c| c.width().unwrap_or(0)).sum();
            // Centre over the marker (offset by the left cap), kept inside the row.
            let center = Self::column(position, inner) + 1;
            let start = center
                .saturating_sub(text_width / 2)
                .min(total.saturating_sub(text_width));
            Self::write(&mut cells, start, &node.text, next);
        }

        if cells.iter().all(|c| *c == Cell::Blank) {
            return None;
        }

        let highlight =
            Style::new().foreground(lipgloss::Color::from(self.next_step_color.as_str()));
        let mut row = String::new();
        for cell in cells {
            match cell {
                Cell::Blank => row.push(' '),
                Cell::Glyph(c, true) => row.push_str(&highlight.render(&c.to_string())),
                Cell::Glyph(c, false) => row.push(c),
                Cell::Continuation => {}
            }
        }
        Some(row.trim_end().to_string())
    }

    fn write(cells: &mut [Cell], start: usize, text: &str, next: bool) {
        let mut col = start;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            if col + w > cells.len() {
                break;
            }
            Self::clear(cells, col);
            if w == 2 {
                Self::clear(cells, col + 1);
                cells[col + 1] = Cell::Continuation;
            }
            cells[col] = Cell::Glyph(c, next);
            col += w;
        }
    }

    // Blanks whatever glyph occupies `col`, including the other half of a wide one.
    fn clear(cells: &mut [Cell], col: usize) {
        let current = cells[col];
        match current {
            Cell::Continuation if col > 0 => cells[col - 1] = Cell::Blank,
            Cell::Glyph(..) if cells.get(col + 1) == Some(&Cell::Continuation) => {
                cells[col + 1] = Cell::Blank
            }
            _ => {}
        }
        cells[col] = Cell::Blank;
    }
}

impl RenderSurface for TerminalSurface {
    fn create_node(&mut self, kind: NodeKind) -> NodeHandle {
        self.last_id += 1;
        let handle = NodeHandle::new(self.last_id);
        self.nodes.insert(
            handle,
            TermNode {
                kind,
                position: None,
                text: String::new(),
                states: BTreeSet::new(),
            },
        );
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
    }

    fn set_responsive_limit(&mut self, limit: f64) {
        self.responsive_limit = Some(limit);
    }
}
