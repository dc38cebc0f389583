//! Pointer interaction as a capability of drawn elements.
//!
//! Renderers never reach into each other's elements. An element that reacts
//! to the pointer implements [`Interactive`]; the page routes events to it and
//! hands it the single shared [`Tooltip`].

use serde::Serialize;
use tracing::trace;

use crate::domain::hierarchy::NodeKey;
use crate::domain::point::Point;

/// What the owning view should do after an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Flip a hierarchy node between expanded and collapsed
    Toggle(NodeKey),
    /// Switch what a chart plots
    SetMode(ChartMode),
}

/// Value a grouped bar chart plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ChartMode {
    #[default]
    Absolute,
    /// Difference from the baseline visit
    Change,
}

impl ChartMode {
    pub const ALL: [ChartMode; 2] = [ChartMode::Absolute, ChartMode::Change];

    pub fn name(&self) -> &'static str {
        match self {
            ChartMode::Absolute => "absolute",
            ChartMode::Change => "change",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::Absolute => "Absolute Score",
            ChartMode::Change => "Change from Baseline (Month 0)",
        }
    }
}

pub trait Interactive {
    /// Identifier of the drawn element, unique within its view.
    fn element_id(&self) -> String;

    fn on_hover_enter(&mut self, _tooltip: &mut Tooltip, _at: Point) {}

    fn on_hover_leave(&mut self, _tooltip: &mut Tooltip) {}

    fn on_activate(&mut self) -> Action {
        Action::None
    }
}

/// The one floating info box shared by every view on a page.
///
/// At most one element owns it. A new hover replaces the owner; a leave from
/// anyone but the current owner is ignored, so a late leave cannot hide the
/// tooltip another element just opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tooltip {
    owner: Option<String>,
    content: String,
    anchor: Point,
}

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, owner: impl Into<String>, content: impl Into<String>, at: Point) {
        let owner = owner.into();
        trace!(%owner, "tooltip shown");
        self.owner = Some(owner);
        self.content = content.into();
        // offset so the box does not sit under the pointer
        self.anchor = Point::new(at.x + 10.0, at.y - 10.0);
    }

    pub fn hide(&mut self, owner: &str) {
        if self.owner.as_deref() == Some(owner) {
            self.owner = None;
            self.content.clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }
}
