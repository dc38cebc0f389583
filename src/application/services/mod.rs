//! Application services
//!
//! One renderer per visualization plus the page driver. Renderers are
//! concrete structs sharing the [`Renderer`] trait; none depends on another.

mod charts;
mod hierarchy_view;
mod map;
mod network;
mod portfolio;
mod skills_matrix;
mod timeline;

use tracing::{debug, trace};

use crate::application::page::{Mount, Page};
use crate::application::svg::Element;
use crate::application::ApplicationResult;
use crate::domain::{Action, Interactive, Millis, Point};

pub use charts::{BarChart, GroupedBar, GroupedBarChart, ModeOption, Scatterplot};
pub use hierarchy_view::{HierarchyView, HierarchyViewConfig, NodeHandle, RenderPass};
pub use map::{CityMarker, CountryShape, InteractiveMap, PlaceKind, Ticker, Visitor, VisitorMap};
pub use network::NetworkDiagram;
pub use portfolio::{PortfolioService, RenderReport};
pub use skills_matrix::SkillsMatrix;
pub use timeline::{ObserverEntry, ScrollyTimeline, StackedTimeline};

/// A visualization bound to one mount point.
pub trait Renderer {
    /// Mount id, without the leading `#`.
    fn mount_id(&self) -> &str;

    /// Produce the view's SVG for time `now`.
    fn draw(&mut self, now: Millis) -> ApplicationResult<Element>;

    /// Clear `mount` and draw into it.
    fn render(&mut self, mount: &mut Mount, now: Millis) -> ApplicationResult<()> {
        mount.clear();
        let element = self.draw(now)?;
        mount.set(element);
        Ok(())
    }

    /// Drawn element that reacts to the pointer, if `element_id` names one.
    fn element_mut(&mut self, _element_id: &str) -> Option<&mut dyn Interactive> {
        None
    }

    /// Carry out what an activated element asked for.
    fn apply(&mut self, _action: Action, _now: Millis) -> ApplicationResult<()> {
        Ok(())
    }
}

/// Look up the renderer's mount on `page` and render into it.
///
/// A missing mount is returned before anything is drawn.
pub fn render_into(
    renderer: &mut dyn Renderer,
    page: &mut Page,
    now: Millis,
) -> ApplicationResult<()> {
    let selector = format!("#{}", renderer.mount_id());
    let mount = page.mount_mut(&selector)?;
    debug!(%selector, "render");
    renderer.render(mount, now)
}

/// Pointer input addressed to a drawn element.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    HoverEnter { element: String, at: Point },
    HoverLeave { element: String },
    Activate { element: String },
}

impl PointerEvent {
    pub fn element(&self) -> &str {
        match self {
            PointerEvent::HoverEnter { element, .. }
            | PointerEvent::HoverLeave { element }
            | PointerEvent::Activate { element } => element,
        }
    }
}

/// Route `event` to the element it names.
///
/// Hover events update the page tooltip, an activation's action is applied to
/// the renderer. The mount is redrawn afterwards so hover highlights show up.
/// Events for unknown elements are dropped.
pub fn dispatch(
    renderer: &mut dyn Renderer,
    page: &mut Page,
    event: PointerEvent,
    now: Millis,
) -> ApplicationResult<Action> {
    let Some(element) = renderer.element_mut(event.element()) else {
        trace!(element = event.element(), "event for unknown element dropped");
        return Ok(Action::None);
    };

    let action = match &event {
        PointerEvent::HoverEnter { at, .. } => {
            element.on_hover_enter(page.tooltip_mut(), *at);
            Action::None
        }
        PointerEvent::HoverLeave { .. } => {
            element.on_hover_leave(page.tooltip_mut());
            Action::None
        }
        PointerEvent::Activate { .. } => element.on_activate(),
    };

    if action != Action::None {
        renderer.apply(action.clone(), now)?;
    }
    render_into(renderer, page, now)?;
    Ok(action)
}
