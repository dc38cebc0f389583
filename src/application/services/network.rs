//! Project network: force-directed node-link diagram with draggable nodes.

use tracing::{debug, instrument};

use crate::application::svg::{fmt_num, svg_root, translate, Element};
use crate::application::ApplicationResult;
use crate::domain::datasets::{Project, PROJECTS, PROJECT_LINKS};
use crate::domain::force::{ForceConfig, Simulation};
use crate::domain::{Interactive, Millis, Point, Tooltip};

use super::Renderer;

const WIDTH: f64 = 1100.0;
const HEIGHT: f64 = 650.0;
const NODE_RADIUS: f64 = 50.0;
/// Upper bound on ticks for one settle call
const SETTLE_TICKS: usize = 300;

/// Pointer target for one project node.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectHandle {
    index: usize,
    project: Project,
}

impl Interactive for ProjectHandle {
    fn element_id(&self) -> String {
        format!("project-{}", self.index)
    }

    fn on_hover_enter(&mut self, tooltip: &mut Tooltip, at: Point) {
        let content = format!(
            "{}\n{}\n{}",
            self.project.id, self.project.tech, self.project.description
        );
        tooltip.show(self.element_id(), content, at);
    }

    fn on_hover_leave(&mut self, tooltip: &mut Tooltip) {
        tooltip.hide(&self.element_id());
    }
}

pub struct NetworkDiagram {
    mount_id: String,
    simulation: Simulation,
    handles: Vec<ProjectHandle>,
}

impl NetworkDiagram {
    pub fn new(mount_id: impl Into<String>) -> ApplicationResult<Self> {
        Self::with_config(mount_id, ForceConfig::default())
    }

    pub fn with_config(
        mount_id: impl Into<String>,
        config: ForceConfig,
    ) -> ApplicationResult<Self> {
        let ids: Vec<&str> = PROJECTS.iter().map(|p| p.id).collect();
        let simulation = Simulation::new(&ids, &PROJECT_LINKS, config)?;
        let handles = PROJECTS
            .iter()
            .enumerate()
            .map(|(index, project)| ProjectHandle {
                index,
                project: *project,
            })
            .collect();
        Ok(Self {
            mount_id: mount_id.into(),
            simulation,
            handles,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Tick until the layout settles (bounded). Returns ticks taken.
    pub fn settle(&mut self) -> usize {
        self.simulation.run(SETTLE_TICKS)
    }

    /// Advance at most `ticks` steps; a no-op once settled.
    pub fn advance(&mut self, ticks: usize) -> usize {
        self.simulation.run(ticks)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn drag_start(&mut self, id: &str) -> ApplicationResult<()> {
        Ok(self.simulation.drag_start(id)?)
    }

    pub fn drag(&mut self, id: &str, to: Point) -> ApplicationResult<()> {
        Ok(self.simulation.drag(id, to)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn drag_end(&mut self, id: &str) -> ApplicationResult<()> {
        Ok(self.simulation.drag_end(id)?)
    }

    fn patterns(&self) -> Element {
        Element::new("defs").children(self.handles.iter().map(|h| {
            Element::new("pattern")
                .attr("id", format!("pattern-{}", h.index))
                .attr("patternUnits", "objectBoundingBox")
                .num("width", 1.0)
                .num("height", 1.0)
                .child(
                    Element::new("image")
                        .attr("href", h.project.image)
                        .num("width", 100.0)
                        .num("height", 100.0)
                        .attr("preserveAspectRatio", "xMidYMid slice"),
                )
        }))
    }
}

impl Renderer for NetworkDiagram {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let mut svg = svg_root(WIDTH, HEIGHT)
            .attr("class", "project-network")
            .child(self.patterns());

        for (s, t) in self.simulation.link_segments() {
            svg.push(
                Element::new("line")
                    .attr("class", "link")
                    .num("x1", s.x)
                    .num("y1", s.y)
                    .num("x2", t.x)
                    .num("y2", t.y)
                    .attr("stroke", "#ccc")
                    .num("stroke-width", 2.0)
                    .num("opacity", 0.8),
            );
        }

        for (handle, node) in self.handles.iter().zip(self.simulation.nodes()) {
            let mut class = String::from("node");
            if node.fixed.is_some() {
                class.push_str(" node--pinned");
            }
            svg.push(
                Element::new("g")
                    .attr("class", class)
                    .attr("id", handle.element_id())
                    .attr("transform", translate(node.position))
                    .child(
                        Element::new("circle")
                            .num("r", NODE_RADIUS)
                            .attr("fill", format!("url(#pattern-{})", handle.index))
                            .attr("stroke", "#444")
                            .num("stroke-width", 1.5)
                            .attr("cursor", "pointer"),
                    )
                    .child(
                        Element::new("text")
                            .attr("text-anchor", "middle")
                            .num("y", 75.0)
                            .attr("fill", "#222")
                            .attr("font-size", "13px")
                            .attr("font-weight", "600")
                            .text(handle.project.id),
                    )
                    .child(
                        Element::new("text")
                            .attr("text-anchor", "middle")
                            .num("y", 92.0)
                            .attr("fill", "#666")
                            .attr("font-size", "11px")
                            .text(handle.project.year),
                    ),
            );
        }

        debug!(
            ticks = self.simulation.ticks(),
            alpha = %fmt_num(self.simulation.alpha()),
            "network drawn"
        );
        Ok(svg)
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        self.handles
            .iter_mut()
            .find(|h| h.element_id() == element_id)
            .map(|h| h as &mut dyn Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_project_gets_a_pattern_and_node() {
        let mut net = NetworkDiagram::new("project-network").unwrap();
        net.settle();
        let svg = net.draw(0).unwrap();
        assert_eq!(svg.find_all("pattern").len(), PROJECTS.len());
        assert_eq!(svg.find_by_class("node").len(), PROJECTS.len());
        assert_eq!(svg.find_by_class("link").len(), PROJECT_LINKS.len());
    }

    #[test]
    fn test_hover_tooltip_shows_tech_and_description() {
        let mut net = NetworkDiagram::new("project-network").unwrap();
        let mut tooltip = Tooltip::new();
        net.element_mut("project-0")
            .unwrap()
            .on_hover_enter(&mut tooltip, Point::new(10.0, 10.0));
        assert!(tooltip.content().contains(PROJECTS[0].tech));
        assert!(tooltip.content().contains(PROJECTS[0].description));
    }

    #[test]
    fn test_dragged_node_is_drawn_pinned_at_pointer() {
        let mut net = NetworkDiagram::new("project-network").unwrap();
        net.settle();
        let id = PROJECTS[1].id;
        net.drag_start(id).unwrap();
        net.drag(id, Point::new(200.0, 150.0)).unwrap();
        net.advance(5);

        let svg = net.draw(0).unwrap();
        let pinned = svg.find_by_class("node--pinned");
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].get_attr("transform"), Some("translate(200,150)"));
    }
}
