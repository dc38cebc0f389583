//! Expandable/collapsible tree view.
//!
//! Every render pass lays out the visible part of the hierarchy and plans
//! enter/update/exit transitions relative to a source node: entering nodes
//! grow out of the source's previous position, exiting nodes shrink into its
//! new position. Links follow the same rule keyed by their target node. The
//! written SVG carries SMIL animations so each file replays its pass.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, instrument, trace};

use crate::application::svg::{
    animate_attr, animate_translate, fmt_num, svg_root, translate, Element,
};
use crate::application::ApplicationResult;
use crate::config::TreeConfig;
use crate::domain::{
    Action, Animator, Hierarchy, Interactive, LayoutConfig, Millis, NodeKey, NodeState, Phase,
    Point, ToggleOutcome, Tooltip, Transition, TreeLayout, TreeLayoutEngine,
};

use super::Renderer;

const LABEL_OFFSET: f64 = 13.0;
const LINK_STROKE: &str = "#ccc";
const ROOT_STROKE: &str = "#111";
/// Left margin before the root column.
const VIEW_MARGIN_LEFT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyViewConfig {
    pub layout: LayoutConfig,
    pub duration: Millis,
    pub node_radius: f64,
    pub collapsed_fill: String,
    pub mount_id: String,
    pub width: f64,
    pub height: f64,
}

impl Default for HierarchyViewConfig {
    fn default() -> Self {
        Self::from(&TreeConfig::default())
    }
}

impl From<&TreeConfig> for HierarchyViewConfig {
    fn from(tree: &TreeConfig) -> Self {
        Self {
            layout: LayoutConfig {
                node_spacing: tree.node_spacing,
                level_spacing: tree.level_spacing,
            },
            duration: tree.duration_ms,
            node_radius: tree.node_radius,
            collapsed_fill: tree.collapsed_fill.clone(),
            mount_id: "tree".into(),
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Planned movement of one link between two render passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkTransition {
    /// Links are identified by their child node
    pub target: NodeKey,
    pub phase: Phase,
    pub from: (Point, Point),
    pub to: (Point, Point),
}

/// Result of one render pass.
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub number: u64,
    /// Node the transitions are anchored to
    pub source: NodeKey,
    /// Keys drawn as live nodes after this pass
    pub rendered: BTreeSet<NodeKey>,
    pub transitions: Vec<Transition>,
    pub link_transitions: Vec<LinkTransition>,
    pub layout: TreeLayout,
    element: Element,
}

impl RenderPass {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn markup(&self) -> String {
        self.element.render()
    }

    pub fn transition(&self, key: NodeKey) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.key == key)
    }

    pub fn keys_in_phase(&self, phase: Phase) -> Vec<NodeKey> {
        self.transitions
            .iter()
            .filter(|t| t.phase == phase)
            .map(|t| t.key)
            .collect()
    }
}

/// Per-view render state. Owned by exactly one view.
#[derive(Debug, Default)]
struct ViewState {
    /// Where each node was placed by the last pass that showed it
    positions: HashMap<NodeKey, Point>,
    rendered: BTreeSet<NodeKey>,
    nodes: Animator,
    /// Link geometry keyed by target: parent end and child end
    link_heads: Animator,
    link_tails: Animator,
    passes: u64,
    /// Set on the first pass; later passes keep the same framing
    view_offset: Option<Point>,
}

/// Pointer target for one drawn node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHandle {
    key: NodeKey,
    label: String,
}

impl NodeHandle {
    pub fn key(&self) -> NodeKey {
        self.key
    }
}

impl Interactive for NodeHandle {
    fn element_id(&self) -> String {
        node_element_id(self.key)
    }

    fn on_hover_enter(&mut self, tooltip: &mut Tooltip, at: Point) {
        tooltip.show(self.element_id(), self.label.clone(), at);
    }

    fn on_hover_leave(&mut self, tooltip: &mut Tooltip) {
        tooltip.hide(&self.element_id());
    }

    fn on_activate(&mut self) -> Action {
        Action::Toggle(self.key)
    }
}

fn node_element_id(key: NodeKey) -> String {
    format!("node-{}", key.0)
}

pub struct HierarchyView {
    hierarchy: Hierarchy,
    config: HierarchyViewConfig,
    engine: TreeLayoutEngine,
    state: ViewState,
    handles: Vec<NodeHandle>,
    last: Option<RenderPass>,
}

impl HierarchyView {
    pub fn new(hierarchy: Hierarchy, config: HierarchyViewConfig) -> Self {
        Self {
            engine: TreeLayoutEngine::new(config.layout),
            hierarchy,
            config,
            state: ViewState::default(),
            handles: Vec::new(),
            last: None,
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn config(&self) -> &HierarchyViewConfig {
        &self.config
    }

    pub fn last_pass(&self) -> Option<&RenderPass> {
        self.last.as_ref()
    }

    /// Keys drawn as live nodes by the last pass.
    pub fn rendered(&self) -> &BTreeSet<NodeKey> {
        &self.state.rendered
    }

    /// Resting position of `key` as of the last pass that showed it.
    pub fn position(&self, key: NodeKey) -> Option<Point> {
        self.state.positions.get(&key).copied()
    }

    /// Where `key` is drawn at `now`, including nodes still exiting.
    pub fn displayed_position(&self, key: NodeKey, now: Millis) -> Option<Point> {
        self.state.nodes.displayed(key, now)
    }

    /// Keys with an element on screen at `now`.
    pub fn displayed_nodes(&self, now: Millis) -> Vec<NodeKey> {
        self.state.nodes.live_keys(now)
    }

    pub fn is_animating(&self, now: Millis) -> bool {
        !self.state.nodes.is_idle(now)
    }

    pub fn find_by_label(&self, query: &str) -> ApplicationResult<NodeKey> {
        Ok(self.hierarchy.resolve(query)?)
    }

    /// Render the current state with the root as transition source.
    pub fn render(&mut self, now: Millis) -> ApplicationResult<RenderPass> {
        let root = self.hierarchy.root();
        self.render_from(root, now)
    }

    /// Flip `key` and re-render from it. Leaves are ignored without a pass.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, key: NodeKey, now: Millis) -> ApplicationResult<Option<RenderPass>> {
        match self.hierarchy.toggle(key)? {
            ToggleOutcome::Unchanged => {
                trace!(%key, "toggle on leaf ignored");
                Ok(None)
            }
            outcome => {
                debug!(%key, ?outcome, "node toggled");
                self.render_from(key, now).map(Some)
            }
        }
    }

    /// Collapse `key` with its whole subtree and re-render from it.
    pub fn collapse_all(&mut self, key: NodeKey, now: Millis) -> ApplicationResult<RenderPass> {
        self.hierarchy.collapse_all(key)?;
        self.render_from(key, now)
    }

    /// Collapse every subtree rooted at `depth` and re-render from the root.
    pub fn collapse_from_depth(
        &mut self,
        depth: usize,
        now: Millis,
    ) -> ApplicationResult<RenderPass> {
        let collapsed = self.hierarchy.collapse_from_depth(depth)?;
        debug!(depth, collapsed, "collapsed below depth");
        let root = self.hierarchy.root();
        self.render_from(root, now)
    }

    /// Expand `key` with its whole subtree and re-render from it.
    pub fn expand_all(&mut self, key: NodeKey, now: Millis) -> ApplicationResult<RenderPass> {
        self.hierarchy.expand_all(key)?;
        self.render_from(key, now)
    }

    #[instrument(level = "debug", skip(self))]
    fn render_from(&mut self, source: NodeKey, now: Millis) -> ApplicationResult<RenderPass> {
        let duration = self.config.duration;
        self.state.nodes.prune(now);
        self.state.link_heads.prune(now);
        self.state.link_tails.prune(now);

        let layout = self.engine.compute(&self.hierarchy);
        // a hidden source is represented by its nearest visible ancestor
        let anchor = self.hierarchy.visible_anchor(source)?;
        let anchor_new = layout.position(anchor).unwrap_or(Point::ORIGIN);
        let anchor_old = self.state.positions.get(&anchor).copied().unwrap_or(anchor_new);

        let mut transitions = Vec::new();
        for &key in layout.keys() {
            let to = layout.position(key).unwrap_or(anchor_new);
            let phase = match self.state.nodes.displayed(key, now) {
                Some(_) => Phase::Update,
                None => Phase::Enter,
            };
            let fallback = match phase {
                Phase::Enter => anchor_old,
                _ => self.state.positions.get(&key).copied().unwrap_or(to),
            };
            transitions.push(self.state.nodes.start(key, phase, fallback, to, now, duration));
        }

        let exiting: Vec<NodeKey> = self
            .state
            .nodes
            .live_keys(now)
            .into_iter()
            .filter(|k| !layout.contains(*k))
            .collect();
        for &key in &exiting {
            let fallback = self.state.positions.get(&key).copied().unwrap_or(anchor_old);
            transitions.push(
                self.state
                    .nodes
                    .start(key, Phase::Exit, fallback, anchor_new, now, duration),
            );
        }

        let link_transitions = self.plan_links(&layout, anchor_old, anchor_new, now);

        for &key in layout.keys() {
            if let Some(p) = layout.position(key) {
                self.state.positions.insert(key, p);
            }
        }
        self.state.rendered = layout.keys().iter().copied().collect();
        self.state.passes += 1;
        let view_offset = *self
            .state
            .view_offset
            .get_or_insert(Point::new(VIEW_MARGIN_LEFT, self.config.height / 2.0));

        self.handles = layout
            .keys()
            .iter()
            .map(|&key| {
                Ok(NodeHandle {
                    key,
                    label: self.hierarchy.node(key)?.label().to_string(),
                })
            })
            .collect::<ApplicationResult<_>>()?;

        let element = self.draw_pass(&transitions, &link_transitions, view_offset)?;
        debug!(
            rendered = layout.len(),
            exiting = exiting.len(),
            "render pass complete"
        );

        let pass = RenderPass {
            number: self.state.passes,
            source,
            rendered: self.state.rendered.clone(),
            transitions,
            link_transitions,
            layout,
            element,
        };
        self.last = Some(pass.clone());
        Ok(pass)
    }

    fn plan_links(
        &mut self,
        layout: &TreeLayout,
        anchor_old: Point,
        anchor_new: Point,
        now: Millis,
    ) -> Vec<LinkTransition> {
        let duration = self.config.duration;
        let mut planned = Vec::new();

        for &(parent, child) in layout.links() {
            let head_to = layout.position(parent).unwrap_or(anchor_new);
            let tail_to = layout.position(child).unwrap_or(anchor_new);
            let phase = match self.state.link_tails.displayed(child, now) {
                Some(_) => Phase::Update,
                None => Phase::Enter,
            };
            let (head_from, tail_from) = match phase {
                Phase::Enter => (anchor_old, anchor_old),
                _ => (
                    self.state.positions.get(&parent).copied().unwrap_or(head_to),
                    self.state.positions.get(&child).copied().unwrap_or(tail_to),
                ),
            };
            let head = self
                .state
                .link_heads
                .start(child, phase, head_from, head_to, now, duration);
            let tail = self
                .state
                .link_tails
                .start(child, phase, tail_from, tail_to, now, duration);
            planned.push(LinkTransition {
                target: child,
                phase,
                from: (head.from, tail.from),
                to: (head.to, tail.to),
            });
        }

        let laid_out: BTreeSet<NodeKey> = layout.links().iter().map(|&(_, c)| c).collect();
        for target in self.state.link_tails.live_keys(now) {
            if laid_out.contains(&target) {
                continue;
            }
            let head = self.state.link_heads.start(
                target,
                Phase::Exit,
                anchor_old,
                anchor_new,
                now,
                duration,
            );
            let tail = self.state.link_tails.start(
                target,
                Phase::Exit,
                anchor_old,
                anchor_new,
                now,
                duration,
            );
            planned.push(LinkTransition {
                target,
                phase: Phase::Exit,
                from: (head.from, tail.from),
                to: (head.to, tail.to),
            });
        }
        planned
    }

    fn draw_pass(
        &self,
        transitions: &[Transition],
        links: &[LinkTransition],
        view_offset: Point,
    ) -> ApplicationResult<Element> {
        let duration = self.config.duration;
        let mut canvas = Element::new("g")
            .attr("class", "tree")
            .attr("transform", translate(view_offset));

        // links first so nodes paint on top
        for link in links {
            let mut path = Element::new("path")
                .attr("class", "link")
                .attr("id", format!("link-{}", link.target.0))
                .attr("d", diagonal(link.to.0, link.to.1))
                .attr("fill", "none")
                .attr("stroke", LINK_STROKE)
                .num("stroke-width", 1.5);
            if link.from != link.to {
                path.push(animate_attr(
                    "d",
                    diagonal(link.from.0, link.from.1),
                    diagonal(link.to.0, link.to.1),
                    duration,
                ));
            }
            canvas.push(path);
        }

        for t in transitions {
            canvas.push(self.draw_node(t)?);
        }

        Ok(svg_root(self.config.width, self.config.height)
            .attr("class", "hierarchy")
            .child(canvas))
    }

    fn draw_node(&self, t: &Transition) -> ApplicationResult<Element> {
        let duration = self.config.duration;
        let node = self.hierarchy.node(t.key)?;
        let state = node.state();
        let is_root = t.key == self.hierarchy.root();

        let mut class = vec![
            "node",
            if node.is_internal() {
                "node--internal"
            } else {
                "node--leaf"
            },
        ];
        if state == NodeState::Collapsed {
            class.push("node--collapsed");
        }
        if t.phase == Phase::Exit {
            class.push("node--exiting");
        }

        let fill = match state {
            NodeState::Collapsed => self.config.collapsed_fill.as_str(),
            _ => "#fff",
        };
        let stroke = if is_root {
            ROOT_STROKE
        } else {
            self.config.collapsed_fill.as_str()
        };
        let radius = self.config.node_radius;

        let mut circle = Element::new("circle")
            .num("r", if t.phase == Phase::Exit { 0.0 } else { radius })
            .attr("fill", fill)
            .attr("stroke", stroke)
            .num("stroke-width", 2.0);
        let (label_x, anchor) = if node.is_internal() {
            (-LABEL_OFFSET, "end")
        } else {
            (LABEL_OFFSET, "start")
        };
        let mut label = Element::new("text")
            .num("x", label_x)
            .attr("dy", ".35em")
            .attr("text-anchor", anchor)
            .num("fill-opacity", if t.phase == Phase::Exit { 0.0 } else { 1.0 })
            .text(node.label());

        match t.phase {
            Phase::Enter => {
                circle.push(animate_attr("r", "1e-6", fmt_num(radius), duration));
                label.push(animate_attr("fill-opacity", "1e-6", "1", duration));
            }
            Phase::Exit => {
                circle.push(animate_attr("r", fmt_num(radius), "1e-6", duration));
                label.push(animate_attr("fill-opacity", "1", "1e-6", duration));
            }
            Phase::Update => {}
        }

        let mut group = Element::new("g")
            .attr("class", class.join(" "))
            .attr("id", node_element_id(t.key))
            .attr("data-key", t.key.0)
            .attr("transform", translate(t.to));
        if !t.is_stationary() {
            group.push(animate_translate(t.from, t.to, t.duration));
        }
        Ok(group.child(circle).child(label))
    }
}

/// Horizontal cubic Bézier from `s` to `d`.
fn diagonal(s: Point, d: Point) -> String {
    let mid = (s.x + d.x) / 2.0;
    format!(
        "M{},{} C{},{} {},{} {},{}",
        fmt_num(s.x),
        fmt_num(s.y),
        fmt_num(mid),
        fmt_num(s.y),
        fmt_num(mid),
        fmt_num(d.y),
        fmt_num(d.x),
        fmt_num(d.y)
    )
}

impl Renderer for HierarchyView {
    fn mount_id(&self) -> &str {
        &self.config.mount_id
    }

    fn draw(&mut self, now: Millis) -> ApplicationResult<Element> {
        match &self.last {
            Some(pass) => Ok(pass.element.clone()),
            None => Ok(self.render(now)?.element),
        }
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        self.handles
            .iter_mut()
            .find(|h| h.element_id() == element_id)
            .map(|h| h as &mut dyn Interactive)
    }

    fn apply(&mut self, action: Action, now: Millis) -> ApplicationResult<()> {
        if let Action::Toggle(key) = action {
            self.toggle(key, now)?;
        }
        Ok(())
    }
}
