//! Integration tests for pointer interaction routed through a page: hover
//! tooltips, activation toggles, scroll visibility and node dragging.

use portviz::application::page::Page;
use portviz::application::services::{
    dispatch, render_into, GroupedBarChart, HierarchyView, HierarchyViewConfig, NetworkDiagram,
    ObserverEntry, PointerEvent, Renderer, ScrollyTimeline, SkillsMatrix, StackedTimeline,
};
use portviz::domain::datasets::PROJECTS;
use portviz::domain::{Action, ChartMode, Hierarchy, Interactive, NodeSpec, NodeState, Point};
use portviz::util::testing;

fn tree_page() -> (Page, HierarchyView) {
    testing::init_test_setup();
    let spec = NodeSpec::branch(
        "A",
        vec![
            NodeSpec::branch("B", vec![NodeSpec::leaf("D")]),
            NodeSpec::leaf("C"),
        ],
    );
    let view = HierarchyView::new(Hierarchy::from_spec(&spec), HierarchyViewConfig::default());
    let mut page = Page::new("test");
    page.add_mount("tree");
    (page, view)
}

#[test]
fn given_drawn_tree_when_node_activated_then_toggles_and_redraws_mount() {
    let (mut page, mut view) = tree_page();
    render_into(&mut view, &mut page, 0).unwrap();
    let b = view.find_by_label("B").unwrap();

    let action = dispatch(
        &mut view,
        &mut page,
        PointerEvent::Activate {
            element: format!("node-{}", b.0),
        },
        1000,
    )
    .unwrap();

    assert_eq!(action, Action::Toggle(b));
    assert_eq!(view.hierarchy().state(b).unwrap(), NodeState::Collapsed);
    let markup = page.mount("#tree").unwrap().markup();
    assert!(markup.contains("node--collapsed"));
}

#[test]
fn given_activated_leaf_when_dispatched_then_tree_unchanged() {
    let (mut page, mut view) = tree_page();
    render_into(&mut view, &mut page, 0).unwrap();
    let c = view.find_by_label("C").unwrap();

    dispatch(
        &mut view,
        &mut page,
        PointerEvent::Activate {
            element: format!("node-{}", c.0),
        },
        1000,
    )
    .unwrap();

    assert_eq!(view.rendered().len(), 4);
    assert_eq!(view.last_pass().unwrap().number, 1);
}

#[test]
fn given_event_for_unknown_element_when_dispatched_then_ignored() {
    let (mut page, mut view) = tree_page();
    render_into(&mut view, &mut page, 0).unwrap();

    let action = dispatch(
        &mut view,
        &mut page,
        PointerEvent::Activate {
            element: "node-999".into(),
        },
        1000,
    )
    .unwrap();

    assert_eq!(action, Action::None);
}

#[test]
fn given_two_views_when_hover_moves_between_them_then_one_tooltip_owner() {
    testing::init_test_setup();
    let mut page = Page::new("test");
    page.add_mount("project-network").add_mount("vis-timeline");
    let mut network = NetworkDiagram::new("project-network").unwrap();
    let mut timeline = StackedTimeline::new("vis-timeline");

    dispatch(
        &mut network,
        &mut page,
        PointerEvent::HoverEnter {
            element: "project-0".into(),
            at: Point::new(100.0, 100.0),
        },
        0,
    )
    .unwrap();
    assert_eq!(page.tooltip().owner(), Some("project-0"));
    assert_eq!(page.tooltip().anchor(), Point::new(110.0, 90.0));

    dispatch(
        &mut timeline,
        &mut page,
        PointerEvent::HoverEnter {
            element: "milestone-0".into(),
            at: Point::new(300.0, 200.0),
        },
        0,
    )
    .unwrap();
    // the late leave from the first owner must not hide the new tooltip
    dispatch(
        &mut network,
        &mut page,
        PointerEvent::HoverLeave {
            element: "project-0".into(),
        },
        0,
    )
    .unwrap();

    assert_eq!(page.tooltip().owner(), Some("milestone-0"));
    assert!(page.to_html().contains("opacity:0.9"));
}

#[test]
fn given_skill_row_when_hovered_then_mount_shows_highlight() {
    testing::init_test_setup();
    let mut page = Page::new("test");
    page.add_mount("skills-matrix");
    let mut matrix = SkillsMatrix::new("skills-matrix");
    let id = matrix.rows()[0].element_id();

    dispatch(
        &mut matrix,
        &mut page,
        PointerEvent::HoverEnter {
            element: id.clone(),
            at: Point::ORIGIN,
        },
        0,
    )
    .unwrap();

    assert!(matrix.rows()[0].is_highlighted());
    assert!(page.mount("#skills-matrix").unwrap().markup().contains("#992feae5"));
}

#[test]
fn given_scrolly_timeline_when_entry_intersects_then_panel_shows_event() {
    let mut timeline = ScrollyTimeline::new("timeline-container");
    let target = timeline.events()[2].clone();

    let moved = timeline.observe(&[
        ObserverEntry::new(ScrollyTimeline::event_id(0), false),
        ObserverEntry::new(ScrollyTimeline::event_id(2), true),
    ]);

    assert!(moved);
    assert_eq!(timeline.active(), Some(&target));
    let svg = timeline.draw(0).unwrap();
    let panel = svg.find_by_class("info-panel")[0].text_content();
    assert!(panel.contains(target.title));
    assert!(panel.contains(&target.year.to_string()));
}

#[test]
fn given_scrolly_timeline_when_entries_not_intersecting_then_nothing_changes() {
    let mut timeline = ScrollyTimeline::new("timeline-container");
    timeline.observe(&[ObserverEntry::new(ScrollyTimeline::event_id(1), true)]);
    let active = timeline.active().cloned();

    let moved = timeline.observe(&[
        ObserverEntry::new(ScrollyTimeline::event_id(3), false),
        ObserverEntry::new("honor-999", true),
    ]);

    assert!(!moved);
    assert_eq!(timeline.active().cloned(), active);
}

#[test]
fn given_dragged_project_when_released_then_pin_removed_and_sim_cools() {
    testing::init_test_setup();
    let mut network = NetworkDiagram::new("project-network").unwrap();
    network.settle();
    let id = PROJECTS[2].id;

    network.drag_start(id).unwrap();
    assert_eq!(network.simulation().alpha_target(), 0.3);
    network.drag(id, Point::new(420.0, 240.0)).unwrap();
    network.advance(20);
    assert_eq!(network.simulation().position(id), Some(Point::new(420.0, 240.0)));

    network.drag_end(id).unwrap();
    assert_eq!(network.simulation().alpha_target(), 0.0);
    assert!(network.simulation().node(id).unwrap().fixed.is_none());
    assert!(network.drag_start("no-such-project").is_err());
}

#[test]
fn given_health_chart_when_change_mode_selected_then_chart_rescales_and_tooltip_follows() {
    testing::init_test_setup();
    let mut page = Page::new("test");
    page.add_mount("keto-chart");
    let mut chart = GroupedBarChart::new("keto-chart").unwrap();
    render_into(&mut chart, &mut page, 0).unwrap();

    let action = dispatch(
        &mut chart,
        &mut page,
        PointerEvent::Activate {
            element: "mode-change".into(),
        },
        1000,
    )
    .unwrap();

    assert_eq!(action, Action::SetMode(ChartMode::Change));
    assert_eq!(chart.mode(), ChartMode::Change);
    let markup = page.mount("#keto-chart").unwrap().markup();
    assert!(markup.contains("Positive Change in SF-36 Score"));
    assert!(markup.contains("mode-option--selected"));

    dispatch(
        &mut chart,
        &mut page,
        PointerEvent::HoverEnter {
            element: "bar-mental-24".into(),
            at: Point::new(50.0, 50.0),
        },
        3000,
    )
    .unwrap();
    assert_eq!(page.tooltip().owner(), Some("bar-mental-24"));
    assert!(page.tooltip().content().contains("Change from M0: 4.4"));
}
