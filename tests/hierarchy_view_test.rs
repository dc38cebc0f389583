//! Integration tests for the expandable tree view: toggling, render passes
//! and the enter/update/exit transition contract.

use std::collections::BTreeSet;

use portviz::application::services::HierarchyView;
use portviz::application::services::HierarchyViewConfig;
use portviz::domain::{DomainError, Hierarchy, NodeKey, NodeState, Phase};
use portviz::util::testing;

const ABCD: &str = r#"{
    "name": "A",
    "children": [
        { "name": "B", "children": [ { "name": "D" } ] },
        { "name": "C" }
    ]
}"#;

fn abcd_view() -> HierarchyView {
    testing::init_test_setup();
    let hierarchy = Hierarchy::from_json_str(ABCD).expect("valid hierarchy");
    HierarchyView::new(hierarchy, HierarchyViewConfig::default())
}

fn key(view: &HierarchyView, label: &str) -> NodeKey {
    view.find_by_label(label).expect("label exists")
}

fn visible_keys(view: &HierarchyView) -> BTreeSet<NodeKey> {
    view.hierarchy().visible().map(|n| n.key()).collect()
}

// ============================================================
// Toggle scenarios
// ============================================================

#[test]
fn given_abcd_tree_when_collapse_and_expand_b_then_renders_four_three_four() {
    let mut view = abcd_view();
    let b = key(&view, "B");
    let d = key(&view, "D");

    let first = view.render(0).unwrap();
    assert_eq!(first.rendered.len(), 4);

    let collapsed = view.toggle(b, 1000).unwrap().expect("B is internal");
    assert_eq!(collapsed.rendered.len(), 3);
    assert!(!collapsed.rendered.contains(&d));
    assert_eq!(view.hierarchy().state(b).unwrap(), NodeState::Collapsed);

    let expanded = view.toggle(b, 2000).unwrap().expect("B is internal");
    assert_eq!(expanded.rendered.len(), 4);
    assert!(expanded.rendered.contains(&d));
}

#[test]
fn given_collapsed_b_when_rendered_then_d_exits_into_b_new_position() {
    let mut view = abcd_view();
    let b = key(&view, "B");
    let d = key(&view, "D");
    view.render(0).unwrap();

    let pass = view.toggle(b, 1000).unwrap().unwrap();

    assert_eq!(pass.keys_in_phase(Phase::Exit), vec![d]);
    let exit = pass.transition(d).unwrap();
    assert_eq!(Some(exit.to), pass.layout.position(b));
    assert!(pass.markup().contains("node--exiting"));
}

#[test]
fn given_collapsed_b_when_expanded_then_d_enters_from_b_previous_position() {
    let mut view = abcd_view();
    let b = key(&view, "B");
    let d = key(&view, "D");
    view.render(0).unwrap();
    view.toggle(b, 1000).unwrap();
    let b_before = view.position(b).unwrap();

    let pass = view.toggle(b, 2000).unwrap().unwrap();

    let enter = pass.transition(d).unwrap();
    assert_eq!(enter.phase, Phase::Enter);
    assert_eq!(enter.from, b_before);
    assert_eq!(Some(enter.to), pass.layout.position(d));
}

#[test]
fn given_leaf_when_toggled_then_nothing_changes_and_no_pass_is_made() {
    let mut view = abcd_view();
    let c = key(&view, "C");
    let first = view.render(0).unwrap();

    let result = view.toggle(c, 1000).unwrap();

    assert!(result.is_none());
    assert_eq!(view.hierarchy().state(c).unwrap(), NodeState::Leaf);
    assert_eq!(view.last_pass().unwrap().number, first.number);
}

#[test]
fn given_rendered_tree_when_toggled_twice_then_state_and_positions_restored() {
    let mut view = abcd_view();
    let b = key(&view, "B");
    let first = view.render(0).unwrap();
    let before: Vec<_> = first
        .rendered
        .iter()
        .map(|&k| (k, view.position(k)))
        .collect();

    view.toggle(b, 1000).unwrap();
    let last = view.toggle(b, 2000).unwrap().unwrap();

    assert_eq!(last.rendered, first.rendered);
    let after: Vec<_> = last
        .rendered
        .iter()
        .map(|&k| (k, view.position(k)))
        .collect();
    assert_eq!(after, before);
}

#[test]
fn given_tree_when_rendered_twice_then_only_stationary_updates() {
    let mut view = abcd_view();
    view.render(0).unwrap();

    let second = view.render(1000).unwrap();

    assert!(second
        .transitions
        .iter()
        .all(|t| t.phase == Phase::Update && t.is_stationary()));
}

#[test]
fn given_toggle_mid_animation_when_settled_then_display_matches_logical_state() {
    let mut view = abcd_view();
    let b = key(&view, "B");
    let d = key(&view, "D");
    view.render(0).unwrap();

    // second toggle lands while D is still shrinking away
    view.toggle(b, 1000).unwrap();
    let pass = view.toggle(b, 1100).unwrap().unwrap();
    assert_eq!(pass.transition(d).unwrap().phase, Phase::Update);

    let settled = 5000;
    assert!(!view.is_animating(settled));
    let displayed: BTreeSet<NodeKey> = view.displayed_nodes(settled).into_iter().collect();
    assert_eq!(&displayed, view.rendered());
    for k in displayed {
        assert_eq!(view.displayed_position(k, settled), view.position(k));
    }
}

#[test]
fn given_any_toggle_sequence_then_rendered_set_equals_visible_nodes() {
    testing::init_test_setup();
    let hierarchy = Hierarchy::from_spec(&portviz::domain::datasets::portfolio_tree());
    let mut view = HierarchyView::new(hierarchy, HierarchyViewConfig::default());
    view.render(0).unwrap();

    let sequence = ["VR Motion Trace/Tools", "VR Motion Trace", "Tools", "VR Motion Trace"];
    for (i, label) in sequence.iter().enumerate() {
        let k = key(&view, label);
        view.toggle(k, (i as u64 + 1) * 100).unwrap();
        assert_eq!(view.rendered(), &visible_keys(&view), "after toggling {label}");
    }
}

#[test]
fn given_collapsed_subtree_when_collapse_all_then_descendants_keep_state_on_expand() {
    let mut view = abcd_view();
    let a = key(&view, "A");
    let b = key(&view, "B");
    view.render(0).unwrap();

    view.collapse_all(a, 1000).unwrap();
    assert_eq!(view.rendered().len(), 1);

    view.toggle(a, 2000).unwrap();
    // B was collapsed by collapse_all and stays collapsed
    assert_eq!(view.hierarchy().state(b).unwrap(), NodeState::Collapsed);
    assert_eq!(view.rendered().len(), 3);

    view.expand_all(a, 3000).unwrap();
    assert_eq!(view.rendered().len(), 4);
}

#[test]
fn given_portfolio_tree_when_collapsed_from_depth_one_then_only_root_and_children_drawn() {
    testing::init_test_setup();
    let hierarchy = Hierarchy::from_spec(&portviz::domain::datasets::portfolio_tree());
    let mut view = HierarchyView::new(hierarchy, HierarchyViewConfig::default());
    view.render(0).unwrap();
    let root = view.hierarchy().root();
    let children = view.hierarchy().children(root).unwrap().len();

    let pass = view.collapse_from_depth(1, 1000).unwrap();

    assert_eq!(pass.rendered.len(), 1 + children);
    assert_eq!(view.rendered(), &visible_keys(&view));
    assert!(!pass.keys_in_phase(Phase::Exit).is_empty());
}

// ============================================================
// Construction failures
// ============================================================

#[test]
fn given_children_not_a_sequence_when_parsed_then_error_names_json_path() {
    let json = r#"{"name": "A", "children": [{"name": "B", "children": "oops"}]}"#;

    let err = Hierarchy::from_json_str(json).unwrap_err();

    match err {
        DomainError::MalformedHierarchy { path, .. } => {
            assert_eq!(path, "$.children[0].children")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_node_without_name_when_parsed_then_rejected() {
    let json = r#"{"name": "A", "children": [{"label": "B"}]}"#;

    let err = Hierarchy::from_json_str(json).unwrap_err();

    assert!(matches!(
        err,
        DomainError::MalformedHierarchy { ref path, .. } if path == "$.children[0]"
    ));
}
