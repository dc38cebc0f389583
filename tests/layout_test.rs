//! Integration tests for the tidy tree layout over the portfolio hierarchy.

use rstest::rstest;

use portviz::domain::datasets::portfolio_tree;
use portviz::domain::{Hierarchy, LayoutConfig, TreeLayoutEngine};

fn hierarchy() -> Hierarchy {
    Hierarchy::from_spec(&portfolio_tree())
}

#[rstest]
#[case(40.0, 220.0)]
#[case(25.0, 180.0)]
fn given_spacing_when_laid_out_then_depth_maps_to_level_spacing(
    #[case] node_spacing: f64,
    #[case] level_spacing: f64,
) {
    let h = hierarchy();
    let layout = TreeLayoutEngine::new(LayoutConfig {
        node_spacing,
        level_spacing,
    })
    .compute(&h);

    for node in h.visible() {
        let p = layout.position(node.key()).unwrap();
        assert_eq!(p.x, node.depth() as f64 * level_spacing, "{}", node.label());
    }
}

#[test]
fn given_expanded_tree_when_laid_out_then_siblings_keep_node_spacing() {
    let h = hierarchy();
    let config = LayoutConfig::default();
    let layout = TreeLayoutEngine::new(config).compute(&h);

    for node in h.visible() {
        let children = h.children(node.key()).unwrap();
        for pair in children.windows(2) {
            let upper = layout.position(pair[0]).unwrap();
            let lower = layout.position(pair[1]).unwrap();
            assert!(
                lower.y - upper.y >= config.node_spacing - 1e-9,
                "children of {} overlap",
                node.label()
            );
        }
    }
}

#[test]
fn given_expanded_tree_when_laid_out_then_parents_center_over_children() {
    let h = hierarchy();
    let layout = TreeLayoutEngine::new(LayoutConfig::default()).compute(&h);

    for node in h.visible() {
        let children = h.children(node.key()).unwrap();
        let (Some(first), Some(last)) = (children.first(), children.last()) else {
            continue;
        };
        let mid = (layout.position(*first).unwrap().y + layout.position(*last).unwrap().y) / 2.0;
        let parent = layout.position(node.key()).unwrap();
        assert!((parent.y - mid).abs() < 1e-9, "{} is off center", node.label());
    }
}

#[test]
fn given_collapsed_project_when_laid_out_then_hidden_nodes_have_no_position() {
    let mut h = hierarchy();
    let project = h.resolve("Feminine Animation").unwrap();
    let tools = h.resolve("Feminine Animation/Tools").unwrap();
    h.toggle(project).unwrap();

    let layout = TreeLayoutEngine::new(LayoutConfig::default()).compute(&h);

    assert!(layout.contains(project));
    assert!(!layout.contains(tools));
    assert_eq!(layout.len(), h.visible().count());
    assert!(layout
        .links()
        .iter()
        .all(|(p, c)| layout.contains(*p) && layout.contains(*c)));
}

#[test]
fn given_same_state_when_laid_out_twice_then_positions_identical() {
    let h = hierarchy();
    let engine = TreeLayoutEngine::new(LayoutConfig::default());

    assert_eq!(engine.compute(&h), engine.compute(&h));
}
