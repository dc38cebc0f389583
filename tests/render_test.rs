//! Integration tests for rendering the whole portfolio page to disk.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use portviz::application::page::Page;
use portviz::application::services::{render_into, BarChart, PortfolioService};
use portviz::application::ApplicationError;
use portviz::config::{Settings, ALL_VIEWS};
use portviz::infrastructure::di::ServiceContainer;
use portviz::infrastructure::traits::{OfflineBoundarySource, RealFileSystem};
use portviz::util::testing;

fn offline_service() -> PortfolioService {
    testing::init_test_setup();
    ServiceContainer::with_deps(
        Settings::default(),
        Arc::new(RealFileSystem),
        Arc::new(OfflineBoundarySource),
    )
    .portfolio()
}

fn all_views() -> Vec<String> {
    ALL_VIEWS.iter().map(|v| v.to_string()).collect()
}

#[test]
fn given_all_views_offline_when_rendered_then_page_and_svgs_written() {
    let dir = TempDir::new().unwrap();

    let report = offline_service()
        .render(dir.path(), &all_views())
        .expect("render page");

    assert!(report.skipped.is_empty());
    assert_eq!(report.written.len(), ALL_VIEWS.len() + 1);
    let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
    for mount in ["tree", "vis-bar", "skills-matrix", "project-network", "visitor-map"] {
        assert!(html.contains(&format!("id=\"{mount}\"")), "missing #{mount}");
    }
    // the offline map still renders, with a notice instead of land
    let map = fs::read_to_string(dir.path().join("map.svg")).unwrap();
    assert!(map.contains("could not load map data"));
    assert!(map.starts_with("<?xml"));
}

#[test]
fn given_nested_output_dir_when_rendered_then_directories_created() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("site/portfolio");

    offline_service()
        .render(&out, &["tree".to_string()])
        .expect("render page");

    assert!(out.join("index.html").is_file());
    assert!(out.join("tree.svg").is_file());
}

#[test]
fn given_page_without_mount_when_rendering_into_it_then_missing_mount_error() {
    let mut page = Page::new("empty");
    let mut chart = BarChart::new("vis-bar");

    let err = render_into(&mut chart, &mut page, 0).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::MissingMount { ref selector } if selector == "#vis-bar"
    ));
    assert!(page.mounts().is_empty());
}

#[test]
fn given_mount_with_old_content_when_rerendered_then_replaced_not_appended() {
    let mut page = Page::new("p");
    page.add_mount("vis-bar");
    let mut chart = BarChart::new("vis-bar");

    render_into(&mut chart, &mut page, 0).unwrap();
    render_into(&mut chart, &mut page, 0).unwrap();

    let markup = page.mount("#vis-bar").unwrap().markup();
    assert_eq!(markup.matches("<svg").count(), 1);
}
