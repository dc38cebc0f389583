//! Portfolio page driver
//!
//! Builds the page, binds one renderer per enabled view to its mount and
//! writes the result to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::page::Page;
use crate::application::svg::Element;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::datasets;
use crate::domain::{Hierarchy, Millis};
use crate::infrastructure::traits::{BoundarySource, FileSystem};

use super::{
    render_into, BarChart, GroupedBarChart, HierarchyView, HierarchyViewConfig, InteractiveMap,
    NetworkDiagram, Renderer, Scatterplot, ScrollyTimeline, SkillsMatrix, StackedTimeline,
    VisitorMap,
};

pub const PAGE_TITLE: &str = "Portfolio";

const MAP_MOUNT: &str = "map";
const VISITOR_MOUNT: &str = "visitor-map";

/// Mount id of each view, in page order.
const VIEW_MOUNTS: [(&str, &str); 10] = [
    ("tree", "tree"),
    ("bar", "vis-bar"),
    ("scatter", "vis-scatterplot"),
    ("sf36", "keto-chart"),
    ("skills", "skills-matrix"),
    ("network", "project-network"),
    ("scrolly", "timeline-container"),
    ("timeline", "vis-timeline"),
    ("map", MAP_MOUNT),
    ("visitor", VISITOR_MOUNT),
];

/// Mount id for a view name.
pub fn mount_for(view: &str) -> ApplicationResult<&'static str> {
    VIEW_MOUNTS
        .iter()
        .find(|(name, _)| *name == view)
        .map(|(_, mount)| *mount)
        .ok_or_else(|| ApplicationError::Config {
            message: format!("unknown view '{view}'"),
        })
}

/// What a page render produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Files written, page first
    pub written: Vec<PathBuf>,
    /// Views whose mount was missing
    pub skipped: Vec<String>,
}

/// Service that renders the whole portfolio page.
pub struct PortfolioService {
    settings: Arc<Settings>,
    fs: Arc<dyn FileSystem>,
    boundary: Arc<dyn BoundarySource>,
}

impl PortfolioService {
    pub fn new(
        settings: Arc<Settings>,
        fs: Arc<dyn FileSystem>,
        boundary: Arc<dyn BoundarySource>,
    ) -> Self {
        Self {
            settings,
            fs,
            boundary,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Page with one mount per view, in page order.
    pub fn build_page(&self, views: &[String]) -> ApplicationResult<Page> {
        let mut page = Page::new(PAGE_TITLE);
        for (name, mount) in VIEW_MOUNTS {
            if views.iter().any(|v| v == name) {
                page.add_mount(mount);
            }
        }
        // reject unknown names even though they add no mount
        for view in views {
            mount_for(view)?;
        }
        Ok(page)
    }

    /// The portfolio hierarchy view, configured from settings.
    pub fn tree_view(&self) -> ApplicationResult<HierarchyView> {
        let hierarchy = Hierarchy::from_spec(&datasets::portfolio_tree());
        Ok(HierarchyView::new(
            hierarchy,
            HierarchyViewConfig::from(&self.settings.tree),
        ))
    }

    /// Interactive map with boundaries already fetched.
    pub fn interactive_map(&self) -> InteractiveMap {
        let mut map = InteractiveMap::new(MAP_MOUNT, &self.settings.map);
        map.load_boundaries(self.boundary.as_ref());
        map
    }

    pub fn visitor_map(&self) -> VisitorMap {
        let mut map = VisitorMap::new(
            VISITOR_MOUNT,
            &self.settings.map,
            &self.settings.visitor,
        );
        map.load_boundaries(self.boundary.as_ref(), &self.settings.map.boundary_url);
        map
    }

    /// Renderer for a view name.
    pub fn renderer(&self, view: &str) -> ApplicationResult<Box<dyn Renderer>> {
        let mount = mount_for(view)?;
        let renderer: Box<dyn Renderer> = match view {
            "tree" => Box::new(self.tree_view()?),
            "bar" => Box::new(BarChart::new(mount)),
            "scatter" => Box::new(Scatterplot::new(mount)),
            "sf36" => Box::new(GroupedBarChart::new(mount)?),
            "skills" => Box::new(SkillsMatrix::new(mount)),
            "network" => {
                let mut network = NetworkDiagram::new(mount)?;
                let ticks = network.settle();
                debug!(ticks, "network settled");
                Box::new(network)
            }
            "scrolly" => Box::new(ScrollyTimeline::new(mount)),
            "timeline" => Box::new(StackedTimeline::new(mount)),
            "map" => Box::new(self.interactive_map()),
            "visitor" => Box::new(self.visitor_map()),
            other => {
                return Err(ApplicationError::Config {
                    message: format!("unknown view '{other}'"),
                })
            }
        };
        Ok(renderer)
    }

    /// Render each renderer into its mount on `page`.
    ///
    /// A renderer whose mount is missing is logged and skipped; the other
    /// views still render. Returns the mount ids that were skipped.
    pub fn render_page(
        &self,
        page: &mut Page,
        renderers: &mut [Box<dyn Renderer>],
        now: Millis,
    ) -> ApplicationResult<Vec<String>> {
        let mut skipped = Vec::new();
        for renderer in renderers.iter_mut() {
            match render_into(renderer.as_mut(), page, now) {
                Ok(()) => {}
                Err(ApplicationError::MissingMount { selector }) => {
                    warn!(%selector, "mount missing, view skipped");
                    skipped.push(renderer.mount_id().to_string());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(skipped)
    }

    /// Render `views` and write `index.html` plus one SVG per view to `out_dir`.
    #[instrument(level = "debug", skip(self))]
    pub fn render(&self, out_dir: &Path, views: &[String]) -> ApplicationResult<RenderReport> {
        let mut page = self.build_page(views)?;
        let mut renderers = views
            .iter()
            .map(|v| self.renderer(v))
            .collect::<ApplicationResult<Vec<_>>>()?;
        let skipped = self.render_page(&mut page, &mut renderers, 0)?;

        self.fs
            .create_dir_all(out_dir)
            .with_path_context("create output directory", out_dir)?;

        let mut report = RenderReport {
            skipped,
            ..Default::default()
        };
        let index = out_dir.join("index.html");
        self.fs
            .write(&index, &page.to_html())
            .with_path_context("write page", &index)?;
        report.written.push(index);

        for mount in page.mounts() {
            let Some(content) = mount.content() else {
                continue;
            };
            let path = out_dir.join(format!("{}.svg", mount.id()));
            self.write_svg(&path, content)?;
            report.written.push(path);
        }

        info!(
            files = report.written.len(),
            skipped = report.skipped.len(),
            "page rendered to {}",
            out_dir.display()
        );
        Ok(report)
    }

    /// Write one standalone SVG document.
    pub fn write_svg(&self, path: &Path, element: &Element) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        let document = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{element}\n");
        self.fs
            .write(path, &document)
            .with_path_context("write svg", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::{OfflineBoundarySource, RealFileSystem};
    use tempfile::TempDir;

    fn service() -> PortfolioService {
        PortfolioService::new(
            Arc::new(Settings::default()),
            Arc::new(RealFileSystem),
            Arc::new(OfflineBoundarySource),
        )
    }

    #[test]
    fn test_page_mounts_follow_page_order() {
        let page = service()
            .build_page(&["map".to_string(), "tree".to_string()])
            .unwrap();
        let ids: Vec<&str> = page.mounts().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["tree", "map"]);
    }

    #[test]
    fn test_unknown_view_is_a_config_error() {
        let result = service().build_page(&["pie".to_string()]);
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn test_missing_mount_skips_only_that_view() {
        let svc = service();
        let mut page = Page::new("p");
        page.add_mount("vis-bar");
        let mut renderers = vec![svc.renderer("bar").unwrap(), svc.renderer("skills").unwrap()];

        let skipped = svc.render_page(&mut page, &mut renderers, 0).unwrap();

        assert_eq!(skipped, vec!["skills-matrix".to_string()]);
        assert!(!page.mount("#vis-bar").unwrap().is_empty());
    }

    #[test]
    fn test_render_writes_page_and_one_svg_per_view() {
        let dir = TempDir::new().unwrap();
        let views = vec!["tree".to_string(), "bar".to_string()];
        let report = service().render(dir.path(), &views).unwrap();

        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("index.html").is_file());
        assert!(dir.path().join("tree.svg").is_file());
        assert!(dir.path().join("vis-bar.svg").is_file());
    }
}
