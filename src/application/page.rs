//! Page and mount points.
//!
//! A page is an ordered set of containers addressed by `#id` selectors plus
//! the one tooltip all views share.

use std::fmt::Write;

use regex::Regex;
use tracing::trace;

use crate::application::svg::{escape, fmt_num, Element};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Tooltip;

/// A named container a renderer draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct Mount {
    id: String,
    content: Option<Element>,
}

impl Mount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remove whatever a previous render left behind.
    pub fn clear(&mut self) {
        self.content = None;
    }

    pub fn set(&mut self, content: Element) {
        self.content = Some(content);
    }

    pub fn content(&self) -> Option<&Element> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Rendered markup, empty when nothing has been drawn.
    pub fn markup(&self) -> String {
        self.content.as_ref().map(Element::render).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    title: String,
    mounts: Vec<Mount>,
    tooltip: Tooltip,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Add a container. Adding an existing id is a no-op.
    pub fn add_mount(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if !self.mounts.iter().any(|m| m.id == id) {
            trace!(%id, "mount added");
            self.mounts.push(Mount::new(id));
        }
        self
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// Look a container up by `#id` selector.
    pub fn mount(&self, selector: &str) -> ApplicationResult<&Mount> {
        let id = parse_selector(selector)?;
        self.mounts
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ApplicationError::MissingMount {
                selector: selector.to_string(),
            })
    }

    pub fn mount_mut(&mut self, selector: &str) -> ApplicationResult<&mut Mount> {
        let id = parse_selector(selector)?;
        self.mounts
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ApplicationError::MissingMount {
                selector: selector.to_string(),
            })
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn tooltip_mut(&mut self) -> &mut Tooltip {
        &mut self.tooltip
    }

    /// Standalone HTML document with every mount inlined.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, "<!DOCTYPE html>");
        let _ = writeln!(html, "<html lang=\"en\">");
        let _ = writeln!(html, "<head>");
        let _ = writeln!(html, "<meta charset=\"utf-8\">");
        let _ = writeln!(html, "<title>{}</title>", escape(&self.title));
        let _ = writeln!(html, "<style>{PAGE_STYLE}</style>");
        let _ = writeln!(html, "</head>");
        let _ = writeln!(html, "<body>");
        let _ = writeln!(html, "<h1>{}</h1>", escape(&self.title));
        for mount in &self.mounts {
            let _ = writeln!(
                html,
                "<section id=\"{}\" class=\"mount\">{}</section>",
                escape(&mount.id),
                mount.markup()
            );
        }
        let _ = writeln!(html, "{}", self.tooltip_markup());
        let _ = writeln!(html, "</body>");
        let _ = write!(html, "</html>");
        html
    }

    fn tooltip_markup(&self) -> String {
        let anchor = self.tooltip.anchor();
        let visibility = if self.tooltip.is_visible() { 0.9 } else { 0.0 };
        format!(
            "<div class=\"tooltip\" style=\"left:{}px;top:{}px;opacity:{}\">{}</div>",
            fmt_num(anchor.x),
            fmt_num(anchor.y),
            fmt_num(visibility),
            escape(self.tooltip.content())
        )
    }
}

const PAGE_STYLE: &str = "body{font-family:sans-serif;margin:2rem;background:#fafafa}\
.mount{margin:2rem 0}\
.tooltip{position:absolute;pointer-events:none;background:#fff;border:1px solid #ccc;\
border-radius:4px;padding:6px 10px;font-size:12px}";

fn parse_selector(selector: &str) -> ApplicationResult<&str> {
    let re = Regex::new(r"^#([A-Za-z][\w-]*)$").map_err(|e| ApplicationError::OperationFailed {
        context: "compile selector pattern".into(),
        source: Box::new(e),
    })?;
    re.captures(selector)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ApplicationError::InvalidSelector {
            selector: selector.to_string(),
        })
}
