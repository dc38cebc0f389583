//! Skills matrix: one column per category, five proficiency boxes per skill.

use tracing::{debug, trace};

use crate::application::svg::{svg_root, translate, Element};
use crate::application::ApplicationResult;
use crate::domain::datasets::{Skill, SkillCategory, SKILL_CATEGORIES};
use crate::domain::{Interactive, Millis, Point, Tooltip};

use super::Renderer;

const TOTAL_WIDTH: f64 = 800.0;
const MARGIN_TOP: f64 = 35.0;
const MARGIN_BOTTOM: f64 = 20.0;
const ROW_HEIGHT: f64 = 28.0;
const HEADER_HEIGHT: f64 = 35.0;
const BOX_SIZE: f64 = 11.0;
const BOX_GAP: f64 = 3.0;
const LABEL_WIDTH: f64 = 95.0;
const LEVELS: u8 = 5;

const FILLED: &str = "#374151";
const EMPTY: &str = "#f3f4f6";
const LABEL: &str = "#6b7280";
const HEADER: &str = "#111827";
const HIGHLIGHT: &str = "#992feae5";

/// Width of one column: label plus the boxes.
fn column_width() -> f64 {
    LABEL_WIDTH + f64::from(LEVELS) * (BOX_SIZE + BOX_GAP)
}

/// One skill line; hovering highlights its label and filled boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillRow {
    column: usize,
    row: usize,
    skill: Skill,
    highlighted: bool,
}

impl SkillRow {
    pub fn skill(&self) -> &Skill {
        &self.skill
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    fn draw(&self, x: f64) -> Element {
        let y = MARGIN_TOP + self.row as f64 * ROW_HEIGHT;
        let (label_fill, weight, box_fill) = if self.highlighted {
            (HIGHLIGHT, "600", HIGHLIGHT)
        } else {
            (LABEL, "400", FILLED)
        };

        let mut group = Element::new("g")
            .attr("class", "skill-row")
            .attr("id", self.element_id())
            .attr("transform", translate(Point::new(x, y)))
            .attr("cursor", "pointer")
            .child(
                Element::new("text")
                    .num("x", 0.0)
                    .num("y", BOX_SIZE - 2.0)
                    .attr("font-size", "11px")
                    .attr("fill", label_fill)
                    .attr("font-weight", weight)
                    .text(self.skill.name),
            );
        for i in 0..LEVELS {
            let filled = i < self.skill.level;
            group.push(
                Element::new("rect")
                    .attr("class", if filled { "filled-box" } else { "empty-box" })
                    .num("x", LABEL_WIDTH + f64::from(i) * (BOX_SIZE + BOX_GAP))
                    .num("y", 0.0)
                    .num("width", BOX_SIZE)
                    .num("height", BOX_SIZE)
                    .num("rx", 2.0)
                    .num("ry", 2.0)
                    .attr("fill", if filled { box_fill } else { EMPTY }),
            );
        }
        // transparent overlay catches the pointer for the whole row
        group.child(
            Element::new("rect")
                .attr("class", "overlay")
                .num("x", -5.0)
                .num("y", -5.0)
                .num("width", column_width())
                .num("height", ROW_HEIGHT)
                .attr("fill", "transparent"),
        )
    }
}

impl Interactive for SkillRow {
    fn element_id(&self) -> String {
        format!("skill-{}-{}", self.column, self.row)
    }

    fn on_hover_enter(&mut self, _tooltip: &mut Tooltip, _at: Point) {
        trace!(skill = self.skill.name, "highlight");
        self.highlighted = true;
    }

    fn on_hover_leave(&mut self, _tooltip: &mut Tooltip) {
        self.highlighted = false;
    }
}

#[derive(Debug, Clone)]
pub struct SkillsMatrix {
    mount_id: String,
    categories: Vec<SkillCategory>,
    rows: Vec<SkillRow>,
}

impl SkillsMatrix {
    pub fn new(mount_id: impl Into<String>) -> Self {
        Self::with_categories(mount_id, SKILL_CATEGORIES.to_vec())
    }

    pub fn with_categories(mount_id: impl Into<String>, categories: Vec<SkillCategory>) -> Self {
        let rows = categories
            .iter()
            .enumerate()
            .flat_map(|(column, cat)| {
                cat.skills.iter().enumerate().map(move |(row, skill)| SkillRow {
                    column,
                    row,
                    skill: *skill,
                    highlighted: false,
                })
            })
            .collect();
        Self {
            mount_id: mount_id.into(),
            categories,
            rows,
        }
    }

    pub fn rows(&self) -> &[SkillRow] {
        &self.rows
    }

    /// Column starts, spread so the last column ends flush with the width.
    pub fn column_offsets(&self) -> Vec<f64> {
        let n = self.categories.len();
        if n <= 1 {
            return vec![0.0; n];
        }
        let step = (TOTAL_WIDTH - column_width()) / (n - 1) as f64;
        (0..n).map(|i| i as f64 * step).collect()
    }

    pub fn height(&self) -> f64 {
        let max_items = self
            .categories
            .iter()
            .map(|c| c.skills.len())
            .max()
            .unwrap_or(0);
        max_items as f64 * ROW_HEIGHT + HEADER_HEIGHT + MARGIN_TOP + MARGIN_BOTTOM
    }
}

impl Renderer for SkillsMatrix {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let offsets = self.column_offsets();
        let height = self.height();
        let mut svg = svg_root(TOTAL_WIDTH, height)
            .attr("class", "skills-matrix")
            .attr("width", "100%")
            .attr("font-family", "'Inter', sans-serif");

        for (cat, &x) in self.categories.iter().zip(&offsets) {
            svg.push(
                Element::new("text")
                    .attr("class", "category")
                    .num("x", x)
                    .num("y", MARGIN_TOP - 15.0)
                    .attr("font-size", "10px")
                    .attr("font-weight", "700")
                    .attr("fill", HEADER)
                    .attr("letter-spacing", "0.05em")
                    .text(cat.name.to_uppercase()),
            );
        }
        for row in &self.rows {
            let x = offsets.get(row.column).copied().unwrap_or(0.0);
            svg.push(row.draw(x));
        }

        debug!(rows = self.rows.len(), "skills matrix drawn");
        Ok(svg)
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        self.rows
            .iter_mut()
            .find(|r| r.element_id() == element_id)
            .map(|r| r as &mut dyn Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_justified_across_width() {
        let matrix = SkillsMatrix::new("skills-matrix");
        let offsets = matrix.column_offsets();
        assert_eq!(offsets.len(), 4);
        assert_eq!(offsets[0], 0.0);
        assert!((offsets[3] + column_width() - TOTAL_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_hover_highlights_only_filled_boxes_and_reverts() {
        let mut matrix = SkillsMatrix::new("skills-matrix");
        let mut tooltip = Tooltip::new();
        let id = matrix.rows()[0].element_id();
        let level = matrix.rows()[0].skill().level as usize;

        matrix
            .element_mut(&id)
            .unwrap()
            .on_hover_enter(&mut tooltip, Point::ORIGIN);
        let svg = matrix.draw(0).unwrap();
        let row = svg
            .find_by_class("skill-row")
            .into_iter()
            .find(|r| r.get_attr("id") == Some(id.as_str()))
            .unwrap();
        let highlighted = row
            .find_all("rect")
            .iter()
            .filter(|r| r.get_attr("fill") == Some(HIGHLIGHT))
            .count();
        assert_eq!(highlighted, level);
        assert!(!tooltip.is_visible());

        matrix.element_mut(&id).unwrap().on_hover_leave(&mut tooltip);
        assert!(!matrix.rows()[0].is_highlighted());
    }
}
