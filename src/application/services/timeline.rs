//! Honors timelines.
//!
//! [`ScrollyTimeline`] plots honors by year and type and follows the reader:
//! visibility entries (as an intersection observer would report them)
//! highlight one event and fill the info panel. [`StackedTimeline`] stacks
//! milestones above and below a center axis.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::application::svg::{axis_bottom, fmt_num, svg_root, translate, Element};
use crate::application::ApplicationResult;
use crate::domain::datasets::{honors, Honor, Milestone, HONOR_KINDS, MILESTONES, MILESTONE_KINDS};
use crate::domain::scale::{BandScale, LinearScale, OrdinalScale};
use crate::domain::{Interactive, Millis, Point, Tooltip};

use super::Renderer;

/// Visibility change of one event point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverEntry {
    /// Element id of the event point, e.g. `honor-3`
    pub element: String,
    pub is_intersecting: bool,
}

impl ObserverEntry {
    pub fn new(element: impl Into<String>, is_intersecting: bool) -> Self {
        Self {
            element: element.into(),
            is_intersecting,
        }
    }
}

pub struct ScrollyTimeline {
    mount_id: String,
    events: Vec<Honor>,
    colors: OrdinalScale<&'static str, &'static str>,
    active: Option<usize>,
}

impl ScrollyTimeline {
    const WIDTH: f64 = 1600.0;
    const CHART_HEIGHT: f64 = 250.0;
    const PANEL_HEIGHT: f64 = 150.0;
    const MARGIN_TOP: f64 = 20.0;
    const MARGIN_RIGHT: f64 = 30.0;
    const MARGIN_BOTTOM: f64 = 30.0;
    const MARGIN_LEFT: f64 = 30.0;
    const PANEL_WIDTH: f64 = 350.0;

    pub fn new(mount_id: impl Into<String>) -> Self {
        Self {
            mount_id: mount_id.into(),
            events: honors(),
            colors: OrdinalScale::new(HONOR_KINDS.to_vec(), vec!["#E41A1C", "#377EB8", "#4DAF4A"]),
            active: None,
        }
    }

    pub fn events(&self) -> &[Honor] {
        &self.events
    }

    pub fn event_id(index: usize) -> String {
        format!("honor-{index}")
    }

    /// The highlighted event, if any entry has intersected yet.
    pub fn active(&self) -> Option<&Honor> {
        self.active.and_then(|i| self.events.get(i))
    }

    pub fn color(&self, kind: &'static str) -> &'static str {
        self.colors.scale(&kind).unwrap_or("#377EB8")
    }

    /// Apply visibility entries in order. Only intersecting entries for known
    /// events change anything; returns whether the highlight moved.
    pub fn observe(&mut self, entries: &[ObserverEntry]) -> bool {
        let before = self.active;
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            match (0..self.events.len()).find(|&i| Self::event_id(i) == entry.element) {
                Some(i) => {
                    trace!(element = %entry.element, "event highlighted");
                    self.active = Some(i);
                }
                None => trace!(element = %entry.element, "entry for unknown event ignored"),
            }
        }
        self.active != before
    }

    fn panel(&self, y: f64) -> Element {
        let (border, lines) = match self.active() {
            Some(h) => (
                self.color(h.kind),
                vec![
                    (
                        format!("{} HONOR ({})", h.kind.to_uppercase(), h.year),
                        self.color(h.kind),
                        "bold",
                    ),
                    (h.title.to_string(), "#111", "bold"),
                    (h.description.to_string(), "#333", "normal"),
                ],
            ),
            None => (
                "#377EB8",
                vec![
                    ("Scroll to Explore Your Honors!".to_string(), "#111", "bold"),
                    (
                        "Find the different types of awards plotted on the vertical axis (Y)."
                            .to_string(),
                        "#333",
                        "normal",
                    ),
                ],
            ),
        };

        let mut panel = Element::new("g")
            .attr("id", "timeline-info-panel")
            .attr("class", "info-panel")
            .attr("transform", translate(Point::new(Self::MARGIN_LEFT, y)))
            .child(
                Element::new("rect")
                    .num("width", Self::PANEL_WIDTH)
                    .num("height", Self::PANEL_HEIGHT - 30.0)
                    .attr("fill", "#f0f0f0"),
            )
            .child(
                Element::new("rect")
                    .attr("class", "panel-border")
                    .num("width", 5.0)
                    .num("height", Self::PANEL_HEIGHT - 30.0)
                    .attr("fill", border),
            );
        for (i, (text, fill, weight)) in lines.into_iter().enumerate() {
            panel.push(
                Element::new("text")
                    .num("x", 15.0)
                    .num("y", 25.0 + i as f64 * 25.0)
                    .attr("fill", fill)
                    .attr("font-weight", weight)
                    .attr("font-size", "13px")
                    .text(text),
            );
        }
        panel
    }
}

impl Renderer for ScrollyTimeline {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let width = Self::WIDTH - Self::MARGIN_LEFT - Self::MARGIN_RIGHT;
        let height = Self::CHART_HEIGHT - Self::MARGIN_TOP - Self::MARGIN_BOTTOM;
        let years: Vec<i32> = self.events.iter().map(|h| h.year).unique().collect();
        let x = BandScale::point(years, (0.0, width), 0.5)?;
        let y = BandScale::point(HONOR_KINDS.to_vec(), (height, 0.0), 0.5)?;

        let mut chart = Element::new("g")
            .attr("transform", translate(Point::new(Self::MARGIN_LEFT, Self::MARGIN_TOP)))
            .child(
                Element::new("line")
                    .num("x1", 0.0)
                    .num("x2", width)
                    .num("y1", height)
                    .num("y2", height)
                    .attr("stroke", "#ccc")
                    .num("stroke-width", 2.0),
            )
            .child(
                axis_bottom(
                    (0.0, width),
                    x.domain()
                        .iter()
                        .filter_map(|yr| Some((x.scale(yr)?, yr.to_string()))),
                )
                .attr("transform", translate(Point::new(0.0, height)))
                .attr("font-size", "14px"),
            );

        let mut labels = Element::new("g").attr("class", "y-axis-labels");
        for kind in y.domain() {
            if let Some(ty) = y.scale(kind) {
                labels.push(
                    Element::new("text")
                        .num("x", -10.0)
                        .num("y", ty)
                        .attr("dy", "0.32em")
                        .attr("text-anchor", "end")
                        .attr("font-size", "10px")
                        .text(*kind),
                );
            }
        }
        chart.push(labels);

        for (i, h) in self.events.iter().enumerate() {
            let (Some(cx), Some(cy)) = (x.scale(&h.year), y.scale(&h.kind)) else {
                continue;
            };
            let (r, opacity) = match self.active {
                Some(a) if a == i => (12.0, 1.0),
                Some(_) => (8.0, 0.3),
                None => (8.0, 1.0),
            };
            chart.push(
                Element::new("circle")
                    .attr("class", "event-point")
                    .attr("id", Self::event_id(i))
                    .num("cx", cx)
                    .num("cy", cy)
                    .num("r", r)
                    .num("opacity", opacity)
                    .attr("fill", self.color(h.kind))
                    .attr("stroke", "#fff")
                    .num("stroke-width", 3.0)
                    .attr("cursor", "pointer")
                    .attr("data-title", h.title)
                    .attr("data-description", h.description)
                    .attr("data-year", h.year)
                    .attr("data-type", h.kind),
            );
        }

        debug!(events = self.events.len(), active = ?self.active, "scrolly timeline drawn");
        Ok(
            svg_root(Self::WIDTH, Self::CHART_HEIGHT + Self::PANEL_HEIGHT)
                .attr("class", "scrolly-timeline")
                .child(chart)
                .child(self.panel(Self::CHART_HEIGHT + 10.0)),
        )
    }
}

/// Shorten long names to 18 characters plus an ellipsis.
pub fn short_name(name: &str) -> String {
    if name.chars().count() > 20 {
        format!("{}...", name.chars().take(18).collect::<String>())
    } else {
        name.to_string()
    }
}

/// One milestone marker on the stacked timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneMarker {
    index: usize,
    milestone: Milestone,
    position: Point,
    above: bool,
    hovered: bool,
}

impl MilestoneMarker {
    pub fn milestone(&self) -> &Milestone {
        &self.milestone
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_above(&self) -> bool {
        self.above
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl Interactive for MilestoneMarker {
    fn element_id(&self) -> String {
        format!("milestone-{}", self.index)
    }

    fn on_hover_enter(&mut self, tooltip: &mut Tooltip, at: Point) {
        self.hovered = true;
        let content = format!("{}\n{}", self.milestone.kind, self.milestone.name);
        tooltip.show(self.element_id(), content, at);
    }

    fn on_hover_leave(&mut self, tooltip: &mut Tooltip) {
        self.hovered = false;
        tooltip.hide(&self.element_id());
    }
}

pub struct StackedTimeline {
    mount_id: String,
    colors: OrdinalScale<&'static str, &'static str>,
    markers: Vec<MilestoneMarker>,
    years: Vec<i32>,
}

impl StackedTimeline {
    const WIDTH: f64 = 900.0;
    const HEIGHT: f64 = 450.0;
    const MARGIN: f64 = 50.0;
    const SPACING: f64 = 35.0;
    const RADIUS: f64 = 6.0;
    const HOVER_RADIUS: f64 = 9.0;

    pub fn new(mount_id: impl Into<String>) -> Self {
        Self::with_milestones(mount_id, MILESTONES.to_vec())
    }

    pub fn with_milestones(mount_id: impl Into<String>, milestones: Vec<Milestone>) -> Self {
        let years: Vec<i32> = milestones.iter().map(|m| m.year).sorted().dedup().collect();
        let first = years.first().copied().unwrap_or(0);
        let last = years.last().copied().unwrap_or(first);
        let x = LinearScale::new(
            (f64::from(first), f64::from(last)),
            (Self::MARGIN, Self::WIDTH - Self::MARGIN),
        );
        let center = Self::center_y();

        // balance each year's events between the two sides
        let mut sides: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
        let markers = milestones
            .into_iter()
            .enumerate()
            .map(|(index, milestone)| {
                let (top, bottom) = sides.entry(milestone.year).or_default();
                let above = *top <= *bottom;
                let y = if above {
                    *top += 1;
                    center - 40.0 - (*top - 1) as f64 * Self::SPACING
                } else {
                    *bottom += 1;
                    center + 50.0 + (*bottom - 1) as f64 * Self::SPACING
                };
                MilestoneMarker {
                    index,
                    position: Point::new(x.scale(f64::from(milestone.year)), y),
                    milestone,
                    above,
                    hovered: false,
                }
            })
            .collect();

        Self {
            mount_id: mount_id.into(),
            colors: OrdinalScale::new(
                MILESTONE_KINDS.to_vec(),
                vec!["#8b5cf6", "#ec4899", "#10b981"],
            ),
            markers,
            years,
        }
    }

    fn center_y() -> f64 {
        (Self::HEIGHT - 2.0 * Self::MARGIN) / 2.0
    }

    pub fn markers(&self) -> &[MilestoneMarker] {
        &self.markers
    }

    fn draw_marker(&self, m: &MilestoneMarker) -> Element {
        let color = self.colors.scale(&m.milestone.kind).unwrap_or("#999");
        let Point { x, y } = m.position;
        let center = Self::center_y();
        let control = if m.above { y + 20.0 } else { y - 20.0 };
        let connector = format!(
            "M {x} {c} C {x} {k}, {x} {k}, {x} {y}",
            x = fmt_num(x),
            c = fmt_num(center),
            k = fmt_num(control),
            y = fmt_num(y)
        );

        Element::new("g")
            .attr("class", "milestone")
            .attr("id", m.element_id())
            .attr("cursor", "pointer")
            .child(
                Element::new("path")
                    .attr("d", connector)
                    .attr("stroke", "#e5e7eb")
                    .num("stroke-width", 1.0)
                    .attr("fill", "none"),
            )
            .child(
                Element::new("circle")
                    .num("cx", x)
                    .num("cy", y)
                    .num("r", if m.hovered { Self::HOVER_RADIUS } else { Self::RADIUS })
                    .attr("fill", if m.hovered { color } else { "white" })
                    .attr("stroke", color)
                    .num("stroke-width", 2.0),
            )
            .child(
                Element::new("text")
                    .attr("class", "timeline-label")
                    .num("x", x + 10.0)
                    .num("y", y + 4.0)
                    .attr("font-size", "11px")
                    .text(short_name(m.milestone.name)),
            )
    }
}

impl Renderer for StackedTimeline {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let center = Self::center_y();
        let first = self.years.first().copied().unwrap_or(0);
        let last = self.years.last().copied().unwrap_or(first);
        let x = LinearScale::new(
            (f64::from(first), f64::from(last)),
            (Self::MARGIN, Self::WIDTH - Self::MARGIN),
        );

        let mut plot = Element::new("g")
            .attr("transform", translate(Point::new(Self::MARGIN, Self::MARGIN)))
            .child(
                Element::new("line")
                    .attr("class", "timeline-axis")
                    .num("x1", 0.0)
                    .num("y1", center)
                    .num("x2", Self::WIDTH)
                    .num("y2", center)
                    .attr("stroke", "#d1d5db")
                    .num("stroke-width", 2.0),
            );
        for &year in &self.years {
            plot.push(
                Element::new("text")
                    .attr("class", "timeline-year")
                    .num("x", x.scale(f64::from(year)))
                    .num("y", center + 15.0)
                    .attr("text-anchor", "middle")
                    .attr("font-size", "40px")
                    .attr("fill", "#f3f4f6")
                    .text(year.to_string()),
            );
        }
        for m in &self.markers {
            plot.push(self.draw_marker(m));
        }

        debug!(markers = self.markers.len(), "stacked timeline drawn");
        Ok(svg_root(Self::WIDTH, Self::HEIGHT)
            .attr("class", "stacked-timeline")
            .attr("width", "100%")
            .child(plot))
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        self.markers
            .iter_mut()
            .find(|m| m.element_id() == element_id)
            .map(|m| m as &mut dyn Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CityU Scholarship", "CityU Scholarship")]
    #[case("Animation Screening – Lugano", "Animation Screenin...")]
    #[case("12345678901234567890", "12345678901234567890")]
    fn test_short_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(short_name(name), expected);
    }

    #[test]
    fn test_events_are_sorted_by_year() {
        let t = ScrollyTimeline::new("timeline-container");
        assert!(t.events().windows(2).all(|w| w[0].year <= w[1].year));
        assert_eq!(t.events()[0].year, 2018);
    }

    #[test]
    fn test_each_year_alternates_top_and_bottom() {
        let t = StackedTimeline::new("vis-timeline");
        let in_2024: Vec<&MilestoneMarker> = t
            .markers()
            .iter()
            .filter(|m| m.milestone().year == 2024)
            .collect();
        assert_eq!(in_2024.len(), 6);
        let above = in_2024.iter().filter(|m| m.is_above()).count();
        assert_eq!(above, 3);
        assert!(in_2024[0].is_above());
        assert!(!in_2024[1].is_above());
        // second item above sits one spacing higher
        assert_eq!(in_2024[0].position().y - in_2024[2].position().y, 35.0);
    }

    #[test]
    fn test_marker_hover_pops_and_reverts() {
        let mut t = StackedTimeline::new("vis-timeline");
        let mut tooltip = Tooltip::new();
        t.element_mut("milestone-0")
            .unwrap()
            .on_hover_enter(&mut tooltip, Point::ORIGIN);
        assert!(t.markers()[0].is_hovered());
        assert!(tooltip.content().contains("Scholarship"));

        t.element_mut("milestone-0").unwrap().on_hover_leave(&mut tooltip);
        assert!(!t.markers()[0].is_hovered());
        assert!(!tooltip.is_visible());
    }
}
