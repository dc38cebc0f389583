//! Charts: software proficiency bars, creative works scatterplot and the
//! SF-36 grouped bar chart with its absolute/change mode switch.

use itertools::Itertools;
use tracing::debug;

use crate::application::svg::{
    animate_attr, axis_bottom, axis_left, fmt_num, svg_root, translate, Element,
};
use crate::application::ApplicationResult;
use crate::domain::datasets::{
    CreativeWork, HealthScore, Proficiency, CREATIVE_WORKS, HEALTH_COMPONENTS, HEALTH_SCORES,
    POPULATION_NORM, SOFTWARE_PROFICIENCY,
};
use crate::domain::scale::{BandScale, LinearScale, OrdinalScale, SqrtScale};
use crate::domain::{Action, ChartMode, DomainError, Interactive, Millis, Point, Tooltip};

use super::Renderer;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Margin {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Margin {
    fn inner(&self, width: f64, height: f64) -> (f64, f64) {
        (
            width - self.left - self.right,
            height - self.top - self.bottom,
        )
    }

    fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

fn axis_title(x: f64, y: f64, text: &str) -> Element {
    Element::new("text")
        .attr("class", "axis-title")
        .attr("text-anchor", "middle")
        .num("x", x)
        .num("y", y)
        .attr("font-size", "14px")
        .attr("font-weight", "bold")
        .attr("fill", "#333")
        .text(text)
}

/// Horizontal bars of software proficiency in percent.
#[derive(Debug, Clone)]
pub struct BarChart {
    mount_id: String,
    data: Vec<Proficiency>,
}

impl BarChart {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 400.0;
    const MARGIN: Margin = Margin {
        top: 40.0,
        right: 30.0,
        bottom: 60.0,
        left: 120.0,
    };

    pub fn new(mount_id: impl Into<String>) -> Self {
        Self::with_data(mount_id, SOFTWARE_PROFICIENCY.to_vec())
    }

    pub fn with_data(mount_id: impl Into<String>, data: Vec<Proficiency>) -> Self {
        Self {
            mount_id: mount_id.into(),
            data,
        }
    }

    pub fn data(&self) -> &[Proficiency] {
        &self.data
    }
}

impl Renderer for BarChart {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let (width, height) = Self::MARGIN.inner(Self::WIDTH, Self::HEIGHT);
        let y = BandScale::new(
            self.data.iter().map(|d| d.software).collect(),
            (0.0, height),
            0.2,
        )?;
        let x = LinearScale::new((0.0, 100.0), (0.0, width));

        let x_axis = axis_bottom(
            x.range(),
            x.ticks(5)
                .into_iter()
                .map(|t| (x.scale(t), format!("{}%", fmt_num(t)))),
        )
        .attr("transform", translate(Point::new(0.0, height)));
        let y_axis = axis_left(
            (0.0, height),
            y.domain()
                .iter()
                .filter_map(|s| Some((y.scale(s)? + y.bandwidth() / 2.0, s.to_string()))),
        );

        let mut plot = Element::new("g")
            .attr("transform", translate(Self::MARGIN.origin()))
            .child(x_axis)
            .child(y_axis);

        for d in &self.data {
            let top = y.scale(&d.software).ok_or_else(|| DomainError::InvalidDataset {
                name: "software proficiency".into(),
                message: format!("{} missing from band scale", d.software),
            })?;
            plot.push(
                Element::new("rect")
                    .attr("class", "bar")
                    .num("x", 0.0)
                    .num("y", top)
                    .num("width", x.scale(d.score))
                    .num("height", y.bandwidth())
                    .attr("fill", "steelblue")
                    .num("opacity", 0.8),
            );
            plot.push(
                Element::new("text")
                    .attr("class", "label")
                    .num("x", x.scale(d.score) + 5.0)
                    .num("y", top + y.bandwidth() / 1.6)
                    .attr("font-size", "12px")
                    .attr("fill", "#333")
                    .text(format!("{}%", fmt_num(d.score))),
            );
        }

        plot.push(axis_title(width / 2.0, height + 40.0, "Skill Proficiency (%)"));
        plot.push(
            axis_title(-height / 2.0, -80.0, "Software").attr("transform", "rotate(-90)"),
        );

        debug!(bars = self.data.len(), "bar chart drawn");
        Ok(svg_root(Self::WIDTH, Self::HEIGHT)
            .attr("class", "bar-chart")
            .child(plot))
    }
}

/// Creative works per year and type; bubble area grows with the count.
#[derive(Debug, Clone)]
pub struct Scatterplot {
    mount_id: String,
    data: Vec<CreativeWork>,
}

impl Scatterplot {
    const WIDTH: f64 = 800.0;
    const HEIGHT: f64 = 400.0;
    const MARGIN: Margin = Margin {
        top: 40.0,
        right: 40.0,
        bottom: 60.0,
        left: 130.0,
    };
    const YEARS: (f64, f64) = (2022.0, 2026.0);
    const RADIUS: (f64, f64) = (5.0, 25.0);

    pub fn new(mount_id: impl Into<String>) -> Self {
        Self::with_data(mount_id, CREATIVE_WORKS.to_vec())
    }

    pub fn with_data(mount_id: impl Into<String>, data: Vec<CreativeWork>) -> Self {
        Self {
            mount_id: mount_id.into(),
            data,
        }
    }

    /// Distinct work types in first-seen order.
    pub fn types(&self) -> Vec<&'static str> {
        self.data.iter().map(|d| d.kind).unique().collect()
    }
}

impl Renderer for Scatterplot {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let (width, height) = Self::MARGIN.inner(Self::WIDTH, Self::HEIGHT);
        let x = LinearScale::new(Self::YEARS, (0.0, width));
        let y = BandScale::point(self.types(), (height, 0.0), 0.5)?;
        let max_count = self.data.iter().map(|d| d.count).max().unwrap_or(0);
        let r = SqrtScale::new((0.0, f64::from(max_count)), Self::RADIUS);

        let x_axis = axis_bottom(
            x.range(),
            x.ticks(5)
                .into_iter()
                .map(|t| (x.scale(t), format!("{}", t.round() as i64))),
        )
        .attr("transform", translate(Point::new(0.0, height)));
        let y_axis = axis_left(
            (height, 0.0),
            y.domain()
                .iter()
                .filter_map(|t| Some((y.scale(t)?, t.to_string()))),
        );

        let mut plot = Element::new("g")
            .attr("transform", translate(Self::MARGIN.origin()))
            .child(x_axis)
            .child(y_axis);

        for d in &self.data {
            let Some(cy) = y.scale(&d.kind) else {
                continue;
            };
            plot.push(
                Element::new("circle")
                    .attr("class", "dot")
                    .num("cx", x.scale(f64::from(d.year)))
                    .num("cy", cy)
                    .num("r", r.scale(f64::from(d.count)))
                    .attr("fill", "#4682B4")
                    .num("opacity", 0.75)
                    .child(Element::new("title").text(format!(
                        "{} {}: {}",
                        d.year, d.kind, d.count
                    ))),
            );
        }

        plot.push(axis_title(width / 2.0, height + 45.0, "Year"));
        plot.push(
            axis_title(-height / 2.0, -100.0, "Type of Creative Work")
                .attr("transform", "rotate(-90)"),
        );
        plot.push(
            axis_title(width / 2.0, -10.0, "Creative Works by Year and Type")
                .attr("font-size", "16px"),
        );

        debug!(points = self.data.len(), "scatterplot drawn");
        Ok(svg_root(Self::WIDTH, Self::HEIGHT)
            .attr("class", "scatterplot")
            .child(plot))
    }
}

/// Mode switch and population-norm fade durations.
const MODE_DURATION: Millis = 750;
const NORM_FADE: Millis = 500;

/// One bar of the grouped chart: a component score at a follow-up visit.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBar {
    month: u32,
    component: &'static str,
    absolute: f64,
    change: f64,
    mode: ChartMode,
    hovered: bool,
}

impl GroupedBar {
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn value(&self, mode: ChartMode) -> f64 {
        match mode {
            ChartMode::Absolute => self.absolute,
            ChartMode::Change => self.change,
        }
    }

    /// Height-giving value; negative changes plot as zero.
    pub fn plotted(&self, mode: ChartMode) -> f64 {
        self.value(mode).max(0.0)
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl Interactive for GroupedBar {
    fn element_id(&self) -> String {
        format!("bar-{}-{}", self.component.to_lowercase(), self.month)
    }

    fn on_hover_enter(&mut self, tooltip: &mut Tooltip, at: Point) {
        let measure = match self.mode {
            ChartMode::Absolute => "Score",
            ChartMode::Change => "Change from M0",
        };
        // the true value, even where the bar is clamped to zero
        let content = format!(
            "{} Score\nTime: {} months\n{}: {:.1}",
            self.component,
            self.month,
            measure,
            self.value(self.mode)
        );
        tooltip.show(self.element_id(), content, at);
        self.hovered = true;
    }

    fn on_hover_leave(&mut self, tooltip: &mut Tooltip) {
        tooltip.hide(&self.element_id());
        self.hovered = false;
    }
}

/// Radio-style button selecting the chart mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeOption {
    mode: ChartMode,
    selected: bool,
}

impl ModeOption {
    pub fn mode(&self) -> ChartMode {
        self.mode
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

impl Interactive for ModeOption {
    fn element_id(&self) -> String {
        format!("mode-{}", self.mode.name())
    }

    fn on_activate(&mut self) -> Action {
        Action::SetMode(self.mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ModeSwitch {
    from: ChartMode,
    at: Millis,
}

/// SF-36 component scores per follow-up visit, grouped by month.
///
/// Plots either the absolute score or the change from the baseline visit.
/// Switching mode rescales the y axis and animates the bars; negative
/// changes are drawn with zero height.
#[derive(Debug, Clone)]
pub struct GroupedBarChart {
    mount_id: String,
    months: Vec<u32>,
    bars: Vec<GroupedBar>,
    options: Vec<ModeOption>,
    mode: ChartMode,
    switch: Option<ModeSwitch>,
}

impl GroupedBarChart {
    const WIDTH: f64 = 900.0;
    const HEIGHT: f64 = 500.0;
    const MARGIN: Margin = Margin {
        top: 70.0,
        right: 40.0,
        bottom: 60.0,
        left: 70.0,
    };
    const COLORS: [&'static str; 2] = ["#549860ff", "#9672d7ff"];

    pub fn new(mount_id: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_data(mount_id, HEALTH_SCORES.to_vec())
    }

    /// Chart over `scores`; the first record is the baseline and is not drawn.
    pub fn with_data(
        mount_id: impl Into<String>,
        scores: Vec<HealthScore>,
    ) -> Result<Self, DomainError> {
        let Some((baseline, follow_ups)) = scores.split_first() else {
            return Err(DomainError::InvalidDataset {
                name: "health scores".into(),
                message: "no baseline visit".into(),
            });
        };
        let bars = follow_ups
            .iter()
            .flat_map(|s| {
                HEALTH_COMPONENTS.iter().filter_map(move |&component| {
                    let absolute = s.component(component)?;
                    Some(GroupedBar {
                        month: s.month,
                        component,
                        absolute,
                        change: absolute - baseline.component(component)?,
                        mode: ChartMode::default(),
                        hovered: false,
                    })
                })
            })
            .collect();
        let options = ChartMode::ALL
            .iter()
            .map(|&mode| ModeOption {
                mode,
                selected: mode == ChartMode::default(),
            })
            .collect();

        Ok(Self {
            mount_id: mount_id.into(),
            months: follow_ups.iter().map(|s| s.month).collect(),
            bars,
            options,
            mode: ChartMode::default(),
            switch: None,
        })
    }

    pub fn mode(&self) -> ChartMode {
        self.mode
    }

    pub fn bars(&self) -> &[GroupedBar] {
        &self.bars
    }

    pub fn options(&self) -> &[ModeOption] {
        &self.options
    }

    /// Switch to `mode` at `now`; false when it is already shown.
    pub fn set_mode(&mut self, mode: ChartMode, now: Millis) -> bool {
        if mode == self.mode {
            return false;
        }
        debug!(from = ?self.mode, to = ?mode, "chart mode switched");
        self.switch = Some(ModeSwitch {
            from: self.mode,
            at: now,
        });
        self.mode = mode;
        for bar in &mut self.bars {
            bar.mode = mode;
        }
        for option in &mut self.options {
            option.selected = option.mode == mode;
        }
        true
    }

    /// Y domain for `mode`: headroom above the largest plotted value.
    pub fn y_domain(&self, mode: ChartMode) -> (f64, f64) {
        let max = self
            .bars
            .iter()
            .map(|b| b.plotted(mode))
            .fold(0.0, f64::max);
        let top = match mode {
            ChartMode::Absolute => max * 1.05,
            ChartMode::Change => max * 1.1,
        };
        // keep a usable scale when nothing is positive
        (0.0, if top > 0.0 { top } else { 1.0 })
    }

    fn y_scale(&self, mode: ChartMode) -> LinearScale {
        let (_, height) = Self::MARGIN.inner(Self::WIDTH, Self::HEIGHT);
        LinearScale::new(self.y_domain(mode), (height, 0.0))
    }

    fn y_label(mode: ChartMode) -> &'static str {
        match mode {
            ChartMode::Absolute => "SF-36 Component Score, mean",
            ChartMode::Change => "Positive Change in SF-36 Score (Relative to Month 0)",
        }
    }

    fn draw_bar(
        &self,
        bar: &GroupedBar,
        x1: &BandScale<&'static str>,
        color: &OrdinalScale<&'static str, &'static str>,
        from: Option<ChartMode>,
    ) -> Element {
        let (_, height) = Self::MARGIN.inner(Self::WIDTH, Self::HEIGHT);
        let y = self.y_scale(self.mode);
        let top = y.scale(bar.plotted(self.mode));

        let mut rect = Element::new("rect")
            .attr("id", bar.element_id())
            .attr("class", format!("bar bar-{}", bar.component))
            .num("x", x1.scale(&bar.component).unwrap_or(0.0))
            .num("width", x1.bandwidth())
            .attr("fill", color.scale(&bar.component).unwrap_or("#999"))
            .num("y", top)
            .num("height", height - top);
        if bar.hovered {
            rect.set_attr("style", "filter: brightness(1.2)");
        }
        if let Some(from) = from {
            let old_top = self.y_scale(from).scale(bar.plotted(from));
            rect.push(animate_attr(
                "y",
                fmt_num(old_top),
                fmt_num(top),
                MODE_DURATION,
            ));
            rect.push(animate_attr(
                "height",
                fmt_num(height - old_top),
                fmt_num(height - top),
                MODE_DURATION,
            ));
        }
        rect
    }

    fn draw_mode_selector(&self, width: f64) -> Element {
        let mut selector = Element::new("g")
            .attr("class", "mode-selector")
            .attr("transform", translate(Point::new(width / 2.0 - 200.0, -50.0)));
        for (i, option) in self.options.iter().enumerate() {
            let class = if option.selected {
                "mode-option mode-option--selected"
            } else {
                "mode-option"
            };
            selector.push(
                Element::new("g")
                    .attr("id", option.element_id())
                    .attr("class", class)
                    .attr("cursor", "pointer")
                    .attr("transform", translate(Point::new(i as f64 * 180.0, 0.0)))
                    .child(
                        Element::new("circle")
                            .num("r", 6.0)
                            .attr("fill", if option.selected { "#333" } else { "white" })
                            .attr("stroke", "#333"),
                    )
                    .child(
                        Element::new("text")
                            .num("x", 12.0)
                            .num("y", 4.0)
                            .attr("font-size", "12px")
                            .text(option.mode.label()),
                    ),
            );
        }
        selector
    }
}

impl Renderer for GroupedBarChart {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, now: Millis) -> ApplicationResult<Element> {
        let (width, height) = Self::MARGIN.inner(Self::WIDTH, Self::HEIGHT);
        let x0 = BandScale::new(self.months.clone(), (0.0, width), 0.2)?;
        let x1 = BandScale::new(HEALTH_COMPONENTS.to_vec(), (0.0, x0.bandwidth()), 0.05)?;
        let color = OrdinalScale::new(HEALTH_COMPONENTS.to_vec(), Self::COLORS.to_vec());
        let y = self.y_scale(self.mode);
        let switch = self.switch.filter(|s| now < s.at + MODE_DURATION);

        let x_axis = axis_bottom(
            (0.0, width),
            x0.domain()
                .iter()
                .filter_map(|m| Some((x0.scale(m)? + x0.bandwidth() / 2.0, m.to_string()))),
        )
        .attr("transform", translate(Point::new(0.0, height)));
        let y_axis = axis_left(
            (height, 0.0),
            y.ticks(10)
                .into_iter()
                .map(|t| (y.scale(t), fmt_num(t))),
        )
        .attr("class", "axis y-axis");

        let mut plot = Element::new("g")
            .attr("transform", translate(Self::MARGIN.origin()))
            .child(self.draw_mode_selector(width))
            .child(x_axis)
            .child(y_axis)
            .child(
                axis_title(width / 2.0, height + Self::MARGIN.bottom - 10.0, "Time, months")
                    .attr("class", "x-label"),
            )
            .child(
                axis_title(-height / 2.0, -Self::MARGIN.left, Self::y_label(self.mode))
                    .attr("class", "y-label")
                    .attr("transform", "rotate(-90)")
                    .attr("dy", "1em"),
            );

        for &month in &self.months {
            let Some(x) = x0.scale(&month) else {
                continue;
            };
            let group = Element::new("g")
                .attr("class", "group")
                .attr("transform", translate(Point::new(x, 0.0)))
                .children(
                    self.bars
                        .iter()
                        .filter(|b| b.month == month)
                        .map(|b| self.draw_bar(b, &x1, &color, switch.map(|s| s.from))),
                );
            plot.push(group);
        }

        let legend = Element::new("g")
            .attr("class", "legend")
            .attr("transform", translate(Point::new(width - 150.0, -40.0)))
            .children(HEALTH_COMPONENTS.iter().enumerate().map(|(i, &c)| {
                Element::new("g")
                    .attr("transform", translate(Point::new(i as f64 * 80.0, 0.0)))
                    .child(
                        Element::new("rect")
                            .num("width", 15.0)
                            .num("height", 15.0)
                            .attr("fill", color.scale(&c).unwrap_or("#999")),
                    )
                    .child(
                        Element::new("text")
                            .num("x", 20.0)
                            .num("y", 12.0)
                            .attr("font-size", "12px")
                            .text(c),
                    )
            }));
        plot.push(legend);

        // the norm only has meaning on the absolute scale
        let norm_y = self.y_scale(ChartMode::Absolute).scale(POPULATION_NORM);
        let opacity = |mode: ChartMode| if mode == ChartMode::Absolute { 1.0 } else { 0.0 };
        let fade = self
            .switch
            .filter(|s| now < s.at + NORM_FADE)
            .map(|s| animate_attr("opacity", opacity(s.from), opacity(self.mode), NORM_FADE));
        let mut line = Element::new("line")
            .attr("class", "pop-norm-line")
            .num("x1", 0.0)
            .num("x2", width)
            .num("y1", norm_y)
            .num("y2", norm_y)
            .attr("stroke", "#aaa")
            .attr("stroke-dasharray", "4")
            .num("stroke-width", 1.0)
            .num("opacity", opacity(self.mode));
        let mut label = Element::new("text")
            .attr("class", "pop-norm-label")
            .num("x", width - 5.0)
            .num("y", norm_y - 5.0)
            .attr("text-anchor", "end")
            .attr("font-size", "10px")
            .attr("fill", "#aaa")
            .num("opacity", opacity(self.mode))
            .text(format!("Population norm: {POPULATION_NORM:.1}"));
        if let Some(fade) = fade {
            line.push(fade.clone());
            label.push(fade);
        }
        plot.push(line);
        plot.push(label);

        debug!(mode = ?self.mode, bars = self.bars.len(), "grouped bar chart drawn");
        Ok(svg_root(Self::WIDTH, Self::HEIGHT)
            .attr("class", "grouped-bar-chart")
            .child(plot))
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        if let Some(bar) = self.bars.iter_mut().find(|b| b.element_id() == element_id) {
            return Some(bar);
        }
        self.options
            .iter_mut()
            .find(|o| o.element_id() == element_id)
            .map(|o| o as &mut dyn Interactive)
    }

    fn apply(&mut self, action: Action, now: Millis) -> ApplicationResult<()> {
        if let Action::SetMode(mode) = action {
            self.set_mode(mode, now);
        }
        Ok(())
    }
}
