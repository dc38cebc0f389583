//! Minimal SVG element tree and writer.

use std::fmt::{self, Write};

use crate::domain::{Millis, Point};

/// Spline matching cubic in-out easing for SMIL animations.
const CUBIC_IN_OUT_SPLINE: &str = "0.645 0.045 0.355 1";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set an attribute, replacing an earlier value of the same name.
    pub fn attr(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set a numeric attribute using compact number formatting.
    pub fn num(self, key: &str, value: f64) -> Self {
        self.attr(key, fmt_num(value))
    }

    pub fn set_attr(&mut self, key: &str, value: impl fmt::Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order (self excluded).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        while let Some(e) = stack.pop() {
            out.push(e);
            let before = stack.len();
            stack.extend(e.child_elements());
            stack[before..].reverse();
        }
        out
    }

    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| e.has_class(class))
            .collect()
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (k, v) in &self.attrs {
            write!(out, " {}=\"{}\"", k, escape(v))?;
        }
        if self.children.is_empty() {
            return out.write_str("/>");
        }
        out.write_char('>')?;
        for node in &self.children {
            match node {
                Node::Text(t) => out.write_str(&escape(t))?,
                Node::Element(e) => e.write_to(out)?,
            }
        }
        write!(out, "</{}>", self.name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Integers without a fraction, everything else with at most two decimals.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".into();
    }
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".into();
    }
    let s = format!("{rounded:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn translate(p: Point) -> String {
    format!("translate({},{})", fmt_num(p.x), fmt_num(p.y))
}

/// Root `<svg>` with an explicit size and matching view box.
pub fn svg_root(width: f64, height: f64) -> Element {
    Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .num("width", width)
        .num("height", height)
        .attr(
            "viewBox",
            format!("0 0 {} {}", fmt_num(width), fmt_num(height)),
        )
}

fn timed(e: Element, duration: Millis) -> Element {
    e.attr("begin", "0ms")
        .attr("dur", format!("{duration}ms"))
        .attr("fill", "freeze")
        .attr("calcMode", "spline")
        .attr("keyTimes", "0;1")
        .attr("keySplines", CUBIC_IN_OUT_SPLINE)
}

/// Animated move of the parent group from `from` to `to`.
pub fn animate_translate(from: Point, to: Point, duration: Millis) -> Element {
    timed(
        Element::new("animateTransform")
            .attr("attributeName", "transform")
            .attr("type", "translate")
            .attr("from", format!("{} {}", fmt_num(from.x), fmt_num(from.y)))
            .attr("to", format!("{} {}", fmt_num(to.x), fmt_num(to.y))),
        duration,
    )
}

/// Animated change of one attribute of the parent element.
pub fn animate_attr(
    name: &str,
    from: impl fmt::Display,
    to: impl fmt::Display,
    duration: Millis,
) -> Element {
    timed(
        Element::new("animate")
            .attr("attributeName", name)
            .attr("from", from)
            .attr("to", to),
        duration,
    )
}

const TICK_SIZE: f64 = 6.0;

/// Horizontal axis below a plot: a domain line across `range` and one
/// labelled tick per `(position, label)`.
pub fn axis_bottom(range: (f64, f64), ticks: impl IntoIterator<Item = (f64, String)>) -> Element {
    let domain = format!(
        "M{},{}V0H{}V{}",
        fmt_num(range.0),
        fmt_num(TICK_SIZE),
        fmt_num(range.1),
        fmt_num(TICK_SIZE)
    );
    let axis = axis_group("middle").child(domain_path(domain));
    axis.children(ticks.into_iter().map(|(x, label)| {
        Element::new("g")
            .attr("class", "tick")
            .attr("transform", translate(Point::new(x, 0.0)))
            .child(Element::new("line").attr("stroke", "currentColor").num("y2", TICK_SIZE))
            .child(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .num("y", TICK_SIZE + 3.0)
                    .attr("dy", "0.71em")
                    .text(label),
            )
    }))
}

/// Vertical axis left of a plot.
pub fn axis_left(range: (f64, f64), ticks: impl IntoIterator<Item = (f64, String)>) -> Element {
    let domain = format!(
        "M-{},{}H0V{}H-{}",
        fmt_num(TICK_SIZE),
        fmt_num(range.0),
        fmt_num(range.1),
        fmt_num(TICK_SIZE)
    );
    let axis = axis_group("end").child(domain_path(domain));
    axis.children(ticks.into_iter().map(|(y, label)| {
        Element::new("g")
            .attr("class", "tick")
            .attr("transform", translate(Point::new(0.0, y)))
            .child(Element::new("line").attr("stroke", "currentColor").num("x2", -TICK_SIZE))
            .child(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .num("x", -(TICK_SIZE + 3.0))
                    .attr("dy", "0.32em")
                    .text(label),
            )
    }))
}

fn axis_group(anchor: &str) -> Element {
    Element::new("g")
        .attr("class", "axis")
        .attr("fill", "none")
        .num("font-size", 10.0)
        .attr("font-family", "sans-serif")
        .attr("text-anchor", anchor)
}

fn domain_path(d: String) -> Element {
    Element::new("path")
        .attr("class", "domain")
        .attr("stroke", "currentColor")
        .attr("d", d)
}
