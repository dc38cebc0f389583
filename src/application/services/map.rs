//! World maps: the interactive places map and the live visitor map.
//!
//! Both draw land from a boundary GeoJSON fetched through a
//! [`BoundarySource`]. A failed fetch or parse is logged and the map is drawn
//! without land; it never aborts rendering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace, warn};
use uuid::Builder;

use crate::application::svg::{animate_attr, fmt_num, svg_root, translate, Element};
use crate::application::ApplicationResult;
use crate::config::{MapConfig, VisitorConfig};
use crate::domain::datasets::{Place, STUDIED_PLACES, VISITED_PLACES};
use crate::domain::geo::{
    parse_boundaries, Country, LonLat, NaturalEarth, ZoomBehavior, ZoomTransform,
};
use crate::domain::{Interactive, Millis, Point, Tooltip};
use crate::infrastructure::traits::BoundarySource;

use super::Renderer;

const OCEAN: &str = "#B3D9FF";
const LAND: &str = "#F0EAD6";
const LAND_HOVER: &str = "#fdb4c6";
const BORDER: &str = "#555";
const VISITED: &str = "#612b8a";
const STUDIED: &str = "#bcd24c";
const MARKER_RADIUS: f64 = 6.0;
const MARKER_STROKE: f64 = 1.2;
const BORDER_STROKE: f64 = 0.5;
pub const LOAD_FAILED_MESSAGE: &str = "could not load map data";

/// Fetch and parse boundaries, `None` when either step fails.
#[instrument(level = "debug", skip(source))]
fn load_countries(source: &dyn BoundarySource, url: &str) -> Option<Vec<Country>> {
    let text = match source.fetch(url) {
        Ok(text) => text,
        Err(e) => {
            warn!("map drawn without land: {}", e);
            return None;
        }
    };
    match parse_boundaries(&text) {
        Ok(countries) => {
            debug!(countries = countries.len(), "boundaries loaded");
            Some(countries)
        }
        Err(e) => {
            warn!("map drawn without land: {}", e);
            None
        }
    }
}

/// A country outline; hovering highlights it and names it.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    index: usize,
    name: String,
    path: String,
    hovered: bool,
}

impl CountryShape {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl Interactive for CountryShape {
    fn element_id(&self) -> String {
        format!("country-{}", self.index)
    }

    fn on_hover_enter(&mut self, _tooltip: &mut Tooltip, _at: Point) {
        self.hovered = true;
    }

    fn on_hover_leave(&mut self, _tooltip: &mut Tooltip) {
        self.hovered = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    Visited,
    Studied,
}

impl PlaceKind {
    fn class(self) -> &'static str {
        match self {
            PlaceKind::Visited => "visited",
            PlaceKind::Studied => "studied",
        }
    }

    fn color(self) -> &'static str {
        match self {
            PlaceKind::Visited => VISITED,
            PlaceKind::Studied => STUDIED,
        }
    }
}

/// City marker with a name tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct CityMarker {
    index: usize,
    kind: PlaceKind,
    place: Place,
}

impl CityMarker {
    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn kind(&self) -> PlaceKind {
        self.kind
    }
}

impl Interactive for CityMarker {
    fn element_id(&self) -> String {
        format!("{}-{}", self.kind.class(), self.index)
    }

    fn on_hover_enter(&mut self, tooltip: &mut Tooltip, at: Point) {
        tooltip.show(self.element_id(), self.place.name, at);
    }

    fn on_hover_leave(&mut self, tooltip: &mut Tooltip) {
        tooltip.hide(&self.element_id());
    }
}

/// Pan/zoom world map of visited and studied cities.
pub struct InteractiveMap {
    mount_id: String,
    config: MapConfig,
    projection: NaturalEarth,
    zoom: ZoomBehavior,
    transform: ZoomTransform,
    countries: Vec<CountryShape>,
    cities: Vec<CityMarker>,
    load_failed: bool,
}

impl InteractiveMap {
    pub fn new(mount_id: impl Into<String>, config: &MapConfig) -> Self {
        let cities = VISITED_PLACES
            .iter()
            .enumerate()
            .map(|(index, place)| CityMarker {
                index,
                kind: PlaceKind::Visited,
                place: *place,
            })
            .chain(STUDIED_PLACES.iter().enumerate().map(|(index, place)| CityMarker {
                index,
                kind: PlaceKind::Studied,
                place: *place,
            }))
            .collect();
        Self {
            mount_id: mount_id.into(),
            projection: NaturalEarth::new(
                config.projection_scale,
                Point::new(config.width / 2.0, config.height / 2.0),
            ),
            zoom: ZoomBehavior::new(config.min_zoom, config.max_zoom),
            transform: ZoomTransform::IDENTITY,
            config: config.clone(),
            countries: Vec::new(),
            cities,
            load_failed: false,
        }
    }

    /// Fetch land from `source`. Failure leaves the map without land and
    /// shows a notice instead; it is not an error.
    pub fn load_boundaries(&mut self, source: &dyn BoundarySource) -> bool {
        match load_countries(source, &self.config.boundary_url) {
            Some(countries) => {
                self.countries = countries
                    .iter()
                    .enumerate()
                    .map(|(index, c)| CountryShape {
                        index,
                        name: c.name.clone(),
                        path: self.projection.path(c),
                        hovered: false,
                    })
                    .collect();
                self.load_failed = false;
                true
            }
            None => {
                self.countries.clear();
                self.load_failed = true;
                false
            }
        }
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn countries(&self) -> &[CountryShape] {
        &self.countries
    }

    pub fn cities(&self) -> &[CityMarker] {
        &self.cities
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Zoom by `factor` around a screen point, within the scale extent.
    pub fn zoom_by(&mut self, factor: f64, center: Point) {
        self.transform = self.zoom.zoom_by(self.transform, factor, center);
        trace!(k = self.transform.k, "zoom");
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform = self.zoom.pan(self.transform, dx, dy);
    }

    pub fn set_transform(&mut self, transform: ZoomTransform) {
        self.transform = self.zoom.constrain(transform);
    }

    pub fn project(&self, coords: LonLat) -> Point {
        self.projection.project(coords)
    }

    fn legend(&self) -> Element {
        let entry = |y: f64, kind: PlaceKind, label: &str| {
            [
                Element::new("circle")
                    .num("r", 7.0)
                    .num("cy", y)
                    .attr("fill", kind.color()),
                Element::new("text")
                    .num("x", 15.0)
                    .num("y", y + 5.0)
                    .attr("font-size", "12px")
                    .attr("font-weight", "bold")
                    .attr("fill", "#333")
                    .text(label),
            ]
        };
        Element::new("g")
            .attr("class", "legend")
            .attr("transform", translate(Point::new(self.config.width - 200.0, 40.0)))
            .children(entry(0.0, PlaceKind::Visited, "Visited Cities"))
            .children(entry(25.0, PlaceKind::Studied, "Studied Cities"))
    }
}

impl Renderer for InteractiveMap {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, _now: Millis) -> ApplicationResult<Element> {
        let (width, height) = (self.config.width, self.config.height);
        let k = self.transform.k;

        let mut group = Element::new("g")
            .attr("class", "map-group")
            .attr("transform", self.transform.to_svg());
        for c in &self.countries {
            group.push(
                Element::new("path")
                    .attr("class", "country")
                    .attr("id", c.element_id())
                    .attr("d", &c.path)
                    .attr("fill", if c.hovered { LAND_HOVER } else { LAND })
                    .attr("stroke", BORDER)
                    .num("stroke-width", BORDER_STROKE / k),
            );
        }
        for city in &self.cities {
            let p = self.projection.project(city.place.coords);
            group.push(
                Element::new("circle")
                    .attr("class", city.kind.class())
                    .attr("id", city.element_id())
                    .num("cx", p.x)
                    .num("cy", p.y)
                    .num("r", MARKER_RADIUS / k)
                    .attr("fill", city.kind.color())
                    .attr("stroke", "#fff")
                    .num("stroke-width", MARKER_STROKE / k)
                    .num("opacity", 0.9),
            );
        }

        let hovered = self.countries.iter().find(|c| c.hovered);
        let mut svg = svg_root(width, height)
            .attr("class", "interactive-map")
            .child(
                Element::new("rect")
                    .attr("class", "ocean")
                    .num("width", width)
                    .num("height", height)
                    .attr("fill", OCEAN),
            )
            .child(group)
            .child(
                Element::new("text")
                    .attr("class", "country-label")
                    .num("x", 10.0)
                    .num("y", 20.0)
                    .attr("font-size", "16px")
                    .attr("font-weight", "bold")
                    .attr("fill", "#333")
                    .num("opacity", if hovered.is_some() { 1.0 } else { 0.0 })
                    .text(hovered.map(|c| c.name.as_str()).unwrap_or_default()),
            )
            .child(self.legend());

        if self.load_failed {
            svg.push(
                Element::new("text")
                    .attr("class", "map-error")
                    .num("x", width / 2.0)
                    .num("y", height / 2.0)
                    .attr("text-anchor", "middle")
                    .attr("font-size", "14px")
                    .attr("fill", "#b91c1c")
                    .text(LOAD_FAILED_MESSAGE),
            );
        }

        debug!(
            countries = self.countries.len(),
            k = %fmt_num(k),
            "interactive map drawn"
        );
        Ok(svg)
    }

    fn element_mut(&mut self, element_id: &str) -> Option<&mut dyn Interactive> {
        if let Some(i) = self.cities.iter().position(|c| c.element_id() == element_id) {
            return Some(&mut self.cities[i]);
        }
        self.countries
            .iter_mut()
            .find(|c| c.element_id() == element_id)
            .map(|c| c as &mut dyn Interactive)
    }
}

/// Fixed-interval timer driven by the caller's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    interval: Millis,
    next_due: Millis,
    stopped: bool,
}

impl Ticker {
    pub fn new(interval: Millis, start: Millis) -> Self {
        Self {
            interval,
            next_due: start.saturating_add(interval),
            stopped: false,
        }
    }

    /// True at most once per elapsed interval. Missed intervals are skipped,
    /// not replayed.
    pub fn poll(&mut self, now: Millis) -> bool {
        if self.stopped || now < self.next_due {
            return false;
        }
        let step = self.interval.max(1);
        let elapsed = (now - self.next_due) / step + 1;
        self.next_due = self.next_due.saturating_add(elapsed.saturating_mul(step));
        true
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn next_due(&self) -> Millis {
        self.next_due
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visitor {
    pub id: String,
    pub coords: LonLat,
    /// Circle radius, 3..9
    pub size: f64,
}

/// Random visitor dots, replaced wholesale on every tick.
pub struct VisitorMap {
    mount_id: String,
    config: VisitorConfig,
    width: f64,
    height: f64,
    projection: NaturalEarth,
    land: Vec<String>,
    rng: StdRng,
    ticker: Ticker,
    visitors: Vec<Visitor>,
    exiting: Vec<Visitor>,
    generated_at: Millis,
}

impl VisitorMap {
    const OCEAN: &'static str = "#a6cee3";
    const LAND: &'static str = "#c4da92";
    const VISITOR: &'static str = "#ff5722";
    const FADE: Millis = 1000;

    pub fn new(mount_id: impl Into<String>, map: &MapConfig, config: &VisitorConfig) -> Self {
        Self::with_rng(mount_id, map, config, StdRng::from_entropy(), 0)
    }

    /// Deterministic visitors, starting the clock at `start`.
    pub fn with_seed(
        mount_id: impl Into<String>,
        map: &MapConfig,
        config: &VisitorConfig,
        seed: u64,
        start: Millis,
    ) -> Self {
        Self::with_rng(mount_id, map, config, StdRng::seed_from_u64(seed), start)
    }

    fn with_rng(
        mount_id: impl Into<String>,
        map: &MapConfig,
        config: &VisitorConfig,
        rng: StdRng,
        start: Millis,
    ) -> Self {
        let mut view = Self {
            mount_id: mount_id.into(),
            config: config.clone(),
            width: map.width,
            height: map.height,
            projection: NaturalEarth::fitted(map.width, map.height),
            land: Vec::new(),
            rng,
            ticker: Ticker::new(config.interval_ms, start),
            visitors: Vec::new(),
            exiting: Vec::new(),
            generated_at: start,
        };
        view.visitors = view.generate();
        view
    }

    pub fn load_boundaries(&mut self, source: &dyn BoundarySource, url: &str) -> bool {
        match load_countries(source, url) {
            Some(countries) => {
                self.land = countries.iter().map(|c| self.projection.path(c)).collect();
                true
            }
            None => {
                self.land.clear();
                false
            }
        }
    }

    pub fn visitors(&self) -> &[Visitor] {
        &self.visitors
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Stop regenerating. Visitors on screen stay where they are.
    pub fn stop(&mut self) {
        debug!("visitor ticker stopped");
        self.ticker.stop();
    }

    /// Replace the visitors if the interval has elapsed; returns whether it did.
    pub fn tick(&mut self, now: Millis) -> bool {
        if !self.ticker.poll(now) {
            return false;
        }
        let fresh = self.generate();
        self.exiting = std::mem::replace(&mut self.visitors, fresh);
        self.generated_at = now;
        trace!(visitors = self.visitors.len(), "visitors regenerated");
        true
    }

    fn generate(&mut self) -> Vec<Visitor> {
        (0..self.config.count)
            .map(|_| Visitor {
                id: Builder::from_random_bytes(self.rng.gen())
                    .into_uuid()
                    .to_string(),
                coords: [
                    self.rng.gen_range(-180.0..180.0),
                    self.rng.gen_range(-90.0..90.0),
                ],
                size: self.rng.gen_range(3.0..9.0),
            })
            .collect()
    }
}

impl Renderer for VisitorMap {
    fn mount_id(&self) -> &str {
        &self.mount_id
    }

    fn draw(&mut self, now: Millis) -> ApplicationResult<Element> {
        let land = Element::new("g").attr("class", "land").children(self.land.iter().map(|d| {
            Element::new("path")
                .attr("d", d)
                .attr("fill", Self::LAND)
                .attr("stroke", "#ffffff")
                .num("stroke-width", BORDER_STROKE)
        }));

        let mut dots = Element::new("g").attr("class", "visitors");
        let fading = now < self.generated_at.saturating_add(Self::FADE);
        if fading {
            for v in &self.exiting {
                let p = self.projection.project(v.coords);
                dots.push(
                    Element::new("circle")
                        .attr("class", "visitor visitor--exiting")
                        .attr("data-id", &v.id)
                        .num("cx", p.x)
                        .num("cy", p.y)
                        .num("r", v.size)
                        .attr("fill", Self::VISITOR)
                        .num("opacity", 0.0)
                        .child(animate_attr("opacity", "0.8", "0", Self::FADE)),
                );
            }
        }
        for v in &self.visitors {
            let p = self.projection.project(v.coords);
            dots.push(
                Element::new("circle")
                    .attr("class", "visitor")
                    .attr("data-id", &v.id)
                    .num("cx", p.x)
                    .num("cy", p.y)
                    .num("r", v.size)
                    .attr("fill", Self::VISITOR)
                    .num("opacity", 0.8)
                    .child(animate_attr("r", "0", fmt_num(v.size), Self::FADE)),
            );
        }

        Ok(svg_root(self.width, self.height)
            .attr("class", "visitor-map")
            .child(
                Element::new("rect")
                    .num("width", self.width)
                    .num("height", self.height)
                    .attr("fill", Self::OCEAN),
            )
            .child(land)
            .child(dots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::OfflineBoundarySource;

    #[test]
    fn test_ticker_fires_once_per_interval_and_skips_missed() {
        let mut t = Ticker::new(2000, 0);
        assert!(!t.poll(1999));
        assert!(t.poll(2000));
        assert!(!t.poll(2500));
        assert!(t.poll(9000));
        assert_eq!(t.next_due(), 10_000);
    }

    #[test]
    fn test_ticker_catches_up_after_long_gap_without_overflow() {
        let mut t = Ticker::new(1, 0);
        assert!(t.poll(u64::MAX - 1));
        assert_eq!(t.next_due(), u64::MAX);
        assert!(!t.poll(u64::MAX - 1));

        let mut t = Ticker::new(3, 1);
        assert!(t.poll(1_000_000_000));
        assert_eq!(t.next_due(), 1_000_000_003);
    }

    #[test]
    fn test_stopped_ticker_never_fires() {
        let mut t = Ticker::new(10, 0);
        t.stop();
        assert!(!t.poll(1_000_000));
    }

    #[test]
    fn test_visitors_stay_in_range() {
        let map = VisitorMap::with_seed(
            "visitor-map",
            &MapConfig::default(),
            &VisitorConfig::default(),
            7,
            0,
        );
        assert_eq!(map.visitors().len(), 40);
        assert!(map.visitors().iter().all(|v| {
            (-180.0..180.0).contains(&v.coords[0])
                && (-90.0..90.0).contains(&v.coords[1])
                && (3.0..9.0).contains(&v.size)
        }));
    }

    #[test]
    fn test_markers_shrink_with_zoom() {
        let mut map = InteractiveMap::new("map", &MapConfig::default());
        map.zoom_by(2.0, Point::new(500.0, 300.0));
        let svg = map.draw(0).unwrap();
        let marker = &svg.find_by_class("visited")[0];
        assert_eq!(marker.get_attr("r"), Some("3"));
        assert_eq!(marker.get_attr("stroke-width"), Some("0.6"));
    }

    #[test]
    fn test_failed_load_shows_notice() {
        let mut map = InteractiveMap::new("map", &MapConfig::default());
        assert!(!map.load_boundaries(&OfflineBoundarySource));
        let svg = map.draw(0).unwrap();
        assert_eq!(svg.find_by_class("map-error")[0].text_content(), LOAD_FAILED_MESSAGE);
    }
}
