//! Force-directed layout for small graphs.
//!
//! One `tick` cools `alpha` toward `alpha_target`, applies link, many-body,
//! centering and collision forces to node velocities, then integrates with
//! velocity decay. Pinned nodes (`fixed`) snap to their pin and lose their
//! velocity. Coincident nodes are separated by a tiny jiggle drawn from a
//! seeded generator, so runs are reproducible.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::error::DomainError;
use crate::domain::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    pub link_distance: f64,
    pub link_strength: f64,
    /// Negative values repel
    pub charge: f64,
    pub collide_radius: f64,
    pub center: Point,
    pub alpha_min: f64,
    /// Fraction of velocity kept per tick
    pub velocity_retention: f64,
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 280.0,
            link_strength: 0.6,
            charge: -250.0,
            collide_radius: 90.0,
            center: Point::new(550.0, 325.0),
            alpha_min: 0.001,
            velocity_retention: 0.6,
            seed: 0x5eed,
        }
    }
}

impl ForceConfig {
    /// Decay that takes alpha from 1 to `alpha_min` in 300 ticks.
    pub fn alpha_decay(&self) -> f64 {
        1.0 - self.alpha_min.powf(1.0 / 300.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceNode {
    pub id: String,
    pub position: Point,
    pub velocity: Point,
    pub fixed: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    source: usize,
    target: usize,
}

pub struct Simulation {
    config: ForceConfig,
    nodes: Vec<ForceNode>,
    links: Vec<Link>,
    /// Share of each link's correction applied to its target
    bias: Vec<f64>,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    rng: StdRng,
    running: bool,
    ticks: u64,
}

impl Simulation {
    /// Build a simulation over `ids`, linked by `(source, target)` id pairs.
    /// Nodes start on a phyllotaxis spiral around the center.
    #[instrument(level = "debug", skip_all, fields(nodes = ids.len(), links = links.len()))]
    pub fn new<S: AsRef<str>>(
        ids: &[S],
        links: &[(S, S)],
        config: ForceConfig,
    ) -> Result<Self, DomainError> {
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_ref(), i))
            .collect();
        let lookup = |id: &str| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| DomainError::UnknownGraphNode(id.to_string()))
        };
        let links = links
            .iter()
            .map(|(s, t)| {
                Ok(Link {
                    source: lookup(s.as_ref())?,
                    target: lookup(t.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let mut degree = vec![0usize; ids.len()];
        for link in &links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        let bias = links
            .iter()
            .map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
            .collect();

        let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let nodes = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let radius = 10.0 * (0.5 + i as f64).sqrt();
                let angle = i as f64 * golden_angle;
                ForceNode {
                    id: id.as_ref().to_string(),
                    position: Point::new(radius * angle.cos(), radius * angle.sin()),
                    velocity: Point::ORIGIN,
                    fixed: None,
                }
            })
            .collect();

        Ok(Self {
            alpha_decay: config.alpha_decay(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            nodes,
            links,
            bias,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
            ticks: 0,
        })
    }

    pub fn nodes(&self) -> &[ForceNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&ForceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.node(id).map(|n| n.position)
    }

    /// Link endpoints as current positions.
    pub fn link_segments(&self) -> Vec<(Point, Point)> {
        self.links
            .iter()
            .map(|l| (self.nodes[l.source].position, self.nodes[l.target].position))
            .collect()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// A simulation stops ticking once alpha drops below `alpha_min`.
    pub fn is_settled(&self) -> bool {
        !self.running
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Resume ticking; alpha then moves toward `alpha_target`.
    pub fn restart(&mut self) {
        self.running = true;
    }

    /// Tick until settled or `max_ticks` is reached; returns ticks taken.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.running {
            self.tick();
            taken += 1;
            if self.alpha < self.config.alpha_min {
                self.running = false;
            }
        }
        debug!(taken, alpha = self.alpha, "simulation run");
        taken
    }

    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();
        self.apply_collision();

        let retention = self.config.velocity_retention;
        for node in &mut self.nodes {
            match node.fixed {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Point::ORIGIN;
                }
                None => {
                    node.velocity = Point::new(
                        node.velocity.x * retention,
                        node.velocity.y * retention,
                    );
                    node.position = node.position + node.velocity;
                }
            }
        }
        self.ticks += 1;
        trace!(tick = self.ticks, alpha = self.alpha);
    }

    fn jiggle(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 1e-6
    }

    fn nonzero(&mut self, v: f64) -> f64 {
        if v == 0.0 {
            self.jiggle()
        } else {
            v
        }
    }

    fn apply_links(&mut self) {
        for i in 0..self.links.len() {
            let Link { source, target } = self.links[i];
            let (s, t) = (&self.nodes[source], &self.nodes[target]);
            let dx = t.position.x + t.velocity.x - s.position.x - s.velocity.x;
            let dy = t.position.y + t.velocity.y - s.position.y - s.velocity.y;
            let dx = self.nonzero(dx);
            let dy = self.nonzero(dy);
            let length = (dx * dx + dy * dy).sqrt();
            let factor = (length - self.config.link_distance) / length
                * self.alpha
                * self.config.link_strength;
            let (fx, fy) = (dx * factor, dy * factor);
            let bias = self.bias[i];
            self.nodes[target].velocity.x -= fx * bias;
            self.nodes[target].velocity.y -= fy * bias;
            self.nodes[source].velocity.x += fx * (1.0 - bias);
            self.nodes[source].velocity.y += fy * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self) {
        let n = self.nodes.len();
        let strength = self.config.charge * self.alpha;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = self.nodes[j].position.x - self.nodes[i].position.x;
                let dy = self.nodes[j].position.y - self.nodes[i].position.y;
                let dx = self.nonzero(dx);
                let dy = self.nonzero(dy);
                let mut l = dx * dx + dy * dy;
                // distanceMin of 1 avoids blow-ups for near-coincident nodes
                if l < 1.0 {
                    l = l.sqrt();
                }
                self.nodes[i].velocity.x += dx * strength / l;
                self.nodes[i].velocity.y += dy * strength / l;
            }
        }
    }

    fn apply_center(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let n = self.nodes.len() as f64;
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(x, y), node| (x + node.position.x, y + node.position.y));
        let shift = Point::new(sx / n - self.config.center.x, sy / n - self.config.center.y);
        for node in &mut self.nodes {
            node.position = node.position - shift;
        }
    }

    fn apply_collision(&mut self) {
        let n = self.nodes.len();
        let r = self.config.collide_radius * 2.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.nodes[i], &self.nodes[j]);
                let dx = a.position.x + a.velocity.x - b.position.x - b.velocity.x;
                let dy = a.position.y + a.velocity.y - b.position.y - b.velocity.y;
                let mut l = dx * dx + dy * dy;
                if l >= r * r {
                    continue;
                }
                let dx = self.nonzero(dx);
                let dy = self.nonzero(dy);
                if l == 0.0 {
                    l = dx * dx + dy * dy;
                }
                let l = l.sqrt();
                let push = (r - l) / l;
                // equal radii split the correction evenly
                let (px, py) = (dx * push * 0.5, dy * push * 0.5);
                self.nodes[i].velocity.x += px;
                self.nodes[i].velocity.y += py;
                self.nodes[j].velocity.x -= px;
                self.nodes[j].velocity.y -= py;
            }
        }
    }

    fn index_of(&self, id: &str) -> Result<usize, DomainError> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DomainError::UnknownGraphNode(id.to_string()))
    }

    /// Pin `id` where it is and reheat.
    pub fn drag_start(&mut self, id: &str) -> Result<(), DomainError> {
        let i = self.index_of(id)?;
        self.set_alpha_target(0.3);
        self.restart();
        self.nodes[i].fixed = Some(self.nodes[i].position);
        Ok(())
    }

    /// Move the pin of `id`.
    pub fn drag(&mut self, id: &str, to: Point) -> Result<(), DomainError> {
        let i = self.index_of(id)?;
        self.nodes[i].fixed = Some(to);
        Ok(())
    }

    /// Release the pin of `id` and let the simulation cool.
    pub fn drag_end(&mut self, id: &str) -> Result<(), DomainError> {
        let i = self.index_of(id)?;
        self.set_alpha_target(0.0);
        self.nodes[i].fixed = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Simulation {
        Simulation::new(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c")],
            ForceConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_alpha_decays_below_minimum_and_stops() {
        let mut sim = chain();
        let taken = sim.run(1000);
        assert!(sim.is_settled());
        assert!(taken <= 302, "took {taken} ticks");
        assert_eq!(sim.run(10), 0);
    }

    #[test]
    fn test_positions_stay_finite() {
        let mut sim = chain();
        sim.run(400);
        assert!(sim.nodes().iter().all(|n| n.position.is_finite()));
    }

    #[test]
    fn test_pinned_node_stays_at_pin() {
        let mut sim = chain();
        sim.run(50);
        sim.drag_start("b").unwrap();
        let pin = Point::new(10.0, 20.0);
        sim.drag("b", pin).unwrap();
        for _ in 0..30 {
            sim.tick();
            assert_eq!(sim.position("b"), Some(pin));
        }
        assert_eq!(sim.alpha_target(), 0.3);

        sim.drag_end("b").unwrap();
        assert_eq!(sim.alpha_target(), 0.0);
        assert!(sim.node("b").unwrap().fixed.is_none());
    }

    #[test]
    fn test_drag_start_reheats_settled_simulation() {
        let mut sim = chain();
        sim.run(1000);
        let cold = sim.alpha();
        sim.drag_start("a").unwrap();
        assert!(!sim.is_settled());
        sim.run(20);
        assert!(sim.alpha() > cold);
        assert!(!sim.is_settled());
    }

    #[test]
    fn test_unknown_link_endpoint_is_rejected() {
        let result = Simulation::new(&["a"], &[("a", "zz")], ForceConfig::default());
        assert!(matches!(result, Err(DomainError::UnknownGraphNode(id)) if id == "zz"));
    }
}
