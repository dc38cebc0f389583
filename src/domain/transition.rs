//! Enter/update/exit transitions between render passes.
//!
//! Time is explicit: every call carries the caller's clock in milliseconds.
//! The animator keeps at most one track per key. Starting a new track while
//! one is in flight begins from the currently displayed position, so the
//! most recent pass always determines where an element comes to rest.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::hierarchy::NodeKey;
use crate::domain::point::Point;

/// Milliseconds on the caller's clock.
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Element appears, growing out of its anchor
    Enter,
    /// Element moves to its new position
    Update,
    /// Element shrinks into its anchor and is removed when done
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub key: NodeKey,
    pub phase: Phase,
    pub from: Point,
    pub to: Point,
    pub start: Millis,
    pub duration: Millis,
}

impl Transition {
    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self, now: Millis) -> f64 {
        if self.duration == 0 || now >= self.start + self.duration {
            return 1.0;
        }
        now.saturating_sub(self.start) as f64 / self.duration as f64
    }

    pub fn position_at(&self, now: Millis) -> Point {
        self.from.lerp(self.to, ease_cubic_in_out(self.progress(now)))
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}

/// Symmetric cubic easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Animator {
    tracks: BTreeMap<NodeKey, Transition>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where `key` is drawn at `now`, `None` if it has no live element.
    pub fn displayed(&self, key: NodeKey, now: Millis) -> Option<Point> {
        let track = self.tracks.get(&key)?;
        if track.phase == Phase::Exit && track.is_finished(now) {
            return None;
        }
        Some(track.position_at(now))
    }

    /// Keys with a live element at `now` (exits still in flight included).
    pub fn live_keys(&self, now: Millis) -> Vec<NodeKey> {
        self.tracks
            .keys()
            .copied()
            .filter(|&k| self.displayed(k, now).is_some())
            .collect()
    }

    /// Start a track for `key`. An element that is still on screen starts from
    /// where it is drawn right now, otherwise from `fallback_from`.
    pub fn start(
        &mut self,
        key: NodeKey,
        phase: Phase,
        fallback_from: Point,
        to: Point,
        now: Millis,
        duration: Millis,
    ) -> Transition {
        let from = self.displayed(key, now).unwrap_or(fallback_from);
        let transition = Transition {
            key,
            phase,
            from,
            to,
            start: now,
            duration,
        };
        self.tracks.insert(key, transition);
        transition
    }

    /// Drop finished exit tracks.
    pub fn prune(&mut self, now: Millis) {
        self.tracks
            .retain(|_, t| !(t.phase == Phase::Exit && t.is_finished(now)));
    }

    pub fn is_idle(&self, now: Millis) -> bool {
        self.tracks.values().all(|t| t.is_finished(now))
    }

    pub fn track(&self, key: NodeKey) -> Option<&Transition> {
        self.tracks.get(&key)
    }
}
