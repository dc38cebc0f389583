//! Scales: functions from a data domain to a visual range.

use crate::domain::error::DomainError;

/// Continuous linear mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        LinearScale::new(self.range, self.domain).scale(pixel)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if count == 0 || hi == lo {
            return vec![lo];
        }
        let step = tick_step(lo, hi, count);
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last)
            .map(|i| round_to_step(i as f64 * step, step))
            .collect()
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor();
    let base = if power >= 0.0 {
        10f64.powi(power as i32)
    } else {
        1.0 / 10f64.powi(-power as i32)
    };
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

fn round_to_step(value: f64, step: f64) -> f64 {
    let decimals = (-step.log10().floor()).max(0.0) as i32;
    let p = 10f64.powi(decimals);
    (value * p).round() / p
}

/// Square-root mapping, used for circle radii so area tracks the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    inner: LinearScale,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new((signed_sqrt(domain.0), signed_sqrt(domain.1)), range),
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        self.inner.scale(signed_sqrt(value))
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

/// Discrete bands over an ordered domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    domain: Vec<K>,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl<K: PartialEq> BandScale<K> {
    /// Band scale with the same inner and outer padding.
    pub fn new(domain: Vec<K>, range: (f64, f64), padding: f64) -> Result<Self, DomainError> {
        Self::with_padding(domain, range, padding, padding)
    }

    /// Point scale: zero-width bands, `padding` at both ends in step units.
    pub fn point(domain: Vec<K>, range: (f64, f64), padding: f64) -> Result<Self, DomainError> {
        Self::with_padding(domain, range, 1.0, padding)
    }

    fn with_padding(
        domain: Vec<K>,
        range: (f64, f64),
        inner: f64,
        outer: f64,
    ) -> Result<Self, DomainError> {
        if domain.is_empty() {
            return Err(DomainError::EmptyDomain("band scale".into()));
        }
        let n = domain.len() as f64;
        let reversed = range.1 < range.0;
        let (lo, hi) = if reversed {
            (range.1, range.0)
        } else {
            range
        };
        let step = (hi - lo) / (n - inner + outer * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n - inner)) * 0.5;
        Ok(Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - inner),
            reversed,
        })
    }

    /// Start of the band for `key`.
    pub fn scale(&self, key: &K) -> Option<f64> {
        let i = self.domain.iter().position(|k| k == key)?;
        let slot = if self.reversed {
            self.domain.len() - 1 - i
        } else {
            i
        };
        Some(self.start + self.step * slot as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }
}

/// Categorical mapping onto a cycling palette.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale<K, V> {
    domain: Vec<K>,
    range: Vec<V>,
}

impl<K: PartialEq, V: Clone> OrdinalScale<K, V> {
    pub fn new(domain: Vec<K>, range: Vec<V>) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, key: &K) -> Option<V> {
        if self.range.is_empty() {
            return None;
        }
        let i = self.domain.iter().position(|k| k == key)?;
        Some(self.range[i % self.range.len()].clone())
    }
}
