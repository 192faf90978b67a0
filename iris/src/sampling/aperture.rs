use glam::{DVec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::hammersley::hammersley;

/// Source of aperture sample positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SamplingMode {
    /// Uniform pseudo-random points drawn directly inside the disk.
    Random,
    /// Hammersley points on the square, rejected outside the disk.
    #[default]
    Hammersley,
}

/// A point inside the closed unit disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSample(Vec2);

impl DiskSample {
    /// Returns `None` if the point lies outside the unit disk.
    pub fn new(x: f32, y: f32) -> Option<Self> {
        let v = Vec2::new(x, y);
        (v.length() <= 1.0).then_some(Self(v))
    }

    pub fn vec(&self) -> Vec2 {
        self.0
    }
}

/// Result of drawing one aperture sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Accepted(DiskSample),
    /// The point fell outside the unit disk. Its index is consumed.
    Rejected,
}

impl SampleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted(_))
    }
}

/// Maps a point of `[0, 1)^2` onto `[-1, 1)^2`.
#[inline]
pub fn unit_square_to_centered(point: (f64, f64)) -> DVec2 {
    DVec2::new(point.0, point.1) * 2.0 - DVec2::ONE
}

/// Keeps a point of `[-1, 1)^2` if it lies inside the closed unit disk.
#[inline]
pub fn square_to_disk(point: DVec2) -> SampleOutcome {
    if point.length() > 1.0 {
        SampleOutcome::Rejected
    } else {
        SampleOutcome::Accepted(DiskSample(point.as_vec2()))
    }
}

/// Produces aperture samples for a capture of a fixed number of samples.
///
/// Hammersley mode rejects points of the square that fall outside the disk,
/// random mode draws inside the disk and never rejects.
#[derive(Debug)]
pub struct ApertureSampler {
    mode: SamplingMode,
    rng: StdRng,
}

impl ApertureSampler {
    /// Creates a sampler. `seed` makes random mode reproducible; `None` seeds from the OS.
    pub fn new(mode: SamplingMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { mode, rng }
    }

    /// Draws the sample for index `i` of `n`.
    pub fn next(&mut self, i: u32, n: u32) -> SampleOutcome {
        match self.mode {
            SamplingMode::Hammersley => square_to_disk(unit_square_to_centered(hammersley(i, n))),
            SamplingMode::Random => SampleOutcome::Accepted(DiskSample(self.inside_unit_disk())),
        }
    }

    fn inside_unit_disk(&mut self) -> Vec2 {
        let radius = self.rng.random::<f64>().sqrt();
        let theta = self.rng.random::<f64>() * std::f64::consts::TAU;
        DVec2::new(radius * theta.cos(), radius * theta.sin()).as_vec2()
    }
}
