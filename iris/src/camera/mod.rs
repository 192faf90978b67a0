//! Camera pose and thin-lens jitter.
//!
//! Camera-local axes follow the usual render-engine convention: +X right,
//! +Y up, +Z forward. A jittered camera is moved across the lens plane
//! (local XY) and re-aimed at a fixed focal point, so geometry on the focal
//! plane stays put between samples while everything else smears.


use glam::{Mat3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampling::DiskSample;

/// Minimum `|forward x up|` for a look rotation to be well defined.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Camera position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Result<Self> {
        Ok(Self {
            position,
            orientation: look_rotation(target - position, up)?,
        })
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Rotates a camera-local direction into world space.
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }
}

/// Physical lens description used to size the aperture disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensParameters {
    /// Sensor size in millimetres.
    pub sensor_size: f32,
    /// Aperture as an f-number.
    pub f_number: f32,
    /// Output width over height.
    pub aspect: f32,
}

impl LensParameters {
    /// Lens-plane offset (world units) for a disk sample.
    ///
    /// The vertical axis is additionally stretched by the aspect ratio.
    pub fn offset(&self, sample: DiskSample) -> Vec2 {
        let scaled = sample.vec() * (self.sensor_size * 1e-3) / self.f_number;
        Vec2::new(scaled.x, scaled.y * self.aspect)
    }
}

/// What the camera focuses on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalTarget {
    /// Distance along the camera's forward axis.
    Distance(f32),
    /// A world-space point; the focal plane passes through it.
    Point(Vec3),
}

impl FocalTarget {
    /// Distance from the camera to the focal plane.
    pub fn distance(&self, pose: &Pose) -> f32 {
        match *self {
            FocalTarget::Distance(distance) => distance,
            FocalTarget::Point(point) => point.distance(pose.position),
        }
    }

    /// The fixed world-space point every jittered camera aims at.
    pub fn resolve(&self, pose: &Pose) -> Vec3 {
        pose.position + pose.forward() * self.distance(pose)
    }
}

/// Rotation whose +Z axis points along `forward` and whose +Y axis lies in
/// the plane of `forward` and `up`.
///
/// Fails with [`Error::DegenerateGeometry`] when `forward` is zero or
/// parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Result<Quat> {
    let z = forward.try_normalize().ok_or(Error::DegenerateGeometry)?;
    let up = up.try_normalize().ok_or(Error::DegenerateGeometry)?;

    let x = up.cross(z);
    if x.length() < DEGENERATE_EPSILON {
        return Err(Error::DegenerateGeometry);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Ok(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Moves the camera by `offset` in its own lens plane and re-aims it at `focal_point`.
pub fn jittered_pose(original: &Pose, offset: Vec2, focal_point: Vec3, up: Vec3) -> Result<Pose> {
    let position = original.position + original.transform_direction(offset.extend(0.0));
    let orientation = look_rotation(focal_point - position, up)?;

    Ok(Pose {
        position,
        orientation,
    })
}
