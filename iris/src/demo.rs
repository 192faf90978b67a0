//! Analytic demo scene for trying captures without a host engine.
//!
//! A pinhole ray caster over a checkered ground plane (`y = 0`) and a few
//! spheres, lit by one directional light. Renders straight into a
//! [`LinearImage`], so it plugs into [`crate::capture`] as a [`Renderer`].

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::Pose;
use crate::error::Result;
use crate::image::LinearImage;
use crate::render::Renderer;

const HIT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    /// Linear albedo.
    pub color: Vec3,
}

impl Sphere {
    /// Distance along a normalized ray to the nearest hit in front of `origin`.
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let oc = origin - self.center;
        let b = oc.dot(direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        [-b - root, -b + root]
            .into_iter()
            .find(|&t| t > HIT_EPSILON)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerScene {
    /// Vertical field of view in degrees.
    pub vertical_fov: f32,
    /// Edge length of one checker square in world units.
    pub checker_size: f32,
    pub spheres: Vec<Sphere>,
    /// Direction the light travels in.
    pub light_direction: Vec3,
    pub sky_color: Vec3,
}

impl Default for CheckerScene {
    fn default() -> Self {
        Self {
            vertical_fov: 40.0,
            checker_size: 0.5,
            spheres: vec![
                Sphere {
                    center: Vec3::new(-0.6, 0.25, 1.0),
                    radius: 0.25,
                    color: Vec3::new(0.8, 0.1, 0.1),
                },
                Sphere {
                    center: Vec3::new(0.0, 0.4, 2.5),
                    radius: 0.4,
                    color: Vec3::new(0.1, 0.6, 0.15),
                },
                Sphere {
                    center: Vec3::new(1.2, 0.8, 6.0),
                    radius: 0.8,
                    color: Vec3::new(0.15, 0.25, 0.9),
                },
            ],
            light_direction: Vec3::new(-0.4, -1.0, 0.6),
            sky_color: Vec3::new(0.55, 0.7, 1.0),
        }
    }
}

impl CheckerScene {
    /// Camera framing the default spheres, level with the ground.
    pub fn default_camera() -> Result<Pose> {
        Pose::looking_at(Vec3::new(0.0, 0.6, -1.5), Vec3::new(0.0, 0.4, 2.5), Vec3::Y)
    }

    /// Linear radiance seen along a normalized ray.
    pub fn trace(&self, origin: Vec3, direction: Vec3) -> Vec3 {
        let light = -self.light_direction.normalize_or(Vec3::NEG_Y);

        let nearest_sphere = self
            .spheres
            .iter()
            .filter_map(|s| s.intersect(origin, direction).map(|t| (t, s)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let ground = (direction.y < -HIT_EPSILON)
            .then(|| -origin.y / direction.y)
            .filter(|&t| t > HIT_EPSILON);

        let (point, normal, albedo) = match (nearest_sphere, ground) {
            (Some((t, sphere)), g) if g.is_none_or(|g| t < g) => {
                let point = origin + direction * t;
                (point, (point - sphere.center) / sphere.radius, sphere.color)
            }
            (_, Some(t)) => {
                let point = origin + direction * t;
                (point, Vec3::Y, self.checker(point))
            }
            _ => return self.sky(direction),
        };

        let lit = if self.occluded(point + normal * HIT_EPSILON * 10.0, light) {
            0.0
        } else {
            normal.dot(light).max(0.0)
        };

        albedo * (0.15 + 0.85 * lit)
    }

    fn checker(&self, point: Vec3) -> Vec3 {
        let size = self.checker_size.max(f32::EPSILON);
        let parity = ((point.x / size).floor() as i64 + (point.z / size).floor() as i64) & 1;
        if parity == 0 {
            Vec3::splat(0.8)
        } else {
            Vec3::splat(0.1)
        }
    }

    fn sky(&self, direction: Vec3) -> Vec3 {
        let t = 0.5 * (direction.y + 1.0);
        Vec3::ONE.lerp(self.sky_color, t)
    }

    fn occluded(&self, origin: Vec3, towards_light: Vec3) -> bool {
        self.spheres
            .iter()
            .any(|s| s.intersect(origin, towards_light).is_some())
    }
}

impl Renderer for CheckerScene {
    fn render(&mut self, pose: &Pose, target: &mut LinearImage) -> anyhow::Result<()> {
        let width = target.width();
        let height = target.height();
        if width == 0 || height == 0 {
            return Ok(());
        }

        let half_height = (self.vertical_fov.to_radians() * 0.5).tan();
        let half_width = half_height * target.desc().aspect();
        let scene = &*self;

        target
            .pixels_mut()
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let v = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let u = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
                    let local = Vec3::new(u * half_width, v * half_height, 1.0).normalize();
                    let color = scene.trace(pose.position, pose.transform_direction(local));
                    *pixel = [color.x, color.y, color.z, 1.0];
                }
            });

        Ok(())
    }
}
