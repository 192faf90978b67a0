//! Offline depth-of-field capture.
//!
//! A capture renders the scene many times from a camera jittered across a
//! virtual lens aperture, each time re-aimed at a fixed focal point, and
//! averages the renders. Geometry on the focal plane stays sharp while
//! everything else blurs in proportion to its distance from it.
//!
//! The host engine is reached only through traits: [`render::Renderer`],
//! [`render::PostProcessStack`], [`progress::ProgressReporter`] and
//! [`encode::FileSystem`]. Accumulation runs on the GPU (wgpu compute) or on
//! the CPU (rayon) behind [`accumulate::AccumulationKernel`].

pub mod accumulate;
pub mod camera;
pub mod capture;
pub mod color;
pub mod demo;
pub mod encode;
pub mod error;
#[cfg(feature = "wgpu")]
pub mod gpu;
pub mod image;
pub mod progress;
pub mod render;
pub mod sampling;

pub mod prelude;

pub use error::{Error, Result};
