//! Capture pipeline: jitter, render, accumulate, recomposite, encode.
//!
//! [`capture`] drives one depth-of-field capture through the states of
//! [`CaptureState`]. All engine-facing work goes through the collaborators in
//! [`CaptureContext`]; the function itself holds no state between calls.

mod config;
#[cfg(test)]
mod tests;

pub use config::{CaptureConfig, Resolution};

use std::path::PathBuf;

use glam::{Vec2, Vec3};

use crate::accumulate::{check_frame, AccumulationKernel};
use crate::camera::{jittered_pose, LensParameters, Pose};
use crate::color::to_display;
use crate::encode::{encode_png, persist, FileSystem};
use crate::error::{Error, Result};
use crate::image::LinearImage;
use crate::progress::ProgressReporter;
use crate::render::{PostProcessStack, Renderer};
use crate::sampling::{ApertureSampler, SampleOutcome};

/// Pipeline state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CaptureState {
    Idle,
    Setup,
    Sampling,
    Recomposite,
    ColorConvert,
    Encode,
    Cleanup,
}

/// Host collaborators for one capture.
pub struct CaptureContext<'a> {
    /// The camera pose; overwritten per sample and restored before returning.
    pub camera: &'a mut Pose,
    pub renderer: &'a mut dyn Renderer,
    /// `None` aborts the capture with [`Error::ResourceMissing`].
    pub kernel: Option<&'a dyn AccumulationKernel>,
    pub post_process: Option<&'a mut dyn PostProcessStack>,
    pub progress: &'a dyn ProgressReporter,
    pub file_system: &'a dyn FileSystem,
}

/// Summary of a finished capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub requested: u32,
    /// Samples rendered and accumulated.
    pub accepted: u32,
    /// Samples outside the aperture disk.
    pub rejected: u32,
    /// Samples skipped because no camera orientation could be built.
    pub degenerate: u32,
    /// Where the PNG was written; `None` for [`capture_image`].
    pub output_path: Option<PathBuf>,
}

impl CaptureReport {
    fn new(requested: u32) -> Self {
        Self {
            requested,
            accepted: 0,
            rejected: 0,
            degenerate: 0,
            output_path: None,
        }
    }

    /// Fraction of full exposure in the result.
    ///
    /// Every accepted sample is weighted `1 / requested`, so rejected and
    /// skipped samples darken the image by this factor.
    pub fn energy_fraction(&self) -> f32 {
        if self.requested == 0 {
            return 0.0;
        }
        self.accepted as f32 / self.requested as f32
    }
}

/// Runs a full capture and writes the PNG to `config.output_path`.
pub fn capture(config: &CaptureConfig, mut ctx: CaptureContext<'_>) -> Result<CaptureReport> {
    let progress = ProgressGuard::new(ctx.progress);
    let (image, mut report) = run(config, &mut ctx, &progress)?;

    enter(CaptureState::Encode);
    progress.update("Encoding image", 1.0);
    let bytes = encode_png(&image)?;
    persist(ctx.file_system, &config.output_path, &bytes)?;
    report.output_path = Some(config.output_path.clone());

    enter(CaptureState::Cleanup);
    drop(progress);
    enter(CaptureState::Idle);

    tracing::info!(
        "Captured {} of {} samples ({} rejected, {} degenerate) to {}",
        report.accepted,
        report.requested,
        report.rejected,
        report.degenerate,
        config.output_path.display()
    );
    Ok(report)
}

/// Runs a capture up to color conversion and returns the display-encoded image.
pub fn capture_image(
    config: &CaptureConfig,
    mut ctx: CaptureContext<'_>,
) -> Result<(LinearImage, CaptureReport)> {
    let progress = ProgressGuard::new(ctx.progress);
    let result = run(config, &mut ctx, &progress)?;

    enter(CaptureState::Cleanup);
    drop(progress);
    enter(CaptureState::Idle);

    Ok(result)
}

fn run(
    config: &CaptureConfig,
    ctx: &mut CaptureContext<'_>,
    progress: &ProgressGuard<'_>,
) -> Result<(LinearImage, CaptureReport)> {
    enter(CaptureState::Setup);
    config.validate()?;

    let samples = config.samples;
    progress.update(&sample_label(0, samples), 0.0);

    let kernel = ctx
        .kernel
        .ok_or_else(|| Error::ResourceMissing("accumulation kernel".to_string()))?;

    let original = *ctx.camera;
    let focal_distance = config.focus.distance(&original);
    if !(focal_distance.is_finite() && focal_distance > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "focal target resolves to distance {}",
            focal_distance
        )));
    }
    let focal_point = config.focus.resolve(&original);

    let desc = config.resolution.desc();
    let lens = LensParameters {
        sensor_size: config.sensor_size,
        f_number: config.aperture,
        aspect: desc.aspect(),
    };

    tracing::info!(
        "Capturing {} {} samples at {} with {} kernel, f/{} focused at {:.3}",
        samples,
        config.sampling,
        desc,
        kernel.name(),
        config.aperture,
        focal_distance
    );

    let mut post_process = match ctx.post_process.as_mut() {
        Some(stack) if config.retain_post_processing => PostProcessGuard::disable(&mut **stack),
        _ => PostProcessGuard::none(),
    };
    if config.retain_post_processing && !post_process.is_active() {
        tracing::warn!("Post processing retention requested without a post-process stack");
    }

    let mut accumulator = kernel.allocate(desc, config.sample_weight())?;
    let mut frame = LinearImage::new_empty(desc);
    let mut sampler = ApertureSampler::new(config.sampling, config.seed);
    let mut report = CaptureReport::new(samples);

    {
        let mut camera = PoseGuard::new(ctx.camera);

        enter(CaptureState::Sampling);
        for i in 0..samples {
            if progress.abort_requested() {
                tracing::info!("Capture aborted after {} of {} samples", i, samples);
                return Err(Error::Aborted {
                    completed: i,
                    total: samples,
                });
            }

            match sampler.next(i, samples) {
                SampleOutcome::Rejected => {
                    tracing::debug!(sample = i, "Sample outside aperture, skipped");
                    report.rejected += 1;
                }
                SampleOutcome::Accepted(sample) => {
                    let offset = lens.offset(sample);
                    match jitter(&original, offset, focal_point) {
                        Some(pose) => {
                            camera.set(pose);
                            ctx.renderer
                                .render(&pose, &mut frame)
                                .map_err(|source| Error::Render { index: i, source })?;
                            accumulator.accumulate(&frame)?;
                            camera.restore();
                            report.accepted += 1;
                        }
                        None => {
                            tracing::warn!(
                                sample = i,
                                "No camera orientation for lens offset {}, sample skipped",
                                offset
                            );
                            report.degenerate += 1;
                        }
                    }
                }
            }

            progress.update(
                &sample_label(i + 1, samples),
                (i + 1) as f32 / samples as f32,
            );
        }
    }

    let converged = accumulator.resolve()?;
    drop(accumulator);
    drop(frame);

    let mut image = match post_process.enable() {
        Some(stack) => {
            enter(CaptureState::Recomposite);
            let composite = stack
                .render_composite(&converged, &original)
                .map_err(Error::Composite)?;
            check_frame(desc, &composite)?;
            composite
        }
        None => converged,
    };
    drop(post_process);

    enter(CaptureState::ColorConvert);
    to_display(&mut image);

    Ok((image, report))
}

/// Jittered pose for `offset`, falling back to the original camera's up axis
/// when the world up axis is parallel to the new view direction.
fn jitter(original: &Pose, offset: Vec2, focal_point: Vec3) -> Option<Pose> {
    match jittered_pose(original, offset, focal_point, Vec3::Y) {
        Ok(pose) => Some(pose),
        Err(_) => jittered_pose(original, offset, focal_point, original.up()).ok(),
    }
}

fn sample_label(i: u32, samples: u32) -> String {
    format!("Capturing image ({} / {})", i, samples)
}

fn enter(state: CaptureState) {
    tracing::debug!(%state, "Capture state");
}

/// Writes the original pose back to the camera on drop.
struct PoseGuard<'a> {
    camera: &'a mut Pose,
    original: Pose,
}

impl<'a> PoseGuard<'a> {
    fn new(camera: &'a mut Pose) -> Self {
        let original = *camera;
        Self { camera, original }
    }

    fn set(&mut self, pose: Pose) {
        *self.camera = pose;
    }

    fn restore(&mut self) {
        *self.camera = self.original;
    }
}

impl Drop for PoseGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Holds a disabled post-process stack and re-enables it on drop.
struct PostProcessGuard<'s, 'a> {
    stack: Option<&'s mut (dyn PostProcessStack + 'a)>,
}

impl<'s, 'a> PostProcessGuard<'s, 'a> {
    fn none() -> Self {
        Self { stack: None }
    }

    fn disable(stack: &'s mut (dyn PostProcessStack + 'a)) -> Self {
        stack.set_enabled(false);
        Self { stack: Some(stack) }
    }

    fn is_active(&self) -> bool {
        self.stack.is_some()
    }

    /// Re-enables the stack and hands it out for the composite render.
    fn enable(&mut self) -> Option<&mut (dyn PostProcessStack + 'a)> {
        let stack = self.stack.take()?;
        stack.set_enabled(true);
        Some(stack)
    }
}

impl Drop for PostProcessGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some(stack) = self.stack.take() {
            stack.set_enabled(true);
        }
    }
}

/// Closes the progress reporter on drop.
struct ProgressGuard<'a> {
    reporter: &'a dyn ProgressReporter,
}

impl<'a> ProgressGuard<'a> {
    fn new(reporter: &'a dyn ProgressReporter) -> Self {
        Self { reporter }
    }

    fn update(&self, label: &str, fraction: f32) {
        self.reporter.update(label, fraction);
    }

    fn abort_requested(&self) -> bool {
        self.reporter.abort_requested()
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.reporter.close();
    }
}
