//! Interfaces to the host render engine.

use crate::camera::Pose;
use crate::image::LinearImage;

/// Renders the scene from a camera pose into a linear RGBA target.
///
/// Calls are synchronous: when `render` returns the target holds the finished frame.
pub trait Renderer {
    fn render(&mut self, pose: &Pose, target: &mut LinearImage) -> anyhow::Result<()>;
}

impl<F> Renderer for F
where
    F: FnMut(&Pose, &mut LinearImage) -> anyhow::Result<()>,
{
    fn render(&mut self, pose: &Pose, target: &mut LinearImage) -> anyhow::Result<()> {
        self(pose, target)
    }
}

/// Post-process stack that can be bypassed while sampling and re-applied
/// to the converged image afterwards.
pub trait PostProcessStack {
    fn set_enabled(&mut self, enabled: bool);

    /// Renders `source` as the visible scene content from `pose` through the
    /// enabled stack and returns the processed image. Any temporary scene
    /// objects used for this are released before returning.
    fn render_composite(&mut self, source: &LinearImage, pose: &Pose)
        -> anyhow::Result<LinearImage>;
}
