// Errors
pub use crate::error::{Error, Result};

// Images
pub use crate::image::{ImageDesc, LinearImage, Rgba};

// Sampling and camera
pub use crate::camera::{FocalTarget, LensParameters, Pose};
pub use crate::sampling::{ApertureSampler, DiskSample, SampleOutcome, SamplingMode};

// Accumulation
pub use crate::accumulate::{AccumulationKernel, Accumulator, CpuAccumulationKernel};
#[cfg(feature = "wgpu")]
pub use crate::accumulate::GpuAccumulationKernel;
#[cfg(feature = "wgpu")]
pub use crate::gpu::Gpu;

// Capture
pub use crate::capture::{
    capture, capture_image, CaptureConfig, CaptureContext, CaptureReport, CaptureState, Resolution,
};
pub use crate::demo::{CheckerScene, Sphere};
pub use crate::encode::{FileSystem, StdFileSystem};
pub use crate::progress::{
    CallbackProgress, LogProgress, ProgressCallback, ProgressEvent, ProgressReporter,
};
pub use crate::render::{PostProcessStack, Renderer};
