//! iris-capture: renders the built-in demo scene with depth of field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use iris::prelude::*;

#[derive(Parser)]
#[command(name = "iris-capture")]
#[command(about = "Capture a depth-of-field image of the demo scene by accumulating jittered renders")]
#[command(version)]
struct Cli {
    /// Capture config (YAML or JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to this path and exit.
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Sampling mode override.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Number of aperture samples.
    #[arg(long)]
    samples: Option<u32>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Aperture f-number.
    #[arg(long)]
    aperture: Option<f32>,

    /// Focal distance along the camera's forward axis.
    #[arg(long)]
    focal_distance: Option<f32>,

    /// Seed for random sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Accumulate on the CPU even when a GPU is available.
    #[arg(long)]
    cpu: bool,

    /// Load the accumulation kernel from a WGSL file instead of the built-in one.
    #[arg(long)]
    kernel: Option<PathBuf>,

    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for log files.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Random,
    Hammersley,
}

impl From<ModeArg> for SamplingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Random => SamplingMode::Random,
            ModeArg::Hammersley => SamplingMode::Hammersley,
        }
    }
}

impl Cli {
    fn capture_config(&self) -> Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => CaptureConfig::load(path)?,
            None => CaptureConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.sampling = mode.into();
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(width) = self.width {
            config.resolution.width = width;
        }
        if let Some(height) = self.height {
            config.resolution.height = height;
        }
        if let Some(aperture) = self.aperture {
            config.aperture = aperture;
        }
        if let Some(distance) = self.focal_distance {
            config.focus = FocalTarget::Distance(distance);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(out) = &self.out {
            config.output_path = out.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    common::log_setup::setup_logging(&cli.log_level, &cli.log_dir, "iris-capture");

    let config = cli.capture_config()?;
    if let Some(path) = &cli.write_config {
        config.save(path)?;
        tracing::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    let kernel = select_kernel(cli.cpu, cli.kernel.as_deref())?;

    let mut scene = CheckerScene::default();
    let mut camera = CheckerScene::default_camera()?;
    let progress = LogProgress::default();

    let report = capture(
        &config,
        CaptureContext {
            camera: &mut camera,
            renderer: &mut scene,
            kernel: Some(kernel.as_ref()),
            post_process: None,
            progress: &progress,
            file_system: &StdFileSystem,
        },
    )
    .context("capture failed")?;

    tracing::info!(
        "Done: {} accepted, {} rejected, energy fraction {:.3}",
        report.accepted,
        report.rejected,
        report.energy_fraction()
    );
    Ok(())
}

#[cfg(feature = "wgpu")]
fn select_kernel(force_cpu: bool, source: Option<&Path>) -> Result<Box<dyn AccumulationKernel>> {
    if force_cpu {
        return Ok(Box::new(CpuAccumulationKernel));
    }

    let gpu = match Gpu::new() {
        Ok(gpu) => gpu,
        Err(e) => {
            tracing::warn!("GPU unavailable ({}), accumulating on the CPU", e);
            return Ok(Box::new(CpuAccumulationKernel));
        }
    };

    let kernel = match source {
        Some(path) => GpuAccumulationKernel::from_file(&gpu, path)?,
        None => GpuAccumulationKernel::new(&gpu)?,
    };
    Ok(Box::new(kernel))
}

#[cfg(not(feature = "wgpu"))]
fn select_kernel(_force_cpu: bool, source: Option<&Path>) -> Result<Box<dyn AccumulationKernel>> {
    if let Some(path) = source {
        anyhow::bail!("kernel {} requires the wgpu feature", path.display());
    }
    Ok(Box::new(CpuAccumulationKernel))
}
