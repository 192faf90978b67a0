use std::path::Path;
use std::sync::mpsc;

use wgpu::util::DeviceExt;

use super::pipeline::{GpuAccumulatePipeline, ACCUMULATE_SHADER};
use super::{check_frame, tile_count, AccumulationKernel, Accumulator};
use crate::error::{Error, Result};
use crate::gpu::Gpu;
use crate::image::{ImageDesc, LinearImage, Rgba};

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    weight: f32,
    _padding: u32,
}

/// Accumulation kernel running as a wgpu compute shader.
#[derive(Debug)]
pub struct GpuAccumulationKernel {
    gpu: Gpu,
    pipeline: GpuAccumulatePipeline,
}

impl GpuAccumulationKernel {
    /// Compiles the built-in kernel.
    pub fn new(gpu: &Gpu) -> Result<Self> {
        Self::with_source(gpu, ACCUMULATE_SHADER)
    }

    /// Compiles a kernel from WGSL source with the same bindings as the built-in one.
    pub fn with_source(gpu: &Gpu, source: &str) -> Result<Self> {
        let pipeline = GpuAccumulatePipeline::new(gpu, source)?;

        Ok(Self {
            gpu: gpu.clone(),
            pipeline,
        })
    }

    /// Loads and compiles a kernel from a WGSL file.
    pub fn from_file<P: AsRef<Path>>(gpu: &Gpu, path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::ResourceMissing(format!(
                "accumulation kernel '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::with_source(gpu, &source)
    }
}

impl AccumulationKernel for GpuAccumulationKernel {
    fn name(&self) -> &str {
        "gpu"
    }

    fn allocate(&self, desc: ImageDesc, weight: f32) -> Result<Box<dyn Accumulator + '_>> {
        let device = self.gpu.device();
        let size = desc.size_in_bytes() as u64;

        let max_binding = device.limits().max_storage_buffer_binding_size as u64;
        if size > max_binding {
            return Err(Error::Gpu(format!(
                "{} needs {} bytes per buffer, device allows {}",
                desc, size, max_binding
            )));
        }

        tracing::debug!("Allocating GPU accumulator {} (weight {})", desc, weight);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulate_frame_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sum_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulate_sum_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = Params {
            width: desc.width,
            height: desc.height,
            weight,
            _padding: 0,
        };

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("accumulate_params_buffer"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("accumulate_bind_group"),
            layout: &self.pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: sum_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("accumulate_clear_encoder"),
        });
        encoder.clear_buffer(&sum_buffer, 0, None);
        self.gpu.queue().submit(std::iter::once(encoder.finish()));

        Ok(Box::new(GpuAccumulator {
            kernel: self,
            desc,
            frame_buffer,
            sum_buffer,
            params_buffer,
            bind_group,
            frame_count: 0,
        }))
    }
}

/// Device-resident frame and sum buffers for one capture.
#[derive(Debug)]
struct GpuAccumulator<'a> {
    kernel: &'a GpuAccumulationKernel,
    desc: ImageDesc,
    frame_buffer: wgpu::Buffer,
    sum_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    frame_count: u32,
}

impl Accumulator for GpuAccumulator<'_> {
    fn desc(&self) -> ImageDesc {
        self.desc
    }

    fn accumulate(&mut self, frame: &LinearImage) -> Result<()> {
        check_frame(self.desc, frame)?;
        if self.desc.is_empty() {
            return Ok(());
        }

        let gpu = &self.kernel.gpu;
        gpu.queue().write_buffer(&self.frame_buffer, 0, frame.bytes());

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("accumulate_encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("accumulate_pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.kernel.pipeline.compute_pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);

            let (groups_x, groups_y) = tile_count(self.desc);
            compute_pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        gpu.queue().submit(std::iter::once(encoder.finish()));

        // The next sample's render reuses the frame, so the dispatch has to finish first.
        gpu.wait()?;
        self.frame_count += 1;

        Ok(())
    }

    fn frame_count(&self) -> u32 {
        self.frame_count
    }

    fn resolve(&self) -> Result<LinearImage> {
        let gpu = &self.kernel.gpu;
        let size = self.desc.size_in_bytes() as u64;
        if size == 0 {
            return Ok(LinearImage::new_empty(self.desc));
        }

        let staging_buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulate_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("accumulate_download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.sum_buffer, 0, &staging_buffer, 0, size);
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = mpsc::channel();
        let buffer_slice = staging_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        gpu.wait()?;

        receiver
            .recv()
            .map_err(|e| Error::Gpu(format!("buffer map callback dropped: {}", e)))?
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let pixels: Vec<Rgba> = data
            .chunks_exact(std::mem::size_of::<Rgba>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        drop(data);
        staging_buffer.unmap();

        LinearImage::new_with_pixels(self.desc, pixels)
    }
}

impl Drop for GpuAccumulator<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            "Releasing GPU accumulator {} after {} frames",
            self.desc,
            self.frame_count
        );
        self.frame_buffer.destroy();
        self.sum_buffer.destroy();
        self.params_buffer.destroy();
    }
}
