//! Render session lifecycle (§3 "Render session", §4.4-§4.6, §6.1): a
//! non-blocking facade over either a CPU worker pool or a GPU compute
//! back end, unified behind `start`/`progress`/`readback`/`finish`.

mod cpu;
mod gpu;
mod pixel_buffer;
mod tile;

pub use cpu::ray_color;
pub use pixel_buffer::PixelBuffer;
pub use tile::{Tile, TileQueue};

use crate::camera::{Camera, CameraConfig};
use crate::error::RenderError;
use crate::geometry::Primitive;
use cpu::CpuBackend;
use gpu::GpuBackend;
use std::sync::Arc;

enum Backend {
    Cpu(CpuBackend),
    Gpu(Box<GpuBackend>),
}

/// Owns the pixel buffer and whichever back end is rendering into it
/// (§3 "Render session"). Created by [`Session::start`]; consumed by
/// [`Session::finish`].
pub struct Session {
    buffer: Arc<PixelBuffer>,
    backend: Backend,
    width: u32,
    height: u32,
}

impl Session {
    /// Validates `config`, builds the BVH, and starts rendering
    /// immediately without blocking the caller (§6.1). If `prefer_gpu` is
    /// set, a GPU back end is attempted first; any failure falls back to
    /// the CPU back end silently (§4.5 "Fallback", §7) and is logged at
    /// `warn!`.
    pub fn start(
        config: &CameraConfig,
        primitives: Vec<Primitive>,
        thread_count: u32,
        prefer_gpu: bool,
        base_seed: u64,
    ) -> Result<Session, RenderError> {
        if config.is_degenerate() {
            return Err(RenderError::InvalidConfig(
                "camera has zero-length view direction, zero resolution, or zero samples_per_pixel"
                    .to_string(),
            ));
        }
        if primitives.is_empty() {
            log::debug!("starting session with an empty scene (sky-only render)");
        }

        let camera = Camera::new(config);
        let width = config.image_width;
        let height = config.image_height;
        let buffer = Arc::new(PixelBuffer::try_new(width, height)?);

        let backend = if prefer_gpu {
            match GpuBackend::start(
                camera,
                &primitives,
                width,
                height,
                config.samples_per_pixel,
                config.max_depth,
                base_seed,
            ) {
                Ok(gpu) => Backend::Gpu(Box::new(gpu)),
                Err(err) => {
                    log::warn!("GPU back end unavailable ({err}), falling back to CPU");
                    Backend::Cpu(CpuBackend::start(
                        camera,
                        primitives,
                        Arc::clone(&buffer),
                        thread_count,
                        config.samples_per_pixel,
                        config.max_depth,
                        base_seed,
                    ))
                }
            }
        } else {
            Backend::Cpu(CpuBackend::start(
                camera,
                primitives,
                Arc::clone(&buffer),
                thread_count,
                config.samples_per_pixel,
                config.max_depth,
                base_seed,
            ))
        };

        Ok(Session {
            buffer,
            backend,
            width,
            height,
        })
    }

    /// Monotonically non-decreasing fraction in `[0, 1]` (§6.1). On the GPU
    /// back end each call also issues the next sample dispatch, matching
    /// the "single-threaded host issues one compute dispatch per host
    /// frame" contract (§4.5); callers are expected to poll in a loop.
    pub fn progress(&mut self) -> f32 {
        match &mut self.backend {
            Backend::Cpu(cpu) => cpu.progress(),
            Backend::Gpu(gpu) => {
                gpu.dispatch_one_sample();
                gpu.readback(&self.buffer);
                gpu.progress()
            }
        }
    }

    /// Copies the current accumulator into `out`, gamma-encoded RGBA8,
    /// idempotent (§6.1).
    pub fn readback(&self, out: &mut [u8]) {
        assert_eq!(out.len(), (self.width * self.height * 4) as usize);
        self.buffer.readback_rgba8(out);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Blocks until rendering is complete and releases back-end resources
    /// (§6.1, §4.4 "Finish", §4.5 "Finish").
    pub fn finish(self) {
        match self.backend {
            Backend::Cpu(cpu) => cpu.finish(),
            Backend::Gpu(gpu) => gpu.finish(),
        }
    }
}
