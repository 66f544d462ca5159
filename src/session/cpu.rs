//! CPU back end: a tile-queue worker pool (§4.4), grounded on the
//! `Arc<Raytracer>` + per-worker `thread::Builder::spawn` + atomic-progress
//! shape in `other_examples/888a1be0_ArthurMelin-crusty__src-raytracer-mod.rs.rs`.

use super::pixel_buffer::PixelBuffer;
use super::tile::TileQueue;
use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::geometry::Primitive;
use crate::math::{Color, Ray};
use crate::rng::worker_rng;
use rand_core::RngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub struct CpuBackend {
    tiles: Arc<TileQueue>,
    workers: Vec<JoinHandle<()>>,
    done: Arc<AtomicBool>,
}

struct RenderParams {
    camera: Camera,
    primitives: Vec<Primitive>,
    bvh: Bvh,
    samples_per_pixel: u32,
    max_depth: u32,
    base_seed: u64,
}

impl CpuBackend {
    /// Builds the flat BVH, spawns `thread_count` workers, and returns
    /// immediately (§4.4 "Start" is non-blocking).
    pub fn start(
        camera: Camera,
        primitives: Vec<Primitive>,
        buffer: Arc<PixelBuffer>,
        thread_count: u32,
        samples_per_pixel: u32,
        max_depth: u32,
        base_seed: u64,
    ) -> Self {
        let tiles = Arc::new(TileQueue::new(buffer.width, buffer.height));
        let bvh = Bvh::build(&primitives);
        let params = Arc::new(RenderParams {
            camera,
            primitives,
            bvh,
            samples_per_pixel,
            max_depth,
            base_seed,
        });
        let done = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(thread_count as usize);
        for worker_id in 0..thread_count as u64 {
            let tiles = Arc::clone(&tiles);
            let buffer = Arc::clone(&buffer);
            let params = Arc::clone(&params);
            let handle = std::thread::Builder::new()
                .name(format!("pathtracer-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &tiles, &buffer, &params))
                .expect("failed to spawn render worker thread");
            workers.push(handle);
        }

        CpuBackend {
            tiles,
            workers,
            done,
        }
    }

    pub fn progress(&self) -> f32 {
        let total = self.tiles.tile_count();
        if total == 0 {
            return 1.0;
        }
        self.tiles.completed() as f32 / total as f32
    }

    /// Joins all workers (§4.4 "Finish", blocking).
    pub fn finish(mut self) {
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        self.done.store(true, Ordering::SeqCst);
    }
}

fn worker_loop(worker_id: u64, tiles: &TileQueue, buffer: &PixelBuffer, params: &RenderParams) {
    let mut rng = worker_rng(params.base_seed, worker_id);
    let scale = 1.0 / params.samples_per_pixel as f32;

    while let Some(tile) = tiles.claim() {
        for y in tile.y0..tile.y1 {
            for x in tile.x0..tile.x1 {
                let mut sum = Color::zero();
                for _ in 0..params.samples_per_pixel {
                    let ray = params.camera.generate_ray(x, y, &mut rng);
                    sum += ray_color(&ray, params.max_depth, &params.bvh, &params.primitives, &mut rng);
                }
                buffer.write(x, y, sum * scale);
            }
        }
        tiles.mark_completed();
    }
}

/// Recursive Monte-Carlo path trace (§4.2 "Path-trace color"), written as a
/// loop over an attenuation product to avoid stack growth for large
/// `max_depth`.
pub fn ray_color(ray: &Ray, max_depth: u32, bvh: &Bvh, primitives: &[Primitive], rng: &mut dyn RngCore) -> Color {
    let mut current_ray = *ray;
    let mut attenuation_product = Color::ones();
    let mut depth = max_depth;

    loop {
        if depth == 0 {
            return Color::zero();
        }

        match bvh.hit(primitives, &current_ray, 0.001, f32::INFINITY) {
            None => return attenuation_product.hadamard(sky_color(&current_ray)),
            Some(hit) => match hit.material.scatter(&current_ray, &hit, rng) {
                None => return Color::zero(),
                Some((scattered, attenuation)) => {
                    attenuation_product = attenuation_product.hadamard(attenuation);
                    current_ray = scattered;
                    depth -= 1;
                }
            },
        }
    }
}

/// Linear interpolation between white and sky-blue by ray direction's Y
/// component (§4.2).
pub fn sky_color(ray: &Ray) -> Color {
    let unit_direction = ray.direction.unit_vector();
    let t = 0.5 * (unit_direction.y + 1.0);
    Color::ones().lerp(Color::new(0.5, 0.7, 1.0), t)
}
