//! GPU back end: a single-dispatch-per-frame wgpu compute pipeline (§4.5),
//! grounded on `petridecus-viso`'s device/queue setup and the
//! accumulate-and-readback shape in
//! `other_examples/d53888a7_..._progressive_renderer.rs.rs`.

use super::pixel_buffer::PixelBuffer;
use crate::bvh::{Bvh, FlatBvhNode};
use crate::camera::Camera;
use crate::error::GpuError;
use crate::geometry::Primitive;
use crate::material::Material;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

const WORKGROUP_SIZE: u32 = 8;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    look_from: [f32; 4],
    pixel00: [f32; 4],
    pixel_delta_u: [f32; 4],
    pixel_delta_v: [f32; 4],
    defocus_disk_u: [f32; 4],
    defocus_disk_v: [f32; 4],
    defocus_angle_degrees: f32,
    max_depth: u32,
    samples_this_dispatch: u32,
    sample_index_offset: u32,
    image_width: u32,
    image_height: u32,
    base_seed_lo: u32,
    base_seed_hi: u32,
    _pad: u32,
}

/// Matches §6.3's `{center.xyz, radius_or_half_extent, material_kind,
/// albedo.xyz, fuzz_or_ior, _pad}` storage-buffer record.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GpuPrimitive {
    center: [f32; 3],
    radius_or_half_extent: f32,
    material_kind: u32,
    albedo: [f32; 3],
    fuzz_or_ior: f32,
    primitive_kind: u32,
    _pad: [f32; 2],
}

/// Matches §6.3's `{min.xyz, right_child_offset, max.xyz, primitive_count,
/// primitive_offset, split_axis, _pad*2}`.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GpuBvhNode {
    min: [f32; 3],
    right_child_offset: u32,
    max: [f32; 3],
    primitive_count: u32,
    primitive_offset: u32,
    split_axis: u32,
    _pad: [f32; 2],
}

fn pack_primitive(primitive: &Primitive) -> GpuPrimitive {
    let (primitive_kind, center, radius_or_half_extent, material) = match primitive {
        Primitive::Sphere {
            center,
            radius,
            material,
        } => (0u32, *center, *radius, material),
        Primitive::Cube {
            center,
            half_extent,
            material,
        } => (1u32, *center, *half_extent, material),
    };
    let (material_kind, albedo, fuzz_or_ior) = match *material {
        Material::Lambertian { albedo } => (0u32, albedo, 0.0),
        Material::Metallic { albedo, fuzz } => (1u32, albedo, fuzz),
        Material::Dielectric { eta } => (2u32, crate::math::Color::zero(), eta),
    };
    GpuPrimitive {
        center: [center.x, center.y, center.z],
        radius_or_half_extent,
        material_kind,
        albedo: [albedo.x, albedo.y, albedo.z],
        fuzz_or_ior,
        primitive_kind,
        _pad: [0.0; 2],
    }
}

fn pack_bvh_node(node: &FlatBvhNode) -> GpuBvhNode {
    GpuBvhNode {
        min: [node.bbox_min.x, node.bbox_min.y, node.bbox_min.z],
        right_child_offset: node.second_child_offset,
        max: [node.bbox_max.x, node.bbox_max.y, node.bbox_max.z],
        primitive_count: node.primitive_count,
        primitive_offset: node.first_primitive_or_negative.max(0) as u32,
        split_axis: node.split_axis,
        _pad: [0.0; 2],
    }
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    accumulation_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
    camera: Camera,
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    base_seed: u64,
    samples_done: u32,
}

impl GpuBackend {
    /// Requests an adapter/device, compiles the kernel, and uploads the
    /// read-only primitive and flat-BVH buffers once (§4.5, §6.3). Any
    /// failure here is recoverable: the caller falls back to the CPU
    /// back end (§4.5 "Fallback", §7).
    pub fn start(
        camera: Camera,
        primitives: &[Primitive],
        width: u32,
        height: u32,
        samples_per_pixel: u32,
        max_depth: u32,
        base_seed: u64,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pathtracer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| GpuError::DeviceRequestFailed(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pathtrace-kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/pathtrace.wgsl").into()),
        });

        let bvh = Bvh::build(primitives);
        let gpu_primitives: Vec<GpuPrimitive> = bvh
            .primitive_order
            .iter()
            .map(|&i| pack_primitive(&primitives[i]))
            .collect();
        let gpu_nodes: Vec<GpuBvhNode> = bvh.nodes.iter().map(pack_bvh_node).collect();

        let camera_uniform = build_camera_uniform(
            &camera,
            width,
            height,
            max_depth,
            base_seed,
            0,
            1,
        );
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytemuck::bytes_of(&camera_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let primitive_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("primitive-storage"),
            contents: bytemuck::cast_slice(&gpu_primitives),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let bvh_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bvh-storage"),
            contents: bytemuck::cast_slice(&gpu_nodes),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let pixel_count = (width as u64) * (height as u64);
        let accumulation_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulation-image"),
            size: pixel_count * 16, // rgba32f
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback-staging"),
            size: pixel_count * 16,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pathtrace-bind-group-layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                uniform_entry(3),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pathtrace-bind-group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: primitive_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: bvh_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: accumulation_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: camera_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pathtrace-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pathtrace-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Ok(GpuBackend {
            device,
            queue,
            pipeline,
            bind_group,
            camera_buffer,
            accumulation_buffer,
            readback_buffer,
            camera,
            width,
            height,
            samples_per_pixel,
            max_depth,
            base_seed,
            samples_done: 0,
        })
    }

    /// Adds exactly one sample per pixel per call (§4.5 "Concurrency
    /// contract"). A no-op once `samples_per_pixel` has been reached.
    pub fn dispatch_one_sample(&mut self) {
        if self.samples_done >= self.samples_per_pixel {
            return;
        }

        let uniform = build_camera_uniform(
            &self.camera,
            self.width,
            self.height,
            self.max_depth,
            self.base_seed,
            self.samples_done,
            1,
        );
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathtrace-dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("pathtrace-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            let groups_x = self.width.div_ceil(WORKGROUP_SIZE);
            let groups_y = self.height.div_ceil(WORKGROUP_SIZE);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.queue.submit(Some(encoder.finish()));
        self.samples_done += 1;
    }

    pub fn progress(&self) -> f32 {
        if self.samples_per_pixel == 0 {
            return 1.0;
        }
        self.samples_done as f32 / self.samples_per_pixel as f32
    }

    /// Copies the accumulation buffer to host memory and gamma-encodes it
    /// into `buffer`, matching the CPU path's quantization exactly (§4.5
    /// "Readback", §4.6).
    pub fn readback(&self, buffer: &PixelBuffer) {
        let pixel_count = (self.width as u64) * (self.height as u64);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathtrace-readback-copy"),
            });
        encoder.copy_buffer_to_buffer(
            &self.accumulation_buffer,
            0,
            &self.readback_buffer,
            0,
            pixel_count * 16,
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = self.readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .expect("map_async callback dropped without firing")
            .expect("failed to map GPU readback buffer");

        let data = slice.get_mapped_range();
        let samples = self.samples_done.max(1) as f32;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = ((y * self.width + x) as usize) * 16;
                let r = f32::from_le_bytes(data[idx..idx + 4].try_into().unwrap());
                let g = f32::from_le_bytes(data[idx + 4..idx + 8].try_into().unwrap());
                let b = f32::from_le_bytes(data[idx + 8..idx + 12].try_into().unwrap());
                buffer.write(x, y, crate::math::Color::new(r, g, b) / samples);
            }
        }
        drop(data);
        self.readback_buffer.unmap();
    }

    /// Waits for any in-flight dispatch to drain before returning (§9 open
    /// question, resolved: the GPU back end waits like the CPU path).
    pub fn finish(self) {
        self.device.poll(wgpu::Maintain::Wait);
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn build_camera_uniform(
    camera: &Camera,
    width: u32,
    height: u32,
    max_depth: u32,
    base_seed: u64,
    sample_index_offset: u32,
    samples_this_dispatch: u32,
) -> CameraUniform {
    let v4 = |v: crate::math::Vec3f| [v.x, v.y, v.z, 0.0];
    CameraUniform {
        look_from: v4(camera.origin()),
        pixel00: v4(camera.pixel00_location()),
        pixel_delta_u: v4(camera.pixel_delta_u()),
        pixel_delta_v: v4(camera.pixel_delta_v()),
        defocus_disk_u: v4(camera.defocus_disk_u()),
        defocus_disk_v: v4(camera.defocus_disk_v()),
        defocus_angle_degrees: camera.defocus_angle_degrees(),
        max_depth,
        samples_this_dispatch,
        sample_index_offset,
        image_width: width,
        image_height: height,
        base_seed_lo: base_seed as u32,
        base_seed_hi: (base_seed >> 32) as u32,
        _pad: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::math::{Color, Point3};

    #[test]
    fn pack_primitive_preserves_sphere_geometry() {
        let prim = Primitive::sphere(
            Point3::new(1.0, 2.0, 3.0),
            0.5,
            Material::lambertian(Color::new(0.1, 0.2, 0.3)),
        );
        let packed = pack_primitive(&prim);
        assert_eq!(packed.center, [1.0, 2.0, 3.0]);
        assert_eq!(packed.radius_or_half_extent, 0.5);
        assert_eq!(packed.primitive_kind, 0);
        assert_eq!(packed.material_kind, 0);
    }

    #[test]
    fn gpu_primitive_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<GpuPrimitive>(), 48);
        assert_eq!(std::mem::size_of::<GpuBvhNode>(), 48);
    }

    #[test]
    fn camera_uniform_carries_the_camera_s_own_defocus_angle() {
        let config = CameraConfig {
            defocus_angle_degrees: 0.6,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        let uniform = build_camera_uniform(&camera, 16, 9, 10, 1, 0, 1);
        assert_eq!(uniform.defocus_angle_degrees, 0.6);
    }
}
