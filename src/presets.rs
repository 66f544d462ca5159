//! Built-in scene presets, ported from the upstream terminal path tracer's
//! preset gallery (Showcase/Minimal/Stress survive; Cornell/Gallery relied
//! on quad/disk/emissive primitives out of this core's scope, §3.4 of
//! SPEC_FULL.md, and are dropped).

use crate::camera::CameraConfig;
use crate::geometry::Primitive;
use crate::material::Material;
use crate::math::{Color, Point3, Vec3f};
use rand_core::RngCore;

use crate::math::uniform_f32_range;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// The classic "Ray Tracing in One Weekend" random-spheres showcase.
    Showcase,
    /// A single reflective sphere on a ground plane.
    Minimal,
    /// Many random small spheres, for exercising BVH performance.
    Stress,
}

pub struct SceneDescription {
    pub name: &'static str,
    pub primitives: Vec<Primitive>,
    pub camera_config: CameraConfig,
}

impl ScenePreset {
    pub fn build(self, rng: &mut dyn RngCore) -> SceneDescription {
        match self {
            ScenePreset::Showcase => build_showcase(rng),
            ScenePreset::Minimal => build_minimal(),
            ScenePreset::Stress => build_stress(rng),
        }
    }
}

fn build_showcase(rng: &mut dyn RngCore) -> SceneDescription {
    let mut primitives = vec![
        Primitive::sphere(
            Point3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::lambertian(Color::new(0.5, 0.5, 0.5)),
        ),
        Primitive::sphere(Point3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)),
        Primitive::sphere(
            Point3::new(-4.0, 1.0, 0.0),
            1.0,
            Material::lambertian(Color::new(0.7, 0.15, 0.15)),
        ),
        Primitive::sphere(
            Point3::new(4.0, 1.0, 0.0),
            1.0,
            Material::metallic(Color::new(0.85, 0.85, 0.9), 0.0),
        ),
    ];

    for a in -8..8 {
        for b in -8..8 {
            let center = Point3::new(
                a as f32 + 0.9 * uniform_f32_range(rng, 0.0, 1.0),
                0.2,
                b as f32 + 0.9 * uniform_f32_range(rng, 0.0, 1.0),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(-4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(0.0, 0.2, 0.0)).length() < 0.9
            {
                continue;
            }

            let choose_mat = uniform_f32_range(rng, 0.0, 1.0);
            let material = if choose_mat < 0.7 {
                let albedo = Color::new(
                    uniform_f32_range(rng, 0.0, 1.0) * uniform_f32_range(rng, 0.0, 1.0),
                    uniform_f32_range(rng, 0.0, 1.0) * uniform_f32_range(rng, 0.0, 1.0),
                    uniform_f32_range(rng, 0.0, 1.0) * uniform_f32_range(rng, 0.0, 1.0),
                );
                Material::lambertian(albedo)
            } else if choose_mat < 0.9 {
                let albedo = Color::new(
                    uniform_f32_range(rng, 0.5, 1.0),
                    uniform_f32_range(rng, 0.5, 1.0),
                    uniform_f32_range(rng, 0.5, 1.0),
                );
                Material::metallic(albedo, uniform_f32_range(rng, 0.0, 0.3))
            } else {
                Material::dielectric(1.5)
            };
            primitives.push(Primitive::sphere(center, 0.2, material));
        }
    }

    SceneDescription {
        name: "Showcase",
        primitives,
        camera_config: CameraConfig {
            image_width: 160,
            image_height: 80,
            look_from: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::new(0.0, 0.5, 0.0),
            vup: Vec3f::unit_y(),
            vfov_degrees: 20.0,
            defocus_angle_degrees: 0.6,
            focus_distance: 10.0,
            samples_per_pixel: 32,
            max_depth: 16,
        },
    }
}

fn build_minimal() -> SceneDescription {
    let primitives = vec![
        Primitive::sphere(
            Point3::new(0.0, -100.5, -1.0),
            100.0,
            Material::lambertian(Color::new(0.4, 0.4, 0.4)),
        ),
        Primitive::sphere(
            Point3::new(0.0, 0.5, -1.0),
            0.5,
            Material::metallic(Color::new(0.95, 0.95, 0.97), 0.0),
        ),
        Primitive::sphere(
            Point3::new(-1.2, 0.25, -0.5),
            0.25,
            Material::lambertian(Color::new(0.9, 0.2, 0.1)),
        ),
        Primitive::sphere(
            Point3::new(1.0, 0.3, -0.8),
            0.3,
            Material::dielectric(1.5),
        ),
    ];

    SceneDescription {
        name: "Minimal",
        primitives,
        camera_config: CameraConfig {
            image_width: 160,
            image_height: 80,
            look_from: Point3::new(0.0, 1.5, 2.0),
            look_at: Point3::new(0.0, 0.3, -1.0),
            vup: Vec3f::unit_y(),
            vfov_degrees: 40.0,
            defocus_angle_degrees: 0.2,
            focus_distance: 3.0,
            samples_per_pixel: 32,
            max_depth: 16,
        },
    }
}

fn build_stress(rng: &mut dyn RngCore) -> SceneDescription {
    let mut primitives = Vec::new();

    primitives.push(Primitive::sphere(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));

    for _ in 0..500 {
        let center = Point3::new(
            uniform_f32_range(rng, -15.0, 15.0),
            uniform_f32_range(rng, 0.1, 0.4),
            uniform_f32_range(rng, -15.0, 15.0),
        );
        let radius = uniform_f32_range(rng, 0.08, 0.35);
        let albedo = Color::new(
            uniform_f32_range(rng, 0.0, 1.0),
            uniform_f32_range(rng, 0.0, 1.0),
            uniform_f32_range(rng, 0.0, 1.0),
        );
        primitives.push(Primitive::sphere(center, radius, Material::lambertian(albedo)));
    }

    SceneDescription {
        name: "Stress Test (500 spheres)",
        primitives,
        camera_config: CameraConfig {
            image_width: 160,
            image_height: 80,
            look_from: Point3::new(10.0, 4.0, 10.0),
            look_at: Point3::zero(),
            vup: Vec3f::unit_y(),
            vfov_degrees: 30.0,
            defocus_angle_degrees: 0.0,
            focus_distance: 14.0,
            samples_per_pixel: 16,
            max_depth: 10,
        },
    }
}
