//! Scene input (§6.2): a camera plus a primitive list, already-decoded.
//!
//! The core never opens files; this module only defines the shape of the
//! data it accepts. The CLI binary is the "scene collaborator" that decodes
//! a TOML file (or builds a preset in code) into this shape before calling
//! [`crate::session::Session::start`].

use crate::camera::CameraConfig;
use crate::geometry::Primitive;
use crate::material::Material;
use crate::math::{Color, Point3};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    pub camera: CameraConfigDesc,
    pub primitive: Vec<PrimitiveDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfigDesc {
    pub image_width: u32,
    pub image_height: u32,
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    #[serde(default = "default_vup")]
    pub vup: [f32; 3],
    pub vfov_degrees: f32,
    #[serde(default)]
    pub defocus_angle_degrees: f32,
    pub focus_distance: f32,
    #[serde(default = "default_samples_per_pixel")]
    pub samples_per_pixel: u32,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_vup() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_samples_per_pixel() -> u32 {
    16
}

fn default_max_depth() -> u32 {
    10
}

impl From<&CameraConfigDesc> for CameraConfig {
    fn from(desc: &CameraConfigDesc) -> Self {
        CameraConfig {
            image_width: desc.image_width,
            image_height: desc.image_height,
            look_from: Point3::new(desc.look_from[0], desc.look_from[1], desc.look_from[2]),
            look_at: Point3::new(desc.look_at[0], desc.look_at[1], desc.look_at[2]),
            vup: Point3::new(desc.vup[0], desc.vup[1], desc.vup[2]),
            vfov_degrees: desc.vfov_degrees,
            defocus_angle_degrees: desc.defocus_angle_degrees,
            focus_distance: desc.focus_distance,
            samples_per_pixel: desc.samples_per_pixel,
            max_depth: desc.max_depth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimitiveDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
        material: MaterialDesc,
    },
    Cube {
        center: [f32; 3],
        half_extent: f32,
        material: MaterialDesc,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian { albedo: [f32; 3] },
    Metallic { albedo: [f32; 3], fuzz: f32 },
    Dielectric { eta: f32 },
}

impl From<&MaterialDesc> for Material {
    fn from(desc: &MaterialDesc) -> Self {
        match *desc {
            MaterialDesc::Lambertian { albedo } => {
                Material::lambertian(Color::new(albedo[0], albedo[1], albedo[2]))
            }
            MaterialDesc::Metallic { albedo, fuzz } => {
                Material::metallic(Color::new(albedo[0], albedo[1], albedo[2]), fuzz)
            }
            MaterialDesc::Dielectric { eta } => Material::dielectric(eta),
        }
    }
}

impl From<&PrimitiveDesc> for Primitive {
    fn from(desc: &PrimitiveDesc) -> Self {
        match desc {
            PrimitiveDesc::Sphere {
                center,
                radius,
                material,
            } => Primitive::sphere(
                Point3::new(center[0], center[1], center[2]),
                *radius,
                material.into(),
            ),
            PrimitiveDesc::Cube {
                center,
                half_extent,
                material,
            } => Primitive::cube(
                Point3::new(center[0], center[1], center[2]),
                *half_extent,
                material.into(),
            ),
        }
    }
}

/// Parses a TOML scene description into camera config + primitives, the
/// already-decoded values the core's [`crate::session::Session::start`]
/// expects.
pub fn load_toml(text: &str) -> Result<(CameraConfig, Vec<Primitive>), toml::de::Error> {
    let file: SceneFile = toml::from_str(text)?;
    let camera = CameraConfig::from(&file.camera);
    let primitives = file.primitive.iter().map(Primitive::from).collect();
    Ok((camera, primitives))
}
