//! Camera model: pinhole with thin-lens defocus (§3 "Camera", §4.2).
//!
//! Holds intrinsics and the lens; `generate_ray` produces a jittered primary
//! ray for a pixel sample. All derived quantities (`pixel00`, per-pixel
//! deltas, defocus-disk radii) are recomputed whenever the intrinsics change
//! via [`Camera::new`]; there is no incremental-update path.

use crate::math::{sample_square, Point3, Ray, Vec3f};
use rand_core::RngCore;

/// User-facing camera intrinsics (§3 "Camera").
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3f,
    pub vfov_degrees: f32,
    /// Degrees, not radians. An explicit decision recorded in DESIGN.md
    /// resolving the source's ambiguity between the two. Default 0.0.
    pub defocus_angle_degrees: f32,
    pub focus_distance: f32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3f::unit_y(),
            vfov_degrees: 40.0,
            defocus_angle_degrees: 0.0,
            focus_distance: 3.0,
            samples_per_pixel: 16,
            max_depth: 10,
        }
    }
}

impl CameraConfig {
    /// A configuration error per §7: a zero-length `look_from - look_at`
    /// makes the orthonormal basis undefined, and a non-positive resolution
    /// or sample count can never produce an image.
    pub fn is_degenerate(&self) -> bool {
        (self.look_from - self.look_at).length_squared() < 1e-12
            || self.image_width == 0
            || self.image_height == 0
            || self.samples_per_pixel == 0
    }
}

/// The camera's derived render-time state (§3 "Derived").
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Point3,
    pixel00_location: Point3,
    pixel_delta_u: Vec3f,
    pixel_delta_v: Vec3f,
    defocus_disk_u: Vec3f,
    defocus_disk_v: Vec3f,
    defocus_angle_degrees: f32,
    u: Vec3f,
    v: Vec3f,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let aspect_ratio = config.image_width as f32 / config.image_height as f32;
        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_distance;
        let viewport_width = viewport_height * aspect_ratio;

        let w = (config.look_from - config.look_at).unit_vector();
        let u = config.vup.cross(w).unit_vector();
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;

        let pixel_delta_u = viewport_u / config.image_width as f32;
        let pixel_delta_v = viewport_v / config.image_height as f32;

        let viewport_upper_left =
            config.look_from - w * config.focus_distance - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_location = viewport_upper_left + (pixel_delta_u + pixel_delta_v) * 0.5;

        let defocus_radius =
            config.focus_distance * (config.defocus_angle_degrees.to_radians() / 2.0).tan();

        Camera {
            origin: config.look_from,
            pixel00_location,
            pixel_delta_u,
            pixel_delta_v,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            defocus_angle_degrees: config.defocus_angle_degrees,
            u,
            v,
        }
    }

    /// Generates a jittered primary ray through pixel `(px, py)` (§4.2).
    pub fn generate_ray(&self, px: u32, py: u32, rng: &mut dyn RngCore) -> Ray {
        let jitter = sample_square(rng);
        let pixel_sample = self.pixel00_location
            + self.pixel_delta_u * (px as f32 + jitter.x)
            + self.pixel_delta_v * (py as f32 + jitter.y);

        let origin = if self.defocus_angle_degrees <= 0.0 {
            self.origin
        } else {
            let p = Vec3f::random_in_unit_disk(rng);
            self.origin + self.defocus_disk_u * p.x + self.defocus_disk_v * p.y
        };

        Ray::new(origin, pixel_sample - origin)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn pixel00_location(&self) -> Point3 {
        self.pixel00_location
    }

    pub fn pixel_delta_u(&self) -> Vec3f {
        self.pixel_delta_u
    }

    pub fn pixel_delta_v(&self) -> Vec3f {
        self.pixel_delta_v
    }

    pub fn defocus_disk_u(&self) -> Vec3f {
        self.defocus_disk_u
    }

    pub fn defocus_disk_v(&self) -> Vec3f {
        self.defocus_disk_v
    }

    pub fn basis_u(&self) -> Vec3f {
        self.u
    }

    pub fn basis_v(&self) -> Vec3f {
        self.v
    }

    pub fn defocus_angle_degrees(&self) -> f32 {
        self.defocus_angle_degrees
    }
}
