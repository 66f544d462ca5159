//! Concurrent CPU/GPU path-tracing render core, exposed as a non-blocking
//! session: build a scene (camera + primitives), call [`Session::start`],
//! poll [`Session::progress`] and [`Session::readback`] from a host loop,
//! then [`Session::finish`].

pub mod bvh;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod material;
pub mod math;
pub mod presets;
pub mod rng;
pub mod scene;
pub mod session;

pub use camera::{Camera, CameraConfig};
pub use error::{GpuError, RenderError};
pub use geometry::{HitRecord, Primitive};
pub use material::Material;
pub use math::{Color, Point3, Ray, Vec3f};
pub use session::Session;
