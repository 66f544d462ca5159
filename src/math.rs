//! Vector/ray math and sampling primitives: the numeric kernel shared by
//! the CPU path tracer, the BVH, and (via `bytemuck`) the GPU uniform and
//! storage buffer layouts.

use rand_core::RngCore;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// A 3-component, 32-bit-float vector used for positions, directions, and
/// linear-RGB colors. `f32` (not `f64`) so the type can be uploaded to the
/// GPU byte-for-byte via `bytemuck`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub type Point3 = Vec3f;
pub type Color = Vec3f;

impl Vec3f {
    #[inline(always)]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline(always)]
    pub fn unit_vector(self) -> Self {
        self / self.length()
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about normal `n`: `I - 2*dot(I, N)*N`.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's-law refraction of a unit vector through `eta_ratio = eta_i / eta_t`.
    /// Returns `None` on total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f32) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    /// Component-wise (Hadamard) product, used for spectral attenuation.
    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    /// True if length² is below 1e-16, used to detect a degenerate
    /// Lambertian scatter direction (§3 material contract).
    #[inline(always)]
    pub fn near_zero(self) -> bool {
        self.length_squared() < 1e-16
    }

    /// Applies this renderer's gamma curve, `x -> sqrt(max(x, 0))`
    /// (an approximation of `x^(1/2.2)`), matching §6.1/§4.6.
    #[inline(always)]
    pub fn linear_to_gamma(self) -> Self {
        Self::new(
            self.x.max(0.0).sqrt(),
            self.y.max(0.0).sqrt(),
            self.z.max(0.0).sqrt(),
        )
    }

    /// Clamps to `[0, 0.999]` and quantizes to `u8(clamped * 256)` per channel.
    #[inline(always)]
    pub fn to_rgba8(self) -> [u8; 4] {
        let clamp = |v: f32| (v.clamp(0.0, 0.999) * 256.0) as u8;
        [clamp(self.x), clamp(self.y), clamp(self.z), 255]
    }

    /// Uniformly distributed unit vector via rejection sampling: draw a
    /// vector with length² in `(1e-12, 1]` inside the unit cube, normalize.
    pub fn random_unit_vector(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(
                uniform_f32_range(rng, -1.0, 1.0),
                uniform_f32_range(rng, -1.0, 1.0),
                uniform_f32_range(rng, -1.0, 1.0),
            );
            let len_sq = v.length_squared();
            if len_sq > 1e-12 && len_sq <= 1.0 {
                return v / len_sq.sqrt();
            }
        }
    }

    /// A point in the unit XY-disk, by rejection in `[-1,1]^2`.
    pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(
                uniform_f32_range(rng, -1.0, 1.0),
                uniform_f32_range(rng, -1.0, 1.0),
                0.0,
            );
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }
}

/// `(u-0.5, v-0.5, 0)` for `u, v ~ U[0,1)`, a pixel-jitter sample (§4.1).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec3f {
    Vec3f::new(uniform_f32(rng) - 0.5, uniform_f32(rng) - 0.5, 0.0)
}

/// `[0, 1)` from the high 53 bits of a `next_u64` divided by 2^53 (§4.1),
/// then narrowed to `f32` for the single-precision accumulator the rest of
/// this module uses.
#[inline]
pub fn uniform_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u64() >> 11) as f32 * (1.0 / (1u64 << 53) as f32)
}

#[inline]
pub fn uniform_f32_range(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * uniform_f32(rng)
}

/// Schlick's approximation to Fresnel reflectance: `R0 + (1-R0)(1-cosθ)^5`,
/// `R0 = ((1-η)/(1+η))²`.
#[inline]
pub fn schlick_reflectance(cosine: f32, eta_ratio: f32) -> f32 {
    let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

impl fmt::Display for Vec3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3f {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3f {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3f {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3f {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3f {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f32) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3f> for f32 {
    type Output = Vec3f;
    #[inline(always)]
    fn mul(self, v: Vec3f) -> Vec3f {
        v * self
    }
}

impl MulAssign<f32> for Vec3f {
    #[inline(always)]
    fn mul_assign(&mut self, t: f32) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f32> for Vec3f {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f32) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f32> for Vec3f {
    #[inline(always)]
    fn div_assign(&mut self, t: f32) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3f {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3f index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray `R(t) = origin + t * direction`. Direction is not
/// required to be unit length; hit routines compensate (§3).
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3f,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vec3f) -> Self {
        Self { origin, direction }
    }

    #[inline(always)]
    pub fn point_at(self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Interval ───────────────────────────────────────────────────────────────

/// A closed `(min, max)` pair bounding the valid ray parameter `t`.
/// Invariant: `min <= max`. Hit routines treat the interval as open and
/// return the smallest `t` strictly inside it.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains_open(&self, t: f32) -> bool {
        t > self.min && t < self.max
    }

    pub fn with_max(&self, max: f32) -> Self {
        Self { min: self.min, max }
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// An axis-aligned bounding box used as the BVH's bounding volume. Hit-tested
/// via the slab method.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub const fn empty() -> Self {
        Self::new(
            Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        )
    }

    /// Slab-method ray-AABB test: true if the ray hits the box within
    /// `[t_min, t_max]`.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        let mut t_min = t_min;
        let mut t_max = t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    pub fn surrounding(a: &Aabb, b: &Aabb) -> Aabb {
        let min = Point3::new(
            a.min.x.min(b.min.x),
            a.min.y.min(b.min.y),
            a.min.z.min(b.min.z),
        );
        let max = Point3::new(
            a.max.x.max(b.max.x),
            a.max.y.max(b.max.y),
            a.max.z.max(b.max.z),
        );
        Aabb::new(min, max)
    }

    /// Index of the axis with the largest extent (0=x, 1=y, 2=z).
    pub fn longest_axis(&self) -> usize {
        let dx = self.max.x - self.min.x;
        let dy = self.max.y - self.min.y;
        let dz = self.max.z - self.min.z;
        if dx > dy && dx > dz {
            0
        } else if dy > dz {
            1
        } else {
            2
        }
    }

    /// Midpoint of the box along `axis`, used as the BVH split/centroid key.
    pub fn centroid(&self, axis: usize) -> f32 {
        0.5 * (self.min[axis] + self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn reflect_is_involutive_about_the_normal() {
        let n = Vec3f::new(0.0, 1.0, 0.0);
        let d = Vec3f::new(1.0, -1.0, 0.0).unit_vector();
        let r = d.reflect(n);
        let r2 = r.reflect(n);
        assert!((r2.x - d.x).abs() < 1e-5);
        assert!((r2.y - d.y).abs() < 1e-5);
        assert!((r2.z - d.z).abs() < 1e-5);
    }

    #[test]
    fn schlick_at_normal_incidence_matches_known_value() {
        let r = schlick_reflectance(1.0, 1.5);
        assert!((r - 0.04).abs() < 1e-4, "got {r}");
    }

    #[test]
    fn aabb_union_contains_both_inputs() {
        let a = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(0.0, 0.0, 0.0));
        let b = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let u = Aabb::surrounding(&a, &b);
        assert_eq!(u.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(u.max, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn random_unit_vector_has_unit_length() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        for _ in 0..1000 {
            let v = Vec3f::random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn lambertian_mean_scatter_direction_is_parallel_to_normal() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut sum = Vec3f::zero();
        let samples = 100_000;
        for _ in 0..samples {
            sum += Vec3f::random_unit_vector(&mut rng);
        }
        let mean = sum / samples as f32;
        // perpendicular components should average out near zero
        assert!(mean.x.abs() < 1e-2, "x = {}", mean.x);
        assert!(mean.z.abs() < 1e-2, "z = {}", mean.z);
    }
}
