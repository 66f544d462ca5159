//! Material model: a tagged variant producing a scatter direction and
//! attenuation, or absorption (§3 "Material").
//!
//! Materials are small `Copy` value types stored *by value* inside their
//! owning primitive, not behind `Box<dyn Material>`; there is no shared
//! ownership in this design (§9 "Ownership of materials by primitives"),
//! which also makes the type trivially packable into the GPU primitive
//! storage buffer (§6.3).

use crate::geometry::HitRecord;
use crate::math::{schlick_reflectance, uniform_f32, Color, Ray, Vec3f};
use rand_core::RngCore;

/// Lambertian (diffuse), Metallic, and Dielectric (glass), the three
/// material kinds named in §3.
#[derive(Debug, Clone, Copy)]
pub enum Material {
    Lambertian { albedo: Color },
    Metallic { albedo: Color, fuzz: f32 },
    Dielectric { eta: f32 },
}

impl Material {
    pub const fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    pub fn metallic(albedo: Color, fuzz: f32) -> Self {
        Material::Metallic {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub const fn dielectric(eta: f32) -> Self {
        Material::Dielectric { eta }
    }

    /// Scatters an incoming ray off `hit`, returning `(scattered ray,
    /// attenuation)` or `None` if the ray is absorbed (§3 scatter contracts).
    pub fn scatter(&self, ray: &Ray, hit: &HitRecord, rng: &mut dyn RngCore) -> Option<(Ray, Color)> {
        match *self {
            Material::Lambertian { albedo } => {
                let mut direction = hit.normal + Vec3f::random_unit_vector(rng);
                if direction.near_zero() {
                    direction = hit.normal;
                }
                Some((Ray::new(hit.point, direction), albedo))
            }
            Material::Metallic { albedo, fuzz } => {
                let reflected = ray.direction.unit_vector().reflect(hit.normal);
                let direction = reflected + Vec3f::random_unit_vector(rng) * fuzz;
                if direction.dot(hit.normal) > 0.0 {
                    Some((Ray::new(hit.point, direction), albedo))
                } else {
                    None
                }
            }
            Material::Dielectric { eta } => {
                let eta_ratio = if hit.front_face { 1.0 / eta } else { eta };
                let unit_dir = ray.direction.unit_vector();
                let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = eta_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || schlick_reflectance(cos_theta, eta_ratio) > uniform_f32(rng)
                {
                    unit_dir.reflect(hit.normal)
                } else {
                    unit_dir
                        .refract(hit.normal, eta_ratio)
                        .unwrap_or_else(|| unit_dir.reflect(hit.normal))
                };

                Some((Ray::new(hit.point, direction), Color::ones()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn hit_at_origin(normal: Vec3f) -> HitRecord<'static> {
        HitRecord {
            point: Point3::zero(),
            normal,
            t: 1.0,
            front_face: true,
            material: Box::leak(Box::new(Material::lambertian(Color::ones()))),
        }
    }

    #[test]
    fn lambertian_always_scatters() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mat = Material::lambertian(Color::new(0.5, 0.5, 0.5));
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3f::new(0.0, -1.0, 0.0));
        let hit = hit_at_origin(Vec3f::unit_y());
        for _ in 0..100 {
            assert!(mat.scatter(&ray, &hit, &mut rng).is_some());
        }
    }

    #[test]
    fn mirror_metal_reflects_incidence_angle() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mat = Material::metallic(Color::ones(), 0.0);
        let ray = Ray::new(Point3::new(-1.0, 1.0, 0.0), Vec3f::new(1.0, -1.0, 0.0));
        let hit = hit_at_origin(Vec3f::unit_y());
        let (scattered, _) = mat.scatter(&ray, &hit, &mut rng).unwrap();
        assert!(scattered.direction.y > 0.0);
    }

    #[test]
    fn dielectric_reflectance_matches_schlick_at_normal_incidence() {
        let r = schlick_reflectance(1.0, 1.5);
        assert!((r - 0.04).abs() < 1e-4);
    }
}
