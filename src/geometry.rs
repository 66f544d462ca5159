//! Geometry model: a tagged variant of sphere/cube primitives, each owning
//! its material by value (§3 "Primitive", §9).

use crate::material::Material;
use crate::math::{Aabb, Point3, Ray};

/// The result of a successful ray-primitive intersection (§3 "Hit record").
///
/// Normals are always oriented against the incident ray: if
/// `dot(ray.direction, outward_normal) > 0` the stored normal is negated and
/// `front_face` is `false`.
pub struct HitRecord<'a> {
    pub t: f32,
    pub point: Point3,
    pub normal: Point3,
    pub front_face: bool,
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    fn oriented(t: f32, point: Point3, outward_normal: Point3, ray: &Ray, material: &'a Material) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            t,
            point,
            normal,
            front_face,
            material,
        }
    }
}

/// Sphere or axis-aligned cube, each carrying its material by value (§3).
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Sphere {
        center: Point3,
        radius: f32,
        material: Material,
    },
    Cube {
        center: Point3,
        half_extent: f32,
        material: Material,
    },
}

impl Primitive {
    pub const fn sphere(center: Point3, radius: f32, material: Material) -> Self {
        Primitive::Sphere {
            center,
            radius,
            material,
        }
    }

    pub const fn cube(center: Point3, half_extent: f32, material: Material) -> Self {
        Primitive::Cube {
            center,
            half_extent,
            material,
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            Primitive::Sphere { center, radius, .. } => {
                let r = Point3::new(radius.abs(), radius.abs(), radius.abs());
                Aabb::new(*center - r, *center + r)
            }
            Primitive::Cube {
                center,
                half_extent,
                ..
            } => {
                let h = Point3::new(*half_extent, *half_extent, *half_extent);
                Aabb::new(*center - h, *center + h)
            }
        }
    }

    /// Hit-tests this primitive against `ray` restricted to the open
    /// interval `(t_min, t_max)`, returning the smallest valid `t` (§3).
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere {
                center,
                radius,
                material,
            } => hit_sphere(*center, *radius, material, ray, t_min, t_max),
            Primitive::Cube {
                center,
                half_extent,
                material,
            } => hit_cube(*center, *half_extent, material, ray, t_min, t_max),
        }
    }
}

fn hit_sphere<'a>(
    center: Point3,
    radius: f32,
    material: &'a Material,
    ray: &Ray,
    t_min: f32,
    t_max: f32,
) -> Option<HitRecord<'a>> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let mut root = (-half_b - sqrtd) / a;
    if root <= t_min || root >= t_max {
        root = (-half_b + sqrtd) / a;
        if root <= t_min || root >= t_max {
            return None;
        }
    }

    let point = ray.point_at(root);
    let outward_normal = (point - center) / radius;
    Some(HitRecord::oriented(root, point, outward_normal, ray, material))
}

/// Slab-method cube intersection, tracking which axis produced the nearest
/// boundary so the correct face normal can be reported.
fn hit_cube<'a>(
    center: Point3,
    half_extent: f32,
    material: &'a Material,
    ray: &Ray,
    t_min: f32,
    t_max: f32,
) -> Option<HitRecord<'a>> {
    let min = center - Point3::new(half_extent, half_extent, half_extent);
    let max = center + Point3::new(half_extent, half_extent, half_extent);

    let mut t_near = t_min;
    let mut t_far = t_max;
    let mut near_axis = 0usize;
    let mut near_sign = -1.0f32;

    for axis in 0..3 {
        let inv_d = 1.0 / ray.direction[axis];
        let mut t0 = (min[axis] - ray.origin[axis]) * inv_d;
        let mut t1 = (max[axis] - ray.origin[axis]) * inv_d;
        let mut sign = -1.0f32;
        if inv_d < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }
        if t0 > t_near {
            t_near = t0;
            near_axis = axis;
            near_sign = sign;
        }
        t_far = t_far.min(t1);
        if t_far <= t_near {
            return None;
        }
    }

    if t_near <= t_min || t_near >= t_max {
        return None;
    }

    let point = ray.point_at(t_near);
    let mut outward_normal = Point3::zero();
    outward_normal[near_axis] = near_sign;
    Some(HitRecord::oriented(t_near, point, outward_normal, ray, material))
}

// Indexing support for building the face normal above (Point3 already
// implements Index<usize> -> &f32, but we need assignment here).
impl std::ops::IndexMut<usize> for Point3 {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3f index out of bounds: {i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vec3f};

    #[test]
    fn hit_record_normal_is_unit_length() {
        let prim = Primitive::sphere(Point3::zero(), 1.0, Material::lambertian(Color::ones()));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3f::new(0.0, 0.0, -1.0));
        let hit = prim.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn front_face_flag_matches_incident_direction() {
        let prim = Primitive::sphere(Point3::zero(), 1.0, Material::lambertian(Color::ones()));
        // Ray from outside, pointing in: should be a front-face hit.
        let ray_in = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3f::new(0.0, 0.0, -1.0));
        let hit_in = prim.hit(&ray_in, 0.001, f32::INFINITY).unwrap();
        assert!(hit_in.front_face);

        // Ray from inside, pointing out: should be a back-face hit.
        let ray_out = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3f::new(0.0, 0.0, 1.0));
        let hit_out = prim.hit(&ray_out, 0.001, f32::INFINITY).unwrap();
        assert!(!hit_out.front_face);
    }

    #[test]
    fn ray_launched_from_surface_along_normal_misses_itself() {
        let prim = Primitive::sphere(Point3::zero(), 1.0, Material::lambertian(Color::ones()));
        let surface_point = Point3::new(0.0, 0.0, 1.0);
        let ray = Ray::new(surface_point, Vec3f::new(0.0, 0.0, 1.0));
        assert!(prim.hit(&ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn cube_bbox_matches_half_extent() {
        let prim = Primitive::cube(Point3::zero(), 0.5, Material::lambertian(Color::ones()));
        let bbox = prim.bbox();
        assert_eq!(bbox.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(bbox.max, Point3::new(0.5, 0.5, 0.5));
    }
}
