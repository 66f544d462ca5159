use criterion::{criterion_group, criterion_main, Criterion};
use pathtracer_core::material::Material;
use pathtracer_core::math::{Color, Point3};
use pathtracer_core::session::ray_color;
use pathtracer_core::{bvh::Bvh, Primitive, Ray, Vec3f};
use rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

fn scattered_spheres(n: usize) -> Vec<Primitive> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    (0..n)
        .map(|_| {
            let x = (rng.next_u32() as f32 / u32::MAX as f32) * 40.0 - 20.0;
            let z = (rng.next_u32() as f32 / u32::MAX as f32) * 40.0 - 20.0;
            Primitive::sphere(
                Point3::new(x, 0.0, z),
                0.3,
                Material::lambertian(Color::new(0.5, 0.5, 0.5)),
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let primitives = scattered_spheres(2000);
    c.bench_function("bvh_build_2000", |b| {
        b.iter(|| Bvh::build(&primitives));
    });
}

fn bench_traverse(c: &mut Criterion) {
    let primitives = scattered_spheres(2000);
    let bvh = Bvh::build(&primitives);
    let ray = Ray::new(Point3::new(-25.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0));
    c.bench_function("bvh_traverse_2000", |b| {
        b.iter(|| bvh.hit(&primitives, &ray, 0.001, f32::INFINITY));
    });
}

fn bench_ray_color(c: &mut Criterion) {
    let primitives = scattered_spheres(500);
    let bvh = Bvh::build(&primitives);
    let ray = Ray::new(Point3::new(-25.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0));
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    c.bench_function("ray_color_depth_10", |b| {
        b.iter(|| ray_color(&ray, 10, &bvh, &primitives, &mut rng));
    });
}

criterion_group!(benches, bench_build, bench_traverse, bench_ray_color);
criterion_main!(benches);
