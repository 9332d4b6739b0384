use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use raymaze::{
    generators::{self, Algorithm},
    raycaster::Raycaster,
    units::{Height, Width},
    viewer::{Position, ViewerPose},
    visibility,
};
use std::f64::consts::FRAC_PI_3;

fn bench_cast_all_320_columns(c: &mut Criterion) {
    let g = generators::generate(Width(60), Height(40), Algorithm::Prim, Some(1)).unwrap();
    let pose = ViewerPose::new(Position::new(30.5, 20.5), 0.7, FRAC_PI_3);
    let caster = Raycaster::default();

    c.bench_function("cast_all_320_columns", move |b| {
        b.iter(|| caster.cast_all(&g, &pose, 320))
    });
}

fn bench_cast_all_braided(c: &mut Criterion) {
    let mut g = generators::generate(Width(60), Height(40), Algorithm::DepthFirstBacktracker, Some(1)).unwrap();
    let mut rng = XorShiftRng::seed_from_u64(2);
    generators::braid(&mut g, 0.4, &mut rng).unwrap();
    let pose = ViewerPose::new(Position::new(30.5, 20.5), 2.1, FRAC_PI_3);

    c.bench_function("cast_all_braided_320_columns", move |b| {
        b.iter(|| raymaze::raycaster::cast_all(&g, &pose, 320))
    });
}

fn bench_compute_visible_radius_8(c: &mut Criterion) {
    let mut g = generators::generate(Width(60), Height(40), Algorithm::Kruskal, Some(1)).unwrap();
    let viewer = Position::new(30.5, 20.5);

    c.bench_function("compute_visible_radius_8", move |b| {
        b.iter(|| visibility::compute_visible(&mut g, viewer, 8.0))
    });
}

criterion_group!(
    benches,
    bench_cast_all_320_columns,
    bench_cast_all_braided,
    bench_compute_visible_radius_8
);
criterion_main!(benches);
