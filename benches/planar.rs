//! Benchmarks for planar UV projection.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use triplanar::geometry::primitives::{box_geometry_segments, cylinder_geometry_segments};
use triplanar::prelude::*;

fn create_box(segments: u32) -> Geometry {
    box_geometry_segments(17.0, 15.0, 2.0, segments, segments, segments).unwrap()
}

fn bench_reset_uvs(c: &mut Criterion) {
    let mut group = c.benchmark_group("reset_uvs");

    for segments in [8, 64, 256] {
        let geometry = create_box(segments);
        let vertices = geometry.vertex_count();

        for (label, options) in [
            ("sequential", PlanarOptions::default().sequential()),
            ("parallel", PlanarOptions::default()),
        ] {
            group.bench_with_input(BenchmarkId::new(label, vertices), &geometry, |b, geometry| {
                let mut geometry = geometry.clone();
                b.iter(|| reset_uvs(&mut geometry, &options).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_planar_projection(c: &mut Criterion) {
    let cylinder = cylinder_geometry_segments(1.0, 1.0, 4.0, 256, 256, false).unwrap();

    c.bench_function("planar_projection_cylinder", |b| {
        b.iter(|| {
            triplanar::algo::parameterize::planar_projection(&cylinder, &PlanarOptions::default())
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_reset_uvs, bench_planar_projection);
criterion_main!(benches);
