use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use millkit_camtools::{
    GcodeEmitter, JobContext, ParallelFinishingGenerator, ParallelFinishingParameters,
    WaterlineGenerator, WaterlineParameters,
};
use millkit_core::{Mesh, Point3, ScanAxis, Triangle};
use millkit_settings::MachiningSettings;

/// UV sphere of radius `r` resting on Z = 0.
fn sphere(r: f64, rings: usize, sectors: usize) -> Mesh {
    let vertex = |i: usize, j: usize| {
        let theta = PI * i as f64 / rings as f64;
        let phi = 2.0 * PI * j as f64 / sectors as f64;
        Point3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r + r * theta.cos(),
        )
    };

    let mut triangles = Vec::with_capacity(rings * sectors * 2);
    for i in 0..rings {
        for j in 0..sectors {
            let (a, b) = (vertex(i, j), vertex(i, j + 1));
            let (c, d) = (vertex(i + 1, j), vertex(i + 1, j + 1));
            triangles.push(Triangle::new(a, c, b));
            triangles.push(Triangle::new(b, c, d));
        }
    }
    Mesh::new(triangles)
}

fn bench_generators(c: &mut Criterion) {
    let mesh = sphere(20.0, 48, 96);
    let ctx = JobContext::default();

    let waterline = WaterlineGenerator::new(WaterlineParameters {
        layer_height: 1.0,
        step_resolution: 0.1,
        work_area_z: 100.0,
        feed_rate: 1500.0,
    });
    c.bench_function("waterline_sphere", |b| {
        b.iter(|| waterline.generate(black_box(&mesh), &ctx))
    });

    let finishing = ParallelFinishingGenerator::new(ParallelFinishingParameters {
        stepover: 2.0,
        step_resolution: 0.1,
        axis: ScanAxis::X,
        feed_rate: 1500.0,
    });
    c.bench_function("parallel_finishing_sphere", |b| {
        b.iter(|| finishing.generate(black_box(&mesh), &ctx))
    });

    let mut toolpaths = waterline.generate(&mesh, &ctx).unwrap_or_default();
    toolpaths.extend(finishing.generate(&mesh, &ctx).unwrap_or_default());
    let emitter = GcodeEmitter::new(MachiningSettings::default()).without_timestamp();
    c.bench_function("emit_sphere_program", |b| {
        b.iter(|| emitter.generate(black_box(&toolpaths)))
    });
}

criterion_group!(benches, bench_generators);
criterion_main!(benches);
