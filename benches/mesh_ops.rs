//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, Criterion};
use hbmesh::algo::weld::{weld_vertices, WeldOptions};
use hbmesh::mesh::{edge_indices, face_indices};
use hbmesh::prelude::*;
use nalgebra::Point2;

fn grid(n: usize) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point2::new(i as f64, j as f64));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (positions, faces)
}

fn create_grid_mesh(n: usize) -> HalfEdgeMesh<Point2<f64>> {
    let (positions, faces) = grid(n);
    build_from_faces(&positions, &faces).unwrap()
}

/// Grid where every triangle has its own three vertices, as a triangle soup
/// producer would emit it.
fn create_soup_mesh(n: usize) -> HalfEdgeMesh<Point2<f64>> {
    let (positions, faces) = grid(n);
    let soup_positions: Vec<_> = faces.iter().flatten().map(|&v| positions[v]).collect();
    let soup_faces: Vec<_> = (0..faces.len())
        .map(|f| [3 * f, 3 * f + 1, 3 * f + 2])
        .collect();
    build_from_faces(&soup_positions, &soup_faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (positions, faces) = grid(10);

    c.bench_function("build_grid_10x10", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh<Point2<f64>> = build_from_faces(&positions, &faces).unwrap();
            mesh
        });
    });
}

fn bench_mesh_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("vertex_rotation_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.vertex_edges(v, true).count();
            }
            count
        });
    });

    c.bench_function("face_cycles_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for f in mesh.face_ids() {
                count += mesh.face_edge_count(f);
            }
            count
        });
    });
}

fn bench_weld(c: &mut Criterion) {
    let soup = create_soup_mesh(8);
    let options = WeldOptions::default().with_tolerance(1e-3);

    c.bench_function("weld_soup_8x8", |b| {
        b.iter(|| {
            let mut mesh = soup.clone();
            weld_vertices(&mut mesh, &options).unwrap()
        });
    });
}

fn bench_export(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("face_indices_50x50", |b| {
        b.iter(|| face_indices(&mesh, 3).unwrap());
    });

    c.bench_function("edge_indices_50x50", |b| {
        b.iter(|| edge_indices(&mesh));
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_mesh_traversal,
    bench_weld,
    bench_export
);
criterion_main!(benches);
