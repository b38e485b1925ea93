//! Vertex welding.
//!
//! Merges vertices that lie within a distance tolerance of each other, then
//! repairs the half-edges that pointed at the merged vertices.
//!
//! # Algorithm
//!
//! 1. Walk the vertices in order. A vertex closer than the tolerance to an
//!    already kept vertex is merged into the first such vertex; otherwise it
//!    is kept. Distances are only measured against kept vertices, so chains
//!    of close vertices do not merge transitively and the result depends on
//!    vertex order.
//! 2. Walk the half-edges in order. A half-edge terminating at a merged
//!    vertex is re-pointed at the kept vertex when its source survived, and
//!    removed (spliced out of its `next` / `previous` chain) when its source
//!    was merged too.
//! 3. Compact vertices and half-edges, remapping every handle.
//!
//! # Example
//!
//! ```
//! use hbmesh::algo::weld::{weld_vertices, WeldOptions};
//! use hbmesh::mesh::{build_from_faces, HalfEdgeMesh};
//! use nalgebra::Point2;
//!
//! // Two triangles that touch at a corner, built with separate vertices.
//! let positions = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(2.0, 1.0),
//! ];
//! let mut mesh: HalfEdgeMesh<Point2<f64>> =
//!     build_from_faces(&positions, &[[0usize, 1, 2], [3, 4, 5]]).unwrap();
//!
//! let report = weld_vertices(&mut mesh, &WeldOptions::default()).unwrap();
//! assert_eq!(report.vertices_removed, 1);
//! assert_eq!(mesh.num_vertices(), 5);
//! ```

use log::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, Position, VertexId};

use super::Progress;

/// Vertices between two progress reports while clustering.
const PROGRESS_INTERVAL: usize = 1024;

/// Options for vertex welding.
#[derive(Debug)]
pub struct WeldOptions {
    /// Vertices strictly closer than this distance are merged.
    pub tolerance: f64,

    /// Progress callback.
    pub progress: Progress,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            progress: Progress::none(),
        }
    }
}

impl WeldOptions {
    /// Create options with the specified tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Report progress through `progress`.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }
}

/// What a weld removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldReport {
    /// Vertices merged into an earlier vertex.
    pub vertices_removed: usize,
    /// Half-edges removed because both of their endpoints were merged.
    pub edges_removed: usize,
}

/// Merge vertices closer than `options.tolerance`, repairing edges.
///
/// Meshes with fewer than two vertices are left untouched.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] for a negative or non-finite tolerance.
pub fn weld_vertices<P: Position, I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<P, I>,
    options: &WeldOptions,
) -> Result<WeldReport> {
    let tolerance = options.tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(MeshError::invalid_param(
            "tolerance",
            tolerance,
            "must be finite and non-negative",
        ));
    }

    let num_vertices = mesh.num_vertices();
    if num_vertices < 2 {
        return Ok(WeldReport::default());
    }
    let progress = &options.progress;

    // Vertex clustering
    let (keep_vertex, survivor) = cluster(mesh, tolerance * tolerance, progress);

    // Edge repair
    progress.report(1, 2, "Repairing edges");
    let merged = |v: VertexId<I>| v.is_valid() && v.index() < num_vertices && !keep_vertex[v.index()];
    let num_halfedges = mesh.num_halfedges();
    let mut keep_edge = vec![true; num_halfedges];

    for (e, keep) in keep_edge.iter_mut().enumerate() {
        let he = HalfEdgeId::new(e);
        let vertex = mesh.edge_vertex(he);
        if !merged(vertex) {
            continue;
        }

        if merged(mesh.source(he)) {
            let (previous, next) = (mesh.previous(he), mesh.next(he));
            if mesh.edge_index(previous).is_some() {
                mesh.halfedge_mut(previous).next = next;
            }
            if mesh.edge_index(next).is_some() {
                mesh.halfedge_mut(next).previous = previous;
            }
            *keep = false;
        } else {
            let target = survivor[vertex.index()].ok_or_else(|| {
                MeshError::UnreachableInvariant(format!("merged {:?} has no survivor", vertex))
            })?;
            mesh.halfedge_mut(he).vertex = VertexId::new(target);
        }
    }

    let report = WeldReport {
        vertices_removed: keep_vertex.iter().filter(|&&k| !k).count(),
        edges_removed: keep_edge.iter().filter(|&&k| !k).count(),
    };
    mesh.compact(&keep_vertex, &keep_edge);
    progress.report(2, 2, "Repairing edges");

    debug!(
        "welded vertices within {}: removed {} vertices and {} half-edges",
        tolerance, report.vertices_removed, report.edges_removed
    );
    Ok(report)
}

/// Greedy clustering against the kept vertices.
///
/// Returns the keep flag of every vertex and, for merged vertices, the index
/// of the vertex they merge into.
fn cluster<P: Position, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    tolerance_sq: f64,
    progress: &Progress,
) -> (Vec<bool>, Vec<Option<usize>>) {
    let n = mesh.num_vertices();
    let mut keep = vec![true; n];
    let mut survivor = vec![None; n];
    let mut kept: Vec<usize> = Vec::with_capacity(n);

    for (i, (_, vertex)) in mesh.vertices().enumerate() {
        if i % PROGRESS_INTERVAL == 0 {
            progress.report_sub(i, n, 0, 2, "Clustering vertices");
        }

        let closest = kept.iter().copied().find(|&k| {
            mesh.position(VertexId::new(k))
                .distance_squared(&vertex.data)
                < tolerance_sq
        });
        match closest {
            Some(k) => {
                keep[i] = false;
                survivor[i] = Some(k);
            }
            None => kept.push(i),
        }
    }

    (keep, survivor)
}
