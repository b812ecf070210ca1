//! One-shot geometric factors for the finite-volume scheme.
//!
//! Computed once per mesh, before the time loop, and read-only thereafter:
//!
//! - Per edge: length `L`, unit normal `n`, interpolation weight `alpha`
//! - Per cell: area `A`, circumcenter, and one orientation sign per bounding
//!   edge
//!
//! Normal convention: for an interior edge the normal points from the low
//! cell's circumcenter toward the high cell's circumcenter; for a boundary
//! edge it points from the single cell's circumcenter toward the edge
//! midpoint. Either way the normal points out of the low cell, so the
//! orientation sign, the sign of `dot(midpoint - circumcenter, n)`, is +1
//! for the low cell and -1 for the high cell. Summing edge values times
//! these signs over a cell's edges yields a conservative discrete
//! divergence.
//!
//! `alpha = d2 / (d1 + d2)` is the distance-based interpolation weight of
//! the high cell, where `d1`, `d2` are the perpendicular distances from the
//! low/high circumcenters to the edge line. Boundary edges store
//! `alpha = 0`, putting the full weight `(1 - alpha, alpha) = (1, 0)` on the
//! single present cell.

use glam::DVec3;
use thiserror::Error;

use crate::mesh::TriMesh;

/// Errors from geometry precomputation.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A cell's nodes are collinear or coincident.
    #[error("cell {cell} is geometrically degenerate (area {area:.3e})")]
    DegenerateCell { cell: usize, area: f64 },

    /// An edge's normal direction collapsed to zero length.
    #[error("edge {edge} has a zero-length normal direction")]
    DegenerateNormal { edge: usize },

    /// An edge's neighboring circumcenters both lie on the edge line.
    #[error("edge {edge} has zero circumcenter distance on both sides")]
    ZeroCircumcenterDistance { edge: usize },
}

/// Precomputed geometric factors, immutable after [`GeometricFactors::compute`].
#[derive(Clone, Debug)]
pub struct GeometricFactors {
    /// Edge length `L`.
    pub edge_length: Vec<f64>,

    /// Unit edge normal `(nx, ny, nz)`.
    pub edge_normal: Vec<DVec3>,

    /// Interpolation weight of the high cell; 0 on boundary edges.
    pub alpha: Vec<f64>,

    /// Edge midpoints (for orientation signs and diagnostics).
    pub edge_midpoint: Vec<DVec3>,

    /// Cell area `A`.
    pub cell_area: Vec<f64>,

    /// Cell circumcenters.
    pub circumcenter: Vec<DVec3>,

    /// Orientation sign per (cell, local edge): +1 if the stored edge normal
    /// points out of the cell, -1 otherwise.
    pub orientation: Vec<[f64; 3]>,
}

impl GeometricFactors {
    /// Compute all geometric factors for a mesh.
    pub fn compute(mesh: &TriMesh) -> Result<Self, GeometryError> {
        let n_edges = mesh.n_edges();
        let n_cells = mesh.n_cells();

        // Cells first: circumcenters feed the edge normals.
        let mut cell_area = Vec::with_capacity(n_cells);
        let mut circumcenter = Vec::with_capacity(n_cells);
        for cell in 0..n_cells {
            let [a, b, c] = mesh.cell_nodes[cell].map(|n| mesh.positions[n]);

            let area = triangle_area(a, b, c);
            if !(area > 0.0) || !area.is_finite() {
                return Err(GeometryError::DegenerateCell { cell, area });
            }
            cell_area.push(area);
            circumcenter.push(triangle_circumcenter(a, b, c));
        }

        let mut edge_length = Vec::with_capacity(n_edges);
        let mut edge_normal = Vec::with_capacity(n_edges);
        let mut edge_midpoint = Vec::with_capacity(n_edges);
        let mut alpha = Vec::with_capacity(n_edges);
        for edge in 0..n_edges {
            let (p1, p2) = mesh.edge_endpoints(edge);
            edge_length.push((p1 - p2).length());
            let midpoint = 0.5 * (p1 + p2);
            edge_midpoint.push(midpoint);

            let [lo, hi] = mesh.edge_cells[edge];
            let lo = lo.expect("low edge slot is always present");

            let direction = match hi {
                Some(hi) => circumcenter[hi] - circumcenter[lo],
                None => midpoint - circumcenter[lo],
            };
            let normal = direction
                .try_normalize()
                .ok_or(GeometryError::DegenerateNormal { edge })?;
            edge_normal.push(normal);

            let a = match hi {
                Some(hi) => {
                    let d1 = point_line_distance(circumcenter[lo], p1, p2);
                    let d2 = point_line_distance(circumcenter[hi], p1, p2);
                    if d1 + d2 <= 0.0 {
                        return Err(GeometryError::ZeroCircumcenterDistance { edge });
                    }
                    d2 / (d1 + d2)
                }
                None => 0.0,
            };
            alpha.push(a);
        }

        // Orientation signs: the vector circumcenter -> edge midpoint is
        // guaranteed to point out of the cell, so its dot product with the
        // stored normal decides the sign.
        let mut orientation = Vec::with_capacity(n_cells);
        for cell in 0..n_cells {
            let center = circumcenter[cell];
            let signs = mesh.cell_edges[cell].map(|edge| {
                let outward = edge_midpoint[edge] - center;
                if outward.dot(edge_normal[edge]) > 0.0 {
                    1.0
                } else {
                    -1.0
                }
            });
            orientation.push(signs);
        }

        Ok(Self {
            edge_length,
            edge_normal,
            alpha,
            edge_midpoint,
            cell_area,
            circumcenter,
            orientation,
        })
    }

    /// Shortest edge of a cell.
    #[inline]
    pub fn min_edge_length(&self, mesh: &TriMesh, cell: usize) -> f64 {
        let [e0, e1, e2] = mesh.cell_edges[cell];
        self.edge_length[e0]
            .min(self.edge_length[e1])
            .min(self.edge_length[e2])
    }
}

/// Triangle area from the cross-product formula.
#[inline]
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Circumcenter of a (non-degenerate) triangle in 3D.
#[inline]
pub fn triangle_circumcenter(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    let ab = b - a;
    let ac = c - a;
    let ab_x_ac = ab.cross(ac);

    let to_center = (ab_x_ac.cross(ab) * ac.length_squared()
        + ac.cross(ab_x_ac) * ab.length_squared())
        / (2.0 * ab_x_ac.length_squared());

    a + to_center
}

/// Perpendicular distance from a point to the line through `p1` and `p2`.
#[inline]
pub fn point_line_distance(point: DVec3, p1: DVec3, p2: DVec3) -> f64 {
    (point - p1).cross(point - p2).length() / (p2 - p1).length()
}
