//! No-flux wall boundary treatment.
//!
//! Edges with a single bounding cell, and the cells touching them, form the
//! domain wall. After flux and source assembly, and before anything is
//! accumulated into cell derivatives, their contributions are forced to
//! zero: no mass or momentum crosses the wall, and wall cells see no
//! surface-gradient forcing.

use crate::mesh::TriMesh;
use crate::solver::Workspace;

/// Zero the assembled fluxes `Q`, `Fx`, `Fy` on boundary edges.
pub fn zero_boundary_fluxes(mesh: &TriMesh, ws: &mut Workspace, level: usize) {
    for &e in &mesh.boundary_edges {
        ws.q_mass.set(e, level, 0.0);
        ws.f_x.set(e, level, 0.0);
        ws.f_y.set(e, level, 0.0);
    }
}

/// Zero the surface gradients `Sx`, `Sy` on boundary cells.
pub fn zero_boundary_gradients(mesh: &TriMesh, ws: &mut Workspace, level: usize) {
    for &c in &mesh.boundary_cells {
        ws.s_x.set(c, level, 0.0);
        ws.s_y.set(c, level, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_overrides_assembled_values() {
        let mesh = TriMesh::two_triangles();
        let mut ws = Workspace::new(mesh.n_edges(), mesh.n_cells(), 1);
        ws.q_mass.fill(1.0);
        ws.f_x.fill(2.0);
        ws.f_y.fill(3.0);
        ws.s_x.fill(4.0);
        ws.s_y.fill(5.0);

        zero_boundary_fluxes(&mesh, &mut ws, 0);
        zero_boundary_gradients(&mesh, &mut ws, 0);

        for e in 0..mesh.n_edges() {
            if mesh.is_boundary_edge(e) {
                assert_eq!(ws.q_mass.get(e, 0), 0.0);
                assert_eq!(ws.f_x.get(e, 0), 0.0);
                assert_eq!(ws.f_y.get(e, 0), 0.0);
            } else {
                // Interior values untouched.
                assert_eq!(ws.q_mass.get(e, 0), 1.0);
            }
        }
        // Both cells of the two-triangle mesh touch the wall.
        for c in 0..mesh.n_cells() {
            assert_eq!(ws.s_x.get(c, 0), 0.0);
            assert_eq!(ws.s_y.get(c, 0), 0.0);
        }
    }
}
