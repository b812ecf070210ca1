//! Unstructured triangular mesh topology.
//!
//! The mesh stores:
//! - Node positions (3D, z = 0 for planar meshes)
//! - Edge-node and edge-cell adjacency (two fixed slots per edge, the second
//!   slot empty for boundary edges)
//! - Cell-edge and cell-node adjacency (exactly three of each per cell)
//! - Derived node-cell neighborhoods
//! - Boundary edge/cell identification
//!
//! Slot convention (fixed at construction, relied on by the solver):
//! - Edge cell slot 0 ("low") is always present; slot 1 ("high") is `None`
//!   exactly for boundary edges.
//! - The edge normal computed by the geometry pass points from the low cell
//!   toward the high cell, so the orientation sign is +1 for the low cell and
//!   -1 for the high cell on every interior edge.

use std::collections::HashMap;

use glam::DVec3;
use thiserror::Error;

/// Errors from mesh construction and validation.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A cell references a node index outside the node array.
    #[error("cell {cell} references node {node}, but the mesh has {n_nodes} nodes")]
    NodeOutOfRange {
        cell: usize,
        node: usize,
        n_nodes: usize,
    },

    /// A cell lists the same node more than once.
    #[error("cell {cell} is degenerate: repeated node {node}")]
    DegenerateCell { cell: usize, node: usize },

    /// More than two cells share one edge.
    #[error("edge between nodes {0} and {1} is shared by more than two cells")]
    NonManifoldEdge(usize, usize),

    /// The mesh has no cells.
    #[error("mesh has no cells")]
    Empty,
}

/// Unstructured mesh of triangular cells.
#[derive(Clone, Debug)]
pub struct TriMesh {
    /// Node positions.
    pub positions: Vec<DVec3>,

    /// Edge-node adjacency: the two endpoints of each edge.
    pub edge_nodes: Vec<[usize; 2]>,

    /// Edge-cell adjacency: slot 0 always present, slot 1 `None` for
    /// boundary edges.
    pub edge_cells: Vec<[Option<usize>; 2]>,

    /// Cell-edge adjacency: the three bounding edges of each cell.
    pub cell_edges: Vec<[usize; 3]>,

    /// Cell-node adjacency: the three bounding nodes of each cell.
    pub cell_nodes: Vec<[usize; 3]>,

    /// Derived node-cell neighborhoods (sorted, deduplicated).
    pub node_cells: Vec<Vec<usize>>,

    /// Indices of edges with a single bounding cell.
    pub boundary_edges: Vec<usize>,

    /// Indices of cells touching at least one boundary edge.
    pub boundary_cells: Vec<usize>,
}

impl TriMesh {
    /// Build a mesh from node positions and cell-node connectivity.
    ///
    /// Edges, edge-cell slots, cell-edge adjacency, node neighborhoods and
    /// boundary sets are all derived here. Cells must be triangles; a cell
    /// with a repeated or out-of-range node is a data-integrity fault.
    pub fn from_connectivity(
        positions: Vec<DVec3>,
        cell_nodes: Vec<[usize; 3]>,
    ) -> Result<Self, MeshError> {
        if cell_nodes.is_empty() {
            return Err(MeshError::Empty);
        }

        let n_nodes = positions.len();
        for (cell, nodes) in cell_nodes.iter().enumerate() {
            for &node in nodes {
                if node >= n_nodes {
                    return Err(MeshError::NodeOutOfRange {
                        cell,
                        node,
                        n_nodes,
                    });
                }
            }
            if nodes[0] == nodes[1] || nodes[1] == nodes[2] || nodes[0] == nodes[2] {
                let node = if nodes[0] == nodes[1] {
                    nodes[0]
                } else {
                    nodes[2]
                };
                return Err(MeshError::DegenerateCell { cell, node });
            }
        }

        // Derive edges. The first cell to touch an edge claims slot 0, so the
        // low/high ordering follows cell iteration order.
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edge_nodes: Vec<[usize; 2]> = Vec::new();
        let mut edge_cells: Vec<[Option<usize>; 2]> = Vec::new();
        let mut cell_edges: Vec<[usize; 3]> = Vec::with_capacity(cell_nodes.len());

        for (cell, nodes) in cell_nodes.iter().enumerate() {
            let mut edges = [0usize; 3];
            for (slot, (a, b)) in [(nodes[0], nodes[1]), (nodes[1], nodes[2]), (nodes[2], nodes[0])]
                .into_iter()
                .enumerate()
            {
                let key = (a.min(b), a.max(b));
                let e = match edge_index.get(&key) {
                    Some(&e) => {
                        match &mut edge_cells[e] {
                            [_, second @ None] => *second = Some(cell),
                            _ => return Err(MeshError::NonManifoldEdge(key.0, key.1)),
                        }
                        e
                    }
                    None => {
                        let e = edge_nodes.len();
                        edge_index.insert(key, e);
                        edge_nodes.push([a, b]);
                        edge_cells.push([Some(cell), None]);
                        e
                    }
                };
                edges[slot] = e;
            }
            cell_edges.push(edges);
        }

        let mut node_cells: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
        for (cell, nodes) in cell_nodes.iter().enumerate() {
            for &node in nodes {
                node_cells[node].push(cell);
            }
        }
        for cells in &mut node_cells {
            cells.sort_unstable();
            cells.dedup();
        }

        let boundary_edges: Vec<usize> = edge_cells
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells[1].is_none())
            .map(|(e, _)| e)
            .collect();

        let mut boundary_cells: Vec<usize> = boundary_edges
            .iter()
            .filter_map(|&e| edge_cells[e][0])
            .collect();
        boundary_cells.sort_unstable();
        boundary_cells.dedup();

        Ok(Self {
            positions,
            edge_nodes,
            edge_cells,
            cell_edges,
            cell_nodes,
            node_cells,
            boundary_edges,
            boundary_cells,
        })
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.positions.len()
    }

    /// Number of edges.
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edge_nodes.len()
    }

    /// Number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cell_nodes.len()
    }

    /// Whether an edge has a single bounding cell.
    #[inline]
    pub fn is_boundary_edge(&self, edge: usize) -> bool {
        self.edge_cells[edge][1].is_none()
    }

    /// The two endpoint positions of an edge.
    #[inline]
    pub fn edge_endpoints(&self, edge: usize) -> (DVec3, DVec3) {
        let [a, b] = self.edge_nodes[edge];
        (self.positions[a], self.positions[b])
    }

    // =========================================================================
    // Synthetic meshes
    // =========================================================================

    /// Structured equilateral triangulation of a rectangle.
    ///
    /// Node rows are offset by half a spacing, so every cell is an
    /// equilateral triangle with side `spacing`. Produces `2 * nx * ny`
    /// cells.
    pub fn equilateral_patch(nx: usize, ny: usize, spacing: f64) -> Self {
        assert!(nx > 0 && ny > 0, "Need at least one cell in each direction");
        assert!(spacing > 0.0, "Spacing must be positive");

        let dy = spacing * 3.0_f64.sqrt() / 2.0;
        let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            let offset = if j % 2 == 1 { spacing / 2.0 } else { 0.0 };
            for i in 0..=nx {
                positions.push(DVec3::new(i as f64 * spacing + offset, j as f64 * dy, 0.0));
            }
        }

        let node = |i: usize, j: usize| j * (nx + 1) + i;
        let mut cells = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                if j % 2 == 0 {
                    // lower row unshifted, upper row shifted right
                    cells.push([node(i, j), node(i + 1, j), node(i, j + 1)]);
                    cells.push([node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)]);
                } else {
                    // lower row shifted right, upper row unshifted
                    cells.push([node(i, j), node(i + 1, j), node(i + 1, j + 1)]);
                    cells.push([node(i, j), node(i + 1, j + 1), node(i, j + 1)]);
                }
            }
        }

        Self::from_connectivity(positions, cells)
            .expect("structured patch connectivity is always valid")
    }

    /// Six equilateral triangles sharing a central node.
    ///
    /// The six spoke edges are interior (two cells each); the six rim edges
    /// are boundary.
    pub fn hexagon(radius: f64) -> Self {
        assert!(radius > 0.0, "Radius must be positive");

        let mut positions = vec![DVec3::ZERO];
        for k in 0..6 {
            let angle = k as f64 * std::f64::consts::FRAC_PI_3;
            positions.push(DVec3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
        }

        let cells: Vec<[usize; 3]> = (0..6).map(|k| [0, 1 + k, 1 + (k + 1) % 6]).collect();

        Self::from_connectivity(positions, cells).expect("hexagon connectivity is always valid")
    }

    /// Two equilateral triangles sharing one interior edge.
    ///
    /// Cell 0 sits above the shared edge, cell 1 below; the shared edge gets
    /// cell 0 in its low slot.
    pub fn two_triangles() -> Self {
        let half_height = 3.0_f64.sqrt() / 2.0;
        let positions = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.5, half_height, 0.0),
            DVec3::new(0.5, -half_height, 0.0),
        ];
        let cells = vec![[0, 1, 2], [0, 3, 1]];

        Self::from_connectivity(positions, cells).expect("two-triangle connectivity is valid")
    }
}
