//! Unstructured triangular mesh topology.

mod tri_mesh;

pub use tri_mesh::{MeshError, TriMesh};
