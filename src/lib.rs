//! # fv-rs
//!
//! An explicit finite-volume solver for the 2D shallow water equations on
//! unstructured triangular meshes, after the scheme of Cea and Bladé.
//!
//! The crate provides the building blocks of the scheme:
//! - Triangular mesh topology with fixed-slot adjacency (mesh)
//! - One-shot geometric factors: lengths, normals, areas, interpolation
//!   weights, orientation signs (geometry)
//! - (entity, level) scalar field storage (fields)
//! - Edge interpolation and upwind selection (solver)
//! - Mass/momentum flux assembly with optional damping (flux)
//! - Free-surface gradient and Manning friction sources (source)
//! - No-flux wall boundary treatment (boundary)
//! - Explicit Euler stepping with CFL-adaptive time step control (time)
//! - Plain-text diagnostic dumps (io)
//!
//! # Example
//!
//! ```
//! use fv_rs::{GeometricFactors, SWEConfig, SWEState, TriMesh, Workspace, run_simulation};
//!
//! let mesh = TriMesh::equilateral_patch(8, 8, 1.0);
//! let geom = GeometricFactors::compute(&mesh).unwrap();
//! let mut state = SWEState::at_rest(mesh.n_cells(), 1, 2.0);
//!
//! let config = SWEConfig::default().with_t_final(0.1);
//! let result = run_simulation(
//!     &mesh,
//!     &geom,
//!     &mut state,
//!     &config,
//!     None::<fn(usize, f64, &SWEState, &Workspace)>,
//! )
//! .unwrap();
//! assert!(result.final_time >= 0.1);
//! ```

pub mod boundary;
pub mod fields;
pub mod flux;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod solver;
pub mod source;
pub mod time;

// Re-export main types for convenience
pub use fields::{Field, Location};
pub use flux::{assemble_mass_flux, assemble_momentum_flux, damping_correction, mass_flux};
pub use geometry::{GeometricFactors, GeometryError};
pub use io::{dump_cell_field, dump_edge_field, dump_mesh_triplot, DumpError};
pub use mesh::{MeshError, TriMesh};
pub use solver::{
    interpolate_to_edges, normal_velocity, upwind_edge_values, SWEState, Workspace,
};
pub use source::{assemble_surface_gradient, ManningFriction};
pub use time::{
    compute_dt, run_simulation, step, SWEConfig, SimulationResult, SolverError,
};
