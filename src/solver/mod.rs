//! Solver core: prognostic state, per-step workspace, and entity passes.
//!
//! # Submodules
//!
//! - [`state`]: prognostic `h`, `qx`, `qy` cell fields and initializers
//! - [`workspace`]: per-step scratch fields, recomputed every step
//! - [`passes`]: edge interpolation, upwinding, and the generic
//!   map/reduce drivers shared by all per-entity passes

pub mod passes;
pub mod state;
pub mod workspace;

pub use passes::{
    interpolate_to_edges, lerp_to_edge, map_entities, min_reduce, normal_velocity,
    upwind_edge_values,
};
pub use state::SWEState;
pub use workspace::Workspace;
