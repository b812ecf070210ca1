//! Per-entity solver passes: generic maps, edge interpolation, upwinding.
//!
//! Every pass is a side-effect-free map over edges or cells: each output
//! entry depends only on read-only inputs, never on other entries of the
//! output. [`map_entities`] is the single driver for all of them; with the
//! `parallel` feature it dispatches to rayon, and because the maps are
//! independent per entity the parallel result is bit-identical to the
//! serial one.
//!
//! Callers are responsible for pass ordering: a pass that reads a workspace
//! field must run after the pass that wrote it has completed, which the
//! sequential call structure in [`crate::time::step`] guarantees.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geometry::GeometricFactors;
use crate::mesh::TriMesh;
use crate::solver::{SWEState, Workspace};

/// Fill `out[i] = f(i)` for every entity index.
#[cfg(not(feature = "parallel"))]
pub fn map_entities<F>(out: &mut [f64], f: F)
where
    F: Fn(usize) -> f64 + Sync,
{
    for (i, v) in out.iter_mut().enumerate() {
        *v = f(i);
    }
}

/// Fill `out[i] = f(i)` for every entity index (rayon-parallel).
#[cfg(feature = "parallel")]
pub fn map_entities<F>(out: &mut [f64], f: F)
where
    F: Fn(usize) -> f64 + Sync,
{
    out.par_iter_mut().enumerate().for_each(|(i, v)| *v = f(i));
}

/// Minimum over a slice as an associative, commutative reduction.
///
/// Returns `None` for an empty slice. Order-independent, so the parallel
/// variant gives the same result.
#[cfg(not(feature = "parallel"))]
pub fn min_reduce(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Minimum over a slice as an associative, commutative reduction
/// (rayon-parallel).
#[cfg(feature = "parallel")]
pub fn min_reduce(values: &[f64]) -> Option<f64> {
    values.par_iter().copied().reduce_with(f64::min)
}

/// Distance-weighted average of a per-cell quantity at one edge.
///
/// Weights are `(1 - alpha, alpha)` for the (low, high) cell slots; a
/// missing high slot carries weight `alpha = 0`, so boundary edges take the
/// low cell's value unweighted.
#[inline]
pub fn lerp_to_edge<F>(cells: [Option<usize>; 2], alpha: f64, value: F) -> f64
where
    F: Fn(usize) -> f64,
{
    let weights = [1.0 - alpha, alpha];
    let mut sum = 0.0;
    for (slot, cell) in cells.into_iter().enumerate() {
        if let Some(cell) = cell {
            sum += value(cell) * weights[slot];
        } else {
            debug_assert_eq!(weights[slot], 0.0, "missing neighbor with nonzero weight");
        }
    }
    sum
}

/// Interpolate cell velocity (`q/h`) and height to edges: fills `Ux`, `Uy`,
/// `hs`.
///
/// Heights must be positive; the caller validates before invoking.
pub fn interpolate_to_edges(
    mesh: &TriMesh,
    geom: &GeometricFactors,
    state: &SWEState,
    ws: &mut Workspace,
    level: usize,
) {
    let h = state.h.level(level);
    let qx = state.qx.level(level);
    let qy = state.qy.level(level);

    map_entities(ws.ux.level_mut(level), |e| {
        lerp_to_edge(mesh.edge_cells[e], geom.alpha[e], |c| qx[c] / h[c])
    });
    map_entities(ws.uy.level_mut(level), |e| {
        lerp_to_edge(mesh.edge_cells[e], geom.alpha[e], |c| qy[c] / h[c])
    });
    map_entities(ws.hs.level_mut(level), |e| {
        lerp_to_edge(mesh.edge_cells[e], geom.alpha[e], |c| h[c])
    });
}

/// Edge-normal velocity: `lambda = nx * Ux + ny * Uy`.
pub fn normal_velocity(geom: &GeometricFactors, ws: &mut Workspace, level: usize) {
    let ux = ws.ux.level(level);
    let uy = ws.uy.level(level);
    map_entities(ws.lambda.level_mut(level), |e| {
        let n = geom.edge_normal[e];
        n.x * ux[e] + n.y * uy[e]
    });
}

/// Upwind selection of edge height and discharge: fills `hU`, `qUx`, `qUy`.
///
/// `lambda < 0` means flow against the stored normal (high to low), so the
/// high cell is the donor; otherwise the low cell is. Boundary edges fall
/// back to the low cell in both branches; their fluxes are zeroed later
/// anyway.
pub fn upwind_edge_values(mesh: &TriMesh, state: &SWEState, ws: &mut Workspace, level: usize) {
    let lambda = ws.lambda.level(level);

    let donor = |e: usize| -> usize {
        let [lo, hi] = mesh.edge_cells[e];
        let lo = lo.expect("low edge slot is always present");
        if lambda[e] < 0.0 {
            hi.unwrap_or(lo)
        } else {
            lo
        }
    };

    let h = state.h.level(level);
    let qx = state.qx.level(level);
    let qy = state.qy.level(level);

    map_entities(ws.h_up.level_mut(level), |e| h[donor(e)]);
    map_entities(ws.qx_up.level_mut(level), |e| qx[donor(e)]);
    map_entities(ws.qy_up.level_mut(level), |e| qy[donor(e)]);
}
