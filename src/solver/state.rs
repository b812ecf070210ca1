//! Prognostic state for the shallow water solver.
//!
//! Only `h`, `qx`, `qy` persist across time steps; everything else lives in
//! the per-step [`Workspace`](super::Workspace) and is recomputed from
//! scratch. Passes read the state immutably and a single commit at the end
//! of each step writes the new values, so no pass ever sees mixed old/new
//! data.

use glam::DVec3;

use crate::fields::{Field, Location};
use crate::geometry::GeometricFactors;

/// Cell-centered prognostic fields: fluid height and discharge.
#[derive(Clone, Debug)]
pub struct SWEState {
    /// Fluid height `h` (must stay positive).
    pub h: Field,
    /// Discharge x-component `qx = h * u`.
    pub qx: Field,
    /// Discharge y-component `qy = h * v`.
    pub qy: Field,
}

impl SWEState {
    /// Fluid at rest: uniform height, zero discharge.
    pub fn at_rest(n_cells: usize, n_levels: usize, ref_height: f64) -> Self {
        assert!(ref_height > 0.0, "Reference height must be positive");
        Self {
            h: Field::constant(Location::Cell, n_cells, n_levels, ref_height),
            qx: Field::zeros(Location::Cell, n_cells, n_levels),
            qy: Field::zeros(Location::Cell, n_cells, n_levels),
        }
    }

    /// Rest state plus a Gaussian bump `amplitude * exp(-5 r²)` centered at
    /// `center`, evaluated at cell circumcenters.
    ///
    /// Choose `ref_height` large enough relative to `amplitude` that the
    /// initial splash cannot drive the height negative.
    pub fn with_splash(
        geom: &GeometricFactors,
        n_levels: usize,
        ref_height: f64,
        center: DVec3,
        amplitude: f64,
    ) -> Self {
        let n_cells = geom.cell_area.len();
        let mut state = Self::at_rest(n_cells, n_levels, ref_height);
        for level in 0..n_levels {
            for cell in 0..n_cells {
                let r2 = (geom.circumcenter[cell] - center).length_squared();
                let h = ref_height + amplitude * (-5.0 * r2).exp();
                state.h.set(cell, level, h);
            }
        }
        state
    }

    /// Number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.h.n_entities()
    }

    /// Number of vertical levels.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.h.n_levels()
    }

    /// Total fluid volume `Σ h * A` at one level.
    pub fn total_volume(&self, geom: &GeometricFactors, level: usize) -> f64 {
        self.h
            .level(level)
            .iter()
            .zip(&geom.cell_area)
            .map(|(h, a)| h * a)
            .sum()
    }

    /// Area-integrated discharge `(Σ qx * A, Σ qy * A)` at one level.
    pub fn total_discharge(&self, geom: &GeometricFactors, level: usize) -> (f64, f64) {
        let sum = |f: &Field| -> f64 {
            f.level(level)
                .iter()
                .zip(&geom.cell_area)
                .map(|(q, a)| q * a)
                .sum()
        };
        (sum(&self.qx), sum(&self.qy))
    }

    /// Prognostic field by its conventional name (`h`, `qx`, `qy`).
    pub fn field(&self, name: &str) -> Option<&Field> {
        match name {
            "h" => Some(&self.h),
            "qx" => Some(&self.qx),
            "qy" => Some(&self.qy),
            _ => None,
        }
    }
}
