//! Per-step scratch fields.
//!
//! Everything here is recomputed from the prognostic state on every step;
//! no value survives across steps. Keeping the scratch fields separate from
//! [`SWEState`](super::SWEState) makes the step's atomicity structural: the
//! passes write only here, and the commit is the single place that touches
//! the state.

use crate::fields::{Field, Location};

/// All derived fields of one time step.
#[derive(Clone, Debug)]
pub struct Workspace {
    // ---- edge fields ----
    /// Interpolated velocity x-component `Ux`.
    pub ux: Field,
    /// Interpolated velocity y-component `Uy`.
    pub uy: Field,
    /// Interpolated height `hs`.
    pub hs: Field,
    /// Normal velocity `lambda = n · U`.
    pub lambda: Field,
    /// Upwinded height `hU`.
    pub h_up: Field,
    /// Upwinded discharge `qUx`.
    pub qx_up: Field,
    /// Upwinded discharge `qUy`.
    pub qy_up: Field,
    /// Mass flux `Q`.
    pub q_mass: Field,
    /// Momentum flux `Fx`.
    pub f_x: Field,
    /// Momentum flux `Fy`.
    pub f_y: Field,

    // ---- cell fields ----
    /// Free-surface gradient `Sx`.
    pub s_x: Field,
    /// Free-surface gradient `Sy`.
    pub s_y: Field,
    /// Height time-derivative accumulator (becomes `dt`-scaled increment).
    pub dhdt: Field,
    /// `qx` time-derivative accumulator.
    pub dqxdt: Field,
    /// `qy` time-derivative accumulator.
    pub dqydt: Field,
    /// Per-cell CFL-limited time step.
    pub cfl: Field,
}

impl Workspace {
    /// Allocate scratch fields for a mesh of the given size.
    pub fn new(n_edges: usize, n_cells: usize, n_levels: usize) -> Self {
        let edge = || Field::zeros(Location::Edge, n_edges, n_levels);
        let cell = || Field::zeros(Location::Cell, n_cells, n_levels);
        Self {
            ux: edge(),
            uy: edge(),
            hs: edge(),
            lambda: edge(),
            h_up: edge(),
            qx_up: edge(),
            qy_up: edge(),
            q_mass: edge(),
            f_x: edge(),
            f_y: edge(),
            s_x: cell(),
            s_y: cell(),
            dhdt: cell(),
            dqxdt: cell(),
            dqydt: cell(),
            cfl: cell(),
        }
    }

    /// Zero all scratch fields.
    pub fn reset(&mut self) {
        for f in [
            &mut self.ux,
            &mut self.uy,
            &mut self.hs,
            &mut self.lambda,
            &mut self.h_up,
            &mut self.qx_up,
            &mut self.qy_up,
            &mut self.q_mass,
            &mut self.f_x,
            &mut self.f_y,
            &mut self.s_x,
            &mut self.s_y,
            &mut self.dhdt,
            &mut self.dqxdt,
            &mut self.dqydt,
            &mut self.cfl,
        ] {
            f.fill(0.0);
        }
    }

    /// Scratch field by its conventional name (`Ux`, `Uy`, `hs`, `lambda`,
    /// `hU`, `qUx`, `qUy`, `Q`, `Fx`, `Fy`, `Sx`, `Sy`, `dhdt`, `dqxdt`,
    /// `dqydt`, `CFL`). Read-only access for diagnostics.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match name {
            "Ux" => Some(&self.ux),
            "Uy" => Some(&self.uy),
            "hs" => Some(&self.hs),
            "lambda" => Some(&self.lambda),
            "hU" => Some(&self.h_up),
            "qUx" => Some(&self.qx_up),
            "qUy" => Some(&self.qy_up),
            "Q" => Some(&self.q_mass),
            "Fx" => Some(&self.f_x),
            "Fy" => Some(&self.f_y),
            "Sx" => Some(&self.s_x),
            "Sy" => Some(&self.s_y),
            "dhdt" => Some(&self.dhdt),
            "dqxdt" => Some(&self.dqxdt),
            "dqydt" => Some(&self.dqydt),
            "CFL" => Some(&self.cfl),
            _ => None,
        }
    }
}
