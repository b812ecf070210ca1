//! Explicit Euler time integration with CFL-adaptive step control.
//!
//! One [`step`] is atomic over the whole field set: every derived field is
//! recomputed from the previous `h`, `qx`, `qy`, and a single commit writes
//! the new prognostic values. The next time step then comes from
//! [`compute_dt`], the minimum over cells of
//!
//! `CFL[cell] = cfl * min(edge lengths) / (|U| + sqrt(g * h))`
//!
//! evaluated on the updated state. [`run_simulation`] wires the two together
//! and terminates at the configured final time (or step limit). The very
//! first step uses `dt = 0`, a no-op update whose only effect is to
//! establish `dt` from the CFL pass.

use std::time::Instant;

use thiserror::Error;

use crate::boundary::{zero_boundary_fluxes, zero_boundary_gradients};
use crate::flux::{assemble_mass_flux, assemble_momentum_flux};
use crate::geometry::GeometricFactors;
use crate::mesh::TriMesh;
use crate::solver::{
    interpolate_to_edges, map_entities, min_reduce, normal_velocity, upwind_edge_values, SWEState,
    Workspace,
};
use crate::source::{assemble_surface_gradient, ManningFriction};

/// Fatal solver conditions. Any of these terminates the run; there is no
/// retry.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Height lost positivity; velocity and friction terms are no longer
    /// well-defined.
    #[error(
        "non-positive fluid height {height:.6e} in cell {cell}; \
         increase the reference height or tighten the CFL coefficient"
    )]
    NonPositiveHeight { cell: usize, height: f64 },

    /// The CFL reduction ran over zero cells.
    #[error("CFL reduction over an empty mesh")]
    EmptyMesh,
}

/// Solver configuration.
///
/// Defaults: still water of height 2 over a flat bed, CFL coefficient 0.05,
/// standard gravity, damping and Manning friction enabled.
#[derive(Clone, Debug)]
pub struct SWEConfig {
    /// Reference fluid height for initialization. Choose this large enough
    /// that an initial splash cannot drive the height negative.
    pub ref_height: f64,
    /// CFL coefficient (the computed `dt` is linear in it).
    pub cfl: f64,
    /// Gravitational acceleration magnitude (m/s²).
    pub g: f64,
    /// Damping corrector coefficient; `None` disables the corrector.
    pub damping: Option<f64>,
    /// Manning roughness coefficient; `None` disables bed friction.
    pub manning_n: Option<f64>,
    /// Domain length scale (diagnostic/reporting only).
    pub domain_length: f64,
    /// Final simulation time.
    pub t_final: f64,
    /// Safety cap on the number of steps; `None` means unbounded.
    pub max_steps: Option<usize>,
    /// Invoke the output callback every this many steps; `None` disables it.
    pub output_interval: Option<usize>,
    /// Print a progress line (time, step, dt) each step.
    pub verbose: bool,
}

impl Default for SWEConfig {
    fn default() -> Self {
        Self {
            ref_height: 2.0,
            cfl: 0.05,
            g: 9.81,
            damping: Some(0.02),
            manning_n: Some(0.01),
            domain_length: 10.0,
            t_final: 16.0,
            max_steps: None,
            output_interval: None,
            verbose: false,
        }
    }
}

impl SWEConfig {
    /// Set the CFL coefficient.
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    /// Set the gravitational acceleration magnitude.
    pub fn with_gravity(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    /// Enable the damping corrector with the given coefficient.
    pub fn with_damping(mut self, coeff: f64) -> Self {
        self.damping = Some(coeff);
        self
    }

    /// Disable the damping corrector.
    pub fn without_damping(mut self) -> Self {
        self.damping = None;
        self
    }

    /// Enable Manning friction with the given roughness coefficient.
    pub fn with_friction(mut self, manning_n: f64) -> Self {
        self.manning_n = Some(manning_n);
        self
    }

    /// Disable bed friction.
    pub fn without_friction(mut self) -> Self {
        self.manning_n = None;
        self
    }

    /// Set the final simulation time.
    pub fn with_t_final(mut self, t_final: f64) -> Self {
        self.t_final = t_final;
        self
    }

    /// Cap the number of time steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Invoke the output callback every `interval` steps.
    pub fn with_output_interval(mut self, interval: usize) -> Self {
        self.output_interval = Some(interval);
        self
    }

    /// Print per-step progress.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Validate height positivity at one level.
fn check_heights(state: &SWEState, level: usize) -> Result<(), SolverError> {
    match state.h.min_with_index(level) {
        Some((cell, height)) if height <= 0.0 => {
            Err(SolverError::NonPositiveHeight { cell, height })
        }
        Some(_) => Ok(()),
        None => Err(SolverError::EmptyMesh),
    }
}

/// Advance the state by one explicit Euler step of size `dt`.
///
/// Pass order (each pass completes before the next reads its output):
/// interpolation → normal velocity → upwinding → fluxes → boundary zeroing
/// → divergence accumulation (+ friction) → surface gradient → boundary
/// zeroing → scale by `dt / A` → commit.
pub fn step(
    mesh: &TriMesh,
    geom: &GeometricFactors,
    state: &mut SWEState,
    ws: &mut Workspace,
    config: &SWEConfig,
    dt: f64,
    level: usize,
) -> Result<(), SolverError> {
    check_heights(state, level)?;

    // Edge passes.
    interpolate_to_edges(mesh, geom, state, ws, level);
    normal_velocity(geom, ws, level);
    upwind_edge_values(mesh, state, ws, level);
    assemble_mass_flux(
        mesh,
        geom,
        state.h.level(level),
        ws,
        level,
        config.damping,
        config.g,
    );
    assemble_momentum_flux(geom, ws, level);
    zero_boundary_fluxes(mesh, ws, level);

    // Cell passes: oriented divergence of the edge fluxes, plus friction on
    // the momentum components.
    let friction = config.manning_n.map(|n| ManningFriction::new(config.g, n));
    let divergence = |edge_values: &[f64], c: usize| -> f64 {
        let mut sum = 0.0;
        for (slot, &e) in mesh.cell_edges[c].iter().enumerate() {
            sum += edge_values[e] * geom.orientation[c][slot];
        }
        sum
    };

    {
        let q_mass = ws.q_mass.level(level);
        map_entities(ws.dhdt.level_mut(level), |c| divergence(q_mass, c));
    }
    {
        let h = state.h.level(level);
        let qx = state.qx.level(level);
        let qy = state.qy.level(level);
        let f_x = ws.f_x.level(level);
        map_entities(ws.dqxdt.level_mut(level), |c| {
            let mut sum = divergence(f_x, c);
            if let Some(f) = &friction {
                sum += f.drag(h[c], qx[c], qy[c]).0;
            }
            sum
        });
        let f_y = ws.f_y.level(level);
        map_entities(ws.dqydt.level_mut(level), |c| {
            let mut sum = divergence(f_y, c);
            if let Some(f) = &friction {
                sum += f.drag(h[c], qx[c], qy[c]).1;
            }
            sum
        });
    }

    assemble_surface_gradient(mesh, geom, ws, level);
    zero_boundary_gradients(mesh, ws, level);

    // Scale the accumulators into dt-sized increments. Momentum picks up the
    // surface-gradient forcing g * h * S before scaling.
    let g = config.g;
    {
        let dhdt = ws.dhdt.level_mut(level);
        for (c, v) in dhdt.iter_mut().enumerate() {
            *v = *v / geom.cell_area[c] * dt;
        }
    }
    {
        let h = state.h.level(level);
        let s_x = ws.s_x.level(level);
        let dqxdt = ws.dqxdt.level_mut(level);
        for (c, v) in dqxdt.iter_mut().enumerate() {
            *v = (*v / geom.cell_area[c] + g * h[c] * s_x[c]) * dt;
        }
        let s_y = ws.s_y.level(level);
        let dqydt = ws.dqydt.level_mut(level);
        for (c, v) in dqydt.iter_mut().enumerate() {
            *v = (*v / geom.cell_area[c] + g * h[c] * s_y[c]) * dt;
        }
    }

    // Commit: the single place the prognostic state changes. The height adds
    // its increment, the momentum subtracts; both net to the conservative
    // divergence-theorem update under the orientation-sign convention.
    {
        let dhdt = ws.dhdt.level(level);
        let h = state.h.level_mut(level);
        for (c, v) in h.iter_mut().enumerate() {
            *v += dhdt[c];
        }
        let dqxdt = ws.dqxdt.level(level);
        let qx = state.qx.level_mut(level);
        for (c, v) in qx.iter_mut().enumerate() {
            *v -= dqxdt[c];
        }
        let dqydt = ws.dqydt.level(level);
        let qy = state.qy.level_mut(level);
        for (c, v) in qy.iter_mut().enumerate() {
            *v -= dqydt[c];
        }
    }

    Ok(())
}

/// CFL-limited time step: fills the per-cell `CFL` field and returns its
/// minimum.
pub fn compute_dt(
    mesh: &TriMesh,
    geom: &GeometricFactors,
    state: &SWEState,
    ws: &mut Workspace,
    config: &SWEConfig,
    level: usize,
) -> Result<f64, SolverError> {
    check_heights(state, level)?;

    let h = state.h.level(level);
    let qx = state.qx.level(level);
    let qy = state.qy.level(level);
    let cfl = config.cfl;
    let g = config.g;

    map_entities(ws.cfl.level_mut(level), |c| {
        let u = qx[c] / h[c];
        let v = qy[c] / h[c];
        let speed = (u * u + v * v).sqrt();
        cfl * geom.min_edge_length(mesh, c) / (speed + (g * h[c]).sqrt())
    });

    min_reduce(ws.cfl.level(level)).ok_or(SolverError::EmptyMesh)
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total number of steps taken (the initial `dt = 0` step included).
    pub n_steps: usize,
    /// Smallest nonzero time step used.
    pub dt_min: f64,
    /// Largest time step used.
    pub dt_max: f64,
    /// Wall-clock seconds spent in the loop.
    pub wall_time: f64,
}

/// Run the simulation to `config.t_final` at vertical level 0.
///
/// The optional callback receives `(step, time, state, workspace)` every
/// `config.output_interval` steps, the hook the diagnostic dump collaborator
/// attaches to.
pub fn run_simulation<C>(
    mesh: &TriMesh,
    geom: &GeometricFactors,
    state: &mut SWEState,
    config: &SWEConfig,
    mut callback: Option<C>,
) -> Result<SimulationResult, SolverError>
where
    C: FnMut(usize, f64, &SWEState, &Workspace),
{
    let level = 0;
    let start = Instant::now();
    let mut ws = Workspace::new(mesh.n_edges(), mesh.n_cells(), state.n_levels());

    let mut t = 0.0;
    let mut dt = 0.0;
    let mut n_steps = 0;
    let mut dt_min = f64::INFINITY;
    let mut dt_max: f64 = 0.0;

    loop {
        step(mesh, geom, state, &mut ws, config, dt, level)?;
        t += dt;
        n_steps += 1;
        if dt > 0.0 {
            dt_min = dt_min.min(dt);
            dt_max = dt_max.max(dt);
        }

        if let (Some(interval), Some(cb)) = (config.output_interval, callback.as_mut()) {
            if n_steps % interval == 0 {
                cb(n_steps, t, state, &ws);
            }
        }
        if config.verbose {
            println!("time {} timestep {} dt {}", t, n_steps, dt);
        }

        if t >= config.t_final {
            break;
        }
        if let Some(max_steps) = config.max_steps {
            if n_steps >= max_steps {
                break;
            }
        }

        dt = compute_dt(mesh, geom, state, &mut ws, config, level)?;
        if t + dt > config.t_final {
            dt = config.t_final - t;
        }
    }

    Ok(SimulationResult {
        final_time: t,
        n_steps,
        dt_min: if dt_min.is_finite() { dt_min } else { 0.0 },
        dt_max,
        wall_time: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(
        nx: usize,
        ny: usize,
    ) -> (TriMesh, GeometricFactors, SWEState, Workspace, SWEConfig) {
        let mesh = TriMesh::equilateral_patch(nx, ny, 1.0);
        let geom = GeometricFactors::compute(&mesh).unwrap();
        let state = SWEState::at_rest(mesh.n_cells(), 1, 2.0);
        let ws = Workspace::new(mesh.n_edges(), mesh.n_cells(), 1);
        let config = SWEConfig::default();
        (mesh, geom, state, ws, config)
    }

    #[test]
    fn test_config_builders() {
        let config = SWEConfig::default()
            .with_cfl(0.1)
            .without_damping()
            .with_friction(0.03)
            .with_t_final(1.0)
            .with_max_steps(100);

        assert_eq!(config.cfl, 0.1);
        assert!(config.damping.is_none());
        assert_eq!(config.manning_n, Some(0.03));
        assert_eq!(config.t_final, 1.0);
        assert_eq!(config.max_steps, Some(100));
    }

    #[test]
    fn test_zero_dt_step_is_identity() {
        let (mesh, geom, mut state, mut ws, config) = setup(3, 3);
        let before = state.clone();

        step(&mesh, &geom, &mut state, &mut ws, &config, 0.0, 0).unwrap();

        for c in 0..state.n_cells() {
            assert_eq!(state.h.get(c, 0), before.h.get(c, 0));
            assert_eq!(state.qx.get(c, 0), before.qx.get(c, 0));
            assert_eq!(state.qy.get(c, 0), before.qy.get(c, 0));
        }
    }

    #[test]
    fn test_compute_dt_at_rest() {
        let (mesh, geom, state, mut ws, config) = setup(3, 3);
        let dt = compute_dt(&mesh, &geom, &state, &mut ws, &config, 0).unwrap();

        // All cells identical: dt = cfl * L_min / sqrt(g h).
        let expected = config.cfl * 1.0 / (config.g * 2.0).sqrt();
        assert!((dt - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cfl_linear_in_coefficient() {
        let (mesh, geom, state, mut ws, config) = setup(3, 3);
        let dt1 = compute_dt(&mesh, &geom, &state, &mut ws, &config, 0).unwrap();
        let config2 = config.with_cfl(0.1);
        let dt2 = compute_dt(&mesh, &geom, &state, &mut ws, &config2, 0).unwrap();

        assert!((dt2 / dt1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_height_is_fatal() {
        let (mesh, geom, mut state, mut ws, config) = setup(2, 2);
        state.h.set(3, 0, -0.5);

        let result = step(&mesh, &geom, &mut state, &mut ws, &config, 0.0, 0);
        assert!(matches!(
            result,
            Err(SolverError::NonPositiveHeight { cell: 3, .. })
        ));
    }

    #[test]
    fn test_run_reaches_final_time() {
        let (mesh, geom, mut state, _ws, _config) = setup(4, 4);
        let config = SWEConfig::default().with_t_final(0.05);

        let result = run_simulation(
            &mesh,
            &geom,
            &mut state,
            &config,
            None::<fn(usize, f64, &SWEState, &Workspace)>,
        )
        .unwrap();

        assert!((result.final_time - 0.05).abs() < 1e-12);
        assert!(result.n_steps >= 2);
        assert!(result.dt_max > 0.0);
    }

    #[test]
    fn test_max_steps_cap() {
        let (mesh, geom, mut state, _ws, _config) = setup(4, 4);
        let config = SWEConfig::default().with_t_final(1e6).with_max_steps(5);

        let result = run_simulation(
            &mesh,
            &geom,
            &mut state,
            &config,
            None::<fn(usize, f64, &SWEState, &Workspace)>,
        )
        .unwrap();

        assert_eq!(result.n_steps, 5);
        assert!(result.final_time < 1e6);
    }

    #[test]
    fn test_callback_cadence() {
        let (mesh, geom, mut state, _ws, _config) = setup(3, 3);
        let config = SWEConfig::default()
            .with_t_final(1e6)
            .with_max_steps(10)
            .with_output_interval(3);

        let mut calls = Vec::new();
        let result = run_simulation(
            &mesh,
            &geom,
            &mut state,
            &config,
            Some(|step: usize, _t: f64, _s: &SWEState, _w: &Workspace| calls.push(step)),
        )
        .unwrap();

        assert_eq!(result.n_steps, 10);
        assert_eq!(calls, vec![3, 6, 9]);
    }
}
