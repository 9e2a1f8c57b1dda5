// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Advance
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Step orchestration: the fixed stage pipeline, adaptive timestep
//! control with snapshot/reject/retry, and the run loop.
//!
//! One step runs EUV forcing, chemistry, the electrodynamic solve (on
//! the frame-reconciled magnetic wind), then the neutral and ion
//! advances. The finished step is validated against the acoustic
//! Courant bound; a too-long step is rolled back to the snapshot and
//! retried with a shorter dt. A dt that falls below the configured
//! floor is fatal, reported with the cell that set the bound.

use std::time::Instant;

use tracing::{debug, info, warn};

use geospace_math::transform::{vector_env_to_xyz, vector_xyz_to_env};
use geospace_types::config::GeospaceConfig;
use geospace_types::constants::{GAMMA_NEUTRAL, K_BOLTZMANN};
use geospace_types::error::{GeospaceError, GeospaceResult};
use geospace_types::state::{
    AdvanceSummary, Frame, IonState, NeutralState, StepDiagnostics, VectorField,
};

use crate::bfield::Dipole;
use crate::chemistry::{self, ChemistryRates};
use crate::electrodynamics::ElectroSolver;
use crate::euv::{EuvModel, EuvRates};
use crate::grid::GeoGrid;
use crate::ions;
use crate::neutrals;

/// Safety factor applied to the raw Courant bound.
const CFL_SAFETY: f64 = 0.8;

/// Growth cap for the timestep after an accepted step.
const DT_GROWTH: f64 = 1.2;

/// Per-stage switches, mainly for controlled experiments; a production
/// run keeps everything on.
#[derive(Debug, Clone, Copy)]
pub struct StageToggles {
    pub euv: bool,
    pub chemistry: bool,
    pub electrodynamics: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        StageToggles {
            euv: true,
            chemistry: true,
            electrodynamics: true,
        }
    }
}

/// The coupled model: grid, field, solvers, and both fluid states.
pub struct AdvanceKernel {
    config: GeospaceConfig,
    dipole: Dipole,
    grid: GeoGrid,
    euv: EuvModel,
    electro: ElectroSolver,
    neutrals: NeutralState,
    ions: IonState,
    toggles: StageToggles,
    sim_time_s: f64,
    dt: f64,
    totals: StepDiagnostics,
}

impl AdvanceKernel {
    /// Build the model from a validated configuration.
    pub fn new(config: GeospaceConfig) -> GeospaceResult<Self> {
        config.validate()?;
        let dipole = Dipole::default();
        let grid = GeoGrid::new(&config.grid, &dipole);
        let euv = EuvModel::new(&config.solar);
        let electro = ElectroSolver::new(&config.electro)?;
        let neutrals = neutrals::initial_state(&grid, &config);
        let ions = ions::initial_state(&grid, &config);
        let dt = config.time.dt_initial_s;
        info!(
            name = %config.name,
            nlon = grid.nlon,
            nlat = grid.nlat,
            nalt = grid.nalt,
            dt_initial = dt,
            "model initialized"
        );
        Ok(AdvanceKernel {
            config,
            dipole,
            grid,
            euv,
            electro,
            neutrals,
            ions,
            toggles: StageToggles::default(),
            sim_time_s: 0.0,
            dt,
            totals: StepDiagnostics::default(),
        })
    }

    /// Load, validate, and build from a JSON config file.
    pub fn from_file(path: &str) -> GeospaceResult<Self> {
        Self::new(GeospaceConfig::from_file(path)?)
    }

    pub fn config(&self) -> &GeospaceConfig {
        &self.config
    }

    pub fn grid(&self) -> &GeoGrid {
        &self.grid
    }

    pub fn dipole(&self) -> &Dipole {
        &self.dipole
    }

    pub fn neutrals(&self) -> &NeutralState {
        &self.neutrals
    }

    pub fn neutrals_mut(&mut self) -> &mut NeutralState {
        &mut self.neutrals
    }

    pub fn ions(&self) -> &IonState {
        &self.ions
    }

    pub fn ions_mut(&mut self) -> &mut IonState {
        &mut self.ions
    }

    pub fn sim_time_s(&self) -> f64 {
        self.sim_time_s
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn totals(&self) -> &StepDiagnostics {
        &self.totals
    }

    pub fn set_toggles(&mut self, toggles: StageToggles) {
        self.toggles = toggles;
    }

    /// Neutral wind re-expressed in geomagnetic east/north/up, the form
    /// the dynamo solve consumes.
    fn wind_in_mag_frame(&self) -> VectorField {
        let dim = self.grid.dim();
        let mut out = VectorField::zeros(Frame::Geomagnetic, dim);
        for i in 0..self.grid.nlon {
            for j in 0..self.grid.nlat {
                let mlon = self.grid.mlon[[i, j]];
                let mlat = self.grid.mlat[[i, j]];
                for k in 0..self.grid.nalt {
                    let v = self.neutrals.wind.at(i, j, k);
                    let xyz = vector_env_to_xyz(v, self.grid.lons[i], self.grid.lats[j]);
                    let env = vector_xyz_to_env(self.dipole.to_mag_xyz(xyz), mlon, mlat);
                    out.east[[i, j, k]] = env[0];
                    out.north[[i, j, k]] = env[1];
                    out.up[[i, j, k]] = env[2];
                }
            }
        }
        out
    }

    /// Fastest signal speed |u| + c_s over the grid and the cell that
    /// carries it. Non-finite state reports an infinite speed.
    fn max_signal_speed(&self) -> (f64, [usize; 3]) {
        let rho = self.neutrals.mass_density();
        let n_total = self.neutrals.total_density();
        let mut worst = 0.0f64;
        let mut cell = [0usize; 3];
        for i in 0..self.grid.nlon {
            for j in 0..self.grid.nlat {
                for k in 0..self.grid.nalt {
                    let c = [i, j, k];
                    let u = self.neutrals.wind.at(i, j, k);
                    let v = self.ions.velocity[0].at(i, j, k);
                    let flow = (u[0] * u[0] + u[1] * u[1])
                        .max(v[0] * v[0] + v[1] * v[1] + v[2] * v[2])
                        .sqrt();
                    let m_mean = rho[c] / n_total[c].max(1.0);
                    let c_s =
                        (GAMMA_NEUTRAL * K_BOLTZMANN * self.neutrals.temperature[c] / m_mean)
                            .sqrt();
                    let signal = flow + c_s;
                    if !signal.is_finite() {
                        return (f64::INFINITY, c);
                    }
                    if signal > worst {
                        worst = signal;
                        cell = c;
                    }
                }
            }
        }
        (worst, cell)
    }

    /// Advance one step, retrying with shorter dt until the result
    /// satisfies the Courant bound.
    pub fn step(&mut self) -> GeospaceResult<StepDiagnostics> {
        let snapshot_neutrals = self.neutrals.clone();
        let snapshot_ions = self.ions.clone();
        let dim = self.grid.dim();
        let min_spacing = self.grid.metrics.min_spacing();
        let mut diag = StepDiagnostics::default();

        loop {
            let euv_rates = if self.toggles.euv {
                self.euv.compute(&self.grid, &self.neutrals, self.sim_time_s)
            } else {
                EuvRates::dark(dim)
            };
            diag.nightside_clamps = euv_rates.nightside_clamps;

            let chem = if self.toggles.chemistry {
                chemistry::compute(&self.neutrals, &self.ions, &euv_rates)
            } else {
                ChemistryRates::quiet(dim)
            };
            diag.chemistry_floor_hits = chem.floored;

            let drift = if self.toggles.electrodynamics {
                let wind_mag = self.wind_in_mag_frame();
                let fields = self.electro.solve(
                    &self.grid,
                    &self.dipole,
                    &self.neutrals,
                    &self.ions,
                    &wind_mag,
                )?;
                diag.conductance_floor_hits = fields.conductance_floor_hits;
                fields.drift
            } else {
                VectorField::zeros(Frame::Geographic, dim)
            };

            let mut density_floor_hits = neutrals::advance(
                &self.grid,
                &mut self.neutrals,
                &drift,
                &self.ions.electron_density,
                &chem,
                &euv_rates.heating,
                self.dt,
            )?;
            density_floor_hits += ions::advance(
                &self.grid,
                &mut self.ions,
                &self.neutrals,
                &drift,
                &chem,
                &euv_rates.cos_chi,
                self.dt,
            )?;
            diag.density_floor_hits = density_floor_hits;

            let (signal, cell) = self.max_signal_speed();
            let bound = CFL_SAFETY * min_spacing / signal;
            if self.dt <= bound {
                self.sim_time_s += self.dt;
                self.dt = (self.dt * DT_GROWTH).min(self.config.time.dt_max_s).min(bound);
                debug!(
                    t = self.sim_time_s,
                    dt = self.dt,
                    signal,
                    "step accepted"
                );
                self.totals.accumulate(&diag);
                return Ok(diag);
            }

            // Reject: roll back and shorten.
            self.neutrals = snapshot_neutrals.clone();
            self.ions = snapshot_ions.clone();
            diag.retries += 1;
            let next_dt = bound.min(0.5 * self.dt);
            warn!(
                dt = self.dt,
                next_dt, signal, ?cell, "step rejected by Courant bound"
            );
            if next_dt < self.config.time.dt_min_s {
                self.totals.accumulate(&diag);
                return Err(GeospaceError::UnstableTimestep {
                    dt: next_dt,
                    dt_min: self.config.time.dt_min_s,
                    lon: cell[0],
                    lat: cell[1],
                    alt: cell[2],
                    message: format!("signal speed {signal:.1} m/s over {min_spacing:.0} m"),
                });
            }
            self.dt = next_dt;
        }
    }

    /// Run for the configured duration, invoking the observer at the
    /// output cadence.
    pub fn run<F>(&mut self, mut observer: F) -> GeospaceResult<AdvanceSummary>
    where
        F: FnMut(f64, &NeutralState, &IonState),
    {
        let wall_start = Instant::now();
        let t_end = self.sim_time_s + self.config.time.duration_s;
        let cadence = self.config.time.output_cadence_s;
        let mut next_output = self.sim_time_s + cadence;
        let mut steps = 0usize;
        let mut retries = 0usize;

        while self.sim_time_s < t_end - 1e-9 {
            // Never overshoot the end time.
            let remaining = t_end - self.sim_time_s;
            if self.dt > remaining {
                self.dt = remaining;
            }
            let diag = self.step()?;
            steps += 1;
            retries += diag.retries;

            while self.sim_time_s >= next_output - 1e-9 {
                observer(self.sim_time_s, &self.neutrals, &self.ions);
                next_output += cadence;
            }
        }

        let summary = AdvanceSummary {
            steps,
            retries,
            simulated_s: self.sim_time_s,
            final_dt_s: self.dt,
            wall_time_ms: wall_start.elapsed().as_secs_f64() * 1.0e3,
            totals: self.totals,
        };
        info!(
            steps = summary.steps,
            retries = summary.retries,
            simulated_s = summary.simulated_s,
            wall_ms = summary.wall_time_ms,
            "run complete"
        );
        Ok(summary)
    }
}
