// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Neutrals
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Neutral thermosphere dynamics: hydrostatic initialization, the
//! horizontal momentum and energy equations, and flux-form continuity.
//!
//! The vertical wind is identically zero (hydrostatic closure);
//! vertical heat transport happens through the implicit conduction
//! solve, one tridiagonal system per column. Densities advance with
//! the conservative donor-cell divergence plus the semi-implicit
//! chemistry update, so they stay nonnegative for any stable dt.

use ndarray::Array3;
use rayon::prelude::*;

use geospace_math::integrate::semi_implicit_density;
use geospace_math::transform::get_vector_component;
use geospace_math::tridiag::thomas_solve_in_place;
use geospace_types::config::GeospaceConfig;
use geospace_types::constants::{
    G_SURFACE, GAMMA_NEUTRAL, K_BOLTZMANN, OMEGA_EARTH, R_EARTH,
};
use geospace_types::error::GeospaceResult;
use geospace_types::indices::NeutralSpecies;
use geospace_types::state::{Component, Frame, NeutralState, VectorField};

use crate::chemistry::ChemistryRates;
use crate::grid::GeoGrid;

/// Hard lower bound on the neutral temperature [K].
pub const TEMPERATURE_FLOOR_K: f64 = 150.0;

/// Post-update neutral density floor [m^-3].
pub const NEUTRAL_DENSITY_FLOOR: f64 = 1.0e6;

/// Neutral-on-ion drag frequency coefficient [m^3/s], multiplied by
/// the electron density.
const NU_NI_COEFF: f64 = 1.0e-16;

/// Thermal conductivity κ = KAPPA_COEFF · T^KAPPA_EXP [W m^-1 K^-1].
const KAPPA_COEFF: f64 = 5.6e-4;
const KAPPA_EXP: f64 = 0.69;

/// Nitric-oxide 5.3 µm radiative cooling, optically thin:
/// Q = NO_COOLING_COEFF · n_NO · exp(−NO_COOLING_T / T) [W/m^3].
const NO_COOLING_COEFF: f64 = 4.956e-19;
const NO_COOLING_T: f64 = 2700.0;

/// Gravitational acceleration at geocentric radius r [m/s^2].
#[inline]
fn gravity(r: f64) -> f64 {
    G_SURFACE * (R_EARTH / r) * (R_EARTH / r)
}

/// Isothermal hydrostatic initial state.
///
/// Each species decays from its configured base density with its own
/// local scale height H = kT/(mg), integrated level by level so the
/// g(r) falloff is respected.
pub fn initial_state(grid: &GeoGrid, config: &GeospaceConfig) -> NeutralState {
    let mut state = NeutralState::new(grid.dim());
    let t0 = config.initial.temperature_k;
    state.temperature.fill(t0);

    for s in NeutralSpecies::ALL {
        let m = s.mass_kg();
        let mut profile = vec![0.0f64; grid.nalt];
        let h0 = K_BOLTZMANN * t0 / (m * gravity(grid.radii[0]));
        profile[0] = config.initial.base_density(s)
            * (-(grid.alts[0] - config.grid.alt_min_m) / h0).exp();
        for k in 1..grid.nalt {
            let h = K_BOLTZMANN * t0 / (m * gravity(grid.radii[k]));
            profile[k] = profile[k - 1] * (-grid.metrics.dr / h).exp();
        }

        let cube = state.density_mut(s);
        for k in 0..grid.nalt {
            cube.index_axis_mut(ndarray::Axis(2), k).fill(profile[k]);
        }
    }
    state
}

/// Advance winds, temperature, and densities by one step.
///
/// `ion_drift` must be geographic; `electron_density` scales the ion
/// drag. Returns the number of density cells raised to the floor.
pub fn advance(
    grid: &GeoGrid,
    state: &mut NeutralState,
    ion_drift: &VectorField,
    electron_density: &Array3<f64>,
    chem: &ChemistryRates,
    euv_heating: &Array3<f64>,
    dt: f64,
) -> GeospaceResult<usize> {
    let drift_e = get_vector_component(ion_drift, Component::East, Frame::Geographic)?;
    let drift_n = get_vector_component(ion_drift, Component::North, Frame::Geographic)?;

    let (nlon, nlat, nalt) = grid.dim();
    let dim = grid.dim();
    let metrics = &grid.metrics;
    let zero_w = Array3::zeros(dim);

    // Frozen copies of the fields every equation reads.
    let ue = state.wind.east.clone();
    let un = state.wind.north.clone();
    let temp = state.temperature.clone();
    let rho = state.mass_density();
    let n_total = state.total_density();

    // ── Momentum (horizontal) ────────────────────────────────────────
    let pressure = {
        let mut p = Array3::zeros(dim);
        ndarray::Zip::from(&mut p)
            .and(&n_total)
            .and(&temp)
            .for_each(|p, &n, &t| *p = n * K_BOLTZMANN * t);
        p
    };

    let adv_ue = metrics.advect(&ue, &ue, &un, &zero_w);
    let adv_un = metrics.advect(&un, &ue, &un, &zero_w);

    for i in 0..nlon {
        let ip = (i + 1) % nlon;
        let im = (i + nlon - 1) % nlon;
        for j in 0..nlat {
            let f_cor = 2.0 * OMEGA_EARTH * grid.lats[j].sin();
            for k in 0..nalt {
                let c = [i, j, k];
                let dpde = (pressure[[ip, j, k]] - pressure[[im, j, k]])
                    / (2.0 * metrics.dx_east[c]);
                let dpdn = if j == 0 {
                    (pressure[[i, 1, k]] - pressure[[i, 0, k]]) / metrics.dx_north[c]
                } else if j == nlat - 1 {
                    (pressure[[i, j, k]] - pressure[[i, j - 1, k]]) / metrics.dx_north[c]
                } else {
                    (pressure[[i, j + 1, k]] - pressure[[i, j - 1, k]])
                        / (2.0 * metrics.dx_north[c])
                };

                let nu_ni = NU_NI_COEFF * electron_density[c];
                let acc_e = -dpde / rho[c] + f_cor * un[c] + nu_ni * (drift_e[c] - ue[c]);
                let acc_n = -dpdn / rho[c] - f_cor * ue[c] + nu_ni * (drift_n[c] - un[c]);

                state.wind.east[c] = ue[c] + dt * (-adv_ue[c] + acc_e);
                state.wind.north[c] = un[c] + dt * (-adv_un[c] + acc_n);
            }
        }
    }
    // Hydrostatic closure.
    state.wind.up.fill(0.0);

    // ── Energy ───────────────────────────────────────────────────────
    let adv_t = metrics.advect(&temp, &ue, &un, &zero_w);
    let div_u = metrics.divergence(&ue, &un, &zero_w);
    let n_no = state.density(NeutralSpecies::NO).clone();

    let mut t_star = Array3::zeros(dim);
    ndarray::Zip::indexed(&mut t_star).for_each(|c, t| {
        let m_mean = rho[c] / n_total[c].max(1.0);
        let c_v = 1.5 * K_BOLTZMANN / m_mean;
        let q_no = NO_COOLING_COEFF * n_no[c] * (-NO_COOLING_T / temp[c]).exp();
        let heat = (euv_heating[c] - q_no) / (rho[c] * c_v);
        *t = temp[c]
            + dt * (-adv_t[c] - (GAMMA_NEUTRAL - 1.0) * temp[c] * div_u[c] + heat);
    });

    // Implicit vertical conduction, bottom row Dirichlet, top zero-flux.
    let dr2 = metrics.dr * metrics.dr;
    let mut a = vec![0.0f64; nalt];
    let mut b = vec![0.0f64; nalt];
    let mut cband = vec![0.0f64; nalt];
    let mut d = vec![0.0f64; nalt];
    let mut scratch = vec![0.0f64; nalt];
    for i in 0..nlon {
        for j in 0..nlat {
            for k in 0..nalt {
                d[k] = t_star[[i, j, k]];
            }
            a[0] = 0.0;
            b[0] = 1.0;
            cband[0] = 0.0;
            for k in 1..nalt {
                let cell = [i, j, k];
                let m_mean = rho[cell] / n_total[cell].max(1.0);
                let c_v = 1.5 * K_BOLTZMANN / m_mean;
                let rc = (rho[cell] * c_v).max(1e-30);
                let kappa_lo =
                    KAPPA_COEFF * (0.5 * (d[k - 1] + d[k])).max(1.0).powf(KAPPA_EXP);
                let kappa_hi = if k + 1 < nalt {
                    KAPPA_COEFF * (0.5 * (d[k] + d[k + 1])).max(1.0).powf(KAPPA_EXP)
                } else {
                    0.0
                };
                a[k] = -dt * kappa_lo / (rc * dr2);
                cband[k] = -dt * kappa_hi / (rc * dr2);
                b[k] = 1.0 - a[k] - cband[k];
            }
            thomas_solve_in_place(&a, &b, &cband, &mut d, &mut scratch);
            for k in 0..nalt {
                state.temperature[[i, j, k]] = d[k].max(TEMPERATURE_FLOOR_K);
            }
        }
    }

    // ── Continuity (flux form, per species, in parallel) ─────────────
    let density_in = &state.density;
    let updated: Vec<(Array3<f64>, usize)> = NeutralSpecies::ALL
        .into_par_iter()
        .map(|s| {
            let n = &density_in[s.idx()];
            let tend = metrics.flux_divergence(n, &ue, &un, &zero_w);
            let mut n_star = n.clone();
            n_star.scaled_add(dt, &tend);
            semi_implicit_density(
                &n_star,
                &chem.neutral_production[s.idx()],
                &chem.neutral_loss_freq[s.idx()],
                dt,
                NEUTRAL_DENSITY_FLOOR,
            )
        })
        .collect();

    let mut floored = 0usize;
    for (s, (cube, hits)) in NeutralSpecies::ALL.into_iter().zip(updated) {
        state.density[s.idx()] = cube;
        floored += hits;
    }

    Ok(floored)
}
