// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Ions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ion dynamics: drift-plus-parallel-wind velocities, flux-form
//! continuity with the semi-implicit chemistry update, and the ion and
//! electron temperature relaxation.
//!
//! Ion motion is the E×B drift (species independent) plus the neutral
//! wind projected onto the field line. The ion temperature follows the
//! neutrals plus frictional heating from the ion-neutral velocity
//! difference; the electron temperature relaxes toward a dayside
//! target on a fixed timescale.

use ndarray::{Array2, Array3};
use rayon::prelude::*;

use geospace_math::integrate::semi_implicit_density;
use geospace_math::transform::get_vector_component;
use geospace_types::config::GeospaceConfig;
use geospace_types::constants::K_BOLTZMANN;
use geospace_types::error::GeospaceResult;
use geospace_types::indices::IonSpecies;
use geospace_types::state::{Component, Frame, IonState, NeutralState, VectorField};

use crate::chemistry::ChemistryRates;
use crate::grid::GeoGrid;

/// Post-update ion density floor [m^-3].
pub const ION_DENSITY_FLOOR: f64 = 1.0e3;

/// Electron temperature relaxation timescale [s].
const TE_RELAX_S: f64 = 300.0;

/// Dayside electron temperature excess over the neutrals at overhead
/// sun [K]; scales with the zenith cosine.
const TE_DAYSIDE_BOOST_K: f64 = 1500.0;

/// Electron temperature ceiling [K].
const TE_MAX_K: f64 = 6000.0;

/// Uniform seed ionosphere: the configured density split evenly over
/// the species, temperatures tied to the initial neutral temperature.
pub fn initial_state(grid: &GeoGrid, config: &GeospaceConfig) -> IonState {
    let mut state = IonState::new(grid.dim());
    let per_species = config.initial.ion_density_m3 / IonSpecies::COUNT as f64;
    for s in IonSpecies::ALL {
        state.density_mut(s).fill(per_species);
    }
    state.temperature.fill(config.initial.temperature_k);
    state
        .electron_temperature
        .fill(config.initial.temperature_k + 500.0);
    state.update_electron_density();
    state
}

/// Advance densities, velocities, and temperatures by one step.
///
/// `drift` is the E×B field from the electrodynamics solve and must be
/// geographic. `cos_chi` is the per-column solar zenith cosine.
/// Returns the number of density cells raised to the floor.
pub fn advance(
    grid: &GeoGrid,
    state: &mut IonState,
    neutrals: &NeutralState,
    drift: &VectorField,
    chem: &ChemistryRates,
    cos_chi: &Array2<f64>,
    dt: f64,
) -> GeospaceResult<usize> {
    let drift_e = get_vector_component(drift, Component::East, Frame::Geographic)?;
    let drift_n = get_vector_component(drift, Component::North, Frame::Geographic)?;
    let drift_u = get_vector_component(drift, Component::Up, Frame::Geographic)?;

    let dim = grid.dim();
    let (nlon, nlat, nalt) = dim;

    // Common ion velocity: E×B drift plus the field-aligned part of
    // the neutral wind.
    let mut v_e = Array3::zeros(dim);
    let mut v_n = Array3::zeros(dim);
    let mut v_u = Array3::zeros(dim);
    for i in 0..nlon {
        for j in 0..nlat {
            for k in 0..nalt {
                let c = [i, j, k];
                let b = grid.b_mag[c].max(1e-12);
                let be = grid.b_east[c] / b;
                let bn = grid.b_north[c] / b;
                let bu = grid.b_up[c] / b;
                let u_par =
                    neutrals.wind.east[c] * be + neutrals.wind.north[c] * bn;
                v_e[c] = drift_e[c] + u_par * be;
                v_n[c] = drift_n[c] + u_par * bn;
                v_u[c] = drift_u[c] + u_par * bu;
            }
        }
    }
    for s in IonSpecies::ALL {
        let field = &mut state.velocity[s.idx()];
        field.frame = Frame::Geographic;
        field.east.assign(&v_e);
        field.north.assign(&v_n);
        field.up.assign(&v_u);
    }

    // Continuity per species, in parallel.
    let metrics = &grid.metrics;
    let density_in = &state.density;
    let updated: Vec<(Array3<f64>, usize)> = IonSpecies::ALL
        .into_par_iter()
        .map(|s| {
            let n = &density_in[s.idx()];
            let tend = metrics.flux_divergence(n, &v_e, &v_n, &v_u);
            let mut n_star = n.clone();
            n_star.scaled_add(dt, &tend);
            semi_implicit_density(
                &n_star,
                &chem.ion_production[s.idx()],
                &chem.ion_loss_freq[s.idx()],
                dt,
                ION_DENSITY_FLOOR,
            )
        })
        .collect();

    let mut floored = 0usize;
    for (s, (cube, hits)) in IonSpecies::ALL.into_iter().zip(updated) {
        state.density[s.idx()] = cube;
        floored += hits;
    }
    state.update_electron_density();

    // Temperatures. Frictional heating uses the density-weighted mean
    // ion mass of the updated composition.
    for i in 0..nlon {
        for j in 0..nlat {
            let mu = cos_chi[[i, j]].max(0.0);
            for k in 0..nalt {
                let c = [i, j, k];
                let tn = neutrals.temperature[c];

                let mut mass_sum = 0.0;
                let mut n_sum = 0.0;
                for s in IonSpecies::ALL {
                    mass_sum += state.density[s.idx()][c] * s.mass_kg();
                    n_sum += state.density[s.idx()][c];
                }
                let m_ion = mass_sum / n_sum.max(ION_DENSITY_FLOOR);

                let dv_e = v_e[c] - neutrals.wind.east[c];
                let dv_n = v_n[c] - neutrals.wind.north[c];
                let dv_u = v_u[c] - neutrals.wind.up[c];
                let dv2 = dv_e * dv_e + dv_n * dv_n + dv_u * dv_u;
                state.temperature[c] = tn + m_ion * dv2 / (3.0 * K_BOLTZMANN);

                let target = (tn + TE_DAYSIDE_BOOST_K * mu).min(TE_MAX_K);
                let te = state.electron_temperature[c];
                state.electron_temperature[c] =
                    (te + dt / TE_RELAX_S * (target - te)).clamp(tn, TE_MAX_K);
            }
        }
    }

    Ok(floored)
}
