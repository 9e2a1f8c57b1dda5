// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — EUV Forcing
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Solar EUV ionization and heating.
//!
//! A banded irradiance model scaled by the F10.7 proxy pair, attenuated
//! through per-species slant columns with the Chapman grazing-incidence
//! function. Output is per-ion photoionization rates and the volumetric
//! neutral heating rate. Cells with the sun at or below the horizon are
//! clamped to the configured nightside floor and counted.

use ndarray::{Array2, Array3};

use geospace_math::special::chapman;
use geospace_math::transform::{llr_to_xyz, vector_xyz_to_env};
use geospace_types::config::SolarConfig;
use geospace_types::constants::{C_LIGHT, G_SURFACE, H_PLANCK, K_BOLTZMANN, OMEGA_EARTH, R_EARTH};
use geospace_types::indices::{IonSpecies, NeutralSpecies};
use geospace_types::state::NeutralState;

use crate::grid::GeoGrid;

/// Number of irradiance bands.
pub const N_BANDS: usize = 6;

/// Band-center wavelengths [m].
const BAND_WAVELENGTH: [f64; N_BANDS] =
    [7.5e-9, 17.5e-9, 25.0e-9, 30.4e-9, 62.5e-9, 97.5e-9];

/// Quiet-sun reference photon flux per band [photons m^-2 s^-1].
const BAND_FLUX_REF: [f64; N_BANDS] = [1.0e12, 3.5e13, 1.5e13, 6.0e13, 1.5e13, 4.5e13];

/// Linear solar-activity scaling coefficient per band, applied to the
/// proxy p = (F10.7 + F10.7a) / 2 relative to 80 sfu.
const BAND_SCALE: [f64; N_BANDS] = [0.012, 0.010, 0.008, 0.004, 0.006, 0.003];

/// Solar-activity scale factors never drop below this, even for proxy
/// values under 80 sfu.
const MIN_BAND_SCALE: f64 = 0.8;

/// Absorption cross sections per band [m^2]. Only O, O2, N2 absorb in
/// this range; N and NO are optically thin trace species.
const SIGMA_ABS_O: [f64; N_BANDS] = [0.7e-22, 3.2e-22, 8.0e-22, 8.5e-22, 11.0e-22, 3.0e-22];
const SIGMA_ABS_O2: [f64; N_BANDS] = [1.0e-22, 5.0e-22, 13.0e-22, 16.0e-22, 24.0e-22, 14.0e-22];
const SIGMA_ABS_N2: [f64; N_BANDS] = [0.8e-22, 6.0e-22, 12.0e-22, 11.0e-22, 23.0e-22, 2.0e-22];

/// Ionization cross sections per band [m^2]. Bands past a species'
/// ionization threshold carry zero.
const SIGMA_ION_O: [f64; N_BANDS] = [0.7e-22, 3.2e-22, 8.0e-22, 8.5e-22, 11.0e-22, 0.0];
const SIGMA_ION_O2: [f64; N_BANDS] = [1.0e-22, 5.0e-22, 12.0e-22, 14.0e-22, 22.0e-22, 8.0e-22];
const SIGMA_ION_N2: [f64; N_BANDS] = [0.8e-22, 6.0e-22, 11.5e-22, 10.5e-22, 22.0e-22, 0.0];

fn sigma_abs(s: NeutralSpecies) -> &'static [f64; N_BANDS] {
    match s {
        NeutralSpecies::O => &SIGMA_ABS_O,
        NeutralSpecies::O2 => &SIGMA_ABS_O2,
        NeutralSpecies::N2 => &SIGMA_ABS_N2,
        NeutralSpecies::N | NeutralSpecies::NO => &[0.0; N_BANDS],
    }
}

fn sigma_ion(s: NeutralSpecies) -> &'static [f64; N_BANDS] {
    match s {
        NeutralSpecies::O => &SIGMA_ION_O,
        NeutralSpecies::O2 => &SIGMA_ION_O2,
        NeutralSpecies::N2 => &SIGMA_ION_N2,
        NeutralSpecies::N | NeutralSpecies::NO => &[0.0; N_BANDS],
    }
}

/// Photoionization and heating rates for one evaluation time.
#[derive(Debug, Clone)]
pub struct EuvRates {
    /// Ion production per species, indexed by `IonSpecies::idx()` [m^-3 s^-1].
    pub ionization: Vec<Array3<f64>>,
    /// Volumetric neutral heating [W/m^3].
    pub heating: Array3<f64>,
    /// Cosine of the solar zenith angle per column.
    pub cos_chi: Array2<f64>,
    /// Cells clamped to the nightside floor.
    pub nightside_clamps: usize,
}

impl EuvRates {
    /// All-zero rates, used when the EUV stage is disabled.
    pub fn dark(dim: (usize, usize, usize)) -> Self {
        EuvRates {
            ionization: (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect(),
            heating: Array3::zeros(dim),
            cos_chi: Array2::zeros((dim.0, dim.1)),
            nightside_clamps: 0,
        }
    }
}

/// Banded EUV irradiance model with activity scaling baked in at
/// construction.
#[derive(Debug, Clone)]
pub struct EuvModel {
    solar: SolarConfig,
    /// Activity-scaled photon flux per band [photons m^-2 s^-1].
    flux: [f64; N_BANDS],
    /// Photon energy per band [J].
    energy: [f64; N_BANDS],
}

impl EuvModel {
    pub fn new(solar: &SolarConfig) -> Self {
        let p = 0.5 * (solar.f107 + solar.f107a);
        let mut flux = [0.0; N_BANDS];
        let mut energy = [0.0; N_BANDS];
        for b in 0..N_BANDS {
            let scale = (1.0 + BAND_SCALE[b] * (p - 80.0)).max(MIN_BAND_SCALE);
            flux[b] = BAND_FLUX_REF[b] * scale;
            energy[b] = H_PLANCK * C_LIGHT / BAND_WAVELENGTH[b];
        }
        EuvModel {
            solar: solar.clone(),
            flux,
            energy,
        }
    }

    /// Subsolar longitude at simulation time t; the subsolar point
    /// drifts westward as the planet rotates under the sun.
    pub fn subsolar_lon(&self, sim_time_s: f64) -> f64 {
        self.solar.subsolar_lon_deg.to_radians() - OMEGA_EARTH * sim_time_s
    }

    /// Unit vector toward the sun in geographic Cartesian coordinates.
    fn sun_unit(&self, sim_time_s: f64) -> [f64; 3] {
        llr_to_xyz([
            self.subsolar_lon(sim_time_s),
            self.solar.declination_deg.to_radians(),
            1.0,
        ])
    }

    /// Evaluate ionization and heating over the whole grid.
    pub fn compute(&self, grid: &GeoGrid, neutrals: &NeutralState, sim_time_s: f64) -> EuvRates {
        let dim = grid.dim();
        let (nlon, nlat, nalt) = dim;
        let sun = self.sun_unit(sim_time_s);

        let mut ionization: Vec<Array3<f64>> =
            (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect();
        let mut heating = Array3::zeros(dim);
        let mut cos_chi = Array2::zeros((nlon, nlat));
        let mut nightside_clamps = 0usize;

        let floor = self.solar.nightside_euv_floor;
        let efficiency = self.solar.heating_efficiency;
        let dr = grid.metrics.dr;
        let rho = neutrals.mass_density();
        let total = neutrals.total_density();

        // Vertical column content per absorbing species, top-seeded by
        // one local scale height of the topmost cell.
        let mut column = vec![vec![0.0f64; nalt]; NeutralSpecies::COUNT];

        for i in 0..nlon {
            for j in 0..nlat {
                // Zenith cosine: up-component of the sun direction in
                // the local east/north/up basis.
                let mu = vector_xyz_to_env(sun, grid.lons[i], grid.lats[j])[2];
                cos_chi[[i, j]] = mu;

                for s in NeutralSpecies::ALL {
                    let n = neutrals.density(s);
                    let ktop = nalt - 1;
                    let g_top = G_SURFACE * (R_EARTH / grid.radii[ktop]).powi(2);
                    let h_top =
                        K_BOLTZMANN * neutrals.temperature[[i, j, ktop]] / (s.mass_kg() * g_top);
                    let mut acc = n[[i, j, ktop]] * h_top;
                    column[s.idx()][ktop] = acc + 0.5 * n[[i, j, ktop]] * dr;
                    for k in (0..ktop).rev() {
                        acc += n[[i, j, k + 1]] * dr;
                        column[s.idx()][k] = acc + 0.5 * n[[i, j, k]] * dr;
                    }
                }

                for k in 0..nalt {
                    if mu <= 0.0 {
                        // Sun below the horizon: optional floor rate,
                        // unattenuated, counted.
                        nightside_clamps += 1;
                        if floor > 0.0 {
                            let mut q_heat = 0.0;
                            for s in NeutralSpecies::ALL {
                                let n_s = neutrals.density(s)[[i, j, k]];
                                let sig_a = sigma_abs(s);
                                for b in 0..N_BANDS {
                                    q_heat += n_s * sig_a[b] * self.flux[b] * self.energy[b];
                                }
                                let Some(ion) = s.photo_ion() else { continue };
                                let q: f64 = (0..N_BANDS)
                                    .map(|b| n_s * sigma_ion(s)[b] * self.flux[b])
                                    .sum();
                                ionization[ion.idx()][[i, j, k]] = floor * q;
                            }
                            heating[[i, j, k]] = efficiency * floor * q_heat;
                        }
                        continue;
                    }

                    // Mean scale height sets the Chapman shape parameter.
                    let g = G_SURFACE * (R_EARTH / grid.radii[k]).powi(2);
                    let m_mean = rho[[i, j, k]] / total[[i, j, k]].max(1.0);
                    let h_mean =
                        (K_BOLTZMANN * neutrals.temperature[[i, j, k]] / (m_mean * g)).max(1.0e3);
                    let ch = chapman(grid.radii[k] / h_mean, mu);

                    // Optical depth per band through the slant column.
                    let mut tau = [0.0f64; N_BANDS];
                    for s in NeutralSpecies::ALL {
                        let slant = column[s.idx()][k] * ch;
                        let sig = sigma_abs(s);
                        for b in 0..N_BANDS {
                            tau[b] += sig[b] * slant;
                        }
                    }
                    let mut attenuated = [0.0f64; N_BANDS];
                    for b in 0..N_BANDS {
                        attenuated[b] = self.flux[b] * (-tau[b]).exp();
                    }

                    let mut q_heat = 0.0;
                    for s in NeutralSpecies::ALL {
                        let n_s = neutrals.density(s)[[i, j, k]];
                        let sig_a = sigma_abs(s);
                        for b in 0..N_BANDS {
                            q_heat += n_s * sig_a[b] * attenuated[b] * self.energy[b];
                        }
                        if let Some(ion) = s.photo_ion() {
                            let sig_i = sigma_ion(s);
                            let q: f64 =
                                (0..N_BANDS).map(|b| n_s * sig_i[b] * attenuated[b]).sum();
                            ionization[ion.idx()][[i, j, k]] = q;
                        }
                    }
                    heating[[i, j, k]] = efficiency * q_heat;
                }
            }
        }

        EuvRates {
            ionization,
            heating,
            cos_chi,
            nightside_clamps,
        }
    }
}
