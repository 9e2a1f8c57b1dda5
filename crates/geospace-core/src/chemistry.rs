// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Chemistry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ion-neutral and recombination chemistry.
//!
//! A compact reaction set for the E/F-region mixture: charge exchange
//! of O+ and N2+ with the molecular neutrals, dissociative
//! recombination of the molecular ions, odd-nitrogen neutral
//! chemistry, and the photoionization sources folded in from the EUV
//! rates. Results are split into production rates [m^-3 s^-1] and loss
//! FREQUENCIES [s^-1] so the caller can advance densities with the
//! positivity-preserving semi-implicit update.

use ndarray::Array3;

use geospace_types::indices::{IonSpecies, NeutralSpecies};
use geospace_types::state::{IonState, NeutralState};

use crate::euv::EuvRates;

/// Density substituted into loss-frequency denominators when the real
/// density is below it, to keep frequencies finite [m^-3].
pub const EVAL_DENSITY_FLOOR: f64 = 1.0e4;

// Two-body rate coefficients [m^3/s]; T-dependent forms take the
// effective temperature (Ti + Tn) / 2 for ion-neutral pairs.

/// O+ + N2 -> NO+ + N, quadratic fit in T/300.
fn k_oplus_n2(t: f64) -> f64 {
    let x = t / 300.0;
    (1.533e-18 - 5.92e-19 * x + 8.60e-20 * x * x).max(1.0e-20)
}

/// O+ + O2 -> O2+ + O, quadratic fit in T/300.
fn k_oplus_o2(t: f64) -> f64 {
    let x = t / 300.0;
    (2.82e-17 - 7.74e-18 * x + 1.073e-18 * x * x).max(1.0e-19)
}

/// N2+ + O -> NO+ + N.
fn k_n2plus_o(t: f64) -> f64 {
    1.4e-16 * (300.0 / t).powf(0.44)
}

/// N2+ + O2 -> O2+ + N2.
const K_N2PLUS_O2: f64 = 5.1e-17;

/// N + O2 -> NO + O, Arrhenius barrier.
fn k_n_o2(t: f64) -> f64 {
    4.4e-18 * (-3220.0 / t).exp()
}

/// N + NO -> N2 + O.
const K_N_NO: f64 = 3.4e-17;

// Dissociative recombination coefficients [m^3/s], electron-temperature
// power laws.

fn alpha_o2plus(te: f64) -> f64 {
    1.95e-13 * (300.0 / te).powf(0.70)
}

fn alpha_noplus(te: f64) -> f64 {
    4.0e-13 * (300.0 / te).powf(0.50)
}

fn alpha_n2plus(te: f64) -> f64 {
    2.2e-13 * (300.0 / te).powf(0.39)
}

/// Source/sink decomposition of one chemistry evaluation.
#[derive(Debug, Clone)]
pub struct ChemistryRates {
    /// Per-neutral production, `NeutralSpecies::idx()` order [m^-3 s^-1].
    pub neutral_production: Vec<Array3<f64>>,
    /// Per-neutral loss frequency [s^-1].
    pub neutral_loss_freq: Vec<Array3<f64>>,
    /// Per-ion production, `IonSpecies::idx()` order [m^-3 s^-1].
    pub ion_production: Vec<Array3<f64>>,
    /// Per-ion loss frequency [s^-1].
    pub ion_loss_freq: Vec<Array3<f64>>,
    /// Loss-frequency denominators that used the evaluation floor.
    pub floored: usize,
}

impl ChemistryRates {
    /// All-zero rates, used when the chemistry stage is disabled.
    pub fn quiet(dim: (usize, usize, usize)) -> Self {
        ChemistryRates {
            neutral_production: (0..NeutralSpecies::COUNT)
                .map(|_| Array3::zeros(dim))
                .collect(),
            neutral_loss_freq: (0..NeutralSpecies::COUNT)
                .map(|_| Array3::zeros(dim))
                .collect(),
            ion_production: (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect(),
            ion_loss_freq: (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect(),
            floored: 0,
        }
    }
}

/// Evaluate the full reaction set at the current state, with the EUV
/// photoionization folded in as ion sources and neutral sinks.
pub fn compute(neutrals: &NeutralState, ions: &IonState, euv: &EuvRates) -> ChemistryRates {
    let dim = neutrals.temperature.dim();
    let mut neutral_production: Vec<Array3<f64>> = (0..NeutralSpecies::COUNT)
        .map(|_| Array3::zeros(dim))
        .collect();
    let mut neutral_loss_freq: Vec<Array3<f64>> = (0..NeutralSpecies::COUNT)
        .map(|_| Array3::zeros(dim))
        .collect();
    let mut ion_production: Vec<Array3<f64>> =
        (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect();
    let mut ion_loss_freq: Vec<Array3<f64>> =
        (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect();
    let mut floored = 0usize;

    let (nlon, nlat, nalt) = dim;
    for i in 0..nlon {
        for j in 0..nlat {
            for k in 0..nalt {
                let c = [i, j, k];
                let tn = neutrals.temperature[c];
                let ti = ions.temperature[c];
                let te = ions.electron_temperature[c].max(100.0);
                let t_eff = 0.5 * (ti + tn);

                let n_o = neutrals.density(NeutralSpecies::O)[c];
                let n_o2 = neutrals.density(NeutralSpecies::O2)[c];
                let n_n2 = neutrals.density(NeutralSpecies::N2)[c];
                let n_n = neutrals.density(NeutralSpecies::N)[c];
                let n_no = neutrals.density(NeutralSpecies::NO)[c];
                let n_oplus = ions.density(IonSpecies::OPlus)[c];
                let n_o2plus = ions.density(IonSpecies::O2Plus)[c];
                let n_n2plus = ions.density(IonSpecies::N2Plus)[c];
                let n_noplus = ions.density(IonSpecies::NOPlus)[c];
                let n_e = ions.electron_density[c];

                let mut eff = |n: f64| {
                    if n < EVAL_DENSITY_FLOOR {
                        floored += 1;
                        EVAL_DENSITY_FLOOR
                    } else {
                        n
                    }
                };
                let n_o_eff = eff(n_o);
                let n_o2_eff = eff(n_o2);
                let n_n2_eff = eff(n_n2);

                let k1 = k_oplus_n2(t_eff);
                let k2 = k_oplus_o2(t_eff);
                let k3 = k_n2plus_o(t_eff);
                let k8 = k_n_o2(tn);
                let a_o2 = alpha_o2plus(te);
                let a_no = alpha_noplus(te);
                let a_n2 = alpha_n2plus(te);

                // Pairwise reaction rates [m^-3 s^-1].
                let r1 = k1 * n_oplus * n_n2;
                let r2 = k2 * n_oplus * n_o2;
                let r3 = k3 * n_n2plus * n_o;
                let r4 = K_N2PLUS_O2 * n_n2plus * n_o2;
                let r5 = a_o2 * n_o2plus * n_e;
                let r6 = a_no * n_noplus * n_e;
                let r7 = a_n2 * n_n2plus * n_e;
                let r8 = k8 * n_n * n_o2;
                let r9 = K_N_NO * n_n * n_no;

                // Photoionization [m^-3 s^-1], already per-ion.
                let q_oplus = euv.ionization[IonSpecies::OPlus.idx()][c];
                let q_o2plus = euv.ionization[IonSpecies::O2Plus.idx()][c];
                let q_n2plus = euv.ionization[IonSpecies::N2Plus.idx()][c];

                // Ion balance.
                ion_production[IonSpecies::OPlus.idx()][c] = q_oplus;
                ion_loss_freq[IonSpecies::OPlus.idx()][c] = k1 * n_n2 + k2 * n_o2;

                ion_production[IonSpecies::O2Plus.idx()][c] = q_o2plus + r2 + r4;
                ion_loss_freq[IonSpecies::O2Plus.idx()][c] = a_o2 * n_e;

                ion_production[IonSpecies::N2Plus.idx()][c] = q_n2plus;
                ion_loss_freq[IonSpecies::N2Plus.idx()][c] =
                    k3 * n_o + K_N2PLUS_O2 * n_o2 + a_n2 * n_e;

                ion_production[IonSpecies::NOPlus.idx()][c] = r1 + r3;
                ion_loss_freq[IonSpecies::NOPlus.idx()][c] = a_no * n_e;

                // Neutral balance. Loss frequencies divide by the
                // floored density so empty cells stay finite.
                neutral_production[NeutralSpecies::O.idx()][c] =
                    r2 + 2.0 * r5 + r6 + r8 + r9;
                neutral_loss_freq[NeutralSpecies::O.idx()][c] =
                    q_oplus / n_o_eff + k3 * n_n2plus;

                neutral_loss_freq[NeutralSpecies::O2.idx()][c] = q_o2plus / n_o2_eff
                    + k2 * n_oplus
                    + K_N2PLUS_O2 * n_n2plus
                    + k8 * n_n;

                neutral_production[NeutralSpecies::N2.idx()][c] = r4 + r9;
                neutral_loss_freq[NeutralSpecies::N2.idx()][c] =
                    q_n2plus / n_n2_eff + k1 * n_oplus;

                neutral_production[NeutralSpecies::N.idx()][c] = r1 + r3 + r6 + 2.0 * r7;
                neutral_loss_freq[NeutralSpecies::N.idx()][c] = k8 * n_o2 + K_N_NO * n_no;

                neutral_production[NeutralSpecies::NO.idx()][c] = r8;
                neutral_loss_freq[NeutralSpecies::NO.idx()][c] = K_N_NO * n_n;
            }
        }
    }

    ChemistryRates {
        neutral_production,
        neutral_loss_freq,
        ion_production,
        ion_loss_freq,
        floored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_state(dim: (usize, usize, usize)) -> (NeutralState, IonState) {
        let mut neutrals = NeutralState::new(dim);
        neutrals.temperature.fill(800.0);
        neutrals.density_mut(NeutralSpecies::O).fill(4.0e16);
        neutrals.density_mut(NeutralSpecies::O2).fill(2.0e15);
        neutrals.density_mut(NeutralSpecies::N2).fill(1.0e16);
        neutrals.density_mut(NeutralSpecies::N).fill(1.0e12);
        neutrals.density_mut(NeutralSpecies::NO).fill(5.0e12);

        let mut ions = IonState::new(dim);
        ions.temperature.fill(900.0);
        ions.electron_temperature.fill(1500.0);
        for s in IonSpecies::ALL {
            ions.density_mut(s).fill(2.0e10);
        }
        ions.update_electron_density();
        (neutrals, ions)
    }

    fn dark_euv(dim: (usize, usize, usize)) -> EuvRates {
        EuvRates::dark(dim)
    }

    #[test]
    fn test_rates_are_nonnegative() {
        let dim = (3, 3, 3);
        let (neutrals, ions) = quiet_state(dim);
        let rates = compute(&neutrals, &ions, &dark_euv(dim));
        for cube in rates
            .neutral_production
            .iter()
            .chain(&rates.neutral_loss_freq)
            .chain(&rates.ion_production)
            .chain(&rates.ion_loss_freq)
        {
            for &v in cube.iter() {
                assert!(v >= 0.0 && v.is_finite(), "negative or non-finite rate {v}");
            }
        }
    }

    #[test]
    fn test_charge_exchange_conserves_ion_count_without_sources() {
        // With no photoionization and no electrons, every surviving
        // reaction only moves charge between ion species, so the net
        // ion tendency sums to zero.
        let dim = (2, 2, 2);
        let (neutrals, mut ions) = quiet_state(dim);
        ions.electron_density.fill(0.0);
        let rates = compute(&neutrals, &ions, &dark_euv(dim));

        let c = [0, 0, 0];
        let mut net = 0.0;
        let mut scale = 0.0;
        for s in IonSpecies::ALL {
            let p = rates.ion_production[s.idx()][c];
            let l = rates.ion_loss_freq[s.idx()][c] * ions.density(s)[c];
            net += p - l;
            scale += p + l;
        }
        assert!(
            net.abs() < scale * 1e-12,
            "ion count leak: net = {net:e}, scale = {scale:e}"
        );
    }

    #[test]
    fn test_recombination_scales_with_electron_density() {
        let dim = (2, 2, 2);
        let (neutrals, mut ions) = quiet_state(dim);
        let base = compute(&neutrals, &ions, &dark_euv(dim));
        ions.electron_density.mapv_inplace(|n| 10.0 * n);
        let dense = compute(&neutrals, &ions, &dark_euv(dim));

        let c = [0, 0, 0];
        let s = IonSpecies::NOPlus.idx();
        assert!(
            (dense.ion_loss_freq[s][c] / base.ion_loss_freq[s][c] - 10.0).abs() < 1e-9,
            "NO+ loss is pure recombination and must scale linearly with n_e"
        );
    }

    #[test]
    fn test_hot_electrons_recombine_slower() {
        assert!(alpha_noplus(3000.0) < alpha_noplus(300.0));
        assert!(alpha_o2plus(3000.0) < alpha_o2plus(300.0));
        assert!(alpha_n2plus(3000.0) < alpha_n2plus(300.0));
    }

    #[test]
    fn test_photoionization_feeds_ion_production_and_neutral_loss() {
        let dim = (2, 2, 2);
        let (neutrals, ions) = quiet_state(dim);
        let mut euv = dark_euv(dim);
        euv.ionization[IonSpecies::OPlus.idx()].fill(1.0e9);

        let base = compute(&neutrals, &ions, &dark_euv(dim));
        let lit = compute(&neutrals, &ions, &euv);

        let c = [0, 0, 0];
        let dp = lit.ion_production[IonSpecies::OPlus.idx()][c]
            - base.ion_production[IonSpecies::OPlus.idx()][c];
        assert!((dp - 1.0e9).abs() < 1.0);

        let o = NeutralSpecies::O.idx();
        assert!(lit.neutral_loss_freq[o][c] > base.neutral_loss_freq[o][c]);
    }

    #[test]
    fn test_empty_cell_uses_floor_and_counts() {
        let dim = (2, 2, 2);
        let (mut neutrals, ions) = quiet_state(dim);
        neutrals.density_mut(NeutralSpecies::O2).fill(0.0);
        let rates = compute(&neutrals, &ions, &dark_euv(dim));
        assert!(rates.floored > 0);
        for &v in rates.neutral_loss_freq[NeutralSpecies::O2.idx()].iter() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_nitrogen_barrier_reaction_is_slow_when_cold() {
        assert!(k_n_o2(300.0) < k_n_o2(1500.0));
        assert!(k_n_o2(200.0) < 1.0e-24);
    }
}
