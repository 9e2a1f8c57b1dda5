// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Electrodynamics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ionospheric electrodynamics: conductances, the wind dynamo, the
//! high-latitude potential solve, and the resulting E×B drift.
//!
//! The elliptic equation ∇·(Σ ∇Φ) = ∇·(Σ U×B) is solved on the
//! northern magnetic cap in cell-integrated form with the multigrid
//! V-cycle (red-black SOR fallback), then an imposed two-cell
//! convection potential is superposed. Both hemispheres deposit their
//! conductance onto the cap through |mlat|; the southern drift pattern
//! mirrors the northern one with the meridional and vertical components
//! flipped.

use ndarray::Array2;
use tracing::{debug, warn};

use geospace_math::interp::{bilinear_shell, gradient_shell};
use geospace_math::multigrid::{multigrid_solve, MultigridConfig};
use geospace_math::sor::{sor_residual, sor_solve, ShellOperator};
use geospace_math::transform::{get_vector_component, vector_env_to_xyz, vector_xyz_to_env};
use geospace_types::config::ElectroConfig;
use geospace_types::constants::{AMU_KG, B_EQUATORIAL, Q_ELEMENTARY, R_EARTH};
use geospace_types::error::{GeospaceError, GeospaceResult};
use geospace_types::indices::IonSpecies;
use geospace_types::state::{Component, Frame, IonState, NeutralState, VectorField};

use crate::bfield::Dipole;
use crate::grid::{GeoGrid, MagGrid, DYNAMO_SHELL_ALT_M};

/// Ion-neutral collision frequency coefficient [m^3/s]; multiplied by
/// the total neutral number density.
const NU_IN_COEFF: f64 = 6.0e-16;

/// SOR sweeps used when the multigrid solve needs a fallback.
const FALLBACK_SOR_SWEEPS: usize = 200;

/// Output of one electrodynamic solve.
#[derive(Debug, Clone)]
pub struct ElectroFields {
    /// Electrostatic potential on the magnetic cap [V], `[n_mlats, n_mlons]`.
    pub potential: Array2<f64>,
    /// Height-integrated Pedersen conductance on the cap [S].
    pub conductance: Array2<f64>,
    /// E×B drift at every geographic cell, constant over altitude [m/s].
    pub drift: VectorField,
    /// Cap cells raised to the conductance floor.
    pub conductance_floor_hits: usize,
    /// Multigrid V-cycles spent.
    pub cycles: usize,
    /// Final L-infinity residual of the potential solve.
    pub residual: f64,
}

/// High-latitude potential solver. Built once per run; holds the cap
/// grid and the multigrid settings.
#[derive(Debug, Clone)]
pub struct ElectroSolver {
    config: ElectroConfig,
    mag: MagGrid,
    mg: MultigridConfig,
}

impl ElectroSolver {
    /// The red-black coloring and the factor-two coarsening both need
    /// even cap dimensions; reject odd ones at init.
    pub fn new(config: &ElectroConfig) -> GeospaceResult<Self> {
        if config.n_mlats % 2 != 0 || config.n_mlons % 2 != 0 {
            return Err(GeospaceError::ConfigError(format!(
                "magnetic solve grid must have even dimensions, got {}x{}",
                config.n_mlats, config.n_mlons
            )));
        }
        Ok(ElectroSolver {
            config: config.clone(),
            mag: MagGrid::new(config.n_mlats, config.n_mlons, config.low_lat_boundary_deg),
            mg: MultigridConfig::default(),
        })
    }

    pub fn mag_grid(&self) -> &MagGrid {
        &self.mag
    }

    /// Solve the potential and derive the E×B drift.
    ///
    /// `wind_mag` is the neutral wind expressed in geomagnetic
    /// east/north/up; a geographic-tagged field is a hard error.
    pub fn solve(
        &self,
        grid: &GeoGrid,
        dipole: &Dipole,
        neutrals: &NeutralState,
        ions: &IonState,
        wind_mag: &VectorField,
    ) -> GeospaceResult<ElectroFields> {
        let u_east = get_vector_component(wind_mag, Component::East, Frame::Geomagnetic)?;
        let u_north = get_vector_component(wind_mag, Component::North, Frame::Geomagnetic)?;

        let (nlon, nlat, nalt) = grid.dim();
        let (nm, nl) = (self.mag.n_mlats, self.mag.n_mlons);
        let dr = grid.metrics.dr;
        let n_total = neutrals.total_density();

        // Dynamo level: the cell layer closest to the conducting shell.
        let mut k_dyn = 0;
        for k in 1..nalt {
            if (grid.alts[k] - DYNAMO_SHELL_ALT_M).abs()
                < (grid.alts[k_dyn] - DYNAMO_SHELL_ALT_M).abs()
            {
                k_dyn = k;
            }
        }

        // Height-integrated Pedersen conductance and wind-dynamo sheet
        // current per geographic column, in magnetic components.
        let mut sigma_col = Array2::<f64>::zeros((nlon, nlat));
        let mut jw_east = Array2::<f64>::zeros((nlon, nlat));
        let mut jw_north = Array2::<f64>::zeros((nlon, nlat));

        for i in 0..nlon {
            for j in 0..nlat {
                let mut sigma = 0.0;
                for k in 0..nalt {
                    let b = grid.b_mag[[i, j, k]];
                    let nu = NU_IN_COEFF * n_total[[i, j, k]];
                    let mut sp = 0.0;
                    for s in IonSpecies::ALL {
                        let omega = Q_ELEMENTARY * b / (s.mass_amu() * AMU_KG);
                        let n_i = ions.density(s)[[i, j, k]];
                        sp += (n_i * Q_ELEMENTARY / b) * nu * omega / (nu * nu + omega * omega);
                    }
                    sigma += sp * dr;
                }
                sigma_col[[i, j]] = sigma;

                // Sheet current J = Σ_P (U × B) at the dynamo level,
                // with the dipole field in its own frame (B_east = 0).
                let mlat = grid.mlat[[i, j]];
                let b0 = B_EQUATORIAL * (R_EARTH / grid.radii[k_dyn]).powi(3);
                let b_u = -2.0 * b0 * mlat.sin();
                let ue = u_east[[i, j, k_dyn]];
                let un = u_north[[i, j, k_dyn]];
                jw_east[[i, j]] = sigma * (un * b_u);
                jw_north[[i, j]] = sigma * (-ue * b_u);
            }
        }

        // Deposit onto the cap through |mlat|, area-weighted.
        let lo = self.mag.mlats[0] - 0.5 * self.mag.dmlat;
        let mut cond = Array2::<f64>::zeros((nm, nl));
        let mut cur_e = Array2::<f64>::zeros((nm, nl));
        let mut cur_n = Array2::<f64>::zeros((nm, nl));
        let mut weight = Array2::<f64>::zeros((nm, nl));

        for i in 0..nlon {
            for j in 0..nlat {
                let m = grid.mlat[[i, j]].abs();
                if m < lo {
                    continue;
                }
                let jm = (((m - lo) / self.mag.dmlat) as usize).min(nm - 1);
                let im = ((grid.mlon[[i, j]] / self.mag.dmlon) as usize) % nl;
                let w = grid.lats[j].cos();
                let south = grid.mlat[[i, j]] < 0.0;
                cond[[jm, im]] += w * sigma_col[[i, j]];
                cur_e[[jm, im]] += w * jw_east[[i, j]];
                // Southern columns mirror through the equator.
                cur_n[[jm, im]] += w * if south { -jw_north[[i, j]] } else { jw_north[[i, j]] };
                weight[[jm, im]] += w;
            }
        }

        let mut conductance_floor_hits = 0usize;
        for jm in 0..nm {
            for im in 0..nl {
                if weight[[jm, im]] > 0.0 {
                    cond[[jm, im]] /= weight[[jm, im]];
                    cur_e[[jm, im]] /= weight[[jm, im]];
                    cur_n[[jm, im]] /= weight[[jm, im]];
                }
                if cond[[jm, im]] < self.config.conductance_floor {
                    cond[[jm, im]] = self.config.conductance_floor;
                    conductance_floor_hits += 1;
                }
            }
        }

        // Cell-integrated source: outward flux of the sheet current
        // over the cap cell faces. Boundary faces carry no current.
        let radius = self.mag.radius;
        let mut source = Array2::<f64>::zeros((nm, nl));
        for jm in 0..nm {
            for im in 0..nl {
                let ip = (im + 1) % nl;
                let j_face = 0.5 * (cur_e[[jm, im]] + cur_e[[jm, ip]]);
                let flux = j_face * radius * self.mag.dmlat;
                source[[jm, im]] += flux;
                source[[jm, ip]] -= flux;
            }
        }
        for jm in 0..nm - 1 {
            let lat_face = self.mag.mlats[jm] + 0.5 * self.mag.dmlat;
            for im in 0..nl {
                let j_face = 0.5 * (cur_n[[jm, im]] + cur_n[[jm + 1, im]]);
                let flux = j_face * radius * lat_face.cos() * self.mag.dmlon;
                source[[jm, im]] += flux;
                source[[jm + 1, im]] -= flux;
            }
        }

        // Operator: face-integrated Σ ∇Φ, metric factors folded into
        // the coefficients (the shell radius cancels).
        let mut op = ShellOperator::uniform(nm, nl, self.config.conductance_floor);
        for jm in 0..=nm {
            let lat_face = lo + jm as f64 * self.mag.dmlat;
            for im in 0..nl {
                let s_face = if jm == 0 {
                    cond[[0, im]]
                } else if jm == nm {
                    cond[[nm - 1, im]]
                } else {
                    0.5 * (cond[[jm - 1, im]] + cond[[jm, im]])
                };
                op.coef_lat[[jm, im]] = s_face * lat_face.cos() * self.mag.dmlon / self.mag.dmlat;
            }
        }
        for jm in 0..nm {
            let clat = self.mag.mlats[jm].cos();
            for im in 0..nl {
                let ip = (im + 1) % nl;
                let s_face = 0.5 * (cond[[jm, im]] + cond[[jm, ip]]);
                op.coef_lon[[jm, im]] = s_face * self.mag.dmlat / (clat * self.mag.dmlon);
            }
        }

        // Dynamo solve with Φ = 0 on the first and last cap rows.
        let mut phi = Array2::<f64>::zeros((nm, nl));
        let scale = source.iter().fold(0.0f64, |a, &s| a.max(s.abs()));
        let tol = self.config.tolerance * scale.max(1.0);
        let result = multigrid_solve(&mut phi, &source, &op, &self.mg, self.config.max_cycles, tol);
        let mut residual = result.residual;
        if !result.converged {
            warn!(
                residual,
                tol, cycles = result.cycles, "dynamo multigrid stalled, falling back to SOR"
            );
            sor_solve(&mut phi, &source, &op, self.mg.omega, FALLBACK_SOR_SWEEPS);
            residual = sor_residual(&phi, &source, &op);
        }
        if !residual.is_finite() || phi.iter().any(|v| !v.is_finite()) {
            return Err(GeospaceError::SolverDiverged {
                iteration: result.cycles,
                message: format!("dynamo potential is non-finite (residual {residual:e})"),
            });
        }
        debug!(cycles = result.cycles, residual, "dynamo solve complete");

        // Imposed two-cell convection, normalized so the cap-wide range
        // of the pattern equals the configured cross-polar-cap drop.
        let cpcp = self.config.cross_polar_cap_kv * 1.0e3;
        let colat_b = std::f64::consts::FRAC_PI_2 - lo;
        for jm in 0..nm {
            let colat = std::f64::consts::FRAC_PI_2 - self.mag.mlats[jm];
            let shape = (std::f64::consts::PI * colat / colat_b).sin();
            for im in 0..nl {
                phi[[jm, im]] += 0.5 * cpcp * self.mag.mlons[im].sin() * shape;
            }
        }

        // E = −∇Φ on the shell, then drift = E×B / B² in magnetic
        // east/north/up. B has no east component in its own frame.
        let (d_dlat, d_dlon) = gradient_shell(&phi, self.mag.dmlat, self.mag.dmlon);
        let mut ve = Array2::<f64>::zeros((nm, nl));
        let mut vn = Array2::<f64>::zeros((nm, nl));
        let mut vu = Array2::<f64>::zeros((nm, nl));
        let b0_shell = B_EQUATORIAL * (R_EARTH / radius).powi(3);
        for jm in 0..nm {
            let mlat = self.mag.mlats[jm];
            let b_n = b0_shell * mlat.cos();
            let b_u = -2.0 * b0_shell * mlat.sin();
            let b2 = b_n * b_n + b_u * b_u;
            for im in 0..nl {
                let e_east = -d_dlon[[jm, im]] / (radius * mlat.cos());
                let e_north = -d_dlat[[jm, im]] / radius;
                ve[[jm, im]] = e_north * b_u / b2;
                vn[[jm, im]] = -e_east * b_u / b2;
                vu[[jm, im]] = e_east * b_n / b2;
            }
        }

        // Sample the cap back onto every geographic column; constant
        // over altitude, zero equatorward of the solve boundary.
        let mut drift = VectorField::zeros(Frame::Geographic, grid.dim());
        let lat0 = self.mag.mlats[0];
        for i in 0..nlon {
            for j in 0..nlat {
                let mlat_signed = grid.mlat[[i, j]];
                let m = mlat_signed.abs();
                if m < lo {
                    continue;
                }
                let ml = grid.mlon[[i, j]];
                let de = bilinear_shell(&ve, lat0, self.mag.dmlat, self.mag.dmlon, m, ml);
                let mut dn = bilinear_shell(&vn, lat0, self.mag.dmlat, self.mag.dmlon, m, ml);
                let mut du = bilinear_shell(&vu, lat0, self.mag.dmlat, self.mag.dmlon, m, ml);
                if mlat_signed < 0.0 {
                    dn = -dn;
                    du = -du;
                }

                // Magnetic env at the column, rotated to geographic env.
                let xyz = dipole.to_geo_xyz(vector_env_to_xyz([de, dn, du], ml, mlat_signed));
                let env = vector_xyz_to_env(xyz, grid.lons[i], grid.lats[j]);
                for k in 0..nalt {
                    drift.east[[i, j, k]] = env[0];
                    drift.north[[i, j, k]] = env[1];
                    drift.up[[i, j, k]] = env[2];
                }
            }
        }

        Ok(ElectroFields {
            potential: phi,
            conductance: cond,
            drift,
            conductance_floor_hits,
            cycles: result.cycles,
            residual,
        })
    }
}
