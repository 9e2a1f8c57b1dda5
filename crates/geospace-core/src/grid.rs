// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geographic and magnetic solve grids.
//!
//! [`GeoGrid`] is the cell-centered lon/lat/alt grid everything runs
//! on: axes, derived Cartesian cubes, dipole-sampled magnetic fields,
//! and the finite-volume metrics. No latitude cell sits exactly on a
//! pole; the polar faces close the domain instead.
//!
//! [`MagGrid`] is the small northern-cap shell the electrodynamics
//! solve uses; the southern hemisphere mirrors it through |mlat|.

use ndarray::{Array1, Array2, Array3};

use geospace_math::transform::llr_to_xyz;
use geospace_math::upwind::ShellMetrics;
use geospace_types::config::GridConfig;
use geospace_types::constants::R_EARTH;

use crate::bfield::Dipole;

/// Altitude of the conducting shell the dynamo solves on [m].
pub const DYNAMO_SHELL_ALT_M: f64 = 110.0e3;

/// Geographic grid with precomputed coordinate and field cubes.
///
/// Cube order is `[nlon, nlat, nalt]` throughout.
#[derive(Debug, Clone)]
pub struct GeoGrid {
    pub nlon: usize,
    pub nlat: usize,
    pub nalt: usize,
    /// Cell-center longitudes [rad], uniform over [0, 2π).
    pub lons: Array1<f64>,
    /// Cell-center latitudes [rad], pole-free.
    pub lats: Array1<f64>,
    /// Cell-center altitudes above the surface [m].
    pub alts: Array1<f64>,
    /// Cell-center geocentric radii [m].
    pub radii: Array1<f64>,
    /// Cartesian coordinates of every cell center [m].
    pub x: Array3<f64>,
    pub y: Array3<f64>,
    pub z: Array3<f64>,
    /// Magnetic longitude/latitude of every column [rad].
    pub mlon: Array2<f64>,
    pub mlat: Array2<f64>,
    /// Dipole field in geographic east/north/up [T], and its magnitude.
    pub b_east: Array3<f64>,
    pub b_north: Array3<f64>,
    pub b_up: Array3<f64>,
    pub b_mag: Array3<f64>,
    /// Finite-volume face areas, volumes, and spacings.
    pub metrics: ShellMetrics,
}

impl GeoGrid {
    pub fn new(config: &GridConfig, dipole: &Dipole) -> Self {
        let (nlon, nlat, nalt) = (config.n_lons, config.n_lats, config.n_alts);
        let dlon = std::f64::consts::TAU / nlon as f64;
        let dlat = std::f64::consts::PI / nlat as f64;
        let dalt = (config.alt_max_m - config.alt_min_m) / nalt as f64;

        let lons = Array1::from_shape_fn(nlon, |i| i as f64 * dlon);
        let lats = Array1::from_shape_fn(nlat, |j| {
            -std::f64::consts::FRAC_PI_2 + (j as f64 + 0.5) * dlat
        });
        let alts = Array1::from_shape_fn(nalt, |k| config.alt_min_m + (k as f64 + 0.5) * dalt);
        let radii = alts.mapv(|a| R_EARTH + a);

        let dim = (nlon, nlat, nalt);
        let mut x = Array3::zeros(dim);
        let mut y = Array3::zeros(dim);
        let mut z = Array3::zeros(dim);
        let mut mlon = Array2::zeros((nlon, nlat));
        let mut mlat = Array2::zeros((nlon, nlat));
        let mut b_east = Array3::zeros(dim);
        let mut b_north = Array3::zeros(dim);
        let mut b_up = Array3::zeros(dim);
        let mut b_mag = Array3::zeros(dim);

        for i in 0..nlon {
            for j in 0..nlat {
                let (ml, mt) = dipole.mag_coords(lons[i], lats[j]);
                mlon[[i, j]] = ml;
                mlat[[i, j]] = mt;
                for k in 0..nalt {
                    let xyz = llr_to_xyz([lons[i], lats[j], radii[k]]);
                    x[[i, j, k]] = xyz[0];
                    y[[i, j, k]] = xyz[1];
                    z[[i, j, k]] = xyz[2];

                    let b = dipole.field_env(lons[i], lats[j], radii[k]);
                    b_east[[i, j, k]] = b[0];
                    b_north[[i, j, k]] = b[1];
                    b_up[[i, j, k]] = b[2];
                    b_mag[[i, j, k]] = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();
                }
            }
        }

        let metrics = ShellMetrics::new(&lats, &radii, nlon);

        GeoGrid {
            nlon,
            nlat,
            nalt,
            lons,
            lats,
            alts,
            radii,
            x,
            y,
            z,
            mlon,
            mlat,
            b_east,
            b_north,
            b_up,
            b_mag,
            metrics,
        }
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        (self.nlon, self.nlat, self.nalt)
    }

    /// Spherical coordinates of one cell center as `[lon, lat, r]`.
    pub fn cell_llr(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [self.lons[i], self.lats[j], self.radii[k]]
    }

    /// Recompute the Cartesian cubes from the spherical axes.
    pub fn rebuild_cartesian(&mut self) {
        for i in 0..self.nlon {
            for j in 0..self.nlat {
                for k in 0..self.nalt {
                    let xyz = llr_to_xyz(self.cell_llr(i, j, k));
                    self.x[[i, j, k]] = xyz[0];
                    self.y[[i, j, k]] = xyz[1];
                    self.z[[i, j, k]] = xyz[2];
                }
            }
        }
    }

    /// Largest distance between a stored Cartesian point and the one
    /// implied by its spherical coordinates [m]. A consistency check;
    /// nonzero drift means a cube was mutated out of band.
    pub fn cartesian_drift(&self) -> f64 {
        let mut worst = 0.0f64;
        for i in 0..self.nlon {
            for j in 0..self.nlat {
                for k in 0..self.nalt {
                    let xyz = llr_to_xyz(self.cell_llr(i, j, k));
                    let dx = self.x[[i, j, k]] - xyz[0];
                    let dy = self.y[[i, j, k]] - xyz[1];
                    let dz = self.z[[i, j, k]] - xyz[2];
                    worst = worst.max((dx * dx + dy * dy + dz * dz).sqrt());
                }
            }
        }
        worst
    }
}

/// Northern magnetic cap shell for the electrodynamic solve.
///
/// Cell-centered in mlat from the equatorward boundary up to near the
/// magnetic pole, full circle in mlon, at a fixed dynamo altitude.
#[derive(Debug, Clone)]
pub struct MagGrid {
    pub n_mlats: usize,
    pub n_mlons: usize,
    /// Cell-center magnetic latitudes [rad], ascending.
    pub mlats: Array1<f64>,
    /// Cell-center magnetic longitudes [rad].
    pub mlons: Array1<f64>,
    pub dmlat: f64,
    pub dmlon: f64,
    /// Shell radius [m].
    pub radius: f64,
}

impl MagGrid {
    pub fn new(n_mlats: usize, n_mlons: usize, low_lat_boundary_deg: f64) -> Self {
        let lo = low_lat_boundary_deg.to_radians();
        // Stop one and a half degrees short of the pole so the metric
        // factor 1/cos(mlat) stays well conditioned.
        let hi = (88.5f64).to_radians();
        let dmlat = (hi - lo) / n_mlats as f64;
        let dmlon = std::f64::consts::TAU / n_mlons as f64;

        let mlats = Array1::from_shape_fn(n_mlats, |j| lo + (j as f64 + 0.5) * dmlat);
        let mlons = Array1::from_shape_fn(n_mlons, |i| i as f64 * dmlon);

        MagGrid {
            n_mlats,
            n_mlons,
            mlats,
            mlons,
            dmlat,
            dmlon,
            radius: R_EARTH + DYNAMO_SHELL_ALT_M,
        }
    }
}
