// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Upwind
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Finite-volume metrics and donor-cell upwind operators on the
//! spherical shell grid.
//!
//! All cubes are `[nlon, nlat, nalt]`. Longitude is periodic. Latitude
//! faces at the poles carry zero area (cos ±90° = 0), and the top and
//! bottom altitude faces carry no flux, so [`ShellMetrics::flux_divergence`]
//! conserves the cell-integrated total exactly: every interior face
//! adds to one cell what it removes from its neighbor.

use ndarray::{Array1, Array3};

/// Precomputed face areas, cell volumes, and physical spacings for a
/// cell-centered lon/lat/alt grid.
#[derive(Debug, Clone)]
pub struct ShellMetrics {
    pub nlon: usize,
    pub nlat: usize,
    pub nalt: usize,
    pub dlon: f64,
    pub dlat: f64,
    pub dr: f64,
    /// Cell volume [m^3].
    pub volume: Array3<f64>,
    /// Area of the east face between cells i and i+1 (wraps) [m^2].
    pub area_east: Array3<f64>,
    /// Area of the north face below row j; dim [nlon, nlat+1, nalt] [m^2].
    pub area_north: Array3<f64>,
    /// Area of the lower radial face of level k; dim [nlon, nlat, nalt+1] [m^2].
    pub area_up: Array3<f64>,
    /// East-west arc length through the cell center [m].
    pub dx_east: Array3<f64>,
    /// North-south arc length through the cell center [m].
    pub dx_north: Array3<f64>,
}

impl ShellMetrics {
    /// Build metrics from cell-center latitudes [rad] and radii [m].
    /// Longitude is uniform over the full circle.
    pub fn new(lats: &Array1<f64>, radii: &Array1<f64>, nlon: usize) -> Self {
        let nlat = lats.len();
        let nalt = radii.len();
        let dlon = std::f64::consts::TAU / nlon as f64;
        let dlat = if nlat > 1 { lats[1] - lats[0] } else { 1.0 };
        let dr = if nalt > 1 { radii[1] - radii[0] } else { 1.0 };

        let mut volume = Array3::zeros((nlon, nlat, nalt));
        let mut area_east = Array3::zeros((nlon, nlat, nalt));
        let mut area_north = Array3::zeros((nlon, nlat + 1, nalt));
        let mut area_up = Array3::zeros((nlon, nlat, nalt + 1));
        let mut dx_east = Array3::zeros((nlon, nlat, nalt));
        let mut dx_north = Array3::zeros((nlon, nlat, nalt));

        for i in 0..nlon {
            for j in 0..nlat {
                let clat = lats[j].cos();
                for k in 0..nalt {
                    let r = radii[k];
                    volume[[i, j, k]] = r * r * clat * dlon * dlat * dr;
                    area_east[[i, j, k]] = r * dlat * dr;
                    dx_east[[i, j, k]] = r * clat * dlon;
                    dx_north[[i, j, k]] = r * dlat;
                }
            }
            for j in 0..=nlat {
                // Face latitude; the outermost faces sit exactly on the
                // poles, where the area vanishes and closes the domain.
                let lat_face = lats[0] - 0.5 * dlat + j as f64 * dlat;
                let cface = lat_face.cos().max(0.0);
                for k in 0..nalt {
                    area_north[[i, j, k]] = radii[k] * cface * dlon * dr;
                }
            }
            for j in 0..nlat {
                let clat = lats[j].cos();
                for k in 0..=nalt {
                    let r_face = radii[0] - 0.5 * dr + k as f64 * dr;
                    area_up[[i, j, k]] = r_face * r_face * clat * dlon * dlat;
                }
            }
        }

        ShellMetrics {
            nlon,
            nlat,
            nalt,
            dlon,
            dlat,
            dr,
            volume,
            area_east,
            area_north,
            area_up,
            dx_east,
            dx_north,
        }
    }

    /// Smallest physical spacing on the grid, for Courant bounds [m].
    pub fn min_spacing(&self) -> f64 {
        let mut min = self.dr;
        for &dx in self.dx_east.iter().chain(self.dx_north.iter()) {
            if dx < min {
                min = dx;
            }
        }
        min
    }

    /// Conservative donor-cell flux divergence.
    ///
    /// Returns the continuity tendency dn/dt = -(1/V) Σ_faces F·A with
    /// face velocity averaged from the two adjacent cells and the
    /// donor (upwind) cell supplying the advected density. Longitude
    /// wraps; latitude and altitude boundaries are closed.
    pub fn flux_divergence(
        &self,
        n: &Array3<f64>,
        u_east: &Array3<f64>,
        u_north: &Array3<f64>,
        u_up: &Array3<f64>,
    ) -> Array3<f64> {
        let (nlon, nlat, nalt) = (self.nlon, self.nlat, self.nalt);
        let mut tend = Array3::zeros((nlon, nlat, nalt));

        // East faces (periodic): face between i and i+1.
        for i in 0..nlon {
            let ip = (i + 1) % nlon;
            for j in 0..nlat {
                for k in 0..nalt {
                    let u_face = 0.5 * (u_east[[i, j, k]] + u_east[[ip, j, k]]);
                    let donor = if u_face >= 0.0 { n[[i, j, k]] } else { n[[ip, j, k]] };
                    let flux = u_face * donor * self.area_east[[i, j, k]];
                    tend[[i, j, k]] -= flux / self.volume[[i, j, k]];
                    tend[[ip, j, k]] += flux / self.volume[[ip, j, k]];
                }
            }
        }

        // North faces: face j+1 sits between rows j and j+1. Polar
        // faces have zero area, so the loop over interior faces covers
        // every flux-carrying face.
        for i in 0..nlon {
            for j in 0..nlat - 1 {
                for k in 0..nalt {
                    let u_face = 0.5 * (u_north[[i, j, k]] + u_north[[i, j + 1, k]]);
                    let donor = if u_face >= 0.0 { n[[i, j, k]] } else { n[[i, j + 1, k]] };
                    let flux = u_face * donor * self.area_north[[i, j + 1, k]];
                    tend[[i, j, k]] -= flux / self.volume[[i, j, k]];
                    tend[[i, j + 1, k]] += flux / self.volume[[i, j + 1, k]];
                }
            }
        }

        // Radial faces: closed at the bottom and top of the column.
        for i in 0..nlon {
            for j in 0..nlat {
                for k in 0..nalt - 1 {
                    let u_face = 0.5 * (u_up[[i, j, k]] + u_up[[i, j, k + 1]]);
                    let donor = if u_face >= 0.0 { n[[i, j, k]] } else { n[[i, j, k + 1]] };
                    let flux = u_face * donor * self.area_up[[i, j, k + 1]];
                    tend[[i, j, k]] -= flux / self.volume[[i, j, k]];
                    tend[[i, j, k + 1]] += flux / self.volume[[i, j, k + 1]];
                }
            }
        }

        tend
    }

    /// Velocity divergence ∇·u over the cell, same face convention as
    /// [`Self::flux_divergence`] with unit density.
    pub fn divergence(
        &self,
        u_east: &Array3<f64>,
        u_north: &Array3<f64>,
        u_up: &Array3<f64>,
    ) -> Array3<f64> {
        let ones = Array3::ones((self.nlon, self.nlat, self.nalt));
        // div u = -d(1)/dt under pure advection of a unit field
        let mut div = self.flux_divergence(&ones, u_east, u_north, u_up);
        div.mapv_inplace(|v| -v);
        div
    }

    /// Advective upwind gradient u·∇f (non-conservative form), used by
    /// the momentum and energy equations.
    ///
    /// One-sided differences chosen by the local wind sign; zero
    /// gradient at the closed latitude/altitude boundaries.
    pub fn advect(
        &self,
        f: &Array3<f64>,
        u_east: &Array3<f64>,
        u_north: &Array3<f64>,
        u_up: &Array3<f64>,
    ) -> Array3<f64> {
        let (nlon, nlat, nalt) = (self.nlon, self.nlat, self.nalt);
        let mut out = Array3::zeros((nlon, nlat, nalt));

        for i in 0..nlon {
            let ip = (i + 1) % nlon;
            let im = (i + nlon - 1) % nlon;
            for j in 0..nlat {
                for k in 0..nalt {
                    let c = f[[i, j, k]];
                    let mut adv = 0.0;

                    let ue = u_east[[i, j, k]];
                    let d_east = if ue >= 0.0 {
                        c - f[[im, j, k]]
                    } else {
                        f[[ip, j, k]] - c
                    };
                    adv += ue * d_east / self.dx_east[[i, j, k]];

                    let un = u_north[[i, j, k]];
                    adv += if un >= 0.0 {
                        if j > 0 {
                            un * (c - f[[i, j - 1, k]]) / self.dx_north[[i, j, k]]
                        } else {
                            0.0
                        }
                    } else if j + 1 < nlat {
                        un * (f[[i, j + 1, k]] - c) / self.dx_north[[i, j, k]]
                    } else {
                        0.0
                    };

                    let uu = u_up[[i, j, k]];
                    adv += if uu >= 0.0 {
                        if k > 0 {
                            uu * (c - f[[i, j, k - 1]]) / self.dr
                        } else {
                            0.0
                        }
                    } else if k + 1 < nalt {
                        uu * (f[[i, j, k + 1]] - c) / self.dr
                    } else {
                        0.0
                    };

                    out[[i, j, k]] = adv;
                }
            }
        }

        out
    }

    /// Grid-integrated total of a density cube: Σ n V.
    pub fn total_content(&self, n: &Array3<f64>) -> f64 {
        let mut total = 0.0;
        ndarray::Zip::from(n).and(&self.volume).for_each(|&ni, &v| {
            total += ni * v;
        });
        total
    }
}
