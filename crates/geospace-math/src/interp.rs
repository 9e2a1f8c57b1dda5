// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Interp
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bilinear interpolation and gradients on a latitude-longitude shell.
//!
//! Shell arrays are `[nlat, nlon]` with cell-centered latitudes and
//! uniform spacing. Longitude is periodic with cell i at `i * dlon`;
//! latitude is clamped at the shell edges.

use ndarray::Array2;

/// Bilinear sample of a shell field at (lat, lon) [radians].
///
/// `lat0` is the latitude of row 0. Longitude wraps; latitude clamps
/// to the first/last row.
pub fn bilinear_shell(field: &Array2<f64>, lat0: f64, dlat: f64, dlon: f64, lat: f64, lon: f64) -> f64 {
    let (nlat, nlon) = field.dim();

    let flat = (lat - lat0) / dlat;
    let j0 = (flat.floor() as isize).clamp(0, nlat as isize - 2) as usize;
    let tj = (flat - j0 as f64).clamp(0.0, 1.0);

    let flon = lon.rem_euclid(std::f64::consts::TAU) / dlon;
    let i0 = (flon.floor() as usize) % nlon;
    let i1 = (i0 + 1) % nlon;
    let ti = (flon - flon.floor()).clamp(0.0, 1.0);

    let v00 = field[[j0, i0]];
    let v01 = field[[j0, i1]];
    let v10 = field[[j0 + 1, i0]];
    let v11 = field[[j0 + 1, i1]];

    (1.0 - tj) * ((1.0 - ti) * v00 + ti * v01) + tj * ((1.0 - ti) * v10 + ti * v11)
}

/// Index-space gradients of a shell field.
///
/// Returns `(d_dlat, d_dlon)` in units of field-per-radian. Central
/// differences everywhere; longitude wraps, latitude falls back to
/// one-sided differences at the first/last row.
pub fn gradient_shell(field: &Array2<f64>, dlat: f64, dlon: f64) -> (Array2<f64>, Array2<f64>) {
    let (nlat, nlon) = field.dim();
    let mut d_dlat = Array2::zeros((nlat, nlon));
    let mut d_dlon = Array2::zeros((nlat, nlon));

    for j in 0..nlat {
        for i in 0..nlon {
            d_dlat[[j, i]] = if j == 0 {
                (field[[1, i]] - field[[0, i]]) / dlat
            } else if j == nlat - 1 {
                (field[[nlat - 1, i]] - field[[nlat - 2, i]]) / dlat
            } else {
                (field[[j + 1, i]] - field[[j - 1, i]]) / (2.0 * dlat)
            };

            let ip = (i + 1) % nlon;
            let im = (i + nlon - 1) % nlon;
            d_dlon[[j, i]] = (field[[j, ip]] - field[[j, im]]) / (2.0 * dlon);
        }
    }

    (d_dlat, d_dlon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn shell(nlat: usize, nlon: usize) -> (f64, f64, f64) {
        // lat0, dlat, dlon for a shell covering [0.5, 1.3] rad
        let dlat = 0.8 / (nlat as f64 - 1.0);
        let dlon = TAU / nlon as f64;
        (0.5, dlat, dlon)
    }

    #[test]
    fn test_bilinear_exact_at_cells() {
        let (lat0, dlat, dlon) = shell(9, 12);
        let field = Array2::from_shape_fn((9, 12), |(j, i)| (j * 100 + i) as f64);
        for j in 0..9 {
            for i in 0..12 {
                let v = bilinear_shell(&field, lat0, dlat, dlon, lat0 + j as f64 * dlat, i as f64 * dlon);
                assert!(
                    (v - field[[j, i]]).abs() < 1e-9,
                    "cell ({j},{i}): {v} vs {}",
                    field[[j, i]]
                );
            }
        }
    }

    #[test]
    fn test_bilinear_constant_field() {
        let (lat0, dlat, dlon) = shell(6, 8);
        let field = Array2::from_elem((6, 8), 3.25);
        let v = bilinear_shell(&field, lat0, dlat, dlon, 0.77, 5.1);
        assert!((v - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_bilinear_wraps_longitude_seam() {
        let (lat0, dlat, dlon) = shell(5, 8);
        // Smooth periodic field: cos(lon)
        let field = Array2::from_shape_fn((5, 8), |(_, i)| (i as f64 * dlon).cos());
        // Halfway between the last cell and cell 0, across the seam
        let lon = (7.5) * dlon;
        let v = bilinear_shell(&field, lat0, dlat, dlon, lat0 + dlat, lon);
        let expected = 0.5 * ((7.0 * dlon).cos() + 1.0);
        assert!((v - expected).abs() < 1e-12, "seam sample {v} vs {expected}");
    }

    #[test]
    fn test_bilinear_clamps_latitude() {
        let (lat0, dlat, dlon) = shell(5, 8);
        let field = Array2::from_shape_fn((5, 8), |(j, _)| j as f64);
        let below = bilinear_shell(&field, lat0, dlat, dlon, lat0 - 10.0 * dlat, 0.0);
        let above = bilinear_shell(&field, lat0, dlat, dlon, lat0 + 40.0 * dlat, 0.0);
        assert!((below - 0.0).abs() < 1e-12);
        assert!((above - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_linear_in_lat() {
        let (_, dlat, dlon) = shell(9, 12);
        let field = Array2::from_shape_fn((9, 12), |(j, _)| 3.0 * j as f64 * dlat);
        let (d_dlat, d_dlon) = gradient_shell(&field, dlat, dlon);
        for j in 0..9 {
            for i in 0..12 {
                assert!((d_dlat[[j, i]] - 3.0).abs() < 1e-10);
                assert!(d_dlon[[j, i]].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_gradient_periodic_in_lon() {
        let (_, dlat, dlon) = shell(5, 16);
        // sin(lon) has derivative cos(lon); central difference is exact
        // up to the sinc factor sin(dlon)/dlon.
        let field = Array2::from_shape_fn((5, 16), |(_, i)| (i as f64 * dlon).sin());
        let (_, d_dlon) = gradient_shell(&field, dlat, dlon);
        let sinc = dlon.sin() / dlon;
        for i in 0..16 {
            let expected = (i as f64 * dlon).cos() * sinc;
            assert!(
                (d_dlon[[2, i]] - expected).abs() < 1e-10,
                "lon gradient at {i}: {} vs {expected}",
                d_dlon[[2, i]]
            );
        }
    }
}
