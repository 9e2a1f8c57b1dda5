// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — BField
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tilted centered dipole geomagnetic field.
//!
//! Provides the magnetic coordinates of any geographic point, the
//! field vector in geographic east/north/up components, the dip angle,
//! and the L-shell. Grid construction samples this once per cell; the
//! field is static for a run.

use geospace_math::transform::{
    llr_to_xyz, normalize_lon, rot_y, rot_z, vector_env_to_xyz, vector_xyz_to_env, xyz_to_llr,
};
use geospace_types::constants::{B_EQUATORIAL, R_EARTH};

/// Dipole axis tilt from the rotation axis [deg].
const DIPOLE_TILT_DEG: f64 = 11.0;

/// Geographic east longitude of the boreal dipole pole meridian [deg].
const DIPOLE_POLE_LON_DEG: f64 = 289.1;

/// Radius floor to keep the 1/r³ field finite near the origin [m].
const R_SAFE_MIN: f64 = 1.0e3;

/// Tilted centered dipole model.
#[derive(Debug, Clone)]
pub struct Dipole {
    tilt: f64,
    pole_lon: f64,
}

impl Default for Dipole {
    fn default() -> Self {
        Dipole {
            tilt: DIPOLE_TILT_DEG.to_radians(),
            pole_lon: DIPOLE_POLE_LON_DEG.to_radians(),
        }
    }
}

impl Dipole {
    /// Untilted dipole aligned with the rotation axis, for tests where
    /// geographic and magnetic frames should coincide.
    pub fn aligned() -> Self {
        Dipole {
            tilt: 0.0,
            pole_lon: 0.0,
        }
    }

    /// Rotate a geographic Cartesian vector into the dipole frame.
    #[inline]
    pub fn to_mag_xyz(&self, v: [f64; 3]) -> [f64; 3] {
        rot_y(rot_z(v, -self.pole_lon), -self.tilt)
    }

    /// Rotate a dipole-frame Cartesian vector back to geographic.
    #[inline]
    pub fn to_geo_xyz(&self, v: [f64; 3]) -> [f64; 3] {
        rot_z(rot_y(v, self.tilt), self.pole_lon)
    }

    /// Magnetic (mlon, mlat) of a geographic point [rad].
    pub fn mag_coords(&self, lon: f64, lat: f64) -> (f64, f64) {
        let v = self.to_mag_xyz(llr_to_xyz([lon, lat, 1.0]));
        let llr = xyz_to_llr(v);
        (normalize_lon(llr[0]), llr[1])
    }

    /// Dipole field at (lon, lat, r), in geographic east/north/up [T].
    pub fn field_env(&self, lon: f64, lat: f64, r: f64) -> [f64; 3] {
        let r_safe = r.max(R_SAFE_MIN);
        let (mlon, mlat) = self.mag_coords(lon, lat);
        let b0 = B_EQUATORIAL * (R_EARTH / r_safe).powi(3);

        // Dipole in its own frame: B_up = -2 B0 sin(mlat),
        // B_north = B0 cos(mlat), B_east = 0.
        let b_mag_env = [0.0, b0 * mlat.cos(), -2.0 * b0 * mlat.sin()];
        let b_mag_xyz = vector_env_to_xyz(b_mag_env, mlon, mlat);
        let b_geo_xyz = self.to_geo_xyz(b_mag_xyz);
        vector_xyz_to_env(b_geo_xyz, lon, lat)
    }

    /// Field magnitude [T].
    pub fn field_magnitude(&self, lon: f64, lat: f64, r: f64) -> f64 {
        let b = self.field_env(lon, lat, r);
        (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt()
    }

    /// Magnetic dip angle: positive where the field points into the
    /// ground (northern magnetic hemisphere) [rad].
    pub fn dip_angle(&self, lon: f64, lat: f64, r: f64) -> f64 {
        let b = self.field_env(lon, lat, r);
        let horizontal = (b[0] * b[0] + b[1] * b[1]).sqrt();
        (-b[2]).atan2(horizontal)
    }

    /// McIlwain L-shell of the field line through (mlat, r).
    pub fn l_shell(&self, mlat: f64, r: f64) -> f64 {
        let c = mlat.cos();
        // A field line grazing the pole has unbounded L; clamp the
        // cosine rather than return infinity.
        (r / R_EARTH) / (c * c).max(1e-12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_mag_coords_of_dipole_pole() {
        let d = Dipole::default();
        // The geographic point under the boreal dipole axis maps to
        // the magnetic pole.
        let lat = FRAC_PI_2 - DIPOLE_TILT_DEG.to_radians();
        let (_, mlat) = d.mag_coords(DIPOLE_POLE_LON_DEG.to_radians(), lat);
        assert!(
            (mlat - FRAC_PI_2).abs() < 1e-9,
            "dipole pole maps to mlat = {mlat}"
        );
    }

    #[test]
    fn test_aligned_dipole_is_identity_mapping() {
        let d = Dipole::aligned();
        for (lon, lat) in [(0.3, 0.5), (2.0, -1.0), (5.5, 0.0)] {
            let (mlon, mlat) = d.mag_coords(lon, lat);
            assert!((mlon - lon).abs() < 1e-12);
            assert!((mlat - lat).abs() < 1e-12);
        }
    }

    #[test]
    fn test_frame_rotations_invert() {
        let d = Dipole::default();
        let v = [1.0, -2.0, 0.5];
        let back = d.to_geo_xyz(d.to_mag_xyz(v));
        for i in 0..3 {
            assert!((back[i] - v[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_equatorial_field_strength_and_direction() {
        let d = Dipole::aligned();
        // At the magnetic equator at one Earth radius: horizontal
        // field of magnitude B0 pointing north, no vertical part.
        let b = d.field_env(1.0, 0.0, R_EARTH);
        assert!((b[1] - B_EQUATORIAL).abs() / B_EQUATORIAL < 1e-9);
        assert!(b[0].abs() < 1e-12);
        assert!(b[2].abs() < 1e-9 * B_EQUATORIAL);
    }

    #[test]
    fn test_polar_field_is_double_and_downward() {
        let d = Dipole::aligned();
        let b = d.field_env(0.0, FRAC_PI_2 - 1e-6, R_EARTH);
        assert!(
            (-b[2] - 2.0 * B_EQUATORIAL).abs() / B_EQUATORIAL < 1e-3,
            "polar B_up = {}",
            b[2]
        );
    }

    #[test]
    fn test_field_falls_off_as_r_cubed() {
        let d = Dipole::default();
        let b1 = d.field_magnitude(1.0, 0.7, R_EARTH);
        let b2 = d.field_magnitude(1.0, 0.7, 2.0 * R_EARTH);
        assert!((b1 / b2 - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_dip_angle_signs() {
        let d = Dipole::aligned();
        let north = d.dip_angle(0.0, 1.0, R_EARTH);
        let south = d.dip_angle(0.0, -1.0, R_EARTH);
        let equator = d.dip_angle(0.0, 0.0, R_EARTH);
        assert!(north > 0.0, "northern dip should be positive");
        assert!(south < 0.0, "southern dip should be negative");
        assert!(equator.abs() < 1e-9, "equatorial dip should vanish");
    }

    #[test]
    fn test_l_shell_grows_with_latitude() {
        let d = Dipole::default();
        let l_low = d.l_shell(0.2, R_EARTH);
        let l_high = d.l_shell(1.2, R_EARTH);
        assert!(l_low > 1.0 && l_high > l_low);
        assert!(d.l_shell(PI / 2.0, R_EARTH).is_finite());
    }
}
