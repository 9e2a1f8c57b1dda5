// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Transform
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coordinate and vector conversions.
//!
//! All angles are radians. Longitude is always normalized to [0, 2π).
//! The local basis order is fixed: east, north, up (radially outward).
//!
//! Degenerate inputs produce defined zeros, never NaN: `xyz_to_llr` of
//! the origin returns `[0, 0, 0]`, and the env basis at the exact poles
//! is built from the caller-supplied longitude, which acts as the
//! reference meridian there.

use geospace_types::error::{GeospaceError, GeospaceResult};
use geospace_types::state::{Component, Frame, VectorField};
use ndarray::Array3;

use std::f64::consts::{PI, TAU};

/// Normalize a longitude to [0, 2π).
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    let l = lon.rem_euclid(TAU);
    // rem_euclid can return exactly TAU for tiny negative inputs
    if l >= TAU {
        l - TAU
    } else {
        l
    }
}

/// Spherical (lon, lat, radius) to Cartesian (x, y, z).
///
/// x points to (lon=0, lat=0), z to the north pole.
#[inline]
pub fn llr_to_xyz(llr: [f64; 3]) -> [f64; 3] {
    let [lon, lat, r] = llr;
    let clat = lat.cos();
    [r * clat * lon.cos(), r * clat * lon.sin(), r * lat.sin()]
}

/// Cartesian (x, y, z) back to (lon, lat, radius), lon in [0, 2π).
///
/// The origin maps to `[0, 0, 0]` (zero sentinel for the degenerate
/// case). At the poles x = y = 0, so the recovered longitude is 0.
#[inline]
pub fn xyz_to_llr(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 {
        return [0.0, 0.0, 0.0];
    }
    let lat = (z / r).clamp(-1.0, 1.0).asin();
    let lon = normalize_lon(y.atan2(x));
    [lon, lat, r]
}

/// Right-handed rotation of a 3-vector about the z axis.
#[inline]
pub fn rot_z(v: [f64; 3], angle: f64) -> [f64; 3] {
    let (s, c) = angle.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1], v[2]]
}

/// Right-handed rotation of a 3-vector about the y axis.
#[inline]
pub fn rot_y(v: [f64; 3], angle: f64) -> [f64; 3] {
    let (s, c) = angle.sin_cos();
    [c * v[0] + s * v[2], v[1], -s * v[0] + c * v[2]]
}

/// Elementwise 3-vector subtraction `a - b`. No normalization.
#[inline]
pub fn vector_diff(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Local orthonormal east/north/up basis at (lon, lat), as rows.
///
/// At |lat| = π/2 the basis is still well defined because it is built
/// from the supplied longitude; that longitude is the documented
/// reference meridian at the poles.
#[inline]
pub fn env_basis(lon: f64, lat: f64) -> [[f64; 3]; 3] {
    let (slon, clon) = lon.sin_cos();
    let (slat, clat) = lat.sin_cos();
    [
        [-slon, clon, 0.0],                      // east
        [-slat * clon, -slat * slon, clat],      // north
        [clat * clon, clat * slon, slat],        // up
    ]
}

/// Project a Cartesian vector onto the local east/north/up basis.
#[inline]
pub fn vector_xyz_to_env(v: [f64; 3], lon: f64, lat: f64) -> [f64; 3] {
    let basis = env_basis(lon, lat);
    let dot = |b: [f64; 3]| b[0] * v[0] + b[1] * v[1] + b[2] * v[2];
    [dot(basis[0]), dot(basis[1]), dot(basis[2])]
}

/// Rebuild the Cartesian vector from its east/north/up components.
/// Exact inverse of [`vector_xyz_to_env`] at the same (lon, lat).
#[inline]
pub fn vector_env_to_xyz(v: [f64; 3], lon: f64, lat: f64) -> [f64; 3] {
    let basis = env_basis(lon, lat);
    let mut out = [0.0; 3];
    for axis in 0..3 {
        out[axis] = basis[0][axis] * v[0] + basis[1][axis] * v[1] + basis[2][axis] * v[2];
    }
    out
}

/// Extract one local component from a frame-tagged vector field.
///
/// The field must already be expressed in `expected` frame; a mismatch
/// is a caller error reported as [`GeospaceError::FrameMismatch`], not
/// silently reconciled.
pub fn get_vector_component(
    field: &VectorField,
    component: Component,
    expected: Frame,
) -> GeospaceResult<Array3<f64>> {
    if field.frame != expected {
        return Err(GeospaceError::FrameMismatch {
            expected,
            found: field.frame,
        });
    }
    Ok(field.component(component).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: [f64; 3], b: [f64; 3], tol: f64) {
        for i in 0..3 {
            assert!(
                (a[i] - b[i]).abs() < tol,
                "component {i}: {} vs {}",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_llr_round_trip_general() {
        let cases = [
            [0.3, 0.7, 6.5e6],
            [PI, -0.4, 6.4e6],
            [PI - 1e-9, 0.0, 1.0], // just short of the ±180° meridian
            [PI + 1e-9, 0.0, 1.0], // just past it
            [6.1, -1.5, 7.0e6],
        ];
        for llr in cases {
            let back = xyz_to_llr(llr_to_xyz(llr));
            assert!(
                (back[0] - normalize_lon(llr[0])).abs() < 1e-9,
                "lon: {} vs {}",
                back[0],
                llr[0]
            );
            assert!((back[1] - llr[1]).abs() < 1e-9, "lat mismatch");
            assert!((back[2] - llr[2]).abs() / llr[2] < 1e-12, "radius mismatch");
        }
    }

    #[test]
    fn test_llr_round_trip_poles() {
        // Longitude is unrecoverable at the poles; lat and r must survive.
        for lat in [PI / 2.0, -PI / 2.0] {
            let back = xyz_to_llr(llr_to_xyz([1.2, lat, 6.4e6]));
            assert!((back[1] - lat).abs() < 1e-9);
            assert!((back[2] - 6.4e6).abs() < 1e-3);
        }
    }

    #[test]
    fn test_xyz_origin_is_zero_sentinel() {
        assert_eq!(xyz_to_llr([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rot_z_quarter_turn() {
        let v = rot_z([1.0, 0.0, 0.0], PI / 2.0);
        assert_vec_close(v, [0.0, 1.0, 0.0], 1e-15);
    }

    #[test]
    fn test_rot_y_quarter_turn() {
        // Right-handed about y: +z rotates toward +x.
        let v = rot_y([0.0, 0.0, 1.0], PI / 2.0);
        assert_vec_close(v, [1.0, 0.0, 0.0], 1e-15);
    }

    #[test]
    fn test_rotations_invert() {
        let v = [0.3, -1.2, 2.5];
        assert_vec_close(rot_z(rot_z(v, 0.77), -0.77), v, 1e-14);
        assert_vec_close(rot_y(rot_y(v, -1.31), 1.31), v, 1e-14);
    }

    #[test]
    fn test_env_basis_orthonormal() {
        let basis = env_basis(2.1, 0.6);
        for row in basis {
            let norm: f64 = row.iter().map(|c| c * c).sum();
            assert!((norm - 1.0).abs() < 1e-14, "row not unit length");
        }
        for a in 0..3 {
            for b in (a + 1)..3 {
                let dot: f64 = (0..3).map(|i| basis[a][i] * basis[b][i]).sum();
                assert!(dot.abs() < 1e-14, "rows {a},{b} not orthogonal");
            }
        }
    }

    #[test]
    fn test_env_round_trip() {
        let v = [10.0, -3.0, 7.5];
        let env = vector_xyz_to_env(v, 1.9, -0.4);
        let back = vector_env_to_xyz(env, 1.9, -0.4);
        assert_vec_close(back, v, 1e-12);
    }

    #[test]
    fn test_env_at_equator_is_identityish() {
        // At (lon=0, lat=0): east = +y, north = +z, up = +x.
        let env = vector_xyz_to_env([1.0, 2.0, 3.0], 0.0, 0.0);
        assert_vec_close(env, [2.0, 3.0, 1.0], 1e-14);
    }

    #[test]
    fn test_env_at_pole_uses_reference_meridian() {
        // Exactly at the north pole: finite output, and the caller's
        // longitude fixes what "east" means.
        let v = [1.0, 0.0, 0.0];
        let env0 = vector_xyz_to_env(v, 0.0, PI / 2.0);
        assert!(env0.iter().all(|c| c.is_finite()), "pole produced NaN");
        // lon=0 meridian: east = +y so v has no east part; north = -x.
        assert_vec_close(env0, [0.0, -1.0, 0.0], 1e-14);

        // Rotating the reference meridian rotates the decomposition.
        let env90 = vector_xyz_to_env(v, PI / 2.0, PI / 2.0);
        assert_vec_close(env90, [-1.0, 0.0, 0.0], 1e-14);
    }

    #[test]
    fn test_vector_diff_no_normalization() {
        let d = vector_diff([5.0, 1.0, -2.0], [1.0, 1.0, 1.0]);
        assert_eq!(d, [4.0, 0.0, -3.0]);
    }

    #[test]
    fn test_get_vector_component_frame_check() {
        let mut field = VectorField::zeros(Frame::Geographic, (2, 3, 4));
        field.north.fill(4.2);

        let north = get_vector_component(&field, Component::North, Frame::Geographic).unwrap();
        assert_eq!(north.dim(), (2, 3, 4));
        assert!((north[[1, 2, 3]] - 4.2).abs() < 1e-15);

        match get_vector_component(&field, Component::East, Frame::Geomagnetic) {
            Err(GeospaceError::FrameMismatch { expected, found }) => {
                assert_eq!(expected, Frame::Geomagnetic);
                assert_eq!(found, Frame::Geographic);
            }
            other => panic!("expected FrameMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_lon_edges() {
        assert!((normalize_lon(-PI) - PI).abs() < 1e-12);
        assert!(normalize_lon(TAU) < 1e-12);
        assert!(normalize_lon(-1e-18) < TAU);
        assert!(normalize_lon(7.0 * PI) - PI < 1e-12);
    }
}
