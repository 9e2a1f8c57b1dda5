// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Special Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Error-function family and the Chapman grazing-incidence factor.
//!
//! `erfc` uses the rational Chebyshev fit with fractional error below
//! 1.2e-7 everywhere. `erfcx(x) = exp(x²) erfc(x)` reuses the same fit
//! with the Gaussian factor cancelled analytically, so it never
//! overflows for large positive arguments.

use std::f64::consts::PI;

/// Chebyshev fit exponent polynomial shared by `erfc` and `erfcx`.
#[inline]
fn erfc_poly(t: f64) -> f64 {
    -1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587
                                    + t * (-0.82215223 + t * 0.17087277))))))))
}

/// Complementary error function, fractional error < 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let ax = x.abs();
    let t = 1.0 / (1.0 + 0.5 * ax);
    let ans = t * (-ax * ax + erfc_poly(t)).exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Scaled complementary error function exp(x²)·erfc(x).
///
/// Finite for arbitrarily large positive x (asymptote 1/(x√π)).
/// Negative arguments below about -26 would overflow the exp(x²)
/// factor; those are outside this crate's use and saturate at f64 max.
pub fn erfcx(x: f64) -> f64 {
    if x >= 0.0 {
        let t = 1.0 / (1.0 + 0.5 * x);
        t * erfc_poly(t).exp()
    } else {
        // erfcx(-x) = 2 exp(x²) - erfcx(x)
        let e = (x * x).min(700.0).exp();
        2.0 * e - erfcx(-x)
    }
}

/// Chapman grazing-incidence function Ch(X, χ).
///
/// `x_ratio` is the ratio of geocentric distance to scale height
/// (X = r/H, typically 50–500 in the thermosphere) and `cos_chi` the
/// cosine of the solar zenith angle. Multiplies a vertical column
/// density to give the slant column along the ray to the sun:
///
///   Ch = sqrt(πX/2) · erfcx( sqrt(X/2) · cos χ )
///
/// Recovers sec χ for small zenith angles and stays finite at the
/// terminator (χ = 90°). Only defined for the dayside, cos χ ≥ 0;
/// callers clamp the nightside before getting here.
pub fn chapman(x_ratio: f64, cos_chi: f64) -> f64 {
    debug_assert!(x_ratio > 0.0, "chapman requires X > 0, got {x_ratio}");
    debug_assert!(
        (0.0..=1.0).contains(&cos_chi),
        "chapman requires 0 <= cos_chi <= 1, got {cos_chi}"
    );
    let half_x = 0.5 * x_ratio;
    (PI * half_x).sqrt() * erfcx(half_x.sqrt() * cos_chi)
}
