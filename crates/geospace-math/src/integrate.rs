// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Integrate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Time-integration primitives: an explicit Euler kernel over an RHS
//! closure, the positivity-preserving semi-implicit density update,
//! and the Courant bound helper used by step validation.

use ndarray::Array3;

/// One explicit Euler step y' = y + dt · rhs(y).
///
/// The right-hand side is a closure so the same kernel serves any
/// field; it is evaluated exactly once on the frozen input.
pub fn euler_step<F>(y: &Array3<f64>, rhs: F, dt: f64) -> Array3<f64>
where
    F: FnOnce(&Array3<f64>) -> Array3<f64>,
{
    let mut out = y.clone();
    out.scaled_add(dt, &rhs(y));
    out
}

/// Semi-implicit density update for stiff production/loss chemistry:
///
///   n' = (n + dt·P) / (1 + dt·L)
///
/// with production rate `P` [m^-3 s^-1] and loss *frequency* `L`
/// [s^-1]. For nonnegative P and L the result is nonnegative for any
/// dt, which is what keeps loss-dominated species from going negative.
/// The result is floored afterwards; returns the updated cube and the
/// number of cells raised to the floor.
pub fn semi_implicit_density(
    n: &Array3<f64>,
    production: &Array3<f64>,
    loss_freq: &Array3<f64>,
    dt: f64,
    floor: f64,
) -> (Array3<f64>, usize) {
    let mut out = Array3::zeros(n.dim());
    let mut floored = 0usize;
    ndarray::Zip::from(&mut out)
        .and(n)
        .and(production)
        .and(loss_freq)
        .for_each(|o, &ni, &p, &l| {
            let updated = (ni + dt * p) / (1.0 + dt * l);
            if updated < floor {
                *o = floor;
                floored += 1;
            } else {
                *o = updated;
            }
        });
    (out, floored)
}

/// Courant-type timestep bound dt ≤ dx / v for the fastest signal.
///
/// Returns infinity when nothing moves, so a still atmosphere never
/// restricts the step.
#[inline]
pub fn courant_bound(max_speed: f64, min_spacing: f64) -> f64 {
    if max_speed <= 0.0 {
        f64::INFINITY
    } else {
        min_spacing / max_speed
    }
}
