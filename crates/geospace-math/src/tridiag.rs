// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for tridiagonal systems.
//!
//! Used for the implicit vertical heat-conduction solve, one system
//! per atmospheric column. The in-place variant exists because the
//! conduction sweep solves thousands of columns per step and must not
//! allocate per column.

/// Solve tridiagonal system Ax = d using the Thomas algorithm.
///
/// - `a`: sub-diagonal \[n\] (a\[0\] unused)
/// - `b`: main diagonal \[n\]
/// - `c`: super-diagonal \[n\] (c\[n-1\] unused)
/// - `d`: right-hand side \[n\]
///
/// Returns: solution vector x \[n\]
///
/// Panics if b\[0\] == 0 or if a pivot becomes zero (singular system).
pub fn thomas_solve(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> Vec<f64> {
    let n = d.len();
    let mut c_prime = vec![0.0; n];
    let mut x = d.to_vec();
    thomas_solve_in_place(a, b, c, &mut x, &mut c_prime);
    x
}

/// In-place Thomas solve: `d` enters as the right-hand side and leaves
/// as the solution. `scratch` must have length n and is clobbered.
///
/// Same diagonal conventions as [`thomas_solve`].
pub fn thomas_solve_in_place(a: &[f64], b: &[f64], c: &[f64], d: &mut [f64], scratch: &mut [f64]) {
    let n = d.len();
    assert!(n > 0, "System size must be > 0");
    assert_eq!(a.len(), n);
    assert_eq!(b.len(), n);
    assert_eq!(c.len(), n);
    assert_eq!(scratch.len(), n);

    // Forward sweep
    scratch[0] = c[0] / b[0];
    d[0] /= b[0];

    for i in 1..n {
        let den = b[i] - a[i] * scratch[i - 1];
        if i < n - 1 {
            scratch[i] = c[i] / den;
        }
        d[i] = (d[i] - a[i] * d[i - 1]) / den;
    }

    // Back substitution
    for i in (0..n - 1).rev() {
        d[i] -= scratch[i] * d[i + 1];
    }
}
