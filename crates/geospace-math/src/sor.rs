// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — SOR
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Red-Black SOR for the variable-coefficient shell operator
//!
//!   L φ = Σ_faces c_f (φ_nb − φ_c) = S
//!
//! in finite-volume form on a `[nlat, nlon]` magnetic shell. Face
//! coefficients carry the conductance and the metric factors; they
//! must be strictly positive (the conductance floor guarantees that),
//! which makes the system diagonally dominant. Longitude is periodic;
//! the first and last latitude rows are Dirichlet and never updated.

use ndarray::Array2;

/// Face coefficients of the divergence-form elliptic operator.
#[derive(Debug, Clone)]
pub struct ShellOperator {
    /// Coefficient of the face between rows j-1 and j, stored at index
    /// j; dim [nlat+1, nlon]. Rows 0 and nlat border the Dirichlet
    /// boundary and the pole cap.
    pub coef_lat: Array2<f64>,
    /// Coefficient of the face between columns i and i+1 (wraps);
    /// dim [nlat, nlon].
    pub coef_lon: Array2<f64>,
}

impl ShellOperator {
    /// Uniform-coefficient operator (index-space Laplacian), mostly
    /// for tests and benchmarks.
    pub fn uniform(nlat: usize, nlon: usize, c: f64) -> Self {
        ShellOperator {
            coef_lat: Array2::from_elem((nlat + 1, nlon), c),
            coef_lon: Array2::from_elem((nlat, nlon), c),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.coef_lon.dim()
    }
}

/// Update a single interior point with the SOR stencil.
#[inline(always)]
fn update_point(phi: &mut Array2<f64>, source: &Array2<f64>, op: &ShellOperator, j: usize, i: usize, nlon: usize, omega: f64) {
    let ip = (i + 1) % nlon;
    let im = (i + nlon - 1) % nlon;

    let c_s = op.coef_lat[[j, i]];
    let c_n = op.coef_lat[[j + 1, i]];
    let c_w = op.coef_lon[[j, im]];
    let c_e = op.coef_lon[[j, i]];
    let center = c_s + c_n + c_w + c_e;

    let neighbor_sum = c_s * phi[[j - 1, i]]
        + c_n * phi[[j + 1, i]]
        + c_w * phi[[j, im]]
        + c_e * phi[[j, ip]];

    // Gauss-Seidel prediction, then over-relax
    let p_star = (neighbor_sum - source[[j, i]]) / center;
    phi[[j, i]] = (1.0 - omega) * phi[[j, i]] + omega * p_star;
}

/// One Red-Black SOR sweep. Interior rows only; longitude wraps.
/// A proper 2-coloring needs even `nlon`; the electrodynamics setup
/// validates that at init.
pub fn sor_step(phi: &mut Array2<f64>, source: &Array2<f64>, op: &ShellOperator, omega: f64) {
    let (nlat, nlon) = phi.dim();

    for parity in [0usize, 1usize] {
        for j in 1..nlat - 1 {
            for i in 0..nlon {
                if (j + i) % 2 == parity {
                    update_point(phi, source, op, j, i, nlon, omega);
                }
            }
        }
    }
}

/// Run N SOR sweeps.
pub fn sor_solve(
    phi: &mut Array2<f64>,
    source: &Array2<f64>,
    op: &ShellOperator,
    omega: f64,
    iterations: usize,
) {
    for _ in 0..iterations {
        sor_step(phi, source, op, omega);
    }
}

/// L-infinity residual max |L φ − S| over the interior.
pub fn sor_residual(phi: &Array2<f64>, source: &Array2<f64>, op: &ShellOperator) -> f64 {
    let (nlat, nlon) = phi.dim();
    let mut max_res: f64 = 0.0;

    for j in 1..nlat - 1 {
        for i in 0..nlon {
            let ip = (i + 1) % nlon;
            let im = (i + nlon - 1) % nlon;

            let c_s = op.coef_lat[[j, i]];
            let c_n = op.coef_lat[[j + 1, i]];
            let c_w = op.coef_lon[[j, im]];
            let c_e = op.coef_lon[[j, i]];

            let lphi = c_s * (phi[[j - 1, i]] - phi[[j, i]])
                + c_n * (phi[[j + 1, i]] - phi[[j, i]])
                + c_w * (phi[[j, im]] - phi[[j, i]])
                + c_e * (phi[[j, ip]] - phi[[j, i]]);

            max_res = max_res.max((lphi - source[[j, i]]).abs());
        }
    }

    max_res
}
