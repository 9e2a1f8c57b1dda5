// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Multigrid Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometric multigrid V-cycle for the variable-coefficient shell
//! operator, with Red-Black SOR smoothing (from [`crate::sor`]).
//!
//! Cell-centered coarsening by a factor of two in both directions:
//! - **Restriction**: residuals are summed over 2×2 fine cells, which
//!   matches the finite-volume (cell-integrated) form of the equation.
//! - **Coefficient restriction**: coarse face coefficients average the
//!   two fine faces they replace.
//! - **Prolongation**: piecewise-constant injection of the coarse
//!   correction, added to interior fine cells only so the Dirichlet
//!   rows stay untouched.
//!
//! Coarsening stops when either dimension becomes odd or drops below
//! `min_grid_size`; the coarsest level is smoothed out directly.
//! Longitude stays periodic on every level (even `nlon` required,
//! validated by the electrodynamics setup).

use ndarray::Array2;

use crate::sor::{sor_residual, sor_step, ShellOperator};

/// Configuration for the multigrid V-cycle solver.
#[derive(Debug, Clone)]
pub struct MultigridConfig {
    /// Pre-smoothing SOR sweeps per level (default: 3)
    pub pre_smooth: usize,
    /// Post-smoothing SOR sweeps per level (default: 3)
    pub post_smooth: usize,
    /// SOR relaxation parameter (default: 1.5)
    pub omega: f64,
    /// Coarsest-level SOR sweeps (default: 60)
    pub coarse_iters: usize,
    /// Minimum dimension that still coarsens (default: 8)
    pub min_grid_size: usize,
}

impl Default for MultigridConfig {
    fn default() -> Self {
        MultigridConfig {
            pre_smooth: 3,
            post_smooth: 3,
            omega: 1.5,
            coarse_iters: 60,
            min_grid_size: 8,
        }
    }
}

/// Result of a multigrid solve.
#[derive(Debug, Clone)]
pub struct MultigridResult {
    /// Number of V-cycles performed.
    pub cycles: usize,
    /// Final L-infinity residual.
    pub residual: f64,
    /// Whether convergence was achieved.
    pub converged: bool,
}

/// Residual vector r = S − L φ on the interior.
fn residual_vector(phi: &Array2<f64>, source: &Array2<f64>, op: &ShellOperator) -> Array2<f64> {
    let (nlat, nlon) = phi.dim();
    let mut res = Array2::zeros((nlat, nlon));

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

            res[[j, i]] = source[[j, i]] - lphi;
        }
    }

    res
}

/// Cell-centered restriction: sum each 2×2 block of fine cells.
/// Summation (not averaging) preserves the cell-integrated form.
fn restrict(fine: &Array2<f64>, coarse: &mut Array2<f64>) {
    let (cnlat, cnlon) = coarse.dim();
    for j in 0..cnlat {
        for i in 0..cnlon {
            coarse[[j, i]] = fine[[2 * j, 2 * i]]
                + fine[[2 * j + 1, 2 * i]]
                + fine[[2 * j, 2 * i + 1]]
                + fine[[2 * j + 1, 2 * i + 1]];
        }
    }
}

/// Piecewise-constant prolongation, added to interior fine cells only.
fn prolongate_add(coarse: &Array2<f64>, fine: &mut Array2<f64>) {
    let (fnlat, _) = fine.dim();
    let (cnlat, cnlon) = coarse.dim();
    for j in 0..cnlat {
        for i in 0..cnlon {
            for (dj, di) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let fj = 2 * j + dj;
                if fj == 0 || fj == fnlat - 1 {
                    continue; // Dirichlet rows stay fixed
                }
                fine[[fj, 2 * i + di]] += coarse[[j, i]];
            }
        }
    }
}

/// Coarsen the operator: each coarse face coefficient averages the two
/// fine faces it replaces.
fn coarsen_operator(op: &ShellOperator) -> ShellOperator {
    let (nlat, nlon) = op.dim();
    let (cnlat, cnlon) = (nlat / 2, nlon / 2);

    let mut coef_lat = Array2::zeros((cnlat + 1, cnlon));
    for j in 0..=cnlat {
        for i in 0..cnlon {
            let fj = (2 * j).min(nlat);
            coef_lat[[j, i]] = 0.5 * (op.coef_lat[[fj, 2 * i]] + op.coef_lat[[fj, 2 * i + 1]]);
        }
    }

    let mut coef_lon = Array2::zeros((cnlat, cnlon));
    for j in 0..cnlat {
        for i in 0..cnlon {
            let fi = 2 * i + 1; // fine face between the two halves of coarse cell i and the next
            coef_lon[[j, i]] = 0.5 * (op.coef_lon[[2 * j, fi]] + op.coef_lon[[2 * j + 1, fi]]);
        }
    }

    ShellOperator { coef_lat, coef_lon }
}

fn can_coarsen(nlat: usize, nlon: usize, min: usize) -> bool {
    nlat % 2 == 0 && nlon % 2 == 0 && nlat >= min && nlat / 2 >= 4 && nlon / 2 >= 4
}

/// One V-cycle on the current level.
fn v_cycle(phi: &mut Array2<f64>, source: &Array2<f64>, op: &ShellOperator, config: &MultigridConfig) {
    let (nlat, nlon) = phi.dim();

    if !can_coarsen(nlat, nlon, config.min_grid_size) {
        for _ in 0..config.coarse_iters {
            sor_step(phi, source, op, config.omega);
        }
        return;
    }

    // 1. Pre-smoothing
    for _ in 0..config.pre_smooth {
        sor_step(phi, source, op, config.omega);
    }

    // 2. Restrict the residual
    let res_fine = residual_vector(phi, source, op);
    let mut res_coarse = Array2::zeros((nlat / 2, nlon / 2));
    restrict(&res_fine, &mut res_coarse);

    // 3. Coarse correction: L_c e = r_c with e = 0 initially, since
    // L(φ + e) = S reduces to L e = S − L φ = r.
    let op_coarse = coarsen_operator(op);
    let mut correction = Array2::zeros((nlat / 2, nlon / 2));
    v_cycle(&mut correction, &res_coarse, &op_coarse, config);

    // 4. Prolongate and add
    prolongate_add(&correction, phi);

    // 5. Post-smoothing
    for _ in 0..config.post_smooth {
        sor_step(phi, source, op, config.omega);
    }
}

/// Solve L φ = S with multigrid V-cycles.
///
/// `phi` enters as the initial guess and leaves as the solution; the
/// first and last latitude rows are Dirichlet values and are never
/// modified.
pub fn multigrid_solve(
    phi: &mut Array2<f64>,
    source: &Array2<f64>,
    op: &ShellOperator,
    config: &MultigridConfig,
    max_cycles: usize,
    tol: f64,
) -> MultigridResult {
    let mut residual = sor_residual(phi, source, op);

    for cycle in 1..=max_cycles {
        if residual < tol {
            return MultigridResult {
                cycles: cycle - 1,
                residual,
                converged: true,
            };
        }
        v_cycle(phi, source, op, config);
        residual = sor_residual(phi, source, op);
    }

    MultigridResult {
        cycles: max_cycles,
        residual,
        converged: residual < tol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multigrid_convergence_uniform() {
        let op = ShellOperator::uniform(32, 16, 1.0);
        let mut phi = Array2::zeros((32, 16));
        let source = Array2::from_elem((32, 16), -1.0);

        let result = multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 60, 1e-6);

        assert!(
            result.converged,
            "Should converge: residual = {}, cycles = {}",
            result.residual, result.cycles
        );
        assert!(!phi.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_multigrid_beats_its_own_start() {
        let op = ShellOperator::uniform(44, 48, 1.0);
        let mut phi = Array2::zeros((44, 48));
        let source = Array2::from_shape_fn((44, 48), |(j, i)| {
            ((i as f64 * 0.26).sin() * (j as f64 * 0.2).cos()) * 0.1
        });

        let res0 = sor_residual(&phi, &source, &op);
        let result = multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 25, 1e-12);

        assert!(
            result.residual < 1e-3 * res0,
            "25 cycles should cut the residual by 1e3: {res0} -> {}",
            result.residual
        );
    }

    #[test]
    fn test_multigrid_zero_source() {
        let op = ShellOperator::uniform(16, 16, 1.0);
        let mut phi = Array2::zeros((16, 16));
        let source = Array2::zeros((16, 16));

        let result = multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 5, 1e-12);

        let max_val = phi.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
        assert!(max_val < 1e-14, "Zero source should give zero: {max_val}");
        assert!(result.converged);
        assert_eq!(result.cycles, 0, "converged before the first cycle");
    }

    #[test]
    fn test_multigrid_dirichlet_rows_preserved() {
        let op = ShellOperator::uniform(24, 16, 1.0);
        let mut phi = Array2::zeros((24, 16));
        for i in 0..16 {
            phi[[0, i]] = 1.5;
        }
        let source = Array2::from_elem((24, 16), -0.5);

        multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 20, 1e-8);

        for i in 0..16 {
            assert!((phi[[0, i]] - 1.5).abs() < 1e-15, "row 0 modified");
            assert!(phi[[23, i]].abs() < 1e-15, "row 23 modified");
        }
    }

    #[test]
    fn test_multigrid_variable_coefficients() {
        // Conductance-like coefficient contrast of ~100x.
        let nlat = 32;
        let nlon = 16;
        let mut op = ShellOperator::uniform(nlat, nlon, 1.0);
        for j in 0..=nlat {
            for i in 0..nlon {
                op.coef_lat[[j, i]] = 0.1 + 10.0 * ((j as f64 / nlat as f64) * 3.0).exp().min(10.0);
            }
        }

        let mut phi = Array2::zeros((nlat, nlon));
        let source = Array2::from_elem((nlat, nlon), -1.0);

        let res0 = sor_residual(&phi, &source, &op);
        let result =
            multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 60, 1e-9);

        assert!(result.residual < 1e-2 * res0, "no progress on variable coefficients");
        assert!(!phi.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_restrict_sums_blocks() {
        let fine = Array2::from_elem((8, 8), 1.0);
        let mut coarse = Array2::zeros((4, 4));
        restrict(&fine, &mut coarse);
        for &v in coarse.iter() {
            assert!((v - 4.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_prolongate_skips_dirichlet_rows() {
        let coarse = Array2::from_elem((4, 4), 1.0);
        let mut fine = Array2::zeros((8, 8));
        prolongate_add(&coarse, &mut fine);
        for i in 0..8 {
            assert_eq!(fine[[0, i]], 0.0);
            assert_eq!(fine[[7, i]], 0.0);
        }
        assert_eq!(fine[[3, 3]], 1.0);
    }
}
