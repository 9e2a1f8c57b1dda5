// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Geospace Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Numerical kernels shared by the geospace physics components.
//!
//! Nothing in this crate knows about species, chemistry, or the solar
//! driver; every function here is a pure operator over coordinates,
//! vectors, columns, or shells.

pub mod integrate;
pub mod interp;
pub mod multigrid;
pub mod sor;
pub mod special;
pub mod transform;
pub mod tridiag;
pub mod upwind;
