// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Geospace Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The geospace physics engine: a coupled thermosphere–ionosphere
//! circulation core on a structured spherical grid.
//!
//! [`advance::AdvanceKernel`] owns the state and sequences the fixed
//! per-step pipeline: EUV forcing → chemistry → electrodynamics →
//! momentum/energy → continuity → frame reconciliation → step
//! validation with reject-and-retry timestep control.

pub mod advance;
pub mod bfield;
pub mod chemistry;
pub mod electrodynamics;
pub mod euv;
pub mod grid;
pub mod ions;
pub mod neutrals;
