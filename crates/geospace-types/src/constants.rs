// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Mean Earth radius (m).
pub const R_EARTH: f64 = 6.371e6;

/// Gravitational acceleration at the surface (m/s^2).
/// Scales as (R_EARTH / r)^2 with geocentric distance.
pub const G_SURFACE: f64 = 9.80665;

/// Earth rotation rate (rad/s).
pub const OMEGA_EARTH: f64 = 7.2921159e-5;

/// Equatorial surface strength of the centered dipole (T).
pub const B_EQUATORIAL: f64 = 3.12e-5;

/// Boltzmann constant (J/K).
pub const K_BOLTZMANN: f64 = 1.380649e-23;

/// Unified atomic mass unit (kg).
pub const AMU_KG: f64 = 1.66053906660e-27;

/// Elementary charge (C).
pub const Q_ELEMENTARY: f64 = 1.602176634e-19;

/// Planck constant (J s).
pub const H_PLANCK: f64 = 6.62607015e-34;

/// Speed of light in vacuum (m/s).
pub const C_LIGHT: f64 = 2.99792458e8;

/// Ratio of specific heats for the thermospheric mixture.
pub const GAMMA_NEUTRAL: f64 = 5.0 / 3.0;

/// Seconds per solar day (s).
pub const SECONDS_PER_DAY: f64 = 86_400.0;
