// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Error Types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

use crate::state::Frame;

/// Unified error type for the geospace workspace.
///
/// Physics stages clamp and count recoverable conditions instead of
/// returning errors; the variants here are the genuinely fatal ones:
/// bad configuration at init, solver divergence, and a timestep that
/// cannot be stabilized above the configured floor.
#[derive(Error, Debug)]
pub enum GeospaceError {
    /// Invalid configuration (fatal at initialization).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Iterative solver failed to converge or produced non-finite values.
    #[error("Solver diverged at iteration {iteration}: {message}")]
    SolverDiverged { iteration: usize, message: String },

    /// Timestep control could not find a stable dt above the floor.
    #[error(
        "Unstable timestep: dt={dt:.3e} s fell below floor {dt_min:.3e} s \
         at cell (lon={lon}, lat={lat}, alt={alt}): {message}"
    )]
    UnstableTimestep {
        dt: f64,
        dt_min: f64,
        lon: usize,
        lat: usize,
        alt: usize,
        message: String,
    },

    /// A vector field arrived in the wrong coordinate frame.
    #[error("Frame mismatch: expected {expected}, found {found}")]
    FrameMismatch { expected: Frame, found: Frame },

    /// Physical invariant broken outside the recoverable clamp set.
    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    /// IO error (config loading).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error (config loading).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the workspace.
pub type GeospaceResult<T> = Result<T, GeospaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_render() {
        let e = GeospaceError::SolverDiverged {
            iteration: 7,
            message: "residual is NaN".into(),
        };
        assert!(format!("{e}").contains("iteration 7"));

        let e = GeospaceError::UnstableTimestep {
            dt: 1e-3,
            dt_min: 1e-2,
            lon: 3,
            lat: 4,
            alt: 5,
            message: "vertical CFL".into(),
        };
        let text = format!("{e}");
        assert!(text.contains("lon=3"));
        assert!(text.contains("vertical CFL"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: GeospaceError = io.into();
        assert!(matches!(e, GeospaceError::Io(_)));
    }
}
