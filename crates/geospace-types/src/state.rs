// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! State containers: frame-tagged vector fields, neutral and ion state,
//! per-step diagnostics, and run summaries.
//!
//! Every gridded field is an `Array3<f64>` with dimension order
//! `[nlon, nlat, nalt]`. Vector fields carry an explicit [`Frame`] tag;
//! consumers check the tag instead of trusting call-site convention.

use ndarray::Array3;

use crate::indices::{IonSpecies, NeutralSpecies};

/// Coordinate frame of a vector field's east/north/up decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Local east/north/up relative to the geographic grid.
    Geographic,
    /// Local east/north/up relative to the geomagnetic (dipole) grid.
    Geomagnetic,
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Geographic => write!(f, "geographic"),
            Frame::Geomagnetic => write!(f, "geomagnetic"),
        }
    }
}

/// One of the three local vector components, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    East = 0,
    North = 1,
    Up = 2,
}

impl Component {
    pub const ALL: [Component; 3] = [Self::East, Self::North, Self::Up];
}

/// A 3-component vector field over the grid, tagged with its frame.
///
/// Component order is always east, north, up (radially outward).
/// Transform operations produce new fields; they never retag in place.
#[derive(Debug, Clone)]
pub struct VectorField {
    pub frame: Frame,
    pub east: Array3<f64>,
    pub north: Array3<f64>,
    pub up: Array3<f64>,
}

impl VectorField {
    pub fn zeros(frame: Frame, dim: (usize, usize, usize)) -> Self {
        VectorField {
            frame,
            east: Array3::zeros(dim),
            north: Array3::zeros(dim),
            up: Array3::zeros(dim),
        }
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.east.dim()
    }

    /// Borrow one component cube.
    pub fn component(&self, c: Component) -> &Array3<f64> {
        match c {
            Component::East => &self.east,
            Component::North => &self.north,
            Component::Up => &self.up,
        }
    }

    /// Pointwise Euclidean magnitude.
    pub fn magnitude(&self) -> Array3<f64> {
        let mut out = Array3::zeros(self.dim());
        ndarray::Zip::from(&mut out)
            .and(&self.east)
            .and(&self.north)
            .and(&self.up)
            .for_each(|m, &e, &n, &u| *m = (e * e + n * n + u * u).sqrt());
        out
    }

    /// Vector value at one cell as `[east, north, up]`.
    pub fn at(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [
            self.east[[i, j, k]],
            self.north[[i, j, k]],
            self.up[[i, j, k]],
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.east.iter().all(|v| v.is_finite())
            && self.north.iter().all(|v| v.is_finite())
            && self.up.iter().all(|v| v.is_finite())
    }
}

/// Neutral thermosphere state: per-species densities, one bulk wind,
/// one bulk temperature.
#[derive(Debug, Clone)]
pub struct NeutralState {
    /// Number density per species, indexed by `NeutralSpecies::idx()` [m^-3].
    pub density: Vec<Array3<f64>>,
    /// Bulk neutral wind, geographic east/north/up [m/s].
    pub wind: VectorField,
    /// Bulk neutral temperature [K].
    pub temperature: Array3<f64>,
}

impl NeutralState {
    pub fn new(dim: (usize, usize, usize)) -> Self {
        NeutralState {
            density: (0..NeutralSpecies::COUNT)
                .map(|_| Array3::zeros(dim))
                .collect(),
            wind: VectorField::zeros(Frame::Geographic, dim),
            temperature: Array3::zeros(dim),
        }
    }

    pub fn density(&self, s: NeutralSpecies) -> &Array3<f64> {
        &self.density[s.idx()]
    }

    pub fn density_mut(&mut self, s: NeutralSpecies) -> &mut Array3<f64> {
        &mut self.density[s.idx()]
    }

    /// Mass density rho = sum_s n_s m_s [kg/m^3].
    pub fn mass_density(&self) -> Array3<f64> {
        let mut rho = Array3::zeros(self.temperature.dim());
        for s in NeutralSpecies::ALL {
            let m = s.mass_kg();
            ndarray::Zip::from(&mut rho)
                .and(&self.density[s.idx()])
                .for_each(|r, &n| *r += n * m);
        }
        rho
    }

    /// Total number density sum_s n_s [m^-3].
    pub fn total_density(&self) -> Array3<f64> {
        let mut total = Array3::zeros(self.temperature.dim());
        for cube in &self.density {
            total += cube;
        }
        total
    }
}

/// Ionosphere state: per-species densities and velocities, shared ion
/// and electron temperatures, and the derived electron density.
#[derive(Debug, Clone)]
pub struct IonState {
    /// Number density per species, indexed by `IonSpecies::idx()` [m^-3].
    pub density: Vec<Array3<f64>>,
    /// Drift velocity per species, geographic east/north/up [m/s].
    pub velocity: Vec<VectorField>,
    /// Ion temperature [K].
    pub temperature: Array3<f64>,
    /// Electron temperature [K].
    pub electron_temperature: Array3<f64>,
    /// Electron density from quasi-neutrality [m^-3].
    pub electron_density: Array3<f64>,
}

impl IonState {
    pub fn new(dim: (usize, usize, usize)) -> Self {
        IonState {
            density: (0..IonSpecies::COUNT).map(|_| Array3::zeros(dim)).collect(),
            velocity: (0..IonSpecies::COUNT)
                .map(|_| VectorField::zeros(Frame::Geographic, dim))
                .collect(),
            temperature: Array3::zeros(dim),
            electron_temperature: Array3::zeros(dim),
            electron_density: Array3::zeros(dim),
        }
    }

    pub fn density(&self, s: IonSpecies) -> &Array3<f64> {
        &self.density[s.idx()]
    }

    pub fn density_mut(&mut self, s: IonSpecies) -> &mut Array3<f64> {
        &mut self.density[s.idx()]
    }

    /// Re-derive electron density from quasi-neutrality (all ions are
    /// singly charged). Call after every continuity update.
    pub fn update_electron_density(&mut self) {
        self.electron_density.fill(0.0);
        for cube in &self.density {
            self.electron_density += cube;
        }
    }
}

/// Recoverable-condition counters accumulated during one step (or one
/// whole run). None of these is an error; they are clamp events the
/// orchestrator reports for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepDiagnostics {
    /// EUV cells clamped to the nightside floor.
    pub nightside_clamps: usize,
    /// Chemistry evaluations that substituted the density floor.
    pub chemistry_floor_hits: usize,
    /// Post-update densities raised to the floor.
    pub density_floor_hits: usize,
    /// Magnetic-shell cells raised to the conductance floor.
    pub conductance_floor_hits: usize,
    /// Timestep rejections while producing this step.
    pub retries: usize,
}

impl StepDiagnostics {
    pub fn accumulate(&mut self, other: &StepDiagnostics) {
        self.nightside_clamps += other.nightside_clamps;
        self.chemistry_floor_hits += other.chemistry_floor_hits;
        self.density_floor_hits += other.density_floor_hits;
        self.conductance_floor_hits += other.conductance_floor_hits;
        self.retries += other.retries;
    }
}

/// Result of a completed `run()`.
#[derive(Debug, Clone)]
pub struct AdvanceSummary {
    pub steps: usize,
    pub retries: usize,
    pub simulated_s: f64,
    pub final_dt_s: f64,
    pub wall_time_ms: f64,
    pub totals: StepDiagnostics,
}
