// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{GeospaceError, GeospaceResult};
use crate::indices::{IonSpecies, NeutralSpecies};

/// Top-level run configuration.
///
/// Every section is optional in JSON; missing sections take the quiet-sun
/// defaults below. `from_file` validates after deserializing, so a loaded
/// config is always usable. Validation failures are fatal at init.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeospaceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub species: SpeciesConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub solar: SolarConfig,
    #[serde(default)]
    pub electro: ElectroConfig,
    #[serde(default)]
    pub initial: InitialConfig,
}

fn default_name() -> String {
    "geospace".to_string()
}

/// Geographic grid extents. Longitude covers the full circle; latitude
/// cells are centered so no cell sits exactly on a pole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub n_lons: usize,
    pub n_lats: usize,
    pub n_alts: usize,
    /// Base of the vertical domain (m above the surface).
    pub alt_min_m: f64,
    /// Top of the vertical domain (m above the surface).
    pub alt_max_m: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            n_lons: 24,
            n_lats: 12,
            n_alts: 20,
            alt_min_m: 100.0e3,
            alt_max_m: 500.0e3,
        }
    }
}

/// Species advected by the dynamics. All enum species are always stored
/// and chemically active; names absent from these lists are held as
/// non-advected backgrounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    pub neutrals: Vec<String>,
    pub ions: Vec<String>,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        SpeciesConfig {
            neutrals: NeutralSpecies::ALL.iter().map(|s| s.name().to_string()).collect(),
            ions: IonSpecies::ALL.iter().map(|s| s.name().to_string()).collect(),
        }
    }
}

/// Timestep control and run duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub dt_initial_s: f64,
    /// Floor below which a rejected step becomes a fatal error.
    pub dt_min_s: f64,
    pub dt_max_s: f64,
    pub duration_s: f64,
    /// Cadence at which the observer callback sees the state.
    pub output_cadence_s: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            dt_initial_s: 10.0,
            dt_min_s: 0.05,
            dt_max_s: 120.0,
            duration_s: 3600.0,
            output_cadence_s: 300.0,
        }
    }
}

/// Solar driver values. F10.7 proxies arrive pre-ingested (sfu);
/// the subsolar point starts at `subsolar_lon_deg` and rotates westward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub f107: f64,
    pub f107a: f64,
    pub declination_deg: f64,
    pub subsolar_lon_deg: f64,
    /// Fraction of absorbed EUV energy deposited as neutral heat.
    pub heating_efficiency: f64,
    /// Ionization/heating floor applied where the sun is below the horizon.
    pub nightside_euv_floor: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        SolarConfig {
            f107: 100.0,
            f107a: 100.0,
            declination_deg: 0.0,
            subsolar_lon_deg: 0.0,
            heating_efficiency: 0.4,
            nightside_euv_floor: 0.0,
        }
    }
}

/// Electrodynamics solve: magnetic solve grid, conductance
/// regularization, imposed convection, and elliptic solver limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectroConfig {
    pub n_mlats: usize,
    pub n_mlons: usize,
    /// Imposed cross-polar-cap potential (kV). Zero disables convection.
    pub cross_polar_cap_kv: f64,
    /// Height-integrated conductance floor (S).
    pub conductance_floor: f64,
    /// Equatorward Dirichlet boundary of the solve domain (deg mlat).
    pub low_lat_boundary_deg: f64,
    pub max_cycles: usize,
    pub tolerance: f64,
}

impl Default for ElectroConfig {
    fn default() -> Self {
        ElectroConfig {
            n_mlats: 44,
            n_mlons: 48,
            cross_polar_cap_kv: 40.0,
            conductance_floor: 0.1,
            low_lat_boundary_deg: 40.0,
            max_cycles: 40,
            tolerance: 1.0e-8,
        }
    }
}

/// Initial-state builder inputs: isothermal temperature and hydrostatic
/// base densities at `alt_min_m` (m^-3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    pub temperature_k: f64,
    /// Uniform seed density for every ion species (m^-3).
    pub ion_density_m3: f64,
    pub base_o_m3: f64,
    pub base_o2_m3: f64,
    pub base_n2_m3: f64,
    pub base_n_m3: f64,
    pub base_no_m3: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        InitialConfig {
            temperature_k: 800.0,
            ion_density_m3: 1.0e10,
            base_o_m3: 4.0e17,
            base_o2_m3: 1.8e18,
            base_n2_m3: 7.0e18,
            base_n_m3: 1.0e13,
            base_no_m3: 1.0e14,
        }
    }
}

impl InitialConfig {
    /// Base density of one neutral species at the bottom boundary (m^-3).
    pub fn base_density(&self, species: NeutralSpecies) -> f64 {
        match species {
            NeutralSpecies::O => self.base_o_m3,
            NeutralSpecies::O2 => self.base_o2_m3,
            NeutralSpecies::N2 => self.base_n2_m3,
            NeutralSpecies::N => self.base_n_m3,
            NeutralSpecies::NO => self.base_no_m3,
        }
    }
}

impl Default for GeospaceConfig {
    fn default() -> Self {
        GeospaceConfig {
            name: default_name(),
            grid: GridConfig::default(),
            species: SpeciesConfig::default(),
            time: TimeConfig::default(),
            solar: SolarConfig::default(),
            electro: ElectroConfig::default(),
            initial: InitialConfig::default(),
        }
    }
}

impl GeospaceConfig {
    /// Load and validate a JSON config.
    pub fn from_file(path: &str) -> GeospaceResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Advected neutral species resolved from the config list.
    pub fn advected_neutrals(&self) -> GeospaceResult<Vec<NeutralSpecies>> {
        self.species
            .neutrals
            .iter()
            .map(|name| {
                NeutralSpecies::from_name(name).ok_or_else(|| {
                    GeospaceError::ConfigError(format!("unknown neutral species '{name}'"))
                })
            })
            .collect()
    }

    /// Advected ion species resolved from the config list.
    pub fn advected_ions(&self) -> GeospaceResult<Vec<IonSpecies>> {
        self.species
            .ions
            .iter()
            .map(|name| {
                IonSpecies::from_name(name).ok_or_else(|| {
                    GeospaceError::ConfigError(format!("unknown ion species '{name}'"))
                })
            })
            .collect()
    }

    /// Structural and physical validity. Everything here is fatal at init.
    pub fn validate(&self) -> GeospaceResult<()> {
        let fail = |msg: String| Err(GeospaceError::ConfigError(msg));

        if self.grid.n_lons < 4 || self.grid.n_lats < 4 || self.grid.n_alts < 4 {
            return fail(format!(
                "grid too small: {}x{}x{} (need at least 4 cells per axis)",
                self.grid.n_lons, self.grid.n_lats, self.grid.n_alts
            ));
        }
        if !self.grid.alt_min_m.is_finite()
            || !self.grid.alt_max_m.is_finite()
            || self.grid.alt_min_m <= 0.0
            || self.grid.alt_max_m <= self.grid.alt_min_m
        {
            return fail(format!(
                "bad altitude range [{}, {}] m",
                self.grid.alt_min_m, self.grid.alt_max_m
            ));
        }

        let t = &self.time;
        for (label, v) in [
            ("dt_initial_s", t.dt_initial_s),
            ("dt_min_s", t.dt_min_s),
            ("dt_max_s", t.dt_max_s),
            ("duration_s", t.duration_s),
            ("output_cadence_s", t.output_cadence_s),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return fail(format!("time.{label} must be finite and positive, got {v}"));
            }
        }
        if !(t.dt_min_s <= t.dt_initial_s && t.dt_initial_s <= t.dt_max_s) {
            return fail(format!(
                "timestep bounds must satisfy dt_min <= dt_initial <= dt_max, got {} / {} / {}",
                t.dt_min_s, t.dt_initial_s, t.dt_max_s
            ));
        }

        let s = &self.solar;
        for (label, v) in [("f107", s.f107), ("f107a", s.f107a)] {
            if !v.is_finite() || !(20.0..=500.0).contains(&v) {
                return fail(format!("solar.{label} out of range [20, 500] sfu: {v}"));
            }
        }
        if !s.declination_deg.is_finite() || s.declination_deg.abs() > 90.0 {
            return fail(format!("solar.declination_deg out of range: {}", s.declination_deg));
        }
        if !s.heating_efficiency.is_finite()
            || s.heating_efficiency <= 0.0
            || s.heating_efficiency > 1.0
        {
            return fail(format!(
                "solar.heating_efficiency must lie in (0, 1]: {}",
                s.heating_efficiency
            ));
        }
        if !s.nightside_euv_floor.is_finite() || s.nightside_euv_floor < 0.0 {
            return fail(format!(
                "solar.nightside_euv_floor must be nonnegative: {}",
                s.nightside_euv_floor
            ));
        }

        let e = &self.electro;
        if e.n_mlats < 8 || e.n_mlons < 8 {
            return fail(format!(
                "magnetic solve grid too small: {}x{} (need at least 8x8)",
                e.n_mlats, e.n_mlons
            ));
        }
        if !e.cross_polar_cap_kv.is_finite() || e.cross_polar_cap_kv < 0.0 {
            return fail(format!(
                "electro.cross_polar_cap_kv must be nonnegative: {}",
                e.cross_polar_cap_kv
            ));
        }
        if !e.conductance_floor.is_finite() || e.conductance_floor <= 0.0 {
            return fail(format!(
                "electro.conductance_floor must be positive: {}",
                e.conductance_floor
            ));
        }
        if !(1.0..=85.0).contains(&e.low_lat_boundary_deg) {
            return fail(format!(
                "electro.low_lat_boundary_deg out of range [1, 85]: {}",
                e.low_lat_boundary_deg
            ));
        }
        if e.max_cycles == 0 || !e.tolerance.is_finite() || e.tolerance <= 0.0 {
            return fail(format!(
                "bad elliptic solver limits: max_cycles={}, tolerance={}",
                e.max_cycles, e.tolerance
            ));
        }

        let i = &self.initial;
        if !i.temperature_k.is_finite() || !(100.0..=5000.0).contains(&i.temperature_k) {
            return fail(format!(
                "initial.temperature_k out of range [100, 5000]: {}",
                i.temperature_k
            ));
        }
        if !i.ion_density_m3.is_finite() || i.ion_density_m3 < 0.0 {
            return fail(format!(
                "initial.ion_density_m3 must be nonnegative: {}",
                i.ion_density_m3
            ));
        }
        for species in NeutralSpecies::ALL {
            let n = i.base_density(species);
            if !n.is_finite() || n <= 0.0 {
                return fail(format!(
                    "initial base density for {} must be finite and positive: {n}",
                    species.name()
                ));
            }
        }

        self.advected_neutrals()?;
        self.advected_ions()?;
        Ok(())
    }
}
