// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Advance Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end scenarios for the coupled advance loop: conservation,
//! positivity, dayside heating, frame handling, and config-driven runs.

use std::path::PathBuf;

use geospace_core::advance::{AdvanceKernel, StageToggles};
use geospace_core::bfield::Dipole;
use geospace_types::config::{ElectroConfig, GeospaceConfig, GridConfig, TimeConfig};
use geospace_types::indices::{IonSpecies, NeutralSpecies};

fn scenario_config() -> GeospaceConfig {
    let mut config = GeospaceConfig::default();
    config.grid = GridConfig {
        n_lons: 12,
        n_lats: 8,
        n_alts: 8,
        alt_min_m: 100.0e3,
        alt_max_m: 400.0e3,
    };
    config.electro = ElectroConfig {
        n_mlats: 16,
        n_mlons: 16,
        ..ElectroConfig::default()
    };
    config.time = TimeConfig {
        dt_initial_s: 5.0,
        dt_min_s: 0.05,
        dt_max_s: 30.0,
        duration_s: 300.0,
        output_cadence_s: 100.0,
    };
    config
}

fn config_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
        .to_string_lossy()
        .to_string()
}

#[test]
fn unforced_run_conserves_every_species() {
    let mut kernel = AdvanceKernel::new(scenario_config()).unwrap();
    kernel.set_toggles(StageToggles {
        euv: false,
        chemistry: false,
        electrodynamics: false,
    });
    // Stir so the transport terms actually carry flux.
    kernel.neutrals_mut().wind.east.fill(150.0);

    let metrics = kernel.grid().metrics.clone();
    let before: Vec<f64> = NeutralSpecies::ALL
        .iter()
        .map(|&s| metrics.total_content(kernel.neutrals().density(s)))
        .collect();

    for _ in 0..10 {
        kernel.step().unwrap();
    }

    for (s, &b) in NeutralSpecies::ALL.iter().zip(&before) {
        let after = metrics.total_content(kernel.neutrals().density(*s));
        assert!(
            (after - b).abs() < 1e-10 * b,
            "{} total drifted over 10 unforced steps: {b:e} -> {after:e}",
            s.name()
        );
    }
}

#[test]
fn forced_run_keeps_densities_positive_and_finite() {
    let mut config = scenario_config();
    config.solar.f107 = 180.0;
    config.solar.f107a = 170.0;
    config.electro.cross_polar_cap_kv = 60.0;
    let mut kernel = AdvanceKernel::new(config).unwrap();

    let summary = kernel.run(|_, _, _| {}).unwrap();
    assert!(summary.steps > 0);

    for s in NeutralSpecies::ALL {
        for &n in kernel.neutrals().density(s).iter() {
            assert!(n > 0.0 && n.is_finite(), "{} density {n}", s.name());
        }
    }
    for s in IonSpecies::ALL {
        for &n in kernel.ions().density(s).iter() {
            assert!(n > 0.0 && n.is_finite(), "{} density {n}", s.name());
        }
    }
    for &t in kernel.neutrals().temperature.iter() {
        assert!(t >= 150.0 && t.is_finite());
    }
    assert!(kernel.neutrals().wind.is_finite());
    assert!(kernel.ions().electron_density.iter().all(|v| *v > 0.0));
}

#[test]
fn dayside_heats_and_ionizes_more_than_nightside() {
    let mut kernel = AdvanceKernel::new(scenario_config()).unwrap();
    let summary = kernel.run(|_, _, _| {}).unwrap();
    assert!(summary.totals.nightside_clamps > 0);

    // Subsolar longitude barely moves over 300 s; column i=0 faces the
    // sun at the default config, i=6 faces away.
    let grid = kernel.grid();
    let k_top = grid.nalt - 1;
    let j_eq = grid.nlat / 2;
    let t_day = kernel.neutrals().temperature[[0, j_eq, k_top]];
    let t_night = kernel.neutrals().temperature[[grid.nlon / 2, j_eq, k_top]];
    assert!(
        t_day > t_night,
        "subsolar column should be warmer: day {t_day} K vs night {t_night} K"
    );

    let ne_day = kernel.ions().electron_density[[0, j_eq, k_top]];
    let ne_night = kernel.ions().electron_density[[grid.nlon / 2, j_eq, k_top]];
    assert!(
        ne_day > ne_night,
        "subsolar column should be denser: day {ne_day} vs night {ne_night}"
    );
}

#[test]
fn polar_convection_moves_ions() {
    let mut config = scenario_config();
    config.electro.cross_polar_cap_kv = 60.0;
    let mut kernel = AdvanceKernel::new(config).unwrap();
    kernel.step().unwrap();

    let grid = kernel.grid();
    let v = &kernel.ions().velocity[IonSpecies::OPlus.idx()];
    let mut polar_max = 0.0f64;
    for i in 0..grid.nlon {
        let s = v.at(i, grid.nlat - 1, 0);
        polar_max = polar_max.max((s[0] * s[0] + s[1] * s[1]).sqrt());
    }
    assert!(
        polar_max > 10.0,
        "polar cap ion drift too weak: {polar_max} m/s"
    );
}

#[test]
fn magnetic_coordinates_round_trip_through_the_dipole() {
    // The frames the kernel reconciles between are consistent: a vector
    // carried geo -> mag -> geo at any grid point returns unchanged.
    let kernel = AdvanceKernel::new(scenario_config()).unwrap();
    let dipole = kernel.dipole();
    let grid = kernel.grid();
    use geospace_math::transform::{vector_env_to_xyz, vector_xyz_to_env};

    for (i, j) in [(0, 0), (3, 4), (11, 7)] {
        let (lon, lat) = (grid.lons[i], grid.lats[j]);
        let mlon = grid.mlon[[i, j]];
        let mlat = grid.mlat[[i, j]];
        let v = [120.0, -40.0, 3.0];

        let mag_env =
            vector_xyz_to_env(dipole.to_mag_xyz(vector_env_to_xyz(v, lon, lat)), mlon, mlat);
        let back = vector_xyz_to_env(
            dipole.to_geo_xyz(vector_env_to_xyz(mag_env, mlon, mlat)),
            lon,
            lat,
        );
        for c in 0..3 {
            assert!(
                (back[c] - v[c]).abs() < 1e-9,
                "component {c} at ({i},{j}): {} vs {}",
                back[c],
                v[c]
            );
        }
    }
}

#[test]
fn smoke_config_runs_to_completion() {
    let mut kernel = AdvanceKernel::from_file(&config_path("configs/smoke_small.json")).unwrap();
    let mut outputs = 0usize;
    let summary = kernel
        .run(|t, n, i| {
            outputs += 1;
            assert!(t > 0.0);
            assert!(n.temperature.iter().all(|v| v.is_finite()));
            assert!(i.electron_density.iter().all(|v| v.is_finite()));
        })
        .unwrap();
    assert!(summary.steps > 0);
    assert!(outputs > 0);
    assert!(summary.simulated_s > 0.0);
}

#[test]
fn quiet_equinox_config_builds() {
    let kernel = AdvanceKernel::from_file(&config_path("configs/quiet_equinox.json")).unwrap();
    assert_eq!(kernel.config().name, "quiet-equinox");
    assert!(kernel.grid().nalt >= 4);
    // Aligned axes sanity: the dipole pole is where it should be.
    let d = Dipole::default();
    let (_, mlat) = d.mag_coords(289.1f64.to_radians(), (90.0f64 - 11.0).to_radians());
    assert!((mlat - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
}
