use gyre::{
    Grid, LandPreset, ParticleSettings, ParticleSystem, PhysicsSettings, ScenarioConfig, SimError,
    SimParams, Simulation, create_land_mask,
};

#[test]
fn land_cells_stay_at_rest_for_every_preset() {
    let params = SimParams::default();
    for preset in LandPreset::ALL {
        let mut sim = Simulation::new(5.0, preset, PhysicsSettings::default()).unwrap();
        sim.run(200, &params);
        let grid = sim.grid();
        for i in 0..grid.len() {
            if grid.land_mask[i] != 0 {
                assert_eq!(grid.water_u[i], 0.0, "{preset}");
                assert_eq!(grid.water_v[i], 0.0, "{preset}");
                assert_eq!(grid.eta[i], 0.0, "{preset}");
                assert_eq!(grid.temperature[i], 0.0, "{preset}");
            }
        }
        grid.check_finite().unwrap();
    }
}

#[test]
fn one_step_at_south_polar_easterlies() {
    let mut sim = Simulation::new(5.0, LandPreset::WaterWorld, PhysicsSettings::default()).unwrap();
    let params = SimParams {
        rotation_ratio: 1.0,
        prograde: true,
        base_wind_speed: 10.0,
        temp_gradient_ratio: 1.0,
    };
    sim.step(&params);

    let grid = sim.grid();
    assert_eq!((grid.rows, grid.cols), (36, 72));
    let row = (0..grid.rows).find(|&r| grid.lat_deg(r) == -72.5).unwrap();
    let u = grid.water_u[grid.index(row, 0)];
    let wind = gyre::climate::wind_u(-72.5, &params);
    assert!(wind < 0.0);
    assert_eq!(u.signum(), wind.signum());
}

#[test]
fn retrograde_rotation_reverses_first_step() {
    let physics = PhysicsSettings::default();
    let mut pro = Simulation::new(5.0, LandPreset::WaterWorld, physics.clone()).unwrap();
    let mut retro = Simulation::new(5.0, LandPreset::WaterWorld, physics).unwrap();
    pro.step(&SimParams::default());
    retro.step(&SimParams {
        prograde: false,
        ..SimParams::default()
    });
    let i = pro.grid().index(30, 10);
    assert!(pro.grid().water_u[i] * retro.grid().water_u[i] < 0.0);
}

#[test]
fn tracers_never_end_a_tick_on_land() {
    let mut grid = Grid::new(5.0).unwrap();
    let wall = 40;
    let mut mask = vec![0u8; grid.len()];
    for r in 0..grid.rows {
        mask[grid.index(r, wall)] = 1;
    }
    grid.apply_land_mask(mask).unwrap();
    // Сильное течение прямо на стенку
    for i in 0..grid.len() {
        if grid.land_mask[i] == 0 {
            grid.water_u[i] = 2.0;
        }
    }

    let settings = ParticleSettings {
        count: 64,
        ..ParticleSettings::default()
    };
    let mut tracers = ParticleSystem::new(&grid, &settings).unwrap();
    for i in 0..tracers.len() {
        tracers.x[i] = wall as f32 - 0.5;
        // Тропики: за тик трассер проходит меньше клетки и не перескакивает стенку
        tracers.y[i] = 12.5 + (i % 12) as f32;
        tracers.age[i] = 0.0;
        tracers.max_age[i] = 1000.0;
    }

    for tick in 0..12 {
        tracers.update(&grid, 20, 10_800.0);
        for (x, y) in tracers.positions() {
            assert!((0.0..grid.rows as f32).contains(&y));
            assert!((0.0..grid.cols as f32).contains(&x));
            let (r, c) = (y.floor() as usize, x.floor() as usize);
            assert!(!grid.is_land(r, c), "tick {tick}: tracer at ({x}, {y}) on land");
        }
        if tick == 0 {
            // Все упёрлись в стенку и переродились
            assert!(tracers.age.iter().all(|&a| a == 0.0));
        }
    }
}

#[test]
fn equatorial_continent_mask_on_coarse_grid() {
    let grid = Grid::new(10.0).unwrap();
    let mask = create_land_mask(LandPreset::EquatorialContinent, &grid).unwrap();
    for r in 0..grid.rows {
        for c in 0..grid.cols {
            if mask[grid.index(r, c)] != 0 {
                assert!(grid.lat_deg(r).abs() <= 37.5);
                assert!(grid.lon_deg(c).abs() < 30.0);
            }
        }
    }
}

#[test]
fn scenario_file_drives_a_run() {
    let dir = std::env::temp_dir().join(format!("gyre-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scenario.toml");
    std::fs::write(
        &path,
        r#"
resolution_deg = 10.0
preset = "north-south-continent"

[params]
rotation_ratio = 0.5

[physics]
dt = 21600.0

[particles]
count = 100
"#,
    )
    .unwrap();

    let config = ScenarioConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.preset, LandPreset::NorthSouthContinent);
    let mut sim =
        Simulation::new(config.resolution_deg, config.preset, config.physics.clone()).unwrap();
    let stats = sim.run(10, &config.params);
    assert_eq!(stats.step, 10);
    assert!((sim.elapsed_seconds() - 216_000.0).abs() < 1e-9);

    let tracers = ParticleSystem::new(sim.grid(), &config.particles).unwrap();
    assert_eq!(tracers.len(), 100);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_scenario_file_is_an_io_error() {
    let err = ScenarioConfig::from_toml_file("/nonexistent/gyre.toml").unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
}

#[test]
fn unknown_preset_in_file_is_rejected() {
    let err = ScenarioConfig::from_toml_str("preset = \"pangaea\"").unwrap_err();
    assert!(matches!(err, SimError::Toml(_)));
}
