// src/stepper.rs
//! Шаг симуляции океана
//!
//! Один шаг всегда выполняется целиком и в одном порядке:
//! 1) градиент уровня по текущему η
//! 2) скорость: ветер и градиент явно, Кориолис и трение — полунеявно (точное обращение 2×2)
//! 3) скорость на суше = 0, ограничение каждой компоненты
//! 4) η -= div·dt, η на суше = 0, ограничение
//! 5) перенос температуры
//! 6) релаксация температуры к равновесной
//! 7) температура на суше = 0

use crate::advection::advect;
use crate::climate::{coriolis_parameter, equilibrium_temperature, wind_u};
use crate::config::{LandPreset, PhysicsSettings, SimParams};
use crate::error::SimResult;
use crate::grid::Grid;
use crate::landmask::create_land_mask;
use crate::operators::{divergence, pressure_gradient};

/// Итог одного шага
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepStats {
    /// Номер шага после выполнения (первый шаг — 1)
    pub step: u64,
    /// Наибольшее изменение компоненты скорости за шаг, м/с
    pub max_velocity_change: f64,
    /// Наибольшее изменение уровня за шаг, м
    pub max_eta_change: f64,
}

impl StepStats {
    /// max(|Δu|, |Δv|, |Δη|) по всей сетке
    #[must_use]
    pub fn max_change(&self) -> f64 {
        self.max_velocity_change.max(self.max_eta_change)
    }

    /// Достигнуто ли установившееся состояние
    #[must_use]
    pub fn is_steady(&self, tolerance: f64) -> bool {
        self.max_change() < tolerance
    }
}

/// Прогон: сетка плюс численные константы
///
/// Атмосферные параметры не хранятся и передаются в каждый шаг.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    physics: PhysicsSettings,
    steps: u64,
    elapsed: f64,
}

impl Simulation {
    /// Создаёт сетку, накладывает маску пресета; все поля нулевые
    pub fn new(
        resolution_deg: f64,
        preset: LandPreset,
        physics: PhysicsSettings,
    ) -> SimResult<Self> {
        physics.validate()?;
        let mut grid = Grid::new(resolution_deg)?;
        let mask = create_land_mask(preset, &grid)?;
        grid.apply_land_mask(mask)?;
        log::debug!(
            "Сетка {}×{} ({resolution_deg}°), пресет `{preset}`, суша {:.1}%",
            grid.rows,
            grid.cols,
            grid.land_fraction() * 100.0
        );
        Ok(Self::from_grid(grid, physics))
    }

    /// Оборачивает заранее подготовленную сетку
    #[must_use]
    pub fn from_grid(grid: Grid, physics: PhysicsSettings) -> Self {
        Self {
            grid,
            physics,
            steps: 0,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn physics(&self) -> &PhysicsSettings {
        &self.physics
    }

    #[must_use]
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Модельное время с начала прогона, с
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Выполняет один шаг
    pub fn step(&mut self, params: &SimParams) -> StepStats {
        let dt = self.physics.dt;
        let physics = &self.physics;
        let grid = &mut self.grid;
        let (rows, cols) = (grid.rows, grid.cols);

        // 1) градиент по η на начало шага
        let gradient = pressure_gradient(grid);

        // 2–3) скорость
        let mut max_velocity_change = 0.0_f64;
        for r in 0..rows {
            let lat = grid.lat_deg(r);
            let f = coriolis_parameter(lat, params.rotation_ratio);
            let wind_accel = physics.wind_coupling * wind_u(lat, params);
            let coastal_band = lat.abs() > physics.coastal_drag_latitude;

            for c in 0..cols {
                let i = r * cols + c;
                let (u_old, v_old) = (grid.water_u[i], grid.water_v[i]);

                let (u, v) = if grid.land_mask[i] != 0 {
                    (0.0, 0.0)
                } else {
                    let drag = if coastal_band && grid.touches_land(r, c) {
                        physics.drag * physics.coastal_drag_multiplier
                    } else {
                        physics.drag
                    };

                    let u_star = u_old + (wind_accel - physics.gravity * gradient.ddx[i]) * dt;
                    let v_star = v_old - physics.gravity * gradient.ddy[i] * dt;

                    // [[a, -b], [b, a]]·(u, v) = (u*, v*)
                    let a = 1.0 + drag * dt;
                    let b = f * dt;
                    let det = a * a + b * b;
                    let u = (a * u_star + b * v_star) / det;
                    let v = (a * v_star - b * u_star) / det;

                    (
                        u.clamp(-physics.max_velocity, physics.max_velocity),
                        v.clamp(-physics.max_velocity, physics.max_velocity),
                    )
                };

                max_velocity_change = max_velocity_change
                    .max((u - u_old).abs())
                    .max((v - v_old).abs());
                grid.water_u[i] = u;
                grid.water_v[i] = v;
            }
        }

        // 4) уровень по новой скорости
        let div = divergence(grid);
        let mut max_eta_change = 0.0_f64;
        for (i, (eta, d)) in grid.eta.iter_mut().zip(&div).enumerate() {
            let new_eta = if grid.land_mask[i] != 0 {
                0.0
            } else {
                (*eta - d * dt).clamp(-physics.max_eta, physics.max_eta)
            };
            max_eta_change = max_eta_change.max((new_eta - *eta).abs());
            *eta = new_eta;
        }

        // 5) перенос
        let flux = advect(grid);
        for (t, f) in grid.temperature.iter_mut().zip(&flux) {
            *t -= f * dt;
        }

        // 6–7) релаксация и суша
        let relax = dt / physics.relaxation_timescale;
        for r in 0..rows {
            let t_eq = equilibrium_temperature(grid.lat_deg(r), params.temp_gradient_ratio);
            for c in 0..cols {
                let i = r * cols + c;
                if grid.land_mask[i] != 0 {
                    grid.temperature[i] = 0.0;
                } else {
                    grid.temperature[i] += (t_eq - grid.temperature[i]) * relax;
                }
            }
        }

        self.steps += 1;
        self.elapsed += dt;

        let stats = StepStats {
            step: self.steps,
            max_velocity_change,
            max_eta_change,
        };
        log::trace!(
            "Шаг {}: Δскорость {:.3e}, Δη {:.3e}",
            stats.step,
            stats.max_velocity_change,
            stats.max_eta_change
        );
        stats
    }

    /// Выполняет `steps` шагов и возвращает итог последнего
    pub fn run(&mut self, steps: u64, params: &SimParams) -> StepStats {
        let mut stats = StepStats {
            step: self.steps,
            ..StepStats::default()
        };
        for _ in 0..steps {
            stats = self.step(params);
        }
        stats
    }
}
