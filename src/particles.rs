// src/particles.rs
//! Трассеры для визуализации течений
//!
//! Трассеры не имеют массы и не влияют на сетку. Координаты дробные, в клетках:
//! `x` — столбец (замыкается по модулю `cols`), `y` — строка от южного полюса.
//! Центр клетки `(r, c)` находится в точке `(c + 0.5, r + 0.5)`.

use crate::climate::EARTH_RADIUS_M;
use crate::config::ParticleSettings;
use crate::error::SimResult;
use crate::grid::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Нижняя граница cos φ при переводе метров в клетки у полюса
const MIN_COS_LAT: f64 = 1.0e-3;

/// Скорость течения в дробной точке сетки (билинейно по центрам клеток)
///
/// Столбцы замыкаются, строки прижимаются к `[0, rows - 1]`.
#[must_use]
pub fn sample_velocity(x: f64, y: f64, grid: &Grid) -> (f64, f64) {
    let gx = x - 0.5;
    let gy = y - 0.5;
    let c0 = gx.floor();
    let r0 = gy.floor();
    let fx = gx - c0;
    let fy = gy - r0;

    let max_row = grid.rows as i64 - 1;
    let row_lo = (r0 as i64).clamp(0, max_row) as usize;
    let row_hi = (r0 as i64 + 1).clamp(0, max_row) as usize;
    let col_lo = grid.wrap_col(c0 as i64);
    let col_hi = grid.wrap_col(c0 as i64 + 1);

    let bilinear = |field: &[f64]| {
        let v00 = field[grid.index(row_lo, col_lo)];
        let v10 = field[grid.index(row_lo, col_hi)];
        let v01 = field[grid.index(row_hi, col_lo)];
        let v11 = field[grid.index(row_hi, col_hi)];
        let south = v00 + (v10 - v00) * fx;
        let north = v01 + (v11 - v01) * fx;
        south + (north - south) * fy
    };

    (bilinear(&grid.water_u), bilinear(&grid.water_v))
}

/// Рой трассеров в виде параллельных массивов
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    /// Возраст в тиках визуализации
    pub age: Vec<f32>,
    pub max_age: Vec<f32>,
    settings: ParticleSettings,
    rng: ChaCha8Rng,
}

impl ParticleSystem {
    /// Размещает `settings.count` трассеров в воде
    ///
    /// Начальный возраст случайный на всём отрезке жизни, чтобы трассеры не
    /// перерождались одновременно. Настройки проверяются до первого розыгрыша:
    /// пустой диапазон возраста недопустим.
    pub fn new(grid: &Grid, settings: &ParticleSettings) -> SimResult<Self> {
        settings.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let n = settings.count;
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut age = Vec::with_capacity(n);
        let mut max_age = Vec::with_capacity(n);

        let mut fallbacks = 0;
        for _ in 0..n {
            let born = spawn(&mut rng, grid, settings);
            fallbacks += usize::from(!born.in_water);
            x.push(born.x);
            y.push(born.y);
            max_age.push(born.max_age);
            age.push(rng.gen_range(0.0..born.max_age));
        }
        if fallbacks > 0 {
            log::warn!(
                "{fallbacks} трассеров размещено на суше: не найдено воды за отведённые попытки"
            );
        }

        Ok(Self {
            x,
            y,
            age,
            max_age,
            settings: settings.clone(),
            rng,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Один тик визуализации
    ///
    /// `steps_this_frame` — сколько шагов физики прошло за кадр, `step_dt` — длина
    /// шага в секундах. Без шагов (пауза) трассеры и их возраст замирают.
    pub fn update(&mut self, grid: &Grid, steps_this_frame: u32, step_dt: f64) {
        if steps_this_frame == 0 {
            return;
        }
        let dt = f64::from(steps_this_frame) * step_dt * self.settings.time_scale;
        let meters_per_row = EARTH_RADIUS_M * grid.dlat_rad();
        let cols = grid.cols as f64;
        let cols_f32 = grid.cols as f32;
        let rows_f32 = grid.rows as f32;

        let mut fallbacks = 0;
        for i in 0..self.len() {
            let (x, y) = (f64::from(self.x[i]), f64::from(self.y[i]));
            let (u, v) = sample_velocity(x, y, grid);

            let lat = -90.0 + y * grid.resolution_deg;
            let cos_lat = lat.to_radians().cos().max(MIN_COS_LAT);
            let meters_per_col = EARTH_RADIUS_M * cos_lat * grid.dlon_rad();

            // Округление до f32 может дать ровно `cols`
            let mut new_x = (x + u * dt / meters_per_col).rem_euclid(cols) as f32;
            if new_x >= cols_f32 {
                new_x = 0.0;
            }
            let new_y = (y + v * dt / meters_per_row) as f32;
            self.age[i] += 1.0;

            let alive = self.age[i] < self.max_age[i]
                && (0.0..rows_f32).contains(&new_y)
                && !is_land_under(grid, f64::from(new_x), f64::from(new_y))
                && speed_at(grid, f64::from(new_x), f64::from(new_y)) >= self.settings.min_speed;

            if alive {
                self.x[i] = new_x;
                self.y[i] = new_y;
            } else {
                let born = spawn(&mut self.rng, grid, &self.settings);
                fallbacks += usize::from(!born.in_water);
                self.x[i] = born.x;
                self.y[i] = born.y;
                self.age[i] = 0.0;
                self.max_age[i] = born.max_age;
            }
        }

        if fallbacks > 0 {
            log::warn!(
                "{fallbacks} трассеров перерождено на суше: не найдено воды за отведённые попытки"
            );
        }
    }
}

struct Spawn {
    x: f32,
    y: f32,
    max_age: f32,
    in_water: bool,
}

/// Случайная водная позиция; если за `spawn_attempts` попыток воды нет, остаётся последняя
fn spawn(rng: &mut ChaCha8Rng, grid: &Grid, settings: &ParticleSettings) -> Spawn {
    let max_age = rng.gen_range(settings.min_age..settings.max_age);
    let mut x = 0.0;
    let mut y = 0.0;
    for _ in 0..settings.spawn_attempts {
        x = rng.gen_range(0.0..grid.cols as f32);
        y = rng.gen_range(0.0..grid.rows as f32);
        if !is_land_under(grid, f64::from(x), f64::from(y)) {
            return Spawn {
                x,
                y,
                max_age,
                in_water: true,
            };
        }
    }
    Spawn {
        x,
        y,
        max_age,
        in_water: false,
    }
}

/// Суша ли в клетке, содержащей точку; `y` должен лежать в `[0, rows)`
fn is_land_under(grid: &Grid, x: f64, y: f64) -> bool {
    let row = (y.floor() as usize).min(grid.rows - 1);
    let col = grid.wrap_col(x.floor() as i64);
    grid.is_land(row, col)
}

fn speed_at(grid: &Grid, x: f64, y: f64) -> f64 {
    let (u, v) = sample_velocity(x, y, grid);
    u.hypot(v)
}
