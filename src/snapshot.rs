// src/snapshot.rs
//! Снимки полей в PNG и итог прогона в JSON

use crate::config::LandPreset;
use crate::error::{SimError, SimResult};
use crate::grid::Grid;
use crate::stepper::{Simulation, StepStats};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Какое поле рисовать
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Eta,
    Temperature,
    Speed,
    Land,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Eta,
        FieldKind::Temperature,
        FieldKind::Speed,
        FieldKind::Land,
    ];

    /// Имя файла снимка по умолчанию
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            FieldKind::Eta => "eta.png",
            FieldKind::Temperature => "temperature.png",
            FieldKind::Speed => "speed.png",
            FieldKind::Land => "land.png",
        }
    }

    fn value(self, grid: &Grid, i: usize) -> f64 {
        match self {
            FieldKind::Eta => grid.eta[i],
            FieldKind::Temperature => grid.temperature[i],
            FieldKind::Speed => grid.water_u[i].hypot(grid.water_v[i]),
            FieldKind::Land => f64::from(grid.land_mask[i]),
        }
    }
}

/// Поле в оттенках серого, по пикселю на клетку, север сверху
///
/// Значения нормируются по водным клеткам в 0..255; суша чёрная
/// (кроме `Land`, где суша белая). Постоянное поле рисуется серым.
#[must_use]
pub fn field_to_grayscale(grid: &Grid, kind: FieldKind) -> Vec<u8> {
    let range = if kind == FieldKind::Land {
        Some((0.0, 1.0))
    } else {
        let values: Vec<f64> = (0..grid.len()).map(|i| kind.value(grid, i)).collect();
        grid.water_range(&values)
    };
    let (lo, hi) = range.unwrap_or((0.0, 0.0));
    let span = hi - lo;

    let pixel = |j: usize| -> u8 {
        // Строка изображения 0 — северная строка сетки
        let r = grid.rows - 1 - j / grid.cols;
        let i = grid.index(r, j % grid.cols);
        if kind != FieldKind::Land && grid.land_mask[i] != 0 {
            return 0;
        }
        if span <= f64::EPSILON {
            return 128;
        }
        (((kind.value(grid, i) - lo) / span).clamp(0.0, 1.0) * 255.0).round() as u8
    };

    #[cfg(feature = "parallel")]
    let data = (0..grid.len()).into_par_iter().map(pixel).collect();
    #[cfg(not(feature = "parallel"))]
    let data = (0..grid.len()).map(pixel).collect();

    data
}

/// Сохраняет поле в PNG, увеличив каждую клетку до `scale`×`scale` пикселей
pub fn save_field_png(
    grid: &Grid,
    kind: FieldKind,
    scale: u32,
    path: impl AsRef<Path>,
) -> SimResult<()> {
    let width = grid.cols as u32;
    let height = grid.rows as u32;
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, field_to_grayscale(grid, kind))
            .ok_or(SimError::ImageBuffer { width, height })?;

    let scale = scale.max(1);
    let img = if scale > 1 {
        imageops::resize(&img, width * scale, height * scale, FilterType::Nearest)
    } else {
        img
    };
    img.save(path.as_ref())?;
    Ok(())
}

/// Итог прогона для `summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub preset: LandPreset,
    pub resolution_deg: f64,
    pub rows: usize,
    pub cols: usize,
    pub steps: u64,
    pub simulated_days: f64,
    /// max(|Δu|, |Δv|, |Δη|) последнего шага
    pub last_max_change: f64,
    pub converged: bool,
    pub eta_min: f64,
    pub eta_max: f64,
    pub max_speed: f64,
    pub mean_water_temperature: f64,
    pub land_fraction: f64,
}

impl RunSummary {
    #[must_use]
    pub fn collect(
        sim: &Simulation,
        preset: LandPreset,
        last: &StepStats,
        tolerance: f64,
    ) -> Self {
        let grid = sim.grid();
        let (eta_min, eta_max) = grid.eta_range().unwrap_or((0.0, 0.0));
        let max_speed = grid
            .water_u
            .iter()
            .zip(&grid.water_v)
            .map(|(u, v)| u.hypot(*v))
            .fold(0.0, f64::max);
        let water = grid.water_cells();
        let mean_water_temperature = if water == 0 {
            0.0
        } else {
            grid.temperature
                .iter()
                .zip(&grid.land_mask)
                .filter(|&(_, &m)| m == 0)
                .map(|(t, _)| t)
                .sum::<f64>()
                / water as f64
        };

        Self {
            preset,
            resolution_deg: grid.resolution_deg,
            rows: grid.rows,
            cols: grid.cols,
            steps: sim.steps_taken(),
            simulated_days: sim.elapsed_seconds() / 86_400.0,
            last_max_change: last.max_change(),
            converged: sim.steps_taken() > 0 && last.is_steady(tolerance),
            eta_min,
            eta_max,
            max_speed,
            mean_water_temperature,
            land_fraction: grid.land_fraction(),
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SimError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhysicsSettings, SimParams};

    #[test]
    fn north_is_drawn_on_top() {
        let mut grid = Grid::new(10.0).unwrap();
        let north = grid.index(grid.rows - 1, 0);
        grid.eta[north] = 1.0;
        let pixels = field_to_grayscale(&grid, FieldKind::Eta);
        assert_eq!(pixels.len(), grid.len());
        assert_eq!(pixels[0], 255);
        assert_eq!(pixels[1], 0);
        assert_eq!(pixels[grid.len() - 1], 0);
    }

    #[test]
    fn land_is_black_except_on_land_map() {
        let mut grid = Grid::new(10.0).unwrap();
        grid.temperature.fill(10.0);
        let i = grid.index(grid.rows - 1, 3);
        grid.temperature[i] = 0.0;
        grid.land_mask[i] = 1;
        let warm = grid.index(grid.rows - 1, 4);
        grid.temperature[warm] = 20.0;

        let temperature = field_to_grayscale(&grid, FieldKind::Temperature);
        assert_eq!(temperature[3], 0);
        assert_eq!(temperature[4], 255);
        assert_eq!(temperature[5], 0);

        let land = field_to_grayscale(&grid, FieldKind::Land);
        assert_eq!(land[3], 255);
        assert_eq!(land[4], 0);
    }

    #[test]
    fn flat_field_is_grey() {
        let grid = Grid::new(10.0).unwrap();
        let pixels = field_to_grayscale(&grid, FieldKind::Speed);
        assert!(pixels.iter().all(|&p| p == 128));
    }

    #[test]
    fn summary_reports_the_run() {
        let mut sim =
            Simulation::new(10.0, LandPreset::EquatorialContinent, PhysicsSettings::default())
                .unwrap();
        let last = sim.run(4, &SimParams::default());
        let summary = RunSummary::collect(&sim, LandPreset::EquatorialContinent, &last, 1e-6);

        assert_eq!(summary.steps, 4);
        assert_eq!((summary.rows, summary.cols), (18, 36));
        assert!((summary.simulated_days - 4.0 * 10_800.0 / 86_400.0).abs() < 1e-12);
        assert!(!summary.converged);
        assert!(summary.land_fraction > 0.0);
        assert!(summary.max_speed > 0.0);
        assert!(summary.mean_water_temperature > 0.0);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"preset\":\"equatorial-continent\""));
    }
}
