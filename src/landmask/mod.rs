// src/landmask/mod.rs
//! Генерация маски суши по именованным пресетам
//!
//! Каждый пресет строит маску 0/1 (прямоугольники по широте и долготе или растр
//! береговой линии), после чего маска проходит [`repair_mask`]: узкие заливы шириной
//! в одну клетку дают вырожденные шаблоны градиента и дивергенции и раскачивают схему.

pub mod earth;
pub mod repair;

pub use crate::config::LandPreset;
pub use earth::EarthBitmap;
pub use repair::repair_mask;

use crate::error::SimResult;
use crate::grid::Grid;

/// Строит маску суши для сетки и прогоняет её через ремонт
pub fn create_land_mask(preset: LandPreset, grid: &Grid) -> SimResult<Vec<u8>> {
    let mut mask = vec![0u8; grid.len()];

    match preset {
        LandPreset::WaterWorld => {}
        LandPreset::EquatorialContinent => {
            fill_box(&mut mask, grid, 35.0, 30.0);
        }
        LandPreset::NorthSouthContinent => {
            // Проливы у обоих полюсов оставляют циркумполярный океан
            fill_box(&mut mask, grid, 80.0, 15.0);
        }
        LandPreset::EarthLike => {
            let bitmap = EarthBitmap::bundled()?;
            for r in 0..grid.rows {
                for c in 0..grid.cols {
                    if bitmap.is_land_at(grid.lat_deg(r), grid.lon_deg(c)) {
                        mask[grid.index(r, c)] = 1;
                    }
                }
            }
        }
    }

    let sweeps = repair_mask(&mut mask, grid.rows, grid.cols);
    let land = mask.iter().filter(|&&m| m != 0).count();
    log::debug!(
        "Маска `{preset}`: {land} клеток суши из {}, ремонт за {sweeps} проходов",
        mask.len()
    );

    Ok(mask)
}

/// Суша там, где |широта| < `max_lat` и |долгота| < `max_lon`
fn fill_box(mask: &mut [u8], grid: &Grid, max_lat: f64, max_lon: f64) {
    for r in 0..grid.rows {
        let lat = grid.lat_deg(r);
        if lat.abs() >= max_lat {
            continue;
        }
        for c in 0..grid.cols {
            if grid.lon_deg(c).abs() < max_lon {
                mask[grid.index(r, c)] = 1;
            }
        }
    }
}
