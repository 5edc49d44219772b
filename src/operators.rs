// src/operators.rs
//! Пространственные операторы на сферической сетке: градиент уровня и дивергенция скорости
//!
//! Все величины живут в центрах клеток. Метрика: `dx = R·cos(φ)·Δλ`, `dy = R·Δφ`.

use crate::climate::EARTH_RADIUS_M;
use crate::grid::Grid;

/// Градиент уровня моря по клеткам, м/м
#[derive(Debug, Clone)]
pub struct Gradient {
    /// ∂η/∂x (на восток)
    pub ddx: Vec<f64>,
    /// ∂η/∂y (на север)
    pub ddy: Vec<f64>,
}

/// Градиент уровня моря
///
/// По долготе — центральная разность с замыканием; соседняя клетка суши считается
/// имеющей тот же уровень, что и сама клетка (нулевой градиент в сушу).
/// По широте — центральная разность внутри, односторонняя на полюсных строках и
/// в сторону воды, если суша ровно с одной стороны; ноль, если суша с обеих.
/// На суше градиент нулевой.
#[must_use]
pub fn pressure_gradient(grid: &Grid) -> Gradient {
    let (rows, cols) = (grid.rows, grid.cols);
    let mut ddx = vec![0.0; grid.len()];
    let mut ddy = vec![0.0; grid.len()];
    let eta = &grid.eta;
    let dy = EARTH_RADIUS_M * grid.dlat_rad();

    for r in 0..rows {
        let dx = EARTH_RADIUS_M * grid.lat_deg(r).to_radians().cos() * grid.dlon_rad();

        for c in 0..cols {
            let i = grid.index(r, c);
            if grid.land_mask[i] != 0 {
                continue;
            }
            let here = eta[i];

            let east = grid.index(r, grid.wrap_col(c as i64 + 1));
            let west = grid.index(r, grid.wrap_col(c as i64 - 1));
            let eta_e = if grid.land_mask[east] != 0 { here } else { eta[east] };
            let eta_w = if grid.land_mask[west] != 0 { here } else { eta[west] };
            ddx[i] = (eta_e - eta_w) / (2.0 * dx);

            // За полюсом соседа нет, как и за сушей
            let north_water = r + 1 < rows && grid.land_mask[i + cols] == 0;
            let south_water = r > 0 && grid.land_mask[i - cols] == 0;
            ddy[i] = match (north_water, south_water) {
                (true, true) => (eta[i + cols] - eta[i - cols]) / (2.0 * dy),
                (true, false) => (eta[i + cols] - here) / dy,
                (false, true) => (here - eta[i - cols]) / dy,
                (false, false) => 0.0,
            };
        }
    }

    Gradient { ddx, ddy }
}

/// Дивергенция скорости `(1/(R·cosφ))·[∂u/∂λ + ∂(v·cosφ)/∂φ]`, 1/с
///
/// Центральная разность по соседям. Вместо соседа-суши и за полюсом подставляется
/// отражённое значение своей клетки: `-u` по долготе, `-v·cosφ` по широте. Среднее
/// на такой грани равно нулю, то есть через берег и через полюс ничего не течёт.
/// Сумма по бассейну с весом площади равна нулю, поэтому уровень не может
/// бесконечно дрейфовать.
#[must_use]
pub fn divergence(grid: &Grid) -> Vec<f64> {
    let (rows, cols) = (grid.rows, grid.cols);
    let mut div = vec![0.0; grid.len()];
    let u = &grid.water_u;
    let v = &grid.water_v;
    let dlon = grid.dlon_rad();
    let dlat = grid.dlat_rad();

    let cos_lat: Vec<f64> = (0..rows)
        .map(|r| grid.lat_deg(r).to_radians().cos())
        .collect();

    for r in 0..rows {
        let cos_here = cos_lat[r];

        for c in 0..cols {
            let i = grid.index(r, c);
            if grid.land_mask[i] != 0 {
                continue;
            }

            // Отражение за стенкой: (u + u_ghost)/2 = 0 на грани
            let east = grid.index(r, grid.wrap_col(c as i64 + 1));
            let west = grid.index(r, grid.wrap_col(c as i64 - 1));
            let u_e = if grid.land_mask[east] != 0 { -u[i] } else { u[east] };
            let u_w = if grid.land_mask[west] != 0 { -u[i] } else { u[west] };

            let flux_here = v[i] * cos_here;
            let flux_n = if r + 1 < rows && grid.land_mask[i + cols] == 0 {
                v[i + cols] * cos_lat[r + 1]
            } else {
                -flux_here
            };
            let flux_s = if r > 0 && grid.land_mask[i - cols] == 0 {
                v[i - cols] * cos_lat[r - 1]
            } else {
                -flux_here
            };

            div[i] = ((u_e - u_w) / (2.0 * dlon) + (flux_n - flux_s) / (2.0 * dlat))
                / (EARTH_RADIUS_M * cos_here);
        }
    }

    div
}
