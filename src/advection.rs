// src/advection.rs
//! Перенос температуры течением (первый порядок, против потока)

use crate::climate::EARTH_RADIUS_M;
use crate::grid::Grid;

/// Поток температуры `u·∂T/∂x + v·∂T/∂y` по клеткам, °C/с
///
/// Производная берётся со стороны, откуда приходит вода: при u ≥ 0 — с запада,
/// иначе с востока (с замыканием); при v ≥ 0 — с юга, иначе с севера. Через полюс
/// поток не идёт. Суша выше по течению считается имеющей температуру самой клетки,
/// то есть вклада не даёт. На суше поток нулевой.
///
/// Интегрирует вызывающий код: `T -= flux·dt`.
#[must_use]
pub fn advect(grid: &Grid) -> Vec<f64> {
    let (rows, cols) = (grid.rows, grid.cols);
    let mut flux = vec![0.0; grid.len()];
    let t = &grid.temperature;
    let dy = EARTH_RADIUS_M * grid.dlat_rad();

    for r in 0..rows {
        let dx = EARTH_RADIUS_M * grid.lat_deg(r).to_radians().cos() * grid.dlon_rad();

        for c in 0..cols {
            let i = grid.index(r, c);
            if grid.land_mask[i] != 0 {
                continue;
            }
            let u = grid.water_u[i];
            let v = grid.water_v[i];

            let upstream_x = if u >= 0.0 {
                grid.index(r, grid.wrap_col(c as i64 - 1))
            } else {
                grid.index(r, grid.wrap_col(c as i64 + 1))
            };
            let zonal = if grid.land_mask[upstream_x] != 0 {
                0.0
            } else if u >= 0.0 {
                u * (t[i] - t[upstream_x]) / dx
            } else {
                u * (t[upstream_x] - t[i]) / dx
            };

            let upstream_y = if v >= 0.0 {
                (r > 0).then(|| i - cols)
            } else {
                (r + 1 < rows).then(|| i + cols)
            };
            let meridional = match upstream_y {
                Some(j) if grid.land_mask[j] == 0 => {
                    if v >= 0.0 {
                        v * (t[i] - t[j]) / dy
                    } else {
                        v * (t[j] - t[i]) / dy
                    }
                }
                _ => 0.0,
            };

            flux[i] = zonal + meridional;
        }
    }

    flux
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stirred(resolution: f64) -> Grid {
        let mut grid = Grid::new(resolution).unwrap();
        for (i, (u, v)) in grid.water_u.iter_mut().zip(grid.water_v.iter_mut()).enumerate() {
            *u = ((i * 7) % 5) as f64 * 0.2 - 0.4;
            *v = ((i * 3) % 7) as f64 * 0.1 - 0.3;
        }
        grid
    }

    #[test]
    fn uniform_temperature_gives_zero_flux() {
        let mut grid = stirred(5.0);
        grid.temperature.fill(12.5);
        assert!(advect(&grid).iter().all(|&f| f == 0.0));
    }

    #[test]
    fn eastward_flow_reads_western_neighbour() {
        let mut grid = Grid::new(10.0).unwrap();
        let r = 9;
        let i = grid.index(r, 0);
        let west = grid.index(r, grid.cols - 1);
        grid.water_u[i] = 0.5;
        grid.temperature[west] = 10.0;
        grid.temperature[i] = 20.0;
        let dx = EARTH_RADIUS_M * grid.lat_deg(r).to_radians().cos() * grid.dlon_rad();

        let flux = advect(&grid);
        assert!((flux[i] - 0.5 * 10.0 / dx).abs() < 1e-15);
    }

    #[test]
    fn westward_flow_reads_eastern_neighbour() {
        let mut grid = Grid::new(10.0).unwrap();
        let i = grid.index(4, 3);
        let east = grid.index(4, 4);
        grid.water_u[i] = -1.0;
        grid.temperature[east] = 8.0;
        let dx = EARTH_RADIUS_M * grid.lat_deg(4).to_radians().cos() * grid.dlon_rad();

        let flux = advect(&grid);
        assert!((flux[i] - (-1.0 * 8.0 / dx)).abs() < 1e-15);
    }

    #[test]
    fn nothing_crosses_the_poles() {
        let mut grid = Grid::new(10.0).unwrap();
        let south = grid.index(0, 2);
        let north = grid.index(grid.rows - 1, 2);
        grid.water_v[south] = 1.0;
        grid.water_v[north] = -1.0;
        grid.temperature[south] = 30.0;
        grid.temperature[north] = -5.0;

        let flux = advect(&grid);
        assert_eq!(flux[south], 0.0);
        assert_eq!(flux[north], 0.0);
    }

    #[test]
    fn land_upstream_contributes_nothing() {
        let mut grid = Grid::new(10.0).unwrap();
        let i = grid.index(6, 6);
        let west = grid.index(6, 5);
        let south = grid.index(5, 6);
        grid.water_u[i] = 1.0;
        grid.water_v[i] = 1.0;
        grid.temperature[i] = 25.0;
        grid.land_mask[west] = 1;
        grid.land_mask[south] = 1;

        assert_eq!(advect(&grid)[i], 0.0);
    }

    #[test]
    fn land_cells_have_no_flux() {
        let mut grid = stirred(10.0);
        for (i, t) in grid.temperature.iter_mut().enumerate() {
            *t = i as f64;
        }
        let i = grid.index(8, 8);
        grid.land_mask[i] = 1;
        assert_eq!(advect(&grid)[i], 0.0);
    }
}
