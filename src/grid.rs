// src/grid.rs
//! Сетка широта–долгота и все поля состояния
//!
//! Все поля хранятся в плоских массивах одинаковой длины `rows * cols` с индексом
//! `row * cols + col`. Строка 0 — южный полюс, строка `rows - 1` — северный.
//! По долготе сетка замкнута (столбец берётся по модулю `cols`), по широте нет.
//!
//! Размеры фиксируются при создании. Изменять поля должен только шаг симуляции
//! (и один раз при настройке маска суши); отрисовка и трассеры их только читают.

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    /// Шаг сетки в градусах
    pub resolution_deg: f64,
    /// Зональная скорость течения, м/с (на восток)
    pub water_u: Vec<f64>,
    /// Меридиональная скорость течения, м/с (на север)
    pub water_v: Vec<f64>,
    /// Отклонение уровня моря, м
    pub eta: Vec<f64>,
    /// 1 = суша, 0 = вода
    pub land_mask: Vec<u8>,
    /// Температура воды, °C
    pub temperature: Vec<f64>,
}

impl Grid {
    /// Создаёт водный мир с нулевыми полями
    ///
    /// Шаг должен делить 180° нацело: 5° → 36×72, 10° → 18×36.
    pub fn new(resolution_deg: f64) -> SimResult<Self> {
        if !resolution_deg.is_finite() || resolution_deg <= 0.0 || resolution_deg > 90.0 {
            return Err(SimError::InvalidResolution {
                resolution: resolution_deg,
            });
        }
        let rows_f = 180.0 / resolution_deg;
        if (rows_f - rows_f.round()).abs() > 1e-9 {
            return Err(SimError::InvalidResolution {
                resolution: resolution_deg,
            });
        }
        let rows = rows_f.round() as usize;
        let cols = rows * 2;
        let len = rows * cols;

        Ok(Self {
            rows,
            cols,
            resolution_deg,
            water_u: vec![0.0; len],
            water_v: vec![0.0; len],
            eta: vec![0.0; len],
            land_mask: vec![0; len],
            temperature: vec![0.0; len],
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Замыкание по долготе: -1 → cols-1, cols → 0
    #[inline]
    #[must_use]
    pub fn wrap_col(&self, col: i64) -> usize {
        col.rem_euclid(self.cols as i64) as usize
    }

    /// Широта центра строки в градусах
    #[inline]
    #[must_use]
    pub fn lat_deg(&self, row: usize) -> f64 {
        -90.0 + self.resolution_deg / 2.0 + row as f64 * self.resolution_deg
    }

    /// Долгота центра столбца в градусах
    #[inline]
    #[must_use]
    pub fn lon_deg(&self, col: usize) -> f64 {
        let width = 360.0 / self.cols as f64;
        col as f64 * width - 180.0 + width / 2.0
    }

    /// Шаг по долготе в радианах
    #[inline]
    #[must_use]
    pub fn dlon_rad(&self) -> f64 {
        (360.0 / self.cols as f64).to_radians()
    }

    /// Шаг по широте в радианах
    #[inline]
    #[must_use]
    pub fn dlat_rad(&self) -> f64 {
        self.resolution_deg.to_radians()
    }

    #[inline]
    #[must_use]
    pub fn is_land(&self, row: usize, col: usize) -> bool {
        self.land_mask[self.index(row, col)] != 0
    }

    /// Суша ли соседняя клетка; за пределами сетки по широте суши нет
    #[inline]
    #[must_use]
    pub fn is_land_at(&self, row: i64, col: i64) -> bool {
        if row < 0 || row >= self.rows as i64 {
            return false;
        }
        self.is_land(row as usize, self.wrap_col(col))
    }

    /// Граничит ли клетка с сушей хотя бы одной из четырёх сторон
    #[must_use]
    pub fn touches_land(&self, row: usize, col: usize) -> bool {
        let (r, c) = (row as i64, col as i64);
        self.is_land_at(r, c + 1)
            || self.is_land_at(r, c - 1)
            || self.is_land_at(r + 1, c)
            || self.is_land_at(r - 1, c)
    }

    /// Количество водных клеток
    #[must_use]
    pub fn water_cells(&self) -> usize {
        self.land_mask.iter().filter(|&&m| m == 0).count()
    }

    /// Доля суши (0.0 — водный мир)
    #[must_use]
    pub fn land_fraction(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.len() - self.water_cells()) as f64 / self.len() as f64
    }

    /// Устанавливает маску суши и обнуляет все поля на суше
    pub fn apply_land_mask(&mut self, mask: Vec<u8>) -> SimResult<()> {
        if mask.len() != self.len() {
            return Err(SimError::MaskSize {
                expected: self.len(),
                actual: mask.len(),
            });
        }
        self.land_mask = mask.into_iter().map(|m| u8::from(m != 0)).collect();
        self.clear_land();
        Ok(())
    }

    /// Обнуляет скорость, уровень и температуру на суше
    pub fn clear_land(&mut self) {
        for (i, &m) in self.land_mask.iter().enumerate() {
            if m != 0 {
                self.water_u[i] = 0.0;
                self.water_v[i] = 0.0;
                self.eta[i] = 0.0;
                self.temperature[i] = 0.0;
            }
        }
    }

    /// Минимум и максимум уровня по водным клеткам (для цветовой шкалы)
    #[must_use]
    pub fn eta_range(&self) -> Option<(f64, f64)> {
        self.water_range(&self.eta)
    }

    /// Минимум и максимум произвольного поля по водным клеткам
    #[must_use]
    pub fn water_range(&self, field: &[f64]) -> Option<(f64, f64)> {
        field
            .iter()
            .zip(&self.land_mask)
            .filter(|&(_, &m)| m == 0)
            .map(|(&v, _)| v)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Ищет первое нечисловое значение
    ///
    /// Шаг симуляции сам расходимость не отслеживает, это обязанность вызывающего кода.
    pub fn check_finite(&self) -> SimResult<()> {
        let fields: [(&'static str, &[f64]); 4] = [
            ("water_u", &self.water_u),
            ("water_v", &self.water_v),
            ("eta", &self.eta),
            ("temperature", &self.temperature),
        ];
        for (field, data) in fields {
            if let Some(i) = data.iter().position(|v| !v.is_finite()) {
                return Err(SimError::NonFinite {
                    field,
                    row: i / self.cols,
                    col: i % self.cols,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5.0, 36, 72)]
    #[case(10.0, 18, 36)]
    #[case(2.5, 72, 144)]
    #[case(15.0, 12, 24)]
    fn dimensions_follow_resolution(#[case] res: f64, #[case] rows: usize, #[case] cols: usize) {
        let grid = Grid::new(res).unwrap();
        assert_eq!((grid.rows, grid.cols), (rows, cols));
        assert_eq!(grid.water_u.len(), rows * cols);
        assert_eq!(grid.water_v.len(), rows * cols);
        assert_eq!(grid.eta.len(), rows * cols);
        assert_eq!(grid.land_mask.len(), rows * cols);
        assert_eq!(grid.temperature.len(), rows * cols);
    }

    #[rstest]
    #[case(7.0)]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    #[case(120.0)]
    fn bad_resolution_is_rejected(#[case] res: f64) {
        assert!(matches!(Grid::new(res), Err(SimError::InvalidResolution { .. })));
    }

    #[test]
    fn coordinates_of_cell_centres() {
        let grid = Grid::new(5.0).unwrap();
        assert_eq!(grid.lat_deg(0), -87.5);
        assert_eq!(grid.lat_deg(35), 87.5);
        assert_eq!(grid.lat_deg(3), -72.5);
        assert_eq!(grid.lon_deg(0), -177.5);
        assert_eq!(grid.lon_deg(71), 177.5);
    }

    #[test]
    fn columns_wrap_in_both_directions() {
        let grid = Grid::new(5.0).unwrap();
        assert_eq!(grid.wrap_col(-1), 71);
        assert_eq!(grid.wrap_col(72), 0);
        assert_eq!(grid.wrap_col(-73), 71);
        assert_eq!(grid.wrap_col(5), 5);
    }

    #[test]
    fn rows_outside_grid_are_not_land() {
        let mut grid = Grid::new(10.0).unwrap();
        grid.land_mask.fill(1);
        assert!(!grid.is_land_at(-1, 0));
        assert!(!grid.is_land_at(grid.rows as i64, 0));
        assert!(grid.is_land_at(0, -1));
    }

    #[test]
    fn applying_mask_clears_land_fields() {
        let mut grid = Grid::new(10.0).unwrap();
        grid.water_u.fill(1.0);
        grid.eta.fill(2.0);
        grid.temperature.fill(20.0);
        let mut mask = vec![0; grid.len()];
        mask[5] = 1;
        grid.apply_land_mask(mask).unwrap();
        assert_eq!(grid.water_u[5], 0.0);
        assert_eq!(grid.eta[5], 0.0);
        assert_eq!(grid.temperature[5], 0.0);
        assert_eq!(grid.water_u[6], 1.0);
    }

    #[test]
    fn wrong_mask_size_is_rejected() {
        let mut grid = Grid::new(10.0).unwrap();
        let err = grid.apply_land_mask(vec![0; 3]).unwrap_err();
        assert!(matches!(err, SimError::MaskSize { expected: 648, actual: 3 }));
    }

    #[test]
    fn eta_range_skips_land() {
        let mut grid = Grid::new(10.0).unwrap();
        grid.eta[0] = -3.0;
        grid.eta[1] = 4.0;
        grid.land_mask[1] = 1;
        assert_eq!(grid.eta_range(), Some((-3.0, 0.0)));

        grid.land_mask.fill(1);
        assert_eq!(grid.eta_range(), None);
    }

    #[test]
    fn non_finite_value_is_located() {
        let mut grid = Grid::new(10.0).unwrap();
        assert!(grid.check_finite().is_ok());
        let i = grid.index(4, 7);
        grid.eta[i] = f64::NAN;
        let err = grid.check_finite().unwrap_err();
        assert!(matches!(
            err,
            SimError::NonFinite { field: "eta", row: 4, col: 7 }
        ));
    }
}
