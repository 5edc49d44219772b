// src/landmask/earth.rs
//! Растр береговой линии Земли с шагом 5°
//!
//! Формат: 36 строк по 72 символа, `#` — суша, `.` — вода. Первая строка — самая
//! северная полоса (85°–90° с.ш.), первый столбец начинается с 180° з.д.

use crate::error::{SimError, SimResult};

const BUNDLED: &str = include_str!("../../assets/earth_5deg.txt");

/// Шаг растра в градусах
pub const BITMAP_RESOLUTION_DEG: f64 = 5.0;
pub const BITMAP_ROWS: usize = 36;
pub const BITMAP_COLS: usize = 72;

#[derive(Debug, Clone)]
pub struct EarthBitmap {
    /// Строки с севера на юг, `true` — суша
    cells: Vec<[bool; BITMAP_COLS]>,
}

impl EarthBitmap {
    /// Растр, встроенный в библиотеку
    pub fn bundled() -> SimResult<Self> {
        Self::parse(BUNDLED)
    }

    pub fn parse(text: &str) -> SimResult<Self> {
        let mut cells = Vec::with_capacity(BITMAP_ROWS);

        for (n, line) in text.lines().map(str::trim_end).filter(|l| !l.is_empty()).enumerate() {
            let line_no = n + 1;
            if line.chars().count() != BITMAP_COLS {
                return Err(SimError::MaskAsset {
                    line: line_no,
                    message: format!(
                        "ожидалось {BITMAP_COLS} символов, получено {}",
                        line.chars().count()
                    ),
                });
            }
            let mut row = [false; BITMAP_COLS];
            for (cell, ch) in row.iter_mut().zip(line.chars()) {
                *cell = match ch {
                    '#' => true,
                    '.' => false,
                    other => {
                        return Err(SimError::MaskAsset {
                            line: line_no,
                            message: format!("недопустимый символ {other:?}"),
                        });
                    }
                };
            }
            cells.push(row);
        }

        if cells.len() != BITMAP_ROWS {
            return Err(SimError::MaskAsset {
                line: cells.len(),
                message: format!("ожидалось {BITMAP_ROWS} строк, получено {}", cells.len()),
            });
        }

        Ok(Self { cells })
    }

    /// Ближайшая клетка растра для точки; годится для сетки любого шага
    #[must_use]
    pub fn is_land_at(&self, lat_deg: f64, lon_deg: f64) -> bool {
        let row = ((90.0 - lat_deg) / BITMAP_RESOLUTION_DEG)
            .floor()
            .clamp(0.0, (BITMAP_ROWS - 1) as f64);
        let col = ((lon_deg + 180.0) / BITMAP_RESOLUTION_DEG)
            .floor()
            .clamp(0.0, (BITMAP_COLS - 1) as f64);
        self.cells[row as usize][col as usize]
    }

    /// Доля суши в растре
    #[must_use]
    pub fn land_fraction(&self) -> f64 {
        let land: usize = self.cells.iter().map(|row| row.iter().filter(|&&l| l).count()).sum();
        land as f64 / (BITMAP_ROWS * BITMAP_COLS) as f64
    }
}
