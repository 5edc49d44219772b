// src/landmask/repair.rs
//! Ремонт маски: засыпка заливов шириной в одну клетку
//!
//! Водная клетка, у которой не меньше трёх из четырёх соседей — суша, сама
//! становится сушей. Соседи по долготе замкнуты; за полюсом соседа нет, и он
//! считается водой. Проход читает один буфер и пишет в другой, поэтому клетки,
//! засыпанные в этом проходе, влияют на соседей только в следующем.

/// Порог: столько соседей-суши превращают водную клетку в сушу
pub const FILL_THRESHOLD: usize = 3;

/// Повторяет проходы до неподвижной точки
///
/// Возвращает число проходов, в которых что-то изменилось (0 — маска уже исправна).
pub fn repair_mask(mask: &mut [u8], rows: usize, cols: usize) -> usize {
    debug_assert_eq!(mask.len(), rows * cols);
    let mut next = mask.to_vec();
    let mut sweeps = 0;

    loop {
        let mut filled = 0;
        for r in 0..rows {
            for c in 0..cols {
                let i = r * cols + c;
                if mask[i] != 0 {
                    continue;
                }
                if land_neighbours(mask, rows, cols, r, c) >= FILL_THRESHOLD {
                    next[i] = 1;
                    filled += 1;
                }
            }
        }

        if filled == 0 {
            break;
        }
        sweeps += 1;
        log::debug!("Ремонт маски, проход {sweeps}: засыпано {filled} клеток");
        mask.copy_from_slice(&next);
    }

    sweeps
}

fn land_neighbours(mask: &[u8], rows: usize, cols: usize, r: usize, c: usize) -> usize {
    let east = r * cols + (c + 1) % cols;
    let west = r * cols + (c + cols - 1) % cols;
    let mut count = usize::from(mask[east] != 0) + usize::from(mask[west] != 0);
    if r + 1 < rows {
        count += usize::from(mask[(r + 1) * cols + c] != 0);
    }
    if r > 0 {
        count += usize::from(mask[(r - 1) * cols + c] != 0);
    }
    count
}
