///
// Raw back-projection accumulator
//
// The one shared-mutable structure in the system. Rotation steps are
// back-projected from a worker pool and legitimately land on the same
// pixels, so every cell is an atomic counter and all writes go through
// fetch-add; a plain += here would be a data race, not just slow.
// Relaxed ordering suffices: cells are independent tallies and the
// pool join at the end of a pass is the only synchronization needed.
//

use std::sync::atomic::{AtomicI64, Ordering::Relaxed};

use crate::error::Result;
use crate::tomo_image::Image;

pub struct RawAccumulator {
    width: usize,
    height: usize,
    cells: Vec<AtomicI64>,
}

impl RawAccumulator {
    pub fn new(width: usize, height: usize) -> RawAccumulator {
        RawAccumulator {
            width,
            height,
            cells: (0..width * height).map(|_| AtomicI64::new(0)).collect(),
        }
    }

    /// Contribute a (possibly negative, when ramp-filtered) projection
    /// value to one pixel. Safe to call from any number of threads.
    #[inline]
    pub fn add(&self, x: usize, y: usize, value: i64) {
        debug_assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x].fetch_add(value, Relaxed);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i64 {
        debug_assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x].load(Relaxed)
    }

    /// Zero every cell; the start of a brand-new reconstruction pass.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(0, Relaxed);
        }
    }

    pub fn max_value(&self) -> i64 {
        self.cells
            .iter()
            .map(|cell| cell.load(Relaxed))
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Min-max rescale into a displayable image: [0, max] maps onto
    /// [0, 255], negative cells clamp to black. All-zero accumulators
    /// stay black rather than dividing by zero.
    pub fn normalized(&self) -> Result<Image> {
        let max = self.max_value();
        let data = if max == 0 {
            vec![0; self.cells.len()]
        } else {
            self.cells
                .iter()
                .map(|cell| {
                    let raw = cell.load(Relaxed) as f64;
                    (255.0 * raw / max as f64).round().clamp(0.0, 255.0) as u8
                })
                .collect()
        };
        Image::from_raw(self.width, self.height, data)
    }

    /// Exact cell contents, for comparing accumulation passes.
    pub fn snapshot(&self) -> Vec<i64> {
        self.cells.iter().map(|cell| cell.load(Relaxed)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_add_and_get() {
        let acc = RawAccumulator::new(3, 2);
        acc.add(2, 1, 40);
        acc.add(2, 1, 2);
        assert_eq!(acc.get(2, 1), 42);
        assert_eq!(acc.get(0, 0), 0);
    }

    #[test]
    fn test_concurrent_adds_do_not_lose_updates() {
        let acc = RawAccumulator::new(2, 2);
        (0..10_000).into_par_iter().for_each(|_| acc.add(1, 1, 1));
        assert_eq!(acc.get(1, 1), 10_000);
    }

    #[test]
    fn test_reset() {
        let acc = RawAccumulator::new(2, 2);
        acc.add(0, 0, 7);
        acc.reset();
        assert_eq!(acc.get(0, 0), 0);
        assert_eq!(acc.max_value(), 0);
    }

    #[test]
    fn test_normalized_rescale() {
        let acc = RawAccumulator::new(2, 2);
        acc.add(0, 0, 100);
        acc.add(1, 0, 50);
        acc.add(0, 1, -30);
        let img = acc.normalized().unwrap();
        assert_eq!(img.get(0, 0), 255);
        assert_eq!(img.get(1, 0), 128); // round(255 * 50 / 100)
        assert_eq!(img.get(0, 1), 0); // negative clamps to black
        assert_eq!(img.get(1, 1), 0);
    }

    #[test]
    fn test_normalized_all_zero() {
        let acc = RawAccumulator::new(4, 4);
        let img = acc.normalized().unwrap();
        assert!(img.data.iter().all(|&v| v == 0));
    }
}
