///
// Sinogram storage
//
// Same flat layout as an image, but the axes mean something: rows are
// rotation steps, columns are detectors. Worth a separate type so the
// two never get confused. Rows are written one at a time by the
// forward projector and read-only from then on.
//

use crate::error::Result;
use crate::tomo_image::Image;

#[derive(Clone, Debug, PartialEq)]
pub struct Sinogram {
    pub steps: usize,
    pub detectors: usize,
    data: Vec<u8>,
}

impl Sinogram {
    /// Allocated once per scan configuration, zero-filled; rows keep
    /// their previous contents until the builder writes them.
    pub fn new(steps: usize, detectors: usize) -> Sinogram {
        Sinogram {
            steps,
            detectors,
            data: vec![0; steps * detectors],
        }
    }

    pub fn row(&self, step: usize) -> &[u8] {
        &self.data[step * self.detectors..(step + 1) * self.detectors]
    }

    pub(crate) fn row_mut(&mut self, step: usize) -> &mut [u8] {
        &mut self.data[step * self.detectors..(step + 1) * self.detectors]
    }

    /// The whole backing buffer, for the parallel builder to split into
    /// disjoint per-row slices.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, step: usize, detector: usize) -> u8 {
        debug_assert!(step < self.steps && detector < self.detectors);
        self.data[step * self.detectors + detector]
    }

    /// Render the sinogram as a displayable image: one pixel row per
    /// rotation step, one column per detector.
    pub fn to_image(&self) -> Result<Image> {
        Image::from_raw(self.detectors, self.steps, self.data.clone())
    }
}
