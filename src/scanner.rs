///
// Scan orchestration
//
// One CtScanner owns everything a scan session needs: the immutable
// source image, the apparatus geometry, the sinogram being built, and
// the back-projection accumulator. The forward and backward passes
// both re-derive every ray from (step, detector) alone, so the two
// passes trace identical paths without sharing any cached geometry.
//
// Full passes run the rotation steps on the rayon pool; the _row
// variants process a single step so a caller can watch the sinogram
// and the reconstruction converge step by step.
//

use nalgebra::Point2;
use rayon::prelude::*;

use crate::accumulator::RawAccumulator;
use crate::bresenham;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::geometry::ScanGeometry;
use crate::ramp_filter;
use crate::sinogram::Sinogram;
use crate::tomo_image::Image;

pub struct CtScanner {
    source: Image,
    config: ScanConfig,
    geometry: ScanGeometry,
    sinogram: Sinogram,
    accumulator: RawAccumulator,
}

fn pixel(p: Point2<f64>) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

// Mean intensity along one ray: the discrete stand-in for the
// continuous line integral, normalized by ray length so projections
// are comparable as the apparatus rotates.
fn ray_mean(source: &Image, geometry: &ScanGeometry, step: usize, detector: usize) -> Result<u8> {
    let (emitter, det) = geometry.ray_segment(step, detector)?;
    let walker = bresenham::line(pixel(emitter), pixel(det));
    let length = walker.len();
    let sum: u64 = walker
        .map(|(x, y)| source.get(x as usize, y as usize) as u64)
        .sum();
    Ok((sum as f64 / length as f64).round() as u8)
}

fn forward_project_row(
    source: &Image,
    geometry: &ScanGeometry,
    step: usize,
    row: &mut [u8],
) -> Result<()> {
    for (detector, cell) in row.iter_mut().enumerate() {
        *cell = ray_mean(source, geometry, step, detector)?;
    }
    Ok(())
}

impl CtScanner {
    pub fn new(source: Image, config: ScanConfig) -> Result<CtScanner> {
        let geometry = ScanGeometry::new(config, source.width, source.height)?;
        let sinogram = Sinogram::new(config.angle_steps_total(), config.detector_count);
        let accumulator = RawAccumulator::new(source.width, source.height);
        Ok(CtScanner {
            source,
            config,
            geometry,
            sinogram,
            accumulator,
        })
    }

    pub fn source(&self) -> &Image {
        &self.source
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn geometry(&self) -> &ScanGeometry {
        &self.geometry
    }

    pub fn sinogram(&self) -> &Sinogram {
        &self.sinogram
    }

    pub fn accumulator(&self) -> &RawAccumulator {
        &self.accumulator
    }

    /// Forward-project every rotation step in parallel. Each worker
    /// writes one disjoint sinogram row, so no synchronization beyond
    /// the pool join is needed. A fresh sinogram starts a fresh
    /// reconstruction pass, so the accumulator is reset too.
    pub fn build_sinogram(&mut self) -> Result<&Sinogram> {
        let detectors = self.config.detector_count;
        let CtScanner {
            source,
            geometry,
            sinogram,
            ..
        } = self;
        let (source, geometry) = (&*source, &*geometry);
        sinogram
            .data_mut()
            .par_chunks_mut(detectors)
            .enumerate()
            .try_for_each(|(step, row)| forward_project_row(source, geometry, step, row))?;
        self.accumulator.reset();
        Ok(&self.sinogram)
    }

    /// Forward-project a single rotation step, leaving every other row
    /// untouched, and return the sinogram as it stands.
    pub fn build_sinogram_row(&mut self, step: usize) -> Result<&Sinogram> {
        self.config.check_step(step)?;
        let CtScanner {
            source,
            geometry,
            sinogram,
            ..
        } = self;
        forward_project_row(&*source, &*geometry, step, sinogram.row_mut(step))?;
        self.accumulator.reset();
        Ok(&self.sinogram)
    }

    /// Number of leading ray pixels (nearest the emitter) left out of
    /// back-projection: `round(skip_factor * width / spread)`. An
    /// empirical correction for the bright-center artifact caused by
    /// ray overlap near the rotation center; tune via
    /// [`ScanConfig::with_skip_factor`].
    pub fn first_pixels_to_skip(&self) -> usize {
        (self.config.skip_factor * self.source.width as f64 / self.config.detector_spread_degrees)
            .round() as usize
    }

    /// The ramp-filtered version of one sinogram row, as fed to the
    /// back-projector when filtering is enabled.
    pub fn filtered_projection(&self, step: usize) -> Result<Vec<f64>> {
        self.config.check_step(step)?;
        Ok(ramp_filter::filter_projection(self.sinogram.row(step)))
    }

    // Smear one projection back across the image: every remaining ray
    // pixel atomically accumulates the (optionally filtered) sinogram
    // value for its detector.
    fn back_project_step(&self, step: usize) -> Result<()> {
        let row = self.sinogram.row(step);
        let values: Vec<i64> = if self.config.filtering_enabled {
            ramp_filter::filter_projection(row)
                .iter()
                .map(|v| v.round() as i64)
                .collect()
        } else {
            row.iter().map(|&v| v as i64).collect()
        };

        let skip = self.first_pixels_to_skip();
        for (detector, &value) in values.iter().enumerate() {
            let (emitter, det) = self.geometry.ray_segment(step, detector)?;
            for (x, y) in bresenham::line(pixel(emitter), pixel(det)).skip(skip) {
                self.accumulator.add(x as usize, y as usize, value);
            }
        }
        Ok(())
    }

    /// Back-project every rotation step in parallel into a fresh
    /// accumulator and return the min-max normalized reconstruction.
    /// Steps may interleave freely; the per-cell atomic adds make the
    /// result independent of scheduling order.
    pub fn reconstruct(&mut self) -> Result<Image> {
        self.accumulator.reset();
        let steps = self.config.angle_steps_total();
        let scanner = &*self;
        (0..steps)
            .into_par_iter()
            .try_for_each(|step| scanner.back_project_step(step))?;
        self.accumulator.normalized()
    }

    /// Back-project one additional rotation step into the *existing*
    /// accumulator and return the re-normalized snapshot. The
    /// accumulator carries state across these calls; it resets only
    /// when a new pass begins (a full [`reconstruct`], a rebuilt
    /// sinogram, or [`reset_reconstruction`]).
    ///
    /// [`reconstruct`]: CtScanner::reconstruct
    /// [`reset_reconstruction`]: CtScanner::reset_reconstruction
    pub fn reconstruct_row(&mut self, step: usize) -> Result<Image> {
        self.config.check_step(step)?;
        self.back_project_step(step)?;
        self.accumulator.normalized()
    }

    /// Discard accumulated back-projection state ahead of a new
    /// incremental pass.
    pub fn reset_reconstruction(&mut self) {
        self.accumulator.reset();
    }

    /// Endpoints of one ray, for drawing the apparatus.
    pub fn ray_segment(&self, step: usize, detector: usize) -> Result<(Point2<f64>, Point2<f64>)> {
        self.geometry.ray_segment(step, detector)
    }

    /// MSE of a reconstruction against the source image.
    pub fn mean_squared_error(&self, reconstruction: &Image) -> Result<f64> {
        reconstruction.mean_squared_error(&self.source)
    }
}
