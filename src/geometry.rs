///
// Emitter/detector geometry
//
// The apparatus is a single emitter and a fan of detectors riding a
// circle inscribed in the image. Everything here is a pure function of
// (rotation step, detector index) and the configuration - no geometry
// state is ever cached, which is what guarantees that the forward and
// backward passes trace identical rays.
//

use nalgebra::{Point2, Vector2};

use crate::config::ScanConfig;
use crate::error::{Error, Result};

/// Margin between the scan circle and the image border, in pixels.
pub const PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct ScanGeometry {
    config: ScanConfig,
    center: Point2<f64>,
    radius: f64,
}

impl ScanGeometry {
    /// Inscribe the scan circle in a width x height image.
    pub fn new(config: ScanConfig, width: usize, height: usize) -> Result<ScanGeometry> {
        let radius = width.min(height) as f64 / 2.0 - PADDING;
        if width == 0 || height == 0 || radius <= 0.0 {
            return Err(Error::DimensionMismatch { width, height });
        }
        Ok(ScanGeometry {
            config,
            center: Point2::new(width as f64 / 2.0, height as f64 / 2.0),
            radius,
        })
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn on_circle(&self, angle_degrees: f64) -> Point2<f64> {
        let rad = angle_degrees.to_radians();
        self.center - Vector2::new(rad.cos(), rad.sin()) * self.radius
    }

    /// Emitter position at the given rotation step.
    pub fn emitter(&self, step: usize) -> Result<Point2<f64>> {
        self.config.check_step(step)?;
        Ok(self.on_circle(step as f64 * self.config.angular_step_degrees))
    }

    /// Position of detector `i` at the given rotation step. The fan
    /// opens opposite the emitter, spanning the configured aperture.
    ///
    /// Panics if `i` is not a valid detector index; detector indices
    /// come from the configuration, not from external input.
    pub fn detector(&self, step: usize, i: usize) -> Result<Point2<f64>> {
        self.config.check_step(step)?;
        assert!(i < self.config.detector_count);
        let angle = step as f64 * self.config.angular_step_degrees;
        let detector_angle = angle + (180.0 - self.config.detector_spread_degrees / 2.0)
            + i as f64 * self.config.detector_step_degrees();
        Ok(self.on_circle(detector_angle))
    }

    /// Both endpoints of the ray from the emitter to detector `i`,
    /// usable by an external renderer to draw the apparatus.
    pub fn ray_segment(&self, step: usize, i: usize) -> Result<(Point2<f64>, Point2<f64>)> {
        Ok((self.emitter(step)?, self.detector(step, i)?))
    }

    /// Emitter plus every detector position for one rotation step.
    pub fn apparatus_positions(&self, step: usize) -> Result<(Point2<f64>, Vec<Point2<f64>>)> {
        let emitter = self.emitter(step)?;
        let detectors = (0..self.config.detector_count)
            .map(|i| self.detector(step, i))
            .collect::<Result<Vec<_>>>()?;
        Ok((emitter, detectors))
    }
}
