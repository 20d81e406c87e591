///
// Scan configuration
//
// Immutable description of the emitter/detector apparatus: how far the
// system rotates per step, how many detectors sit on the arc opposite
// the emitter, and how wide that arc is. All validation happens here,
// at construction, so the projection loops can assume a sane setup.
//

use crate::error::{Error, Result};

/// Empirical correction for the bright-center artifact: the number of
/// ray pixels skipped nearest the emitter during back-projection is
/// `skip_factor * width / detector_spread_degrees`. Tuning constant,
/// not a law.
pub const DEFAULT_SKIP_FACTOR: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Rotation per step, in degrees. 0 < step <= 360.
    pub angular_step_degrees: f64,
    /// Number of detectors on the arc. At least 2.
    pub detector_count: usize,
    /// Angular aperture of the detector fan, in degrees.
    pub detector_spread_degrees: f64,
    /// Apply the frequency-domain ramp filter before back-projection.
    pub filtering_enabled: bool,
    /// See [`DEFAULT_SKIP_FACTOR`].
    pub skip_factor: f64,
}

impl ScanConfig {
    pub fn new(
        angular_step_degrees: f64,
        detector_count: usize,
        detector_spread_degrees: f64,
        filtering_enabled: bool,
    ) -> Result<ScanConfig> {
        if !(angular_step_degrees > 0.0 && angular_step_degrees <= 360.0) {
            return Err(Error::invalid_config(format!(
                "angular step must be in (0, 360], got {}",
                angular_step_degrees
            )));
        }
        if detector_count < 2 {
            return Err(Error::invalid_config(format!(
                "at least 2 detectors required, got {}",
                detector_count
            )));
        }
        if detector_spread_degrees <= 0.0 {
            return Err(Error::invalid_config(format!(
                "detector spread must be positive, got {}",
                detector_spread_degrees
            )));
        }

        Ok(ScanConfig {
            angular_step_degrees,
            detector_count,
            detector_spread_degrees,
            filtering_enabled,
            skip_factor: DEFAULT_SKIP_FACTOR,
        })
    }

    pub fn with_skip_factor(mut self, skip_factor: f64) -> ScanConfig {
        self.skip_factor = skip_factor;
        self
    }

    /// Number of rotation steps in a full 360 degree sweep.
    pub fn angle_steps_total(&self) -> usize {
        (360.0 / self.angular_step_degrees).floor() as usize
    }

    /// Angle between neighbouring detectors. The fan's outermost
    /// detectors sit exactly on the edges of the aperture, hence the
    /// `count - 1` divisor.
    pub fn detector_step_degrees(&self) -> f64 {
        self.detector_spread_degrees / (self.detector_count - 1) as f64
    }

    /// Fails fast on a step index past the end of the sweep, rather
    /// than silently clamping.
    pub fn check_step(&self, step: usize) -> Result<()> {
        let total = self.angle_steps_total();
        if step >= total {
            return Err(Error::AngleOutOfRange { step, total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_steps_total() {
        let config = ScanConfig::new(1.0, 180, 90.0, false).unwrap();
        assert_eq!(config.angle_steps_total(), 360);

        let config = ScanConfig::new(0.5, 180, 90.0, false).unwrap();
        assert_eq!(config.angle_steps_total(), 720);

        // Non-divisor steps round down.
        let config = ScanConfig::new(0.7, 180, 90.0, false).unwrap();
        assert_eq!(config.angle_steps_total(), 514);
    }

    #[test]
    fn test_detector_step() {
        let config = ScanConfig::new(1.0, 10, 90.0, false).unwrap();
        assert!((config.detector_step_degrees() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            ScanConfig::new(0.0, 10, 90.0, false),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            ScanConfig::new(361.0, 10, 90.0, false),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            ScanConfig::new(1.0, 1, 90.0, false),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            ScanConfig::new(1.0, 10, 0.0, false),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_check_step() {
        let config = ScanConfig::new(1.0, 10, 90.0, false).unwrap();
        assert!(config.check_step(0).is_ok());
        assert!(config.check_step(359).is_ok());
        assert_eq!(
            config.check_step(360),
            Err(Error::AngleOutOfRange { step: 360, total: 360 })
        );
    }
}
