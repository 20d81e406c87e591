///
// Error types
//
// Everything the scanner can reject is known up front: a bad
// configuration, a row index past the end of the sweep, or an image the
// scan circle can't be inscribed in. All of these surface synchronously
// at the call site - the numeric core itself has no hidden failure modes.
//

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Rejected at `ScanConfig` construction, never mid-scan.
    #[error("invalid scan configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A rotation-step index at or beyond the end of the sweep.
    #[error("rotation step {step} out of range ({total} steps in sweep)")]
    AngleOutOfRange { step: usize, total: usize },

    /// An image that is empty, too small to inscribe the scan circle in,
    /// or of a different size than the grid it is compared against.
    #[error("unusable image dimensions: {width}x{height}")]
    DimensionMismatch { width: usize, height: usize },
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Error {
        Error::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::AngleOutOfRange { step: 720, total: 720 };
        assert_eq!(
            err.to_string(),
            "rotation step 720 out of range (720 steps in sweep)"
        );

        let err = Error::DimensionMismatch { width: 0, height: 64 };
        assert_eq!(err.to_string(), "unusable image dimensions: 0x64");
    }
}
