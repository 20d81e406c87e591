///
// Image management
//
// Flat-addressed 8-bit greyscale buffer, decoupled from any decoder's
// pixel type: the projection loops index straight into the backing
// vector rather than going through per-pixel accessor objects.
// Decoding and encoding of image files stays outside the core; the
// adapters here only convert between raw grids and the `image` crate's
// buffer types.
//

use image::{GrayImage, RgbImage};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Image {
    /// A zero-filled image. Fails on empty dimensions.
    pub fn new(width: usize, height: usize) -> Result<Image> {
        if width == 0 || height == 0 {
            return Err(Error::DimensionMismatch { width, height });
        }
        Ok(Image {
            width,
            height,
            data: vec![0; width * height],
        })
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Image> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(Error::DimensionMismatch { width, height });
        }
        Ok(Image {
            width,
            height,
            data,
        })
    }

    /// Flatten a decoded color image to greyscale by channel averaging:
    /// grey = (R + G + B) / 3.
    pub fn from_rgb_average(rgb: &RgbImage) -> Result<Image> {
        let data = rgb
            .pixels()
            .map(|p| ((p.0[0] as u16 + p.0[1] as u16 + p.0[2] as u16) / 3) as u8)
            .collect();
        Image::from_raw(rgb.width() as usize, rgb.height() as usize, data)
    }

    /// Hand the buffer to the `image` crate for encoding or display,
    /// with no intermediate color space.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_vec(self.width as u32, self.height as u32, self.data.clone())
            .expect("buffer length matches dimensions by construction")
    }

    /// Hot-path read. Callers guarantee in-bounds coordinates; every
    /// coordinate the scanner produces lies on the inscribed circle.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Mean squared per-pixel error against another image of the same
    /// dimensions.
    pub fn mean_squared_error(&self, other: &Image) -> Result<f64> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::DimensionMismatch {
                width: other.width,
                height: other.height,
            });
        }
        let sum: f64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| {
                let diff = a as f64 - b as f64;
                diff * diff
            })
            .sum();
        Ok(sum / (self.width * self.height) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Image::new(0, 5),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            Image::from_raw(2, 2, vec![0; 3]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_get_set() {
        let mut img = Image::new(4, 3).unwrap();
        img.set(3, 2, 200);
        assert_eq!(img.get(3, 2), 200);
        assert_eq!(img.data[2 * 4 + 3], 200);
    }

    #[test]
    fn test_channel_average_conversion() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, image::Rgb([30, 60, 90]));
        rgb.put_pixel(1, 0, image::Rgb([255, 255, 254]));
        let img = Image::from_rgb_average(&rgb).unwrap();
        assert_eq!(img.data, vec![60, 254]);
    }

    #[test]
    fn test_mse_identical_is_zero() {
        let img = Image::from_raw(3, 2, vec![10, 20, 30, 40, 50, 60]).unwrap();
        assert_eq!(img.mean_squared_error(&img).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_known_value() {
        let a = Image::from_raw(2, 1, vec![10, 20]).unwrap();
        let b = Image::from_raw(2, 1, vec![13, 16]).unwrap();
        // (9 + 16) / 2
        assert!((a.mean_squared_error(&b).unwrap() - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_mse_dimension_mismatch() {
        let a = Image::new(2, 2).unwrap();
        let b = Image::new(3, 2).unwrap();
        assert_eq!(
            a.mean_squared_error(&b),
            Err(Error::DimensionMismatch { width: 3, height: 2 })
        );
    }

    #[test]
    fn test_gray_image_round_trip() {
        let img = Image::from_raw(2, 2, vec![0, 85, 170, 255]).unwrap();
        let gray = img.to_gray_image();
        assert_eq!(gray.into_raw(), img.data);
    }
}
