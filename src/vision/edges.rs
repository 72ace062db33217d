//! Grayscale conversion and Sobel gradient magnitudes.

use image::RgbImage;

/// A dense row-major grid of `f32` values with the image's dimensions.
#[derive(Clone, Debug)]
pub struct Field {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Field {
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn row(&self, y: u32) -> &[f32] {
        let start = (y * self.width) as usize;
        &self.data[start..start + self.width as usize]
    }
}

/// Which derivative to take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gradient {
    /// d/dy: responds to horizontal structures
    Vertical,
    /// d/dx: responds to vertical structures
    Horizontal,
}

/// Luma using ITU-R BT.601: Y = 0.299*R + 0.587*G + 0.114*B
pub fn grayscale(img: &RgbImage) -> Field {
    let data = img
        .pixels()
        .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
        .collect();
    Field {
        width: img.width(),
        height: img.height(),
        data,
    }
}

/// Absolute 3x3 Sobel response. Borders replicate the nearest pixel.
pub fn sobel(gray: &Field, gradient: Gradient) -> Field {
    let (w, h) = (gray.width as i64, gray.height as i64);
    let at = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, w - 1) as u32;
        let cy = y.clamp(0, h - 1) as u32;
        gray.get(cx, cy)
    };

    let mut data = Vec::with_capacity(gray.data.len());
    for y in 0..h {
        for x in 0..w {
            let value = match gradient {
                Gradient::Vertical => {
                    (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                        - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1))
                }
                Gradient::Horizontal => {
                    (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                        - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1))
                }
            };
            data.push(value.abs());
        }
    }

    Field {
        width: gray.width,
        height: gray.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_grayscale_white_and_black() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([0, 0, 0]));
        let gray = grayscale(&img);
        assert!((gray.get(0, 0) - 255.0).abs() < 0.01);
        assert_eq!(gray.get(1, 0), 0.0);
    }

    #[test]
    fn test_sobel_horizontal_line_responds_above_and_below() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        for x in 0..10 {
            img.put_pixel(x, 5, Rgb([100, 100, 100]));
        }
        let edges = sobel(&grayscale(&img), Gradient::Vertical);

        assert!(edges.get(5, 4) > 100.0);
        assert!(edges.get(5, 6) > 100.0);
        assert_eq!(edges.get(5, 5), 0.0);
        assert_eq!(edges.get(5, 1), 0.0);

        let across = sobel(&grayscale(&img), Gradient::Horizontal);
        assert_eq!(across.get(5, 4), 0.0);
    }
}
