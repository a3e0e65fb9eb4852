use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{CanegapError, Result};

/// A single image plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Copy out the region covered by `rect`. The rect must already be validated.
    fn cropped(&self, rect: &CropRect) -> Frame {
        let (x, y) = (rect.x as usize, rect.y as usize);
        let (w, h) = (rect.width as usize, rect.height as usize);
        let data = self.data.slice(s![y..y + h, x..x + w]).to_owned();
        Frame::new(data, self.original_bit_depth)
    }

    /// Box-filter resample to `(new_h, new_w)`. Each output pixel averages the
    /// source pixels it covers.
    fn resampled(&self, new_h: usize, new_w: usize) -> Frame {
        let (h, w) = self.data.dim();
        let mut out = Array2::<f32>::zeros((new_h, new_w));
        for row in 0..new_h {
            let r0 = row * h / new_h;
            let r1 = ((row + 1) * h / new_h).max(r0 + 1).min(h);
            for col in 0..new_w {
                let c0 = col * w / new_w;
                let c1 = ((col + 1) * w / new_w).max(c0 + 1).min(w);
                let block = self.data.slice(s![r0..r1, c0..c1]);
                out[[row, col]] = block.sum() / block.len() as f32;
            }
        }
        Frame::new(out, self.original_bit_depth)
    }
}

/// Color image composed of separate channel frames.
///
/// This is the pipeline's image type. Transforms never mutate in place; each
/// returns a fresh `ColorFrame`.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

impl ColorFrame {
    /// Build a color frame, checking that all planes share the same shape.
    pub fn from_planes(red: Frame, green: Frame, blue: Frame) -> Result<Self> {
        let dim = red.data.dim();
        if green.data.dim() != dim || blue.data.dim() != dim {
            return Err(CanegapError::InvalidDimensions {
                width: green.width().max(blue.width()) as u32,
                height: green.height().max(blue.height()) as u32,
            });
        }
        Ok(Self { red, green, blue })
    }

    /// A color frame with all three planes set to the same grayscale data.
    pub fn from_gray(gray: &Frame) -> Self {
        Self {
            red: gray.clone(),
            green: gray.clone(),
            blue: gray.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }

    /// Exchange the red and blue planes (BGR <-> RGB).
    pub fn swap_channels(&self) -> ColorFrame {
        ColorFrame {
            red: self.blue.clone(),
            green: self.green.clone(),
            blue: self.red.clone(),
        }
    }

    /// Copy out a rectangular region.
    pub fn crop(&self, rect: &CropRect) -> Result<ColorFrame> {
        let rect = rect.validated(self.width() as u32, self.height() as u32)?;
        Ok(ColorFrame {
            red: self.red.cropped(&rect),
            green: self.green.cropped(&rect),
            blue: self.blue.cropped(&rect),
        })
    }

    /// Downscale for display so that neither side exceeds `max_dim`.
    ///
    /// Returns an unchanged copy if the image already fits.
    pub fn scaled_to_fit(&self, max_dim: usize) -> ColorFrame {
        let (h, w) = (self.height(), self.width());
        let longest = h.max(w);
        if max_dim == 0 || longest <= max_dim {
            return self.clone();
        }
        let new_h = (h * max_dim / longest).max(1);
        let new_w = (w * max_dim / longest).max(1);
        ColorFrame {
            red: self.red.resampled(new_h, new_w),
            green: self.green.resampled(new_h, new_w),
            blue: self.blue.resampled(new_h, new_w),
        }
    }
}

/// A rectangle in image coordinates for cropping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Check the rect is non-empty and fits within the source dimensions.
    pub fn validated(&self, src_w: u32, src_h: u32) -> Result<CropRect> {
        if self.width == 0 || self.height == 0 {
            return Err(CanegapError::InvalidCrop(
                "Crop width and height must be > 0".into(),
            ));
        }

        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= src_w && b <= src_h => Ok(self.clone()),
            _ => Err(CanegapError::InvalidCrop(format!(
                "Crop region ({},{} {}x{}) exceeds source dimensions ({src_w}x{src_h})",
                self.x, self.y, self.width, self.height
            ))),
        }
    }
}

impl std::str::FromStr for CropRect {
    type Err = CanegapError;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CanegapError::InvalidCrop(format!("{s:?}: {e}")))?;
        match parts.as_slice() {
            [x, y, width, height] => Ok(CropRect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => Err(CanegapError::InvalidCrop(format!(
                "{s:?}: expected x,y,width,height"
            ))),
        }
    }
}
