use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::Array2;
use tracing::debug;

use crate::error::{CanegapError, Result};
use crate::frame::{ColorFrame, Frame};

/// Load an image file into a ColorFrame. Grayscale sources are replicated
/// into all three planes.
pub fn load_color_image(path: &Path) -> Result<ColorFrame> {
    let img = image::open(path)?;
    debug!(path = %path.display(), "Decoded image file");
    color_frame_from_dynamic(&img)
}

/// Decode an in-memory encoded image (PNG, JPEG, TIFF, ...) into a ColorFrame.
pub fn decode_color_image(bytes: &[u8]) -> Result<ColorFrame> {
    let img = image::load_from_memory(bytes)?;
    color_frame_from_dynamic(&img)
}

/// Convert a decoded image into planar f32 channels in [0, 1].
pub fn color_frame_from_dynamic(img: &DynamicImage) -> Result<ColorFrame> {
    let bit_depth: u8 = match img.color().bits_per_pixel() / u16::from(img.color().channel_count()) {
        d if d > 8 => 16,
        _ => 8,
    };
    let rgb = img.to_rgb16();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return Err(CanegapError::InvalidDimensions {
            width: w,
            height: h,
        });
    }

    let mut red = Array2::<f32>::zeros((h as usize, w as usize));
    let mut green = Array2::<f32>::zeros((h as usize, w as usize));
    let mut blue = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in rgb.enumerate_pixels() {
        let idx = [row as usize, col as usize];
        red[idx] = pixel.0[0] as f32 / 65535.0;
        green[idx] = pixel.0[1] as f32 / 65535.0;
        blue[idx] = pixel.0[2] as f32 / 65535.0;
    }

    Ok(ColorFrame {
        red: Frame::new(red, bit_depth),
        green: Frame::new(green, bit_depth),
        blue: Frame::new(blue, bit_depth),
    })
}

/// Convert a ColorFrame to an 8-bit RGB buffer.
pub fn to_rgb8(color: &ColorFrame) -> RgbImage {
    let h = color.height();
    let w = color.width();

    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let r = (color.red.data[[row, col]].clamp(0.0, 1.0) * 255.0).round() as u8;
            let g = (color.green.data[[row, col]].clamp(0.0, 1.0) * 255.0).round() as u8;
            let b = (color.blue.data[[row, col]].clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
        }
    }
    img
}

/// Convert an 8-bit RGB buffer back into a ColorFrame.
pub fn from_rgb8(img: &RgbImage) -> ColorFrame {
    let (w, h) = img.dimensions();
    let mut red = Array2::<f32>::zeros((h as usize, w as usize));
    let mut green = Array2::<f32>::zeros((h as usize, w as usize));
    let mut blue = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in img.enumerate_pixels() {
        let idx = [row as usize, col as usize];
        red[idx] = pixel.0[0] as f32 / 255.0;
        green[idx] = pixel.0[1] as f32 / 255.0;
        blue[idx] = pixel.0[2] as f32 / 255.0;
    }

    ColorFrame {
        red: Frame::new(red, 8),
        green: Frame::new(green, 8),
        blue: Frame::new(blue, 8),
    }
}

/// Save a ColorFrame as 16-bit RGB TIFF.
pub fn save_color_tiff(color: &ColorFrame, path: &Path) -> Result<()> {
    let h = color.height();
    let w = color.width();

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for row in 0..h {
        for col in 0..w {
            for plane in [&color.red, &color.green, &color.blue] {
                pixels.push((plane.data[[row, col]].clamp(0.0, 1.0) * 65535.0) as u16);
            }
        }
    }

    let img = image::ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(CanegapError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        })?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a ColorFrame as 8-bit RGB PNG.
pub fn save_color_png(color: &ColorFrame, path: &Path) -> Result<()> {
    to_rgb8(color).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a ColorFrame, choosing format from file extension.
pub fn save_color_image(color: &ColorFrame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_color_tiff(color, path),
        _ => save_color_png(color, path),
    }
}

/// Save a binary foreground mask as an 8-bit PNG (foreground = white).
pub fn save_mask_png(mask: &Array2<bool>, path: &Path) -> Result<()> {
    let (h, w) = mask.dim();
    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &fg) in mask.indexed_iter() {
        img.put_pixel(col as u32, row as u32, Luma([if fg { 255 } else { 0 }]));
    }
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
