use ndarray::{Array2, Zip};

use crate::consts::{
    CHROMA_EPSILON, EPSILON, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, PARALLEL_PIXEL_THRESHOLD,
};
use crate::frame::ColorFrame;

use super::config::VegetationIndex;

/// The concrete index `index` stands for on this image. `Auto` picks
/// excess green for colour images and luminance for gray ones, where every
/// pixel would otherwise score the same ExG.
pub fn resolve_index(color: &ColorFrame, index: VegetationIndex) -> VegetationIndex {
    match index {
        VegetationIndex::Auto if has_chroma(color) => VegetationIndex::ExcessGreen,
        VegetationIndex::Auto => VegetationIndex::Luminance,
        other => other,
    }
}

/// True if any pixel's channels differ by more than `CHROMA_EPSILON`.
pub fn has_chroma(color: &ColorFrame) -> bool {
    !Zip::from(&color.red.data)
        .and(&color.green.data)
        .and(&color.blue.data)
        .all(|&r, &g, &b| r.max(g).max(b) - r.min(g).min(b) <= CHROMA_EPSILON)
}

/// Compute the per-pixel vegetation index, scaled to [0, 1].
///
/// Large images are evaluated in parallel; the result is identical either way.
pub fn vegetation_index(color: &ColorFrame, index: VegetationIndex) -> Array2<f32> {
    let pixel_fn: fn(f32, f32, f32) -> f32 = match resolve_index(color, index) {
        VegetationIndex::Auto | VegetationIndex::ExcessGreen => excess_green,
        VegetationIndex::Green => green_only,
        VegetationIndex::Luminance => luminance,
    };

    let zip = Zip::from(&color.red.data)
        .and(&color.green.data)
        .and(&color.blue.data);

    if color.width() * color.height() >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(|&r, &g, &b| pixel_fn(r, g, b))
    } else {
        zip.map_collect(|&r, &g, &b| pixel_fn(r, g, b))
    }
}

/// ExG = 2g - r - b on chromatic coordinates, mapped from [-1, 2] to [0, 1].
/// Black pixels carry no chroma and score as neutral (ExG = 0).
fn excess_green(r: f32, g: f32, b: f32) -> f32 {
    let sum = r + g + b;
    let exg = if sum < EPSILON {
        0.0
    } else {
        (2.0 * g - r - b) / sum
    };
    ((exg + 1.0) / 3.0).clamp(0.0, 1.0)
}

fn green_only(_r: f32, g: f32, _b: f32) -> f32 {
    g.clamp(0.0, 1.0)
}

fn luminance(r: f32, g: f32, b: f32) -> f32 {
    (LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excess_green_orders_plant_above_soil() {
        let plant = excess_green(0.2, 0.7, 0.1);
        let soil = excess_green(0.5, 0.4, 0.3);
        let black = excess_green(0.0, 0.0, 0.0);
        assert!(plant > soil);
        assert!((black - 1.0 / 3.0).abs() < 1e-6);
        assert!((excess_green(0.0, 1.0, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn auto_uses_luminance_on_gray_images() {
        use crate::frame::Frame;

        let mut data = Array2::<f32>::zeros((3, 4));
        data[[1, 2]] = 1.0;
        let gray = ColorFrame::from_gray(&Frame::new(data, 8));
        assert!(!has_chroma(&gray));
        assert_eq!(resolve_index(&gray, VegetationIndex::Auto), VegetationIndex::Luminance);
        let index = vegetation_index(&gray, VegetationIndex::Auto);
        assert!((index[[1, 2]] - 1.0).abs() < 1e-6);
        assert_eq!(index[[0, 0]], 0.0);

        let mut colour = gray.clone();
        colour.green.data[[0, 0]] = 0.5;
        assert_eq!(resolve_index(&colour, VegetationIndex::Auto), VegetationIndex::ExcessGreen);
        assert_eq!(resolve_index(&colour, VegetationIndex::Green), VegetationIndex::Green);
    }
}
