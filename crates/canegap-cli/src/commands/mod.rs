pub mod config;
pub mod run;
pub mod segment;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use canegap_core::frame::{ColorFrame, CropRect};
use canegap_core::io::image_io::load_color_image;
use canegap_core::pipeline::PipelineConfig;
use canegap_core::segmentation::{Connectivity, SegmentationConfig, ThresholdMethod, VegetationIndex};

#[derive(Clone, Copy, ValueEnum)]
pub enum ThresholdArg {
    Otsu,
    MeanSigma,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum IndexArg {
    /// Excess green on colour images, luminance on gray ones
    Auto,
    /// Excess green on chromatic coordinates
    Exg,
    Green,
    Luminance,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConnectivityArg {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

/// Options shared by every command that loads and segments an image.
#[derive(Args)]
pub struct SegmentationArgs {
    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Automatic threshold method
    #[arg(long, value_enum)]
    pub threshold: Option<ThresholdArg>,

    /// Fixed vegetation-index threshold in [0, 1] (overrides --threshold)
    #[arg(long)]
    pub fixed_threshold: Option<f32>,

    /// Sigma multiplier for the mean-sigma threshold
    #[arg(long)]
    pub sigma: Option<f32>,

    /// Vegetation index used to score pixels
    #[arg(long, value_enum)]
    pub index: Option<IndexArg>,

    /// Pixel connectivity for component labeling
    #[arg(long, value_enum)]
    pub connectivity: Option<ConnectivityArg>,

    /// Drop components smaller than this many pixels
    #[arg(long)]
    pub min_area: Option<usize>,

    /// Radius of the morphological opening applied to the mask (0 disables)
    #[arg(long)]
    pub opening: Option<usize>,

    /// Skip the percentile stretch before classification
    #[arg(long)]
    pub no_normalize: bool,

    /// Input is stored as BGR
    #[arg(long)]
    pub swap_channels: bool,

    /// Process only this region: x,y,width,height
    #[arg(long)]
    pub crop: Option<CropRect>,

    /// Directory for output files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl SegmentationArgs {
    /// Read the config file if one was given, otherwise start from defaults.
    pub fn load_config(&self) -> Result<PipelineConfig> {
        match self.config {
            Some(ref path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                toml::from_str(&contents).context("Invalid pipeline config")
            }
            None => Ok(PipelineConfig::default()),
        }
    }

    /// Apply command-line overrides on top of the file/default config.
    pub fn apply(&self, config: &mut SegmentationConfig) {
        if let Some(method) = self.threshold {
            config.threshold_method = match method {
                ThresholdArg::Otsu => ThresholdMethod::Otsu,
                ThresholdArg::MeanSigma => ThresholdMethod::MeanPlusSigma,
            };
        }
        if let Some(t) = self.fixed_threshold {
            config.threshold_method = ThresholdMethod::Fixed(t);
        }
        if let Some(sigma) = self.sigma {
            config.sigma_multiplier = sigma;
        }
        if let Some(index) = self.index {
            config.index = match index {
                IndexArg::Auto => VegetationIndex::Auto,
                IndexArg::Exg => VegetationIndex::ExcessGreen,
                IndexArg::Green => VegetationIndex::Green,
                IndexArg::Luminance => VegetationIndex::Luminance,
            };
        }
        if let Some(c) = self.connectivity {
            config.connectivity = match c {
                ConnectivityArg::Four => Connectivity::Four,
                ConnectivityArg::Eight => Connectivity::Eight,
            };
        }
        if let Some(area) = self.min_area {
            config.min_area = area;
        }
        if let Some(radius) = self.opening {
            config.opening_radius = radius;
        }
        if self.no_normalize {
            config.normalize = false;
        }
    }

    /// Load an input image and apply channel swap and crop.
    pub fn load_image(&self, path: &Path) -> Result<ColorFrame> {
        let mut image = load_color_image(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        if self.swap_channels {
            image = image.swap_channels();
        }
        if let Some(ref rect) = self.crop {
            image = image
                .crop(rect)
                .with_context(|| format!("Failed to crop {}", path.display()))?;
        }
        Ok(image)
    }

    /// `<output_dir>/<stem>_<suffix>.png`
    pub fn output_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.output_dir.join(format!("{stem}_{suffix}"))
    }
}
