use canegap_core::error::CanegapError;
use canegap_core::pipeline::{PipelineConfig, PipelineStage, ProcessConfig};
use canegap_core::render::OverlayConfig;
use canegap_core::rows::{GapConfig, PercentageBase, RowConfig, ScaleReference};
use canegap_core::segmentation::{Connectivity, SegmentationConfig, ThresholdMethod, VegetationIndex};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_segmentation_defaults() {
    let c = SegmentationConfig::default();
    assert!(c.normalize);
    assert_eq!(c.index, VegetationIndex::Auto);
    assert_eq!(c.threshold_method, ThresholdMethod::Otsu);
    assert_eq!(c.connectivity, Connectivity::Eight);
    assert_eq!(c.min_area, 1);
    assert_eq!(c.opening_radius, 0);
}

#[test]
fn test_process_defaults() {
    let c = ProcessConfig::default();
    assert_eq!(c.rows.row_tolerance, None);
    assert_eq!(c.gaps.expected_spacing, None);
    assert_eq!(c.gaps.spacing_tolerance, 0.5);
    assert_eq!(c.metrics.scale_reference, ScaleReference::PlantSpacing);
    assert_eq!(c.metrics.percentage_base, PercentageBase::PlantedLength);
    assert!(c.validate().is_ok());
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[test]
fn test_display_strings() {
    assert_eq!(format!("{}", ThresholdMethod::Otsu), "Otsu");
    assert_eq!(format!("{}", ThresholdMethod::Fixed(0.25)), "Fixed (0.250)");
    assert_eq!(format!("{}", VegetationIndex::ExcessGreen), "Excess Green");
    assert_eq!(format!("{}", VegetationIndex::Auto), "Auto");
    assert_eq!(format!("{}", Connectivity::Four), "4-connected");
    assert_eq!(format!("{}", ScaleReference::RowSpacing), "Row spacing");
    assert_eq!(format!("{}", PipelineStage::Labeling), "Labeling components");
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_default_config_toml_roundtrip() {
    let config = PipelineConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: PipelineConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let text = r#"
[segmentation]
threshold_method = { Fixed = 0.4 }
connectivity = "Four"

[process.gaps]
expected_spacing = 12.5

[process.metrics]
scale_reference = "RowSpacing"
"#;
    let config: PipelineConfig = toml::from_str(text).unwrap();
    assert_eq!(config.segmentation.threshold_method, ThresholdMethod::Fixed(0.4));
    assert_eq!(config.segmentation.connectivity, Connectivity::Four);
    assert!(config.segmentation.normalize);
    assert_eq!(config.process.gaps.expected_spacing, Some(12.5));
    assert_eq!(config.process.gaps.spacing_tolerance, 0.5);
    assert_eq!(config.process.metrics.scale_reference, ScaleReference::RowSpacing);
    assert_eq!(config.process.overlay, OverlayConfig::default());
}

#[test]
fn test_empty_toml_is_default() {
    let config: PipelineConfig = toml::from_str("").unwrap();
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn test_json_roundtrip() {
    let config = PipelineConfig {
        process: ProcessConfig {
            rows: RowConfig {
                row_tolerance: Some(6.0),
            },
            ..Default::default()
        },
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_validation_errors() {
    let invalid = [
        PipelineConfig {
            process: ProcessConfig {
                rows: RowConfig {
                    row_tolerance: Some(0.0),
                },
                ..Default::default()
            },
            ..Default::default()
        },
        PipelineConfig {
            process: ProcessConfig {
                gaps: GapConfig {
                    expected_spacing: Some(-3.0),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        },
        PipelineConfig {
            process: ProcessConfig {
                overlay: OverlayConfig {
                    stroke_width: 0,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        },
        PipelineConfig {
            segmentation: SegmentationConfig {
                sigma_multiplier: f32::NAN,
                ..Default::default()
            },
            ..Default::default()
        },
    ];
    for config in invalid {
        assert!(matches!(config.validate(), Err(CanegapError::InvalidConfig(_))));
    }
}
