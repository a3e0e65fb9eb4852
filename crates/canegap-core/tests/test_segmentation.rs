mod common;

use std::sync::Arc;

use canegap_core::error::CanegapError;
use canegap_core::pipeline::{segment, segment_reported, PipelineStage};
use canegap_core::segmentation::{Connectivity, SegmentationConfig, ThresholdMethod, VegetationIndex};

use common::{
    binary_row_scene, black_frame, field_scene, frame_from_mask, noise_mask, plants_frame, single_row_scene,
    RecordingReporter,
};

/// Classify the grayscale value directly so the foreground equals the mask.
fn exact_mask_config() -> SegmentationConfig {
    SegmentationConfig {
        normalize: false,
        index: VegetationIndex::Luminance,
        threshold_method: ThresholdMethod::Fixed(0.5),
        ..Default::default()
    }
}

#[test]
fn test_reference_scene_has_five_components() {
    let out = segment(&single_row_scene(), &SegmentationConfig::default()).unwrap();
    assert_eq!(out.components.len(), 5);
    assert_eq!(out.map.len(), 5);

    let xs: Vec<f64> = out.components.iter().map(|c| c.centroid.x).collect();
    assert_eq!(xs, vec![0.5, 10.5, 20.5, 40.5, 50.5]);
    for c in &out.components {
        assert_eq!(c.area, 4);
        assert_eq!(c.centroid.y, 4.5);
    }
}

#[test]
fn test_binary_scene_segments_with_default_config() {
    let out = segment(&binary_row_scene(), &SegmentationConfig::default()).unwrap();
    assert_eq!(out.components.len(), 5);

    let xs: Vec<f64> = out.components.iter().map(|c| c.centroid.x).collect();
    assert_eq!(xs, vec![0.5, 10.5, 20.5, 40.5, 50.5]);
    assert!(out.components.iter().all(|c| c.area == 4));
    out.map.validate().unwrap();
}

#[test]
fn test_partition_invariant_on_noise() {
    for seed in [1u64, 7, 42] {
        let mask = noise_mask(64, 48, seed, 0.35);
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let config = SegmentationConfig {
                connectivity,
                ..exact_mask_config()
            };
            let out = segment(&frame_from_mask(&mask), &config).unwrap();
            out.map.validate().unwrap();

            let mut counts = vec![0usize; out.map.len() + 1];
            for ((row, col), &fg) in mask.indexed_iter() {
                match out.map.component_at(col, row) {
                    Some(id) => {
                        assert!(fg, "background pixel ({col},{row}) labeled {id}");
                        let comp = out.map.component(id).expect("registered id");
                        assert!(comp.bbox.min_x <= col && col <= comp.bbox.max_x);
                        assert!(comp.bbox.min_y <= row && row <= comp.bbox.max_y);
                        counts[id as usize] += 1;
                    }
                    None => assert!(!fg, "foreground pixel ({col},{row}) unlabeled"),
                }
            }

            let total: usize = out.components.iter().map(|c| c.area).sum();
            assert_eq!(total, mask.iter().filter(|&&m| m).count());
            for c in &out.components {
                assert_eq!(counts[c.id as usize], c.area);
            }
        }
    }
}

#[test]
fn test_segmentation_is_deterministic() {
    let mask = noise_mask(40, 40, 99, 0.4);
    let image = frame_from_mask(&mask);
    let a = segment(&image, &exact_mask_config()).unwrap();
    let b = segment(&image, &exact_mask_config()).unwrap();
    assert_eq!(a.map.labels(), b.map.labels());
    assert_eq!(a.components, b.components);
}

#[test]
fn test_all_background_yields_no_components() {
    let out = segment(&black_frame(32, 16), &SegmentationConfig::default()).unwrap();
    assert!(out.components.is_empty());
    assert!(out.map.is_empty());
    assert_eq!(out.map.foreground_pixels(), 0);
}

#[test]
fn test_uniform_vegetation_is_not_one_giant_plant() {
    let mut frame = black_frame(20, 20);
    frame.green.data.fill(0.8);
    let out = segment(&frame, &SegmentationConfig::default()).unwrap();
    assert!(out.components.is_empty());
}

#[test]
fn test_plants_separate_from_brown_soil() {
    let mut frame = plants_frame(60, 20, &[(5, 5), (25, 5), (45, 5)], 4);
    for row in 0..20 {
        for col in 0..60 {
            if frame.green.data[[row, col]] == 0.0 {
                frame.red.data[[row, col]] = 0.45;
                frame.green.data[[row, col]] = 0.35;
                frame.blue.data[[row, col]] = 0.25;
            }
        }
    }
    let out = segment(&frame, &SegmentationConfig::default()).unwrap();
    assert_eq!(out.components.len(), 3);
    assert!(out.components.iter().all(|c| c.area == 16));
}

#[test]
fn test_min_area_and_opening_remove_specks() {
    let mut frame = plants_frame(40, 20, &[(5, 5), (25, 5)], 5);
    common::paint_plant(&mut frame, 18, 15, 1);

    let keep_all = segment(&frame, &SegmentationConfig::default()).unwrap();
    assert_eq!(keep_all.components.len(), 3);

    let by_area = SegmentationConfig {
        min_area: 2,
        ..Default::default()
    };
    assert_eq!(segment(&frame, &by_area).unwrap().components.len(), 2);

    let by_opening = SegmentationConfig {
        opening_radius: 1,
        ..Default::default()
    };
    let opened = segment(&frame, &by_opening).unwrap();
    assert_eq!(opened.components.len(), 2);
    assert!(opened.components.iter().all(|c| c.area == 25));
}

#[test]
fn test_returned_image_is_the_map_source() {
    let out = segment(&single_row_scene(), &SegmentationConfig::default()).unwrap();
    assert!(Arc::ptr_eq(&out.image, out.map.source()));
    assert_eq!(out.map.dimensions(), (100, 10));
}

#[test]
fn test_invalid_config_is_rejected_before_work() {
    let image = single_row_scene();
    let bad = [
        SegmentationConfig {
            threshold_method: ThresholdMethod::Fixed(1.5),
            ..Default::default()
        },
        SegmentationConfig {
            min_area: 0,
            ..Default::default()
        },
        SegmentationConfig {
            low_percentile: 0.9,
            high_percentile: 0.1,
            ..Default::default()
        },
    ];
    for config in bad {
        assert!(matches!(
            segment(&image, &config),
            Err(CanegapError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_empty_image_is_invalid_dimensions() {
    let result = segment(&black_frame(0, 0), &SegmentationConfig::default());
    assert!(matches!(result, Err(CanegapError::InvalidDimensions { .. })));
}

#[test]
fn test_labeling_reports_progress_per_row() {
    let reporter = Arc::new(RecordingReporter::default());
    let image = field_scene(50, 30, &[(5, vec![0, 10, 20]), (20, vec![0, 10])], 3);
    segment_reported(&image, &SegmentationConfig::default(), reporter.clone()).unwrap();

    let stages = reporter.stages.lock().unwrap().clone();
    assert!(stages.contains(&(PipelineStage::Labeling, Some(30))));
    assert_eq!(*reporter.advances.lock().unwrap(), 30);
}

#[test]
fn test_labeling_can_be_cancelled() {
    let reporter = Arc::new(RecordingReporter {
        cancel: true,
        ..Default::default()
    });
    let result = segment_reported(&single_row_scene(), &SegmentationConfig::default(), reporter);
    assert!(matches!(result, Err(CanegapError::Cancelled)));
}
