mod common;

use canegap_core::error::CanegapError;
use canegap_core::frame::CropRect;

use common::{black_frame, plants_frame};

#[test]
fn test_swap_channels_exchanges_red_and_blue() {
    let mut frame = black_frame(4, 4);
    frame.red.data[[1, 2]] = 0.9;
    frame.blue.data[[3, 0]] = 0.4;

    let swapped = frame.swap_channels();
    assert_eq!(swapped.blue.data[[1, 2]], 0.9);
    assert_eq!(swapped.red.data[[3, 0]], 0.4);
    assert_eq!(frame.red.data[[1, 2]], 0.9);
    assert_eq!(swapped.swap_channels().red.data, frame.red.data);
}

#[test]
fn test_crop_copies_region() {
    let frame = plants_frame(20, 10, &[(5, 3)], 2);
    let rect = CropRect {
        x: 4,
        y: 2,
        width: 6,
        height: 5,
    };
    let cropped = frame.crop(&rect).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (6, 5));
    assert_eq!(cropped.green.data[[1, 1]], 1.0);
    assert_eq!(cropped.green.data[[0, 0]], 0.0);
}

#[test]
fn test_crop_outside_image_fails() {
    let frame = black_frame(10, 10);
    let rect = CropRect {
        x: 8,
        y: 0,
        width: 5,
        height: 5,
    };
    assert!(matches!(frame.crop(&rect), Err(CanegapError::InvalidCrop(_))));

    let empty = CropRect {
        x: 0,
        y: 0,
        width: 0,
        height: 5,
    };
    assert!(matches!(frame.crop(&empty), Err(CanegapError::InvalidCrop(_))));
}

#[test]
fn test_crop_rect_parse() {
    let rect: CropRect = "10, 20,30,40".parse().unwrap();
    assert_eq!(
        rect,
        CropRect {
            x: 10,
            y: 20,
            width: 30,
            height: 40
        }
    );
    assert!("1,2,3".parse::<CropRect>().is_err());
    assert!("a,b,c,d".parse::<CropRect>().is_err());
}

#[test]
fn test_scaled_to_fit_keeps_aspect_and_averages() {
    let mut frame = black_frame(40, 20);
    frame.green.data.fill(0.5);
    let small = frame.scaled_to_fit(10);
    assert_eq!((small.width(), small.height()), (10, 5));
    assert!(small.green.data.iter().all(|&v| (v - 0.5).abs() < 1e-6));

    let same = frame.scaled_to_fit(100);
    assert_eq!((same.width(), same.height()), (40, 20));
}
