use image::{Rgba, RgbaImage};
use instalock_capture::pixels::{to_rgba_image, PixelLayout};
use instalock_capture::{save_png, Error, FrameSource, ImageFileSource};

#[test]
fn bgra_rows_are_swizzled_and_stride_skipped() {
    // 2x2 image, stride 12 (4 bytes of padding per row)
    let raw = [
        1, 2, 3, 255, 4, 5, 6, 255, 0, 0, 0, 0, //
        7, 8, 9, 255, 10, 11, 12, 128, 0, 0, 0, 0,
    ];
    let img = to_rgba_image(&raw, 2, 2, 12, PixelLayout::Bgra).expect("convert");
    assert_eq!(*img.get_pixel(0, 0), Rgba([3, 2, 1, 255]));
    assert_eq!(*img.get_pixel(1, 0), Rgba([6, 5, 4, 255]));
    assert_eq!(*img.get_pixel(1, 1), Rgba([12, 11, 10, 128]));
}

#[test]
fn rgba_rows_are_copied_verbatim() {
    let raw = [10, 20, 30, 40, 50, 60, 70, 80];
    let img = to_rgba_image(&raw, 2, 1, 8, PixelLayout::Rgba).expect("convert");
    assert_eq!(img.into_raw(), raw.to_vec());
}

#[test]
fn truncated_buffer_is_rejected() {
    let raw = [0u8; 12];
    let result = to_rgba_image(&raw, 2, 2, 8, PixelLayout::Rgba);
    assert!(matches!(result, Err(Error::ScreenshotFailed(_))));
}

#[test]
fn narrow_stride_is_rejected() {
    let raw = [0u8; 64];
    let result = to_rgba_image(&raw, 4, 2, 8, PixelLayout::Rgba);
    assert!(matches!(result, Err(Error::ScreenshotFailed(_))));
}

#[test]
fn file_source_replays_saved_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("screen.png");
    let frame = RgbaImage::from_pixel(32, 18, Rgba([1, 2, 3, 255]));
    save_png(&frame, &path).expect("save");

    let mut source = ImageFileSource::new(&path);
    assert_eq!(source.resolution().expect("resolution"), (32, 18));
    let replay = source.capture().expect("capture");
    assert_eq!(*replay.get_pixel(5, 5), Rgba([1, 2, 3, 255]));
}

#[test]
fn file_source_reports_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut source = ImageFileSource::new(dir.path().join("nope.png"));
    assert!(matches!(source.capture(), Err(Error::Image { .. })));
}
