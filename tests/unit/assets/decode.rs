use std::io::Cursor;

use super::*;

fn encode_png(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let decoded = decode_image(&encode_png(img)).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(decoded.rgba8, vec![100u8, 50, 200, 128]);
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(err.to_string().contains("decode image from memory"));
}

#[test]
fn decode_file_reports_codec_errors_with_path() {
    let dir = std::env::temp_dir().join(format!("layermerge_decode_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nnope").unwrap();

    match decode_file(&path).unwrap_err() {
        MergeError::Codec { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        decode_file(&dir.join("absent.png")).unwrap_err(),
        MergeError::Io { .. }
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn raster_checks_buffer_length() {
    assert!(RasterImage::new(2, 2, vec![0; 16]).is_ok());
    assert!(RasterImage::new(2, 2, vec![0; 15]).is_err());
}

#[test]
fn raster_pixel_and_row_addressing() {
    let mut data = vec![0u8; 3 * 2 * 4];
    // (x=2, y=1) in a 3-wide image is pixel 5.
    data[20..24].copy_from_slice(&[9, 8, 7, 6]);
    let img = RasterImage::new(3, 2, data).unwrap();
    assert_eq!(img.pixel(2, 1), Rgba8::new(9, 8, 7, 6));
    assert_eq!(img.row(1).len(), 12);
    assert_eq!(&img.row(1)[8..12], &[9, 8, 7, 6]);
}

#[test]
fn filled_raster_is_uniform() {
    let img = RasterImage::filled(2, 3, Rgba8::WHITE);
    assert_eq!(img.rgba8.len(), 24);
    assert!(img.rgba8.iter().all(|&b| b == 255));
    assert!(!img.is_empty());
    assert!(RasterImage::filled(0, 3, Rgba8::WHITE).is_empty());
}
