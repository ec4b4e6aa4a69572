use std::io::Cursor;

use base64::Engine as _;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let img = decode_image(&png_bytes(2, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!((img.width, img.height), (2, 1));
    assert_eq!(&img.rgba8[..4], &[100, 50, 200, 128]);
}

#[test]
fn decode_garbage_is_a_resource_error() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, ThumbError::Resource(_)));
}

#[test]
fn base64_data_url_round_trips_through_decoder() {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, [1, 2, 3, 255]));
    let url = format!("data:image/png;base64,{b64}");
    assert!(is_data_url(&url));

    let img = FsImageLoader::default().load_image(&url).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
}

#[test]
fn data_url_without_comma_is_rejected() {
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(!is_data_url("images/bg.png"));
}

#[test]
fn fs_loader_resolves_relative_to_base_dir() {
    let dir = std::env::temp_dir().join(format!("thumbnail-maker-loader-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("bg.png"), png_bytes(4, 4, [9, 9, 9, 255])).unwrap();

    let loader = FsImageLoader::for_document(&dir.join("thumbnail.json"));
    assert_eq!(loader.resolve_path("bg.png"), dir.join("bg.png"));
    let img = loader.load_image("bg.png").unwrap();
    assert_eq!((img.width, img.height), (4, 4));

    let missing = loader.load_image("missing.png").unwrap_err();
    assert!(matches!(missing, ThumbError::Resource(_)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn buffer_size_mismatch_is_rejected() {
    assert!(LoadedImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(LoadedImage::from_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn fs_loader_locates_sources_as_absolute_file_urls() {
    let dir = std::env::temp_dir().join(format!("thumbnail-maker-locate-{}", std::process::id()));
    let loader = FsImageLoader::for_document(&dir.join("thumbnail.json"));

    let located = loader.locate("bg image.png");
    let expected = url::Url::from_file_path(dir.join("bg image.png")).unwrap();
    assert_eq!(located, expected.as_str());
    assert!(located.starts_with("file://"));
    assert!(located.ends_with("/bg%20image.png"));

    let data = "data:image/png;base64,AAAA";
    assert_eq!(loader.locate(data), data);
}
