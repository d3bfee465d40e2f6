use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn svg_is_rasterized_to_requested_height() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#ff0000"/></svg>"##;
    let img = rasterize_svg(svg, 40).unwrap();
    assert_eq!((img.width, img.height), (80, 40));
    let mid = ((20 * img.width + 40) * 4) as usize;
    assert_eq!(img.rgba8_premul[mid..mid + 4], [255, 0, 0, 255]);

    assert!(rasterize_svg(b"<svg", 40).is_err());
}

#[test]
fn image_size_reads_header_only() {
    let dir = std::env::temp_dir().join(format!("larmor_decode_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("size.png");
    std::fs::write(&path, png_bytes(7, 3, [0, 0, 0, 255])).unwrap();
    assert_eq!(image_size(&path).unwrap(), (7, 3));
    assert!(is_svg(Path::new("a/b.SVG")));
    assert!(!is_svg(&path));
    let _ = std::fs::remove_dir_all(&dir);
}
