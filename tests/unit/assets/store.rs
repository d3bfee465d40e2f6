use std::io::Cursor;

use super::*;
use crate::{
    foundation::core::{Canvas, Color, Fps, Point},
    scene::{builder::SceneBuilder, model::LabelAsset},
};

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("larmor_store_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

fn builder() -> SceneBuilder {
    SceneBuilder::new(
        "store",
        Canvas {
            width: 160,
            height: 90,
        },
        Fps::new(10, 1).unwrap(),
    )
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("./a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn prepares_images_and_resolves_keys() {
    let root = temp_root("img");
    write_png(&root.join("brain.png"), 4, 2);

    let mut b = builder();
    let id = b.insert_image("brain", "brain.png", Point::ORIGIN, 2.0, 0);
    b.add([id]).unwrap();
    let scene = b.build().unwrap();

    let store = PreparedAssetStore::prepare(&scene, &root, None).unwrap();
    let asset_id = store.id_for_key("image:brain.png").unwrap();
    let PreparedAsset::Image(img) = store.get(asset_id).unwrap() else {
        panic!("expected image");
    };
    assert_eq!((img.width, img.height), (4, 2));
    assert!(store.font().is_none());
    assert!(store.id_for_key("missing").is_err());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_image_file_is_an_error() {
    let root = temp_root("missing");
    let mut b = builder();
    let id = b.insert_image("brain", "nope.png", Point::ORIGIN, 2.0, 0);
    b.add([id]).unwrap();
    let scene = b.build().unwrap();

    let err = PreparedAssetStore::prepare(&scene, &root, None).unwrap_err();
    assert!(format!("{err:#}").contains("nope.png"));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn asset_ids_are_stable() {
    let a = PreparedAssetStore::hash_id_for(
        "label:0",
        &Asset::Label(LabelAsset::math("x", Color::WHITE, 1.0)),
        120.0,
    );
    let b = PreparedAssetStore::hash_id_for(
        "label:0",
        &Asset::Label(LabelAsset::math("x", Color::WHITE, 1.0)),
        120.0,
    );
    let c = PreparedAssetStore::hash_id_for(
        "label:0",
        &Asset::Label(LabelAsset::math("x", Color::RED, 1.0)),
        120.0,
    );
    assert_eq!(a, b);
    assert_ne!(a, c);
}
