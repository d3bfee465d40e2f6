use std::path::PathBuf;

use super::*;
use crate::{
    config::OutputFormat,
    foundation::core::{Canvas, Fps, FrameIndex},
    scene::model::Visual,
};

fn context(tag: &str) -> SceneContext {
    let dir: PathBuf =
        std::env::temp_dir().join(format!("larmor_kspace_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    for (name, w, h) in [(AXIAL, 360, 300), (SPECTRUM, 256, 256)] {
        image::RgbaImage::from_pixel(w, h, image::Rgba([200, 200, 200, 255]))
            .save(dir.join(name))
            .unwrap();
    }
    SceneContext::new(
        OutputFormat {
            canvas: Canvas {
                width: 160,
                height: 96,
            },
            fps: Fps::new(10, 1).unwrap(),
        },
        dir,
    )
}

#[test]
fn image_to_kspace_timeline() {
    let scene = image_to_kspace(&context("timeline")).unwrap();
    assert_eq!(scene.duration, FrameIndex(260));
    assert_eq!(scene.camera.frame_width, 20.0);
    assert_eq!(scene.camera.frame_height, 12.0);

    let flashes: Vec<_> = scene
        .elements
        .iter()
        .filter(|e| e.id.starts_with("flash#"))
        .collect();
    assert_eq!(flashes.len(), 30);
    assert!(
        flashes
            .iter()
            .all(|e| e.range.start == FrameIndex(95) && e.range.end == FrameIndex(110))
    );
}

#[test]
fn images_share_a_top_edge() {
    let scene = image_to_kspace(&context("images")).unwrap();
    let images: Vec<_> = scene
        .elements
        .iter()
        .filter_map(|e| match &e.visual {
            Visual::Image {
                center,
                height,
                quarter_turns,
                ..
            } => Some((*center, *height, *quarter_turns)),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 2);
    let (brain, brain_h, turns) = images[0];
    let (spectrum, spectrum_h, _) = images[1];
    assert_eq!(turns, 1);
    assert!(brain.x < 0.0 && spectrum.x > 0.0);
    // The turned image is given by its pre-rotation height, its on-screen width.
    let brain_screen_height = brain_h * 360.0 / 300.0;
    assert!((brain_screen_height - 5.0).abs() < 1e-9);
    assert!((spectrum_h - 5.0).abs() < 1e-9);
    assert!((brain.y - spectrum.y).abs() < 1e-9);
}

#[test]
fn missing_spectrum_fails() {
    let ctx = context("missing");
    std::fs::remove_file(ctx.assets_dir.join(SPECTRUM)).unwrap();
    assert!(image_to_kspace(&ctx).is_err());
}
