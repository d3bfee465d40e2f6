use std::path::{Path, PathBuf};

use super::*;
use crate::{
    config::OutputFormat,
    foundation::core::{Canvas, Fps},
    physics::spins::{GridAxis, GridSpec, RotationAxis},
};

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("larmor_layout_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 90, 255]))
        .save(path)
        .unwrap();
}

fn context(assets: &Path) -> SceneContext {
    SceneContext::new(
        OutputFormat {
            canvas: Canvas {
                width: 160,
                height: 90,
            },
            fps: Fps::new(10, 1).unwrap(),
        },
        assets,
    )
}

#[test]
fn track_stack_is_centered_with_even_spacing() {
    let stack = track_stack(4).unwrap();
    assert_eq!(stack.len(), 4);
    let centers: Vec<f64> = stack.iter().map(|m| m.origin().y).collect();
    assert!((centers[0] - 3.375).abs() < 1e-9);
    for pair in centers.windows(2) {
        assert!((pair[0] - pair[1] - (TRACK_HEIGHT + TRACK_SPACING)).abs() < 1e-9);
    }
    assert!(centers.iter().sum::<f64>().abs() < 1e-9);
    for m in &stack {
        assert!((m.c2p(0.0, 0.0).x - (TRACK_CENTER_X - TRACK_WIDTH / 2.0)).abs() < 1e-9);
        assert!((m.c2p(10.0, 0.0).x - (TRACK_CENTER_X + TRACK_WIDTH / 2.0)).abs() < 1e-9);
    }
}

#[test]
fn single_track_sits_on_the_center_line() {
    let stack = track_stack(1).unwrap();
    assert!(stack[0].origin().y.abs() < 1e-9);
}

#[test]
fn quarter_turn_swaps_the_footprint() {
    let root = temp_root("turn");
    write_png(&root.join("wide.png"), 200, 100);
    let ctx = context(&root);

    let upright = PlacedImage::fit_height(&ctx, "wide.png", 4.0, 0, Point::ORIGIN).unwrap();
    assert!((upright.width - 8.0).abs() < 1e-9);

    let turned = PlacedImage::fit_height(&ctx, "wide.png", 4.0, 1, Point::ORIGIN).unwrap();
    assert!((turned.width - 2.0).abs() < 1e-9);
    assert!((turned.height - 4.0).abs() < 1e-9);

    let mut b = ctx.builder("turn");
    let id = turned.insert(&mut b, "image");
    b.add([id]).unwrap();
    let scene = b.build().unwrap();
    match &scene.elements[0].visual {
        Visual::Image {
            height,
            quarter_turns,
            ..
        } => {
            // Heights are given before rotation.
            assert!((height - 2.0).abs() < 1e-9);
            assert_eq!(*quarter_turns, 1);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn with_top_moves_only_vertically() {
    let root = temp_root("top");
    write_png(&root.join("square.png"), 50, 50);
    let ctx = context(&root);
    let image = PlacedImage::fit_height(&ctx, "square.png", 2.0, 0, Point::new(3.0, 0.0))
        .unwrap()
        .with_top(1.0);
    assert_eq!(image.rect(), Rect::new(2.0, -1.0, 4.0, 1.0));
}

#[test]
fn missing_image_is_an_error() {
    let root = temp_root("missing");
    let ctx = context(&root);
    assert!(PlacedImage::fit_height(&ctx, "absent.png", 2.0, 0, Point::ORIGIN).is_err());
    assert!(PlacedImage::fit_height(&ctx, "../escape.png", 2.0, 0, Point::ORIGIN).is_err());
}

#[test]
fn spin_look_follows_the_glyph() {
    let mut glyph = SpinGlyph::new(0, 0, Point::new(1.0, 2.0), 1.0, 0.0);
    glyph.rotate(std::f64::consts::FRAC_PI_2, RotationAxis::Out);
    let Visual::Spin(spin) = SpinLook::standard(Color::PINK).visual(&glyph) else {
        panic!("expected a spin visual");
    };
    assert_eq!(spin.center, Point::new(1.0, 2.0));
    assert_eq!(spin.orientation, glyph.orientation);
    assert_eq!(spin.color, Color::PINK);
    assert_eq!(spin.dot_color, Color::WHITE);
    assert!(spin.rotations.is_empty());

    let small = SpinLook::small(Color::BLUE, 0.5);
    assert!((small.length - 0.25).abs() < 1e-12);
    assert!((small.dot_radius - 0.04).abs() < 1e-12);
}

#[test]
fn insert_spins_registers_one_element_per_glyph() {
    let root = temp_root("spins");
    let ctx = context(&root);
    let mut b = ctx.builder("spins");
    let mask = EllipticalMask::new(Point::ORIGIN, 100.0, 100.0, 1.0, 1.0).unwrap();
    let grid = SpinGrid::build(GridSpec::new(2, 3, Point::ORIGIN), &mask, 1.0, GridAxis::Cols);
    let spins = insert_spins(&mut b, &grid, |_| SpinLook::standard(Color::LIGHT_GREEN));
    assert_eq!(spins.len(), 6);
    b.add(spins.iter().map(|(id, _)| *id)).unwrap();
    let scene = b.build().unwrap();
    assert!(scene.elements.iter().all(|e| e.id.starts_with("spin#")));
}

#[test]
fn track_with_caption_has_three_elements() {
    let root = temp_root("track");
    let ctx = context(&root);
    let mut b = ctx.builder("track");
    let stack = track_stack(2).unwrap();
    let with = insert_track(
        &mut b,
        &stack[0],
        TrackLabel {
            name: "G_x",
            caption: Some("Frequency Encoding"),
            color: Color::LIGHT_BLUE,
        },
        Color::WHITE,
    );
    let without = insert_track(
        &mut b,
        &stack[1],
        TrackLabel {
            name: "RF",
            caption: None,
            color: Color::WHITE,
        },
        Color::WHITE,
    );
    assert_eq!(with.len(), 3);
    assert_eq!(without.len(), 2);
}

#[test]
fn markers_span_the_stack() {
    let root = temp_root("markers");
    let ctx = context(&root);
    let mut b = ctx.builder("markers");
    let stack = track_stack(3).unwrap();
    let ids = insert_markers(&mut b, &[1.0, 2.0], &stack, Color::WHITE).unwrap();
    assert_eq!(ids.len(), 2);
    assert!(insert_markers(&mut b, &[1.0], &[], Color::WHITE).is_err());
}
