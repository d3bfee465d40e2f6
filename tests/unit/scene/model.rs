use super::*;
use crate::{animation::ease::Ease, foundation::core::Rect};

fn basic_scene() -> Scene {
    let mut assets = BTreeMap::new();
    assets.insert(
        "label:0".to_owned(),
        Asset::Label(LabelAsset::math("B_0", Color::WHITE, 0.7)),
    );
    assets.insert(
        "image:brain.png".to_owned(),
        Asset::Image(ImageAsset {
            source: "brain.png".to_owned(),
        }),
    );

    Scene {
        name: "basic".to_owned(),
        camera: Camera::default(),
        canvas: Canvas {
            width: 160,
            height: 90,
        },
        fps: Fps::new(15, 1).unwrap(),
        duration: FrameIndex(30),
        background: Color::BLACK,
        assets,
        elements: vec![
            Element {
                id: "box".to_owned(),
                z: 0,
                range: FrameRange::new(FrameIndex(0), FrameIndex(30)).unwrap(),
                visual: Visual::Path {
                    path: crate::shapes::rectangle(Rect::new(-1.0, -1.0, 1.0, 1.0)),
                    style: Style::stroke(Color::WHITE, 0.04),
                },
                props: ElementProps {
                    opacity: Anim::keyframes([(0, 0.0, Ease::Smooth), (15, 1.0, Ease::Smooth)]),
                    ..ElementProps::default()
                },
            },
            Element {
                id: "label".to_owned(),
                z: 1,
                range: FrameRange::new(FrameIndex(5), FrameIndex(20)).unwrap(),
                visual: Visual::Label {
                    asset: "label:0".to_owned(),
                    position: Point::new(0.0, 2.0),
                    anchor: Anchor::CENTER,
                },
                props: ElementProps::default(),
            },
            Element {
                id: "brain".to_owned(),
                z: 2,
                range: FrameRange::new(FrameIndex(0), FrameIndex(30)).unwrap(),
                visual: Visual::Image {
                    asset: "image:brain.png".to_owned(),
                    center: Point::ORIGIN,
                    height: 4.0,
                    quarter_turns: 1,
                },
                props: ElementProps::default(),
            },
        ],
    }
}

#[test]
fn json_roundtrip() {
    let scene = basic_scene();
    let s = serde_json::to_string_pretty(&scene).unwrap();
    let de: Scene = serde_json::from_str(&s).unwrap();
    de.validate().unwrap();
    assert_eq!(de.elements.len(), 3);
    assert_eq!(de.assets, scene.assets);
}

#[test]
fn validate_accepts_basic_scene() {
    basic_scene().validate().unwrap();
}

#[test]
fn validate_rejects_missing_asset() {
    let mut scene = basic_scene();
    scene.assets.remove("label:0");
    assert!(scene.validate().is_err());
}

#[test]
fn validate_rejects_wrong_asset_kind() {
    let mut scene = basic_scene();
    if let Visual::Label { asset, .. } = &mut scene.elements[1].visual {
        *asset = "image:brain.png".to_owned();
    }
    let err = scene.validate().unwrap_err().to_string();
    assert!(err.contains("wrong kind"));
}

#[test]
fn validate_rejects_out_of_bounds_range() {
    let mut scene = basic_scene();
    scene.elements[0].range = FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(31),
    };
    assert!(scene.validate().is_err());
}

#[test]
fn validate_rejects_bad_fps_and_empty_canvas() {
    let mut scene = basic_scene();
    scene.fps = Fps { num: 0, den: 1 };
    assert!(scene.validate().is_err());

    let mut scene = basic_scene();
    scene.canvas.width = 0;
    assert!(scene.validate().is_err());
}

#[test]
fn validate_rejects_empty_label() {
    let mut scene = basic_scene();
    scene.assets.insert(
        "label:0".to_owned(),
        Asset::Label(LabelAsset {
            parts: Vec::new(),
            size: 0.7,
            math: true,
        }),
    );
    assert!(scene.validate().is_err());
}

#[test]
fn camera_maps_origin_to_canvas_center_with_y_up() {
    let camera = Camera::default();
    let canvas = Canvas {
        width: 1920,
        height: 1080,
    };
    assert_eq!(camera.px_per_unit(canvas), 120.0);
    let m = camera.world_to_px(canvas);
    assert_eq!(m * Point::ORIGIN, Point::new(960.0, 540.0));
    assert_eq!(m * Point::new(8.0, 4.5), Point::new(1920.0, 0.0));
}

#[test]
fn camera_fits_wider_frames_without_distortion() {
    let camera = Camera {
        frame_width: 20.0,
        frame_height: 12.0,
    };
    let canvas = Canvas {
        width: 1920,
        height: 1080,
    };
    assert_eq!(camera.px_per_unit(canvas), 90.0);
}

#[test]
fn label_width_estimate_uses_rendered_characters() {
    let plain = LabelAsset::text("abcd", Color::WHITE, 1.0);
    let math = LabelAsset::math("\\omega_0", Color::WHITE, 1.0);
    assert!((plain.estimated_width() - 2.2).abs() < 1e-12);
    assert!((math.estimated_width() - 1.1).abs() < 1e-12);
}

#[test]
fn font_size_maps_to_scene_units() {
    assert!((em_for_font_size(48.0) - 0.7104).abs() < 1e-9);
}
