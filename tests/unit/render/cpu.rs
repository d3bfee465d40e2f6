use super::*;
use crate::{
    compile::plan::{Layer, compile_frame},
    eval::evaluator::Evaluator,
    foundation::core::{Canvas, Color, Fps, FrameIndex, Rect},
    scene::builder::SceneBuilder,
    scene::model::{Scene, Style},
    shapes,
};

const W: u32 = 64;
const H: u32 = 36;

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn empty_scene() -> Scene {
    SceneBuilder::new(
        "cpu",
        Canvas {
            width: W,
            height: H,
        },
        Fps::new(10, 1).unwrap(),
    )
    .build()
    .unwrap()
}

fn square_plan(opacity: f32) -> RenderPlan {
    let world = Affine::scale(1.0);
    RenderPlan {
        canvas: Canvas {
            width: W,
            height: H,
        },
        background: Color::BLACK,
        layers: vec![Layer {
            opacity,
            ops: vec![DrawOp::FillPath {
                path: shapes::rectangle(Rect::new(16.0, 8.0, 48.0, 28.0)),
                transform: world,
                color: Color::rgb(255, 0, 0),
            }],
        }],
    }
}

#[test]
fn empty_plan_clears_to_background() {
    let scene = empty_scene();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let mut backend = CpuBackend::new(RenderSettings::default());
    let plan = RenderPlan {
        canvas: scene.canvas,
        background: Color::rgb(10, 20, 30),
        layers: Vec::new(),
    };
    let frame = backend.render_plan(&plan, &store).unwrap();
    assert_eq!(frame.data.len(), (W * H * 4) as usize);
    assert!(frame.premultiplied);
    assert_eq!(pixel(&frame, 0, 0), [10, 20, 30, 255]);
    assert_eq!(pixel(&frame, W - 1, H - 1), [10, 20, 30, 255]);
}

#[test]
fn clear_color_setting_overrides_background() {
    let scene = empty_scene();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let mut backend = CpuBackend::new(RenderSettings {
        clear_rgba: Some([0, 0, 255, 255]),
    });
    let plan = RenderPlan {
        canvas: scene.canvas,
        background: Color::WHITE,
        layers: Vec::new(),
    };
    let frame = backend.render_plan(&plan, &store).unwrap();
    assert_eq!(pixel(&frame, 5, 5), [0, 0, 255, 255]);
}

#[test]
fn filled_path_covers_its_interior_only() {
    let scene = empty_scene();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let mut backend = CpuBackend::new(RenderSettings::default());
    let frame = backend.render_plan(&square_plan(1.0), &store).unwrap();
    assert_eq!(pixel(&frame, 32, 18), [255, 0, 0, 255]);
    assert_eq!(pixel(&frame, 2, 2), [0, 0, 0, 255]);
}

#[test]
fn layer_opacity_blends_over_background() {
    let scene = empty_scene();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let mut backend = CpuBackend::new(RenderSettings::default());
    let frame = backend.render_plan(&square_plan(0.5), &store).unwrap();
    let [r, g, b, a] = pixel(&frame, 32, 18);
    assert!((120..=136).contains(&r), "r = {r}");
    assert_eq!((g, b, a), (0, 0, 255));
}

#[test]
fn compiled_scene_renders_the_same_twice() {
    let mut b = SceneBuilder::new(
        "cpu",
        Canvas {
            width: W,
            height: H,
        },
        Fps::new(10, 1).unwrap(),
    );
    let id = b.insert_path(
        "dot",
        shapes::circle(Point::ORIGIN, 1.0),
        Style::fill(Color::YELLOW),
    );
    b.add([id]).unwrap();
    let scene = b.build().unwrap();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let eval = Evaluator::eval_frame(&scene, FrameIndex(0)).unwrap();
    let plan = compile_frame(&scene, &eval, &store).unwrap();

    let mut backend = CpuBackend::new(RenderSettings::default());
    let a = backend.render_plan(&plan, &store).unwrap();
    let b = backend.render_plan(&plan, &store).unwrap();
    assert_eq!(a.data, b.data);
    assert_eq!(pixel(&a, W / 2, H / 2), [255, 255, 0, 255]);
}

#[test]
fn labels_without_a_font_are_rejected() {
    let scene = empty_scene();
    let store = PreparedAssetStore::prepare(&scene, ".", None).unwrap();
    let mut backend = CpuBackend::new(RenderSettings::default());
    assert!(backend.label_font(&store).is_err());
}
