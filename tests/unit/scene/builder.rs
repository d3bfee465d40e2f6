use super::*;
use crate::{
    animation::anim::SampleCtx,
    scene::model::SpinVisual,
};

fn builder() -> SceneBuilder {
    SceneBuilder::new(
        "test",
        Canvas {
            width: 160,
            height: 90,
        },
        Fps::new(10, 1).unwrap(),
    )
}

fn square(b: &mut SceneBuilder) -> ElementId {
    b.insert_path(
        "square",
        shapes::rectangle(crate::foundation::core::Rect::new(0.0, 0.0, 1.0, 1.0)),
        Style::stroke(Color::WHITE, 0.04),
    )
}

fn spin(b: &mut SceneBuilder) -> ElementId {
    b.insert(
        "spin",
        Visual::Spin(SpinVisual {
            center: Point::ORIGIN,
            length: 0.5,
            tip_length: 0.1,
            stroke_width: 0.04,
            dot_radius: 0.08,
            orientation: [0.0, 1.0, 0.0],
            side: [1.0, 0.0, 0.0],
            rotations: Vec::new(),
            color: Color::WHITE,
            dot_color: Color::WHITE,
        }),
    )
}

fn at(el: &Element, frame: u64, fps: Fps) -> SampleCtx {
    SampleCtx {
        frame: FrameIndex(frame),
        fps,
        clip_local: FrameIndex(frame - el.range.start.0),
    }
}

#[test]
fn static_scene_lasts_one_frame() {
    let mut b = builder();
    let id = square(&mut b);
    b.add([id]).unwrap();
    let scene = b.build().unwrap();
    assert_eq!(scene.duration, FrameIndex(1));
    assert_eq!(scene.elements.len(), 1);
    assert_eq!(scene.elements[0].range.start, FrameIndex(0));
    assert_eq!(scene.elements[0].range.end, FrameIndex(1));
}

#[test]
fn play_and_wait_advance_the_cursor() {
    let mut b = builder();
    let id = square(&mut b);
    b.play(1.0, [Animation::FadeIn(id)]).unwrap();
    assert_eq!(b.cursor(), 10);
    b.wait(0.5);
    assert_eq!(b.cursor(), 15);
    let scene = b.build().unwrap();
    assert_eq!(scene.duration, FrameIndex(15));
}

#[test]
fn fade_in_then_fade_out_ramps_opacity_and_hides() {
    let mut b = builder();
    let id = square(&mut b);
    b.wait(1.0);
    b.play(1.0, [Animation::FadeIn(id)]).unwrap();
    b.wait(1.0);
    b.play(1.0, [Animation::FadeOut(id)]).unwrap();
    b.wait(1.0);
    let scene = b.build().unwrap();
    let fps = scene.fps;
    let el = &scene.elements[0];

    assert_eq!(el.range.start, FrameIndex(10));
    assert_eq!(el.range.end, FrameIndex(40));
    let op = |f| el.props.opacity.sample(at(el, f, fps)).unwrap();
    assert_eq!(op(10), 0.0);
    assert!((op(15) - 0.5).abs() < 1e-9);
    assert_eq!(op(25), 1.0);
    assert!(op(37) < 0.5);
}

#[test]
fn play_eased_overrides_the_default_ease() {
    let mut b = builder();
    let id = square(&mut b);
    b.play_eased(1.0, Ease::Linear, [Animation::FadeIn(id)])
        .unwrap();
    let scene = b.build().unwrap();
    let el = &scene.elements[0];
    let op = |f| el.props.opacity.sample(at(el, f, scene.fps)).unwrap();
    assert!((op(2) - 0.2).abs() < 1e-9);
    assert!((op(7) - 0.7).abs() < 1e-9);
}

#[test]
fn never_shown_elements_are_dropped() {
    let mut b = builder();
    let _hidden = square(&mut b);
    let shown = square(&mut b);
    b.add([shown]).unwrap();
    let scene = b.build().unwrap();
    assert_eq!(scene.elements.len(), 1);
    assert_eq!(scene.elements[0].z, 1);
}

#[test]
fn create_animates_reveal() {
    let mut b = builder();
    let id = square(&mut b);
    b.play(2.0, [Animation::Create(id)]).unwrap();
    let scene = b.build().unwrap();
    let el = &scene.elements[0];
    let reveal = |f| el.props.reveal.sample(at(el, f, scene.fps)).unwrap();
    assert_eq!(reveal(0), 0.0);
    assert!((reveal(10) - 0.5).abs() < 1e-9);
    assert_eq!(el.props.opacity.sample(at(el, 0, scene.fps)).unwrap(), 1.0);
}

#[test]
fn rotate_is_linear_by_default_and_requires_a_spin() {
    let mut b = builder();
    let s = spin(&mut b);
    let p = square(&mut b);
    b.play(
        1.0,
        [Animation::Rotate {
            target: s,
            axis: RotationAxis::Up,
            angle: 2.0,
        }],
    )
    .unwrap();
    let err = b
        .play(
            1.0,
            [Animation::Rotate {
                target: p,
                axis: RotationAxis::Out,
                angle: 1.0,
            }],
        )
        .unwrap_err();
    assert!(err.to_string().contains("not a spin"));

    let scene = b.build().unwrap();
    let el = &scene.elements[0];
    let Visual::Spin(spin) = &el.visual else {
        panic!("expected spin");
    };
    assert_eq!(spin.rotations.len(), 1);
    let angle = spin.rotations[0].angle.sample(at(el, 3, scene.fps)).unwrap();
    assert!((angle - 0.6).abs() < 1e-9);
}

#[test]
fn set_color_starts_from_the_current_color() {
    let mut b = builder();
    let s = spin(&mut b);
    b.add([s]).unwrap();
    b.play(1.0, [Animation::SetColor { target: s, color: Color::YELLOW }])
        .unwrap();
    b.play(1.0, [Animation::SetColor { target: s, color: Color::BLUE }])
        .unwrap();
    let scene = b.build().unwrap();
    let el = &scene.elements[0];
    let color = el.props.color.as_ref().unwrap();
    assert_eq!(color.sample(at(el, 0, scene.fps)).unwrap(), Color::WHITE);
    assert_eq!(color.sample(at(el, 10, scene.fps)).unwrap(), Color::YELLOW);
    assert!(color.sample(at(el, 19, scene.fps)).unwrap().b > 200);
}

#[test]
fn transform_crossfades_two_elements() {
    let mut b = builder();
    let a = square(&mut b);
    let c = square(&mut b);
    b.add([a]).unwrap();
    b.wait(1.0);
    b.play(1.0, [Animation::Transform { from: a, to: c }]).unwrap();
    b.wait(1.0);
    let scene = b.build().unwrap();
    assert_eq!(scene.elements[0].range.end, FrameIndex(20));
    assert_eq!(scene.elements[1].range.start, FrameIndex(10));
    assert_eq!(scene.elements[1].range.end, FrameIndex(30));
}

#[test]
fn removed_elements_cannot_return() {
    let mut b = builder();
    let a = square(&mut b);
    b.add([a]).unwrap();
    b.wait(1.0);
    b.remove([a]).unwrap();
    assert!(b.play(1.0, [Animation::FadeIn(a)]).is_err());
}

#[test]
fn flash_adds_transient_lines() {
    let mut b = builder();
    b.play(1.0, [Animation::flash(Point::ORIGIN, 1.0, Color::YELLOW)])
        .unwrap();
    b.wait(1.0);
    let scene = b.build().unwrap();
    assert_eq!(scene.elements.len(), FLASH_LINES);
    assert!(scene.elements.iter().all(|e| e.range.end == FrameIndex(10)));
}

#[test]
fn play_rejects_non_positive_run_time() {
    let mut b = builder();
    let a = square(&mut b);
    assert!(b.play(0.0, [Animation::FadeIn(a)]).is_err());
}

#[test]
fn image_assets_are_shared_by_source() {
    let mut b = builder();
    let k1 = b.image_asset("brain.png");
    let k2 = b.image_asset("brain.png");
    assert_eq!(k1, k2);
}
