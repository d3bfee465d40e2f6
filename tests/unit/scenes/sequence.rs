use super::*;
use crate::{
    config::OutputFormat,
    foundation::core::{Canvas, Fps, FrameIndex},
    scene::model::{Element, Visual},
};

fn context() -> SceneContext {
    SceneContext::new(
        OutputFormat {
            canvas: Canvas {
                width: 160,
                height: 90,
            },
            fps: Fps::new(10, 1).unwrap(),
        },
        std::env::temp_dir(),
    )
}

fn named<'a>(scene: &'a Scene, name: &str) -> Vec<&'a Element> {
    let prefix = format!("{name}#");
    scene
        .elements
        .iter()
        .filter(|e| e.id.starts_with(&prefix))
        .collect()
}

#[test]
fn slice_selection_graph_is_a_static_white_slide() {
    let scene = slice_selection_graph(&context()).unwrap();
    assert_eq!(scene.duration, FrameIndex(1));
    assert_eq!(scene.background, Color::WHITE);
    assert_eq!(scene.elements.len(), 37);
    assert_eq!(named(&scene, "axes").len(), 2);
    assert_eq!(named(&scene, "band-dot").len(), 3);
    assert_eq!(named(&scene, "connector").len(), 3);
}

#[test]
fn band_fill_spans_the_selected_frequencies() {
    let scene = slice_selection_graph(&context()).unwrap();
    let fill = named(&scene, "rf-band-fill");
    let Visual::Path { path, .. } = &fill[0].visual else {
        panic!("expected a path");
    };
    let rf = AxisMapping::new(
        AxisRange::new(0.0, 5.0, 1.0).unwrap(),
        AxisRange::new(-1.2, 1.2, 0.5).unwrap(),
        3.0,
        1.8,
    )
    .unwrap()
    .centered_at(Point::new(0.0, -2.6));
    let bounds = kurbo::Shape::bounding_box(path);
    assert!((bounds.x0 - rf.c2p(2.0, 0.0).x).abs() < 1e-9);
    assert!((bounds.x1 - rf.c2p(3.0, 0.0).x).abs() < 1e-9);
    assert!((bounds.y1 - rf.c2p(0.0, 1.0).y).abs() < 1e-9);
}

#[test]
fn gre_sequence_draws_four_tracks() {
    let scene = gre_sequence(&context()).unwrap();
    assert_eq!(scene.duration, FrameIndex(110));
    assert_eq!(scene.background, Color::WHITE);
    assert_eq!(named(&scene, "track-axis").len(), 4);
    assert_eq!(named(&scene, "track-caption").len(), 3);
    assert_eq!(named(&scene, "time-marker").len(), 7);
    // Five main lobes plus five extra phase steps.
    assert_eq!(named(&scene, "gradient").len(), 10);
    assert_eq!(named(&scene, "rf-pulse").len(), 1);
    assert_eq!(named(&scene, "te-brace")[0].range.start, FrameIndex(65));
}

#[test]
fn kspace_traversal_adds_the_other_phase_steps_last() {
    let scene = kspace_traversal(&context()).unwrap();
    assert_eq!(scene.duration, FrameIndex(120));
    assert_eq!(named(&scene, "k-trace").len(), 8);
    assert_eq!(named(&scene, "gradient").len(), 7);
    let late: Vec<_> = scene
        .elements
        .iter()
        .filter(|e| e.range.start == FrameIndex(80))
        .collect();
    assert_eq!(late.len(), 8);
}

#[test]
fn epi_traversal_plays_one_line_per_lobe() {
    let scene = epi_traversal(&context()).unwrap();
    assert_eq!(scene.duration, FrameIndex(100));
    assert_eq!(named(&scene, "time-marker").len(), 10);
    // Two prephasers, ten lobes, nine blips.
    assert_eq!(named(&scene, "gradient").len(), 21);
    assert_eq!(named(&scene, "k-trace").len(), 22);

    let starts: Vec<u64> = named(&scene, "k-trace")
        .iter()
        .map(|e| e.range.start.0)
        .collect();
    for line in 0..10u64 {
        let at = 40 + line * 5;
        assert_eq!(starts.iter().filter(|&&s| s == at).count(), 2, "line {line}");
    }
}

#[test]
fn epi_ky_staircase_ends_at_the_top_line() {
    let last = EpiPlan::standard().ky_traces().unwrap().pop().unwrap();
    assert!((last.end_value() - 1.0).abs() < 1e-9);
}
