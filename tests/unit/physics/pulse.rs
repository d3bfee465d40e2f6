use super::*;
use crate::physics::axes::AxisRange;

fn gre_axis() -> AxisMapping {
    AxisMapping::new(
        AxisRange::new(0.0, 10.0, 1.0).unwrap(),
        AxisRange::new(-1.0, 1.0, 0.5).unwrap(),
        12.0,
        1.5,
    )
    .unwrap()
}

#[test]
fn gradient_rect_edges_follow_mapped_times() {
    let axis = gre_axis();
    let rect = GradientPulse::new(1.0, 2.0, 1.0).unwrap().rect(&axis);
    assert!((rect.x0 - axis.c2p(1.0, 0.0).x).abs() < 1e-12);
    assert!((rect.x1 - axis.c2p(3.0, 0.0).x).abs() < 1e-12);
    assert!((rect.width() - 2.4).abs() < 1e-12);
}

#[test]
fn gradient_rect_height_and_baseline() {
    let axis = gre_axis();
    let up = GradientPulse::new(4.25, 1.75, 1.0).unwrap().rect(&axis);
    let expected_h = (axis.c2p(0.0, 1.0).y - axis.c2p(0.0, 0.0).y).abs();
    assert!((up.height() - expected_h).abs() < 1e-12);
    assert!((up.y0 - axis.origin().y).abs() < 1e-12);

    let down = GradientPulse::new(4.25, 1.75, -0.5).unwrap().rect(&axis);
    assert!((down.y1 - axis.origin().y).abs() < 1e-12);
    assert!((down.height() - expected_h / 2.0).abs() < 1e-12);
}

#[test]
fn gradient_rejects_non_finite_amplitude() {
    assert!(GradientPulse::new(0.0, 1.0, f64::INFINITY).is_err());
    assert!(GradientPulse::new(0.0, -1.0, 1.0).is_err());
}

#[test]
fn fill_opacity_is_clamped() {
    let g = GradientPulse::new(0.0, 1.0, 1.0)
        .unwrap()
        .with_color(Color::PINK)
        .with_fill_opacity(3.0);
    assert_eq!(g.fill_opacity, 1.0);
    assert_eq!(g.color, Color::PINK);
}

#[test]
fn readout_window_spans_point_eight() {
    let axis = gre_axis();
    let rect = readout_window(&axis, 6.0, 3.0);
    assert!((rect.center().y - axis.origin().y).abs() < 1e-12);
    assert!((rect.height() - 1.2).abs() < 1e-12);
    assert!((rect.width() - 3.6).abs() < 1e-12);
}

#[test]
fn rf_peak_is_amplitude_at_center() {
    let rf = RfPulse::new(1.0, 2.0, 1.0).unwrap();
    assert_eq!(rf.center(), 2.0);
    assert_eq!(rf.value_at(2.0), 1.0);

    // 101 samples over [1, 3] put a sample exactly on the center.
    let samples = rf.samples(101);
    let peak = samples.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
    assert!((peak - 1.0).abs() < 1e-12);
}

#[test]
fn rf_has_zeros_at_lobe_spacing() {
    let rf = RfPulse::new(0.0, 10.0, 2.0).unwrap();
    // width / 5 = 1.6 between zero crossings.
    assert!(rf.value_at(5.0 + 1.6).abs() < 1e-12);
    assert!(rf.value_at(5.0 - 3.2).abs() < 1e-12);
}

#[test]
fn rf_reference_density_and_curve() {
    let axis = gre_axis();
    let rf = RfPulse::new(1.0, 2.0, 1.0).unwrap();
    let pts = rf.points(&axis, DEFAULT_RF_SAMPLES);
    assert_eq!(pts.len(), 100);
    assert_eq!(pts[0], axis.c2p(1.0, rf.value_at(1.0)));
    assert_eq!(pts[99], axis.c2p(3.0, rf.value_at(3.0)));

    // One move plus one cubic per gap between samples.
    assert_eq!(rf.curve(&axis).elements().len(), 100);
}

#[test]
fn rf_rejects_empty_window() {
    assert!(RfPulse::new(1.0, 0.0, 1.0).is_err());
}
