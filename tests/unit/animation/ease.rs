use super::*;

#[test]
fn all_eases_hit_endpoints() {
    for ease in [
        Ease::Linear,
        Ease::Smooth,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ] {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
    }
}

#[test]
fn smooth_is_symmetric_and_monotonic() {
    assert!((Ease::Smooth.apply(0.5) - 0.5).abs() < 1e-9);
    let a = Ease::Smooth.apply(0.25);
    let b = Ease::Smooth.apply(0.75);
    assert!((a + b - 1.0).abs() < 1e-9);

    let mut prev = 0.0;
    for i in 1..=100 {
        let v = Ease::Smooth.apply(f64::from(i) / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InQuad.apply(-1.0), 0.0);
    assert_eq!(Ease::InQuad.apply(2.0), 1.0);
}
