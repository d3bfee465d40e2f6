use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.clamp(FrameIndex(9)), FrameIndex(4));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_rounds_to_nearest_frame() {
    let fps = Fps::new(15, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(0.5), 8);
    assert_eq!(fps.secs_to_frames_round(0.45), 7);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn color_hex_parsing() {
    assert_eq!(Color::from_hex("#95C05C").unwrap(), Color::LIGHT_GREEN);
    assert_eq!(Color::from_hex("ea337f").unwrap(), Color::PINK);
    let c = Color::from_hex("#4EADEA80").unwrap();
    assert_eq!(c.a, 0x80);
    assert!(Color::from_hex("#123").is_err());
    assert!(Color::from_hex("#zzzzzz").is_err());
}

#[test]
fn color_interpolation_hits_endpoints() {
    assert_eq!(Color::interpolate(Color::YELLOW, Color::BLUE, 0.0), Color::YELLOW);
    assert_eq!(Color::interpolate(Color::YELLOW, Color::BLUE, 1.0), Color::BLUE);
    let mid = Color::interpolate(Color::BLACK, Color::WHITE, 0.5);
    assert_eq!(mid.r, 128);
}

#[test]
fn premul_of_half_transparent_white() {
    let c = Color::WHITE.with_opacity(0.5);
    let p = Rgba8Premul::from_straight_rgba(c.r, c.g, c.b, c.a);
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let t = Transform2D::default();
    assert_eq!(t.to_affine(), Affine::IDENTITY);

    let t = Transform2D {
        translate: Vec2::new(10.0, -2.5),
        ..Transform2D::default()
    };
    assert_eq!(t.to_affine(), Affine::translate(Vec2::new(10.0, -2.5)));
}

#[test]
fn rotation_turns_about_the_anchor() {
    let t = Transform2D {
        rotation_rad: std::f64::consts::FRAC_PI_2,
        anchor: Vec2::new(1.0, 0.0),
        ..Transform2D::default()
    };
    let p = t.to_affine() * Point::new(2.0, 0.0);
    assert!((p.x - 1.0).abs() < 1e-12);
    assert!((p.y - 1.0).abs() < 1e-12);
}
