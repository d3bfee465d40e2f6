use super::*;

fn unit_mask() -> EllipticalMask {
    // Half-extents of 1 make normalized offsets equal raw offsets.
    EllipticalMask::new(Point::ORIGIN, 2.0, 2.0, 0.5, 1.0).unwrap()
}

#[test]
fn mask_boundary_is_excluded() {
    let mask = unit_mask();
    assert!(!mask.contains(Point::new(0.5, 0.0)));
    assert!(!mask.contains(Point::new(0.0, 1.0)));
    assert!(mask.contains(Point::new(0.499, 0.0)));
    assert!(!mask.contains(Point::new(0.501, 0.0)));
    assert!(mask.contains(Point::ORIGIN));
}

#[test]
fn mask_rejects_degenerate_extents() {
    assert!(EllipticalMask::new(Point::ORIGIN, 0.0, 1.0, 0.5, 0.5).is_err());
    assert!(EllipticalMask::new(Point::ORIGIN, 1.0, 1.0, 0.0, 0.5).is_err());
}

#[test]
fn gradient_factor_spans_minus_one_to_one() {
    assert_eq!(gradient_factor(0, 15), -1.0);
    assert_eq!(gradient_factor(7, 15), 0.0);
    assert_eq!(gradient_factor(14, 15), 1.0);
    assert_eq!(gradient_factor(0, 1), 0.0);
}

#[test]
fn grid_positions_are_centered() {
    let spec = GridSpec::new(15, 7, Point::new(1.0, 0.0));
    let mid = spec.position(7.0, 3.0);
    assert!((mid.x - 1.0).abs() < 1e-12);
    assert!(mid.y.abs() < 1e-12);
    let corner = spec.position(0.0, 0.0);
    assert!((corner.x - (1.0 - 2.4)).abs() < 1e-12);
    assert!((corner.y + 5.6).abs() < 1e-12);
}

#[test]
fn grid_keeps_only_masked_points_in_row_major_order() {
    let spec = GridSpec::new(15, 7, Point::ORIGIN);
    let mask = EllipticalMask::new(Point::ORIGIN, 5.0, 7.0, 0.7, 0.9).unwrap();
    let grid = SpinGrid::build(spec, &mask, 1.0, GridAxis::Rows);

    assert!(!grid.is_empty());
    assert!(grid.len() < 15 * 7);
    assert!(grid.glyphs.iter().all(|g| mask.contains(g.position)));
    assert!(
        grid.glyphs
            .windows(2)
            .all(|w| (w[0].row, w[0].col) < (w[1].row, w[1].col))
    );
    for g in &grid.glyphs {
        assert_eq!(g.gradient_factor, gradient_factor(g.row, 15));
    }
}

#[test]
fn in_plane_quarter_turn_points_left() {
    let mut g = SpinGlyph::new(0, 0, Point::ORIGIN, 1.0, 0.0);
    g.rotate(std::f64::consts::FRAC_PI_2, RotationAxis::Out);
    let d = g.direction();
    assert!((d.x + 1.0).abs() < 1e-12);
    assert!(d.y.abs() < 1e-12);
    assert!(!g.points_right());
}

#[test]
fn vertical_axis_rotation_foreshortens_horizontally() {
    let mut g = SpinGlyph::new(0, 0, Point::ORIGIN, 1.0, 0.0);
    g.rotate(std::f64::consts::FRAC_PI_6, RotationAxis::Out);
    g.rotate(std::f64::consts::FRAC_PI_2, RotationAxis::Up);
    let d = g.direction();
    // Edge-on: the horizontal component vanishes, the vertical one is kept.
    assert!(d.x.abs() < 1e-12);
    assert!((d.y - 30f64.to_radians().cos()).abs() < 1e-12);
}

#[test]
fn rotations_are_cumulative_and_order_dependent() {
    let base = SpinGlyph::new(0, 0, Point::ORIGIN, 1.0, 0.0);

    let mut a = base;
    a.rotate(0.3, RotationAxis::Out);
    a.rotate(0.4, RotationAxis::Out);
    let mut b = base;
    b.rotate(0.7, RotationAxis::Out);
    assert!((a.direction() - b.direction()).hypot() < 1e-12);
    assert!((a.phase_angle - 0.7).abs() < 1e-12);

    let mut c = base;
    c.rotate(0.5, RotationAxis::Out);
    c.rotate(1.0, RotationAxis::Up);
    let mut d = base;
    d.rotate(1.0, RotationAxis::Up);
    d.rotate(0.5, RotationAxis::Out);
    assert!((c.direction() - d.direction()).hypot() > 1e-3);
}

#[test]
fn precession_angle_adds_gradient() {
    let g = SpinGlyph::new(14, 0, Point::ORIGIN, 1.0, 1.0);
    assert!((g.precession_angle(0.5) - 1.5 * TAU).abs() < 1e-12);
    assert!((precession_angle(1.0, 3.0, 0.7) - 3.1 * TAU).abs() < 1e-9);
}

#[test]
fn rotate_each_uses_per_glyph_angle() {
    let spec = GridSpec::new(3, 1, Point::ORIGIN);
    let mask = EllipticalMask::new(Point::ORIGIN, 10.0, 10.0, 1.0, 1.0).unwrap();
    let mut grid = SpinGrid::build(spec, &mask, 1.0, GridAxis::Rows);
    grid.rotate_each(RotationAxis::Out, |g| g.gradient_factor);
    let phases: Vec<f64> = grid.glyphs.iter().map(|g| g.phase_angle).collect();
    assert_eq!(phases, vec![-1.0, 0.0, 1.0]);
}

#[test]
fn interleaved_rows_skip_originals() {
    let rows = interleaved_rows(5, 2);
    assert_eq!(rows.len(), 8);
    assert!((rows[0] - 1.0 / 3.0).abs() < 1e-12);
    assert!((rows[1] - 2.0 / 3.0).abs() < 1e-12);
    assert!((rows[2] - 4.0 / 3.0).abs() < 1e-12);
    assert!(rows.iter().all(|r| r.fract() != 0.0));
    assert!(interleaved_rows(0, 2).is_empty());
}

#[test]
fn spatial_phase_starts_at_quarter_turn() {
    assert!((spatial_phase(0.0, 5, 2.0) - PI / 2.0).abs() < 1e-12);
    assert!((spatial_phase(4.0, 5, 2.0) - (PI / 2.0 - 2.0 * TAU)).abs() < 1e-12);
}

#[test]
fn angle_color_runs_from_down_to_down() {
    let down = Vec2::new(0.0, -1.0);
    let up = Vec2::new(0.0, 1.0);
    assert_eq!(angle_color(up, Color::YELLOW, Color::BLUE), Color::interpolate(Color::YELLOW, Color::BLUE, 0.5));
    assert_eq!(angle_color(down, Color::YELLOW, Color::BLUE), Color::BLUE);
}
