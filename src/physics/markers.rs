use crate::foundation::core::{Line, Point};
use crate::foundation::error::{LarmorError, LarmorResult};
use crate::physics::axes::AxisMapping;

/// Vertical lines at `times`, spanning a stack of axes from the top of the
/// first to the bottom of the last.
///
/// The x coordinate comes from the first mapping; the stack is assumed to share
/// its time mapping.
pub fn time_markers(times: &[f64], axes: &[AxisMapping]) -> LarmorResult<Vec<Line>> {
    let (Some(first), Some(last)) = (axes.first(), axes.last()) else {
        return Err(LarmorError::validation(
            "time markers need at least one axis mapping",
        ));
    };
    let top = first.origin().y + first.y_length / 2.0;
    let bottom = last.origin().y - last.y_length / 2.0;

    Ok(times
        .iter()
        .map(|&t| {
            let x = first.c2p(t, 0.0).x;
            Line::new(Point::new(x, top), Point::new(x, bottom))
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/physics/markers.rs"]
mod tests;
