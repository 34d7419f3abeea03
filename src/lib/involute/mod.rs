//! Involute curves by tangent-line stepping.
//!
//! Drawing a gear: http://www.cartertools.com/involute.html
//! Walk around the base circle in FCB-sized steps. At each step draw the tangent to the base
//! circle, and measure off along it the length of base-circle arc unwound so far. The points
//! traced that way are those of a taut string unwound from the base circle.
use std::f64::consts::TAU;

use nalgebra::geometry::Point2;
use nalgebra::Vector2;

use crate::geometry::{point_on_circle, point_towards};
use crate::params::GearSpec;

/// Sample the involute that leaves the base circle at `start_angle_degrees`.
///
/// The curve unwinds clockwise, so it swings to smaller angles as it moves outward. With
/// `reverse` it unwinds counter-clockwise instead and is the mirror image of the forward curve,
/// not a rotated copy of it.
///
/// Points come back ordered from the base circle outward, and the last ones always lie beyond
/// the outside circle.
pub fn sample(spec: &GearSpec, start_angle_degrees: f64, reverse: bool) -> Vec<Point2<f64>> {
    let params = spec.params();
    let center = spec.center();
    let base_radius = params.base_radius();
    let step = params.involute_step_degrees();
    let direction = if reverse { -1.0 } else { 1.0 };

    (0..params.involute_sample_count())
        .map(|i| {
            let unwound_degrees = i as f64 * step;
            let point = point_on_circle(
                &center,
                base_radius,
                start_angle_degrees - unwound_degrees * direction,
            );

            // Find the tangent to the base circle at that point
            let v = center - point;
            let perpendicular = if reverse {
                Vector2::new(-v.y, v.x)
            } else {
                Vector2::new(v.y, -v.x)
            };
            let tangent_point = point + perpendicular;

            // Lay the unwound arc length off along the tangent
            let arc_length = TAU * base_radius * (unwound_degrees / 360.0);
            point_towards(&point, &tangent_point, arc_length)
        })
        .collect()
}
