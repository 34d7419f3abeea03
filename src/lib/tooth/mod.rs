//! A single gear tooth, built from two involute flanks that are clipped by the pitch, outside and
//! root circles.
use nalgebra::geometry::Point2;
use nalgebra::Vector2;
use tracing::debug;

use crate::geometry::{angle_degrees, distance, find_intersection, normalize_degrees, Circle};
use crate::involute::sample;
use crate::params::{GearParameters, GearSpec, EDGE_TOLERANCE};
use crate::GearError;

#[derive(Clone, Debug, PartialEq)]
pub struct Tooth {
    /// Nominal angle the primary flank leaves the root from
    pub start_angle_degrees: f64,
    /// Where the primary flank actually crosses the pitch circle
    pub pitch_crossing_degrees: f64,
    /// The line the two flanks are mirrored across
    pub bisector_degrees: f64,
    /// Primary flank, from the root outward
    pub primary_points: Vec<Point2<f64>>,
    /// Opposite flank, from the root outward
    pub mirror_points: Vec<Point2<f64>>,
    /// Where the primary flank meets the root circle
    pub primary_root: Point2<f64>,
    /// Where the opposite flank meets the root circle
    pub mirror_root: Point2<f64>,
}

impl Tooth {
    pub fn all_points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.primary_points.iter().chain(self.mirror_points.iter())
    }

    /// Outermost point of the primary flank
    pub fn primary_tip(&self) -> Option<&Point2<f64>> {
        self.primary_points.last()
    }

    /// Outermost point of the opposite flank
    pub fn mirror_tip(&self) -> Option<&Point2<f64>> {
        self.mirror_points.last()
    }
}

/// Draw the tooth whose primary flank leaves the root circle at `start_angle_degrees`, using
/// involute curves and their intersections with the various circles.
///
/// The primary flank leans towards smaller angles as it rises. The opposite flank is placed so
/// that the two cross the pitch circle half a tooth spacing apart, which makes the tooth and the
/// gap after it equally wide at the pitch circle.
pub fn build_tooth(spec: &GearSpec, start_angle_degrees: f64) -> Result<Tooth, GearError> {
    let params = spec.params();
    let center = spec.center();
    let pitch = Circle::new(center, params.pitch_radius());
    let outside = Circle::new(center, params.outside_radius());
    let root = Circle::new(center, params.root_radius());

    let involute = sample(spec, start_angle_degrees, false);
    let mut primary = involute.clone();

    // Find where the involute crosses the pitch circle, then the outside circle
    let pitch_crossing =
        find_intersection(&involute, &pitch).ok_or(GearError::DegenerateIntersection {
            radius: pitch.radius,
        })?;
    primary.push(pitch_crossing);
    push_crossing(&mut primary, &involute, &outside);

    // The root end is placed by angle; the involute never reaches down there
    let primary_root = root.point_at(start_angle_degrees);
    primary.push(primary_root);

    // The involute bends away from its start angle, so correct for where it really crossed
    let pitch_crossing_degrees = angle_degrees(&center, &pitch_crossing);
    let delta = normalize_degrees(start_angle_degrees - pitch_crossing_degrees);

    let quarter_spacing = params.tooth_spacing_degrees() * 0.25;
    let bisector_degrees = pitch_crossing_degrees - quarter_spacing;
    let mirror_start = bisector_degrees - quarter_spacing - delta;

    let mirror_involute = sample(spec, mirror_start, true);
    let mut mirror = mirror_involute.clone();
    push_crossing(&mut mirror, &mirror_involute, &outside);
    push_crossing(&mut mirror, &mirror_involute, &pitch);
    let mirror_root = root.point_at(mirror_start);
    mirror.push(mirror_root);

    let primary_points = trim_at_bisector(
        clip_and_sort(params, &center, primary),
        &center,
        bisector_degrees,
        1.0,
    );
    let mirror_points = trim_at_bisector(
        clip_and_sort(params, &center, mirror),
        &center,
        bisector_degrees,
        -1.0,
    );

    Ok(Tooth {
        start_angle_degrees,
        pitch_crossing_degrees,
        bisector_degrees,
        primary_points,
        mirror_points,
        primary_root,
        mirror_root,
    })
}

fn push_crossing(points: &mut Vec<Point2<f64>>, curve: &[Point2<f64>], circle: &Circle) {
    match find_intersection(curve, circle) {
        Some(p) => points.push(p),
        None => debug!(radius = circle.radius, "involute does not cross circle"),
    }
}

/// Keep the points that lie on the tooth, innermost first
fn clip_and_sort(
    params: &GearParameters,
    center: &Point2<f64>,
    points: Vec<Point2<f64>>,
) -> Vec<Point2<f64>> {
    let mut kept: Vec<(f64, Point2<f64>)> = points
        .into_iter()
        .map(|p| (distance(center, &p), p))
        .filter(|(d, _)| is_on_tooth(params, *d))
        .collect();
    kept.sort_by(|a, b| a.0.total_cmp(&b.0));
    kept.into_iter().map(|(_, p)| p).collect()
}

/// Cut a flank off where it reaches the tooth's bisector, so the two flanks of a tooth that is
/// pointed at the outside circle meet in one tip instead of crossing. `side` is 1 for the primary
/// flank, which lies at larger angles than the bisector, and -1 for the opposite flank.
fn trim_at_bisector(
    mut points: Vec<Point2<f64>>,
    center: &Point2<f64>,
    bisector_degrees: f64,
    side: f64,
) -> Vec<Point2<f64>> {
    let b = bisector_degrees.to_radians();
    let normal = Vector2::new(-b.sin(), b.cos());
    let offset = |p: &Point2<f64>| side * normal.dot(&(p - center));

    if let Some(j) = points.iter().position(|p| offset(p) <= 0.0) {
        if j > 0 {
            let (inner, outer) = (points[j - 1], points[j]);
            let (fi, fo) = (offset(&inner), offset(&outer));
            let tip = inner + (outer - inner) * (fi / (fi - fo));
            debug!(bisector_degrees, "flank trimmed at the bisector");
            points.truncate(j);
            points.push(tip);
        }
    }
    points
}

/// Is a point `d` from the center between the root and outside circles? A band of 1% of each
/// radius is let through, to absorb the error of the discretized curve at the clip boundaries.
pub fn is_on_tooth(params: &GearParameters, d: f64) -> bool {
    let outer = params.outside_radius();
    let inner = params.root_radius();

    let outer_ok = d <= outer || (d - outer).abs() <= outer * EDGE_TOLERANCE;
    let inner_ok = d >= inner || (d - inner).abs() <= inner * EDGE_TOLERANCE;

    inner_ok && outer_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::reflect;
    use approx::assert_relative_eq;

    fn spec() -> GearSpec {
        GearSpec::new(8, 200.0, 27.0).unwrap()
    }

    fn distances(center: &Point2<f64>, points: &[Point2<f64>]) -> Vec<f64> {
        points.iter().map(|p| distance(center, p)).collect()
    }

    #[test]
    fn test_tolerance_band() {
        let p = *spec().params();
        let outer = p.outside_radius();
        let inner = p.root_radius();
        assert!(is_on_tooth(&p, outer));
        assert!(is_on_tooth(&p, outer * 1.005));
        assert!(is_on_tooth(&p, outer * 1.009));
        assert!(!is_on_tooth(&p, outer * 1.011));
        assert!(is_on_tooth(&p, inner));
        assert!(is_on_tooth(&p, inner * 0.995));
        assert!(!is_on_tooth(&p, inner * 0.98));
        assert!(!is_on_tooth(&p, 0.0));
    }

    #[test]
    fn test_flanks_sorted_from_root_outward() {
        let spec = spec();
        let tooth = build_tooth(&spec, 0.0).unwrap();
        for flank in &[&tooth.primary_points, &tooth.mirror_points] {
            let d = distances(&spec.center(), flank);
            assert!(d.windows(2).all(|w| w[0] <= w[1]));
            assert_relative_eq!(d[0], spec.params().root_radius(), epsilon = 1e-9);
            assert!(d[d.len() - 1] <= spec.params().outside_radius() * 1.01);
        }
        assert_eq!(tooth.primary_points[0], tooth.primary_root);
        assert_eq!(tooth.mirror_points[0], tooth.mirror_root);
    }

    #[test]
    fn test_flanks_hit_pitch_and_outside_circles() {
        let spec = spec();
        let tooth = build_tooth(&spec, 0.0).unwrap();
        for flank in &[&tooth.primary_points, &tooth.mirror_points] {
            let d = distances(&spec.center(), flank);
            for radius in &[spec.params().pitch_radius(), spec.params().outside_radius()] {
                assert!(d.iter().any(|x| (x - radius).abs() < 1e-6));
            }
        }
    }

    #[test]
    fn test_pitch_crossings_half_a_spacing_apart() {
        let spec = spec();
        let tooth = build_tooth(&spec, 0.0).unwrap();
        let center = spec.center();
        let pitch = spec.params().pitch_radius();
        let crossing = |flank: &[Point2<f64>]| {
            let p = flank
                .iter()
                .find(|p| (distance(&center, p) - pitch).abs() < 1e-6)
                .unwrap();
            angle_degrees(&center, p)
        };
        let primary = crossing(&tooth.primary_points);
        let mirror = crossing(&tooth.mirror_points);
        assert_relative_eq!(primary, tooth.pitch_crossing_degrees, epsilon = 1e-9);
        assert_relative_eq!(primary - mirror, 22.5, epsilon = 1e-6);
        assert_relative_eq!(tooth.bisector_degrees, primary - 11.25, epsilon = 1e-9);
    }

    #[test]
    fn test_pitch_crossing_close_to_true_involute() {
        // A true involute crosses the pitch circle inv(pressure angle) = tan a - a from its start
        let spec = spec();
        let tooth = build_tooth(&spec, 0.0).unwrap();
        let a = spec.params().pressure_angle_radians();
        let inv = (a.tan() - a).to_degrees();
        assert!((tooth.pitch_crossing_degrees + inv).abs() < 0.1);
    }

    #[test]
    fn test_mirror_flank_is_reflection_of_primary() {
        let spec = spec();
        for &start in &[0.0, 45.0, 170.0, 200.0, 315.0] {
            let tooth = build_tooth(&spec, start).unwrap();
            assert_eq!(tooth.primary_points.len(), tooth.mirror_points.len());
            for (p, m) in tooth.primary_points.iter().zip(&tooth.mirror_points) {
                let reflected = reflect(&spec.center(), p, tooth.bisector_degrees);
                assert!((reflected - m).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_rotating_start_rotates_tooth() {
        let spec = spec();
        let a = build_tooth(&spec, 0.0).unwrap();
        let b = build_tooth(&spec, 90.0).unwrap();
        assert_relative_eq!(
            normalize_degrees(b.pitch_crossing_degrees - a.pitch_crossing_degrees),
            90.0,
            epsilon = 1e-9
        );
        assert_eq!(a.primary_points.len(), b.primary_points.len());
    }

    #[test]
    fn test_nearly_pointed_flanks_meet_at_bisector() {
        // The exact flanks still leave a sliver of top land here, but the sampled ones would cross
        let spec = GearSpec::new(9, 100.0, 33.5).unwrap();
        let tooth = build_tooth(&spec, 0.0).unwrap();
        let primary_tip = tooth.primary_tip().unwrap();
        let mirror_tip = tooth.mirror_tip().unwrap();
        assert!((primary_tip - mirror_tip).norm() < 1e-9);
        assert_relative_eq!(
            angle_degrees(&spec.center(), primary_tip),
            tooth.bisector_degrees,
            epsilon = 1e-9
        );
        assert!(distance(&spec.center(), primary_tip) <= spec.params().outside_radius());
        // Nothing on either flank strays past the bisector
        for p in &tooth.primary_points {
            assert!(angle_degrees(&spec.center(), p) >= tooth.bisector_degrees - 1e-9);
        }
        for p in &tooth.mirror_points {
            assert!(angle_degrees(&spec.center(), p) <= tooth.bisector_degrees + 1e-9);
        }
        assert_eq!(tooth.primary_points.len(), tooth.mirror_points.len());
    }

    #[test]
    fn test_all_points() {
        let tooth = build_tooth(&spec(), 0.0).unwrap();
        assert_eq!(
            tooth.all_points().count(),
            tooth.primary_points.len() + tooth.mirror_points.len()
        );
        assert!(tooth.primary_tip().is_some());
        assert!(tooth.mirror_tip().is_some());
    }
}
