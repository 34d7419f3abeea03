use nalgebra::geometry::Point2;
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Circle { center, radius }
    }

    /// Strictly inside: points exactly on the circle are outside
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        distance(&self.center, p) < self.radius
    }

    /// Does the segment from `start` to `end` cross the circle, i.e. is exactly one end inside?
    pub fn is_crossed_by(&self, start: &Point2<f64>, end: &Point2<f64>) -> bool {
        self.contains(start) ^ self.contains(end)
    }

    pub fn point_at(&self, angle_degrees: f64) -> Point2<f64> {
        point_on_circle(&self.center, self.radius, angle_degrees)
    }
}

pub fn distance(p1: &Point2<f64>, p2: &Point2<f64>) -> f64 {
    (p2 - p1).norm()
}

/// Point on the circle of `radius` around `center`, at `angle_degrees` counter-clockwise from +x
pub fn point_on_circle(center: &Point2<f64>, radius: f64, angle_degrees: f64) -> Point2<f64> {
    let radians = angle_degrees.to_radians();
    center + Vector2::new(radius * radians.cos(), radius * radians.sin())
}

/// Polar angle of `p` around `center`, in degrees in (-180, 180]
pub fn angle_degrees(center: &Point2<f64>, p: &Point2<f64>) -> f64 {
    let v = p - center;
    v.y.atan2(v.x).to_degrees()
}

/// Wrap an angle into (-180, 180]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Point at `distance` from `from`, along the ray towards `towards`
pub fn point_towards(from: &Point2<f64>, towards: &Point2<f64>, distance: f64) -> Point2<f64> {
    let dir = towards - from;
    from + dir * (distance / dir.norm())
}

/// Reflect `p` across the line through `center` at `axis_degrees`
pub fn reflect(center: &Point2<f64>, p: &Point2<f64>, axis_degrees: f64) -> Point2<f64> {
    let r = distance(center, p);
    let mirrored = 2.0 * axis_degrees - angle_degrees(center, p);
    point_on_circle(center, r, mirrored)
}

/// Walk the polyline `points` and return where it first crosses `circle`, or `None` if no pair of
/// consecutive points has exactly one end inside it.
pub fn find_intersection(points: &[Point2<f64>], circle: &Circle) -> Option<Point2<f64>> {
    points
        .windows(2)
        .find(|pair| circle.is_crossed_by(&pair[0], &pair[1]))
        .map(|pair| segment_intersection(&pair[0], &pair[1], circle))
}

/// Where the segment from `start` to `end` meets `circle`. The caller guarantees the segment
/// crosses it.
///
/// The segment's line is written as `v = m*u + b` and substituted into the circle's equation,
/// giving a quadratic in `u`. `u` is x for shallow segments and y for steep ones, so `m` never
/// blows up, and vertical segments are just the `m = 0` case of the steep form.
fn segment_intersection(start: &Point2<f64>, end: &Point2<f64>, circle: &Circle) -> Point2<f64> {
    let d = end - start;
    if d.x.abs() >= d.y.abs() {
        let (x, y) = solve_line_circle(
            (start.x, start.y),
            (end.x, end.y),
            (circle.center.x, circle.center.y),
            circle.radius,
        );
        Point2::new(x, y)
    } else {
        let (y, x) = solve_line_circle(
            (start.y, start.x),
            (end.y, end.x),
            (circle.center.y, circle.center.x),
            circle.radius,
        );
        Point2::new(x, y)
    }
}

/// Solve `v = m*u + b` against `(u - cu)^2 + (v - cv)^2 = r^2`, in whichever axis order the
/// caller picked. Requires `u1 != u2`.
fn solve_line_circle(
    (u1, v1): (f64, f64),
    (u2, v2): (f64, f64),
    (cu, cv): (f64, f64),
    r: f64,
) -> (f64, f64) {
    let m = (v2 - v1) / (u2 - u1);
    let b1 = v1 - m * u1;

    // Terms of a*u^2 + b*u + c = 0
    let a = 1.0 + m * m;
    let b = 2.0 * (m * b1 - m * cv - cu);
    let c = cu * cu + b1 * b1 + cv * cv - r * r - 2.0 * b1 * cv;

    // A crossing segment always has real roots; clamp away rounding noise
    let sqrt_term = (b * b - 4.0 * a * c).max(0.0).sqrt();
    let mut u = (-b + sqrt_term) / (2.0 * a);
    // Make sure we have the root on our segment
    if u < u1.min(u2) || u > u1.max(u2) {
        u = (-b - sqrt_term) / (2.0 * a);
    }
    (u, m * u + b1)
}
