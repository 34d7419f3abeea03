//! Whole-gear outlines: teeth repeated around the circle and stitched into one closed contour.
use std::fmt;

use nalgebra::geometry::Point2;
use nalgebra::Vector2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::Circle;
use crate::params::{GearParameters, GearSpec, SweepDirection, ValleyStyle};
use crate::tooth::{build_tooth, Tooth};
use crate::GearError;

/// One step of a 2D path, in the spirit of SVG path data
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    /// Start a new sub-path
    MoveTo(Point2<f64>),
    LineTo(Point2<f64>),
    /// Circular arc from the current point to `to`
    ArcTo {
        to: Point2<f64>,
        center: Point2<f64>,
        radius: f64,
        large_arc: bool,
        sweep: SweepDirection,
    },
    /// Close the current sub-path
    Close,
}

impl PathCommand {
    /// The point the pen ends up at, if the command names one
    pub fn end_point(&self) -> Option<Point2<f64>> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::ArcTo { to, .. } => Some(*to),
            PathCommand::Close => None,
        }
    }
}

/// Reference circles a renderer may draw behind the gear
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircleRole {
    Pitch,
    Base,
    Root,
    Outside,
    Bore,
}

impl fmt::Display for CircleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircleRole::Pitch => "pitch",
            CircleRole::Base => "base",
            CircleRole::Root => "root",
            CircleRole::Outside => "outside",
            CircleRole::Bore => "bore",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GearOutline {
    params: GearParameters,
    center: Point2<f64>,
    bore_radius: Option<f64>,
    teeth: Vec<Tooth>,
    commands: Vec<PathCommand>,
}

impl GearOutline {
    pub fn params(&self) -> &GearParameters {
        &self.params
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    /// Teeth in order of increasing start angle
    pub fn teeth(&self) -> &[Tooth] {
        &self.teeth
    }

    /// The outer contour, followed by the bore if there is one
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Every point the path visits
    pub fn points(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.commands.iter().filter_map(PathCommand::end_point)
    }

    pub fn reference_circles(&self) -> Vec<(CircleRole, Circle)> {
        let mut circles = vec![
            (CircleRole::Pitch, self.params.pitch_radius()),
            (CircleRole::Base, self.params.base_radius()),
            (CircleRole::Root, self.params.root_radius()),
            (CircleRole::Outside, self.params.outside_radius()),
        ];
        if let Some(bore) = self.bore_radius {
            circles.push((CircleRole::Bore, bore));
        }
        circles
            .into_iter()
            .map(|(role, radius)| (role, Circle::new(self.center, radius)))
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Line,
    /// Along the root circle
    RootArc,
}

/// A closed contour, kept as a start point plus the edges that lead on from it, so it can be
/// emitted in either direction.
struct Contour {
    start: Point2<f64>,
    edges: Vec<(Edge, Point2<f64>)>,
}

impl Contour {
    fn new(start: Point2<f64>) -> Self {
        Contour {
            start,
            edges: Vec::new(),
        }
    }

    fn push(&mut self, edge: Edge, to: Point2<f64>) {
        self.edges.push((edge, to));
    }

    /// The contour is traced counter-clockwise; `Clockwise` walks the same edges backwards
    fn commands(&self, root: &Circle, sweep: SweepDirection) -> Vec<PathCommand> {
        let command = |edge: Edge, to: Point2<f64>| match edge {
            Edge::Line => PathCommand::LineTo(to),
            Edge::RootArc => PathCommand::ArcTo {
                to,
                center: root.center,
                radius: root.radius,
                large_arc: false,
                sweep,
            },
        };

        let mut commands = Vec::with_capacity(self.edges.len() + 2);
        commands.push(PathCommand::MoveTo(self.start));
        match sweep {
            SweepDirection::CounterClockwise => {
                commands.extend(self.edges.iter().map(|&(edge, to)| command(edge, to)));
            }
            SweepDirection::Clockwise => {
                // Each edge now ends where it used to begin
                for i in (0..self.edges.len()).rev() {
                    let to = if i == 0 {
                        self.start
                    } else {
                        self.edges[i - 1].1
                    };
                    commands.push(command(self.edges[i].0, to));
                }
            }
        }
        commands.push(PathCommand::Close);
        commands
    }
}

/// Build the outline of the gear described by `spec`.
///
/// Tooth `k` starts at `k * 360 / teeth` degrees. The contour climbs each tooth's opposite flank,
/// crosses the top land, comes down the primary flank, and then runs across the valley to the
/// next tooth, along the root circle or straight. The bore, if any, is a separate sub-path wound
/// the other way, so it comes out as a hole under both the even-odd and non-zero fill rules.
pub fn build_outline(spec: &GearSpec) -> Result<GearOutline, GearError> {
    let params = *spec.params();
    let center = spec.center();
    let spacing = params.tooth_spacing_degrees();

    debug!(
        teeth = params.teeth(),
        pitch_radius = params.pitch_radius(),
        base_radius = params.base_radius(),
        outside_radius = params.outside_radius(),
        root_radius = params.root_radius(),
        "building gear outline"
    );

    let teeth = (0..params.teeth())
        .map(|k| build_tooth(spec, k as f64 * spacing))
        .collect::<Result<Vec<_>, _>>()?;

    let valley = match spec.valley() {
        ValleyStyle::Arc => Edge::RootArc,
        ValleyStyle::Line => Edge::Line,
    };

    let mut contour = Contour::new(teeth[0].mirror_root);
    for (k, tooth) in teeth.iter().enumerate() {
        if k > 0 {
            // Connect the tooth to the previous one
            contour.push(valley, tooth.mirror_root);
        }
        for p in tooth.mirror_points.iter().skip(1) {
            contour.push(Edge::Line, *p);
        }
        // Top land, then down the primary flank to its root
        for p in tooth.primary_points.iter().rev() {
            contour.push(Edge::Line, *p);
        }
    }
    // Connect the last tooth back to the first
    contour.push(valley, teeth[0].mirror_root);

    let root = Circle::new(center, params.root_radius());
    let mut commands = contour.commands(&root, spec.sweep());

    let bore_radius = spec.bore_radius();
    if let Some(radius) = bore_radius {
        commands.extend(bore(center, radius, spec.sweep().reversed()));
    }

    debug!(
        teeth = teeth.len(),
        commands = commands.len(),
        "gear outline built"
    );

    Ok(GearOutline {
        params,
        center,
        bore_radius,
        teeth,
        commands,
    })
}

/// Build every outline in `specs`. Gears don't share anything, so with the `parallel` feature
/// they are built concurrently.
pub fn build_outlines(specs: &[GearSpec]) -> Vec<Result<GearOutline, GearError>> {
    #[cfg(feature = "parallel")]
    let outlines = specs.par_iter().map(build_outline).collect();
    #[cfg(not(feature = "parallel"))]
    let outlines = specs.iter().map(build_outline).collect();
    outlines
}

/// Full circle as two half arcs
fn bore(center: Point2<f64>, radius: f64, sweep: SweepDirection) -> Vec<PathCommand> {
    let right = center + Vector2::new(radius, 0.0);
    let left = center - Vector2::new(radius, 0.0);
    let arc = |to| PathCommand::ArcTo {
        to,
        center,
        radius,
        large_arc: false,
        sweep,
    };
    vec![
        PathCommand::MoveTo(right),
        arc(left),
        arc(right),
        PathCommand::Close,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{angle_degrees, distance, normalize_degrees};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn spec() -> GearSpec {
        GearSpec::new(8, 200.0, 27.0).unwrap()
    }

    /// Sub-paths of an outline, each as the list of points it visits
    fn sub_paths(commands: &[PathCommand]) -> Vec<Vec<Point2<f64>>> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        for c in commands {
            match c {
                PathCommand::Close => paths.push(std::mem::take(&mut current)),
                _ => current.extend(c.end_point()),
            }
        }
        paths
    }

    /// Twice the signed area of a closed polygon; positive when counter-clockwise
    fn signed_area(points: &[Point2<f64>]) -> f64 {
        points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum()
    }

    #[test]
    fn test_eight_tooth_gear() {
        let outline = build_outline(&spec()).unwrap();
        let p = outline.params();
        assert_relative_eq!(p.pitch_radius(), 100.0);
        assert_relative_eq!(p.base_radius(), 89.1, epsilon = 0.01);
        assert_relative_eq!(p.tooth_spacing_degrees(), 45.0);
        assert_eq!(outline.teeth().len(), 8);
        for tooth in outline.teeth() {
            assert_eq!(tooth.primary_points.len(), tooth.mirror_points.len());
        }
    }

    #[test]
    fn test_teeth_evenly_spaced() {
        let outline = build_outline(&GearSpec::new(7, 150.0, 20.0).unwrap()).unwrap();
        let spacing = 360.0 / 7.0;
        let teeth = outline.teeth();
        assert_eq!(teeth.len(), 7);
        let mut total = 0.0;
        for pair in teeth.windows(2) {
            let step = pair[1].start_angle_degrees - pair[0].start_angle_degrees;
            assert_relative_eq!(step, spacing, epsilon = 1e-9);
            total += step;
        }
        total += 360.0 + teeth[0].start_angle_degrees - teeth[6].start_angle_degrees;
        assert_relative_eq!(total, 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_closed_contour_with_bore() {
        let spec = spec();
        let outline = build_outline(&spec).unwrap();
        let paths = sub_paths(outline.commands());
        assert_eq!(paths.len(), 2);

        // The outer contour ends where it began
        let outer = &paths[0];
        assert_eq!(outer.first(), outer.last());
        assert_eq!(outer[0], outline.teeth()[0].mirror_root);

        // Bore at a quarter of the outside radius
        for p in &paths[1] {
            assert_relative_eq!(distance(&spec.center(), p), 31.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_valleys_are_root_arcs() {
        let spec = spec();
        let outline = build_outline(&spec).unwrap();
        let root = spec.params().root_radius();
        let arcs: Vec<_> = outline
            .commands()
            .iter()
            .filter_map(|c| match c {
                PathCommand::ArcTo { to, radius, sweep, .. } if (*radius - root).abs() < 1e-12 => {
                    Some((*to, *sweep))
                }
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 8);
        for (to, sweep) in arcs {
            assert_relative_eq!(distance(&spec.center(), &to), root, epsilon = 1e-9);
            assert_eq!(sweep, SweepDirection::CounterClockwise);
        }
    }

    #[test]
    fn test_straight_valleys() {
        let spec = spec().with_valley(ValleyStyle::Line).with_bore(None).unwrap();
        let outline = build_outline(&spec).unwrap();
        assert!(outline
            .commands()
            .iter()
            .all(|c| !matches!(c, PathCommand::ArcTo { .. })));
    }

    #[test]
    fn test_winding_follows_sweep() {
        let ccw = build_outline(&spec()).unwrap();
        let cw = build_outline(&spec().with_sweep(SweepDirection::Clockwise)).unwrap();

        let ccw_paths = sub_paths(ccw.commands());
        let cw_paths = sub_paths(cw.commands());
        assert!(signed_area(&ccw_paths[0]) > 0.0);
        assert!(signed_area(&cw_paths[0]) < 0.0);

        // Same contour, walked backwards
        let mut reversed = cw_paths[0].clone();
        reversed.reverse();
        assert_eq!(reversed, ccw_paths[0]);

        // The bore goes the other way
        let bore_sweep = |o: &GearOutline| match o.commands()[o.commands().len() - 2] {
            PathCommand::ArcTo { sweep, .. } => sweep,
            other => panic!("expected a bore arc, got {:?}", other),
        };
        assert_eq!(bore_sweep(&ccw), SweepDirection::Clockwise);
        assert_eq!(bore_sweep(&cw), SweepDirection::CounterClockwise);
    }

    #[test]
    fn test_no_bore() {
        let outline = build_outline(&spec().with_bore(None).unwrap()).unwrap();
        assert_eq!(sub_paths(outline.commands()).len(), 1);
        assert!(outline
            .reference_circles()
            .iter()
            .all(|(role, _)| *role != CircleRole::Bore));
    }

    #[test]
    fn test_reference_circles() {
        let outline = build_outline(&spec()).unwrap();
        let circles = outline.reference_circles();
        assert_eq!(circles.len(), 5);
        let (role, pitch) = circles[0];
        assert_eq!(role, CircleRole::Pitch);
        assert_relative_eq!(pitch.radius, 100.0);
        assert_eq!(CircleRole::Outside.to_string(), "outside");
    }

    #[test]
    fn test_centered_elsewhere() {
        let center = Point2::new(250.0, 180.0);
        let here = build_outline(&spec()).unwrap();
        let there = build_outline(&spec().with_center(center)).unwrap();
        for (a, b) in here.points().zip(there.points()) {
            assert!(((b - a) - center.coords).norm() < 1e-9);
        }
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(build_outline(&spec()).unwrap(), build_outline(&spec()).unwrap());
    }

    #[test]
    fn test_three_teeth_rejected() {
        let result = GearSpec::new(3, 200.0, 40.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_outlines() {
        let specs = vec![spec(), GearSpec::new(12, 120.0, 20.0).unwrap()];
        let outlines = build_outlines(&specs);
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].as_ref().unwrap().teeth().len(), 8);
        assert_eq!(outlines[1].as_ref().unwrap().teeth().len(), 12);
    }

    #[test]
    fn test_outline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GearOutline>();
        assert_send_sync::<GearSpec>();
    }

    proptest! {
        #[test]
        fn prop_valid_specs_build_clean_outlines(
            teeth in 4u32..60,
            pitch_diameter in 1.0f64..2000.0,
            pressure_angle in 5.0f64..45.0,
        ) {
            let spec = match GearSpec::new(teeth, pitch_diameter, pressure_angle) {
                Ok(spec) => spec,
                Err(_) => return Ok(()),
            };
            let p = spec.params();
            prop_assert!(p.root_radius() < p.base_radius());
            prop_assert!(p.base_radius() <= p.pitch_radius());
            prop_assert!(p.pitch_radius() < p.outside_radius());

            // The pitch crossing is always found, so this never fails for a valid spec
            let outline = build_outline(&spec).unwrap();
            prop_assert_eq!(outline.teeth().len(), teeth as usize);
            prop_assert!(outline.points().all(|q| q.x.is_finite() && q.y.is_finite()));

            let spacing = p.tooth_spacing_degrees();
            for (k, tooth) in outline.teeth().iter().enumerate() {
                prop_assert!((tooth.start_angle_degrees - k as f64 * spacing).abs() < 1e-9);
                prop_assert_eq!(tooth.primary_points.len(), tooth.mirror_points.len());
                // The two root points sit symmetrically about the bisector
                let sum = angle_degrees(&spec.center(), &tooth.primary_root)
                    + angle_degrees(&spec.center(), &tooth.mirror_root);
                prop_assert!(normalize_degrees(sum - 2.0 * tooth.bisector_degrees).abs() < 1e-6);
                // The flanks never cross, so the top land runs forward from the opposite tip
                let primary_tip = angle_degrees(&spec.center(), tooth.primary_tip().unwrap());
                let mirror_tip = angle_degrees(&spec.center(), tooth.mirror_tip().unwrap());
                prop_assert!(normalize_degrees(primary_tip - mirror_tip) >= -1e-9);
            }
        }
    }
}
