//! Gear parameters: the three independent inputs and every measurement derived from them.
//!
//! Formulas follow the diametral pitch system: addendum is `1/P`, dedendum is `1.157/P`.
//! See http://www.gearseds.com/files/6.3.1_Gear_Terms_Lesson_rev3.pdf for the terminology.
use std::f64::consts::TAU;
use std::fmt;

use nalgebra::geometry::Point2;

use crate::SpecError;

/// Fewest teeth we will build a gear for
pub const MIN_TEETH: u32 = 4;

/// Fewest samples taken along each involute flank
pub const MIN_INVOLUTE_STEPS: usize = 14;

/// Bore radius, as a fraction of the outside radius, when the caller doesn't pick one
pub const DEFAULT_BORE_RATIO: f64 = 0.25;

/// Relative band around the root and outside radii in which points still count as on the tooth
pub const EDGE_TOLERANCE: f64 = 0.01;

/// The base circle is divided into arcs of `base_radius / FCB_DIVISIONS`
const FCB_DIVISIONS: f64 = 20.0;

/// Which way the outer contour of the gear is traversed.
/// Angles grow counter-clockwise in the gear's (y-up) frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepDirection {
    Clockwise,
    CounterClockwise,
}

impl SweepDirection {
    pub fn reversed(self) -> Self {
        match self {
            SweepDirection::Clockwise => SweepDirection::CounterClockwise,
            SweepDirection::CounterClockwise => SweepDirection::Clockwise,
        }
    }
}

impl Default for SweepDirection {
    fn default() -> Self {
        SweepDirection::CounterClockwise
    }
}

/// How the root of one tooth is joined to the root of the next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValleyStyle {
    /// Follow the root circle
    Arc,
    /// Straight chord between the two root points
    Line,
}

impl Default for ValleyStyle {
    fn default() -> Self {
        ValleyStyle::Arc
    }
}

/// The three independent gear inputs, plus the measurements that follow from them.
/// Everything is closed-form arithmetic, so it's fine to call these as often as needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GearParameters {
    teeth: u32,
    pitch_diameter: f64,
    pressure_angle_degrees: f64,
}

impl GearParameters {
    pub fn new(
        teeth: u32,
        pitch_diameter: f64,
        pressure_angle_degrees: f64,
    ) -> Result<Self, SpecError> {
        if teeth < MIN_TEETH {
            return Err(SpecError::TooFewTeeth {
                teeth,
                min: MIN_TEETH,
            });
        }
        if !pitch_diameter.is_finite() || pitch_diameter <= 0.0 {
            return Err(SpecError::InvalidPitchDiameter(pitch_diameter));
        }
        // This also rejects cos(pressure angle) <= 0, where the base circle vanishes
        if !pressure_angle_degrees.is_finite()
            || pressure_angle_degrees <= 0.0
            || pressure_angle_degrees >= 90.0
        {
            return Err(SpecError::InvalidPressureAngle(pressure_angle_degrees));
        }

        let params = GearParameters {
            teeth,
            pitch_diameter,
            pressure_angle_degrees,
        };

        // The root point is joined radially to the start of the involute, so it must sit below it
        if params.root_radius() >= params.base_radius() {
            return Err(SpecError::RootOutsideBase {
                root: params.root_radius(),
                base: params.base_radius(),
            });
        }
        // Both flanks of a tooth fan out from the root by the involute function of the pressure
        // angle. Past a quarter of the spacing, neighbouring teeth would cross at the root.
        let inv = params.pressure_angle_radians().tan() - params.pressure_angle_radians();
        if inv.to_degrees() >= params.tooth_spacing_degrees() / 4.0 {
            return Err(SpecError::OverlappingTeeth {
                teeth,
                pressure_angle: pressure_angle_degrees,
            });
        }
        // Going up from the pitch circle the flanks close in on each other by the growth of the
        // involute function. If they close the whole half-width before the outside circle, they
        // cross there and the tooth has no top land.
        let outside_angle = (params.base_radius() / params.outside_radius()).acos();
        let inv_outside = outside_angle.tan() - outside_angle;
        if (inv_outside - inv).to_degrees() >= params.tooth_spacing_degrees() / 4.0 {
            return Err(SpecError::PointedTeeth {
                teeth,
                pressure_angle: pressure_angle_degrees,
            });
        }

        Ok(params)
    }

    pub fn teeth(&self) -> u32 {
        self.teeth
    }

    pub fn pitch_diameter(&self) -> f64 {
        self.pitch_diameter
    }

    pub fn pressure_angle_degrees(&self) -> f64 {
        self.pressure_angle_degrees
    }

    pub fn pressure_angle_radians(&self) -> f64 {
        self.pressure_angle_degrees.to_radians()
    }

    /// Teeth per unit of pitch diameter. Tooth size varies inversely with it.
    pub fn diametral_pitch(&self) -> f64 {
        self.teeth as f64 / self.pitch_diameter
    }

    /// Pitch diameter per tooth, the reciprocal of the diametral pitch
    pub fn module(&self) -> f64 {
        self.pitch_diameter / self.teeth as f64
    }

    /// Radius of the circle that touches the pitch circle of a meshing gear
    pub fn pitch_radius(&self) -> f64 {
        self.pitch_diameter / 2.0
    }

    pub fn base_diameter(&self) -> f64 {
        self.pitch_diameter * self.pressure_angle_radians().cos()
    }

    /// Radius of the circle the involute is unwound from
    pub fn base_radius(&self) -> f64 {
        self.base_diameter() / 2.0
    }

    pub fn base_circumference(&self) -> f64 {
        TAU * self.base_radius()
    }

    /// Radial distance from the pitch circle to the top of the tooth
    pub fn addendum(&self) -> f64 {
        1.0 / self.diametral_pitch()
    }

    /// Radial distance from the pitch circle to the bottom of the tooth.
    /// 1.157 is the 20° full-depth figure; Machinery's Handbook has others.
    pub fn dedendum(&self) -> f64 {
        1.157 / self.diametral_pitch()
    }

    pub fn outside_diameter(&self) -> f64 {
        2.0 * self.outside_radius()
    }

    pub fn outside_radius(&self) -> f64 {
        self.pitch_radius() + self.addendum()
    }

    pub fn root_diameter(&self) -> f64 {
        2.0 * self.root_radius()
    }

    pub fn root_radius(&self) -> f64 {
        self.pitch_radius() - self.dedendum()
    }

    pub fn tooth_spacing_degrees(&self) -> f64 {
        360.0 / self.teeth as f64
    }

    /// Length of one division of the base circle (FCB), 1/20th of the base radius.
    /// This is an arbitrary choice that yields a close approximation; finer divisions cost
    /// more samples.
    pub fn fcb(&self) -> f64 {
        self.base_radius() / FCB_DIVISIONS
    }

    /// Number of FCB divisions around the base circle
    pub fn ncb(&self) -> f64 {
        self.base_circumference() / self.fcb()
    }

    /// FCB as an angle on the base circle, i.e. how far the string unwinds per involute sample.
    ///
    /// This is `fcb / base_radius` radians, 1/20 rad whatever the gear's size. Using the FCB length
    /// directly as a number of degrees would make the curve change with the drawing units, so
    /// don't go back to that.
    pub fn involute_step_degrees(&self) -> f64 {
        360.0 / self.ncb()
    }

    /// How many points to take along each involute. At least `MIN_INVOLUTE_STEPS`, and always
    /// enough that the last two land past the outside circle, so the curve crosses it.
    pub fn involute_sample_count(&self) -> usize {
        let ratio = self.outside_radius() / self.base_radius();
        // Unwound angle at which the involute reaches the outside circle
        let roll = (ratio * ratio - 1.0).sqrt();
        let steps = (roll / self.involute_step_degrees().to_radians()).ceil() as usize + 2;
        steps.max(MIN_INVOLUTE_STEPS)
    }
}

impl fmt::Display for GearParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Teeth = {}", self.teeth)?;
        writeln!(f, "Pressure Angle = {}", self.pressure_angle_degrees)?;
        writeln!(f, "Diametral Pitch = {:.4}", self.diametral_pitch())?;
        writeln!(f, "Module = {:.4}", self.module())?;
        writeln!(f, "Pitch Diameter = {:.4}", self.pitch_diameter)?;
        writeln!(f, "Pitch Radius = {:.4}", self.pitch_radius())?;
        writeln!(f, "Base Diameter = {:.4}", self.base_diameter())?;
        writeln!(f, "Base Radius = {:.4}", self.base_radius())?;
        writeln!(f, "Addendum = {:.4}", self.addendum())?;
        writeln!(f, "Dedendum = {:.4}", self.dedendum())?;
        writeln!(f, "Outside Diameter = {:.4}", self.outside_diameter())?;
        writeln!(f, "Outside Radius = {:.4}", self.outside_radius())?;
        writeln!(f, "Root Diameter = {:.4}", self.root_diameter())?;
        writeln!(f, "Root Radius = {:.4}", self.root_radius())?;
        writeln!(f, "Tooth Spacing Degrees = {:.4}", self.tooth_spacing_degrees())?;
        write!(f, "Involute Step Degrees = {:.4}", self.involute_step_degrees())
    }
}

/// Everything needed to build one gear outline: the gear itself, plus where it sits and how its
/// path is wound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GearSpec {
    params: GearParameters,
    sweep: SweepDirection,
    valley: ValleyStyle,
    bore_ratio: Option<f64>,
    center: Point2<f64>,
}

impl GearSpec {
    pub fn new(
        teeth: u32,
        pitch_diameter: f64,
        pressure_angle_degrees: f64,
    ) -> Result<Self, SpecError> {
        Ok(Self::from_params(GearParameters::new(
            teeth,
            pitch_diameter,
            pressure_angle_degrees,
        )?))
    }

    /// Gear sized by module (pitch diameter per tooth), the usual metric convention
    pub fn from_module(
        teeth: u32,
        module: f64,
        pressure_angle_degrees: f64,
    ) -> Result<Self, SpecError> {
        if !module.is_finite() || module <= 0.0 {
            return Err(SpecError::InvalidModule(module));
        }
        Self::new(teeth, module * teeth as f64, pressure_angle_degrees)
    }

    /// Gear sized by diametral pitch (teeth per unit of pitch diameter)
    pub fn from_diametral_pitch(
        teeth: u32,
        diametral_pitch: f64,
        pressure_angle_degrees: f64,
    ) -> Result<Self, SpecError> {
        if !diametral_pitch.is_finite() || diametral_pitch <= 0.0 {
            return Err(SpecError::InvalidDiametralPitch(diametral_pitch));
        }
        Self::new(teeth, teeth as f64 / diametral_pitch, pressure_angle_degrees)
    }

    pub fn from_params(params: GearParameters) -> Self {
        GearSpec {
            params,
            sweep: SweepDirection::default(),
            valley: ValleyStyle::default(),
            bore_ratio: Some(DEFAULT_BORE_RATIO),
            center: Point2::origin(),
        }
    }

    pub fn with_sweep(mut self, sweep: SweepDirection) -> Self {
        self.sweep = sweep;
        self
    }

    pub fn with_valley(mut self, valley: ValleyStyle) -> Self {
        self.valley = valley;
        self
    }

    pub fn with_center(mut self, center: Point2<f64>) -> Self {
        self.center = center;
        self
    }

    /// Set the bore radius as a fraction of the outside radius, or `None` for a solid gear.
    /// The bore has to fit inside the root circle.
    pub fn with_bore(mut self, bore_ratio: Option<f64>) -> Result<Self, SpecError> {
        if let Some(ratio) = bore_ratio {
            let max = self.params.root_radius() / self.params.outside_radius();
            if !ratio.is_finite() || ratio <= 0.0 || ratio >= max {
                return Err(SpecError::InvalidBoreRatio { ratio, max });
            }
        }
        self.bore_ratio = bore_ratio;
        Ok(self)
    }

    pub fn params(&self) -> &GearParameters {
        &self.params
    }

    pub fn sweep(&self) -> SweepDirection {
        self.sweep
    }

    pub fn valley(&self) -> ValleyStyle {
        self.valley
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    pub fn bore_ratio(&self) -> Option<f64> {
        self.bore_ratio
    }

    pub fn bore_radius(&self) -> Option<f64> {
        self.bore_ratio
            .map(|ratio| ratio * self.params.outside_radius())
    }
}

impl Default for GearSpec {
    /// 8 teeth, pitch diameter 200, 27° pressure angle
    fn default() -> Self {
        GearSpec::from_params(GearParameters {
            teeth: 8,
            pitch_diameter: 200.0,
            pressure_angle_degrees: 27.0,
        })
    }
}
