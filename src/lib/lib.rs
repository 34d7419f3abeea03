//! Involute spur gear outlines.
//!
//! A gear is described by a [`GearSpec`]: tooth count, pitch diameter and pressure angle, plus a
//! few drawing choices. [`build_outline`] turns that into a closed path of lines and arcs, which
//! can be written out as SVG with [`svg::write_svg`] or cut on a mill with [`gcode::cut_outline`].
use thiserror::Error;

pub mod cli;
pub mod gcode;
pub mod geometry;
pub mod involute;
pub mod outline;
pub mod params;
pub mod svg;
pub mod tooth;

pub use geometry::{find_intersection, Circle};
pub use involute::sample;
pub use outline::{build_outline, build_outlines, CircleRole, GearOutline, PathCommand};
pub use params::{GearParameters, GearSpec, SweepDirection, ValleyStyle};
pub use tooth::{build_tooth, Tooth};

/// Gear parameters that can't make a drawable gear
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("a gear needs at least {min} teeth, got {teeth}")]
    TooFewTeeth { teeth: u32, min: u32 },

    #[error("pitch diameter must be positive, got {0}")]
    InvalidPitchDiameter(f64),

    #[error("module must be positive, got {0}")]
    InvalidModule(f64),

    #[error("diametral pitch must be positive, got {0}")]
    InvalidDiametralPitch(f64),

    #[error("pressure angle must be between 0 and 90 degrees, got {0}")]
    InvalidPressureAngle(f64),

    #[error("root radius {root:.4} is not inside base radius {base:.4}; use fewer teeth or a larger pressure angle")]
    RootOutsideBase { root: f64, base: f64 },

    #[error("teeth overlap at the root with {teeth} teeth and a {pressure_angle} degree pressure angle")]
    OverlappingTeeth { teeth: u32, pressure_angle: f64 },

    #[error("teeth come to a point below the outside circle with {teeth} teeth and a {pressure_angle} degree pressure angle")]
    PointedTeeth { teeth: u32, pressure_angle: f64 },

    #[error("bore ratio must be above 0 and below {max:.4}, got {ratio}")]
    InvalidBoreRatio { ratio: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GearError {
    #[error("invalid gear: {0}")]
    InvalidSpec(#[from] SpecError),

    /// The sampled involute never crossed a circle it has to cross
    #[error("involute does not cross the circle of radius {radius:.4}")]
    DegenerateIntersection { radius: f64 },
}
