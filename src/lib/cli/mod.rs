//! Command line plumbing shared by the gear binaries
use nalgebra::geometry::Point2;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use crate::params::{GearSpec, SweepDirection, ValleyStyle, DEFAULT_BORE_RATIO};
use crate::SpecError;

const DEFAULT_PITCH_DIAMETER: f64 = 200.0;

/// Options describing the gear itself, flattened into each binary's own options
#[derive(Debug, StructOpt)]
pub struct GearOpt {
    /// Number of gear teeth
    #[structopt(short, long, default_value = "8")]
    pub teeth: u32,

    /// Pitch diameter, in mm. Defaults to 200 unless --module is given
    #[structopt(short, long, conflicts_with = "module")]
    pub pitch_diameter: Option<f64>,

    /// Gear module (pitch diameter per tooth), in mm
    #[structopt(short, long)]
    pub module: Option<f64>,

    /// Pressure angle, in degrees
    #[structopt(short = "a", long, default_value = "27")]
    pub pressure_angle: f64,

    /// Trace the outline clockwise instead of counter-clockwise
    #[structopt(long)]
    pub clockwise: bool,

    /// Join teeth with straight lines instead of arcs along the root circle
    #[structopt(long)]
    pub straight_valleys: bool,

    /// Bore radius as a fraction of the outside radius, 0 for no bore
    #[structopt(long, default_value = "0.25")]
    pub bore: f64,

    /// X coordinate of the gear center
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub center_x: f64,

    /// Y coordinate of the gear center
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub center_y: f64,
}

impl GearOpt {
    pub fn to_spec(&self) -> Result<GearSpec, SpecError> {
        let spec = match self.module {
            Some(module) => GearSpec::from_module(self.teeth, module, self.pressure_angle)?,
            None => GearSpec::new(
                self.teeth,
                self.pitch_diameter.unwrap_or(DEFAULT_PITCH_DIAMETER),
                self.pressure_angle,
            )?,
        };
        let sweep = if self.clockwise {
            SweepDirection::Clockwise
        } else {
            SweepDirection::CounterClockwise
        };
        let valley = if self.straight_valleys {
            ValleyStyle::Line
        } else {
            ValleyStyle::Arc
        };
        let bore = if self.bore == 0.0 {
            None
        } else {
            Some(self.bore)
        };

        spec.with_sweep(sweep)
            .with_valley(valley)
            .with_center(Point2::new(self.center_x, self.center_y))
            .with_bore(bore)
    }
}

/// Log to stderr, filtered by `RUST_LOG` and defaulting to `info`
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
