//! G-code for cutting a gear outline as a profile on a 3-axis mill.
//!
//! The cutter follows the outline itself, so use an engraver or a small end mill and leave
//! cutter compensation to the controller if the edge has to land exactly on the line.
use std::io::{Result, Write};

use nalgebra::geometry::Point2;
use tracing::debug;

use crate::outline::{GearOutline, PathCommand};
use crate::params::SweepDirection;

pub fn gcode_comment(file: &mut dyn Write, s: &str) -> Result<()> {
    writeln!(file, "({s})")
}

pub fn trailer(file: &mut dyn Write) -> Result<()> {
    writeln!(file, "G30 (Go Home)")?;
    writeln!(file, "M9 (Coolant off)")?;
    writeln!(file, "M5 (Spindle off)")?;
    writeln!(file, "M30")?;

    Ok(())
}

pub fn preamble(
    name: &Option<String>,
    tool: u32,
    tool_comment: &str,
    rpm: f64,
    coolant: bool,
    file: &mut dyn Write,
) -> Result<()> {
    // Print out the name as a comment on the first line, if set
    if let Some(name) = &name {
        gcode_comment(file, name)?;
    }
    // Comment with tool information
    gcode_comment(file, tool_comment)?;

    // Preamble to set the machine into a reasonable mode
    let preamble_str = "
G90 (Absolute)
G54 (G54 Datum)
G17 (X-Y Plane)
G40 (No cutter compensation)
G80 (No cycles)
G94 (Feed per minute)
G91.1 (Arc incremental IJ mode)
G49 (No tool length compensation)
M9 (Coolant off)

G21 (Metric)

G30 (Go Home Before Starting)
    ";
    write!(file, "{preamble_str}\n\n")?;
    tool_change(file, tool, rpm)?;

    // If chosen, start coolant flowing
    if coolant {
        writeln!(file, "M8")?;
    }

    Ok(())
}

pub fn tool_change(file: &mut dyn Write, tool: u32, rpm: f64) -> Result<()> {
    // First, turn off the spindle
    writeln!(file, "M5 (Spindle off)")?;
    // Go home
    writeln!(file, "G30 (Go Home)")?;
    // Then do a stop for the user to change the tool
    writeln!(file, "M0 (stop for tool change)")?;
    // Print the tool mode preamble, choosing the tool,
    // enabling length compensation,
    // and executing the tool change cycle
    writeln!(file, "T{tool} G43 H{tool} M6")?;

    // Print the Speed preamble, and turn on the spindle
    writeln!(file, "S{rpm} M3")?;

    Ok(())
}

trait AsGVals {
    fn as_gvals(&self, file: &mut dyn Write) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PosAndFeed {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    feed: Option<f64>,
}

pub fn xy(x: f64, y: f64) -> PosAndFeed {
    PosAndFeed {
        x: Some(x),
        y: Some(y),
        z: None,
        feed: None,
    }
}

pub fn xyf(x: f64, y: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x: Some(x),
        y: Some(y),
        z: None,
        feed: Some(feed),
    }
}

pub fn z(z: f64) -> PosAndFeed {
    PosAndFeed {
        x: None,
        y: None,
        z: Some(z),
        feed: None,
    }
}

pub fn zf(z: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x: None,
        y: None,
        z: Some(z),
        feed: Some(feed),
    }
}

impl AsGVals for PosAndFeed {
    fn as_gvals(&self, file: &mut dyn Write) -> Result<()> {
        if self.x.is_none() && self.y.is_none() && self.z.is_none() {
            panic!("Refusing to make illegal move");
        }
        g_val(file, "X", self.x)?;
        g_val(file, "Y", self.y)?;
        g_val(file, "Z", self.z)?;
        g_val(file, "F", self.feed)?;
        Ok(())
    }
}

/// Emit a gcode parameter value, if `ov` is `Some`.
/// To make the gcode human-friendly, numbers that round nicely are printed in their minimal form.
fn g_val(file: &mut dyn Write, name: &str, ov: Option<f64>) -> Result<()> {
    if let Some(v) = ov {
        if (v - v.round()).abs() < f64::EPSILON {
            write!(file, " {}{}.", name, v.round())
        } else {
            write!(file, " {name}{v:.4}")
        }
    } else {
        Ok(())
    }
}

fn g_move_linear(file: &mut dyn Write, g: &str, p: &dyn AsGVals) -> Result<()> {
    write!(file, "{g}")?;
    p.as_gvals(file)?;
    writeln!(file)?;
    Ok(())
}

pub fn g0(file: &mut dyn Write, p: PosAndFeed) -> Result<()> {
    assert!(p.feed.is_none(), "g0 moves must not include a feed rate");
    if let Some(z) = p.z {
        assert!(z > 0.0, "Rapid move at negative z");
    }
    g_move_linear(file, "G0", &p)
}

pub fn g1(file: &mut dyn Write, p: PosAndFeed) -> Result<()> {
    assert!(p.feed.is_some(), "g1 moves must include a feed rate");
    g_move_linear(file, "G1", &p)
}

pub struct PosXYIJ {
    x: f64,
    y: f64,
    i: f64,
    j: f64,
    feed: f64,
}

pub fn xyijf(x: f64, y: f64, i: f64, j: f64, feed: f64) -> PosXYIJ {
    PosXYIJ { x, y, i, j, feed }
}

impl AsGVals for PosXYIJ {
    fn as_gvals(&self, file: &mut dyn Write) -> Result<()> {
        g_val(file, "X", Some(self.x))?;
        g_val(file, "Y", Some(self.y))?;
        g_val(file, "I", Some(self.i))?;
        g_val(file, "J", Some(self.j))?;
        g_val(file, "F", Some(self.feed))?;
        Ok(())
    }
}

/// G2 clockwise arc move
/// See https://www.cnccookbook.com/cnc-g-code-arc-circle-g02-g03/ for a good description of what the params mean
/// X, Y is endpoint, I, J is offset from start point to true arc center
pub fn g2(file: &mut dyn Write, p: PosXYIJ) -> Result<()> {
    g_move_linear(file, "G2", &p)
}

/// G3 counter-clockwise arc move
/// X, Y is endpoint, I, J is offset from start point to true arc center
pub fn g3(file: &mut dyn Write, p: PosXYIJ) -> Result<()> {
    g_move_linear(file, "G3", &p)
}

/// How to cut an outline
#[derive(Clone, Debug)]
pub struct ProfileCut {
    /// Height to rapid at between sub-paths
    pub z_safe: f64,
    /// Final depth below z=0
    pub depth: f64,
    /// Deepest single pass
    pub max_stepdown: f64,
    /// Feed along the outline, in mm/min
    pub feed: f64,
    /// Feed when plunging, in mm/min
    pub plunge_feed: f64,
}

/// Cut the outline in equal passes no deeper than `max_stepdown`, each pass following every
/// sub-path (the gear contour, then the bore) in turn.
pub fn cut_outline(file: &mut dyn Write, outline: &GearOutline, cut: &ProfileCut) -> Result<()> {
    assert!(cut.max_stepdown > 0.0, "max_stepdown must be positive");
    assert!(cut.depth.is_finite(), "depth must be finite");
    let passes = (cut.depth / cut.max_stepdown).ceil().max(1.0) as usize;
    let stepdown = cut.depth / passes as f64;
    debug!(passes, stepdown, "cutting gear outline");

    g0(file, z(cut.z_safe))?;
    for pass in 1..=passes {
        let depth = stepdown * pass as f64;
        gcode_comment(file, &format!("Pass {pass} of {passes} at depth {depth:.4}"))?;
        cut_pass(file, outline.commands(), -depth, cut)?;
    }
    g0(file, z(cut.z_safe))?;

    Ok(())
}

fn cut_pass(file: &mut dyn Write, commands: &[PathCommand], z_cut: f64, cut: &ProfileCut) -> Result<()> {
    let mut current = Point2::origin();
    let mut sub_path_start = Point2::origin();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                // Raise, rapid over the start, and plunge
                g0(file, z(cut.z_safe))?;
                g0(file, xy(p.x, p.y))?;
                g1(file, zf(z_cut, cut.plunge_feed))?;
                sub_path_start = p;
                current = p;
            }
            PathCommand::LineTo(p) => {
                g1(file, xyf(p.x, p.y, cut.feed))?;
                current = p;
            }
            PathCommand::ArcTo {
                to, center, sweep, ..
            } => {
                let offset = center - current;
                let arc = xyijf(to.x, to.y, offset.x, offset.y, cut.feed);
                match sweep {
                    SweepDirection::Clockwise => g2(file, arc)?,
                    SweepDirection::CounterClockwise => g3(file, arc)?,
                }
                current = to;
            }
            PathCommand::Close => {
                if current != sub_path_start {
                    g1(file, xyf(sub_path_start.x, sub_path_start.y, cut.feed))?;
                    current = sub_path_start;
                }
                g1(file, zf(cut.z_safe, cut.plunge_feed))?;
            }
        }
    }

    Ok(())
}
