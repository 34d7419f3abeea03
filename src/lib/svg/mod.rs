//! SVG output for gear outlines.
//!
//! Coordinates are written as they are, so with SVG's y axis pointing down the drawing comes out
//! mirrored top-to-bottom. Gears are symmetric enough that nobody minds.
use std::io::{Result, Write};

use crate::outline::{CircleRole, GearOutline, PathCommand};
use crate::params::SweepDirection;

pub struct SvgOptions {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    /// Draw the pitch, base, root and outside circles, and crosshairs at the center
    pub guidelines: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        SvgOptions {
            fill: "lightgray".to_string(),
            stroke: "black".to_string(),
            stroke_width: 1.0,
            guidelines: false,
        }
    }
}

/// Turn path commands into the contents of an SVG `d` attribute
pub fn path_data(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(|c| match c {
            PathCommand::MoveTo(p) => format!("M {:.4} {:.4}", p.x, p.y),
            PathCommand::LineTo(p) => format!("L {:.4} {:.4}", p.x, p.y),
            PathCommand::ArcTo {
                to,
                radius,
                large_arc,
                sweep,
                ..
            } => format!(
                "A {r:.4} {r:.4} 0 {} {} {:.4} {:.4}",
                *large_arc as u8,
                sweep_flag(*sweep),
                to.x,
                to.y,
                r = radius
            ),
            PathCommand::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// SVG's positive-angle direction runs from +x towards +y, the same way our angles grow
fn sweep_flag(sweep: SweepDirection) -> u8 {
    match sweep {
        SweepDirection::CounterClockwise => 1,
        SweepDirection::Clockwise => 0,
    }
}

/// Write a standalone SVG document with the gear, framed by its outside circle plus a margin
pub fn write_svg(file: &mut dyn Write, outline: &GearOutline, options: &SvgOptions) -> Result<()> {
    let center = outline.center();
    let half = outline.params().outside_radius() * 1.1;
    let size = 2.0 * half;

    writeln!(
        file,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.4} {:.4} {:.4} {:.4}" width="{:.4}" height="{:.4}">"#,
        center.x - half,
        center.y - half,
        size,
        size,
        size,
        size
    )?;
    writeln!(file, "<title>{}-tooth gear</title>", outline.params().teeth())?;
    writeln!(file, "<desc>\n{}\n</desc>", outline.params())?;

    writeln!(
        file,
        r#"<path id="gear" d="{}" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="{}"/>"#,
        path_data(outline.commands()),
        options.fill,
        options.stroke,
        options.stroke_width
    )?;

    if options.guidelines {
        write_guidelines(file, outline, options)?;
    }

    writeln!(file, "</svg>")
}

fn write_guidelines(file: &mut dyn Write, outline: &GearOutline, options: &SvgOptions) -> Result<()> {
    let center = outline.center();
    let width = options.stroke_width / 2.0;
    writeln!(
        file,
        r#"<g id="guidelines" fill="none" stroke="dimgray" stroke-width="{width}" stroke-dasharray="2 4">"#
    )?;
    for (role, circle) in outline.reference_circles() {
        if role == CircleRole::Bore {
            // Already part of the gear path
            continue;
        }
        writeln!(
            file,
            r#"<circle class="{}" cx="{:.4}" cy="{:.4}" r="{:.4}"/>"#,
            role, circle.center.x, circle.center.y, circle.radius
        )?;
    }

    // Crosshairs
    let reach = outline.params().outside_radius() * 1.1;
    writeln!(
        file,
        r#"<path class="crosshairs" d="M {:.4} {:.4} L {:.4} {:.4} M {:.4} {:.4} L {:.4} {:.4}"/>"#,
        center.x - reach,
        center.y,
        center.x + reach,
        center.y,
        center.x,
        center.y - reach,
        center.x,
        center.y + reach
    )?;
    writeln!(file, "</g>")
}
