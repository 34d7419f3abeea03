//! G-Code generator for cutting the outline of an involute spur gear from plate on a 3-axis mill
use anyhow::{ensure, Context, Result};
use involute::build_outline;
use involute::cli::{init_logging, GearOpt};
use involute::gcode::{cut_outline, preamble, trailer, ProfileCut};
use involute::GearParameters;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "gear_profile_gen", about = "Cuts an involute spur gear outline")]
struct Opt {
    #[structopt(flatten)]
    gear: GearOpt,

    /// Tool RPM
    #[structopt(long, default_value = "8000")]
    rpm: f64,

    /// Feed rate, in mm/min
    #[structopt(long, default_value = "300")]
    feed: f64,

    /// Plunge feed rate, in mm/min
    #[structopt(long, default_value = "100")]
    plunge_feed: f64,

    /// Total depth of the cut, usually the plate thickness plus a little, in mm
    #[structopt(long, default_value = "1")]
    depth: f64,

    /// Max depth to cut in a single pass, in mm
    #[structopt(long, default_value = "0.5")]
    max_stepdown: f64,

    /// Safe height for rapid moves, in mm
    #[structopt(long, default_value = "2")]
    z_safe: f64,

    /// Name for the job
    #[structopt(short, long)]
    name: Option<String>,

    /// Tool number for the cut
    #[structopt(long, default_value = "1")]
    tool: u32,

    /// Diameter of the tool, in mm. Only used in the tool comment
    #[structopt(long, default_value = "1")]
    tool_dia: f64,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,

    #[structopt(long)]
    coolant: bool,
}

fn help_text(params: &GearParameters) {
    println!(
        "Before cut:
        - Fix plate stock at least {:.2}mm across
        - Set home to the gear center, on the top face of the stock
        - The cutter follows the outline itself, offset it with cutter compensation if needed",
        params.outside_diameter()
    )
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();
    ensure!(opt.depth > 0.0, "depth must be positive");
    ensure!(opt.max_stepdown > 0.0, "max stepdown must be positive");
    ensure!(opt.z_safe > 0.0, "safe height must be above the stock");

    let spec = opt.gear.to_spec().context("bad gear options")?;
    println!("{}", spec.params());
    help_text(spec.params());
    let outline = build_outline(&spec)?;

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&opt.output)
        .with_context(|| format!("Failed to create {}", opt.output.display()))?;
    let mut file = BufWriter::new(file);

    preamble(
        &opt.name,
        opt.tool,
        &format!("T{} D={} - profile cut", opt.tool, opt.tool_dia),
        opt.rpm,
        opt.coolant,
        &mut file,
    )?;
    cut_outline(
        &mut file,
        &outline,
        &ProfileCut {
            z_safe: opt.z_safe,
            depth: opt.depth,
            max_stepdown: opt.max_stepdown,
            feed: opt.feed,
            plunge_feed: opt.plunge_feed,
        },
    )?;
    trailer(&mut file)?;
    file.flush()?;

    info!(path = %opt.output.display(), "wrote gear profile");
    Ok(())
}
