//! Draws an involute spur gear as an SVG file
use anyhow::{Context, Result};
use involute::build_outline;
use involute::cli::{init_logging, GearOpt};
use involute::svg::{write_svg, SvgOptions};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "gear_svg", about = "Draws an involute spur gear as SVG")]
struct Opt {
    #[structopt(flatten)]
    gear: GearOpt,

    /// Also draw the pitch, base, root and outside circles
    #[structopt(long)]
    guidelines: bool,

    /// Fill color for the gear
    #[structopt(long, default_value = "lightgray")]
    fill: String,

    /// Outline stroke width
    #[structopt(long, default_value = "1")]
    stroke_width: f64,

    /// Output file for the SVG, standard output if not set
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();

    let spec = opt.gear.to_spec().context("bad gear options")?;
    let outline = build_outline(&spec)?;
    let options = SvgOptions {
        fill: opt.fill.clone(),
        stroke_width: opt.stroke_width,
        guidelines: opt.guidelines,
        ..Default::default()
    };

    match &opt.output {
        Some(path) => {
            // Only print the parameters when they won't end up mixed into the SVG
            println!("{}", spec.params());
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let mut file = BufWriter::new(file);
            write_svg(&mut file, &outline, &options)?;
            file.flush()?;
            info!(path = %path.display(), teeth = spec.params().teeth(), "wrote gear");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_svg(&mut out, &outline, &options)?;
        }
    }

    Ok(())
}
