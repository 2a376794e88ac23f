use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifegrid::config::{Params, Seeding};
use lifegrid::patterns::{self, parse_pattern};
use lifegrid::{Overlay, Universe, render};

#[derive(Parser, Debug)]
#[command(about = "Run a toroidal Game of Life and save snapshots")]
struct Args {
    /// rng seed for the random fill
    #[arg(default_value_t = 42)]
    seed: u64,

    /// board width in cells
    #[arg(default_value_t = 64)]
    width: usize,

    /// board height in cells
    #[arg(default_value_t = 64)]
    height: usize,

    /// output directory for PNG snapshots
    #[arg(default_value = "artifacts")]
    out_dir: PathBuf,

    /// generations to run
    #[arg(long, short, default_value_t = 100)]
    generations: usize,

    /// initial fill
    #[arg(long, value_enum)]
    seeding: Option<SeedingArg>,

    /// alive probability for the random fill
    #[arg(long)]
    fill: Option<f64>,

    /// catalogue pattern stamped at the center (e.g. glider, pulsar, gosper-glider-gun)
    #[arg(long)]
    pattern: Option<String>,

    /// RLE or plaintext pattern file stamped at the center
    #[arg(long, conflicts_with = "pattern")]
    pattern_file: Option<PathBuf>,

    /// JSON params file; command-line values override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// ticks between population samples
    #[arg(long)]
    ticks_per_frame: Option<usize>,

    /// pixels per cell in the PNGs
    #[arg(long, default_value_t = 4)]
    scale: usize,

    /// print the final board as text
    #[arg(long)]
    text: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SeedingArg {
    Empty,
    Stripes,
    Spaceship,
    Random,
}

impl From<SeedingArg> for Seeding {
    fn from(s: SeedingArg) -> Self {
        match s {
            SeedingArg::Empty => Seeding::Empty,
            SeedingArg::Stripes => Seeding::Stripes,
            SeedingArg::Spaceship => Seeding::Spaceship,
            SeedingArg::Random => Seeding::Random,
        }
    }
}

fn load_params(args: &Args) -> Result<Params> {
    let mut params = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Params::from_json(&text)?
        }
        None => Params::default(),
    };
    params.seed = args.seed;
    params.width = args.width;
    params.height = args.height;
    if let Some(s) = args.seeding {
        params.seeding = s.into();
    }
    if let Some(p) = args.fill {
        params.fill_probability = p;
    }
    if let Some(n) = args.ticks_per_frame {
        params.ticks_per_frame = n;
    }
    params.validate()?;
    Ok(params)
}

fn load_overlay(args: &Args, params: &Params) -> Result<Option<Overlay>> {
    let (coords, rows, cols) = if let Some(name) = &args.pattern {
        let p = patterns::find(name)?;
        let (rows, cols) = p.extent();
        (p.coords(), rows, cols)
    } else if let Some(path) = &args.pattern_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let p = parse_pattern(&text).with_context(|| format!("in {}", path.display()))?;
        info!(name = p.name.as_deref().unwrap_or("unnamed"), cells = p.cells.len(), "loaded pattern");
        (p.coords(), p.height, p.width)
    } else {
        return Ok(None);
    };
    Ok(Some(Overlay::centered(coords, rows, cols, params.width, params.height)))
}

fn save_png(out_dir: &Path, name: &str, universe: &Universe, scale: usize) -> Result<()> {
    let path = out_dir.join(name);
    let (rgba, w, h) = render::render_rgba(universe, scale)
        .with_context(|| format!("{name}: scale {scale} overflows the image size"))?;
    let w = u32::try_from(w).with_context(|| format!("{name}: image width {w} too large"))?;
    let h = u32::try_from(h).with_context(|| format!("{name}: image height {h} too large"))?;
    image::save_buffer(&path, &rgba, w, h, image::ColorType::Rgba8)
        .with_context(|| format!("failed to save {}", path.display()))?;
    info!("saved {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = load_params(&args)?;
    let overlay = load_overlay(&args, &params)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    info!(
        width = params.width,
        height = params.height,
        seed = params.seed,
        seeding = ?params.seeding,
        generations = args.generations,
        "running"
    );

    let (sim, timings) = lifegrid::simulate(&params, overlay.as_ref(), args.generations);

    for t in &timings {
        info!("{:20} {:8.1} ms", t.name, t.ms);
    }
    info!(
        start = sim.population.first().copied().unwrap_or(0),
        end = sim.universe.population(),
        "population"
    );

    if params.width > 0 && params.height > 0 {
        save_png(&args.out_dir, "initial.png", &sim.initial, args.scale)?;
        save_png(&args.out_dir, "final.png", &sim.universe, args.scale)?;
    }

    if args.text {
        println!("{}", sim.universe.render());
    }

    Ok(())
}
