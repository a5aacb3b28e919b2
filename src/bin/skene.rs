use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use skene::{CpuBackend, CpuBackendOpts, Element, GraphicsBackend, MountOpts, Runtime, TargetId};

#[derive(Parser, Debug)]
#[command(name = "skene", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount an element tree and write the root surface as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input element tree JSON (one element or an array of roots).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Root surface width in pixels.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Root surface height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Frames to run before capturing.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Font files to register; the first family becomes the default.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn read_elements(path: &Path) -> anyhow::Result<Vec<Element>> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read element tree '{}'", path.display()))?;
    Ok(Element::parse_roots(&s).with_context(|| "parse element tree JSON")?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let elements = read_elements(&args.in_path)?;

    let mut fonts = Vec::with_capacity(args.fonts.len());
    for path in &args.fonts {
        fonts.push(std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?);
    }
    let opts = CpuBackendOpts {
        fonts,
        ..CpuBackendOpts::default()
    };

    let target = TargetId(0);
    let (width, height) = (args.width, args.height);
    let mut runtime = Runtime::<CpuBackend>::new();
    runtime.mount(target, &elements, &MountOpts::from_env(), move || {
        let mut gfx = CpuBackend::new(opts)?;
        let surface = gfx.make_surface(width, height)?;
        Ok((gfx, surface))
    })?;

    let frame_ms = 1000.0 / 60.0;
    for i in 0..args.frames {
        runtime.frame(f64::from(i) * frame_ms)?;
    }

    let surface = runtime
        .root(target)
        .and_then(|r| r.state().surface())
        .context("root surface missing after render")?;
    let pixels = surface.to_rgba8();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &pixels,
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
