use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use terrain_prettifier::{
    PrettifierConfig, PrettifierOpts, RunMode, export_png, load_color, load_heightmap,
    processed_output_path,
};

#[derive(Parser, Debug)]
#[command(name = "terrain-prettifier", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run both pipelines and write the processed images.
    Process(ProcessArgs),
    /// Render a lit preview of the processed terrain as a PNG.
    Preview(PreviewArgs),
    /// Copy a file to its `_Backup` sibling, replacing any previous backup.
    Backup(PathArgs),
    /// Copy a file's `_Backup` sibling back over it.
    Restore(PathArgs),
    /// Write the default configuration as JSON.
    InitConfig(InitConfigArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Configuration JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Heightmap image (16-bit grayscale PNG recommended).
    #[arg(long)]
    heightmap: PathBuf,

    /// Satellite image.
    #[arg(long)]
    satellite: Option<PathBuf>,

    /// Cap each axis at the preview resolution instead of processing at full size.
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory. Defaults to each input's directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Overwrite the heightmap file with the full-resolution result, backing it up first.
    #[arg(long, default_value_t = false, conflicts_with = "preview")]
    in_place: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// File to back up or restore.
    #[arg(long)]
    path: PathBuf,
}

#[derive(Parser, Debug)]
struct InitConfigArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Process(args) => cmd_process(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Backup(args) => cmd_backup(args),
        Command::Restore(args) => cmd_restore(args),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(input: &InputArgs) -> anyhow::Result<terrain_prettifier::Prettifier> {
    let config = match &input.config {
        Some(path) => PrettifierConfig::load(path)?,
        None => PrettifierConfig::default(),
    };
    let mut opts = PrettifierOpts {
        mode: if input.preview {
            RunMode::Preview
        } else {
            RunMode::Export
        },
        ..PrettifierOpts::default()
    };
    opts.cpu.threads = input.threads;

    let mut sess = terrain_prettifier::Prettifier::new(config, opts)?;
    sess.set_heightmap(Some(load_heightmap(&input.heightmap)?))?;
    if let Some(path) = &input.satellite {
        sess.set_satellite(Some(load_color(path)?));
    }
    sess.process_all()?;
    Ok(sess)
}

fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    let sess = open_session(&args.input)?;
    let out_dir = args.out_dir.as_deref();

    let satellite_out = args
        .input
        .satellite
        .as_deref()
        .map(|sat| processed_output_path(sat, out_dir));
    if let Some(out) = &satellite_out
        && sess.export_satellite(out)?
    {
        eprintln!("wrote {}", out.display());
    }

    let heightmap = &args.input.heightmap;
    if let Some(img) = sess.heightmap_output() {
        let preview = heightmap_jpeg_path(heightmap, out_dir, satellite_out.as_deref());
        terrain_prettifier::export_jpeg(img, &preview)?;
        eprintln!("wrote {}", preview.display());

        let target = if args.in_place {
            if terrain_prettifier::ensure_backup(heightmap)? {
                eprintln!("backed up {}", heightmap.display());
            }
            heightmap.clone()
        } else {
            processed_heightmap_path(heightmap, out_dir)
        };
        sess.export_heightmap(&target)
            .with_context(|| format!("write heightmap '{}'", target.display()))?;
        eprintln!("wrote {}", target.display());
    }
    Ok(())
}

/// `<dir>/<stem>_Processed.jpg` for the 8-bit heightmap image, or
/// `<dir>/<stem>_Heightmap_Processed.jpg` when that name is taken by the satellite output.
fn heightmap_jpeg_path(
    input: &Path,
    out_dir: Option<&Path>,
    satellite: Option<&Path>,
) -> PathBuf {
    let path = processed_output_path(input, out_dir);
    if satellite != Some(path.as_path()) {
        return path;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!("{stem}_Heightmap_Processed.jpg"))
}

/// `<dir>/<stem>_Processed.png` for the 16-bit height data.
fn processed_heightmap_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    processed_output_path(input, out_dir).with_extension("png")
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let sess = open_session(&args.input)?;
    let img = sess
        .render_preview()?
        .context("no heightmap available for preview")?;
    export_png(&img, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_backup(args: PathArgs) -> anyhow::Result<()> {
    let dst = terrain_prettifier::backup(&args.path)?;
    eprintln!("wrote {}", dst.display());
    Ok(())
}

fn cmd_restore(args: PathArgs) -> anyhow::Result<()> {
    if !terrain_prettifier::restore(&args.path)? {
        anyhow::bail!("no backup found for '{}'", args.path.display());
    }
    eprintln!("restored {}", args.path.display());
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    terrain_prettifier::ensure_parent_dir(&args.out)?;
    PrettifierConfig::default().save(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
