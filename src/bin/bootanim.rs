use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bootanim",
    version,
    about = "Create sorted, uncompressed bootanimation.zip archives for Android"
)]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Zip desc.txt and every directory of the working directory.
    Archive(ArchiveArgs),
    /// Build a boot animation from an animated GIF.
    Gif(GifArgs),
    /// List the entries of an archive in stored order.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct ArchiveArgs {
    /// Output archive (must end in .zip).
    out: PathBuf,

    /// Directory holding desc.txt and the part directories.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Overwrite an existing output without asking.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Animated GIF to convert.
    gif: PathBuf,

    /// Output archive (must end in .zip).
    out: PathBuf,

    /// Directory where desc.txt and part0/ are written.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// JSON file with {"width", "height", "fps"}; skips those prompts.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Target device resolution width.
    #[arg(long)]
    width: Option<u32>,

    /// Target device resolution height.
    #[arg(long)]
    height: Option<u32>,

    /// Target frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// How to reconcile frames with a different target resolution.
    #[arg(long, value_enum)]
    resize: Option<PolicyChoice>,

    /// Overwrite existing output and part directory without asking.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Archive to inspect.
    archive: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Stretch,
    Fit,
    Center,
}

impl From<PolicyChoice> for bootanim::ResizePolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::Stretch => Self::Stretch,
            PolicyChoice::Fit => Self::Fit,
            PolicyChoice::Center => Self::Center,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Archive(args) => cmd_archive(args),
        Command::Gif(args) => cmd_gif(args),
        Command::List(args) => cmd_list(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn terminal() -> bootanim::Terminal<std::io::StdinLock<'static>, std::io::Stdout> {
    bootanim::Terminal::new(std::io::stdin().lock(), std::io::stdout())
}

fn read_spec_json(path: &Path) -> anyhow::Result<bootanim::AnimationSpec> {
    let f = File::open(path).with_context(|| format!("open spec '{}'", path.display()))?;
    let r = BufReader::new(f);
    let spec: bootanim::AnimationSpec =
        serde_json::from_reader(r).with_context(|| "parse spec JSON")?;
    Ok(spec)
}

fn cmd_archive(args: ArchiveArgs) -> anyhow::Result<()> {
    let mut interaction = bootanim::Preset::new(terminal());
    interaction.assume_yes = args.yes;

    let report = bootanim::archive_directory(&args.work_dir, &args.out, &mut interaction)?;

    println!("Boot animation generated successfully!");
    eprintln!(
        "wrote {} ({} entries, parts: {})",
        report.output.display(),
        report.entries,
        report.dirs.join(", ")
    );
    Ok(())
}

fn cmd_gif(args: GifArgs) -> anyhow::Result<()> {
    let mut interaction = bootanim::Preset::new(terminal());
    if let Some(path) = &args.spec {
        interaction = interaction.with_spec(read_spec_json(path)?);
    }
    if args.width.is_some() {
        interaction.width = args.width;
    }
    if args.height.is_some() {
        interaction.height = args.height;
    }
    if args.fps.is_some() {
        interaction.fps = args.fps;
    }
    interaction.policy = args.resize.map(Into::into);
    interaction.assume_yes = args.yes;

    let req = bootanim::GifBuild {
        source: args.gif,
        output: args.out,
        work_dir: args.work_dir,
    };
    let report = bootanim::build_from_gif(&req, &mut interaction)?;

    println!("Boot animation successfully produced!");
    let resized = report
        .resized
        .map(|p| p.to_string())
        .unwrap_or_else(|| "none".to_string());
    eprintln!(
        "wrote {} ({} frames, {}x{} -> {}x{} @ {}fps, resize: {resized})",
        report.output.display(),
        report.frames,
        report.source_size.0,
        report.source_size.1,
        report.manifest.spec.width(),
        report.manifest.spec.height(),
        report.manifest.spec.fps(),
    );
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let entries = bootanim::inspect(&args.archive)
        .with_context(|| format!("inspect '{}'", args.archive.display()))?;
    for e in entries {
        let method = if e.stored { "stored" } else { "compressed" };
        println!("{:>10}  {:<10}  {}", e.size, method, e.name);
    }
    Ok(())
}
