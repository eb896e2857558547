use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use borderseq::batch::pipeline::{GenerateRequest, OverlayRequest, run_generate, run_overlay};
use borderseq::sequence::document::{
    sample_edge_sequence, sample_pixel_sequence, save_sequence_xml,
};
use borderseq::{
    BatchOpts, BatchReport, CancelToken, Canvas, ConsoleProgress, DescriptorFormat, NullProgress,
    ProgressObserver, Rgb8,
};

#[derive(Parser, Debug)]
#[command(name = "borderseq", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw borders over an existing numbered image sequence.
    Overlay(OverlayArgs),
    /// Render bordered frames onto blank canvases.
    Generate(GenerateArgs),
    /// Write a sample border document.
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON file with batch options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads (default: available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Per-frame timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Which frame child shape to read.
    #[arg(long, value_enum)]
    format: Option<DescriptorFormat>,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Border document (XML).
    #[arg(long)]
    doc: PathBuf,

    /// Glob matching the input images, e.g. `frames/*.png`.
    #[arg(long)]
    input: String,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Border document (XML).
    #[arg(long)]
    doc: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width; required for pixel-list documents.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Canvas height; required for pixel-list documents.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Canvas background, `#rrggbb`.
    #[arg(long)]
    background: Option<String>,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Output XML path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 100)]
    frames: u64,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    #[arg(long, value_enum, default_value_t = SampleKind::Pixels)]
    kind: SampleKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleKind {
    Pixels,
    Edges,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Overlay(args) => cmd_overlay(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_opts(args: &BatchArgs) -> anyhow::Result<BatchOpts> {
    let mut opts = match &args.config {
        Some(path) => BatchOpts::from_json_file(path)
            .with_context(|| format!("load batch options '{}'", path.display()))?,
        None => BatchOpts::default(),
    };
    if let Some(workers) = args.workers {
        opts.workers = Some(workers);
    }
    if let Some(secs) = args.timeout_secs {
        opts.job_timeout_secs = Some(secs);
    }
    if let Some(format) = args.format {
        opts.format = format;
    }
    opts.validate()?;
    Ok(opts)
}

fn observer(args: &BatchArgs) -> Box<dyn ProgressObserver> {
    if args.no_progress {
        Box::new(NullProgress)
    } else {
        Box::new(ConsoleProgress::new(0))
    }
}

fn cmd_overlay(args: OverlayArgs) -> anyhow::Result<ExitCode> {
    let opts = load_opts(&args.batch)?;
    let req = OverlayRequest {
        doc: args.doc,
        input_pattern: args.input,
        out_dir: args.out,
        cancel: CancelToken::new(),
    };
    let mut progress = observer(&args.batch);
    let report = run_overlay(&req, &opts, progress.as_mut())
        .with_context(|| format!("overlay borders from '{}'", req.doc.display()))?;
    finish(&report, &req.out_dir, args.batch.json)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let mut opts = load_opts(&args.batch)?;
    if let Some(hex) = &args.background {
        opts.background = Rgb8::from_hex(hex)?;
    }
    let size = match (args.width, args.height) {
        (Some(w), Some(h)) => Some(Canvas::new(w, h)?),
        _ => None,
    };
    let req = GenerateRequest {
        doc: args.doc,
        out_dir: args.out,
        size,
        cancel: CancelToken::new(),
    };
    let mut progress = observer(&args.batch);
    let report = run_generate(&req, &opts, progress.as_mut())
        .with_context(|| format!("generate frames from '{}'", req.doc.display()))?;
    finish(&report, &req.out_dir, args.batch.json)
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<ExitCode> {
    let canvas = Canvas::new(args.width, args.height)?;
    let seq = match args.kind {
        SampleKind::Pixels => sample_pixel_sequence(args.frames, canvas),
        SampleKind::Edges => sample_edge_sequence(args.frames, canvas)?,
    };
    save_sequence_xml(&seq, &args.out)
        .with_context(|| format!("write sample document '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} frames)", args.out.display(), seq.len());
    Ok(ExitCode::SUCCESS)
}

fn finish(report: &BatchReport, out_dir: &Path, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("serialize batch report")?
        );
    } else {
        eprintln!("{}", report.summary());
        eprintln!("Output: {}", out_dir.display());
    }

    // A batch where frames ran and none of them succeeded is a failed run.
    if report.frames_total > 0 && !report.has_success() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
