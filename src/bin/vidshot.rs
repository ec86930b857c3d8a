use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
    sync::{Arc, Mutex},
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use vidshot::{
    CaptureOutcome, CaptureReport, CompressionLevel, CompressionMode, CompressionOutcome,
    CompressionReport, InstallStep, Installer, OperationType, Pipeline, ProgressCallback, ProgressInfo,
    RunOptions, ScreenshotCount, ToolPaths, UninstallOutcome, UploadOptions, UploadSummary,
    VidshotError, prompt, validate_run, workspace,
};

const USAGE: &str = "vidshot <video_file> <screenshot_count> [quality 1-6] [-t]";

const CLI_AFTER_HELP: &str = "Examples:\n  vidshot movie.mkv 5\n  vidshot movie.mkv 5 3\n  vidshot movie.mkv 5 3 -t\n  vidshot movie.mkv 5 -t\n  vidshot oxipng\n  vidshot unoxipng";

#[derive(Debug, Parser)]
#[command(
    name = "vidshot",
    version,
    about = "Take random screenshots of a video, compress them, and upload them to Pixhost",
    after_help = CLI_AFTER_HELP,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Show debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Args, Clone, Default)]
struct RunArgs {
    /// Video file to take screenshots from.
    video: Option<PathBuf>,

    /// Number of screenshots (counts above 50 ask for confirmation).
    #[arg(allow_negative_numbers = true)]
    count: Option<String>,

    /// Compression level, 1 (fast) to 6 (smallest).
    quality: Option<String>,

    /// Compress one file at a time; asks for the level if none was given.
    #[arg(short = 't', long = "serial")]
    serial: bool,

    /// Maximum number of files compressed at once.
    #[arg(short = 'j', long, conflicts_with = "serial")]
    jobs: Option<usize>,

    /// Output directory, emptied at the start of every run.
    #[arg(short = 'o', long, default_value = workspace::DEFAULT_OUTPUT_DIR)]
    out_dir: PathBuf,

    /// Keep the screenshots local instead of uploading them.
    #[arg(long)]
    no_upload: bool,

    /// Print the upload results as JSON.
    #[arg(long)]
    json: bool,

    /// Show progress bars.
    #[arg(long)]
    progress: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install oxipng into /usr/local/bin (Linux x86_64 only).
    #[command(name = "oxipng")]
    Install,

    /// Remove oxipng from /usr/local/bin.
    #[command(name = "unoxipng")]
    Uninstall,

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Progress bars, one per stage.
#[derive(Default)]
struct TerminalProgress {
    bar: Mutex<Option<(OperationType, ProgressBar)>>,
}

fn operation_label(operation: OperationType) -> &'static str {
    match operation {
        OperationType::FrameExtraction => "extracting",
        OperationType::Compression => "compressing",
        OperationType::Upload => "uploading",
        _ => "working",
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        if slot.as_ref().map(|(operation, _)| *operation) != Some(info.operation) {
            if let Some((_, previous)) = slot.take() {
                previous.finish_and_clear();
            }
            let bar = ProgressBar::new(info.total.unwrap_or(0));
            if let Ok(style) =
                ProgressStyle::with_template("{spinner:.green} {msg:12} {bar:40.cyan/blue} {pos}/{len}")
            {
                bar.set_style(style.progress_chars("##-"));
            }
            bar.set_message(operation_label(info.operation));
            *slot = Some((info.operation, bar));
        }

        if let Some((_, bar)) = slot.as_ref() {
            if bar.is_finished() {
                return;
            }
            bar.set_position(info.current);
            if info.total == Some(info.current) {
                bar.finish_and_clear();
            }
        }
    }
}

fn print_error(message: impl AsRef<str>) {
    println!("{}", message.as_ref().red());
}

fn print_hint(message: impl AsRef<str>) {
    println!("{} {}", "hint:".yellow(), message.as_ref());
}

/// `-t` forces a single worker; otherwise `--jobs` (or the default pool).
fn worker_limit(args: &RunArgs) -> Option<usize> {
    if args.serial { Some(1) } else { args.jobs }
}

/// Pick the compression level from the arguments, asking when needed.
///
/// A positional level wins. With `-t` and no level, ask for one. With
/// neither, ask whether to compress at all.
fn choose_compression<R: BufRead, W: Write>(
    args: &RunArgs,
    input: &mut R,
    output: &mut W,
) -> Result<Option<CompressionLevel>, VidshotError> {
    if let Some(quality) = &args.quality {
        return quality.parse().map(Some);
    }
    if args.serial {
        return prompt::ask_compression_level(input, output).map(Some);
    }
    if prompt::confirm(input, output, "Compress the screenshots? (y/N): ")? {
        return prompt::ask_compression_level(input, output).map(Some);
    }
    Ok(None)
}

fn print_capture(report: &CaptureReport) {
    for outcome in &report.outcomes {
        match outcome {
            CaptureOutcome::Captured(screenshot) => {
                let dimensions = screenshot
                    .dimensions
                    .map(|(width, height)| format!(", {} {width}x{height}", "resolution:".green().bold()))
                    .unwrap_or_default();
                println!(
                    "{} {}, {} {}, {} {:.2} KB{dimensions}",
                    "Screenshot:".green().bold(),
                    screenshot.path.display(),
                    "timestamp:".green().bold(),
                    screenshot.timestamp,
                    "size:".green().bold(),
                    screenshot.size_kb,
                );
            }
            CaptureOutcome::Failed {
                index,
                timestamp,
                reason,
            } => print_error(format!("Screenshot {index} at {timestamp} failed: {reason}")),
        }
    }
}

fn print_compression(report: &CompressionReport) {
    let level = report
        .level
        .map(|level| level.to_string())
        .unwrap_or_default();
    for outcome in &report.outcomes {
        match outcome {
            CompressionOutcome::Compressed { path, size_kb, .. } => println!(
                "{} {}, {} {level}, {} {size_kb:.2} KB",
                "Compressed:".green().bold(),
                path.display(),
                "level:".green().bold(),
                "size:".green().bold(),
            ),
            CompressionOutcome::Failed { path, reason, .. } => {
                print_error(format!("Compression of {} failed: {reason}", path.display()))
            }
        }
    }
}

fn print_upload(summary: &UploadSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        return Ok(());
    }

    for failure in &summary.failures {
        print_error(format!(
            "Upload of {} failed: {}",
            failure.file.display(),
            failure.error
        ));
    }

    let links = summary.direct_links();
    if !links.is_empty() {
        println!("\n{}:", "Direct links".green().bold());
        for link in links {
            println!("{link}");
        }
    }

    let bbcodes = summary.bbcodes();
    if !bbcodes.is_empty() {
        println!("\n{}:", "BBCode".green().bold());
        for bbcode in bbcodes {
            println!("{bbcode}");
        }
    }
    Ok(())
}

fn install() -> Result<(), Box<dyn std::error::Error>> {
    let installer = Installer::default();
    let version = installer.install(|step| match step {
        InstallStep::Downloading { url } => println!("Downloading {url}..."),
        InstallStep::Downloaded { bytes } => {
            println!("Download complete ({:.1} MB), installing...", bytes as f64 / 1_048_576.0)
        }
    })?;
    println!(
        "{} {}",
        "oxipng installed to".green().bold(),
        installer.binary_path().display()
    );
    println!("{version}");
    print_hint("run `vidshot unoxipng` to uninstall oxipng");
    Ok(())
}

fn uninstall() -> Result<(), Box<dyn std::error::Error>> {
    println!("Uninstalling oxipng...");
    match Installer::default().uninstall()? {
        UninstallOutcome::Removed(path) => {
            println!("{} {}", "oxipng removed:".green().bold(), path.display());
        }
        UninstallOutcome::NotInstalled(path) => {
            print_error(format!("oxipng is not installed at {}", path.display()));
        }
    }
    Ok(())
}

/// Everything checked before the first external program runs.
struct Preflight {
    video: PathBuf,
    count: ScreenshotCount,
    compressor_available: bool,
}

/// Validate the arguments and the tools, and ask before large batches.
///
/// Nothing on disk is touched here; a declined prompt returns
/// [`VidshotError::Aborted`] with the output directory as it was.
fn preflight<R: BufRead, W: Write>(
    args: &RunArgs,
    tools: &ToolPaths,
    input: &mut R,
    output: &mut W,
) -> Result<Preflight, Box<dyn std::error::Error>> {
    let Some(video) = args.video.clone() else {
        return Err(format!("missing arguments. Usage: {USAGE}").into());
    };
    let Some(count) = args.count.as_deref() else {
        return Err(format!("missing screenshot count. Usage: {USAGE}").into());
    };
    let count = ScreenshotCount::parse(count)?;
    if let Some(quality) = &args.quality {
        quality.parse::<CompressionLevel>()?;
    }

    let report = validate_run(count.get(), tools);
    if !report.is_valid() {
        tools.require_mandatory()?;
    }
    if report.needs_confirmation {
        prompt::confirm_large_batch(input, output, count.get())?;
    }
    for warning in &report.warnings {
        writeln!(output, "{} {warning}", "hint:".yellow())?;
    }

    Ok(Preflight {
        video,
        count,
        compressor_available: report.compressor_available,
    })
}

fn take_screenshots<R: BufRead, W: Write>(
    args: &RunArgs,
    tools: ToolPaths,
    input: &mut R,
    output: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let Preflight {
        video,
        count,
        compressor_available,
    } = preflight(args, &tools, input, output)?;

    let mut options = RunOptions::new(count.get())
        .with_output_dir(&args.out_dir)
        .with_workers(worker_limit(args))
        .with_tools(tools);
    if args.no_upload {
        options = options.with_upload(None);
    } else {
        options = options.with_upload(Some(UploadOptions::default()));
    }
    if args.progress {
        options = options.with_progress(Arc::new(TerminalProgress::default()));
    }
    let pipeline = Pipeline::new(options);

    let info = pipeline.probe(&video)?;
    log::info!("{} lasts {:.3}s", info.path.display(), info.duration);
    let timestamps = pipeline.sample(&info)?;
    pipeline.prepare_output()?;

    let capture = pipeline.capture(&info, &timestamps);
    print_capture(&capture);

    if compressor_available {
        if let Some(level) = choose_compression(args, input, output)? {
            let compressor = pipeline.compressor(level);
            match compressor.mode() {
                CompressionMode::Serial => println!("Mode: single-threaded"),
                CompressionMode::Parallel(_) => println!("Mode: multi-threaded"),
            }
            print_compression(&compressor.compress(&args.out_dir, count.get())?);
        }
    } else if args.quality.is_some() {
        print_hint("skipping compression, oxipng is not installed");
    }

    match pipeline.upload()? {
        Some(summary) => print_upload(&summary, args.json)?,
        None => {
            println!("\n{}:", "Screenshots".green().bold());
            for file in workspace::list_files(&args.out_dir)? {
                println!("{}", file.display());
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Some(Commands::Install) => install(),
        Some(Commands::Uninstall) => uninstall(),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidshot", &mut io::stdout());
            Ok(())
        }
        None => {
            let stdin = io::stdin();
            take_screenshots(&cli.run, ToolPaths::default(), &mut stdin.lock(), &mut io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => {
            let _ = error.print();
            process::exit(1);
        }
    };
    init_logging(cli.verbose);

    if let Err(error) = run(cli) {
        print_error(format!("error: {error}"));
        process::exit(1);
    }
}
