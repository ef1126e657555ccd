use batch_resize::config::{self, ResizeConfig};
use batch_resize::convert::ConversionOptions;
use batch_resize::imaging::Quality;
use batch_resize::ingest::{self, IngestReport};
use batch_resize::output;
use batch_resize::process::{RunError, RunEvent, Session};
use batch_resize::publish::DownloadHandle;
use batch_resize::types::{OutputFormat, ParseError, TargetSize};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "batch-resize")]
#[command(about = "Resize and convert a batch of images into one file")]
#[command(long_about = "\
Resize and convert a batch of images into one file

A single image is written as one resized file. Several images are bundled
into a zip archive, or into a multi-page PDF when the format is pdf.

Sizes:
  original       keep native dimensions
  800x600        exactly 800x600 pixels (aspect ratio is not preserved)
  800xoriginal   800 wide, native height

Formats: png, jpeg, webp, pdf (MIME types like image/png also work)

Run 'batch-resize gen-config' to generate a documented batch-resize.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./batch-resize.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override config values for a run.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Target size: original, WxH, or a mix like 800xoriginal
    #[arg(long)]
    size: Option<TargetSize>,

    /// Output format: png, jpeg, webp, pdf
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality for jpeg output and pdf pages
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Directory the result is written to
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert files and directories in one run
    Convert {
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,

        /// Print progress events and a final summary as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: add images and run repeatedly
    Session {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Show which files would be converted or skipped
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a stock batch-resize.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    ingest: &'a IngestReport,
    filename: &'a str,
    /// MIME type of the requested format.
    format: &'static str,
    path: PathBuf,
    bytes: usize,
    images: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert { paths, run, json } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let (opts, dir) = run_settings(&config, &run);

            let mut session = Session::new(config.document.page_width);
            let report = session.ingest(ingest::read_paths(&paths)?);
            if !json {
                output::print_lines(&output::format_ingest_summary(
                    &report,
                    session.batch().len(),
                ));
            }

            let images = session.status().pending;
            let handle = run_with_printer(&mut session, &opts, json)?;
            let filename = handle.filename().to_string();
            let bytes = handle.len();
            let path = handle.deliver(&dir)?;

            if json {
                let summary = RunSummary {
                    ingest: &report,
                    filename: &filename,
                    format: opts.format.mime_type(),
                    path,
                    bytes,
                    images,
                };
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                output::print_lines(&output::format_delivery(&path, bytes));
            }
        }
        Command::Session { run } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            run_session(&config, &run)?;
        }
        Command::Check { paths } => {
            let report = ingest::check_paths(&paths)?;
            output::print_lines(&output::format_check_output(&report));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the explicit config file, or the default one if it exists.
fn load_config(path: Option<&Path>) -> Result<ResizeConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?),
    }
}

/// Config values with command-line overrides applied.
fn run_settings(config: &ResizeConfig, args: &RunArgs) -> (ConversionOptions, PathBuf) {
    let mut opts = config.conversion_options();
    if let Some(size) = args.size {
        opts.size = size;
    }
    if let Some(format) = args.format {
        opts.format = format;
    }
    if let Some(quality) = args.quality {
        opts.quality = Quality::new(quality);
    }
    let dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    (opts, dir)
}

/// Run the session while a dedicated thread prints progress events, as
/// display lines or as one JSON object per line.
fn run_with_printer<'s>(
    session: &'s mut Session,
    opts: &ConversionOptions,
    json: bool,
) -> Result<&'s mut DownloadHandle, RunError> {
    let (tx, rx) = mpsc::channel::<RunEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            if !json {
                output::print_lines(&output::format_run_event(&event));
                continue;
            }
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("warning: could not serialize event: {e}"),
            }
        }
    });
    let result = session.run(opts, Some(&tx), None);
    drop(tx);
    if printer.join().is_err() {
        eprintln!("warning: progress output stopped early");
    }
    result
}

/// Line-oriented session over stdin.
fn run_session(config: &ResizeConfig, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (defaults, default_dir) = run_settings(config, args);
    let mut session = Session::new(config.document.page_width);

    output::print_lines(&output::format_session_help());
    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            prompt()?;
            continue;
        };
        let rest: Vec<&str> = words.collect();

        match command {
            "add" => {
                let paths: Vec<PathBuf> = rest.iter().map(PathBuf::from).collect();
                match ingest::read_paths(&paths) {
                    Ok(files) => {
                        let report = session.ingest(files);
                        output::print_lines(&output::format_ingest_summary(
                            &report,
                            session.batch().len(),
                        ));
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            "run" => match session_run_options(&defaults, &rest) {
                Ok(opts) => {
                    if let Err(e) = run_with_printer(&mut session, &opts, false) {
                        report_run_error(&e);
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            },
            "save" => {
                let dir = rest
                    .first()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_dir.clone());
                match session.output_mut() {
                    Some(handle) => match handle.deliver(&dir) {
                        Ok(path) => {
                            output::print_lines(&output::format_delivery(&path, handle.len()))
                        }
                        Err(e) => eprintln!("error: {e}"),
                    },
                    None => eprintln!("Nothing to save: run first"),
                }
            }
            "status" => output::print_lines(&output::format_status(&session.status())),
            "help" => output::print_lines(&output::format_session_help()),
            "quit" | "exit" => break,
            other => eprintln!("Unknown command '{other}', try 'help'"),
        }
        prompt()?;
    }
    Ok(())
}

/// `run [size] [format]`: positional overrides of the session defaults.
fn session_run_options(
    defaults: &ConversionOptions,
    args: &[&str],
) -> Result<ConversionOptions, ParseError> {
    let mut opts = *defaults;
    if let Some(size) = args.first() {
        opts.size = size.parse()?;
    }
    if let Some(format) = args.get(1) {
        opts.format = format.parse()?;
    }
    Ok(opts)
}

fn report_run_error(err: &RunError) {
    if err.is_notice() {
        eprintln!("{err}");
    } else {
        eprintln!("error: {err}");
    }
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
