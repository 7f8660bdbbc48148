use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scannix::render::to_console_string;
use scannix::{
    Config, CopyOutcome, DownloadOutcome, ErrorCorrection, ExportFormat, FormState,
    GenerateOutcome, Generator, HexColor, QrEncoder, Severity,
};

const DEFAULT_LOG_FILTER: &str = "scannix=info";

/// Generate a QR code for a URL and save it as PNG, JPEG or SVG.
#[derive(Parser, Debug)]
#[command(name = "scannix", version, about)]
struct Args {
    /// The URL to encode, e.g. https://example.com
    url: String,

    /// Image width in pixels: 200 to 600 in steps of 50
    #[arg(
        long,
        short,
        default_value_t = scannix::options::DEFAULT_WIDTH,
        value_parser = parse_width
    )]
    size: u32,

    /// Error correction level: L, M, Q or H
    #[arg(long, short, default_value = "M")]
    level: ErrorCorrection,

    /// Color of the dark modules
    #[arg(long, default_value = "#000000")]
    dark: HexColor,

    /// Background color
    #[arg(long, default_value = "#FFFFFF")]
    light: HexColor,

    /// Download format: png, jpeg, jpg or svg [default: png, or the config file's]
    #[arg(long, short)]
    format: Option<ExportFormat>,

    /// Directory the file is saved to [default: ., or the config file's]
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Also copy the URL to the clipboard
    #[arg(long)]
    copy: bool,

    /// Print the code to the terminal
    #[arg(long)]
    preview: bool,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_width(raw: &str) -> Result<u32, String> {
    let width: u32 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    scannix::options::checked_width(width).map_err(|err| err.to_string())
}

fn init_logging(config: &Config) -> Result<()> {
    let fallback = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to initialize logging")
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(out) = &args.out {
        config.output_dir = out.clone();
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    Ok(config)
}

fn fill_form(form: &mut FormState, args: &Args) -> scannix::Result<()> {
    form.set_url(args.url.as_str());
    form.set_width(args.size)?;
    form.set_error_correction(args.level);
    form.set_dark(args.dark);
    form.set_light(args.light);
    Ok(())
}

fn report(view: &Generator) {
    if let Some(notification) = view.notification() {
        match notification.severity {
            Severity::Error => eprintln!("✗ {}", notification.message),
            Severity::Success | Severity::Info => eprintln!("✓ {}", notification.message),
        }
        view.dismiss_notification();
    }
}

fn print_preview(args: &Args, view: &Generator) -> Result<()> {
    let snapshot = view.snapshot();
    let qr = QrEncoder::new()
        .symbol(snapshot.form.url(), snapshot.form.options())
        .context("failed to build preview")?;
    print!("{}", to_console_string(&qr, snapshot.form.options().margin()));
    println!(
        "{} ({}px, shown at {}px, error correction {})",
        args.url,
        snapshot.form.options().width(),
        snapshot.form.display_size(),
        snapshot.form.options().error_correction.label()
    );
    Ok(())
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    init_logging(&config)?;

    let view = Generator::new(&config);
    view.edit(|form| fill_form(form, &args))?;

    match view.generate().await {
        GenerateOutcome::Ready => report(&view),
        GenerateOutcome::Rejected(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::FAILURE);
        }
        GenerateOutcome::Failed(err) => {
            if let Some(message) = view.snapshot().form.error() {
                eprintln!("error: {message}");
            }
            eprintln!("  caused by: {err}");
            return Ok(ExitCode::FAILURE);
        }
        GenerateOutcome::Busy | GenerateOutcome::Superseded => return Ok(ExitCode::FAILURE),
    }

    if args.preview {
        print_preview(&args, &view)?;
    }

    let mut code = ExitCode::SUCCESS;
    match view.download().await {
        DownloadOutcome::Saved(path) => println!("{}", path.display()),
        DownloadOutcome::NothingToExport => code = ExitCode::FAILURE,
        DownloadOutcome::Failed(err) => {
            eprintln!("error: {err}");
            code = ExitCode::FAILURE;
        }
    }

    if args.copy {
        if let CopyOutcome::Failed(err) = view.copy_url().await {
            tracing::debug!(error = %err, "clipboard write failed");
        }
        report(&view);
    }

    Ok(code)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    run(Args::parse()).await
}
