use brand_assets::config::{self, BackendKind};
use brand_assets::imaging::{ImageBackend, RustBackend, SipsBackend};
use brand_assets::output;
use brand_assets::pipeline::{
    self, AssetArgs, AssetError, AssetReport, AssetRequest, PipelineOptions,
};
use brand_assets::target::AssetKind;
use clap::{ArgAction, Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Input and output paths for a single asset.
///
/// Both are optional at the clap level so that a missing path is reported
/// with the tool's own usage line and exit status.
#[derive(clap::Args, Clone)]
struct PathArgs {
    /// Source image (any format the backend can read)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Destination file; must end in .png
    #[arg(long)]
    output: Option<PathBuf>,
}

impl From<PathArgs> for AssetArgs {
    fn from(args: PathArgs) -> Self {
        AssetArgs {
            input: args.input,
            output: args.output,
        }
    }
}

#[derive(Parser)]
#[command(name = "brand-assets")]
#[command(about = "Generate the site logo and social share image from source artwork")]
#[command(long_about = "\
Generate the site logo and social share image from source artwork

Each asset is the largest centered region of the source with the target's
aspect ratio, resized to an exact size and written as PNG:

  logo.png          1000x1000
  social-share.png  1280x640, under 1,000,000 bytes

Nothing is padded or stretched. A source that is too detailed to fit the
social share budget is an error, not a retry.

Run 'brand-assets gen-config' to print a documented brand-assets.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: brand-assets.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Image tool executable for the sips backend
    #[arg(long, env = "BRAND_ASSETS_TOOL", global = true)]
    tool: Option<PathBuf>,

    /// Print one JSON object per finished asset instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a source image into a 1000x1000 PNG logo
    Logo(PathArgs),
    /// Finalize a source image into a 1280x640 PNG under 1MB
    SocialShare(PathArgs),
    /// Produce both assets from one source, in parallel
    All {
        /// Source image
        #[arg(long)]
        input: PathBuf,
        /// Directory receiving logo.png and social-share.png
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print a stock brand-assets.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(errors) => {
            for err in errors {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber.
///
/// `BRAND_ASSETS_LOG` takes a full filter directive and wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("BRAND_ASSETS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<(), Vec<AssetError>> {
    let jobs: Vec<(AssetKind, AssetArgs)> = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Logo(args) => vec![(AssetKind::Logo, args.into())],
        Command::SocialShare(args) => vec![(AssetKind::SocialShare, args.into())],
        Command::All { input, out_dir } => AssetKind::ALL
            .iter()
            .map(|&kind| {
                let args = AssetArgs {
                    input: Some(input.clone()),
                    output: Some(out_dir.join(kind.file_name())),
                };
                (kind, args)
            })
            .collect(),
    };

    // Bad arguments are reported before the config file is even read.
    let invalid: Vec<AssetError> = jobs
        .iter()
        .filter_map(|(kind, args)| AssetRequest::parse(*kind, args).err())
        .collect();
    if !invalid.is_empty() {
        return Err(invalid);
    }

    let overrides = cli.tool.as_deref().map(config::program_override);
    let config = config::load_config(cli.config.as_deref(), overrides)
        .map_err(|e| vec![AssetError::from(e)])?;
    let options = config.pipeline_options();

    let (reports, mut errors) = match config.backend.kind {
        BackendKind::Sips => {
            let backend = SipsBackend::with_program(&config.backend.program);
            produce(&backend, &jobs, &options)
        }
        BackendKind::Rust => produce(&RustBackend::new(), &jobs, &options),
    };

    // Assets that did finish are reported even when a sibling failed.
    if cli.json {
        if let Err(e) = output::print_reports_json(&reports) {
            errors.push(AssetError::Io(e.into()));
        }
    } else {
        output::print_reports(&reports);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Run every job, in parallel when there is more than one.
///
/// Each run owns its own workspace, so runs share nothing but the backend.
/// Returns the finished reports and every failure, in job order.
fn produce<B: ImageBackend>(
    backend: &B,
    jobs: &[(AssetKind, AssetArgs)],
    options: &PipelineOptions,
) -> (Vec<AssetReport>, Vec<AssetError>) {
    let results: Vec<Result<AssetReport, AssetError>> = jobs
        .par_iter()
        .map(|(kind, args)| pipeline::run(backend, *kind, args, options))
        .collect();

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => errors.push(err),
        }
    }
    (reports, errors)
}
