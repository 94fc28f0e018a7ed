use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

use ivplot::{
    logging, run_session, ConsolePrompter, IvPlotConfig, Presets, SelectionMode,
    SvgChartRenderer, WithPresets,
};

fn parse_mode(s: &str) -> Result<SelectionMode, String> {
    s.parse().map_err(|e: ivplot::IvError| e.to_string())
}

#[derive(Parser)]
#[command(name = "ivplot")]
#[command(about = "Plot IV sweeps on linear and logarithmic axes", version)]
struct Cli {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory whose subdirectories are offered for selection
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Directory the figures are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Data directory to use without prompting
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Selection mode: 0 = one file, 1 = several files, 2 = all files
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<SelectionMode>,

    /// Print each series as a table after plotting
    #[arg(long)]
    summary: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Files inside the data directory to plot without prompting
    files: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(IvPlotConfig::path);
    if cli.init_config {
        IvPlotConfig::default().save_to_path(&config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let mut config = IvPlotConfig::load_or_default(&config_path)?;
    info!(path = %config_path.display(), "config loaded");
    if let Some(root) = cli.data_root {
        config.data_root = root;
    }
    if let Some(out) = cli.output_dir {
        config.output_dir = out;
    }

    let presets = Presets {
        directory: cli.dir,
        mode: cli.mode,
        files: cli.files,
    };
    let prompter = ConsolePrompter::new(io::stdin().lock(), io::stdout(), &config.data_root)
        .with_max_attempts(config.max_attempts);
    let mut selector = WithPresets::new(presets, prompter);
    let renderer = SvgChartRenderer::new(&config.output_dir, config.chart.clone());

    let outcomes = match run_session(&mut selector, &renderer) {
        Ok(outcomes) => outcomes,
        Err(e) if e.is_cancellation() => {
            info!("session cancelled");
            return Ok(());
        }
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    for outcome in &outcomes {
        println!("Saved {}", outcome.figure.display());
        if cli.summary {
            println!("{}", outcome.frame()?);
        }
    }
    Ok(())
}
