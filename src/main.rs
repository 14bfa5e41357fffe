use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use html5games_toolkit::collector::GameCollector;
use html5games_toolkit::config::Config;
use html5games_toolkit::download::HttpSource;
use html5games_toolkit::logging;
use html5games_toolkit::projector::CatalogProjector;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "html5games")]
#[command(about = "Download HTML5 game icons into a category/game tree and summarise the catalog", long_about = None)]
struct Cli {
    /// Settings file to use instead of ~/.html5games-toolkit/settings.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a game catalog (the default when no command is given)
    Process {
        /// Catalog JSON file. Defaults to catalog.input_path from settings.yaml
        input: Option<PathBuf>,
        /// Root directory for the category/game tree and the summary
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Scrape html5games.com into a catalog JSON file
    Collect {
        /// Where to write the catalog. Defaults to catalog.input_path from settings.yaml
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Listing page to start from
        #[arg(long)]
        list_url: Option<String>,
        /// Only collect the first N games
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration as YAML
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = logging::init(cli.debug);
    let config = Config::load(cli.config.as_deref())?;
    log.apply_config_level(&config.logging.level);

    match cli.command {
        Some(Commands::Process { input, output_dir }) => process_command(config, input, output_dir),
        Some(Commands::Collect { output, list_url, limit }) => {
            collect_command(config, output, list_url, limit)
        }
        Some(Commands::ShowConfig) => {
            let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
            print!("{}", yaml);
            Ok(())
        }
        None => process_command(config, None, None),
    }
}

fn process_command(mut config: Config, input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    if let Some(input) = input {
        config.catalog.input_path = input;
    }
    if let Some(output_dir) = output_dir {
        config.catalog.output_dir = output_dir;
    }

    let input_path = &config.catalog.input_path;
    if !input_path.exists() {
        println!("Data file not found: {}", input_path.display());
        return Ok(());
    }

    let source = HttpSource::new()?;
    let projector = CatalogProjector::new(
        config.catalog.output_dir.clone(),
        config.catalog.summary_file.clone(),
        source,
    );

    let report = projector.process(input_path)?;

    println!(
        "✅ Data processing complete: {} games processed, {} skipped, {} icons downloaded, {} failed",
        report.games_processed, report.games_skipped, report.icons_downloaded, report.icons_failed
    );
    println!("   Summary written to {}", config.summary_path().display());

    Ok(())
}

fn collect_command(
    mut config: Config,
    output: Option<PathBuf>,
    list_url: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    if let Some(output) = output {
        config.catalog.input_path = output;
    }
    if let Some(list_url) = list_url {
        config.catalog.list_url = list_url;
    }
    config.validate()?;

    let collector = GameCollector::new(HttpSource::new()?, config.catalog.list_url.clone())
        .with_limit(limit);
    let report = collector.collect()?;

    report.catalog.save(&config.catalog.input_path)?;

    println!(
        "✅ Collected {} games ({} pages failed) into {}",
        report.catalog.games.len(),
        report.failed.len(),
        config.catalog.input_path.display()
    );

    Ok(())
}
