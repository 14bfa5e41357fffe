use anyhow::Result;
use clap::Parser;
use html5games_toolkit::config::Config;
use html5games_toolkit::icon::{load_font, IconGenerator, IconStyle};
use html5games_toolkit::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "generate-icon")]
#[command(about = "Generate placeholder extension icons", long_about = None)]
struct Cli {
    /// Settings file to use instead of ~/.html5games-toolkit/settings.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the icons are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Icon sizes in pixels, e.g. --sizes 16,48,128
    #[arg(short, long, value_delimiter = ',')]
    sizes: Option<Vec<u32>>,

    /// TrueType font for the label; the builtin glyphs are used if it cannot be loaded
    #[arg(short, long)]
    font: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = logging::init(cli.debug);
    let mut config = Config::load(cli.config.as_deref())?;
    log.apply_config_level(&config.logging.level);

    if let Some(output_dir) = cli.output_dir {
        config.icons.output_dir = output_dir;
    }
    if let Some(sizes) = cli.sizes {
        config.icons.sizes = sizes;
    }
    if let Some(font) = cli.font {
        config.icons.font_path = font;
    }
    config.validate()?;

    println!("Generating icons...");

    let font = load_font(&config.icons.font_path);
    let style = IconStyle::from_colors(&config.icons.background, &config.icons.foreground)?;
    let generator = IconGenerator::new(config.icons.output_dir.clone(), font, style);

    for &size in &config.icons.sizes {
        let path = generator.generate(size)?;
        println!("  Created {}x{} icon: {}", size, size, path.display());
    }

    println!("✅ Icons written to {}", config.icons.output_dir.display());

    Ok(())
}
