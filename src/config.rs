use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub icons: IconConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_catalog_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    /// Listing page the collector starts from
    #[serde(default = "default_list_url")]
    pub list_url: String,
}

fn default_input_path() -> PathBuf {
    PathBuf::from(constants::catalog::DEFAULT_INPUT_FILE)
}

fn default_catalog_output_dir() -> PathBuf {
    PathBuf::from(constants::catalog::DEFAULT_OUTPUT_DIR)
}

fn default_summary_file() -> String {
    constants::catalog::SUMMARY_FILE_NAME.to_string()
}

fn default_list_url() -> String {
    constants::collector::DEFAULT_LIST_URL.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            input_path: default_input_path(),
            output_dir: default_catalog_output_dir(),
            summary_file: default_summary_file(),
            list_url: default_list_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IconConfig {
    #[serde(default = "default_icon_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_sizes")]
    pub sizes: Vec<u32>,
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_foreground")]
    pub foreground: String,
}

fn default_icon_output_dir() -> PathBuf {
    PathBuf::from(constants::icons::DEFAULT_OUTPUT_DIR)
}

fn default_sizes() -> Vec<u32> {
    constants::icons::DEFAULT_SIZES.to_vec()
}

fn default_font_path() -> PathBuf {
    PathBuf::from(constants::icons::DEFAULT_FONT)
}

fn default_background() -> String {
    constants::icons::DEFAULT_BACKGROUND.to_string()
}

fn default_foreground() -> String {
    constants::icons::DEFAULT_FOREGROUND.to_string()
}

impl Default for IconConfig {
    fn default() -> Self {
        IconConfig {
            output_dir: default_icon_output_dir(),
            sizes: default_sizes(),
            font_path: default_font_path(),
            background: default_background(),
            foreground: default_foreground(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    constants::logging::DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(constants::app::CONFIG_DIR_NAME))
    }

    /// Load an explicit config file when given, otherwise the per-user one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_or_create(),
        }
    }

    /// Per-user settings, written with defaults on first run.
    ///
    /// A home directory that is missing or read-only is not fatal: the
    /// defaults are used for this run. An existing but invalid file is.
    pub fn load_or_create() -> Result<Self> {
        match Self::config_dir() {
            Ok(dir) => Self::load_or_create_in(&dir),
            Err(e) => {
                tracing::warn!(error = %e, "No config directory, using default settings");
                Ok(Config::default())
            }
        }
    }

    pub fn load_or_create_in(dir: &Path) -> Result<Self> {
        let config_path = dir.join(constants::app::CONFIG_FILE_NAME);

        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        let config = Config::default();
        let created = fs::create_dir_all(dir)
            .context("Failed to create config directory")
            .and_then(|_| config.save_to(&config_path));

        match created {
            Ok(()) => {
                tracing::info!(path = %config_path.display(), "Created default config");
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %format!("{:#}", e),
                    "Could not write default config, using defaults"
                );
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.catalog.input_path.as_os_str().is_empty() {
            bail!("catalog.input_path cannot be empty");
        }
        if self.catalog.output_dir.as_os_str().is_empty() {
            bail!("catalog.output_dir cannot be empty");
        }

        // The summary lives directly inside the output root
        if self.catalog.summary_file.is_empty() {
            bail!("catalog.summary_file cannot be empty");
        }
        if self.catalog.summary_file.contains(['/', '\\']) {
            bail!("catalog.summary_file must be a file name, not a path");
        }
        if self.catalog.list_url.trim().is_empty() {
            bail!("catalog.list_url cannot be empty");
        }

        if self.icons.output_dir.as_os_str().is_empty() {
            bail!("icons.output_dir cannot be empty");
        }
        if self.icons.sizes.is_empty() {
            bail!("icons.sizes must list at least one size");
        }
        for &size in &self.icons.sizes {
            if size == 0 {
                bail!("icon sizes must be greater than 0");
            }
            if size > constants::icons::MAX_SIZE {
                bail!("icon sizes must be <= {}", constants::icons::MAX_SIZE);
            }
        }

        crate::icon::parse_hex_color(&self.icons.background)
            .context("icons.background is not a #RRGGBB color")?;
        crate::icon::parse_hex_color(&self.icons.foreground)
            .context("icons.foreground is not a #RRGGBB color")?;

        if self.logging.level.is_empty() {
            bail!("logging.level cannot be empty");
        }

        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Full path of the summary document.
    pub fn summary_path(&self) -> PathBuf {
        self.catalog.output_dir.join(&self.catalog.summary_file)
    }
}
