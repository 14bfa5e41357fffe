//! Game catalog as produced by the browser collector.
//!
//! The document is `{ "games": [ ... ] }` and is always loaded whole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The three icon variants a catalog entry can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSize {
    Large,
    Medium,
    Small,
}

impl IconSize {
    /// Processing and summary order
    pub const ALL: [IconSize; 3] = [IconSize::Large, IconSize::Medium, IconSize::Small];

    pub fn key(self) -> &'static str {
        match self {
            IconSize::Large => "large",
            IconSize::Medium => "medium",
            IconSize::Small => "small",
        }
    }

    pub fn dimensions(self) -> &'static str {
        match self {
            IconSize::Large => "180x180",
            IconSize::Medium => "120x120",
            IconSize::Small => "60x60",
        }
    }

    pub fn file_name(self) -> String {
        format!("icon_{}.png", self.dimensions())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IconUrls {
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
}

impl IconUrls {
    /// URL for `size`, if the collector found one. Empty strings count as absent,
    /// anything else (even whitespace) is attempted.
    pub fn get(&self, size: IconSize) -> Option<&str> {
        let url = match size {
            IconSize::Large => self.large.as_deref(),
            IconSize::Medium => self.medium.as_deref(),
            IconSize::Small => self.small.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }

    pub fn present(&self) -> Vec<(IconSize, &str)> {
        IconSize::ALL
            .iter()
            .filter_map(|&size| self.get(size).map(|url| (size, url)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntry {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "embedUrl")]
    pub embed_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icons: IconUrls,
}

impl GameEntry {
    /// First category; decides the top-level output directory.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub games: Vec<GameEntry>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// Write the catalog as pretty-printed JSON in the shape `load` reads.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize catalog")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write catalog {}", path.display()))?;
        Ok(())
    }
}
