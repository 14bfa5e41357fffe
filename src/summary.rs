//! Markdown summary of every processed game.
//!
//! The file is truncated once per run and then reopened in append mode for
//! each game, so a run killed midway still leaves every finished section on
//! disk.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::IconSize;
use crate::constants::catalog::SUMMARY_HEADER;

/// One game's section in the summary
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub category: String,
    pub name: String,
    pub url: String,
    pub embed_url: String,
    pub categories: Vec<String>,
    pub description: String,
    /// Sanitized game name; icon links are `<icon_dir>/icon_<dims>.png`
    pub icon_dir: String,
    pub icons: Vec<IconSize>,
}

impl GameRecord {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("## {}\n", self.category));
        out.push_str(&format!("### {}\n", self.name));
        out.push_str(&format!("- 游戏链接：[{}]({})\n", self.name, self.url));
        out.push_str(&format!("- 嵌入地址：{}\n", self.embed_url));
        out.push_str(&format!("- 游戏分类：{}\n", self.categories.join(", ")));
        out.push_str(&format!("- 游戏描述：{}\n", self.description));
        out.push_str("- 游戏图标：\n");
        for size in &self.icons {
            out.push_str(&format!(
                "  - [{}]({}/{})\n",
                size.dimensions(),
                self.icon_dir,
                size.file_name()
            ));
        }
        out.push('\n');
        out
    }
}

pub struct SummaryWriter {
    path: PathBuf,
}

impl SummaryWriter {
    /// Create (or truncate) the summary and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        fs::write(path, format!("{}\n\n", SUMMARY_HEADER))
            .with_context(|| format!("Failed to create summary {}", path.display()))?;
        Ok(SummaryWriter { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &GameRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open summary {}", self.path.display()))?;
        file.write_all(record.render().as_bytes())
            .with_context(|| format!("Failed to append to summary {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake() -> GameRecord {
        GameRecord {
            category: "Arcade".to_string(),
            name: "Snake".to_string(),
            url: "http://g/snake".to_string(),
            embed_url: "http://e/snake".to_string(),
            categories: vec!["Arcade".to_string(), "Classic".to_string()],
            description: "classic".to_string(),
            icon_dir: "Snake".to_string(),
            icons: vec![IconSize::Large, IconSize::Small],
        }
    }

    #[test]
    fn test_render_section() {
        let expected = "## Arcade\n\
                        ### Snake\n\
                        - 游戏链接：[Snake](http://g/snake)\n\
                        - 嵌入地址：http://e/snake\n\
                        - 游戏分类：Arcade, Classic\n\
                        - 游戏描述：classic\n\
                        - 游戏图标：\n  \
                        - [180x180](Snake/icon_180x180.png)\n  \
                        - [60x60](Snake/icon_60x60.png)\n\n";
        assert_eq!(snake().render(), expected);
    }

    #[test]
    fn test_render_without_icons_keeps_icon_heading() {
        let record = GameRecord { icons: Vec::new(), ..snake() };
        let text = record.render();
        assert!(text.ends_with("- 游戏图标：\n\n"));
    }

    #[test]
    fn test_create_truncates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games_summary.md");
        fs::write(&path, "stale content from last run").unwrap();

        let writer = SummaryWriter::create(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# 游戏信息汇总\n\n");

        writer.append(&snake()).unwrap();
        writer.append(&snake()).unwrap();

        let text = fs::read_to_string(writer.path()).unwrap();
        assert!(text.starts_with("# 游戏信息汇总\n\n## Arcade\n"));
        assert_eq!(text.matches("### Snake\n").count(), 2);
        assert!(!text.contains("stale"));
    }
}
