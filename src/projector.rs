use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, GameEntry};
use crate::download::{download_image, DownloadOutcome, ImageSource};
use crate::sanitize::sanitize_filename;
use crate::summary::{GameRecord, SummaryWriter};

/// Counters reported after a catalog run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    pub games_processed: usize,
    pub games_skipped: usize,
    pub icons_downloaded: usize,
    pub icons_failed: usize,
}

/// Projects a game catalog onto `<output_dir>/<category>/<game>/` plus a
/// Markdown summary inside `output_dir`.
pub struct CatalogProjector<S: ImageSource> {
    output_dir: PathBuf,
    summary_file: String,
    source: S,
}

impl<S: ImageSource> CatalogProjector<S> {
    pub fn new(output_dir: impl Into<PathBuf>, summary_file: impl Into<String>, source: S) -> Self {
        CatalogProjector {
            output_dir: output_dir.into(),
            summary_file: summary_file.into(),
            source,
        }
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Process every game of the catalog at `json_path`, in order.
    ///
    /// Download failures are logged and counted; parse and filesystem errors
    /// abort the run.
    pub fn process(&self, json_path: &Path) -> Result<ProjectionReport> {
        let catalog = Catalog::load(json_path)?;
        tracing::info!(
            path = %json_path.display(),
            games = catalog.games.len(),
            "Catalog loaded"
        );

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        let summary = SummaryWriter::create(&self.summary_path())?;

        let mut report = ProjectionReport::default();

        for game in &catalog.games {
            if self.process_game(game, &summary, &mut report)? {
                report.games_processed += 1;
            } else {
                report.games_skipped += 1;
            }
        }

        tracing::info!(
            processed = report.games_processed,
            skipped = report.games_skipped,
            downloaded = report.icons_downloaded,
            failed = report.icons_failed,
            summary = %summary.path().display(),
            "Catalog processed"
        );

        Ok(report)
    }

    /// Returns false when the game has no category and was skipped.
    fn process_game(
        &self,
        game: &GameEntry,
        summary: &SummaryWriter,
        report: &mut ProjectionReport,
    ) -> Result<bool> {
        let Some(category) = game.primary_category() else {
            tracing::debug!(game = %game.name, "Skipping game without categories");
            return Ok(false);
        };

        let category_segment = sanitize_filename(category);
        let game_segment = sanitize_filename(&game.name);

        let game_dir = self.output_dir.join(&category_segment).join(&game_segment);
        fs::create_dir_all(&game_dir)
            .with_context(|| format!("Failed to create game directory {}", game_dir.display()))?;

        let icons = game.icons.present();

        for &(size, url) in &icons {
            let dest = game_dir.join(size.file_name());
            let outcome = download_image(&self.source, url, &dest)?;
            log_outcome(&outcome, url, &dest);

            if outcome.is_downloaded() {
                report.icons_downloaded += 1;
            } else {
                report.icons_failed += 1;
            }
        }

        // Icon links are listed whether or not the download worked, relative
        // to the category directory
        let record = GameRecord {
            category: category.to_string(),
            name: game.name.clone(),
            url: game.url.clone(),
            embed_url: game.embed_url.clone(),
            categories: game.categories.clone(),
            description: game.description.clone(),
            icon_dir: game_segment,
            icons: icons.iter().map(|&(size, _)| size).collect(),
        };
        summary.append(&record)?;

        Ok(true)
    }
}

fn log_outcome(outcome: &DownloadOutcome, url: &str, dest: &Path) {
    match outcome {
        DownloadOutcome::Downloaded => {
            tracing::info!(url, dest = %dest.display(), "Downloaded icon");
        }
        DownloadOutcome::HttpError(status) => {
            tracing::warn!(url, status, "Failed to download icon: unexpected HTTP status");
        }
        DownloadOutcome::TransportError(message) => {
            tracing::warn!(url, error = %message, "Failed to download icon");
        }
    }
}
