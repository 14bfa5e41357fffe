//! Builds `html5games_data.json` by scraping the html5games.com listing.
//!
//! The listing page yields every game link; each game page is then fetched
//! in turn and turned into a [`GameEntry`]. A game page that cannot be
//! fetched is logged and left out, while a listing page that cannot be
//! fetched or parsed aborts the run.

use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::Url;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::catalog::{Catalog, GameEntry, IconUrls};
use crate::constants::collector::{DEFAULT_DESCRIPTION, FALLBACK_CATEGORY, IGNORED_CATEGORY};
use crate::download::PageSource;

struct Patterns {
    containers: Vec<Regex>,
    game_link: Regex,
    name: Regex,
    description: Regex,
    embed: Regex,
    category_section: Regex,
    category_item: Regex,
    figure: Regex,
    icon_fallbacks: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("collector: invalid regex")
        }

        Patterns {
            containers: vec![
                re(r#"(?s)<div[^>]*id="div-gpt-ad-content"[^>]*>.*?<ul[^>]*class="games"[^>]*>(.*?)</ul>"#),
                re(r#"(?s)<ul[^>]*class="games"[^>]*>(.*?)</ul>"#),
                re(r#"(?s)<div[^>]*class="[^"]*games-list[^"]*"[^>]*>(.*?)</div>"#),
            ],
            game_link: re(r#"<a[^>]*href="([^"]*/Game/[^"]+)"[^>]*>"#),
            name: re(r#"<h1[^>]*itemprop="name"[^>]*>([^<]+)</h1>"#),
            description: re(r#"<p[^>]*itemprop="description"[^>]*>([^<]+)</p>"#),
            embed: re(r#"(?i)<textarea[^>]*class="[^"]*aff-iliate-link[^"]*"[^>]*>([^<]+)</textarea>"#),
            category_section: re(r#"(?is)<div[^>]*class="[^"]*game-categories[^"]*"[^>]*>.*?<ul>(.*?)</ul>"#),
            category_item: re(r#"<li><a[^>]*>(?:<i[^>]*></i>\s*)?([^<]+)</a></li>"#),
            figure: re(r#"(?s)<figure[^>]*>.*?<img[^>]*src="([^"]+)"[^>]*>.*?<figcaption[^>]*>([^<]+)</figcaption>.*?</figure>"#),
            // Tried in order when no sized figure is present
            icon_fallbacks: vec![
                re(r#"(?i)<img[^>]*class="[^"]*game-icon[^"]*"[^>]*src="([^"]+)"[^>]*>"#),
                re(r#"(?i)<meta[^>]*property="og:image"[^>]*content="([^"]+)"[^>]*>"#),
                re(r#"(?i)<img[^>]*class="[^"]*icon[^"]*"[^>]*src="([^"]+)"[^>]*>"#),
            ],
        }
    })
}

/// Game page links from the listing page, absolute, de-duplicated, in page order.
///
/// Relative links are resolved against `base`; embed links are dropped.
pub fn extract_game_links(html: &str, base: &Url) -> Result<Vec<String>> {
    let p = patterns();

    let Some(games_html) = p
        .containers
        .iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        bail!("Game list container not found in listing page");
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for caps in p.game_link.captures_iter(games_html) {
        let href = &caps[1];
        let link = base
            .join(href)
            .with_context(|| format!("Invalid game link {:?}", href))?
            .to_string();

        if link.contains("/embed/") {
            continue;
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    if links.is_empty() {
        bail!("No game links found in listing page");
    }

    Ok(links)
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html).map(|caps| caps[1].trim().to_string())
}

/// Scrape one game page into a catalog entry.
pub fn parse_game_page(html: &str, url: &str) -> GameEntry {
    let p = patterns();

    let name = first_capture(&p.name, html).unwrap_or_default();
    let description =
        first_capture(&p.description, html).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let embed_url = first_capture(&p.embed, html).unwrap_or_default();

    let mut categories: Vec<String> = Vec::new();
    if let Some(section) = p.category_section.captures(html) {
        for caps in p.category_item.captures_iter(&section[1]) {
            let category = caps[1].replace("&nbsp;", "").trim().to_string();
            if category.is_empty() || category == IGNORED_CATEGORY || categories.contains(&category) {
                continue;
            }
            categories.push(category);
        }
    }
    if categories.is_empty() {
        categories.push(FALLBACK_CATEGORY.to_string());
    }

    GameEntry {
        name,
        categories,
        url: url.to_string(),
        embed_url,
        description,
        icons: parse_icons(html),
    }
}

fn parse_icons(html: &str) -> IconUrls {
    let p = patterns();
    let mut icons = IconUrls::default();

    for caps in p.figure.captures_iter(html) {
        let src = caps[1].to_string();
        let caption = &caps[2];
        if caption.contains("180x180") {
            icons.large = Some(src);
        } else if caption.contains("120x120") {
            icons.medium = Some(src);
        } else if caption.contains("60x60") {
            icons.small = Some(src);
        }
    }

    if icons.large.is_none() && icons.medium.is_none() && icons.small.is_none() {
        // Same image for every size
        if let Some(src) = p.icon_fallbacks.iter().find_map(|re| first_capture(re, html)) {
            icons.large = Some(src.clone());
            icons.medium = Some(src.clone());
            icons.small = Some(src);
        }
    }

    icons
}

#[derive(Debug, Default)]
pub struct CollectionReport {
    pub catalog: Catalog,
    /// Game pages that could not be fetched, with the reason
    pub failed: Vec<(String, String)>,
}

/// Walks the listing page and every game page, one request at a time
pub struct GameCollector<S: PageSource> {
    source: S,
    list_url: String,
    limit: Option<usize>,
}

impl<S: PageSource> GameCollector<S> {
    pub fn new(source: S, list_url: impl Into<String>) -> Self {
        GameCollector {
            source,
            list_url: list_url.into(),
            limit: None,
        }
    }

    /// Only visit the first `limit` game links
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn collect(&self) -> Result<CollectionReport> {
        let base = Url::parse(&self.list_url)
            .with_context(|| format!("Invalid listing URL {}", self.list_url))?;

        tracing::info!(url = %self.list_url, "Fetching game listing");
        let listing = self
            .source
            .fetch_page(&self.list_url)
            .with_context(|| format!("Failed to fetch game listing {}", self.list_url))?;

        let mut links = extract_game_links(&listing, &base)?;
        if let Some(limit) = self.limit {
            links.truncate(limit);
        }
        tracing::info!(games = links.len(), "Found game links");

        let mut report = CollectionReport::default();
        for (index, link) in links.iter().enumerate() {
            match self.source.fetch_page(link) {
                Ok(html) => {
                    let game = parse_game_page(&html, link);
                    tracing::debug!(
                        progress = index + 1,
                        total = links.len(),
                        game = %game.name,
                        "Collected game"
                    );
                    report.catalog.games.push(game);
                }
                Err(e) => {
                    tracing::warn!(url = %link, error = %e, "Failed to fetch game page");
                    report.failed.push((link.clone(), e.to_string()));
                }
            }
        }

        Ok(report)
    }
}
