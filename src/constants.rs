/// Application-wide constants for the catalog projector and the icon generator

pub mod app {
    pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
    pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Directory under the user's home that holds settings.yaml
    pub const CONFIG_DIR_NAME: &str = ".html5games-toolkit";
    pub const CONFIG_FILE_NAME: &str = "settings.yaml";
}

pub mod catalog {
    /// Catalog written by the browser collector
    pub const DEFAULT_INPUT_FILE: &str = "html5games_data.json";

    /// Root of the category/game directory tree
    pub const DEFAULT_OUTPUT_DIR: &str = "games";

    /// Summary document, created inside the output root
    pub const SUMMARY_FILE_NAME: &str = "games_summary.md";

    /// First line of every summary document
    pub const SUMMARY_HEADER: &str = "# 游戏信息汇总";

    /// Characters stripped from category and game names before use as path segments
    pub const UNSAFE_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
}

pub mod icons {
    pub const DEFAULT_OUTPUT_DIR: &str = "icons";

    pub const DEFAULT_SIZES: [u32; 3] = [16, 48, 128];

    /// Largest icon edge accepted from configuration
    pub const MAX_SIZE: u32 = 1024;

    pub const LABEL: char = 'G';

    pub const DEFAULT_FONT: &str = "arial.ttf";

    pub const DEFAULT_BACKGROUND: &str = "#4CAF50";
    pub const DEFAULT_FOREGROUND: &str = "#FFFFFF";
}

pub mod logging {
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

pub mod collector {
    /// Listing page with a link to every game
    pub const DEFAULT_LIST_URL: &str = "https://html5games.com/All-Games";

    /// Site-wide category every game carries; never recorded
    pub const IGNORED_CATEGORY: &str = "All Games";

    /// Used when a game page lists no other category
    pub const FALLBACK_CATEGORY: &str = "Games";

    pub const DEFAULT_DESCRIPTION: &str = "No description";
}
