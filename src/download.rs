use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::StatusCode;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Why a fetch produced no image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
}

/// Result of one icon download. Only filesystem errors abort a run; everything
/// network-related ends up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded,
    HttpError(u16),
    TransportError(String),
}

impl DownloadOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, DownloadOutcome::Downloaded)
    }
}

/// Where icon bytes come from
pub trait ImageSource {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Where catalog HTML pages come from
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Blocking HTTP client, one request at a time
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpSource { client })
    }
}

impl ImageSource for HttpSource {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // Anything other than a plain 200 is a failure, redirects are followed by the client
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl PageSource for HttpSource {
    fn fetch_page(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().map_err(|e| FetchError::Transport(e.to_string()))
    }
}

/// Fetch `url` and write it to `dest`.
///
/// The body is fully received before `dest` is created, so a failed download
/// never leaves a partial file behind.
pub fn download_image(source: &dyn ImageSource, url: &str, dest: &Path) -> Result<DownloadOutcome> {
    let bytes = match source.fetch(url) {
        Ok(bytes) => bytes,
        Err(FetchError::Status(status)) => return Ok(DownloadOutcome::HttpError(status)),
        Err(FetchError::Transport(message)) => return Ok(DownloadOutcome::TransportError(message)),
    };

    fs::write(dest, &bytes)
        .with_context(|| format!("Failed to write image {}", dest.display()))?;

    Ok(DownloadOutcome::Downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(std::result::Result<Vec<u8>, FetchError>);

    impl ImageSource for FixedSource {
        fn fetch(&self, _url: &str) -> std::result::Result<Vec<u8>, FetchError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_success_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("icon.png");
        let source = FixedSource(Ok(vec![1, 2, 3]));

        let outcome = download_image(&source, "http://x/a.png", &dest).unwrap();
        assert_eq!(outcome, DownloadOutcome::Downloaded);
        assert_eq!(fs::read(&dest).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_http_error_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("icon.png");
        let source = FixedSource(Err(FetchError::Status(404)));

        let outcome = download_image(&source, "http://x/a.png", &dest).unwrap();
        assert_eq!(outcome, DownloadOutcome::HttpError(404));
        assert!(!dest.exists());
    }

    #[test]
    fn test_transport_error_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("icon.png");
        let source = FixedSource(Err(FetchError::Transport("connection refused".into())));

        let outcome = download_image(&source, "http://x/a.png", &dest).unwrap();
        assert_eq!(outcome, DownloadOutcome::TransportError("connection refused".into()));
        assert!(!outcome.is_downloaded());
    }

    #[test]
    fn test_unwritable_destination_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing-dir").join("icon.png");
        let source = FixedSource(Ok(vec![1]));

        assert!(download_image(&source, "http://x/a.png", &dest).is_err());
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(500).to_string(), "HTTP status 500");
        assert_eq!(FetchError::Transport("timed out".into()).to_string(), "timed out");
    }
}
