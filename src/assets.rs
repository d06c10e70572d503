//! Episode asset downloads
//!
//! Derives the audio and show-notes URLs for an episode number and downloads
//! both into the working directory. The filenames never appear reliably in
//! the feed itself, so both URLs are plain template substitutions. Downloaded
//! files are left on disk after the run.

use crate::config::{AssetConfig, expand_episode};
use crate::error::{Error, Result};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Local paths of the downloaded files for one episode
#[derive(Clone, Debug)]
pub struct EpisodeAssets {
    /// Low-quality audio file
    pub audio: PathBuf,

    /// Show notes document
    pub notes: PathBuf,
}

impl EpisodeAssets {
    /// Both paths in attachment order (audio first)
    #[must_use]
    pub fn attachment_paths(&self) -> Vec<PathBuf> {
        vec![self.audio.clone(), self.notes.clone()]
    }
}

/// Downloads episode assets over HTTP
pub struct AssetFetcher {
    /// HTTP client for downloads
    http_client: reqwest::Client,

    /// URL template for the audio file
    audio_template: String,

    /// URL template for the notes document
    notes_template: String,
}

impl AssetFetcher {
    /// Create an asset fetcher from configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &AssetConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("sn-mailer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            audio_template: config.audio_template.clone(),
            notes_template: config.notes_template.clone(),
        })
    }

    /// Audio URL for `episode`
    #[must_use]
    pub fn audio_url(&self, episode: u32) -> String {
        expand_episode(&self.audio_template, episode)
    }

    /// Show-notes URL for `episode`
    #[must_use]
    pub fn notes_url(&self, episode: u32) -> String {
        expand_episode(&self.notes_template, episode)
    }

    /// Download both assets for `episode` into `dest_dir`
    ///
    /// Downloads are sequential, audio first. There is no retry, and a
    /// failure on either file fails the whole fetch so the caller can abort
    /// the run before anything is mailed; the feed is often updated a few
    /// hours before the files become available, and that window surfaces
    /// here as a 404.
    ///
    /// # Errors
    /// Returns [`Error::AssetUnavailable`] for a non-success HTTP status and
    /// propagates network and file-write errors.
    pub async fn fetch(&self, episode: u32, dest_dir: &Path) -> Result<EpisodeAssets> {
        debug!(episode, "downloading audio");
        let audio = self.download(&self.audio_url(episode), dest_dir).await?;

        debug!(episode, "downloading show notes");
        let notes = self.download(&self.notes_url(episode), dest_dir).await?;

        Ok(EpisodeAssets { audio, notes })
    }

    /// Download one URL into `dest_dir`, named after the URL's last path
    /// segment, streaming the body to disk
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let dest = dest_dir.join(&file_name);

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AssetUnavailable {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!(file = %file_name, bytes = written, "downloaded");
        Ok(dest)
    }
}

/// Last path segment of an asset URL, used as the local filename
fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Config {
        message: format!("invalid asset URL '{url}': {e}"),
        key: Some("assets".to_string()),
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Config {
            message: format!("asset URL has no filename: {url}"),
            key: Some("assets".to_string()),
        })
}
