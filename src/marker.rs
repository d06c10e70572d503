//! Last-sent episode tracking
//!
//! A single non-negative integer persisted in a small text file. The marker
//! is read once per run and written once, only after a successful send, so a
//! failed run leaves it pointing at the previous episode and the next run
//! retries. There is no locking; the tool is meant to run as a scheduled job,
//! one instance at a time.

use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Outcome of loading the marker file
///
/// Absence and unparsable content both default the episode number to 0, but
/// are reported distinctly so callers can log what actually happened instead
/// of recovering through nested error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerState {
    /// The file held a valid episode number
    Recorded(u32),
    /// The file was absent; the effective episode number is 0
    MissingDefaulted,
    /// The file existed but did not contain an integer; the effective
    /// episode number is 0
    InvalidDefaulted,
}

impl MarkerState {
    /// The effective last-sent episode number
    #[must_use]
    pub fn episode(&self) -> u32 {
        match self {
            MarkerState::Recorded(n) => *n,
            MarkerState::MissingDefaulted | MarkerState::InvalidDefaulted => 0,
        }
    }
}

/// Reads and writes the last-sent episode marker file
#[derive(Clone, Debug)]
pub struct EpisodeMarker {
    path: PathBuf,
}

impl EpisodeMarker {
    /// Create a marker backed by the given file path
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last-sent episode number
    ///
    /// A missing file is recreated empty so the next run finds it in place;
    /// failure to create it is logged and not fatal. Content is trimmed
    /// before parsing, so a trailing newline is fine.
    pub fn load(&self) -> MarkerState {
        debug!(path = %self.path.display(), "checking marker for last sent episode");

        match fs::read_to_string(&self.path) {
            Ok(content) => match content.trim().parse::<u32>() {
                Ok(episode) => {
                    info!(episode, "last sent episode loaded");
                    MarkerState::Recorded(episode)
                }
                Err(_) => {
                    warn!(
                        path = %self.path.display(),
                        "marker file does not contain an episode number, pretending 0"
                    );
                    MarkerState::InvalidDefaulted
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "marker file not found, creating it");
                match fs::write(&self.path, "\n") {
                    Ok(()) => info!(path = %self.path.display(), "marker file created"),
                    Err(e) => {
                        error!(path = %self.path.display(), error = %e, "could not create marker file")
                    }
                }
                MarkerState::MissingDefaulted
            }
            Err(e) => {
                // Unreadable for another reason (permissions): same zero
                // default as a missing file, without trying to recreate it.
                warn!(path = %self.path.display(), error = %e, "marker file unreadable, pretending 0");
                MarkerState::MissingDefaulted
            }
        }
    }

    /// Record `episode` as the last-sent episode
    ///
    /// Overwrites the file with the number and a trailing newline.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn record(&self, episode: u32) -> Result<()> {
        fs::write(&self.path, format!("{episode}\n"))?;
        debug!(episode, path = %self.path.display(), "marker updated");
        Ok(())
    }
}
