//! Configuration types for sn-mailer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Feed polled when no URL is given: the TWiT Security Now audio feed
pub const DEFAULT_FEED_URL: &str = "https://feeds.twit.tv/podcasts/sn.xml";

/// URL template for the low-quality audio file; the normal mp3 is too large
/// for Gmail
pub const DEFAULT_AUDIO_TEMPLATE: &str = "https://media.grc.com/sn/sn-{episode}-lq.mp3";

/// URL template for the show notes document
pub const DEFAULT_NOTES_TEMPLATE: &str = "https://www.grc.com/sn/sn-{episode}-notes.pdf";

/// Replace the `{episode}` placeholder in a template with the episode number
///
/// Used for the asset URL templates and the subject template. A template
/// without the placeholder is returned unchanged.
#[must_use]
pub fn expand_episode(template: &str, episode: u32) -> String {
    template.replace("{episode}", &episode.to_string())
}

/// Feed checking configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Podcast feed URL (default: [`DEFAULT_FEED_URL`])
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// HTTP timeout for the feed request (default: 30 seconds)
    #[serde(default = "default_feed_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout: default_feed_timeout(),
        }
    }
}

/// Asset download configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetConfig {
    /// URL template for the episode audio file; `{episode}` is replaced with
    /// the episode number (default: [`DEFAULT_AUDIO_TEMPLATE`])
    #[serde(default = "default_audio_template")]
    pub audio_template: String,

    /// URL template for the show notes document (default:
    /// [`DEFAULT_NOTES_TEMPLATE`])
    #[serde(default = "default_notes_template")]
    pub notes_template: String,

    /// HTTP timeout per download, covering the full transfer
    /// (default: 300 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            audio_template: default_audio_template(),
            notes_template: default_notes_template(),
            timeout: default_download_timeout(),
        }
    }
}

/// SMTP session configuration
///
/// The session is opened in plaintext and upgraded with STARTTLS before
/// authenticating, the way port 587 submission servers expect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Server hostname (default: "smtp.gmail.com")
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// Server port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Username for authentication, also used as the sender address
    #[serde(default)]
    pub username: String,

    /// Password for authentication
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Message content configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Recipient addresses (at least one required)
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Subject template; `{episode}` is replaced with the episode number
    /// (default: "Security Now #{episode}")
    #[serde(default = "default_subject_template")]
    pub subject_template: String,

    /// Plain-text message body (default: empty)
    #[serde(default)]
    pub body: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            subject_template: default_subject_template(),
            body: String::new(),
        }
    }
}

/// Run state configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding the marker file and downloaded episodes
    /// (default: the executable's directory)
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Marker filename, relative to `work_dir` (default: "last.txt")
    #[serde(default = "default_marker_file")]
    pub marker_file: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            marker_file: default_marker_file(),
        }
    }
}

/// Main configuration for a sn-mailer run
///
/// Built once at process start (from the CLI in the shipped binary) and
/// passed into [`Pipeline`](crate::pipeline::Pipeline); there is no
/// process-global state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feed checking settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Asset download settings
    #[serde(default)]
    pub assets: AssetConfig,

    /// SMTP session settings
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Message content settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Working directory and marker file settings
    #[serde(default)]
    pub state: StateConfig,

    /// Episode override; when set, the feed and the marker are bypassed and
    /// this episode is always sent
    #[serde(default)]
    pub episode_override: Option<u32>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_audio_template() -> String {
    DEFAULT_AUDIO_TEMPLATE.to_string()
}

fn default_notes_template() -> String {
    DEFAULT_NOTES_TEMPLATE.to_string()
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject_template() -> String {
    "Security Now #{episode}".to_string()
}

fn default_work_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_marker_file() -> String {
    "last.txt".to_string()
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
