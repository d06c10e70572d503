//! Podcast feed checking
//!
//! Fetches the configured RSS feed and reads the newest item's episode
//! number from its `podcast:episode` element (podcastindex.org namespace).
//! The episode number is the only field consumed; the enclosure URLs in the
//! feed are not reliable for this show, which is why asset URLs are derived
//! from templates instead (see [`crate::assets`]).

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use rss::Channel;
use tracing::debug;

/// Namespace prefix carrying the episode number element
const PODCAST_NS_PREFIX: &str = "podcast";

/// Element holding the episode number within a feed item
const EPISODE_ELEMENT: &str = "episode";

/// Checks a podcast feed for the newest episode number
pub struct FeedChecker {
    /// HTTP client for fetching the feed
    http_client: reqwest::Client,

    /// Feed URL to poll
    url: String,
}

impl FeedChecker {
    /// Create a feed checker from configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("sn-mailer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
        })
    }

    /// Fetch the feed and return the newest item's episode number
    ///
    /// # Errors
    /// Fails on a network error, a non-success HTTP status, an unparsable
    /// feed, or a first item without a numeric `podcast:episode` element.
    /// The pipeline does not recover from any of these; the run aborts.
    pub async fn latest_episode(&self) -> Result<u32> {
        debug!(url = %self.url, "retrieving podcast feed");

        let response = self.http_client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let content = response.text().await?;
        let episode = parse_latest_episode(&content)?;

        debug!(episode, "feed retrieved");
        Ok(episode)
    }
}

/// Extract the newest item's episode number from raw RSS content
fn parse_latest_episode(content: &str) -> Result<u32> {
    let channel = content
        .parse::<Channel>()
        .map_err(|e| Error::Feed(format!("RSS parse error: {e}")))?;

    let item = channel
        .items()
        .first()
        .ok_or_else(|| Error::Feed("feed has no items".to_string()))?;

    let value = item
        .extensions()
        .get(PODCAST_NS_PREFIX)
        .and_then(|elements| elements.get(EPISODE_ELEMENT))
        .and_then(|episodes| episodes.first())
        .and_then(|ext| ext.value())
        .ok_or_else(|| Error::Feed("first item has no podcast:episode element".to_string()))?;

    value
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::Feed(format!("podcast:episode is not a number: {value:?}")))
}
