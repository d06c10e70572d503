//! The check-and-mail pipeline
//!
//! Wires the marker, feed checker, asset fetcher, and mailer into one linear
//! flow: load state, check the feed, and if the feed is ahead (or an explicit
//! episode was requested), download both assets, send the mail, and record
//! the new number. There are exactly two decision points and no retries; any
//! failure aborts the run and leaves the marker untouched, so the next
//! scheduled run starts over.

use crate::assets::AssetFetcher;
use crate::config::{Config, expand_episode};
use crate::error::{Error, Result};
use crate::feed::FeedChecker;
use crate::mail::{MailSender, OutgoingEmail, SmtpMailer};
use crate::marker::EpisodeMarker;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What a pipeline run did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The feed's newest episode was already sent; nothing to do
    UpToDate {
        /// The episode number both the feed and the marker agree on
        episode: u32,
    },

    /// An episode was downloaded and mailed
    Sent {
        /// The episode number that was sent
        episode: u32,

        /// False when the run used an explicit override (the marker is
        /// deliberately left alone) or when the post-send marker write failed
        marker_updated: bool,
    },
}

/// One-shot episode check-and-mail pipeline
pub struct Pipeline {
    config: Config,
    feed: FeedChecker,
    assets: AssetFetcher,
    mailer: Arc<dyn MailSender>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("mailer", &self.mailer.name())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline that sends through SMTP, per the configuration
    ///
    /// # Errors
    /// Returns an error for an invalid configuration or unusable SMTP relay
    /// parameters.
    pub fn new(config: Config) -> Result<Self> {
        let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
        Self::with_mailer(config, mailer)
    }

    /// Create a pipeline with a custom mail transport
    ///
    /// # Errors
    /// Returns an error when no recipients are configured or an HTTP client
    /// cannot be created.
    pub fn with_mailer(config: Config, mailer: Arc<dyn MailSender>) -> Result<Self> {
        if config.delivery.recipients.is_empty() {
            return Err(Error::Config {
                message: "at least one recipient is required".to_string(),
                key: Some("delivery.recipients".to_string()),
            });
        }

        let feed = FeedChecker::new(&config.feed)?;
        let assets = AssetFetcher::new(&config.assets)?;

        Ok(Self {
            config,
            feed,
            assets,
            mailer,
        })
    }

    /// Run the pipeline once
    ///
    /// # Errors
    /// Propagates feed, download, and mail failures; see the module docs for
    /// what each aborts. A marker write failure after a successful send is
    /// logged and reported through [`Outcome::Sent`] instead.
    pub async fn run(&self) -> Result<Outcome> {
        let work_dir = &self.config.state.work_dir;

        // An explicit override skips both the marker and the feed check
        let (episode, marker) = match self.config.episode_override {
            Some(number) => {
                info!(episode = number, "episode override given, skipping feed check");
                (number, None)
            }
            None => {
                let marker = EpisodeMarker::new(work_dir.join(&self.config.state.marker_file));
                let last = marker.load().episode();
                let latest = self.feed.latest_episode().await?;
                info!(latest, last, "feed checked");

                if latest == last {
                    info!("no new episode");
                    return Ok(Outcome::UpToDate { episode: latest });
                }
                (latest, Some(marker))
            }
        };

        debug!(episode, "will send episode");
        let assets = self.assets.fetch(episode, work_dir).await?;

        let email = OutgoingEmail {
            from: self.config.smtp.username.clone(),
            recipients: self.config.delivery.recipients.clone(),
            subject: expand_episode(&self.config.delivery.subject_template, episode),
            body: self.config.delivery.body.clone(),
            attachments: assets.attachment_paths(),
        };
        debug!(mailer = self.mailer.name(), "sending email");
        self.mailer.send(&email).await?;

        // The send cannot be rolled back, so a failed marker write is logged
        // and surfaced through the outcome instead of failing the run; the
        // next run will simply send the same episode again.
        let marker_updated = match marker {
            Some(marker) => match marker.record(episode) {
                Ok(()) => true,
                Err(e) => {
                    error!(path = %marker.path().display(), error = %e, "could not update marker file");
                    false
                }
            },
            None => false,
        };

        info!(episode, "sent");
        Ok(Outcome::Sent {
            episode,
            marker_updated,
        })
    }
}
