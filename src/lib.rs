//! # sn-mailer
//!
//! Checks the Security Now podcast feed for a new episode, downloads the
//! low-quality audio and the show notes, and mails both as attachments to a
//! list of recipients. The last-sent episode number is kept in a small marker
//! file so a scheduled run sends each episode exactly once.
//!
//! The tool is a one-shot pipeline meant to run from cron or a systemd timer:
//! load the marker, check the feed, and if the feed is ahead, download both
//! files, send the mail, and record the new number. A failed download aborts
//! the run before anything is sent, so the next run retries the same episode.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sn_mailer::config::{Config, DeliveryConfig, SmtpConfig};
//! use sn_mailer::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sn_mailer::Error> {
//!     let config = Config {
//!         smtp: SmtpConfig {
//!             username: "sender@example.com".to_string(),
//!             password: "app-password".to_string(),
//!             ..SmtpConfig::default()
//!         },
//!         delivery: DeliveryConfig {
//!             recipients: vec!["you@example.com".to_string()],
//!             ..DeliveryConfig::default()
//!         },
//!         ..Config::default()
//!     };
//!
//!     let outcome = Pipeline::new(config)?.run().await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Episode asset downloads
pub mod assets;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Podcast feed checking
pub mod feed;
/// Mail composition and SMTP submission
pub mod mail;
/// Last-sent episode tracking
pub mod marker;
/// The check-and-mail pipeline
pub mod pipeline;

// Re-export commonly used types
pub use assets::{AssetFetcher, EpisodeAssets};
pub use config::Config;
pub use error::{Error, Result};
pub use feed::FeedChecker;
pub use mail::{MailSender, OutgoingEmail, SmtpMailer};
pub use marker::{EpisodeMarker, MarkerState};
pub use pipeline::{Outcome, Pipeline};
