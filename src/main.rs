//! CLI entry point for sn-mailer.

use clap::Parser;
use sn_mailer::config::{
    Config, DEFAULT_FEED_URL, DeliveryConfig, FeedConfig, SmtpConfig, StateConfig,
};
use sn_mailer::error::Error;
use sn_mailer::pipeline::{Outcome, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sn-mailer")]
#[command(version)]
#[command(about = "Download and mail the most recent Security Now episode, if not already sent")]
struct Cli {
    /// Sender email username
    #[arg(value_name = "USERNAME")]
    username: String,

    /// Sender email password
    #[arg(value_name = "PASSWORD")]
    password: String,

    /// Recipient email address
    #[arg(value_name = "RECIPIENT", required = true)]
    recipients: Vec<String>,

    /// Instead of checking the feed, just send the specified episode
    #[arg(short, long, value_name = "NUMBER")]
    episode: Option<u32>,

    /// Email body
    #[arg(short, long, default_value = "")]
    body: String,

    /// Dir to store the marker file and downloaded content (default: executable's directory)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// File to store the last-sent episode number
    #[arg(short, long, value_name = "FILE", default_value = "last.txt")]
    lastfile: String,

    /// SMTP server name
    #[arg(short, long, default_value = "smtp.gmail.com")]
    server: String,

    /// SMTP server port
    #[arg(short, long, default_value_t = 587)]
    port: u16,

    /// Podcast feed URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // LOG_LEVEL selects verbosity (trace/debug/info/warn/error); an unset or
    // unrecognized value falls back to info, matching the documented default
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let work_dir = cli
        .dir
        .unwrap_or_else(|| StateConfig::default().work_dir);

    let config = Config {
        feed: FeedConfig {
            url: cli.feed_url,
            ..FeedConfig::default()
        },
        smtp: SmtpConfig {
            host: cli.server,
            port: cli.port,
            username: cli.username,
            password: cli.password,
        },
        delivery: DeliveryConfig {
            recipients: cli.recipients,
            body: cli.body,
            ..DeliveryConfig::default()
        },
        state: StateConfig {
            work_dir,
            marker_file: cli.lastfile,
        },
        episode_override: cli.episode,
        ..Config::default()
    };

    let pipeline = Pipeline::new(config)?;
    match pipeline.run().await? {
        Outcome::UpToDate { episode } => {
            tracing::info!(episode, "nothing to do");
        }
        Outcome::Sent { episode, .. } => {
            tracing::info!(episode, "episode sent");
        }
    }

    Ok(())
}
