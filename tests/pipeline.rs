//! End-to-end pipeline tests against mock HTTP servers and a recording
//! mailer. These cover the run scenarios: a new episode, an up-to-date feed,
//! an explicit override, and the feed-ahead-of-the-files window.

use async_trait::async_trait;
use sn_mailer::Result;
use sn_mailer::config::{AssetConfig, Config, DeliveryConfig, FeedConfig, SmtpConfig, StateConfig};
use sn_mailer::error::Error;
use sn_mailer::mail::{MailSender, OutgoingEmail};
use sn_mailer::pipeline::{Outcome, Pipeline};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Captures outgoing emails instead of talking to an SMTP server.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn feed_xml(episode: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:podcast="https://podcastindex.org/namespace/1.0">
    <channel>
        <title>Security Now (Audio)</title>
        <link>https://example.com/show</link>
        <description>Test feed</description>
        <item>
            <title>SN {episode}</title>
            <podcast:episode>{episode}</podcast:episode>
        </item>
    </channel>
</rss>"#
    )
}

async fn mount_feed(server: &MockServer, episode: u32) {
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_xml(episode)))
        .mount(server)
        .await;
}

async fn mount_assets(server: &MockServer, episode: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/sn/sn-{episode}-lq.mp3")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake mp3 bytes".to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/sn/sn-{episode}-notes.pdf")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 fake".to_vec()))
        .mount(server)
        .await;
}

fn test_config(server_uri: &str, work_dir: &Path, episode_override: Option<u32>) -> Config {
    Config {
        feed: FeedConfig {
            url: format!("{server_uri}/feed.xml"),
            ..FeedConfig::default()
        },
        assets: AssetConfig {
            audio_template: format!("{server_uri}/sn/sn-{{episode}}-lq.mp3"),
            notes_template: format!("{server_uri}/sn/sn-{{episode}}-notes.pdf"),
            ..AssetConfig::default()
        },
        smtp: SmtpConfig {
            username: "sender@example.com".to_string(),
            password: "secret".to_string(),
            ..SmtpConfig::default()
        },
        delivery: DeliveryConfig {
            recipients: vec![
                "one@example.com".to_string(),
                "two@example.com".to_string(),
            ],
            ..DeliveryConfig::default()
        },
        state: StateConfig {
            work_dir: work_dir.to_path_buf(),
            marker_file: "last.txt".to_string(),
        },
        episode_override,
    }
}

fn pipeline_with_recorder(config: Config) -> (Pipeline, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let pipeline = Pipeline::with_mailer(config, mailer.clone()).unwrap();
    (pipeline, mailer)
}

fn marker_content(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("last.txt")).unwrap()
}

#[tokio::test]
async fn new_episode_is_fetched_mailed_and_recorded() {
    let server = MockServer::start().await;
    mount_feed(&server, 901).await;
    mount_assets(&server, 901).await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("last.txt"), "900\n").unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Sent {
            episode: 901,
            marker_updated: true
        }
    );
    assert_eq!(marker_content(&dir), "901\n");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Security Now #901");
    assert_eq!(sent[0].from, "sender@example.com");
    assert_eq!(sent[0].recipients.len(), 2);
    assert_eq!(sent[0].attachments.len(), 2);
    assert_eq!(sent[0].attachments[0], dir.path().join("sn-901-lq.mp3"));
    assert_eq!(sent[0].attachments[1], dir.path().join("sn-901-notes.pdf"));

    // The downloads really landed in the working directory
    assert_eq!(
        fs::read(dir.path().join("sn-901-lq.mp3")).unwrap(),
        b"fake mp3 bytes"
    );
}

#[tokio::test]
async fn up_to_date_feed_changes_nothing() {
    let server = MockServer::start().await;
    mount_feed(&server, 901).await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("last.txt"), "901\n").unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome, Outcome::UpToDate { episode: 901 });
    assert_eq!(marker_content(&dir), "901\n");
    assert!(mailer.sent().is_empty());
    assert!(!dir.path().join("sn-901-lq.mp3").exists());
}

#[tokio::test]
async fn missing_marker_defaults_to_zero_and_sends() {
    let server = MockServer::start().await;
    mount_feed(&server, 901).await;
    mount_assets(&server, 901).await;

    let dir = TempDir::new().unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Sent {
            episode: 901,
            marker_updated: true
        }
    );
    assert_eq!(marker_content(&dir), "901\n");
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn override_sends_without_touching_feed_or_marker() {
    // No feed mock mounted: a feed request would 404 and fail the run,
    // proving the override path never checks the feed
    let server = MockServer::start().await;
    mount_assets(&server, 905).await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("last.txt"), "950\n").unwrap();

    let (pipeline, mailer) =
        pipeline_with_recorder(test_config(&server.uri(), dir.path(), Some(905)));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Sent {
            episode: 905,
            marker_updated: false
        }
    );
    assert_eq!(marker_content(&dir), "950\n", "marker must stay untouched");
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(mailer.sent()[0].subject, "Security Now #905");
}

#[tokio::test]
async fn missing_notes_abort_before_any_mail_is_sent() {
    let server = MockServer::start().await;
    mount_feed(&server, 901).await;
    Mock::given(method("GET"))
        .and(path("/sn/sn-901-lq.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake mp3 bytes".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sn/sn-901-notes.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("last.txt"), "900\n").unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::AssetUnavailable { status: 404, .. }));
    assert!(mailer.sent().is_empty(), "nothing may be mailed");
    assert_eq!(marker_content(&dir), "900\n", "marker must not advance");
}

#[tokio::test]
async fn feed_server_error_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::FeedStatus { status: 500, .. }));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn second_run_with_no_new_episode_is_idempotent() {
    let server = MockServer::start().await;
    mount_feed(&server, 901).await;
    mount_assets(&server, 901).await;

    let dir = TempDir::new().unwrap();

    let (pipeline, mailer) = pipeline_with_recorder(test_config(&server.uri(), dir.path(), None));

    let first = pipeline.run().await.unwrap();
    assert!(matches!(first, Outcome::Sent { episode: 901, .. }));

    let second = pipeline.run().await.unwrap();
    assert_eq!(second, Outcome::UpToDate { episode: 901 });

    assert_eq!(mailer.sent().len(), 1, "only the first run may send");
    assert_eq!(marker_content(&dir), "901\n");
}

#[tokio::test]
async fn empty_recipient_list_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config("http://127.0.0.1:1", dir.path(), None);
    config.delivery.recipients.clear();

    let err = Pipeline::with_mailer(config, Arc::new(RecordingMailer::default())).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}
