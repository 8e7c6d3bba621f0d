// tests/notify.rs
use std::sync::Mutex;

use async_trait::async_trait;
use subreddit_digest::notify::{deliver, format_message, DeliveryTally, Notifier, SlackNotifier};
use subreddit_digest::{Candidate, DeliveryError};

/// Records every message; fails the calls whose 1-based position is listed.
struct RecordingNotifier {
    fail_on: Vec<usize>,
    sent: Mutex<Vec<String>>,
    attempts: Mutex<usize>,
}

impl RecordingNotifier {
    fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            fail_on,
            sent: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let n = {
            let mut a = self.attempts.lock().unwrap();
            *a += 1;
            *a
        };
        if self.fail_on.contains(&n) {
            return Err(DeliveryError::Status {
                status: 500,
                body: "internal_error".into(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

fn candidate(n: u32) -> Candidate {
    Candidate {
        title: format!("Post {n}"),
        source_id: "InteriorDesign".into(),
        external_url: None,
        permalink: format!("https://reddit.com/r/InteriorDesign/comments/{n}/"),
        combined_text: format!("post {n}"),
    }
}

#[tokio::test]
async fn failure_on_second_item_does_not_block_third() {
    let notifier = RecordingNotifier::failing_on(vec![2]);
    let selection = vec![candidate(1), candidate(2), candidate(3)];

    let tally = deliver(&notifier, &selection).await;

    assert_eq!(tally.delivered, 2);
    assert_eq!(tally.failed, 1);
    assert_eq!(*notifier.attempts.lock().unwrap(), 3, "no retry for item 2");
    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].starts_with("*Post 1*"));
    assert!(sent[1].starts_with("*Post 3*"));
}

#[tokio::test]
async fn empty_selection_sends_nothing() {
    let notifier = RecordingNotifier::failing_on(vec![]);
    assert_eq!(deliver(&notifier, &[]).await, DeliveryTally::default());
    assert_eq!(*notifier.attempts.lock().unwrap(), 0);
}

#[tokio::test]
async fn slack_posts_text_payload() {
    let mut server = mockito::Server::new_async().await;
    let c = candidate(7);
    let expected = serde_json::json!({ "text": format_message(&c) });

    let mock = server
        .mock("POST", "/services/T/B/X")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(expected))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let slack = SlackNotifier::new(Some(format!("{}/services/T/B/X", server.url())));
    assert_eq!(deliver(&slack, &[c]).await.delivered, 1);

    mock.assert_async().await;
}

#[tokio::test]
async fn slack_non_2xx_is_a_delivery_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(404)
        .with_body("no_service")
        .create_async()
        .await;

    let slack = SlackNotifier::new(Some(server.url()));
    let err = slack.send("hello").await.unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::Status { status: 404, ref body } if body == "no_service"
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn slack_without_webhook_logs_but_does_not_count_as_delivered() {
    let slack = SlackNotifier::new(None);
    assert!(slack.is_dry_run());
    let tally = deliver(&slack, &[candidate(1), candidate(2)]).await;
    assert_eq!(
        tally,
        DeliveryTally {
            delivered: 0,
            logged_only: 2,
            failed: 0,
        }
    );
}
