// tests/reddit_provider.rs
use std::time::Duration;

use mockito::Matcher;
use subreddit_digest::config::{Listing, RedditCredentials, RedditSettings};
use subreddit_digest::{DigestError, FetchError, RedditClient, SourceClient};

const TOKEN_BODY: &str = r#"{"access_token":"tok-123","token_type":"bearer","expires_in":86400,"scope":"*"}"#;

const LISTING_BODY: &str = r#"{
  "kind": "Listing",
  "data": {
    "after": null,
    "children": [
      {"kind": "t3", "data": {
        "title": "Restored a mid-century dresser",
        "selftext": "Picked it up second-hand & sanded it down",
        "url": "https://i.redd.it/abc.jpg",
        "permalink": "/r/DIY/comments/abc/restored_a_midcentury_dresser/"
      }},
      {"kind": "t3", "data": {
        "title": "Self post",
        "selftext": "",
        "url": "",
        "permalink": "/r/DIY/comments/def/self_post/"
      }},
      {"kind": "t3", "data": {
        "title": "Broken entry without permalink",
        "selftext": ""
      }}
    ]
  }
}"#;

fn creds() -> RedditCredentials {
    RedditCredentials {
        client_id: "cid".into(),
        client_secret: "secret".into(),
        user_agent: "digest-test/0.1".into(),
    }
}

fn settings(server: &mockito::Server) -> RedditSettings {
    RedditSettings {
        listing: Listing::Hot,
        auth_url: format!("{}/api/v1/access_token", server.url()),
        api_base: server.url(),
    }
}

async fn mock_token(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("POST", "/api/v1/access_token")
        // base64("cid:secret")
        .match_header("authorization", "Basic Y2lkOnNlY3JldA==")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "client_credentials".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .create_async()
        .await
}

#[tokio::test]
async fn fetches_and_maps_listing() {
    let mut server = mockito::Server::new_async().await;
    let token = mock_token(&mut server).await;
    let listing = server
        .mock("GET", "/r/DIY/hot")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("raw_json".into(), "1".into()),
        ]))
        .match_header("authorization", "Bearer tok-123")
        .match_header("user-agent", "digest-test/0.1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING_BODY)
        .create_async()
        .await;

    let client = RedditClient::connect(&creds(), &settings(&server), Duration::from_secs(5))
        .await
        .unwrap();
    let posts = client.fetch_recent("DIY", 20).await.unwrap();

    assert_eq!(posts.len(), 2, "entry without permalink is dropped");
    assert_eq!(posts[0].title, "Restored a mid-century dresser");
    assert_eq!(posts[0].body, "Picked it up second-hand & sanded it down");
    assert_eq!(posts[0].external_url.as_deref(), Some("https://i.redd.it/abc.jpg"));
    assert_eq!(
        posts[0].permalink,
        "https://reddit.com/r/DIY/comments/abc/restored_a_midcentury_dresser/"
    );
    assert_eq!(posts[1].external_url, None);

    token.assert_async().await;
    listing.assert_async().await;
}

#[tokio::test]
async fn rejected_token_request_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/api/v1/access_token")
        .with_status(401)
        .with_body(r#"{"message":"Unauthorized","error":401}"#)
        .create_async()
        .await;

    let err = RedditClient::connect(&creds(), &settings(&server), Duration::from_secs(5))
        .await
        .err()
        .expect("connect must fail");
    assert!(matches!(err, DigestError::InvalidCredentials(_)));
}

#[tokio::test]
async fn token_error_body_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/api/v1/access_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let err = RedditClient::connect(&creds(), &settings(&server), Duration::from_secs(5))
        .await
        .err()
        .expect("connect must fail");
    assert!(matches!(err, DigestError::InvalidCredentials(ref m) if m == "invalid_grant"));
}

#[tokio::test]
async fn listing_statuses_map_to_error_kinds() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server).await;
    // Mocks stay registered only while alive.
    let mut mocks = Vec::new();
    for (sub, status) in [("Private", 403), ("Banned", 404), ("Busy", 429), ("Down", 503)] {
        let path = format!("/r/{sub}/hot");
        mocks.push(
            server
                .mock("GET", path.as_str())
                .match_query(Matcher::Any)
                .with_status(status)
                .create_async()
                .await,
        );
    }
    mocks.push(
        server
            .mock("GET", "/r/Expired/hot")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await,
    );
    mocks.push(
        server
            .mock("GET", "/r/Garbage/hot")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>search results</html>")
            .create_async()
            .await,
    );

    let client = RedditClient::connect(&creds(), &settings(&server), Duration::from_secs(5))
        .await
        .unwrap();

    for sub in ["Private", "Banned", "Busy", "Down", "Garbage"] {
        let err = client.fetch_recent(sub, 20).await.unwrap_err();
        assert!(
            matches!(err, FetchError::Unavailable { ref source_id, .. } if source_id == sub),
            "{sub}: {err}"
        );
    }
    let err = client.fetch_recent("Expired", 20).await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn limit_is_clamped_to_page_size() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server).await;
    let listing = server
        .mock("GET", "/r/DIY/new")
        .match_query(Matcher::UrlEncoded("limit".into(), "100".into()))
        .with_status(200)
        .with_body(r#"{"data":{"children":[]}}"#)
        .create_async()
        .await;

    let mut s = settings(&server);
    s.listing = Listing::New;
    let client = RedditClient::connect(&creds(), &s, Duration::from_secs(5))
        .await
        .unwrap();
    let posts = client.fetch_recent("DIY", 500).await.unwrap();

    assert!(posts.is_empty());
    listing.assert_async().await;
}
