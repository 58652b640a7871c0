//! # Integration Tests for lokapal-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot` over temporary
//! content and ledger directories: poll state, vote submission and its
//! precondition order, duplicate handling under concurrency, token gating
//! against a mock JSON-RPC endpoint, CORS, health and metrics.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use lokapal_api::state::{AppConfig, AppState};
use lokapal_api::store::VoteStore;
use lokapal_chain_client::{ChainClient, ChainConfig};
use lokapal_polls::FileLedger;

const WALLET: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";
const OTHER_WALLET: &str = "0x2222222222222222222222222222222222222222";

// -- Fixtures -----------------------------------------------------------------

struct TestEnv {
    content: tempfile::TempDir,
    votes: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let env = Self {
            content: tempfile::tempdir().unwrap(),
            votes: tempfile::tempdir().unwrap(),
        };
        env.write_poll("book-0", "shard-3", true, false);
        env.write_poll("book-0", "shard-4", false, false);
        env.write_poll("book-1", "shard-1", true, true);
        env
    }

    fn write_poll(&self, book: &str, chapter: &str, active: bool, gated: bool) {
        let dir = self.content.path().join(book);
        std::fs::create_dir_all(&dir).unwrap();
        let def = json!({
            "id": format!("poll_{book}_{chapter}"),
            "bookId": book,
            "chapterId": chapter,
            "active": active,
            "requiresBookToken": gated,
            "pollType": "guardian-affinity",
            "question": { "en": "Who do you stand with?", "es": "¿Con quién estás?" },
            "options": [
                { "id": "opt-a", "text": { "en": "Ravana", "es": "Ravana" } },
                { "id": "opt-b", "text": { "en": "Vibhishana", "es": "Vibhishana" } }
            ]
        });
        std::fs::write(dir.join(format!("{chapter}.json")), def.to_string()).unwrap();
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            content_dir: self.content.path().to_path_buf(),
            votes_dir: self.votes.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    fn state(&self) -> AppState {
        AppState::new(self.config())
    }

    fn app(&self) -> axum::Router {
        lokapal_api::app(self.state())
    }

    fn gated_app(&self, rpc: &MockServer) -> axum::Router {
        self.gated_app_with_timeout(rpc, 2)
    }

    fn gated_app_with_timeout(&self, rpc: &MockServer, timeout_secs: u64) -> axum::Router {
        let mut chain_config = ChainConfig::new(rpc.uri().parse().unwrap());
        chain_config.timeout_secs = timeout_secs;
        let config = self.config();
        let votes = VoteStore::File(FileLedger::new(
            config.votes_dir.clone(),
            config.storage_timeout,
        ));
        let state = AppState::with_backends(
            config,
            votes,
            Some(ChainClient::new(chain_config).unwrap()),
        );
        lokapal_api::app(state)
    }

    fn ledger_file(&self, poll_id: &str) -> std::path::PathBuf {
        self.votes.path().join(format!("{poll_id}.json"))
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn vote(poll_id: &str, option: &str, wallet: &str) -> Request<Body> {
    post_json(
        &format!("/api/polls/{poll_id}/vote"),
        json!({ "optionId": option, "walletAddress": wallet }),
    )
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn ledger_len(path: &Path) -> usize {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice::<Vec<Value>>(&bytes).unwrap().len(),
        Err(_) => 0,
    }
}

fn word(value: u8) -> String {
    format!("0x{}{value:02x}", "0".repeat(62))
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn liveness_probe() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), get("/health/liveness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn readiness_probe() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), get("/health/readiness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

#[tokio::test]
async fn readiness_fails_without_content_root() {
    let env = TestEnv::new();
    let config = AppConfig {
        content_dir: env.content.path().join("missing"),
        ..env.config()
    };
    let app = lokapal_api::app(AppState::new(config));
    let (status, _) = send(&app, get("/health/readiness")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn readiness_fails_when_votes_dir_is_a_file() {
    let env = TestEnv::new();
    let blocker = env.votes.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let app = lokapal_api::app(AppState::new(AppConfig {
        votes_dir: blocker,
        ..env.config()
    }));

    let (status, _) = send(&app, get("/health/readiness")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// -- Fetch poll state ---------------------------------------------------------

#[tokio::test]
async fn poll_state_without_wallet_hides_results() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), get("/api/books/book-0/chapters/shard-3/poll")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["poll"]["id"], "poll_book-0_shard-3");
    assert_eq!(body["poll"]["bookId"], "book-0");
    assert_eq!(body["poll"]["chapterId"], "shard-3");
    assert_eq!(body["poll"]["requiresBookToken"], false);
    assert_eq!(body["poll"]["pollType"], "guardian-affinity");
    assert_eq!(body["poll"]["active"], true);
    assert_eq!(body["poll"]["question"]["es"], "¿Con quién estás?");
    assert_eq!(body["poll"]["options"][1]["id"], "opt-b");
    assert_eq!(body["hasVoted"], false);
    assert!(body["userVote"].is_null());
    assert!(body["results"].is_null());
    assert!(body["totalVotes"].is_null());
}

#[tokio::test]
async fn chapter_without_poll_returns_null_poll() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), get("/api/books/book-0/chapters/shard-9/poll")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["poll"].is_null());
    assert_eq!(body["message"], "No poll available for this chapter");
}

#[tokio::test]
async fn malformed_identifiers_are_invalid_input() {
    let env = TestEnv::new();
    let app = env.app();

    let (status, body) = send(&app, get("/api/books/book_0/chapters/shard-3/poll")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = send(
        &app,
        get("/api/books/book-0/chapters/shard-3/poll?wallet=0x123"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn corrupt_definition_is_server_error_without_detail() {
    let env = TestEnv::new();
    std::fs::write(env.content.path().join("book-0").join("shard-7.json"), "{ nope").unwrap();

    let (status, body) = send(&env.app(), get("/api/books/book-0/chapters/shard-7/poll")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CORRUPT_DATA");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(!message.contains("shard-7"), "{message}");
}

// -- Submit vote --------------------------------------------------------------

#[tokio::test]
async fn first_vote_is_recorded_with_results() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), vote("poll_book-0_shard-3", "opt-a", WALLET)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Vote recorded successfully");
    assert_eq!(body["userVote"], "opt-a");
    assert_eq!(body["totalVotes"], 1);
    assert_eq!(
        body["results"],
        json!([
            { "optionId": "opt-a", "count": 1, "percentage": 100.0 },
            { "optionId": "opt-b", "count": 0, "percentage": 0.0 }
        ])
    );
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-3")), 1);
}

#[tokio::test]
async fn results_appear_after_voting() {
    let env = TestEnv::new();
    let app = env.app();
    send(&app, vote("poll_book-0_shard-3", "opt-a", OTHER_WALLET)).await;
    send(&app, vote("poll_book-0_shard-3", "opt-b", WALLET)).await;

    let uri = format!(
        "/api/books/book-0/chapters/shard-3/poll?wallet={}",
        WALLET.to_uppercase().replacen("0X", "0x", 1)
    );
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasVoted"], true);
    assert_eq!(body["userVote"], "opt-b");
    assert_eq!(body["totalVotes"], 2);
    assert_eq!(body["results"][0]["percentage"], 50.0);
    assert_eq!(body["results"][1]["percentage"], 50.0);
}

#[tokio::test]
async fn duplicate_vote_is_conflict_and_ledger_unchanged() {
    let env = TestEnv::new();
    let app = env.app();
    send(&app, vote("poll_book-0_shard-3", "opt-a", WALLET)).await;

    let (status, body) = send(
        &app,
        vote("poll_book-0_shard-3", "opt-b", &WALLET.to_uppercase().replacen("0X", "0x", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_VOTED");
    assert_eq!(body["error"]["message"], "You have already voted in this poll");
    assert_eq!(body["error"]["details"]["userVote"], "opt-a");
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-3")), 1);
}

#[tokio::test]
async fn unknown_option_is_invalid_input() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), vote("poll_book-0_shard-3", "opt-z", WALLET)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert_eq!(body["error"]["message"], "Invalid option ID");
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-3")), 0);
}

#[tokio::test]
async fn inactive_poll_rejects_any_vote() {
    let env = TestEnv::new();
    let app = env.app();
    for (option, wallet) in [("opt-a", WALLET), ("opt-z", WALLET), ("opt-a", "not-a-wallet")] {
        let (status, body) = send(&app, vote("poll_book-0_shard-4", option, wallet)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "POLL_INACTIVE");
    }
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-4")), 0);
}

#[tokio::test]
async fn unknown_or_unparseable_poll_is_not_found() {
    let env = TestEnv::new();
    let app = env.app();
    for poll_id in ["poll_book-9_shard-1", "poll-without-structure"] {
        let (status, body) = send(&app, vote(poll_id, "opt-a", WALLET)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{poll_id}");
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn malformed_wallet_is_invalid_input() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), vote("poll_book-0_shard-3", "opt-a", "0xabc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid wallet address format");
}

#[tokio::test]
async fn missing_fields_and_bad_json_are_invalid_input() {
    let env = TestEnv::new();
    let app = env.app();

    let (status, body) = send(
        &app,
        post_json("/api/polls/poll_book-0_shard-3/vote", json!({ "optionId": "opt-a" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Missing required fields: optionId and walletAddress"
    );

    let req = Request::builder()
        .method("POST")
        .uri("/api/polls/poll_book-0_shard-3/vote")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let env = TestEnv::new();
    let padding = "x".repeat(20 * 1024);
    let (status, _) = send(
        &env.app(),
        post_json(
            "/api/polls/poll_book-0_shard-3/vote",
            json!({ "optionId": "opt-a", "walletAddress": WALLET, "padding": padding }),
        ),
    )
    .await;
    assert!(status.is_client_error(), "got {status}");
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-3")), 0);
}

#[tokio::test]
async fn concurrent_duplicates_record_once() {
    let env = TestEnv::new();
    let app = env.app();

    let attempts: Vec<_> = (0..12)
        .map(|i| {
            let app = app.clone();
            let option = if i % 2 == 0 { "opt-a" } else { "opt-b" };
            tokio::spawn(async move { send(&app, vote("poll_book-0_shard-3", option, WALLET)).await })
        })
        .collect();

    let mut ok = 0;
    let mut conflict = 0;
    for handle in attempts {
        match handle.await.unwrap().0 {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => conflict += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((ok, conflict), (1, 11));
    assert_eq!(ledger_len(&env.ledger_file("poll_book-0_shard-3")), 1);
}

#[tokio::test]
async fn unwritable_vote_store_is_storage_unavailable() {
    let env = TestEnv::new();
    let blocker = env.votes.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let app = lokapal_api::app(AppState::new(AppConfig {
        votes_dir: blocker.clone(),
        ..env.config()
    }));

    let (status, body) = send(&app, vote("poll_book-0_shard-3", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "STORAGE_UNAVAILABLE");
    assert!(!body["error"]["message"].as_str().unwrap().contains("blocker"));
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
}

// -- Token gating -------------------------------------------------------------

#[tokio::test]
async fn gated_poll_rejects_wallet_without_token() {
    let env = TestEnv::new();
    let rpc = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1, "result": word(0)
        })))
        .mount(&rpc)
        .await;

    let (status, body) = send(&env.gated_app(&rpc), vote("poll_book-1_shard-1", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "TOKEN_REQUIRED");
    assert_eq!(ledger_len(&env.ledger_file("poll_book-1_shard-1")), 0);
}

#[tokio::test]
async fn gated_poll_accepts_token_holder() {
    let env = TestEnv::new();
    let rpc = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1, "result": word(1)
        })))
        .expect(1)
        .mount(&rpc)
        .await;

    let (status, body) = send(&env.gated_app(&rpc), vote("poll_book-1_shard-1", "opt-b", WALLET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userVote"], "opt-b");
}

#[tokio::test]
async fn ungated_poll_never_calls_chain() {
    let env = TestEnv::new();
    let rpc = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&rpc)
        .await;

    let (status, _) = send(&env.gated_app(&rpc), vote("poll_book-0_shard-3", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn chain_failure_is_storage_unavailable() {
    let env = TestEnv::new();
    let rpc = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&rpc)
        .await;

    let (status, body) = send(&env.gated_app(&rpc), vote("poll_book-1_shard-1", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "STORAGE_UNAVAILABLE");
    assert!(!body["error"]["message"].as_str().unwrap().contains("upstream"));
}

#[tokio::test]
async fn slow_chain_is_storage_unavailable() {
    let env = TestEnv::new();
    let rpc = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": word(1) }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&rpc)
        .await;

    let app = env.gated_app_with_timeout(&rpc, 1);
    let (status, body) = send(&app, vote("poll_book-1_shard-1", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "STORAGE_UNAVAILABLE");
    assert_eq!(ledger_len(&env.ledger_file("poll_book-1_shard-1")), 0);
}

#[tokio::test]
async fn gated_poll_without_chain_reader_is_advisory() {
    let env = TestEnv::new();
    let (status, _) = send(&env.app(), vote("poll_book-1_shard-1", "opt-a", WALLET)).await;
    assert_eq!(status, StatusCode::OK);
}

// -- CORS ---------------------------------------------------------------------

#[tokio::test]
async fn preflight_allows_any_origin() {
    let env = TestEnv::new();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/polls/poll_book-0_shard-3/vote")
        .header("origin", "https://lokapal.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = env.app().oneshot(req).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST") && methods.contains("GET"), "{methods}");
    assert!(headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .eq_ignore_ascii_case("content-type"));
}

#[tokio::test]
async fn simple_request_carries_cors_header() {
    let env = TestEnv::new();
    let req = Request::builder()
        .uri("/api/books/book-0/chapters/shard-3/poll")
        .header("origin", "https://lokapal.example")
        .body(Body::empty())
        .unwrap();
    let response = env.app().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

// -- Metrics & OpenAPI --------------------------------------------------------

#[tokio::test]
async fn metrics_count_votes_and_rejections() {
    let env = TestEnv::new();
    let app = env.app();
    send(&app, vote("poll_book-0_shard-3", "opt-a", WALLET)).await;
    send(&app, vote("poll_book-0_shard-3", "opt-a", WALLET)).await;
    send(&app, vote("poll_book-0_shard-4", "opt-a", OTHER_WALLET)).await;

    let (status, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votesRecorded"], 1);
    assert_eq!(body["votesRejected"], 2);
    assert_eq!(body["errors"], 2);
    assert_eq!(body["requests"], 3);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let env = TestEnv::new();
    let (status, body) = send(&env.app(), get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/polls/{poll_id}/vote"]["post"].is_object());
}
