use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use contest_picker::api::router;
use contest_picker::auth::AuthConfig;
use contest_picker::config::ServerConfig;
use contest_picker::state::AppState;
use contest_picker::store::HistoryStore;
use contest_picker::types::{DrawOutcome, HistoryRecord, LeaderboardEntry, ParticipantWeight};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

fn test_state(history_path: &Path, seed: u64) -> Arc<AppState> {
    let config = ServerConfig {
        history_path: history_path.to_path_buf(),
        seed: Some(seed),
        ..ServerConfig::default()
    };
    Arc::new(AppState::new(config))
}

fn open_app(state: Arc<AppState>) -> Router {
    router(state, Arc::new(AuthConfig::default()))
}

fn history_file(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("ContestHistory.csv")
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("valid JSON body")
}

/// End-to-end flow: fresh history file, roster upload, draw, persisted counts
#[tokio::test]
async fn test_full_contest_flow() {
    let dir = tempfile::tempdir().unwrap();
    let path = history_file(&dir);
    let state = test_state(&path, 7);

    // 1. Missing history is created with headers only
    assert!(state.store.ensure_initialized().unwrap());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "username,total_entries,total_wins\n"
    );

    let app = open_app(state);

    // 2. Upload roster
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/roster",
        "username,answer\nalice,Paris\nbob,Paris\n",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let summary: serde_json::Value = json(&body);
    assert_eq!(summary["participants"], 2);

    // 3. Preview weights
    let (status, body) = send(&app, Method::GET, "/api/weights", "").await;
    assert_eq!(status, StatusCode::OK);
    let weights: Vec<ParticipantWeight> = json(&body);
    assert_eq!(weights[0].weight, 10.0);
    assert_eq!(weights[1].weight, 0.0);

    // 4. Draw: first of two newcomers always wins
    let (status, body) = send(&app, Method::POST, "/api/draw", "").await;
    assert_eq!(status, StatusCode::OK);
    let outcome: DrawOutcome = json(&body);
    assert_eq!(outcome.winner, "alice");
    assert_eq!(outcome.participants, 2);

    // 5. History persisted on disk
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "username,total_entries,total_wins\nalice,1,1\nbob,1,0\n"
    );

    let (status, body) = send(&app, Method::GET, "/api/history", "").await;
    assert_eq!(status, StatusCode::OK);
    let history: Vec<HistoryRecord> = json(&body);
    assert_eq!(history.len(), 2);

    // 6. Last draw and leaderboard
    let (status, body) = send(&app, Method::GET, "/api/draw/last", "").await;
    assert_eq!(status, StatusCode::OK);
    let last: DrawOutcome = json(&body);
    assert_eq!(last.id, outcome.id);

    let (_, body) = send(&app, Method::GET, "/api/leaderboard", "").await;
    let board: Vec<LeaderboardEntry> = json(&body);
    assert_eq!(board[0].username, "alice");
    assert_eq!(board[0].win_rate, 1.0);
}

#[tokio::test]
async fn test_existing_history_is_updated_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = history_file(&dir);
    std::fs::write(
        &path,
        "username,total_entries,total_wins\ncarol,9,4\nbob,2,0\n",
    )
    .unwrap();
    let app = open_app(test_state(&path, 21));

    let (status, _) = send(&app, Method::POST, "/api/roster", "username\nbob\ndan\n").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, "/api/draw", "").await;
    assert_eq!(status, StatusCode::OK);
    let outcome: DrawOutcome = json(&body);
    assert!(outcome.winner == "bob" || outcome.winner == "dan");

    let (_, body) = send(&app, Method::GET, "/api/history", "").await;
    let history: Vec<HistoryRecord> = json(&body);
    let get = |name: &str| history.iter().find(|r| r.username == name).cloned().unwrap();

    assert_eq!(get("carol").total_entries, 9);
    assert_eq!(get("carol").total_wins, 4);
    assert_eq!(get("bob").total_entries, 3);
    assert_eq!(get("dan").total_entries, 1);
    assert_eq!(get("bob").total_wins + get("dan").total_wins, 1);
}

#[tokio::test]
async fn test_draw_without_roster() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&history_file(&dir), 1);
    state.store.ensure_initialized().unwrap();
    let app = open_app(state);

    let (status, body) = send(&app, Method::POST, "/api/draw", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = json(&body);
    assert_eq!(error["error"], "validation");
}

#[tokio::test]
async fn test_roster_upload_errors() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&history_file(&dir), 1);
    state.store.ensure_initialized().unwrap();
    let app = open_app(state);

    let (status, body) = send(&app, Method::POST, "/api/roster", "name\nalice\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = json(&body);
    assert_eq!(error["error"], "validation");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("'username' column"));

    let (status, body) = send(&app, Method::POST, "/api/roster", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = json(&body);
    assert_eq!(error["error"], "empty_input");

    let (status, _) = send(&app, Method::GET, "/api/roster", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_history_blocks_roster_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = history_file(&dir);
    let app = open_app(test_state(&path, 1));

    let (status, body) = send(&app, Method::POST, "/api/roster", "username\nalice\n").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = json(&body);
    assert_eq!(error["error"], "not_found");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_malformed_history_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = history_file(&dir);
    std::fs::write(&path, "username,total_entries,total_wins\nbob,x,0\n").unwrap();
    let app = open_app(test_state(&path, 1));

    let (status, _) = send(&app, Method::POST, "/api/roster", "username\nbob\n").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/api/draw", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: serde_json::Value = json(&body);
    assert_eq!(error["error"], "storage");

    // Untouched
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "username,total_entries,total_wins\nbob,x,0\n"
    );
}

#[tokio::test]
async fn test_seeded_draws_are_reproducible() {
    let roster = "username\na\nb\nc\nd\ne\nf\n";
    let mut winners = Vec::new();

    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&history_file(&dir), 99);
        state.store.ensure_initialized().unwrap();
        let app = open_app(state);

        send(&app, Method::POST, "/api/roster", roster).await;
        let mut run = Vec::new();
        for _ in 0..5 {
            let (_, body) = send(&app, Method::POST, "/api/draw", "").await;
            let outcome: DrawOutcome = json(&body);
            run.push(outcome.winner);
        }
        winners.push(run);
    }

    assert_eq!(winners[0], winners[1]);
}

#[tokio::test]
async fn test_host_auth_protects_api() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&history_file(&dir), 1);
    state.store.ensure_initialized().unwrap();
    let auth = Arc::new(AuthConfig::new("admin", "secret"));
    let app = router(state, auth);

    let (status, _) = send(&app, Method::GET, "/api/history", "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays public
    let (status, body) = send(&app, Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let request = Request::builder()
        .uri("/api/history")
        .header(header::AUTHORIZATION, "Basic YWRtaW46c2VjcmV0")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
