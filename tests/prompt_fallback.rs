//! Prompt store against a real HTTP remote and an unreachable one.

mod common;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use secrecy::Secret;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use piata_mcp::adapters::{HttpPromptBackend, HttpPromptConfig, LocalPromptBackend};
use piata_mcp::application::{PromptLocation, PromptStore};
use piata_mcp::ports::PromptStoreError;

type Prompts = Arc<Mutex<BTreeMap<String, Value>>>;

async fn save_prompt(State(prompts): State<Prompts>, Json(body): Json<Value>) -> StatusCode {
    let Some(name) = body.get("name").and_then(Value::as_str).map(str::to_string) else {
        return StatusCode::BAD_REQUEST;
    };
    prompts.lock().unwrap().insert(name, body);
    StatusCode::CREATED
}

async fn load_prompt(State(prompts): State<Prompts>, Path(name): Path<String>) -> impl IntoResponse {
    match prompts.lock().unwrap().get(&name) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_prompts(State(prompts): State<Prompts>) -> Json<Value> {
    let names: Vec<String> = prompts.lock().unwrap().keys().cloned().collect();
    Json(json!({ "prompts": names }))
}

/// In-memory stand-in for the remote prompt service.
async fn spawn_remote() -> (String, Prompts) {
    let prompts: Prompts = Arc::default();
    let router = Router::new()
        .route("/prompts", get(list_prompts).post(save_prompt))
        .route("/prompts/:name", get(load_prompt))
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route(
            "/tools",
            get(|| async {
                Json(json!({
                    "ads": ["optimize_listing_title", {"name": "suggest_ad_keywords"}],
                    "content": ["generate_seo_slug"]
                }))
            }),
        )
        .with_state(prompts.clone());
    (common::spawn(router).await, prompts)
}

fn store(local_dir: &std::path::Path, remote_url: &str) -> PromptStore {
    let remote = HttpPromptBackend::new(
        HttpPromptConfig::new(remote_url)
            .with_auth_token(Secret::new("token".to_string()))
            .with_timeout(std::time::Duration::from_secs(2)),
    )
    .unwrap();
    PromptStore::new(Arc::new(LocalPromptBackend::new(local_dir))).with_remote(Arc::new(remote))
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local_file() {
    let temp = TempDir::new().unwrap();
    let store = store(temp.path(), &common::dead_url().await);

    let location = store.save("p1", json!({"v": 1}), true).await.unwrap();

    assert_eq!(location, PromptLocation::Local);
    assert!(temp.path().join("p1.json").exists());
    assert_eq!(store.load("p1", true).await.unwrap(), Some(json!({"v": 1})));
    assert_eq!(store.list(true).await.unwrap(), vec!["p1".to_string()]);

    let status = store.test_connection().await;
    assert!(status.remote_configured);
    assert!(!status.remote_reachable);
}

#[tokio::test]
async fn reachable_remote_holds_the_prompt() {
    let temp = TempDir::new().unwrap();
    let (url, prompts) = spawn_remote().await;
    let store = store(temp.path(), &url);

    let location = store
        .save("listing_intro", json!({"template": "Vand {title}"}), true)
        .await
        .unwrap();

    assert_eq!(location, PromptLocation::Remote);
    assert!(!temp.path().join("listing_intro.json").exists());
    assert_eq!(
        prompts.lock().unwrap()["listing_intro"]["content"]["template"],
        "Vand {title}"
    );
    assert_eq!(
        store.load("listing_intro", true).await.unwrap(),
        Some(json!({"template": "Vand {title}"}))
    );
    assert_eq!(
        store.list(true).await.unwrap(),
        vec!["listing_intro".to_string()]
    );
    assert!(store.test_connection().await.remote_reachable);
}

#[tokio::test]
async fn remote_miss_falls_back_to_local_copy() {
    let temp = TempDir::new().unwrap();
    let (url, _prompts) = spawn_remote().await;
    let store = store(temp.path(), &url);

    let location = store.save("offline", json!(["a", "b"]), false).await.unwrap();
    assert_eq!(location, PromptLocation::Local);

    assert_eq!(
        store.load("offline", true).await.unwrap(),
        Some(json!(["a", "b"]))
    );
    assert_eq!(store.load("never_saved", true).await.unwrap(), None);
}

#[tokio::test]
async fn available_tools_come_from_the_remote() {
    let temp = TempDir::new().unwrap();
    let (url, _prompts) = spawn_remote().await;
    let store = store(temp.path(), &url);

    let tools = store.list_available_tools().await.unwrap();

    assert_eq!(
        tools["ads"],
        vec!["optimize_listing_title".to_string(), "suggest_ad_keywords".to_string()]
    );
    assert_eq!(tools["content"], vec!["generate_seo_slug".to_string()]);
}

#[tokio::test]
async fn unsafe_prompt_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    let (url, prompts) = spawn_remote().await;
    let store = store(temp.path(), &url);

    for name in ["../escape", ".hidden", ""] {
        let err = store.save(name, json!({}), true).await.unwrap_err();
        assert!(matches!(err, PromptStoreError::InvalidName(_)), "{}", name);
    }
    assert!(prompts.lock().unwrap().is_empty());
}
