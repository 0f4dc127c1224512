//! Tool servers over real HTTP, driven by raw requests and by the gateway.

mod common;

use axum::body::Body;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use common::{gateway, ToolServerSetup};
use piata_mcp::adapters::{LocalArtifactStore, NominatimConfig, NominatimGeocoder, ServerKind};
use piata_mcp::application::{FallbackPolicyEngine, ListingRequest, Orchestrator};
use piata_mcp::domain::fallback::Capability;
use piata_mcp::domain::tools::ToolOutput;
use piata_mcp::ports::{CapabilityProvider, ErrorKind, GatewayError, ToolGateway, TransportKind};

async fn post_call(base: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/call", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn inline_title_optimization() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Ads, temp.path()).spawn().await;

    let (status, body) = post_call(
        &base,
        json!({
            "id": "r1",
            "method": "tools/call",
            "params": {
                "name": "optimize_listing_title",
                "arguments": {
                    "title": "Apartament 3 camere",
                    "category": "imobiliare",
                    "location": "București"
                }
            }
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "r1");
    assert!(body.get("error").is_none());
    let result = &body["result"];
    assert_eq!(result["original_title"], "Apartament 3 camere");
    let suggestions = result["optimized_suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty() && suggestions.len() <= 5);
    assert!(suggestions
        .iter()
        .any(|s| s.as_str().unwrap().contains("București")));
}

#[tokio::test]
async fn unknown_tool_is_reported_in_envelope() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Ads, temp.path()).spawn().await;

    let (status, body) = post_call(
        &base,
        json!({
            "id": 7,
            "method": "tools/call",
            "params": {"name": "no_such_tool", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 7);
    assert_eq!(body["error"]["code"], -32601);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no_such_tool"));
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn wrong_method_is_rejected_without_interpretation() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Stock, temp.path()).spawn().await;

    let (status, body) = post_call(
        &base,
        json!({
            "id": "m1",
            "method": "tools/list",
            "params": {"name": "calculate_reorder_point", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "m1");
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn unparseable_body_gets_parse_error_and_null_id() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Database, temp.path()).spawn().await;

    let response = reqwest::Client::new()
        .post(format!("{}/call", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn gateway_call_returns_inline_output() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Stock, temp.path()).spawn().await;
    let gateway = gateway(&[("stock", &base)], None);

    let output = gateway
        .call(
            "stock",
            "calculate_reorder_point",
            json!({"daily_demand": 10.0, "lead_time_days": 5.0, "safety_stock": 20.0}),
            None,
        )
        .await
        .unwrap();

    let value = output.as_inline().unwrap();
    assert_eq!(value["reorder_point"], 70);
    assert!(gateway.last_healthy("stock").is_some());
}

#[tokio::test]
async fn gateway_surfaces_unknown_arguments_as_validation() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Ads, temp.path()).spawn().await;
    let gateway = gateway(&[("ads", &base)], None);

    let err = gateway
        .call(
            "ads",
            "optimize_listing_title",
            json!({"title": "Bicicleta", "category": "sport", "colour": "red"}),
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        GatewayError::Remote { code, message, data } => {
            assert_eq!(code, -32602);
            assert!(message.contains("colour"));
            assert_eq!(data.unwrap()["field"], "colour");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn gateway_lists_tools_and_checks_health() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Content, temp.path()).spawn().await;
    let gateway = gateway(&[("content", &base)], None);

    let tools = gateway.list_tools("content").await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
    assert!(names.contains(&"geocode_location"));
    assert!(names.contains(&"generate_seo_slug"));

    let health = gateway.health("content").await.unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "piata-content-tools");
}

#[tokio::test]
async fn bearer_token_is_required_when_configured() {
    let temp = TempDir::new().unwrap();
    let base = ToolServerSetup::new(ServerKind::Stock, temp.path())
        .token("s3cret")
        .spawn()
        .await;

    let raw = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(raw.status().as_u16(), 401);
    let body: Value = raw.json().await.unwrap();
    assert_eq!(body["code"], "AUTH_ERROR");

    let anonymous = gateway(&[("stock", &base)], None);
    let err = anonymous.health("stock").await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport {
            kind: TransportKind::Status,
            ..
        }
    ));

    let wrong = gateway(&[("stock", &base)], Some("guess"));
    assert!(wrong.health("stock").await.is_err());

    let authorized = gateway(&[("stock", &base)], Some("s3cret"));
    assert_eq!(authorized.health("stock").await.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let gateway = gateway(&[("ads", &common::dead_url().await)], None);

    let err = gateway
        .call("ads", "optimize_listing_title", json!({}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(gateway.last_healthy("ads").is_none());
}

#[tokio::test]
async fn slow_server_hits_the_per_call_timeout() {
    let router = Router::new().route(
        "/call",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"id": "late", "result": {}}))
        }),
    );
    let base = common::spawn(router).await;
    let gateway = gateway(&[("stock", &base)], None);

    let started = std::time::Instant::now();
    let err = gateway
        .call(
            "stock",
            "calculate_reorder_point",
            json!({}),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{:?}", err);
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(gateway.last_healthy("stock").is_none());
}

#[tokio::test]
async fn stalled_response_body_is_a_timeout() {
    let router = Router::new().route(
        "/call",
        post(|| async {
            let head = futures::stream::iter([Ok::<_, std::io::Error>(String::from("{\"id\":"))]);
            let tail = futures::stream::once(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(String::from("null,\"result\":{}}"))
            });
            Response::builder()
                .header("content-type", "application/json")
                .body(Body::from_stream(head.chain(tail)))
                .unwrap()
        }),
    );
    let base = common::spawn(router).await;
    let gateway = gateway(&[("stock", &base)], None);

    let err = gateway
        .call(
            "stock",
            "calculate_reorder_point",
            json!({}),
            Some(Duration::from_millis(300)),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{:?}", err);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let router = Router::new().route("/call", post(|| async { "<html>busy</html>" }));
    let base = common::spawn(router).await;
    let gateway = gateway(&[("stock", &base)], None);

    let err = gateway
        .call("stock", "calculate_reorder_point", json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Transport {
            kind: TransportKind::Malformed,
            ..
        }
    ));
}

/// A geocoding chain whose only provider is unreachable.
async fn unreachable_geocoders() -> FallbackPolicyEngine {
    let nominatim: Arc<dyn CapabilityProvider> = Arc::new(
        NominatimGeocoder::new(NominatimConfig::default().with_base_url(&common::dead_url().await))
            .unwrap(),
    );
    FallbackPolicyEngine::new().with_chain(Capability::Geocode, vec![nominatim])
}

#[tokio::test]
async fn orchestrator_prepares_listing_when_geocoders_fail() {
    let temp = TempDir::new().unwrap();
    let ads = ToolServerSetup::new(ServerKind::Ads, temp.path()).spawn().await;
    let content = ToolServerSetup::new(ServerKind::Content, temp.path())
        .fallback(unreachable_geocoders().await)
        .spawn()
        .await;
    let gateway = gateway(&[("ads", &ads), ("content", &content)], None);
    let orchestrator = Orchestrator::new(
        Arc::new(gateway),
        Arc::new(LocalArtifactStore::new(temp.path())),
    );

    let draft = orchestrator
        .prepare_listing(ListingRequest {
            title: "Bicicleta de oras".to_string(),
            category: "sport".to_string(),
            location: Some("Cluj-Napoca".to_string()),
            features: vec!["cadru aluminiu".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(draft.title.contains("Bicicleta"));
    assert!(!draft.title_suggestions.is_empty());
    assert!(draft.description.starts_with(&draft.title));
    assert!(draft.location.is_none());
    assert!(draft
        .notes
        .iter()
        .any(|n| n.contains("could not be geocoded")));
}

#[tokio::test]
async fn server_without_a_geocoding_chain_reports_internal_error() {
    let temp = TempDir::new().unwrap();
    let content = ToolServerSetup::new(ServerKind::Content, temp.path()).spawn().await;
    let gateway = gateway(&[("content", &content)], None);

    let err = gateway
        .call("content", "geocode_location", json!({"address": "Cluj-Napoca"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(matches!(err, GatewayError::Remote { code: -1, .. }));
}

#[tokio::test]
async fn pure_results_are_cached_by_the_orchestrator() {
    let temp = TempDir::new().unwrap();
    let content = ToolServerSetup::new(ServerKind::Content, temp.path()).spawn().await;
    let gateway = gateway(&[("content", &content)], None);
    let orchestrator = Orchestrator::new(
        Arc::new(gateway),
        Arc::new(LocalArtifactStore::new(temp.path())),
    );
    orchestrator.discover("content").await.unwrap();
    assert!(orchestrator.is_pure("content", "generate_seo_slug"));

    let args = json!({"text": "Apartament în București"});
    let first = orchestrator
        .call("content", "generate_seo_slug", args.clone(), None)
        .await
        .unwrap();
    let second = orchestrator
        .call("content", "generate_seo_slug", args, None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(matches!(first, ToolOutput::Inline(_)));
}
