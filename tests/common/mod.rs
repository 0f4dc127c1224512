//! Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use axum::Router;
use secrecy::Secret;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use piata_mcp::adapters::http::{tool_server_router, AuthState};
use piata_mcp::adapters::{HttpToolGateway, LocalArtifactStore, ServerKind, ServerRecord};
use piata_mcp::application::{FallbackPolicyEngine, ResponseHandler, ToolContext, ToolServer};
use piata_mcp::ports::ArtifactStore;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub struct ToolServerSetup<'a> {
    pub kind: ServerKind,
    pub artifact_dir: &'a Path,
    pub max_tokens: u64,
    pub fallback: FallbackPolicyEngine,
    pub token: Option<&'a str>,
}

impl<'a> ToolServerSetup<'a> {
    pub fn new(kind: ServerKind, artifact_dir: &'a Path) -> Self {
        Self {
            kind,
            artifact_dir,
            max_tokens: 20_000,
            fallback: FallbackPolicyEngine::new(),
            token: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn fallback(mut self, fallback: FallbackPolicyEngine) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn build(self) -> ToolServer {
        let store: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(self.artifact_dir));
        let responses = ResponseHandler::new(store).with_max_tokens(self.max_tokens);
        let context = ToolContext::new(Arc::new(responses), Arc::new(self.fallback));
        ToolServer::new(
            self.kind.service_name(),
            self.kind.registry().unwrap(),
            context,
        )
        .with_timeout(Duration::from_secs(10))
    }

    /// Starts the server and returns its base URL.
    pub async fn spawn(self) -> String {
        let auth = AuthState::new(self.token.map(|t| Secret::new(t.to_string())));
        let router = tool_server_router(Arc::new(self.build()), auth, 16);
        spawn(router).await
    }
}

/// Gateway that knows the given `(id, base_url)` servers.
pub fn gateway(servers: &[(&str, &str)], token: Option<&str>) -> HttpToolGateway {
    let records = servers.iter().map(|(id, url)| {
        let record = ServerRecord::new(*id, *url);
        match token {
            Some(token) => record.with_auth_token(Secret::new(token.to_string())),
            None => record,
        }
    });
    HttpToolGateway::new(records, Duration::from_secs(10)).unwrap()
}
