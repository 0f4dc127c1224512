//! `piata-mcp` command line: hosts a tool server or drives the gateway,
//! artifact directory and prompt store from the shell.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use piata_mcp::adapters::http::{tool_server_router, serve, AuthState};
use piata_mcp::adapters::{
    GoogleGeocoder, HttpPromptBackend, HttpPromptConfig, HttpToolGateway, LocalArtifactStore,
    LocalPromptBackend, NominatimGeocoder, ServerKind,
};
use piata_mcp::application::{
    FallbackPolicyEngine, Orchestrator, OrchestratorError, PromptStore, RegistryError,
    ResponseHandler, ToolContext, ToolServer,
};
use piata_mcp::config::{retention_duration, AppConfig, ConfigError, ValidationError};
use piata_mcp::domain::fallback::Capability;
use piata_mcp::ports::{
    ArtifactError, ArtifactStore, CapabilityProvider, GatewayError, PromptStoreError,
};

#[derive(Debug, Parser)]
#[command(name = "piata-mcp", version, about = "Piata.ro MCP tool servers and orchestration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Host one tool server over HTTP
    Serve {
        /// ads, database, stock, content or stealth
        kind: ServerKind,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Call a tool through the dispatch gateway
    Call {
        server: String,
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Print the artifact contents instead of the reference
        #[arg(long)]
        resolve: bool,
    },
    /// Inspect or purge the artifact directory
    Artifacts {
        #[command(subcommand)]
        action: ArtifactsAction,
    },
    /// Save, load and list prompts
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },
}

#[derive(Debug, Subcommand)]
enum ArtifactsAction {
    List,
    Purge {
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
enum PromptsAction {
    Save {
        name: String,
        /// Prompt content as JSON
        content: String,
        /// Skip the remote store
        #[arg(long)]
        local: bool,
    },
    Load {
        name: String,
        #[arg(long)]
        local: bool,
    },
    List {
        #[arg(long)]
        local: bool,
    },
    TestConnection,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Prompt(#[from] PromptStoreError),

    #[error("Prompt '{0}' not found")]
    PromptNotFound(String),

    #[error("Geocoder setup failed: {0}")]
    Provider(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    // Logs go to stderr so command output on stdout stays machine-readable.
    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(command: Command, config: AppConfig) -> Result<(), CliError> {
    config.validate()?;

    match command {
        Command::Serve { kind, host, port } => serve_tools(kind, host, port, config).await,
        Command::Call {
            server,
            tool,
            args,
            timeout_secs,
            resolve,
        } => {
            let arguments: Value = serde_json::from_str(&args)?;
            let orchestrator = orchestrator(&config)?;
            let output = orchestrator
                .call(&server, &tool, arguments, timeout_secs.map(Duration::from_secs))
                .await?;
            let value = if resolve {
                orchestrator.resolve(output).await?
            } else {
                output.into_result_value()?
            };
            print_json(&value)
        }
        Command::Artifacts { action } => {
            let store = LocalArtifactStore::new(&config.artifacts.dir);
            match action {
                ArtifactsAction::List => {
                    let listing = store.list().await?;
                    print_json(&serde_json::to_value(listing)?)
                }
                ArtifactsAction::Purge { max_age_hours } => {
                    let hours = max_age_hours.unwrap_or(config.artifacts.retention_hours);
                    let deleted = store.purge(retention_duration(hours)?).await?;
                    tracing::info!(deleted, max_age_hours = hours, "Purged artifacts");
                    print_json(&serde_json::json!({
                        "deleted": deleted,
                        "max_age_hours": hours,
                        "directory": store.directory(),
                    }))
                }
            }
        }
        Command::Prompts { action } => {
            let store = prompt_store(&config)?;
            match action {
                PromptsAction::Save {
                    name,
                    content,
                    local,
                } => {
                    let content: Value = serde_json::from_str(&content)?;
                    let location = store.save(&name, content, !local).await?;
                    print_json(&serde_json::json!({ "name": name, "stored": location }))
                }
                PromptsAction::Load { name, local } => match store.load(&name, !local).await? {
                    Some(content) => print_json(&content),
                    None => Err(CliError::PromptNotFound(name)),
                },
                PromptsAction::List { local } => {
                    let names = store.list(!local).await?;
                    print_json(&serde_json::to_value(names)?)
                }
                PromptsAction::TestConnection => {
                    let status = store.test_connection().await;
                    print_json(&serde_json::to_value(status)?)
                }
            }
        }
    }
}

async fn serve_tools(
    kind: ServerKind,
    host: Option<String>,
    port: Option<u16>,
    mut config: AppConfig,
) -> Result<(), CliError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if port.is_some() {
        config.server.port = port;
    }
    config.server.validate()?;
    let addr = config.server.socket_addr(kind.default_port())?;

    let server = tool_server(kind, &config)?;
    tracing::info!(
        service = %server.service(),
        tools = server.registry().len(),
        %addr,
        auth = config.server.auth_token.is_some(),
        "Starting tool server"
    );

    let router = tool_server_router(
        Arc::new(server),
        AuthState::new(config.server.auth_token.clone()),
        config.server.max_concurrent_requests,
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, router).await?;

    tracing::info!(service = %kind.service_name(), "Tool server stopped");
    Ok(())
}

fn tool_server(kind: ServerKind, config: &AppConfig) -> Result<ToolServer, CliError> {
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(&config.artifacts.dir));
    let responses = ResponseHandler::new(artifacts).with_max_tokens(config.artifacts.max_tokens);

    let google: Arc<dyn CapabilityProvider> =
        Arc::new(GoogleGeocoder::new(config.providers.google())?);
    let nominatim: Arc<dyn CapabilityProvider> =
        Arc::new(NominatimGeocoder::new(config.providers.nominatim())?);
    let geocoders = vec![google, nominatim];
    let fallback = FallbackPolicyEngine::new()
        .with_chain(Capability::Geocode, geocoders.clone())
        .with_chain(Capability::ReverseGeocode, geocoders);

    let context = ToolContext::new(Arc::new(responses), Arc::new(fallback))
        .with_retention(config.artifacts.retention()?);

    Ok(ToolServer::new(kind.service_name(), kind.registry()?, context)
        .with_timeout(config.server.request_timeout()))
}

fn orchestrator(config: &AppConfig) -> Result<Orchestrator, CliError> {
    let gateway = HttpToolGateway::new(
        config
            .gateway
            .server_records(config.server.auth_token.as_ref()),
        config.gateway.default_timeout(),
    )?;
    let artifacts = LocalArtifactStore::new(&config.artifacts.dir);

    Ok(Orchestrator::new(Arc::new(gateway), Arc::new(artifacts))
        .with_cache_capacity(config.gateway.cache_capacity)
        .with_prompts(Arc::new(prompt_store(config)?)))
}

fn prompt_store(config: &AppConfig) -> Result<PromptStore, CliError> {
    let local = LocalPromptBackend::new(&config.prompts.local_dir);
    let mut store = PromptStore::new(Arc::new(local));

    if let Some(url) = config.prompts.remote_url() {
        let mut remote = HttpPromptConfig::new(url).with_timeout(config.prompts.timeout());
        if let Some(token) = &config.prompts.auth_token {
            remote = remote.with_auth_token(token.clone());
        }
        store = store.with_remote(Arc::new(HttpPromptBackend::new(remote)?));
    }
    Ok(store)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
