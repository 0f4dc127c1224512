//! Stealth catalog - persistence for page extractions.
//!
//! Browser automation agents push what they scraped (element clones, tables,
//! listing snapshots) through `store_extraction`. Small payloads come back
//! inline; large ones land in the artifact directory and the caller gets a
//! reference to read later with `read_artifact`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::parse_args;
use crate::application::{RegistryError, Tool, ToolContext, ToolError, ToolRegistry};
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ParamSpec, ParamType, ToolArguments, ToolDescriptor, ToolOutput};
use crate::ports::StoreRequest;

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(StoreExtraction)?;
    registry.register(ListArtifacts)?;
    registry.register(ReadArtifact)?;
    registry.register(PurgeArtifacts)?;
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════════
// store_extraction
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ExtractionArgs {
    data: Value,
    extraction_type: String,
    selector: Option<String>,
    url: Option<String>,
    #[serde(default)]
    force_save: bool,
}

pub struct StoreExtraction;

#[async_trait]
impl Tool for StoreExtraction {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "store_extraction",
            "Return extracted page data, saving it to an artifact when it is large",
        )
        .param(ParamSpec::required("data", ParamType::Any, "Extracted payload"))
        .param(ParamSpec::required(
            "extraction_type",
            ParamType::String,
            "Kind of extraction, e.g. element_clone or listing_snapshot",
        ))
        .param(ParamSpec::optional("selector", ParamType::String, "CSS selector used"))
        .param(ParamSpec::optional("url", ParamType::String, "Page the data came from"))
        .param(
            ParamSpec::optional("force_save", ParamType::Boolean, "Always write an artifact")
                .with_default(json!(false)),
        )
    }

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ExtractionArgs = parse_args("store_extraction", &args)?;
        let extraction_type = args.extraction_type.trim().to_string();
        if extraction_type.is_empty() {
            return Err(ToolError::validation(
                "store_extraction",
                ValidationError::empty_field("extraction_type"),
            ));
        }

        let mut metadata = Map::new();
        metadata.insert("tool".to_string(), json!("store_extraction"));
        metadata.insert("extraction_type".to_string(), json!(extraction_type));
        if let Some(selector) = args.selector {
            metadata.insert("selector".to_string(), json!(selector));
        }
        if let Some(url) = args.url {
            metadata.insert("url".to_string(), json!(url));
        }

        if args.force_save {
            let reference = ctx
                .artifacts()
                .store(StoreRequest::new(&extraction_type, args.data).with_metadata(metadata))
                .await?;
            tracing::info!(
                path = %reference.file_path.display(),
                extraction_type = %extraction_type,
                "Saved extraction on request"
            );
            return Ok(ToolOutput::Artifact(reference));
        }

        Ok(ctx
            .responses()
            .handle(args.data, &extraction_type, Some(metadata))
            .await?)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// list_artifacts
// ════════════════════════════════════════════════════════════════════════════════

pub struct ListArtifacts;

#[async_trait]
impl Tool for ListArtifacts {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("list_artifacts", "List saved artifacts, newest first")
            .returns(json!({"directory": "string", "count": "integer", "artifacts": ["object"]}))
    }

    async fn call(&self, _args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let store = ctx.artifacts();
        let listings = store.list().await?;
        Ok(ToolOutput::Inline(json!({
            "directory": store.directory(),
            "count": listings.len(),
            "artifacts": listings,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// read_artifact
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ReadArgs {
    filename: String,
}

pub struct ReadArtifact;

#[async_trait]
impl Tool for ReadArtifact {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("read_artifact", "Read a saved artifact by file name")
            .param(ParamSpec::required("filename", ParamType::String, "Artifact file name"))
            .returns(json!({"metadata": "object", "data": "any"}))
    }

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ReadArgs = parse_args("read_artifact", &args)?;
        let document = ctx.artifacts().read(args.filename.trim()).await?;
        let value = serde_json::to_value(document)
            .map_err(|e| ToolError::internal(format!("Failed to encode artifact: {}", e)))?;
        Ok(ToolOutput::Inline(value))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// purge_artifacts
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct PurgeArgs {
    max_age_hours: Option<f64>,
}

pub struct PurgeArtifacts;

#[async_trait]
impl Tool for PurgeArtifacts {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "purge_artifacts",
            "Delete artifacts older than the given age (default: configured retention)",
        )
        .param(ParamSpec::optional(
            "max_age_hours",
            ParamType::Number,
            "Age in hours; older artifacts are deleted",
        ))
        .returns(json!({"deleted": "integer", "max_age_hours": "number"}))
    }

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: PurgeArgs = parse_args("purge_artifacts", &args)?;
        let max_age = match args.max_age_hours {
            Some(hours) if !hours.is_finite() || hours < 0.0 => {
                return Err(ToolError::validation(
                    "purge_artifacts",
                    ValidationError::invalid_value("max_age_hours", "must be a non-negative number"),
                ))
            }
            Some(hours) => chrono::TimeDelta::try_seconds((hours * 3600.0).round() as i64)
                .ok_or_else(|| {
                    ToolError::validation(
                        "purge_artifacts",
                        ValidationError::invalid_value("max_age_hours", "is too large"),
                    )
                })?,
            None => ctx.retention(),
        };

        let deleted = ctx.artifacts().purge(max_age).await?;
        Ok(ToolOutput::Inline(json!({
            "deleted": deleted,
            "max_age_hours": max_age.num_seconds() as f64 / 3600.0,
            "directory": ctx.artifacts().directory(),
        })))
    }
}
