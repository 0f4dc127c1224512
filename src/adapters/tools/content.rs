//! Content catalog - location enrichment and URL slugs.
//!
//! The geocoding tools go through the server's fallback engine, so which
//! provider answered depends on configured credentials and provider health.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::parse_args;
use super::text::fold_diacritics;
use crate::application::{RegistryError, Tool, ToolContext, ToolError, ToolRegistry};
use crate::domain::fallback::{Capability, FallbackSuccess};
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ParamSpec, ParamType, ToolArguments, ToolDescriptor, ToolOutput};

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(GeocodeLocation)?;
    registry.register(ReverseGeocode)?;
    registry.register(GenerateSeoSlug)?;
    Ok(())
}

/// Flattens a chain result into the tool's response object.
fn with_provenance(mut base: Map<String, Value>, success: FallbackSuccess) -> Value {
    if let Value::Object(result) = success.result {
        base.extend(result);
    }
    base.insert("provider".to_string(), json!(success.provider_id));
    if let Some(note) = success.note {
        base.insert("note".to_string(), json!(note));
    }
    base.insert("attempts".to_string(), json!(success.attempts));
    Value::Object(base)
}

// ════════════════════════════════════════════════════════════════════════════════
// geocode_location
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct GeocodeArgs {
    address: String,
}

pub struct GeocodeLocation;

#[async_trait]
impl Tool for GeocodeLocation {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "geocode_location",
            "Resolve an address or place name to coordinates",
        )
        .param(ParamSpec::required("address", ParamType::String, "Address or place name"))
        .returns(json!({
            "latitude": "number",
            "longitude": "number",
            "formatted_address": "string",
            "provider": "string",
        }))
    }

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: GeocodeArgs = parse_args("geocode_location", &args)?;
        let address = args.address.trim();
        if address.is_empty() {
            return Err(ToolError::validation(
                "geocode_location",
                ValidationError::empty_field("address"),
            ));
        }

        let success = ctx
            .fallback()
            .invoke(Capability::Geocode, &json!({ "address": address }))
            .await?;

        let mut base = Map::new();
        base.insert("address".to_string(), json!(address));
        Ok(ToolOutput::Inline(with_provenance(base, success)))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// reverse_geocode
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct ReverseArgs {
    latitude: f64,
    longitude: f64,
}

pub struct ReverseGeocode;

#[async_trait]
impl Tool for ReverseGeocode {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("reverse_geocode", "Resolve coordinates to an address")
            .param(ParamSpec::required("latitude", ParamType::Number, "Latitude in degrees"))
            .param(ParamSpec::required("longitude", ParamType::Number, "Longitude in degrees"))
            .returns(json!({"formatted_address": "string", "provider": "string"}))
    }

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: ReverseArgs = parse_args("reverse_geocode", &args)?;
        if !(-90.0..=90.0).contains(&args.latitude) {
            return Err(ToolError::validation(
                "reverse_geocode",
                ValidationError::invalid_value("latitude", "must be between -90 and 90"),
            ));
        }
        if !(-180.0..=180.0).contains(&args.longitude) {
            return Err(ToolError::validation(
                "reverse_geocode",
                ValidationError::invalid_value("longitude", "must be between -180 and 180"),
            ));
        }

        let success = ctx
            .fallback()
            .invoke(
                Capability::ReverseGeocode,
                &json!({"latitude": args.latitude, "longitude": args.longitude}),
            )
            .await?;

        Ok(ToolOutput::Inline(with_provenance(Map::new(), success)))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// generate_seo_slug
// ════════════════════════════════════════════════════════════════════════════════

/// Lowercase ASCII slug of `text`, at most `max_len` bytes, cut at a hyphen
/// when possible.
pub fn slugify(text: &str, max_len: usize) -> String {
    let folded = fold_diacritics(text).to_lowercase();
    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.len() <= max_len {
        return slug.to_string();
    }
    let cut = &slug[..max_len];
    match cut.rfind('-') {
        Some(idx) if idx > 0 => cut[..idx].to_string(),
        _ => cut.trim_end_matches('-').to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct SlugArgs {
    text: String,
    max_length: usize,
}

pub struct GenerateSeoSlug;

#[async_trait]
impl Tool for GenerateSeoSlug {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("generate_seo_slug", "Build a URL slug from listing text")
            .param(ParamSpec::required("text", ParamType::String, "Text to slugify"))
            .param(
                ParamSpec::optional("max_length", ParamType::Integer, "Maximum slug length")
                    .with_default(json!(80)),
            )
            .returns(json!({"slug": "string"}))
            .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: SlugArgs = parse_args("generate_seo_slug", &args)?;
        if args.max_length == 0 {
            return Err(ToolError::validation(
                "generate_seo_slug",
                ValidationError::invalid_value("max_length", "must be at least 1"),
            ));
        }
        let slug = slugify(&args.text, args.max_length);
        if slug.is_empty() {
            return Err(ToolError::validation(
                "generate_seo_slug",
                ValidationError::invalid_value("text", "contains no letters or digits"),
            ));
        }
        Ok(ToolOutput::Inline(json!({
            "slug": slug,
            "length": slug.len(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::tools::tests::{context_with_fallback, test_context};
    use crate::application::FallbackPolicyEngine;
    use crate::domain::fallback::ProviderFailure;
    use crate::ports::CapabilityProvider;
    use proptest::prelude::*;
    use std::sync::Arc;

    struct FixedProvider {
        id: &'static str,
        outcome: Result<Value, ProviderFailure>,
    }

    #[async_trait]
    impl CapabilityProvider for FixedProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn supports(&self, _capability: Capability) -> bool {
            true
        }

        async fn attempt(
            &self,
            _capability: Capability,
            _input: &Value,
        ) -> Result<Value, ProviderFailure> {
            self.outcome.clone()
        }
    }

    fn bucharest() -> Value {
        json!({"latitude": 44.4268, "longitude": 26.1025, "formatted_address": "București, România"})
    }

    #[tokio::test]
    async fn geocode_reports_fallback_provider() {
        let providers: Vec<Arc<dyn CapabilityProvider>> = vec![
            Arc::new(FixedProvider {
                id: "primary",
                outcome: Err(ProviderFailure::credential_rejected("REQUEST_DENIED")),
            }),
            Arc::new(FixedProvider {
                id: "secondary",
                outcome: Ok(bucharest()),
            }),
        ];
        let engine = FallbackPolicyEngine::new().with_chain(Capability::Geocode, providers);
        let (ctx, _dir) = context_with_fallback(engine);

        let args = ToolArguments::validate(
            &GeocodeLocation.descriptor(),
            Some(json!({"address": "Bucharest, Romania"})),
        )
        .unwrap();
        let out = GeocodeLocation.call(args, &ctx).await.unwrap();
        let value = out.as_inline().unwrap();

        assert_eq!(value["provider"], "secondary");
        assert_eq!(value["address"], "Bucharest, Romania");
        let note = value["note"].as_str().unwrap();
        assert!(note.contains("primary=credential_rejected"));
        let lat = value["latitude"].as_f64().unwrap();
        assert!((44.3..=44.5).contains(&lat));
    }

    #[tokio::test]
    async fn exhausted_chain_becomes_provider_exhausted_error() {
        let providers: Vec<Arc<dyn CapabilityProvider>> = vec![Arc::new(FixedProvider {
            id: "only",
            outcome: Err(ProviderFailure::network("connection refused")),
        })];
        let engine = FallbackPolicyEngine::new().with_chain(Capability::Geocode, providers);
        let (ctx, _dir) = context_with_fallback(engine);

        let args = ToolArguments::validate(
            &GeocodeLocation.descriptor(),
            Some(json!({"address": "Oradea"})),
        )
        .unwrap();
        let err = GeocodeLocation.call(args, &ctx).await.unwrap_err();
        assert_eq!(err.code(), -32010);
    }

    #[tokio::test]
    async fn geocoding_without_a_chain_is_internal() {
        let (ctx, _dir) = test_context();
        let args = ToolArguments::validate(
            &GeocodeLocation.descriptor(),
            Some(json!({"address": "Oradea"})),
        )
        .unwrap();

        let err = GeocodeLocation.call(args, &ctx).await.unwrap_err();
        assert_eq!(err.code(), -1);
    }

    #[tokio::test]
    async fn reverse_geocode_checks_ranges() {
        let (ctx, _dir) = test_context();
        let args = ToolArguments::validate(
            &ReverseGeocode.descriptor(),
            Some(json!({"latitude": 120.0, "longitude": 26.1})),
        )
        .unwrap();
        let err = ReverseGeocode.call(args, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn slug_folds_romanian_diacritics() {
        assert_eq!(
            slugify("Apartament 3 camere, Ștefan cel Mare / Iași!", 80),
            "apartament-3-camere-stefan-cel-mare-iasi"
        );
    }

    #[test]
    fn slug_cuts_at_hyphen() {
        assert_eq!(slugify("garsoniera tineretului metrou", 20), "garsoniera");
    }

    #[tokio::test]
    async fn slug_of_symbols_is_rejected() {
        let (ctx, _dir) = test_context();
        let args =
            ToolArguments::validate(&GenerateSeoSlug.descriptor(), Some(json!({"text": "!!!"})))
                .unwrap();
        let err = GenerateSeoSlug.call(args, &ctx).await.unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    proptest! {
        #[test]
        fn slugs_are_ascii_and_bounded(text in "\\PC{0,120}", max in 1usize..100) {
            let slug = slugify(&text, max);
            prop_assert!(slug.len() <= max);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }
}
