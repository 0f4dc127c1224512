//! Ads catalog - listing copy helpers for sellers.
//!
//! All tools here are pure functions of their arguments.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::parse_args;
use super::text::{capitalize, collapse_whitespace, fold_diacritics, truncate_chars};
use crate::application::{RegistryError, Tool, ToolContext, ToolError, ToolRegistry};
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ParamSpec, ParamType, ToolArguments, ToolDescriptor, ToolOutput};

/// Longest title the marketplace displays without truncation.
pub const MAX_TITLE_CHARS: usize = 70;
pub const MAX_TITLE_SUGGESTIONS: usize = 5;
pub const MAX_KEYWORDS: usize = 15;

pub fn register(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(OptimizeListingTitle)?;
    registry.register(GenerateListingDescription)?;
    registry.register(AnalyzeListingQuality)?;
    registry.register(SuggestAdKeywords)?;
    Ok(())
}

/// Selling point appended to titles, by category.
fn category_highlight(category: &str) -> &'static str {
    match fold_diacritics(category).to_lowercase().as_str() {
        "imobiliare" => "Direct de la proprietar",
        "auto" | "auto, moto si ambarcatiuni" => "Stare impecabila",
        "electronice" | "electronice si electrocasnice" => "Garantie inclusa",
        "moda" | "moda si frumusete" => "Nou cu eticheta",
        _ => "Pret negociabil",
    }
}

/// `base` followed by `suffix`, shortening `base` so the whole fits.
fn with_suffix(base: &str, suffix: &str) -> String {
    let room = MAX_TITLE_CHARS.saturating_sub(suffix.chars().count());
    if room == 0 {
        return truncate_chars(suffix.trim_start_matches([' ', '-', '|', ',']), MAX_TITLE_CHARS);
    }
    format!("{}{}", truncate_chars(base, room), suffix)
}

// ════════════════════════════════════════════════════════════════════════════════
// optimize_listing_title
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct TitleArgs {
    title: String,
    category: String,
    location: Option<String>,
}

pub struct OptimizeListingTitle;

#[async_trait]
impl Tool for OptimizeListingTitle {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "optimize_listing_title",
            "Suggest up to five improved titles for a marketplace listing",
        )
        .param(ParamSpec::required("title", ParamType::String, "Current listing title"))
        .param(ParamSpec::required("category", ParamType::String, "Listing category"))
        .param(ParamSpec::optional("location", ParamType::String, "City or area"))
        .returns(json!({
            "original_title": "string",
            "optimized_suggestions": ["string"],
            "character_counts": ["integer"],
        }))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: TitleArgs = parse_args("optimize_listing_title", &args)?;
        let base = capitalize(&collapse_whitespace(&args.title));
        if base.is_empty() {
            return Err(ToolError::validation(
                "optimize_listing_title",
                ValidationError::empty_field("title"),
            ));
        }
        let category = capitalize(&collapse_whitespace(&args.category));
        let highlight = category_highlight(&args.category);
        let location = args
            .location
            .as_deref()
            .map(collapse_whitespace)
            .filter(|l| !l.is_empty());

        let mut candidates = Vec::new();
        if let Some(location) = &location {
            candidates.push(with_suffix(&base, &format!(" - {}", location)));
            candidates.push(with_suffix(&base, &format!(", {} - {}", location, highlight)));
        }
        candidates.push(with_suffix(&base, &format!(" - {}", highlight)));
        if !category.is_empty() {
            candidates.push(with_suffix(&base, &format!(" | {}", category)));
        }
        candidates.push(truncate_chars(&base, MAX_TITLE_CHARS));

        let mut suggestions: Vec<String> = Vec::with_capacity(MAX_TITLE_SUGGESTIONS);
        for candidate in candidates {
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
        suggestions.truncate(MAX_TITLE_SUGGESTIONS);

        let counts: Vec<usize> = suggestions.iter().map(|s| s.chars().count()).collect();
        Ok(ToolOutput::Inline(json!({
            "original_title": args.title,
            "optimized_suggestions": suggestions,
            "character_counts": counts,
            "max_length": MAX_TITLE_CHARS,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// generate_listing_description
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct DescriptionArgs {
    title: String,
    category: String,
    #[serde(default)]
    features: Vec<String>,
    location: Option<String>,
    condition: Option<String>,
}

pub struct GenerateListingDescription;

#[async_trait]
impl Tool for GenerateListingDescription {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "generate_listing_description",
            "Write a listing description from its title, features and condition",
        )
        .param(ParamSpec::required("title", ParamType::String, "Listing title"))
        .param(ParamSpec::required("category", ParamType::String, "Listing category"))
        .param(
            ParamSpec::optional("features", ParamType::Array, "Feature bullet points")
                .with_default(json!([])),
        )
        .param(ParamSpec::optional("location", ParamType::String, "City or area"))
        .param(ParamSpec::optional("condition", ParamType::String, "Item condition"))
        .returns(json!({"description": "string", "word_count": "integer"}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: DescriptionArgs = parse_args("generate_listing_description", &args)?;

        let mut sentences = vec![format!("{}.", collapse_whitespace(&args.title).trim_end_matches('.'))];
        if let Some(condition) = args.condition.as_deref().filter(|c| !c.trim().is_empty()) {
            sentences.push(format!("Stare: {}.", condition.trim()));
        }
        let features: Vec<String> = args
            .features
            .iter()
            .map(|f| collapse_whitespace(f))
            .filter(|f| !f.is_empty())
            .collect();
        if !features.is_empty() {
            sentences.push(format!("Caracteristici: {}.", features.join(", ")));
        }
        if let Some(location) = args.location.as_deref().filter(|l| !l.trim().is_empty()) {
            sentences.push(format!("Locatie: {}.", location.trim()));
        }
        sentences.push(format!(
            "{}. Pentru detalii suplimentare, contactati vanzatorul.",
            category_highlight(&args.category)
        ));

        let description = sentences.join(" ");
        let word_count = description.split_whitespace().count();
        Ok(ToolOutput::Inline(json!({
            "description": description,
            "word_count": word_count,
            "character_count": description.chars().count(),
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// analyze_listing_quality
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct QualityArgs {
    title: String,
    description: String,
    price: Option<f64>,
    image_count: Option<u32>,
}

pub struct AnalyzeListingQuality;

impl AnalyzeListingQuality {
    fn grade(score: u32) -> &'static str {
        match score {
            85..=u32::MAX => "excellent",
            70..=84 => "good",
            50..=69 => "fair",
            _ => "poor",
        }
    }
}

#[async_trait]
impl Tool for AnalyzeListingQuality {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "analyze_listing_quality",
            "Score a listing 0-100 and list what would improve it",
        )
        .param(ParamSpec::required("title", ParamType::String, "Listing title"))
        .param(ParamSpec::required("description", ParamType::String, "Listing description"))
        .param(ParamSpec::optional("price", ParamType::Number, "Asking price in RON"))
        .param(ParamSpec::optional("image_count", ParamType::Integer, "Number of photos"))
        .returns(json!({"score": "integer", "issues": ["string"], "recommendations": ["string"]}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: QualityArgs = parse_args("analyze_listing_quality", &args)?;
        let mut score: i32 = 100;
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        let title_len = args.title.trim().chars().count();
        if title_len < 20 {
            score -= 15;
            issues.push("Title is too short".to_string());
            recommendations.push("Add brand, model or key attributes to the title".to_string());
        } else if title_len > MAX_TITLE_CHARS {
            score -= 10;
            issues.push(format!("Title exceeds {} characters", MAX_TITLE_CHARS));
            recommendations.push("Shorten the title so it is not cut off in search".to_string());
        }

        let letters: Vec<char> = args.title.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 3 && letters.iter().all(|c| c.is_uppercase()) {
            score -= 10;
            issues.push("Title is written in capitals".to_string());
            recommendations.push("Use sentence case in the title".to_string());
        }

        let words = args.description.split_whitespace().count();
        if words < 30 {
            score -= 20;
            issues.push(format!("Description has only {} words", words));
            recommendations
                .push("Describe condition, dimensions and what is included".to_string());
        }

        match args.price {
            None => {
                score -= 15;
                issues.push("No price given".to_string());
                recommendations.push("Listings with a price get more replies".to_string());
            }
            Some(price) if price <= 0.0 => {
                score -= 15;
                issues.push("Price must be positive".to_string());
                recommendations.push("Set a realistic asking price".to_string());
            }
            Some(_) => {}
        }

        match args.image_count.unwrap_or(0) {
            0 => {
                score -= 20;
                issues.push("No photos".to_string());
                recommendations.push("Add at least three clear photos".to_string());
            }
            1 | 2 => {
                score -= 10;
                issues.push("Few photos".to_string());
                recommendations.push("Add photos from several angles".to_string());
            }
            _ => {}
        }

        let score = score.max(0) as u32;
        Ok(ToolOutput::Inline(json!({
            "score": score,
            "grade": Self::grade(score),
            "issues": issues,
            "recommendations": recommendations,
        })))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// suggest_ad_keywords
// ════════════════════════════════════════════════════════════════════════════════

const STOPWORDS: &[&str] = &[
    "si", "sau", "cu", "de", "la", "din", "pe", "in", "pentru", "the", "and", "for", "with",
];

#[derive(Debug, Deserialize)]
struct KeywordArgs {
    title: String,
    category: String,
    location: Option<String>,
}

pub struct SuggestAdKeywords;

fn push_unique(keywords: &mut Vec<String>, keyword: String) {
    if !keyword.is_empty() && !keywords.contains(&keyword) {
        keywords.push(keyword);
    }
}

#[async_trait]
impl Tool for SuggestAdKeywords {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "suggest_ad_keywords",
            "Suggest search keywords for a listing",
        )
        .param(ParamSpec::required("title", ParamType::String, "Listing title"))
        .param(ParamSpec::required("category", ParamType::String, "Listing category"))
        .param(ParamSpec::optional("location", ParamType::String, "City or area"))
        .returns(json!({"keywords": ["string"]}))
        .pure()
    }

    async fn call(&self, args: ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: KeywordArgs = parse_args("suggest_ad_keywords", &args)?;
        let category = collapse_whitespace(&args.category).to_lowercase();
        let location = args
            .location
            .as_deref()
            .map(|l| collapse_whitespace(l).to_lowercase())
            .filter(|l| !l.is_empty());

        let mut keywords: Vec<String> = Vec::new();

        let title_terms: Vec<String> = args
            .title
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|t| t.chars().count() >= 3)
            .filter(|t| !STOPWORDS.contains(&fold_diacritics(t).as_str()))
            .collect();

        push_unique(&mut keywords, collapse_whitespace(&args.title).to_lowercase());
        for term in &title_terms {
            push_unique(&mut keywords, term.clone());
        }
        push_unique(&mut keywords, category.clone());
        if let Some(location) = &location {
            push_unique(&mut keywords, location.clone());
            push_unique(&mut keywords, format!("{} {}", category, location));
            if let Some(first) = title_terms.first() {
                push_unique(&mut keywords, format!("{} {}", first, location));
            }
        }
        // Searchers often type without diacritics.
        let folded: Vec<String> = keywords
            .iter()
            .map(|k| fold_diacritics(k))
            .filter(|f| !keywords.contains(f))
            .collect();
        for f in folded {
            push_unique(&mut keywords, f);
        }

        keywords.truncate(MAX_KEYWORDS);
        Ok(ToolOutput::Inline(json!({ "keywords": keywords })))
    }
}
