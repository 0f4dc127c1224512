use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;

/// The `metadata` object at the top of every artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub created_at: Timestamp,
    pub estimated_tokens: u64,
    #[serde(default)]
    pub auto_saved_due_to_size: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Caller-supplied keys carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtifactMetadata {
    pub fn new(created_at: Timestamp, estimated_tokens: u64) -> Self {
        Self {
            created_at,
            estimated_tokens,
            auto_saved_due_to_size: false,
            tool: None,
            extraction_type: None,
            selector: None,
            extra: Map::new(),
        }
    }

    /// Marks the artifact as offloaded because of its size.
    pub fn auto_saved(mut self) -> Self {
        self.auto_saved_due_to_size = true;
        self
    }

    /// Merges caller metadata. Well-known string keys populate their fields;
    /// everything else lands in `extra`. Reserved keys are ignored.
    pub fn with_caller_metadata(mut self, caller: Map<String, Value>) -> Self {
        for (key, value) in caller {
            match key.as_str() {
                "tool" => self.tool = value.as_str().map(str::to_string),
                "extraction_type" => self.extraction_type = value.as_str().map(str::to_string),
                "selector" => self.selector = value.as_str().map(str::to_string),
                "created_at" | "estimated_tokens" | "auto_saved_due_to_size" => {}
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        self
    }
}

/// A complete artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub metadata: ArtifactMetadata,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caller() -> Map<String, Value> {
        json!({
            "tool": "store_extraction",
            "extraction_type": "element_clone",
            "selector": "#listing",
            "url": "https://piata.ro/anunt/1",
            "estimated_tokens": 1
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn caller_metadata_fills_known_fields_and_extra() {
        let meta = ArtifactMetadata::new(Timestamp::now(), 42)
            .auto_saved()
            .with_caller_metadata(caller());

        assert_eq!(meta.tool.as_deref(), Some("store_extraction"));
        assert_eq!(meta.selector.as_deref(), Some("#listing"));
        assert_eq!(meta.extra["url"], "https://piata.ro/anunt/1");
        assert_eq!(meta.estimated_tokens, 42);
    }

    #[test]
    fn document_serializes_flat_metadata() {
        let doc = ArtifactDocument {
            metadata: ArtifactMetadata::new(Timestamp::now(), 7)
                .auto_saved()
                .with_caller_metadata(caller()),
            data: json!({"rows": [1, 2, 3]}),
        };
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["metadata"]["auto_saved_due_to_size"], true);
        assert_eq!(json["metadata"]["estimated_tokens"], 7);
        assert_eq!(json["metadata"]["url"], "https://piata.ro/anunt/1");
        assert_eq!(json["data"]["rows"][2], 3);

        let back: ArtifactDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
