//! Tool catalogs - the five tool servers and what each one hosts.
//!
//! | Server   | Port | Tools |
//! |----------|------|-------|
//! | ads      | 8001 | listing titles, descriptions, quality, keywords |
//! | database | 8002 | search query builder, SQL checks, schema |
//! | stock    | 8003 | reorder point, demand forecast, ABC classes |
//! | content  | 8004 | geocoding (via fallback chains), SEO slugs |
//! | stealth  | 8005 | extraction storage and artifact management |

pub mod ads;
pub mod content;
pub mod database;
pub mod stealth;
pub mod stock;
mod text;

pub use text::fold_diacritics;

use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

use crate::application::{RegistryError, ToolError, ToolRegistry};
use crate::domain::tools::ToolArguments;

/// Deserializes validated arguments into a tool's own record, reporting any
/// mismatch as an invalid-params error for `tool`.
pub(crate) fn parse_args<T: DeserializeOwned>(
    tool: &str,
    args: &ToolArguments,
) -> Result<T, ToolError> {
    args.parse().map_err(|e| ToolError::validation(tool, e))
}

/// One of the tool servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    Ads,
    Database,
    Stock,
    Content,
    Stealth,
}

impl ServerKind {
    pub const ALL: [ServerKind; 5] = [
        ServerKind::Ads,
        ServerKind::Database,
        ServerKind::Stock,
        ServerKind::Content,
        ServerKind::Stealth,
    ];

    /// Server id used by the gateway and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Ads => "ads",
            ServerKind::Database => "database",
            ServerKind::Stock => "stock",
            ServerKind::Content => "content",
            ServerKind::Stealth => "stealth",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ServerKind::Ads => 8001,
            ServerKind::Database => 8002,
            ServerKind::Stock => 8003,
            ServerKind::Content => 8004,
            ServerKind::Stealth => 8005,
        }
    }

    /// Name reported by `/health`.
    pub fn service_name(&self) -> String {
        format!("piata-{}-tools", self.as_str())
    }

    /// Builds the registry of tools this server hosts.
    pub fn registry(&self) -> Result<ToolRegistry, RegistryError> {
        let mut registry = ToolRegistry::new();
        match self {
            ServerKind::Ads => ads::register(&mut registry)?,
            ServerKind::Database => database::register(&mut registry)?,
            ServerKind::Stock => stock::register(&mut registry)?,
            ServerKind::Content => content::register(&mut registry)?,
            ServerKind::Stealth => stealth::register(&mut registry)?,
        }
        Ok(registry)
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown server '{}', expected one of: ads, database, stock, content, stealth",
                    s
                )
            })
    }
}
