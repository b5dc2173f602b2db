use serde::{Deserialize, Serialize};

use crate::parser::ParseLimits;
use crate::schema::SchemaOptions;

const DEFAULT_PARSE_FUEL: u32 = 1_000_000;
const DEFAULT_PARSE_MAX_DEPTH: u32 = 512;

/// Layout of generated query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryTextFormat {
    /// Two-space indented, one selection per line.
    #[default]
    Pretty,
    /// A single line.
    Compact,
}

/// Options for one compilation run. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    pub parse_fuel: u32,
    pub parse_max_depth: u32,
    pub query_text_format: QueryTextFormat,
    /// Attach a SHA-256 hash to every query text.
    pub persisted_queries: bool,
    pub generate_refetch_field: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            parse_fuel: DEFAULT_PARSE_FUEL,
            parse_max_depth: DEFAULT_PARSE_MAX_DEPTH,
            query_text_format: QueryTextFormat::default(),
            persisted_queries: false,
            generate_refetch_field: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_query_text_format(mut self, format: QueryTextFormat) -> Self {
        self.query_text_format = format;
        self
    }

    pub fn with_persisted_queries(mut self, enabled: bool) -> Self {
        self.persisted_queries = enabled;
        self
    }

    pub(crate) fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            fuel: Some(self.parse_fuel),
            max_depth: Some(self.parse_max_depth),
        }
    }

    pub(crate) fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            generate_refetch_field: self.generate_refetch_field,
        }
    }
}
