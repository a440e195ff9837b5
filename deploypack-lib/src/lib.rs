use serde::{Deserialize, Serialize};

pub mod policy;

pub use policy::{EntryKind, NormalizeError, PackPolicy, normalize_line_endings, split_extension};

/// Directory packaged when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "deploy-v68";
/// Archive written when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "deploy-v68.zip";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: Option<String>,
    pub output: Option<String>,
    pub config: Option<String>,
    pub dry: Option<bool>,
}

impl Config {
    /// Fills every unset field that has a built-in default.
    pub fn with_defaults(mut self) -> Self {
        if self.source.is_none() {
            self.source = Some(DEFAULT_SOURCE.to_string());
        }
        if self.output.is_none() {
            self.output = Some(DEFAULT_OUTPUT.to_string());
        }
        if self.dry.is_none() {
            self.dry = Some(false);
        }
        self
    }

    pub fn source_dir(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn output_path(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }
}
