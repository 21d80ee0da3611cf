//! Configuration handling for tugdts

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tugdts_ast::nodes::NodeType;
use tugdts_core::error::DtsError;
use tugdts_graph::GraphKinds;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "tugdts.toml";

/// tugdts configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Processing settings
    #[serde(default)]
    pub tugdts: DtsConfig,
}

/// Processing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DtsConfig {
    /// Remove declarations whose documentation carries one of these tags
    #[serde(default)]
    pub filter_tags: Vec<String>,

    /// Rewrite `@implements {import(...)}` tags into heritage and imports
    #[serde(default)]
    pub implements_imports: bool,

    /// Copy ancestor parameter types into `@inheritDoc` members
    #[serde(default)]
    pub inherit_doc: bool,

    /// Declaration kinds that become inheritance graph vertices
    #[serde(default = "default_graph_kinds")]
    pub graph_kinds: Vec<String>,
}

fn default_graph_kinds() -> Vec<String> {
    GraphKinds::default()
        .iter()
        .map(|ty| ty.as_str().to_string())
        .collect()
}

impl Default for DtsConfig {
    fn default() -> Self {
        Self {
            filter_tags: Vec::new(),
            implements_imports: false,
            inherit_doc: false,
            graph_kinds: default_graph_kinds(),
        }
    }
}

impl DtsConfig {
    /// Parse [`graph_kinds`](Self::graph_kinds) into a kind set.
    pub fn graph_kinds(&self) -> Result<GraphKinds, DtsError> {
        let kinds = self
            .graph_kinds
            .iter()
            .map(|name| {
                NodeType::parse(name.trim())
                    .ok_or_else(|| DtsError::config(format!("unknown graph kind: {}", name)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GraphKinds::new(kinds))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, DtsError> {
        let content = fs::read_to_string(path).map_err(|e| {
            DtsError::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            DtsError::config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load `explicit` if given, otherwise `tugdts.toml` in `dir` if it
    /// exists, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self, DtsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = default_config_path(dir);
        if path.exists() {
            tracing::debug!("using config {}", path.display());
            Self::load(&path)
        } else {
            Ok(Config::default())
        }
    }
}

/// `tugdts.toml` inside `dir`.
pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}
