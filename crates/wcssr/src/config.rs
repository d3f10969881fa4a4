//! Configuration file (wcssr.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use wcssr_loader::{ErrorPolicy, Loader, NodeHydrateModule, DEFAULT_EXTENSIONS};
use wcssr_transform::{
    ComponentRegistry, ConfigError, SerializeShadowRoot, SsrTransformer, Strategy,
    TagTransformer, TransformOptions,
};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub hydrate: HydrateConfig,
    #[serde(default)]
    pub ssr: SsrConfig,
    #[serde(default)]
    pub tags: TagTransformer,
}

#[derive(Debug, Deserialize, Default)]
pub struct LibraryConfig {
    /// Import specifier of the component library
    #[serde(default)]
    pub from: String,
    /// Component metadata JSON
    pub components: Option<PathBuf>,
    /// Explicit component export names
    pub exports: Option<Vec<String>>,
    /// ESM entry whose named exports are the components
    pub module: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct HydrateConfig {
    pub module: Option<PathBuf>,
    #[serde(default = "default_node")]
    pub node: String,
}

#[derive(Debug, Deserialize)]
pub struct SsrConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub serialize_shadow_root: SerializeShadowRoot,
    #[serde(default)]
    pub mode: ErrorPolicy,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            module: None,
            node: default_node(),
        }
    }
}

impl Default for SsrConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            serialize_shadow_root: SerializeShadowRoot::default(),
            mode: ErrorPolicy::default(),
            extensions: default_extensions(),
        }
    }
}

fn default_node() -> String {
    "node".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// A parsed config file and the directory its relative paths resolve from.
#[derive(Debug)]
pub struct Config {
    pub file: ConfigFile,
    pub root: PathBuf,
}

impl Config {
    /// Load and validate the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let config = Self { file, root };
        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let library = &self.file.library;
        if library.from.trim().is_empty() {
            return Err(ConfigError::Missing("library.from"));
        }
        if library.components.is_none() && library.exports.is_none() && library.module.is_none() {
            return Err(ConfigError::Missing("library.components"));
        }
        if self.file.hydrate.module.is_none() {
            return Err(ConfigError::Missing("hydrate.module"));
        }
        if self.file.ssr.extensions.is_empty() {
            return Err(ConfigError::Invalid {
                option: "ssr.extensions",
                message: "at least one extension is required".to_string(),
            });
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Build the component registry from the first configured source.
    pub fn registry(&self) -> Result<ComponentRegistry> {
        let library = &self.file.library;
        let registry = if let Some(components) = &library.components {
            ComponentRegistry::load_metadata(&self.resolve(components))?
        } else if let Some(module) = &library.module {
            ComponentRegistry::load_module(&self.resolve(module))?
        } else {
            ComponentRegistry::from_names(library.exports.iter().flatten().cloned())
        };

        tracing::info!("Registered {} components", registry.len());
        Ok(registry)
    }

    pub fn transform_options(&self) -> Result<TransformOptions> {
        Ok(TransformOptions::new(self.file.library.from.clone())
            .with_registry(self.registry()?)
            .with_serialize_shadow_root(self.file.ssr.serialize_shadow_root.clone())
            .with_strategy(self.file.ssr.strategy)
            .with_tags(self.file.tags.clone()))
    }

    /// Build the loader with a node-backed hydrate module.
    pub fn loader(&self) -> Result<Loader> {
        let module = self
            .file
            .hydrate
            .module
            .as_deref()
            .ok_or(ConfigError::Missing("hydrate.module"))?;
        let hydrate = NodeHydrateModule::new(self.resolve(module), &self.file.hydrate.node)?;
        let transformer = SsrTransformer::new(self.transform_options()?, Arc::new(hydrate))?;

        Ok(Loader::new(transformer, self.file.ssr.mode)
            .with_extensions(self.file.ssr.extensions.iter().cloned()))
    }
}
