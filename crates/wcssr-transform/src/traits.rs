//! Trait definitions for the hydrate module, plus shared error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::markup::MarkupError;
use crate::registry::RegistryError;
use crate::serialize::serialize_property;
use crate::shadow_root::SerializeShadowRoot;
use crate::value::PropValue;

/// Options passed to `renderToString`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderToStringOptions {
    /// One element per line; the markup splitter depends on it.
    pub pretty_html: bool,

    /// Render a fragment, not a `<html>` document.
    pub full_document: bool,

    pub serialize_shadow_root: SerializeShadowRoot,
}

impl RenderToStringOptions {
    /// Options for rendering a single component fragment.
    pub fn fragment(serialize_shadow_root: SerializeShadowRoot) -> Self {
        Self {
            pretty_html: true,
            full_document: false,
            serialize_shadow_root,
        }
    }
}

/// A stylesheet extracted by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSheet {
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub content: String,
}

/// Result of `renderToString`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Serialized markup; `None` when the renderer produced nothing.
    pub html: Option<String>,

    #[serde(default)]
    pub styles: Vec<StyleSheet>,
}

/// Errors raised by a hydrate module implementation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to run renderer: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer protocol error: {0}")]
    Protocol(String),

    #[error("Renderer failed: {0}")]
    Failed(String),
}

/// The external renderer able to run components outside a browser.
#[async_trait]
pub trait HydrateModule: Send + Sync {
    /// Render an HTML fragment, expanding custom elements.
    async fn render_to_string(
        &self,
        html: &str,
        options: &RenderToStringOptions,
    ) -> Result<RenderOutput, RenderError>;

    /// Encode a non-primitive attribute value.
    fn serialize_property(&self, value: &PropValue) -> String {
        serialize_property(value)
    }
}

/// Errors that can occur while transforming a source file.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to render <{tag_name}>: {source}")]
    Render {
        tag_name: String,
        #[source]
        source: RenderError,
    },

    #[error("Renderer returned no markup for <{0}>")]
    EmptyMarkup(String),

    #[error("Unexpected markup for <{tag_name}>: {source}")]
    Markup {
        tag_name: String,
        #[source]
        source: MarkupError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors in the transform configuration, raised before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required option: {0}")]
    Missing(&'static str),

    #[error("Invalid option {option}: {message}")]
    Invalid {
        option: &'static str,
        message: String,
    },
}
