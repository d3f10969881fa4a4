//! `serializeShadowRoot` option and its per-tag resolution.

use serde::{Deserialize, Serialize};

/// How a component's shadow root is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowRootMode {
    DeclarativeShadowDom,
    Scoped,
}

/// The renderer option, as accepted by the hydrate module.
///
/// A string applies to every tag, an object lists tags per mode with a
/// fallback, `true` is the deprecated spelling of `declarative-shadow-dom`
/// and `false` turns shadow-root serialization off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializeShadowRoot {
    Enabled(bool),
    Mode(ShadowRootMode),
    PerTag(PerTagShadowRoot),
}

/// Per-tag mode lists with a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTagShadowRoot {
    #[serde(
        rename = "declarative-shadow-dom",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub declarative_shadow_dom: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scoped: Vec<String>,

    pub default: ShadowRootMode,
}

/// Resolved serialization for a single tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialization {
    DeclarativeShadowDom,
    Scoped,
    /// Shadow roots are not serialized at all; only light DOM is emitted.
    Disabled,
}

impl Default for SerializeShadowRoot {
    fn default() -> Self {
        SerializeShadowRoot::Mode(ShadowRootMode::DeclarativeShadowDom)
    }
}

impl From<ShadowRootMode> for Serialization {
    fn from(mode: ShadowRootMode) -> Self {
        match mode {
            ShadowRootMode::DeclarativeShadowDom => Serialization::DeclarativeShadowDom,
            ShadowRootMode::Scoped => Serialization::Scoped,
        }
    }
}

impl SerializeShadowRoot {
    /// Resolve the serialization for `tag_name`.
    pub fn resolve(&self, tag_name: &str) -> Serialization {
        match self {
            SerializeShadowRoot::Enabled(true) => Serialization::DeclarativeShadowDom,
            SerializeShadowRoot::Enabled(false) => Serialization::Disabled,
            SerializeShadowRoot::Mode(mode) => (*mode).into(),
            SerializeShadowRoot::PerTag(per_tag) => per_tag
                .lookup(tag_name)
                .unwrap_or(per_tag.default)
                .into(),
        }
    }

    /// Resolve against the original tag first, then its renamed form.
    pub fn resolve_renamed(&self, original: &str, renamed: &str) -> Serialization {
        if let SerializeShadowRoot::PerTag(per_tag) = self {
            if let Some(mode) = per_tag.lookup(original).or_else(|| per_tag.lookup(renamed)) {
                return mode.into();
            }
        }
        self.resolve(original)
    }
}

impl PerTagShadowRoot {
    /// Exact-match lookup in the mode lists.
    fn lookup(&self, tag_name: &str) -> Option<ShadowRootMode> {
        if self.scoped.iter().any(|t| t == tag_name) {
            Some(ShadowRootMode::Scoped)
        } else if self.declarative_shadow_dom.iter().any(|t| t == tag_name) {
            Some(ShadowRootMode::DeclarativeShadowDom)
        } else {
            None
        }
    }
}
