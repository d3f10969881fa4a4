//! Server-side rendering for web component wrappers.
//!
//! This crate rewrites compiled React modules so that library components
//! render as Declarative Shadow DOM (or scoped light DOM) markup produced by
//! an external hydrate module, and provides the request-time twin of that
//! transform for renderers that see live props.

pub mod component;
pub mod jsx;
pub mod markup;
pub mod props;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod scanner;
pub mod serialize;
pub mod shadow_root;
pub mod style;
pub mod tags;
pub mod traits;
pub mod transform;
pub mod value;
pub mod visitor;

#[cfg(test)]
mod testing;

pub use component::{Declaration, Strategy};
pub use markup::{MarkupError, MarkupLayout};
pub use registry::{ComponentCompilerMeta, ComponentRegistry, RegistryError};
pub use runtime::{ComponentRenderer, Environment, RendererState};
pub use serialize::{deserialize_property, serialize_property, DecodeError};
pub use shadow_root::{SerializeShadowRoot, Serialization, ShadowRootMode};
pub use tags::TagTransformer;
pub use traits::{
    ConfigError, HydrateModule, RenderError, RenderOutput, RenderToStringOptions, StyleSheet,
    TransformError,
};
pub use transform::{SsrTransformer, TransformOptions, TransformOutput};
pub use value::PropValue;
