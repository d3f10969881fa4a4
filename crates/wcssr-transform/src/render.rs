//! Renderer invocation: props to HTML, HTML to split markup.

use crate::markup::{html_escape, split_markup, ComponentMarkup};
use crate::props::CallProps;
use crate::shadow_root::Serialization;
use crate::style::style_to_css;
use crate::traits::{HydrateModule, RenderToStringOptions, StyleSheet, TransformError};
use crate::transform::TransformOptions;
use crate::value::PropValue;

/// Props that are never written as attributes.
const SKIPPED_PROPS: &[&str] = &[
    "children",
    "key",
    "ref",
    "style",
    "suppressHydrationWarning",
    "dangerouslySetInnerHTML",
];

/// A component after the renderer ran.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedComponent {
    /// Tag name after renaming.
    pub tag_name: String,
    pub serialization: Serialization,
    pub markup: ComponentMarkup,
    pub styles: Vec<StyleSheet>,
}

/// Build the attribute string for a component's opening tag.
///
/// `false` and `undefined` are omitted; other primitives are quoted as-is,
/// so `0` and `""` are kept. Everything else goes through the hydrate
/// module's property serializer.
pub fn build_attributes(props: &CallProps, hydrate: &dyn HydrateModule) -> String {
    let mut out = String::new();

    for (name, value) in &props.values {
        if SKIPPED_PROPS.contains(&name.as_str()) {
            continue;
        }
        let text = match value {
            PropValue::Bool(false) | PropValue::Undefined => continue,
            value => value
                .attribute_text()
                .unwrap_or_else(|| hydrate.serialize_property(value)),
        };
        let name = if name == "className" { "class" } else { name.as_str() };
        out.push_str(&format!(" {}=\"{}\"", name, html_escape(&text)));
    }

    if let Some(style) = &props.style {
        let css = style_to_css(style);
        if !css.is_empty() {
            out.push_str(&format!(" style=\"{}\"", html_escape(&css)));
        }
    }

    out
}

/// Build the HTML handed to the renderer. Only literal string children
/// are included as light DOM.
pub fn build_component_html(tag_name: &str, props: &CallProps, hydrate: &dyn HydrateModule) -> String {
    let children = props.children.as_deref().map(html_escape).unwrap_or_default();
    format!(
        "<{tag_name}{}>{children}</{tag_name}>",
        build_attributes(props, hydrate)
    )
}

/// Render one component and split the result.
///
/// A renderer failure or an empty result is fatal.
pub async fn render_component(
    original_tag: &str,
    props: &CallProps,
    options: &TransformOptions,
    hydrate: &dyn HydrateModule,
) -> Result<RenderedComponent, TransformError> {
    let tag_name = options.tags.transform(original_tag).into_owned();
    let html = build_component_html(&tag_name, props, hydrate);
    let render_options = RenderToStringOptions::fragment(options.serialize_shadow_root.clone());

    tracing::debug!("Rendering {}", html);

    let output = hydrate
        .render_to_string(&html, &render_options)
        .await
        .map_err(|source| TransformError::Render {
            tag_name: tag_name.clone(),
            source,
        })?;

    let html = output
        .html
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| TransformError::EmptyMarkup(tag_name.clone()))?;

    let serialization = options
        .serialize_shadow_root
        .resolve_renamed(original_tag, &tag_name);
    let markup = split_markup(&html, &tag_name, serialization, options.layout).map_err(
        |source| TransformError::Markup {
            tag_name: tag_name.clone(),
            source,
        },
    )?;

    Ok(RenderedComponent {
        tag_name,
        serialization,
        markup,
        styles: output.styles,
    })
}
