//! An in-process hydrate module for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::markup::{html_escape, parse_open_tag};
use crate::shadow_root::Serialization;
use crate::traits::{HydrateModule, RenderError, RenderOutput, RenderToStringOptions, StyleSheet};

/// One `render_to_string` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tag_name: String,
    pub attributes: Vec<(String, Option<String>)>,
    pub options: RenderToStringOptions,
}

/// Renders `<x-y first=.. middleName=.. last=..>` into a greeting, as a
/// declarative shadow root or as scoped light DOM. `broken-component`
/// renders nothing.
#[derive(Debug, Default)]
pub struct FakeHydrate {
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHydrate {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HydrateModule for FakeHydrate {
    async fn render_to_string(
        &self,
        html: &str,
        options: &RenderToStringOptions,
    ) -> Result<RenderOutput, RenderError> {
        let open_tag = parse_open_tag(html)
            .ok_or_else(|| RenderError::Failed(format!("not an element: {html}")))?;
        let tag = open_tag.tag_name.clone();

        self.calls.lock().unwrap().push(RecordedCall {
            tag_name: tag.clone(),
            attributes: open_tag.attributes.clone(),
            options: options.clone(),
        });

        if tag == "broken-component" {
            return Ok(RenderOutput::default());
        }

        let children = html
            .find('>')
            .and_then(|start| {
                let rest = &html[start + 1..];
                rest.rfind("</").map(|end| &rest[..end])
            })
            .unwrap_or_default();

        let attrs: String = open_tag
            .attributes
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!(" {}=\"{}\"", name, html_escape(value)),
                None => format!(" {name}"),
            })
            .collect();

        let greeting = ["first", "middleName", "last"]
            .iter()
            .filter_map(|name| open_tag.get(name))
            .collect::<Vec<_>>()
            .join(" ");

        let output = match options.serialize_shadow_root.resolve(&tag) {
            Serialization::DeclarativeShadowDom => RenderOutput {
                html: Some(format!(
                    "<{tag}{attrs} class=\"hydrated\" s-id=\"1\">\n  <template shadowrootmode=\"open\">\n    <style>:host{{display:block}}</style>\n    <div c-id=\"1.0.0.0\">Hello, World! I'm {greeting}</div>\n  </template>\n  <!--r.1-->\n  {children}\n</{tag}>"
                )),
                styles: Vec::new(),
            },
            Serialization::Scoped | Serialization::Disabled => RenderOutput {
                html: Some(format!(
                    "<{tag}{attrs} class=\"sc-{tag}-h hydrated\" s-id=\"1\">\n  <div class=\"sc-{tag}\">{children}</div>\n</{tag}>"
                )),
                styles: vec![StyleSheet {
                    href: None,
                    id: Some(format!("sc-{tag}")),
                    content: format!(".sc-{tag}-h{{display:block}}"),
                }],
            },
        };

        Ok(output)
    }
}
