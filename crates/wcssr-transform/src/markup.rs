//! Splitting renderer output into host tag, shadow content and light DOM.
//!
//! The hydrate module pretty-prints one node per line. For a component
//! rendered with a declarative shadow root that looks like:
//!
//! ```text
//! <my-component class="hydrated" first="John" s-id="1">
//!   <template shadowrootmode="open">
//!     <div c-id="1.0.0.0">Hello</div>
//!   </template>
//!   <!--r.1-->
//! </my-component>
//! ```
//!
//! Scoped components have no `<template>` line; everything between the
//! host's opening and closing tags is the inner HTML.

use regex::Regex;
use std::sync::LazyLock;

use crate::shadow_root::Serialization;

/// The line format the splitter expects from the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkupLayout {
    /// `prettyHtml: true` output: the host opening tag on line 0, the
    /// shadow template opening on line 1, the template and host closing
    /// tags found by scanning from the end.
    #[default]
    PrettyV1,
}

const TEMPLATE_OPEN: &str = r#"<template shadowrootmode="open">"#;
const TEMPLATE_CLOSE: &str = "</template>";

/// Errors raised when the renderer output does not follow the layout.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("first line is not an opening <{tag}> tag: {line}")]
    MissingOpenTag { tag: String, line: String },

    #[error("no closing </template> line")]
    MissingTemplateClose,

    #[error("no closing </{0}> line")]
    MissingCloseTag(String),
}

/// The host element's opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub tag_name: String,

    /// Attributes in source order with entity-decoded values; `None` for
    /// valueless attributes.
    pub attributes: Vec<(String, Option<String>)>,
}

impl OpenTag {
    /// Look up an attribute value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// Renderer output split by serialization strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentMarkup {
    Shadow {
        open_tag: OpenTag,
        /// Content of the `<template shadowrootmode="open">` element.
        shadow_html: String,
    },
    Scoped {
        open_tag: OpenTag,
        inner_html: String,
    },
}

impl ComponentMarkup {
    pub fn open_tag(&self) -> &OpenTag {
        match self {
            ComponentMarkup::Shadow { open_tag, .. } | ComponentMarkup::Scoped { open_tag, .. } => {
                open_tag
            }
        }
    }
}

/// Split rendered HTML for `tag_name`.
pub fn split_markup(
    html: &str,
    tag_name: &str,
    serialization: Serialization,
    layout: MarkupLayout,
) -> Result<ComponentMarkup, MarkupError> {
    match layout {
        MarkupLayout::PrettyV1 => split_pretty(html, tag_name, serialization),
    }
}

fn split_pretty(
    html: &str,
    tag_name: &str,
    serialization: Serialization,
) -> Result<ComponentMarkup, MarkupError> {
    let lines: Vec<&str> = html
        .trim_matches('\n')
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .collect();

    let first = lines.first().copied().unwrap_or_default();
    let open_tag = parse_open_tag(first)
        .filter(|tag| tag.tag_name == tag_name)
        .ok_or_else(|| MarkupError::MissingOpenTag {
            tag: tag_name.to_string(),
            line: first.to_string(),
        })?;

    let close = format!("</{tag_name}>");
    let close_line = lines
        .iter()
        .rposition(|l| l.contains(&close))
        .ok_or_else(|| MarkupError::MissingCloseTag(tag_name.to_string()))?;

    // A shadow component rendered without a template (e.g. no shadow root
    // at all) is treated like a scoped one.
    let has_template = lines.get(1).is_some_and(|l| l.contains(TEMPLATE_OPEN));

    if serialization == Serialization::DeclarativeShadowDom && has_template {
        let template_close = lines
            .iter()
            .rposition(|l| l.contains(TEMPLATE_CLOSE))
            .filter(|&i| i >= 1 && i <= close_line)
            .ok_or(MarkupError::MissingTemplateClose)?;

        let shadow_html = if template_close == 1 {
            between(lines[1], TEMPLATE_OPEN, TEMPLATE_CLOSE).to_string()
        } else {
            lines[2..template_close].join("\n")
        };
        return Ok(ComponentMarkup::Shadow {
            open_tag,
            shadow_html,
        });
    }

    if serialization == Serialization::DeclarativeShadowDom && lines.len() > 1 && !has_template {
        tracing::debug!(tag = tag_name, "no shadow template in rendered markup");
    }

    let inner_html = if close_line == 0 {
        // `<tag ...>inner</tag>` on a single line.
        let after_open = first.find('>').map_or("", |i| &first[i + 1..]);
        after_open
            .rfind(&close)
            .map_or(after_open, |i| &after_open[..i])
            .to_string()
    } else {
        lines[1..close_line].join("\n")
    };

    Ok(ComponentMarkup::Scoped {
        open_tag,
        inner_html,
    })
}

fn between<'s>(line: &'s str, open: &str, close: &str) -> &'s str {
    let start = line.find(open).map_or(0, |i| i + open.len());
    let end = line[start..].find(close).map_or(line.len(), |i| start + i);
    &line[start..end]
}

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<([a-zA-Z][a-zA-Z0-9-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .expect("Invalid open tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
        .expect("Invalid attribute regex")
});

/// Parse an HTML opening tag.
pub fn parse_open_tag(line: &str) -> Option<OpenTag> {
    let caps = OPEN_TAG_RE.captures(line)?;
    let tag_name = caps.get(1)?.as_str().to_string();
    let attrs = caps.get(2).map_or("", |m| m.as_str());

    let attributes = ATTR_RE
        .captures_iter(attrs)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_string();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect();

    Some(OpenTag {
        tag_name,
        attributes,
    })
}

/// Escape HTML special characters including single quotes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Decode the entities the renderer emits in attribute values.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
