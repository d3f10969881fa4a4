//! A small element tree for generated component bodies.
//!
//! The same tree prints as JSX source, as `createElement` calls for the
//! emitted module, or as HTML for request-time server output.

use crate::markup::html_escape;
use crate::serialize::serialize_property;
use crate::style::{style_to_css, style_to_js, StyleObject};
use crate::value::{js_string, PropValue};

/// Props that never reach the DOM.
const REACT_ONLY_PROPS: &[&str] = &["key", "ref", "suppressHydrationWarning"];

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// A DOM element, printed as a string tag.
    Intrinsic(String),
    /// A binding in scope, printed as an identifier.
    Component(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Style(StyleObject),
    /// `dangerouslySetInnerHTML={{ __html }}`
    InnerHtml(String),
    /// A JavaScript expression copied verbatim.
    Expr(String),
    Value(PropValue),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Named { name: String, value: AttrValue },
    /// `{...expr}`
    Spread(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Element),
    Expr(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub attrs: Vec<Attr>,
    pub children: Vec<Child>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Tag::Intrinsic(tag.into()),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        Self {
            tag: Tag::Component(name.into()),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.push(Attr::Named {
            name: name.into(),
            value,
        });
        self
    }

    pub fn spread(mut self, expr: impl Into<String>) -> Self {
        self.attrs.push(Attr::Spread(expr.into()));
        self
    }

    pub fn child(mut self, child: Child) -> Self {
        self.children.push(child);
        self
    }

    pub fn element(self, element: Element) -> Self {
        self.child(Child::Element(element))
    }

    /// Look up a named attribute.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find_map(|attr| match attr {
            Attr::Named { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    fn tag_name(&self) -> &str {
        match &self.tag {
            Tag::Intrinsic(name) | Tag::Component(name) => name,
        }
    }

    /// Print as JSX source.
    pub fn to_jsx(&self) -> String {
        let mut out = String::new();
        self.write_jsx(&mut out);
        out
    }

    fn write_jsx(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag_name());
        for attr in &self.attrs {
            out.push(' ');
            match attr {
                Attr::Spread(expr) => {
                    out.push_str("{...");
                    out.push_str(expr);
                    out.push('}');
                }
                Attr::Named { name, value } => {
                    out.push_str(name);
                    out.push('=');
                    match value {
                        AttrValue::Str(s) if is_plain_jsx_string(s) => {
                            out.push('"');
                            out.push_str(s);
                            out.push('"');
                        }
                        AttrValue::Str(s) => {
                            out.push('{');
                            out.push_str(&js_string(s));
                            out.push('}');
                        }
                        AttrValue::Bool(b) => out.push_str(&format!("{{{b}}}")),
                        AttrValue::Style(style) => {
                            out.push_str(&format!("{{{}}}", style_to_js(style)));
                        }
                        AttrValue::InnerHtml(html) => {
                            out.push_str(&format!("{{{{ __html: {} }}}}", js_string(html)));
                        }
                        AttrValue::Expr(expr) => {
                            out.push('{');
                            out.push_str(expr);
                            out.push('}');
                        }
                        AttrValue::Value(value) => {
                            out.push('{');
                            out.push_str(&value.to_js());
                            out.push('}');
                        }
                    }
                }
            }
        }

        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Child::Element(element) => element.write_jsx(out),
                Child::Expr(expr) => {
                    out.push('{');
                    out.push_str(expr);
                    out.push('}');
                }
                Child::Text(text) if is_plain_jsx_text(text) => out.push_str(text),
                Child::Text(text) => {
                    out.push('{');
                    out.push_str(&js_string(text));
                    out.push('}');
                }
            }
        }
        out.push_str("</");
        out.push_str(self.tag_name());
        out.push('>');
    }

    /// Print as nested calls to the `createElement` binding `h`.
    pub fn to_create_element(&self, h: &str) -> String {
        let mut out = String::new();
        self.write_create_element(h, &mut out);
        out
    }

    fn write_create_element(&self, h: &str, out: &mut String) {
        out.push_str(h);
        out.push('(');
        match &self.tag {
            Tag::Intrinsic(name) => out.push_str(&js_string(name)),
            Tag::Component(name) => out.push_str(name),
        }
        out.push_str(", ");

        if self.attrs.is_empty() {
            out.push_str("null");
        } else {
            out.push_str("{ ");
            for (i, attr) in self.attrs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match attr {
                    Attr::Spread(expr) => {
                        out.push_str("...");
                        out.push_str(expr);
                    }
                    Attr::Named { name, value } => {
                        out.push_str(&js_key(name));
                        out.push_str(": ");
                        match value {
                            AttrValue::Str(s) => out.push_str(&js_string(s)),
                            AttrValue::Bool(b) => out.push_str(&b.to_string()),
                            AttrValue::Style(style) => out.push_str(&style_to_js(style)),
                            AttrValue::InnerHtml(html) => {
                                out.push_str(&format!("{{ __html: {} }}", js_string(html)));
                            }
                            AttrValue::Expr(expr) => out.push_str(expr),
                            AttrValue::Value(value) => out.push_str(&value.to_js()),
                        }
                    }
                }
            }
            out.push_str(" }");
        }

        for child in &self.children {
            out.push_str(", ");
            match child {
                Child::Element(element) => element.write_create_element(h, out),
                Child::Expr(expr) => out.push_str(expr),
                Child::Text(text) => out.push_str(&js_string(text)),
            }
        }
        out.push(')');
    }

    /// Print as HTML. Expressions and spreads have no static value and are
    /// left out.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let tag = self.tag_name();
        let mut inner_html = None;

        out.push('<');
        out.push_str(tag);
        for attr in &self.attrs {
            let Attr::Named { name, value } = attr else {
                continue;
            };
            if REACT_ONLY_PROPS.contains(&name.as_str()) {
                continue;
            }
            let name = if name == "className" { "class" } else { name.as_str() };
            let text = match value {
                AttrValue::Str(s) => Some(s.clone()),
                AttrValue::Bool(false) => None,
                AttrValue::Bool(true) => Some(String::new()),
                AttrValue::Style(style) => Some(style_to_css(style)),
                AttrValue::InnerHtml(html) => {
                    inner_html = Some(html.as_str());
                    None
                }
                AttrValue::Expr(_) => None,
                AttrValue::Value(PropValue::Bool(false) | PropValue::Undefined) => None,
                AttrValue::Value(value) => Some(
                    value
                        .attribute_text()
                        .unwrap_or_else(|| serialize_property(value)),
                ),
            };
            if let Some(text) = text {
                out.push(' ');
                out.push_str(name);
                if !text.is_empty() || !matches!(value, AttrValue::Bool(true)) {
                    out.push_str("=\"");
                    out.push_str(&html_escape(&text));
                    out.push('"');
                }
            }
        }
        out.push('>');

        match inner_html {
            Some(html) => out.push_str(html),
            None => {
                for child in &self.children {
                    match child {
                        Child::Element(element) => element.write_html(out),
                        Child::Text(text) => out.push_str(&html_escape(text)),
                        Child::Expr(_) => {}
                    }
                }
            }
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

/// Object key: bare when it is a valid identifier, quoted otherwise.
fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_ident = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        name.to_string()
    } else {
        js_string(name)
    }
}

fn is_plain_jsx_string(s: &str) -> bool {
    !s.contains(['"', '\\', '\n', '\r'])
}

fn is_plain_jsx_text(s: &str) -> bool {
    !s.is_empty() && !s.contains(['{', '}', '<', '>', '\n']) && s.trim() == s
}
