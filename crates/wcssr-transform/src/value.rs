//! Plain values read from component props.
//!
//! Build-time props come from object-literal AST nodes, runtime props are
//! handed over directly. Both end up as a [`PropValue`] before they are
//! stringified into HTML attributes or re-emitted as JavaScript.

use std::fmt::Write as _;

/// A prop value that can be stringified for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropValue>),
    /// Object entries in source order.
    Object(Vec<(String, PropValue)>),
    Map(Vec<(PropValue, PropValue)>),
    Set(Vec<PropValue>),
    /// Symbols round-trip by description only.
    Symbol(String),
    /// A bare identifier. Its name is the attribute text, but it is never
    /// re-emitted as a literal.
    Identifier(String),
}

impl PropValue {
    /// Attribute text for primitive values.
    ///
    /// Non-finite numbers have none: `Infinity` cannot be told apart from
    /// the string `"Infinity"` once it is an attribute.
    pub fn attribute_text(&self) -> Option<String> {
        match self {
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::String(s) | PropValue::Identifier(s) => Some(s.clone()),
            PropValue::Number(n) if n.is_finite() => Some(format_number(*n)),
            _ => None,
        }
    }

    /// Get as string if it's a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, PropValue::Identifier(_))
    }

    /// Render the value as a JavaScript expression.
    ///
    /// Identifiers are not in scope where the expression is emitted: object
    /// entries holding one are dropped, other positions become `undefined`.
    pub fn to_js(&self) -> String {
        let mut out = String::new();
        self.write_js(&mut out);
        out
    }

    fn write_js(&self, out: &mut String) {
        match self {
            PropValue::Undefined | PropValue::Identifier(_) => out.push_str("undefined"),
            PropValue::Null => out.push_str("null"),
            PropValue::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            PropValue::Number(n) => out.push_str(&format_number(*n)),
            PropValue::String(s) => out.push_str(&js_string(s)),
            PropValue::Array(items) => {
                out.push('[');
                write_list(out, items);
                out.push(']');
            }
            PropValue::Object(entries) => {
                out.push('{');
                let entries = entries.iter().filter(|(_, value)| !value.is_identifier());
                for (i, (key, value)) in entries.enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&js_string(key));
                    out.push_str(": ");
                    value.write_js(out);
                }
                out.push('}');
            }
            PropValue::Map(entries) => {
                out.push_str("new Map([");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('[');
                    key.write_js(out);
                    out.push_str(", ");
                    value.write_js(out);
                    out.push(']');
                }
                out.push_str("])");
            }
            PropValue::Set(items) => {
                out.push_str("new Set([");
                write_list(out, items);
                out.push_str("])");
            }
            PropValue::Symbol(description) => {
                let _ = write!(out, "Symbol({})", js_string(description));
            }
        }
    }
}

fn write_list(out: &mut String, items: &[PropValue]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_js(out);
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Number(value as f64)
    }
}

/// Format a number the way JavaScript's `String(n)` does for common values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Quote a string as a JavaScript string literal.
pub fn js_string(s: &str) -> String {
    // JSON string syntax is a subset of JavaScript string syntax, except for
    // the two line terminators below.
    serde_json::to_string(s)
        .unwrap_or_else(|_| format!("\"{}\"", s.replace('"', "\\\"")))
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
