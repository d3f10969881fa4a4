//! Inline style objects.
//!
//! A `style` prop is kept as an object so it can be written back as
//! `style={{...}}` with its numeric and string values intact, instead of
//! round-tripping through an HTML `style="..."` string.

use serde_json::{Map, Number, Value};

use crate::value::{format_number, PropValue};

/// Plain-object projection of a `style` prop, in source order.
pub type StyleObject = Map<String, Value>;

/// Convert a prop value into a style object.
///
/// Returns `None` for anything that is not an object.
pub fn style_from_value(value: &PropValue) -> Option<StyleObject> {
    let PropValue::Object(entries) = value else {
        return None;
    };

    let mut style = StyleObject::new();
    for (key, value) in entries {
        if let Some(value) = style_value(value) {
            style.insert(key.clone(), value);
        }
    }
    Some(style)
}

fn style_value(value: &PropValue) -> Option<Value> {
    match value {
        PropValue::String(s) => Some(Value::String(s.clone())),
        PropValue::Bool(b) => Some(Value::Bool(*b)),
        PropValue::Null => Some(Value::Null),
        PropValue::Number(n) if n.is_finite() => Some(number(*n)),
        PropValue::Object(_) => style_from_value(value).map(Value::Object),
        _ => None,
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Render the object as the inner part of a JSX `style={{...}}` expression.
pub fn style_to_js(style: &StyleObject) -> String {
    serde_json::to_string(style).unwrap_or_else(|_| "{}".to_string())
}

/// Properties whose numeric values React leaves without a unit.
const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "aspectRatio",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "columns",
    "flex",
    "flexGrow",
    "flexPositive",
    "flexShrink",
    "flexNegative",
    "flexOrder",
    "gridArea",
    "gridRow",
    "gridRowEnd",
    "gridRowSpan",
    "gridRowStart",
    "gridColumn",
    "gridColumnEnd",
    "gridColumnSpan",
    "gridColumnStart",
    "fontWeight",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "scale",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
];

fn is_unitless(name: &str) -> bool {
    if name.starts_with("--") {
        return true;
    }
    // `WebkitLineClamp` and `msFlexGrow` share the unprefixed rule.
    let unprefixed = ["Webkit", "Moz", "ms", "O"]
        .iter()
        .find_map(|prefix| {
            name.strip_prefix(prefix)
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        })
        .map(|rest| {
            let mut chars = rest.chars();
            chars
                .next()
                .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
                .unwrap_or_default()
        });
    let name = unprefixed.as_deref().unwrap_or(name);
    UNITLESS_PROPERTIES.contains(&name)
}

/// Render the object as an HTML `style` attribute value.
///
/// Non-zero numbers get a `px` unit unless the property is unitless, as
/// React does.
pub fn style_to_css(style: &StyleObject) -> String {
    style
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => {
                    let n = n.as_f64().unwrap_or_default();
                    if n == 0.0 || is_unitless(key) {
                        format_number(n)
                    } else {
                        format!("{}px", format_number(n))
                    }
                }
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some(format!("{}: {};", css_property_name(key), text))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an HTML `style` attribute into a style object.
///
/// Values stay strings: the attribute has already lost numeric typing.
pub fn parse_css(css: &str) -> StyleObject {
    let mut style = StyleObject::new();
    for declaration in css.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        style.insert(js_property_name(name), Value::String(value.to_string()));
    }
    style
}

/// `backgroundColor` -> `background-color`. Custom properties are kept as-is.
fn css_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    // Vendor prefixes: `WebkitTransform` -> `-webkit-transform`, `msFlex` -> `-ms-flex`.
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}

/// `background-color` -> `backgroundColor`.
fn js_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let name = name.strip_prefix("-ms-").map_or_else(
        || name.trim_start_matches('-').to_string(),
        |rest| format!("ms-{rest}"),
    );

    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
