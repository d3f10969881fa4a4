//! Reading props object literals into plain values.
//!
//! Only literal shapes are understood. Anything else (function calls,
//! member expressions, spreads) is dropped for that key; a malformed
//! property never fails the transform.

use oxc_ast::ast::{
    ArrayExpression, Expression, NewExpression, ObjectExpression, ObjectPropertyKind, PropertyKey,
};

use crate::style::{style_from_value, StyleObject};
use crate::value::PropValue;

/// Props of one component call, split into the parts the renderer treats
/// differently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallProps {
    /// Attribute candidates in source order; `style` and `children` are
    /// not included.
    pub values: Vec<(String, PropValue)>,

    /// The `style` prop as an object.
    pub style: Option<StyleObject>,

    /// A literal string child, the only child forwarded to the renderer.
    pub children: Option<String>,
}

impl CallProps {
    /// Build props from values that were not read from source.
    pub fn from_values(values: Vec<(String, PropValue)>, children: Option<String>) -> Self {
        let mut props = CallProps {
            children,
            ..CallProps::default()
        };
        for (key, value) in values {
            props.push(key, value);
        }
        props
    }

    fn push(&mut self, key: String, value: PropValue) {
        match key.as_str() {
            "style" => self.style = style_from_value(&value),
            "children" => {
                if let PropValue::String(text) = value {
                    self.children = Some(text);
                }
            }
            _ => self.values.push((key, value)),
        }
    }

    /// Look up a prop value.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Read the props argument of a component call.
pub fn read_call_props(object: &ObjectExpression<'_>) -> CallProps {
    let mut props = CallProps::default();
    for (key, value) in read_entries(object) {
        props.push(key, value);
    }
    props
}

/// Read an object literal as an ordered list of entries.
pub fn read_object(object: &ObjectExpression<'_>) -> PropValue {
    PropValue::Object(read_entries(object))
}

fn read_entries(object: &ObjectExpression<'_>) -> Vec<(String, PropValue)> {
    let mut entries = Vec::with_capacity(object.properties.len());
    for property in &object.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            tracing::debug!("Skipping spread in props object");
            continue;
        };
        let Some(key) = property_key(&property.key, property.computed) else {
            tracing::warn!(
                "Skipping prop with unsupported key at offset {}",
                property.span.start
            );
            continue;
        };
        match read_value(&property.value) {
            Some(value) => entries.push((key, value)),
            None => tracing::debug!("Skipping prop `{}` with non-literal value", key),
        }
    }
    entries
}

fn property_key(key: &PropertyKey<'_>, computed: bool) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) if !computed => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        PropertyKey::NumericLiteral(n) => Some(crate::value::format_number(n.value)),
        _ => None,
    }
}

/// Read a literal expression. `None` means the shape is not understood.
pub fn read_value(expr: &Expression<'_>) -> Option<PropValue> {
    match expr {
        Expression::StringLiteral(s) => Some(PropValue::String(s.value.to_string())),
        Expression::NumericLiteral(n) => Some(PropValue::Number(n.value)),
        Expression::BooleanLiteral(b) => Some(PropValue::Bool(b.value)),
        Expression::NullLiteral(_) => Some(PropValue::Null),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() => {
            let text = t
                .quasis
                .iter()
                .map(|q| {
                    q.value
                        .cooked
                        .as_ref()
                        .map_or(q.value.raw.as_str(), |c| c.as_str())
                })
                .collect::<String>();
            Some(PropValue::String(text))
        }
        Expression::Identifier(id) => Some(match id.name.as_str() {
            "Infinity" => PropValue::Number(f64::INFINITY),
            "NaN" => PropValue::Number(f64::NAN),
            "undefined" => PropValue::Undefined,
            "null" => PropValue::Null,
            name => PropValue::Identifier(name.to_string()),
        }),
        Expression::UnaryExpression(unary) if unary.operator.as_str() == "-" => {
            match read_value(&unary.argument)? {
                PropValue::Number(n) => Some(PropValue::Number(-n)),
                _ => None,
            }
        }
        Expression::ArrayExpression(array) => Some(PropValue::Array(read_array(array))),
        Expression::ObjectExpression(object) => Some(read_object(object)),
        Expression::NewExpression(new) => read_collection(new),
        Expression::CallExpression(call) => {
            let Expression::Identifier(callee) = &call.callee else {
                return None;
            };
            if callee.name.as_str() != "Symbol" {
                return None;
            }
            let description = match call.arguments.first().and_then(|a| a.as_expression()) {
                Some(arg) => match read_value(arg)? {
                    PropValue::String(s) => s,
                    PropValue::Number(n) => crate::value::format_number(n),
                    _ => return None,
                },
                None => String::new(),
            };
            Some(PropValue::Symbol(description))
        }
        Expression::ParenthesizedExpression(paren) => read_value(&paren.expression),
        Expression::TSAsExpression(ts) => read_value(&ts.expression),
        Expression::TSSatisfiesExpression(ts) => read_value(&ts.expression),
        _ => None,
    }
}

/// Array elements; holes and non-literal elements are dropped.
fn read_array(array: &ArrayExpression<'_>) -> Vec<PropValue> {
    array
        .elements
        .iter()
        .filter_map(|element| element.as_expression())
        .filter_map(read_value)
        .collect()
}

/// `new Map([[k, v], ...])` and `new Set([...])`.
fn read_collection(new: &NewExpression<'_>) -> Option<PropValue> {
    let Expression::Identifier(callee) = &new.callee else {
        return None;
    };
    let items = match new.arguments.first() {
        Some(arg) => match read_value(arg.as_expression()?)? {
            PropValue::Array(items) => items,
            _ => return None,
        },
        None => Vec::new(),
    };

    match callee.name.as_str() {
        "Set" => Some(PropValue::Set(items)),
        "Map" => {
            let entries = items
                .into_iter()
                .filter_map(|item| match item {
                    PropValue::Array(pair) if pair.len() == 2 => {
                        let mut pair = pair.into_iter();
                        Some((pair.next()?, pair.next()?))
                    }
                    _ => None,
                })
                .collect();
            Some(PropValue::Map(entries))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::Statement;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use pretty_assertions::assert_eq;

    fn read(object_source: &str) -> CallProps {
        let allocator = Allocator::default();
        let source = format!("({object_source});");
        let ret = Parser::new(&allocator, &source, SourceType::mjs()).parse();
        assert!(ret.errors.is_empty());

        let Some(Statement::ExpressionStatement(stmt)) = ret.program.body.first() else {
            panic!("expected an expression statement");
        };
        let Expression::ParenthesizedExpression(paren) = &stmt.expression else {
            panic!("expected a parenthesized expression");
        };
        let Expression::ObjectExpression(object) = &paren.expression else {
            panic!("expected an object literal");
        };
        read_call_props(object)
    }

    #[test]
    fn reads_primitive_literals() {
        let props = read(r#"{ first: "John", "data-x": `tpl`, count: 3, offset: -1, on: true, off: false }"#);

        assert_eq!(
            props.values,
            vec![
                ("first".to_string(), PropValue::from("John")),
                ("data-x".to_string(), PropValue::from("tpl")),
                ("count".to_string(), PropValue::Number(3.0)),
                ("offset".to_string(), PropValue::Number(-1.0)),
                ("on".to_string(), PropValue::Bool(true)),
                ("off".to_string(), PropValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn reads_collections_and_special_identifiers() {
        let props = read(
            r#"{
                baz: new Map([["a", 1], ["b", [1, , 2]]]),
                quux: new Set(["x", 2]),
                corge: Symbol("id"),
                grault: Infinity,
                waldo: null,
                fred: someIdentifier,
            }"#,
        );

        assert_eq!(
            props.get("baz"),
            Some(&PropValue::Map(vec![
                (PropValue::from("a"), PropValue::Number(1.0)),
                (
                    PropValue::from("b"),
                    PropValue::Array(vec![PropValue::Number(1.0), PropValue::Number(2.0)])
                ),
            ]))
        );
        assert_eq!(
            props.get("quux"),
            Some(&PropValue::Set(vec![PropValue::from("x"), PropValue::Number(2.0)]))
        );
        assert_eq!(props.get("corge"), Some(&PropValue::Symbol("id".to_string())));
        assert_eq!(props.get("grault"), Some(&PropValue::Number(f64::INFINITY)));
        assert_eq!(props.get("waldo"), Some(&PropValue::Null));
        assert_eq!(
            props.get("fred"),
            Some(&PropValue::Identifier("someIdentifier".to_string()))
        );
    }

    #[test]
    fn extracts_style_and_string_children() {
        let props = read(r#"{ style: { backgroundColor: "red", zIndex: 2 }, children: "Hi" }"#);

        assert!(props.values.is_empty());
        assert_eq!(props.children.as_deref(), Some("Hi"));
        assert_eq!(
            serde_json::to_string(&props.style).unwrap(),
            r#"{"backgroundColor":"red","zIndex":2}"#
        );
    }

    #[test]
    fn identifier_children_are_not_light_dom() {
        let props = read(r#"{ children: title, label: `Save` }"#);

        assert_eq!(props.children, None);
        assert_eq!(props.values, vec![("label".to_string(), PropValue::from("Save"))]);

        let props = read(r#"{ children: `Save` }"#);
        assert_eq!(props.children.as_deref(), Some("Save"));
    }

    #[test]
    fn skips_unsupported_shapes() {
        let props = read(r#"{ onClick: () => {}, [computed]: 1, ...rest, children: foo(), ok: "yes" }"#);

        assert_eq!(props.values, vec![("ok".to_string(), PropValue::from("yes"))]);
        assert_eq!(props.children, None);
    }
}
