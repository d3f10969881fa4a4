//! Generated component declarations.
//!
//! Each captured call becomes one or two factories bound to the call's
//! placeholder identifier. Every element that carries server markup is
//! marked `suppressHydrationWarning`: the server class list, attribute
//! serialization and injected HTML never match a client re-render byte
//! for byte.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jsx::{Attr, AttrValue, Child, Element};
use crate::markup::{ComponentMarkup, OpenTag};
use crate::props::CallProps;
use crate::render::RenderedComponent;
use crate::style::{parse_css, StyleObject};
use crate::value::js_string;
use crate::visitor::ComponentCall;

/// Code generation strategy for shadow components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One factory that always renders the declarative shadow root.
    #[default]
    React,
    /// A lazily imported client component with a direct-render fallback.
    NextJs,
}

/// One generated binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Factory {
    pub name: String,
    pub body: FactoryBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FactoryBody {
    /// `({ children, ...props }) => element`
    Render(Element),
    /// Branches on `typeof window` per render.
    Environment { client: Element, server: Element },
    /// `dynamic(() => import(module).then((m) => m.export), { ssr: false, loading })`
    Dynamic {
        module: String,
        export: String,
        loading: Element,
    },
}

/// The factories generated for one component call.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Placeholder the rewritten call refers to.
    pub identifier: String,

    /// Factories in definition order; the last one is bound to `identifier`.
    pub factories: Vec<Factory>,
}

/// How props and children reach the generated element.
#[derive(Debug, Clone, Copy)]
pub enum Forward<'p> {
    /// Spread the runtime `props` and render the `children` binding.
    Props,
    /// Render a fixed string child; used for request-time HTML.
    Static(Option<&'p str>),
}

const PARAMS: &str = "({ children, ...props })";

impl Declaration {
    /// Print the factories as JSX source.
    pub fn to_jsx(&self) -> String {
        self.factories
            .iter()
            .map(|factory| match &factory.body {
                FactoryBody::Render(element) => {
                    format!("const {} = {PARAMS} => (\n  {}\n);", factory.name, element.to_jsx())
                }
                FactoryBody::Environment { client, server } => format!(
                    "const {} = {PARAMS} => typeof window !== \"undefined\"\n  ? {}\n  : {};",
                    factory.name,
                    client.to_jsx(),
                    server.to_jsx()
                ),
                FactoryBody::Dynamic {
                    module,
                    export,
                    loading,
                } => format!(
                    "const {} = dynamic(() => import({}).then((m) => m.{}), {{\n  ssr: false,\n  loading: () => {},\n}});",
                    factory.name,
                    js_string(module),
                    export,
                    loading.to_jsx()
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Print the factories as plain JavaScript using the `createElement`
    /// binding `h` and the `next/dynamic` binding `dynamic`.
    pub fn to_module_code(&self, h: &str, dynamic: &str) -> String {
        self.factories
            .iter()
            .map(|factory| match &factory.body {
                FactoryBody::Render(element) => format!(
                    "const {} = {PARAMS} => {};",
                    factory.name,
                    element.to_create_element(h)
                ),
                FactoryBody::Environment { client, server } => format!(
                    "const {} = {PARAMS} => typeof window !== \"undefined\" ? {} : {};",
                    factory.name,
                    client.to_create_element(h),
                    server.to_create_element(h)
                ),
                FactoryBody::Dynamic {
                    module,
                    export,
                    loading,
                } => format!(
                    "const {} = {dynamic}(() => import({}).then((m) => m.{}), {{ ssr: false, loading: () => {} }});",
                    factory.name,
                    js_string(module),
                    export,
                    loading.to_create_element(h)
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any factory needs `next/dynamic`.
    pub fn uses_dynamic(&self) -> bool {
        self.factories
            .iter()
            .any(|f| matches!(f.body, FactoryBody::Dynamic { .. }))
    }
}

/// Build the declaration for a rendered call.
pub fn build_declaration(
    call: &ComponentCall,
    rendered: &RenderedComponent,
    strategy: Strategy,
    from: &str,
) -> Declaration {
    let element = render_element(rendered, call.props.style.as_ref(), Forward::Props);

    let factories = match (&rendered.markup, strategy) {
        (ComponentMarkup::Shadow { .. }, Strategy::NextJs) => {
            let fallback = format!("{}Fallback", call.identifier);
            let client = Element::new(&rendered.tag_name)
                .spread("props")
                .attr("suppressHydrationWarning", AttrValue::Bool(true))
                .child(Child::Expr("children".to_string()));

            vec![
                Factory {
                    name: fallback.clone(),
                    body: FactoryBody::Environment {
                        client,
                        server: element,
                    },
                },
                Factory {
                    name: call.identifier.clone(),
                    body: FactoryBody::Dynamic {
                        module: from.to_string(),
                        export: call.component_name.clone(),
                        loading: static_element(Element::component(fallback), &call.props),
                    },
                },
            ]
        }
        _ => vec![Factory {
            name: call.identifier.clone(),
            body: FactoryBody::Render(element),
        }],
    };

    Declaration {
        identifier: call.identifier.clone(),
        factories,
    }
}

/// Build the element for rendered markup.
///
/// `style` is the original style object; it is preferred over re-parsing
/// the rendered `style` attribute.
pub fn render_element(
    rendered: &RenderedComponent,
    style: Option<&StyleObject>,
    forward: Forward<'_>,
) -> Element {
    match &rendered.markup {
        ComponentMarkup::Shadow {
            open_tag,
            shadow_html,
            ..
        } => {
            let template = Element::new("template")
                .attr("shadowrootmode", AttrValue::Str("open".to_string()))
                .attr("suppressHydrationWarning", AttrValue::Bool(true))
                .attr(
                    "dangerouslySetInnerHTML",
                    AttrValue::InnerHtml(shadow_html.clone()),
                );
            let host = host_element(&rendered.tag_name, open_tag, style, forward).element(template);
            match forward {
                Forward::Props => host.child(Child::Expr("children".to_string())),
                Forward::Static(Some(text)) => host.child(Child::Text(text.to_string())),
                Forward::Static(None) => host,
            }
        }
        ComponentMarkup::Scoped {
            open_tag,
            inner_html,
        } => {
            let mut display = StyleObject::new();
            display.insert("display".to_string(), Value::String("contents".to_string()));

            let mut wrapper = Element::new("div")
                .attr("style", AttrValue::Style(display))
                .attr("suppressHydrationWarning", AttrValue::Bool(true));

            for sheet in &rendered.styles {
                let mut style_element = Element::new("style");
                if let Some(id) = &sheet.id {
                    style_element = style_element.attr("id", AttrValue::Str(id.clone()));
                }
                wrapper = wrapper.element(
                    style_element
                        .attr("suppressHydrationWarning", AttrValue::Bool(true))
                        .attr(
                            "dangerouslySetInnerHTML",
                            AttrValue::InnerHtml(sheet.content.clone()),
                        ),
                );
            }

            let host = host_element(&rendered.tag_name, open_tag, style, forward).attr(
                "dangerouslySetInnerHTML",
                AttrValue::InnerHtml(inner_html.clone()),
            );
            wrapper.element(host)
        }
    }
}

/// The custom element with the rendered host attributes.
fn host_element(
    tag_name: &str,
    open_tag: &OpenTag,
    style: Option<&StyleObject>,
    forward: Forward<'_>,
) -> Element {
    let mut element = Element::new(tag_name);
    let mut has_style = false;

    for (name, value) in &open_tag.attributes {
        let value_text = value.clone().unwrap_or_default();
        let attr = match name.as_str() {
            "style" => {
                has_style = true;
                let style = style.cloned().unwrap_or_else(|| parse_css(&value_text));
                Attr::Named {
                    name: "style".to_string(),
                    value: AttrValue::Style(style),
                }
            }
            "class" => Attr::Named {
                name: "className".to_string(),
                value: AttrValue::Str(value_text),
            },
            _ => Attr::Named {
                name: name.clone(),
                value: AttrValue::Str(value_text),
            },
        };
        element.attrs.push(attr);
    }

    if let (false, Some(style)) = (has_style, style) {
        element = element.attr("style", AttrValue::Style(style.clone()));
    }

    if let Forward::Props = forward {
        element = element.spread("props");
    }
    element.attr("suppressHydrationWarning", AttrValue::Bool(true))
}

/// Attach build-time props as literal attributes. Identifiers are not in
/// scope at the declaration and are left out.
fn static_element(element: Element, props: &CallProps) -> Element {
    let mut element = props
        .values
        .iter()
        .filter(|(_, value)| !value.is_identifier())
        .fold(element, |el, (name, value)| {
            el.attr(name.clone(), AttrValue::Value(value.clone()))
        });
    if let Some(style) = &props.style {
        element = element.attr("style", AttrValue::Style(style.clone()));
    }
    if let Some(children) = &props.children {
        element = element.child(Child::Text(children.clone()));
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_open_tag;
    use crate::shadow_root::Serialization;
    use crate::traits::StyleSheet;
    use crate::value::PropValue;
    use pretty_assertions::assert_eq;

    fn call() -> ComponentCall {
        ComponentCall {
            identifier: "MyComponent$0".to_string(),
            component_name: "MyComponent".to_string(),
            tag_name: "my-component".to_string(),
            props: CallProps::from_values(vec![("first".to_string(), PropValue::from("John"))], None),
        }
    }

    fn shadow() -> RenderedComponent {
        RenderedComponent {
            tag_name: "my-component".to_string(),
            serialization: Serialization::DeclarativeShadowDom,
            markup: ComponentMarkup::Shadow {
                open_tag: parse_open_tag(r#"<my-component class="hydrated" first="John">"#).unwrap(),
                shadow_html: "<div>Hi</div>".to_string(),
            },
            styles: Vec::new(),
        }
    }

    #[test]
    fn react_strategy_emits_one_factory() {
        let declaration = build_declaration(&call(), &shadow(), Strategy::React, "lib");

        assert_eq!(
            declaration.to_jsx(),
            r#"const MyComponent$0 = ({ children, ...props }) => (
  <my-component className="hydrated" first="John" {...props} suppressHydrationWarning={true}><template shadowrootmode="open" suppressHydrationWarning={true} dangerouslySetInnerHTML={{ __html: "<div>Hi</div>" }} />{children}</my-component>
);"#
        );
        assert!(!declaration.uses_dynamic());
    }

    #[test]
    fn nextjs_strategy_emits_fallback_and_dynamic_factories() {
        let declaration = build_declaration(&call(), &shadow(), Strategy::NextJs, "lib");
        let code = declaration.to_module_code("h", "dynamic");

        assert!(declaration.uses_dynamic());
        assert_eq!(
            code,
            r#"const MyComponent$0Fallback = ({ children, ...props }) => typeof window !== "undefined" ? h("my-component", { ...props, suppressHydrationWarning: true }, children) : h("my-component", { className: "hydrated", first: "John", ...props, suppressHydrationWarning: true }, h("template", { shadowrootmode: "open", suppressHydrationWarning: true, dangerouslySetInnerHTML: { __html: "<div>Hi</div>" } }), children);
const MyComponent$0 = dynamic(() => import("lib").then((m) => m.MyComponent), { ssr: false, loading: () => h(MyComponent$0Fallback, { first: "John" }) });"#
        );
    }

    #[test]
    fn nextjs_loading_placeholder_omits_identifier_props() {
        let mut call = call();
        call.props = CallProps::from_values(
            vec![
                ("first".to_string(), PropValue::from("A")),
                ("onClick".to_string(), PropValue::Identifier("onGo".to_string())),
            ],
            None,
        );

        let code = build_declaration(&call, &shadow(), Strategy::NextJs, "lib")
            .to_module_code("h", "dynamic");

        assert!(code.contains("loading: () => h(MyComponent$0Fallback, { first: \"A\" })"));
        assert!(!code.contains("onGo"));
    }

    #[test]
    fn scoped_markup_is_wrapped_with_styles() {
        let rendered = RenderedComponent {
            tag_name: "my-button".to_string(),
            serialization: Serialization::Scoped,
            markup: ComponentMarkup::Scoped {
                open_tag: parse_open_tag(r#"<my-button class="sc-my-button-h">"#).unwrap(),
                inner_html: "<button>Go</button>".to_string(),
            },
            styles: vec![StyleSheet {
                href: None,
                id: Some("sc-my-button".to_string()),
                content: ".sc-my-button{color:red}".to_string(),
            }],
        };

        let element = render_element(&rendered, None, Forward::Static(None));

        assert_eq!(
            element.to_html(),
            r#"<div style="display: contents;"><style id="sc-my-button">.sc-my-button{color:red}</style><my-button class="sc-my-button-h"><button>Go</button></my-button></div>"#
        );
    }

    #[test]
    fn prefers_the_original_style_object() {
        let mut rendered = shadow();
        rendered.markup = ComponentMarkup::Shadow {
            open_tag: parse_open_tag(r#"<my-component style="z-index: 2;">"#).unwrap(),
            shadow_html: String::new(),
        };
        let style = crate::style::style_from_value(&PropValue::Object(vec![(
            "zIndex".to_string(),
            PropValue::Number(2.0),
        )]));

        let jsx = render_element(&rendered, style.as_ref(), Forward::Props).to_jsx();

        assert!(jsx.contains(r#"style={{"zIndex":2}}"#));
        assert!(!jsx.contains("style=\""));
    }
}
