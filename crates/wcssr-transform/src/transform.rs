//! The per-file transform: gate, rewrite, render, assemble.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;

use crate::component::{build_declaration, Declaration, Strategy};
use crate::markup::MarkupLayout;
use crate::registry::ComponentRegistry;
use crate::render::render_component;
use crate::scanner::scan_imports;
use crate::shadow_root::SerializeShadowRoot;
use crate::tags::TagTransformer;
use crate::traits::{ConfigError, HydrateModule, TransformError};
use crate::visitor::{rewrite_source, ComponentBinding};

/// Local name of `createElement` in generated code.
pub const CREATE_ELEMENT: &str = "__wcssr_h";

/// Local name of `next/dynamic` in generated code.
pub const DYNAMIC: &str = "__wcssr_dynamic";

/// Configuration shared by the build-time transform and the runtime
/// renderer.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Import specifier of the component library.
    pub from: String,
    pub registry: Arc<ComponentRegistry>,
    pub serialize_shadow_root: SerializeShadowRoot,
    pub strategy: Strategy,
    pub tags: TagTransformer,
    pub layout: MarkupLayout,
}

impl TransformOptions {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            registry: Arc::new(ComponentRegistry::new()),
            serialize_shadow_root: SerializeShadowRoot::default(),
            strategy: Strategy::default(),
            tags: TagTransformer::new(),
            layout: MarkupLayout::default(),
        }
    }

    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_serialize_shadow_root(mut self, option: SerializeShadowRoot) -> Self {
        self.serialize_shadow_root = option;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tags(mut self, tags: TagTransformer) -> Self {
        self.tags = tags;
        self
    }

    /// Check the options before any file is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.from.trim().is_empty() {
            return Err(ConfigError::Missing("from"));
        }
        if self.registry.is_empty() {
            return Err(ConfigError::Invalid {
                option: "components",
                message: "no components are registered".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of transforming a file.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub code: String,

    /// One declaration per captured call, in source order.
    pub declarations: Vec<Declaration>,
}

/// Transforms module sources so library components render with server
/// markup.
pub struct SsrTransformer {
    options: TransformOptions,
    hydrate: Arc<dyn HydrateModule>,
}

impl SsrTransformer {
    /// Create a transformer; fails on invalid options.
    pub fn new(
        options: TransformOptions,
        hydrate: Arc<dyn HydrateModule>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options, hydrate })
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Transform `code` from the module `id`.
    ///
    /// Returns `None` when the file does not use the library, or uses it
    /// without constructing any component.
    pub async fn transform(
        &self,
        code: &str,
        id: &str,
    ) -> Result<Option<TransformOutput>, TransformError> {
        let scan = scan_imports(code, &self.options.from);
        if !scan.is_relevant() {
            tracing::debug!("Skipping {}: no library or JSX factory import", id);
            return Ok(None);
        }

        let bindings = self.bindings(&scan.library);
        let rewritten = rewrite_source(
            code,
            id,
            &self.options.from,
            &scan.jsx_factories,
            &bindings,
        )?;
        if rewritten.calls.is_empty() {
            tracing::debug!("Skipping {}: no component calls", id);
            return Ok(None);
        }

        tracing::debug!("Rendering {} component calls in {}", rewritten.calls.len(), id);

        let rendered = try_join_all(rewritten.calls.iter().map(|call| {
            render_component(
                &call.tag_name,
                &call.props,
                &self.options,
                self.hydrate.as_ref(),
            )
        }))
        .await?;

        let declarations: Vec<Declaration> = rewritten
            .calls
            .iter()
            .zip(&rendered)
            .map(|(call, rendered)| {
                build_declaration(call, rendered, self.options.strategy, &self.options.from)
            })
            .collect();

        Ok(Some(TransformOutput {
            code: assemble(&rewritten.code, &declarations),
            declarations,
        }))
    }

    /// Like [`transform`](Self::transform), returning the source unchanged
    /// when there is nothing to do.
    pub async fn transform_code(&self, code: &str, id: &str) -> Result<String, TransformError> {
        Ok(self
            .transform(code, id)
            .await?
            .map_or_else(|| code.to_string(), |output| output.code))
    }

    /// Local names bound to registered components by the library imports.
    fn bindings(
        &self,
        imports: &[crate::scanner::StaticImport],
    ) -> HashMap<String, ComponentBinding> {
        imports
            .iter()
            .flat_map(|import| &import.names)
            .filter(|name| self.options.registry.contains(&name.imported))
            .map(|name| {
                let tag_name = self.options.registry.tag_name(&name.imported);
                (
                    name.local.clone(),
                    ComponentBinding {
                        component_name: name.imported.clone(),
                        tag_name,
                    },
                )
            })
            .collect()
    }
}

/// Join directives, runtime imports, declarations and the rewritten code.
fn assemble(code: &str, declarations: &[Declaration]) -> String {
    let (directives, body) = split_directives(code);

    let mut out = String::with_capacity(code.len() + declarations.len() * 256);
    out.push_str(directives);
    out.push_str(&format!(
        "import {{ createElement as {CREATE_ELEMENT} }} from \"react\";\n"
    ));
    if declarations.iter().any(Declaration::uses_dynamic) {
        out.push_str(&format!("import {DYNAMIC} from \"next/dynamic\";\n"));
    }
    for declaration in declarations {
        out.push_str(&declaration.to_module_code(CREATE_ELEMENT, DYNAMIC));
        out.push('\n');
    }
    out.push_str(body);
    out
}

/// Split leading directive lines (`"use client";`) from the rest.
fn split_directives(code: &str) -> (&str, &str) {
    let mut end = 0;
    for line in code.split_inclusive('\n') {
        let trimmed = line.trim();
        let is_directive = (trimmed.starts_with('"') || trimmed.starts_with('\''))
            && trimmed.trim_end_matches(';').len() >= 2
            && trimmed.contains("use ");
        if trimmed.is_empty() || is_directive {
            end += line.len();
        } else {
            break;
        }
    }
    code.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::deserialize_property;
    use crate::shadow_root::{PerTagShadowRoot, ShadowRootMode};
    use crate::testing::FakeHydrate;
    use crate::value::PropValue;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#""use client";
import { jsxDEV as _jsxDEV } from "react/jsx-dev-runtime";
import { MyComponent } from "component-library-react";
export default function Page() {
  return _jsxDEV(MyComponent, { first: "John", middleName: "William", last: "Doe" }, void 0, false);
}
"#;

    fn transformer(options: TransformOptions) -> (SsrTransformer, Arc<FakeHydrate>) {
        let hydrate = Arc::new(FakeHydrate::default());
        let transformer = SsrTransformer::new(options, hydrate.clone()).unwrap();
        (transformer, hydrate)
    }

    fn options() -> TransformOptions {
        TransformOptions::new("component-library-react").with_registry(
            ComponentRegistry::from_names(["MyComponent", "MyButton", "BrokenComponent"]),
        )
    }

    #[tokio::test]
    async fn files_without_the_library_are_returned_unchanged() {
        let (transformer, hydrate) = transformer(options());
        let sources = [
            "export const x = 1;\n",
            "import { jsxDEV } from \"react/jsx-dev-runtime\";\nexport default () => jsxDEV(\"div\", {});\n",
            "import { MyComponent } from \"component-library-react\";\nexport { MyComponent };\n",
        ];

        for source in sources {
            assert!(transformer.transform(source, "a.js").await.unwrap().is_none());
            assert_eq!(transformer.transform_code(source, "a.js").await.unwrap(), source);
        }
        assert!(hydrate.calls().is_empty());
    }

    #[tokio::test]
    async fn renders_shadow_components() {
        let (transformer, _) = transformer(options());

        let output = transformer.transform(PAGE, "page.js").await.unwrap().unwrap();

        assert_eq!(output.declarations.len(), 1);
        let jsx = output.declarations[0].to_jsx();
        assert!(jsx.contains(r#"<template shadowrootmode="open" suppressHydrationWarning={true} dangerouslySetInnerHTML={{ __html: "#));
        assert!(jsx.contains("Hello, World! I'm John William Doe"));
        assert!(jsx.contains("suppressHydrationWarning={true}"));

        assert!(output.code.starts_with(
            "\"use client\";\nimport { createElement as __wcssr_h } from \"react\";\nconst MyComponent$0 = "
        ));
        assert!(output.code.contains(
            r#"_jsxDEV(MyComponent$0, { first: "John", middleName: "William", last: "Doe", suppressHydrationWarning: true }, void 0, false)"#
        ));
        assert!(!output.code.contains("from \"component-library-react\""));
    }

    #[tokio::test]
    async fn identifiers_are_stable_across_runs() {
        let source = r#"import { jsx as _jsx, jsxs as _jsxs } from "react/jsx-runtime";
import { MyComponent, MyButton } from "component-library-react";
export const A = () => _jsxs("main", { children: [_jsx(MyButton, {}), _jsx(MyComponent, { first: "A" }), _jsx(MyButton, {})] });
"#;
        let (transformer, _) = transformer(options());

        let first = transformer.transform(source, "a.js").await.unwrap().unwrap();
        let second = transformer.transform(source, "a.js").await.unwrap().unwrap();
        let identifiers = |output: &TransformOutput| {
            output
                .declarations
                .iter()
                .map(|d| d.identifier.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            identifiers(&first),
            vec!["MyButton$0", "MyComponent$1", "MyButton$2"]
        );
        assert_eq!(first.code, second.code);
    }

    #[tokio::test]
    async fn scoped_components_receive_serialized_props() {
        let source = r#"import { jsxDEV as _jsxDEV } from "react/jsx-dev-runtime";
import { MyButton } from "component-library-react";
export const A = () => _jsxDEV(MyButton, {
  baz: new Map([["a", 1]]),
  quux: new Set(["x"]),
  grault: Infinity,
  waldo: null,
});
"#;
        let (transformer, hydrate) = transformer(
            options().with_serialize_shadow_root(SerializeShadowRoot::PerTag(PerTagShadowRoot {
                declarative_shadow_dom: Vec::new(),
                scoped: vec!["my-button".to_string()],
                default: ShadowRootMode::DeclarativeShadowDom,
            })),
        );

        let output = transformer.transform(source, "a.jsx").await.unwrap().unwrap();

        let calls = hydrate.calls();
        assert_eq!(calls.len(), 1);
        let attrs = &calls[0].attributes;
        for name in ["baz", "quux", "grault", "waldo"] {
            let value = attrs
                .iter()
                .find(|(n, _)| n == name)
                .and_then(|(_, v)| v.as_deref())
                .unwrap();
            assert!(value.starts_with("serialized:"), "{name} = {value}");
        }
        let grault = attrs.iter().find(|(n, _)| n == "grault").unwrap();
        assert_eq!(
            deserialize_property(grault.1.as_deref().unwrap()).unwrap(),
            PropValue::Number(f64::INFINITY)
        );

        let code = &output.code;
        assert!(code.contains(r#"__wcssr_h("div", { style: {"display":"contents"}, suppressHydrationWarning: true }"#));
        assert!(code.contains(r#"__wcssr_h("style", { id: "sc-my-button", suppressHydrationWarning: true"#));
    }

    #[tokio::test]
    async fn identifier_children_are_not_rendered_as_text() {
        let source = r#"import { jsxDEV as _jsxDEV } from "react/jsx-dev-runtime";
import { MyButton } from "component-library-react";
export const A = ({ title }) => _jsxDEV(MyButton, { label: "Go", children: title });
"#;
        let (transformer, hydrate) = transformer(
            options().with_serialize_shadow_root(SerializeShadowRoot::Mode(ShadowRootMode::Scoped)),
        );

        let output = transformer.transform(source, "a.jsx").await.unwrap().unwrap();

        let jsx = output.declarations[0].to_jsx();
        assert!(!jsx.contains(">title<"), "{jsx}");
        assert!(!jsx.contains("\"title\""), "{jsx}");
        let calls = hydrate.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].attributes.iter().any(|(n, _)| n == "label"));
        assert!(!calls[0].attributes.iter().any(|(n, _)| n == "children"));
    }

    #[tokio::test]
    async fn style_objects_are_reinjected_as_objects() {
        let source = r#"import { jsxDEV as _jsxDEV } from "react/jsx-dev-runtime";
import { MyComponent } from "component-library-react";
export const A = () => _jsxDEV(MyComponent, { first: "A", style: { backgroundColor: "red" } });
"#;
        let (transformer, _) = transformer(options());

        let output = transformer.transform(source, "a.js").await.unwrap().unwrap();
        let jsx = output.declarations[0].to_jsx();

        assert!(jsx.contains(r#"style={{"backgroundColor":"red"}}"#));
        assert!(!jsx.contains("style=\"background-color"));
        assert!(output.code.contains(r#"style: {"backgroundColor":"red"}"#));
    }

    #[tokio::test]
    async fn nextjs_strategy_imports_dynamic() {
        let (transformer, _) = transformer(options().with_strategy(Strategy::NextJs));

        let output = transformer.transform(PAGE, "page.js").await.unwrap().unwrap();

        assert!(output.code.contains("import __wcssr_dynamic from \"next/dynamic\";"));
        assert!(output.code.contains("const MyComponent$0Fallback = "));
        assert!(output.code.contains(
            r#"const MyComponent$0 = __wcssr_dynamic(() => import("component-library-react").then((m) => m.MyComponent)"#
        ));
    }

    #[tokio::test]
    async fn renamed_tags_are_rendered_under_their_new_name() {
        let (transformer, hydrate) = transformer(
            options().with_tags(TagTransformer::new().with_rename("my-component", "v2-my-component")),
        );

        let output = transformer.transform(PAGE, "page.js").await.unwrap().unwrap();

        assert_eq!(hydrate.calls()[0].tag_name, "v2-my-component");
        assert!(output.code.contains(r#"__wcssr_h("v2-my-component""#));
    }

    #[tokio::test]
    async fn an_empty_render_fails_the_whole_file() {
        let source = r#"import { jsxDEV as _jsxDEV } from "react/jsx-dev-runtime";
import { MyComponent, BrokenComponent } from "component-library-react";
export const A = () => [_jsxDEV(MyComponent, {}), _jsxDEV(BrokenComponent, {})];
"#;
        let (transformer, _) = transformer(options());

        let result = transformer.transform(source, "a.js").await;

        assert!(matches!(result, Err(TransformError::EmptyMarkup(_))));
    }

    #[test]
    fn rejects_missing_options() {
        let hydrate: Arc<dyn HydrateModule> = Arc::new(FakeHydrate::default());

        assert!(matches!(
            SsrTransformer::new(TransformOptions::new(" "), hydrate.clone()),
            Err(ConfigError::Missing("from"))
        ));
        assert!(matches!(
            SsrTransformer::new(TransformOptions::new("lib"), hydrate),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn keeps_directives_first() {
        assert_eq!(
            split_directives("'use client';\n\nimport x from 'y';\n"),
            ("'use client';\n\n", "import x from 'y';\n")
        );
        assert_eq!(split_directives("const a = 1;"), ("", "const a = 1;"));
    }
}
