//! AST pass over a compiled module.
//!
//! Removes the component library import and rewrites every JSX factory
//! call that constructs a library component:
//!
//! ```text
//! _jsxDEV(MyComponent, { first: "John" })
//! // becomes
//! _jsxDEV(MyComponent$0, { first: "John", suppressHydrationWarning: true })
//! ```
//!
//! The source is edited in place by span, so untouched code keeps its
//! exact formatting.

use std::collections::HashMap;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression, ImportDeclaration};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::props::{read_call_props, CallProps};
use crate::traits::TransformError;

/// One captured component construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentCall {
    /// Generated placeholder bound to the rendered declaration.
    pub identifier: String,

    /// Library export name.
    pub component_name: String,

    pub tag_name: String,
    pub props: CallProps,
}

/// Rewritten source plus the calls found in it.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub code: String,
    pub calls: Vec<ComponentCall>,
}

/// Local binding of a library component.
#[derive(Debug, Clone)]
pub struct ComponentBinding {
    pub component_name: String,
    pub tag_name: String,
}

/// A text replacement at a byte range of the original source.
#[derive(Debug)]
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

struct CallCollector<'r> {
    from: &'r str,
    factories: &'r [String],
    /// Library components by local name.
    bindings: &'r HashMap<String, ComponentBinding>,
    counter: usize,
    calls: Vec<ComponentCall>,
    edits: Vec<Edit>,
}

impl CallCollector<'_> {
    fn capture(&mut self, call: &CallExpression<'_>) {
        let Expression::Identifier(callee) = &call.callee else {
            return;
        };
        if !self.factories.iter().any(|f| f == callee.name.as_str()) {
            return;
        }

        let (Some(Argument::Identifier(component)), Some(Argument::ObjectExpression(props))) =
            (call.arguments.first(), call.arguments.get(1))
        else {
            return;
        };
        let Some(binding) = self.bindings.get(component.name.as_str()) else {
            return;
        };

        let identifier = format!("{}${}", binding.component_name, self.counter);
        self.counter += 1;

        self.edits.push(Edit {
            start: component.span.start,
            end: component.span.end,
            text: identifier.clone(),
        });

        match props.properties.last() {
            Some(last) => {
                let end = last.span().end;
                self.edits.push(Edit {
                    start: end,
                    end,
                    text: ", suppressHydrationWarning: true".to_string(),
                });
            }
            None => {
                let at = props.span.start + 1;
                self.edits.push(Edit {
                    start: at,
                    end: at,
                    text: " suppressHydrationWarning: true ".to_string(),
                });
            }
        }

        tracing::debug!("Captured <{}> as {}", binding.tag_name, identifier);

        self.calls.push(ComponentCall {
            identifier,
            component_name: binding.component_name.clone(),
            tag_name: binding.tag_name.clone(),
            props: read_call_props(props),
        });
    }
}

impl<'a> Visit<'a> for CallCollector<'_> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if decl.source.value.as_str() == self.from {
            self.edits.push(Edit {
                start: decl.span.start,
                end: decl.span.end,
                text: String::new(),
            });
        }
        walk::walk_import_declaration(self, decl);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        // Outer calls are numbered before the calls nested in their props.
        self.capture(call);
        walk::walk_call_expression(self, call);
    }
}

/// Parse `source` and rewrite component calls.
///
/// `bindings` maps local names imported from `from` to library components;
/// `factories` lists the local names of the JSX factories.
pub fn rewrite_source(
    source: &str,
    path: &str,
    from: &str,
    factories: &[String],
    bindings: &HashMap<String, ComponentBinding>,
) -> Result<RewriteResult, TransformError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type_for(path)).parse();

    if ret.panicked || !ret.errors.is_empty() {
        return Err(TransformError::Parse {
            path: path.to_string(),
            message: ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        });
    }

    let mut collector = CallCollector {
        from,
        factories,
        bindings,
        counter: 0,
        calls: Vec::new(),
        edits: Vec::new(),
    };
    collector.visit_program(&ret.program);

    Ok(RewriteResult {
        code: apply_edits(source, collector.edits),
        calls: collector.calls,
    })
}

/// Pick the source type from the file extension; plain scripts allow JSX.
fn source_type_for(path: &str) -> SourceType {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
    if source_type.is_typescript() {
        source_type
    } else {
        source_type.with_module(true).with_jsx(true)
    }
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut code = source.to_string();
    for edit in edits {
        code.replace_range(edit.start as usize..edit.end as usize, &edit.text);
    }
    code
}
