//! Component registry for recognizing library components.
//!
//! The set of recognized component names comes from the library's compiled
//! metadata, from the named exports of its ESM entry, or from an explicit
//! list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Declaration, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::Deserialize;

use crate::tags::to_kebab_case;

/// Compiler metadata for one component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCompilerMeta {
    pub tag_name: String,

    #[serde(default)]
    pub component_class_name: String,

    #[serde(default)]
    pub properties: Vec<ComponentMember>,

    #[serde(default)]
    pub events: Vec<ComponentMember>,

    #[serde(default)]
    pub methods: Vec<ComponentMember>,

    #[serde(default)]
    pub internal: bool,
}

/// A property, event or method of a component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMember {
    pub name: String,

    #[serde(default)]
    pub attribute: Option<String>,

    #[serde(default)]
    pub complex_type: Option<ComplexType>,

    #[serde(default)]
    pub docs: serde_json::Value,
}

/// Type information of a member as written and as resolved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplexType {
    #[serde(default)]
    pub original: String,

    #[serde(default)]
    pub resolved: String,

    #[serde(default)]
    pub references: serde_json::Value,
}

/// Accepted shapes of a metadata file.
#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataFile {
    List(Vec<ComponentCompilerMeta>),
    Docs { components: Vec<ComponentCompilerMeta> },
}

/// A registered component.
#[derive(Debug, Clone)]
pub struct RegisteredComponent {
    /// Export name (e.g. "MyComponent")
    pub name: String,

    /// Custom element tag name (e.g. "my-component")
    pub tag_name: String,

    /// Compiler metadata, when loaded from metadata
    pub meta: Option<ComponentCompilerMeta>,
}

/// A registry of known component exports.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    /// Components by export name
    components: HashMap<String, RegisteredComponent>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from explicit export names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            let name = name.into();
            let tag_name = to_kebab_case(&name);
            registry.insert(RegisteredComponent {
                name,
                tag_name,
                meta: None,
            });
        }
        registry
    }

    /// Build a registry from compiler metadata. Internal components are skipped.
    pub fn from_metadata(components: Vec<ComponentCompilerMeta>) -> Self {
        let mut registry = Self::new();
        for meta in components.into_iter().filter(|m| !m.internal) {
            let name = if meta.component_class_name.is_empty() {
                crate::tags::to_pascal_case(&meta.tag_name)
            } else {
                meta.component_class_name.clone()
            };
            registry.insert(RegisteredComponent {
                name,
                tag_name: meta.tag_name.clone(),
                meta: Some(meta),
            });
        }
        registry
    }

    /// Load compiler metadata from a JSON file.
    ///
    /// Accepts either an array of components or a docs file with a
    /// `components` array.
    pub fn load_metadata(path: &Path) -> Result<Self, RegistryError> {
        let content = read(path)?;
        let file: MetadataFile =
            serde_json::from_str(&content).map_err(|e| RegistryError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let components = match file {
            MetadataFile::List(components) | MetadataFile::Docs { components } => components,
        };
        Ok(Self::from_metadata(components))
    }

    /// Collect PascalCase named exports from the library's ESM entry.
    pub fn from_module_source(source: &str, path: &str) -> Result<Self, RegistryError> {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
        let ret = Parser::new(&allocator, source, source_type).parse();

        if ret.panicked || !ret.errors.is_empty() {
            return Err(RegistryError::ParseError {
                path: path.to_string(),
                message: ret
                    .errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }

        let mut names = Vec::new();
        for stmt in &ret.program.body {
            match stmt {
                Statement::ExportNamedDeclaration(decl) => {
                    if let Some(declaration) = &decl.declaration {
                        collect_declared_names(declaration, &mut names);
                    }
                    for specifier in &decl.specifiers {
                        names.push(specifier.exported.name().to_string());
                    }
                }
                Statement::ExportAllDeclaration(decl) => {
                    tracing::debug!(
                        "Skipping `export *` from {} in {}",
                        decl.source.value,
                        path
                    );
                }
                _ => {}
            }
        }

        Ok(Self::from_names(
            names.into_iter().filter(|n| is_component_name(n)),
        ))
    }

    /// Read and scan the library's ESM entry file.
    pub fn load_module(path: &Path) -> Result<Self, RegistryError> {
        let content = read(path)?;
        Self::from_module_source(&content, &path.display().to_string())
    }

    /// Register a component.
    pub fn insert(&mut self, component: RegisteredComponent) {
        self.components.insert(component.name.clone(), component);
    }

    /// Look up a component by export name.
    pub fn get(&self, name: &str) -> Option<&RegisteredComponent> {
        self.components.get(name)
    }

    /// Check if a component exists.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Tag name for a component export, falling back to its kebab-case name.
    pub fn tag_name(&self, name: &str) -> String {
        self.get(name)
            .map(|c| c.tag_name.clone())
            .unwrap_or_else(|| to_kebab_case(name))
    }

    /// Get all registered component names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn collect_declared_names(declaration: &Declaration<'_>, names: &mut Vec<String>) {
    match declaration {
        Declaration::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                if let Some(name) = declarator.id.get_identifier_name() {
                    names.push(name.to_string());
                }
            }
        }
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                names.push(id.name.to_string());
            }
        }
        _ => {}
    }
}

fn is_component_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

fn read(path: &Path) -> Result<String, RegistryError> {
    if !path.exists() {
        return Err(RegistryError::FileNotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Component source not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_metadata_and_skips_internal_components() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("components.json");
        fs::write(
            &path,
            r#"{
  "components": [
    {
      "tagName": "my-component",
      "componentClassName": "MyComponent",
      "properties": [
        {
          "name": "first",
          "attribute": "first",
          "complexType": { "original": "string", "resolved": "string", "references": {} },
          "docs": { "text": "The first name", "tags": [] }
        }
      ],
      "events": [],
      "methods": [],
      "internal": false
    },
    { "tagName": "my-internal", "componentClassName": "MyInternal", "internal": true }
  ]
}"#,
        )
        .unwrap();

        let registry = ComponentRegistry::load_metadata(&path).unwrap();

        assert_eq!(registry.names(), vec!["MyComponent"]);
        assert_eq!(registry.tag_name("MyComponent"), "my-component");
        let meta = registry.get("MyComponent").unwrap().meta.as_ref().unwrap();
        assert_eq!(meta.properties[0].attribute.as_deref(), Some("first"));
    }

    #[test]
    fn reads_named_exports_from_module_entry() {
        let source = r#"
import { createComponent } from './runtime';
export const MyComponent = createComponent('my-component');
export function MyButton() {}
export class MyCard {}
const Internal = 1;
export { Internal as MyRenamed, helper };
export const defineCustomElements = () => {};
export * from './other';
"#;

        let registry = ComponentRegistry::from_module_source(source, "index.js").unwrap();

        assert_eq!(
            registry.names(),
            vec!["MyButton", "MyCard", "MyComponent", "MyRenamed"]
        );
    }

    #[test]
    fn falls_back_to_kebab_case_tag_names() {
        let registry = ComponentRegistry::from_names(["MyComponent"]);

        assert!(registry.contains("MyComponent"));
        assert!(!registry.contains("Other"));
        assert_eq!(registry.tag_name("OtherThing"), "other-thing");
    }

    #[test]
    fn reports_missing_files() {
        let result = ComponentRegistry::load_metadata(Path::new("/does/not/exist.json"));

        assert!(matches!(result, Err(RegistryError::FileNotFound(_))));
    }
}
