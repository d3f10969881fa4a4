//! Tag naming: component name casing and the tag rename table.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Deserialize;

/// Explicit custom-element rename table.
///
/// Maps an original tag name (`my-component`) to the name the elements are
/// registered under at runtime (`v2-my-component`). Tags without an entry
/// keep their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TagTransformer {
    renames: HashMap<String, String>,
}

impl TagTransformer {
    /// Create an empty rename table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename.
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// The tag name to emit for `tag_name`.
    pub fn transform<'t>(&self, tag_name: &'t str) -> Cow<'t, str> {
        match self.renames.get(tag_name) {
            Some(renamed) => Cow::Owned(renamed.clone()),
            None => Cow::Borrowed(tag_name),
        }
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

impl FromIterator<(String, String)> for TagTransformer {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            renames: iter.into_iter().collect(),
        }
    }
}

/// Convert PascalCase to kebab-case: `MyComponent` -> `my-component`.
pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert kebab-case to PascalCase: `my-component` -> `MyComponent`.
pub fn to_pascal_case(s: &str) -> String {
    s.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
