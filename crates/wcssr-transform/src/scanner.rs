//! Static import scanning.
//!
//! A cheap text pass decides whether a file needs the full parse: it must
//! import the component library and a JSX factory. Most files do neither.

use regex::Regex;
use std::sync::LazyLock;

/// Modules exporting the automatic-runtime JSX factories.
const JSX_RUNTIMES: &[&str] = &["react/jsx-dev-runtime", "react/jsx-runtime"];

/// Factory exports that construct elements.
const JSX_FACTORIES: &[&str] = &["jsxDEV", "jsx", "jsxs"];

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(type\s+)?([^;"'()]*?)\s*from\s*["']([^"']+)["']"#)
        .expect("Invalid import regex")
});

/// A name bound by an import clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// Exported name; `default` for default imports, `*` for namespaces.
    pub imported: String,
    pub local: String,
}

/// A static `import ... from "..."` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticImport {
    pub specifier: String,
    pub names: Vec<ImportedName>,
}

/// Result of scanning a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScan {
    /// Imports of the component library.
    pub library: Vec<StaticImport>,

    /// Local names of the JSX factories.
    pub jsx_factories: Vec<String>,
}

impl ImportScan {
    /// Whether the file needs the transform.
    pub fn is_relevant(&self) -> bool {
        !self.library.is_empty() && !self.jsx_factories.is_empty()
    }
}

/// Scan `source` for imports of `from` and of a JSX factory.
pub fn scan_imports(source: &str, from: &str) -> ImportScan {
    let mut scan = ImportScan::default();

    for caps in IMPORT_RE.captures_iter(source) {
        // Type-only imports are erased before runtime.
        if caps.get(1).is_some() {
            continue;
        }
        let clause = caps.get(2).map_or("", |m| m.as_str());
        let specifier = caps.get(3).map_or("", |m| m.as_str());

        if specifier == from {
            scan.library.push(StaticImport {
                specifier: specifier.to_string(),
                names: parse_clause(clause),
            });
        } else if JSX_RUNTIMES.contains(&specifier) {
            scan.jsx_factories.extend(
                parse_clause(clause)
                    .into_iter()
                    .filter(|name| JSX_FACTORIES.contains(&name.imported.as_str()))
                    .map(|name| name.local),
            );
        }
    }

    scan
}

/// Parse an import clause: `Default, { a, b as c, type d }` or `* as ns`.
fn parse_clause(clause: &str) -> Vec<ImportedName> {
    let mut names = Vec::new();

    let (outside, named) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{}{}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(local) = part.strip_prefix('*') {
            let local = local.trim().trim_start_matches("as").trim();
            names.push(ImportedName {
                imported: "*".to_string(),
                local: local.to_string(),
            });
        } else {
            names.push(ImportedName {
                imported: "default".to_string(),
                local: part.to_string(),
            });
        }
    }

    for part in named
        .into_iter()
        .flat_map(|n| n.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if part.starts_with("type ") {
            continue;
        }
        let mut words = part.split_whitespace();
        let Some(imported) = words.next() else {
            continue;
        };
        let local = match (words.next(), words.next()) {
            (Some("as"), Some(local)) => local,
            _ => imported,
        };
        names.push(ImportedName {
            imported: imported.trim_matches(|c| c == '"' || c == '\'').to_string(),
            local: local.to_string(),
        });
    }

    names
}
