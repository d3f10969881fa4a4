//! Bundler-facing transform hook.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use wcssr_transform::{SsrTransformer, TransformError};

/// Extensions handled by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx"];

/// What to do when a file fails to transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Propagate the error and fail the build.
    #[default]
    Strict,
    /// Log the error and keep the original source.
    Tolerant,
}

/// Errors surfaced by the loader.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Failed to transform {id}: {source}")]
    Transform {
        id: String,
        #[source]
        source: TransformError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hydrate module not found: {0}")]
    MissingHydrateModule(PathBuf),
}

/// `(code, id) -> Option<code>` hook around the transformer.
pub struct Loader {
    transformer: SsrTransformer,
    policy: ErrorPolicy,
    extensions: Vec<String>,
}

impl Loader {
    pub fn new(transformer: SsrTransformer, policy: ErrorPolicy) -> Self {
        Self {
            transformer,
            policy,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the handled extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn transformer(&self) -> &SsrTransformer {
        &self.transformer
    }

    /// Whether the module id has a handled extension. Query strings are
    /// ignored.
    pub fn handles(&self, id: &str) -> bool {
        let path = id.split(['?', '#']).next().unwrap_or(id);
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Transform a module.
    ///
    /// `Ok(None)` means the original source should be used: the file is not
    /// handled, does not use the library, or failed in tolerant mode.
    pub async fn load(&self, code: &str, id: &str) -> Result<Option<String>, LoaderError> {
        if !self.handles(id) {
            return Ok(None);
        }

        match self.transformer.transform(code, id).await {
            Ok(output) => Ok(output.map(|o| o.code)),
            Err(source) => match self.policy {
                ErrorPolicy::Strict => Err(LoaderError::Transform {
                    id: id.to_string(),
                    source,
                }),
                ErrorPolicy::Tolerant => {
                    tracing::error!("Failed to transform {}: {}", id, source);
                    Ok(None)
                }
            },
        }
    }

    /// Read and transform a file.
    pub async fn load_file(&self, path: &Path) -> Result<Option<String>, LoaderError> {
        if !self.handles(&path.to_string_lossy()) {
            return Ok(None);
        }
        let code = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.load(&code, &path.to_string_lossy()).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use wcssr_transform::{
        ComponentRegistry, HydrateModule, RenderError, RenderOutput, RenderToStringOptions,
        TransformOptions,
    };

    /// Renders every component as an empty shadow root; `broken-component`
    /// fails.
    pub(crate) struct StubHydrate;

    #[async_trait]
    impl HydrateModule for StubHydrate {
        async fn render_to_string(
            &self,
            html: &str,
            _options: &RenderToStringOptions,
        ) -> Result<RenderOutput, RenderError> {
            let tag = html
                .trim_start_matches('<')
                .split(|c: char| c == ' ' || c == '>')
                .next()
                .unwrap_or_default();
            if tag == "broken-component" {
                return Err(RenderError::Failed("boom".to_string()));
            }
            Ok(RenderOutput {
                html: Some(format!(
                    "<{tag} class=\"hydrated\">\n  <template shadowrootmode=\"open\">\n    <p>ok</p>\n  </template>\n</{tag}>"
                )),
                styles: Vec::new(),
            })
        }
    }

    pub(crate) fn loader(policy: ErrorPolicy) -> Loader {
        let options = TransformOptions::new("lib").with_registry(ComponentRegistry::from_names([
            "MyComponent",
            "BrokenComponent",
        ]));
        let transformer = SsrTransformer::new(options, Arc::new(StubHydrate)).unwrap();
        Loader::new(transformer, policy)
    }

    pub(crate) const PAGE: &str = "import { jsx as _jsx } from \"react/jsx-runtime\";\nimport { MyComponent } from \"lib\";\nexport const A = () => _jsx(MyComponent, {});\n";

    const BROKEN: &str = "import { jsx as _jsx } from \"react/jsx-runtime\";\nimport { BrokenComponent } from \"lib\";\nexport const A = () => _jsx(BrokenComponent, {});\n";

    #[tokio::test]
    async fn transforms_handled_files() {
        let code = loader(ErrorPolicy::Strict)
            .load(PAGE, "/src/page.jsx?v=1")
            .await
            .unwrap()
            .unwrap();

        assert!(code.contains("const MyComponent$0 = "));
        assert!(code.contains("<p>ok</p>"));
    }

    #[tokio::test]
    async fn skips_unhandled_extensions_and_gate_misses() {
        let loader = loader(ErrorPolicy::Strict);

        assert!(loader.load(PAGE, "/src/styles.css").await.unwrap().is_none());
        assert!(loader.load("export {};", "/src/a.js").await.unwrap().is_none());
        assert!(!loader.with_extensions([".tsx"]).handles("/src/a.js"));
    }

    #[tokio::test]
    async fn strict_mode_propagates_errors() {
        let result = loader(ErrorPolicy::Strict).load(BROKEN, "a.js").await;

        assert!(matches!(
            result,
            Err(LoaderError::Transform {
                source: TransformError::Render { .. },
                ..
            })
        ));
    }

    #[test]
    fn tolerant_mode_keeps_the_original_source() {
        let result = tokio_test::block_on(loader(ErrorPolicy::Tolerant).load(BROKEN, "a.js"));

        assert!(result.unwrap().is_none());
    }
}
