//! Create a starter config.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Point [library] and [hydrate] at your component library, then run 'wcssr build'.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# wcssr configuration

[library]
# Import specifier of the React wrapper package
from = "component-library-react"

# Component metadata (components.json) listing the wrapped components.
# Alternatively set `exports = ["MyComponent"]` or `module = "path/to/index.js"`.
components = "node_modules/component-library/components.json"

[hydrate]
# Hydrate module exposing renderToString
module = "node_modules/component-library/hydrate/index.mjs"
node = "node"

[ssr]
# "react" or "nextjs"
strategy = "react"

# "declarative-shadow-dom", "scoped", true, false, or a per-tag table:
# serialize_shadow_root = { scoped = ["my-button"], default = "declarative-shadow-dom" }
serialize_shadow_root = "declarative-shadow-dom"

# "strict" fails the build on errors, "tolerant" keeps the original module
mode = "strict"

extensions = ["js", "jsx", "mjs", "ts", "tsx"]

[tags]
# "my-component" = "v2-my-component"
"#;
