//! Hydrate module bridge running under `node`.
//!
//! Each render spawns `node`, which imports the hydrate module, reads
//! `{ html, options }` as JSON from stdin and writes `{ html, styles }` as
//! JSON to stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use wcssr_transform::{HydrateModule, RenderError, RenderOutput, RenderToStringOptions};

use crate::loader::LoaderError;

const BRIDGE_SCRIPT: &str = r#"
import { pathToFileURL } from "node:url";
const chunks = [];
for await (const chunk of process.stdin) chunks.push(chunk);
const { html, options } = JSON.parse(Buffer.concat(chunks).toString("utf8"));
const hydrate = await import(pathToFileURL(process.argv[1]).href);
const result = await hydrate.renderToString(html, options);
const styles = (result.styles ?? []).map((s) => ({
  href: s.href ?? null,
  id: s.id ?? null,
  content: s.content ?? "",
}));
process.stdout.write(JSON.stringify({ html: result.html ?? null, styles }));
"#;

#[derive(Serialize)]
struct BridgeRequest<'a> {
    html: &'a str,
    options: &'a RenderToStringOptions,
}

/// A hydrate module evaluated by a `node` subprocess.
#[derive(Debug, Clone)]
pub struct NodeHydrateModule {
    node: PathBuf,
    module: PathBuf,
}

impl NodeHydrateModule {
    /// Use the hydrate module at `module`, run with the `node` executable.
    pub fn new(module: impl Into<PathBuf>, node: impl Into<PathBuf>) -> Result<Self, LoaderError> {
        let module = module.into();
        if !module.exists() {
            return Err(LoaderError::MissingHydrateModule(module));
        }
        let module = module.canonicalize().map_err(|source| LoaderError::Io {
            path: module.clone(),
            source,
        })?;
        Ok(Self {
            node: node.into(),
            module,
        })
    }

    pub fn module(&self) -> &Path {
        &self.module
    }
}

#[async_trait]
impl HydrateModule for NodeHydrateModule {
    async fn render_to_string(
        &self,
        html: &str,
        options: &RenderToStringOptions,
    ) -> Result<RenderOutput, RenderError> {
        let request = serde_json::to_vec(&BridgeRequest { html, options })
            .map_err(|e| RenderError::Protocol(e.to_string()))?;

        let mut child = Command::new(&self.node)
            .arg("--input-type=module")
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .arg(&self.module)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RenderError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| RenderError::Protocol(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn requires_an_existing_module() {
        let result = NodeHydrateModule::new("/does/not/exist/hydrate.mjs", "node");

        assert!(matches!(result, Err(LoaderError::MissingHydrateModule(_))));
    }

    #[test]
    fn resolves_the_module_path() {
        let temp = tempdir().unwrap();
        let module = temp.path().join("hydrate.mjs");
        std::fs::write(&module, "export const renderToString = () => ({});").unwrap();

        let hydrate = NodeHydrateModule::new(&module, "node").unwrap();

        assert!(hydrate.module().is_absolute());
        assert!(hydrate.module().ends_with("hydrate.mjs"));
    }

    #[test]
    fn encodes_the_bridge_request() {
        let options = RenderToStringOptions::fragment(Default::default());
        let request = serde_json::to_string(&BridgeRequest {
            html: "<x-a></x-a>",
            options: &options,
        })
        .unwrap();

        assert_eq!(
            request,
            r#"{"html":"<x-a></x-a>","options":{"prettyHtml":true,"fullDocument":false,"serializeShadowRoot":"declarative-shadow-dom"}}"#
        );
    }
}
