//! Integration surface for the wcssr transform.
//!
//! Wraps the transformer in a loader hook with an error policy, runs the
//! hydrate module under `node`, and provides directory builds and file
//! watching for the CLI.

pub mod build;
pub mod loader;
pub mod node;
pub mod watcher;

pub use build::{build_directory, build_file, remove_output, BuildSummary};
pub use loader::{ErrorPolicy, Loader, LoaderError, DEFAULT_EXTENSIONS};
pub use node::NodeHydrateModule;
pub use watcher::{FileWatcher, WatchEvent};
