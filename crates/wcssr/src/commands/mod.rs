//! CLI commands.

pub mod build;
pub mod init;
pub mod transform;
pub mod watch;
