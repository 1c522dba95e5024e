//! Directive MCP Server
//!
//! Serves the repository's `directive/` knowledge base to agents over stdio, one
//! `Content-Length` framed JSON-RPC request at a time.
//!
//! ## Tools
//!
//! - `directive/files.list` - List every file under `directive/`
//! - `directive/file.get` - Read one file verbatim
//! - `directive/spec.template`, `directive/impact.template`, `directive/tdr.template` -
//!   Operating procedure + context + template bundle with a short primer
//!
//! The same operations stay reachable through the older flat methods
//! (`directive.files.list`, `directive.file.get`, `spec.template`, ...).
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "directive": {
//!       "command": "directive-mcp",
//!       "env": { "DIRECTIVE_REPO_ROOT": "/path/to/repo" }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;

mod dispatch;
pub mod runtime_env;
mod stdio;
#[cfg(test)]
mod test_support;
mod tools;

pub use dispatch::{DispatchError, Dispatcher, Session};
pub use stdio::{serve, serve_stdio};
pub use tools::{tool_descriptors, Operation, Route, Surface, ToolDescriptor};

pub async fn main_entry() -> Result<()> {
    // Configure logging to stderr only (stdout is for frames)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let repo_root = runtime_env::resolve_repo_root()?;
    log::info!("Starting Directive MCP server for {}", repo_root.display());

    serve_stdio(Session::for_repo(&repo_root)).await?;

    log::info!("Directive MCP server stopped");
    Ok(())
}
