//! # Directive Knowledge
//!
//! Read-only access to the `directive/` knowledge base inside a repository.
//!
//! ## Layout
//!
//! ```text
//! <repo>/directive/
//!     └── reference/
//!           ├── agent_operating_procedure.md
//!           ├── agent_context.md
//!           └── templates/
//!                 ├── spec_template.md
//!                 ├── impact_template.md
//!                 └── tdr_template.md
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use directive_knowledge::{build_bundle, DirectiveRoot, TemplateKind};
//!
//! fn main() -> Result<(), directive_knowledge::KnowledgeError> {
//!     let root = DirectiveRoot::resolve("/path/to/repo")?;
//!     let bundle = build_bundle(&root, TemplateKind::Spec.file_name())?;
//!     println!("{}", bundle.primer);
//!     Ok(())
//! }
//! ```

mod bundle;
mod catalog;
mod error;
mod reader;
mod root;
mod template;

pub use bundle::{build_bundle, derive_primer, TemplateBundle};
pub use catalog::list_files;
pub use error::{KnowledgeError, Result};
pub use reader::{read_file, FileContent};
pub use root::{DirectiveRoot, DIRECTIVE_DIR_NAME};
pub use template::TemplateKind;

/// Operating procedure, relative to the directive root.
pub const OPERATING_PROCEDURE_FILE: &str = "reference/agent_operating_procedure.md";
/// Project context, relative to the directive root.
pub const CONTEXT_FILE: &str = "reference/agent_context.md";
/// Template directory, relative to the directive root.
pub const TEMPLATES_DIR: &str = "reference/templates";
