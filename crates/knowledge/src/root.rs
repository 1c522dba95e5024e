use std::path::{Path, PathBuf};

use crate::error::{KnowledgeError, Result};

/// Well-known name of the knowledge-base directory inside a repository.
pub const DIRECTIVE_DIR_NAME: &str = "directive";

/// Location of the directive knowledge base for one repository.
///
/// Resolved once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveRoot {
    repo_root: PathBuf,
    path: PathBuf,
}

impl DirectiveRoot {
    /// Locates `<repo_root>/directive`, failing with `NotFound` when it is not a directory.
    pub fn resolve(repo_root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::expected(repo_root);
        root.ensure_exists()?;
        Ok(root)
    }

    /// The literal expected location, without checking the filesystem.
    ///
    /// Failures are deferred to the first operation that needs the directory to exist.
    pub fn expected(repo_root: impl AsRef<Path>) -> Self {
        let repo_root = repo_root.as_ref().to_path_buf();
        let path = repo_root.join(DIRECTIVE_DIR_NAME);
        Self { repo_root, path }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leading component of every catalog entry.
    pub fn name(&self) -> &'static str {
        DIRECTIVE_DIR_NAME
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Repository-relative display form of a path given relative to this root.
    pub fn display_path(&self, relative: &str) -> String {
        format!("{}/{}", self.name(), relative.trim_start_matches('/'))
    }

    pub(crate) fn ensure_exists(&self) -> Result<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(KnowledgeError::NotFound {
                what: "directive root",
                path: self.path.display().to_string(),
            })
        }
    }
}
