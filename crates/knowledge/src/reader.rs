use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{KnowledgeError, Result};
use crate::root::DirectiveRoot;

/// A file path (as addressed by the caller) and its exact content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
}

/// Reads `relative_path` (e.g. `directive/reference/agent_context.md`) verbatim.
///
/// The path must start with the directive root name and must stay inside the directive root after
/// symlink resolution; anything else is rejected as `InvalidPath` before a single byte is read.
pub fn read_file(root: &DirectiveRoot, relative_path: &str) -> Result<FileContent> {
    read_contained(root, relative_path, "file")
}

pub(crate) fn read_contained(
    root: &DirectiveRoot,
    relative_path: &str,
    what: &'static str,
) -> Result<FileContent> {
    let inner = lexical_inner_path(root, relative_path)?;
    root.ensure_exists()?;

    let canonical_root = root
        .path()
        .canonicalize()
        .map_err(|e| KnowledgeError::from_io("directive root", &root.path().display().to_string(), e))?;
    let canonical_file = root
        .path()
        .join(&inner)
        .canonicalize()
        .map_err(|e| KnowledgeError::from_io(what, relative_path, e))?;

    if !canonical_file.starts_with(&canonical_root) {
        return Err(KnowledgeError::invalid_path(
            relative_path,
            "resolves outside the directive root",
        ));
    }
    if !canonical_file.is_file() {
        return Err(KnowledgeError::invalid_path(
            relative_path,
            "not a regular file",
        ));
    }

    let content = std::fs::read_to_string(&canonical_file)
        .map_err(|e| KnowledgeError::from_io(what, relative_path, e))?;
    log::debug!("Read {relative_path} ({} bytes)", content.len());

    Ok(FileContent {
        path: relative_path.to_string(),
        content,
    })
}

/// Validates the caller-supplied path without touching the filesystem and returns the part below
/// the directive root.
fn lexical_inner_path(root: &DirectiveRoot, relative_path: &str) -> Result<PathBuf> {
    if relative_path.trim().is_empty() {
        return Err(KnowledgeError::invalid_path(relative_path, "path is empty"));
    }

    let mut components = Vec::new();
    for component in Path::new(relative_path).components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(KnowledgeError::invalid_path(
                    relative_path,
                    "parent directory components are not allowed",
                ))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(KnowledgeError::invalid_path(
                    relative_path,
                    "absolute paths are not allowed",
                ))
            }
        }
    }

    let mut parts = components.into_iter();
    if parts.next().and_then(|first| first.to_str()) != Some(root.name()) {
        return Err(KnowledgeError::invalid_path(
            relative_path,
            format!("path must start with {}/", root.name()),
        ));
    }

    let inner: PathBuf = parts.collect();
    if inner.as_os_str().is_empty() {
        return Err(KnowledgeError::invalid_path(
            relative_path,
            "not a regular file",
        ));
    }
    Ok(inner)
}
