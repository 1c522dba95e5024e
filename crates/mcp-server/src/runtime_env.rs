use std::env;
use std::path::PathBuf;

/// Environment variable naming the repository that holds `directive/`.
pub const REPO_ROOT_ENV: &str = "DIRECTIVE_REPO_ROOT";
/// Shorter alias of [`REPO_ROOT_ENV`], consulted second.
pub const ROOT_ALIAS_ENV: &str = "DIRECTIVE_ROOT";

/// Explicit repository root from the environment; blank values count as unset.
pub fn env_root_override() -> Option<PathBuf> {
    for key in [REPO_ROOT_ENV, ROOT_ALIAS_ENV] {
        if let Ok(value) = env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
    }
    None
}

/// `DIRECTIVE_REPO_ROOT` or `DIRECTIVE_ROOT`, falling back to the current working directory.
pub fn resolve_repo_root() -> std::io::Result<PathBuf> {
    match env_root_override() {
        Some(root) => Ok(root),
        None => env::current_dir(),
    }
}
