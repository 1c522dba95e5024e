use ignore::WalkBuilder;
use std::path::Path;

use crate::root::DirectiveRoot;

fn normalize_relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_str()?.replace('\\', "/"))
}

/// Lists every regular file under the directive root as `directive/<relative path>`.
///
/// The result is sorted lexicographically. A missing root yields an empty list. Hidden files are
/// included, ignore files are not consulted and symlinks are not followed.
pub fn list_files(root: &DirectiveRoot) -> Vec<String> {
    if !root.exists() {
        log::debug!("Directive root {} does not exist", root.path().display());
        return Vec::new();
    }

    let mut builder = WalkBuilder::new(root.path());
    builder.standard_filters(false).follow_links(false);

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                let Some(file_type) = entry.file_type() else {
                    continue;
                };
                if !file_type.is_file() {
                    continue;
                }
                if entry.path().strip_prefix(root.path()).is_err() {
                    log::debug!("Skipping entry outside root: {}", entry.path().display());
                    continue;
                }
                match normalize_relative_path(root.path(), entry.path()) {
                    Some(rel) if !rel.is_empty() => files.push(root.display_path(&rel)),
                    _ => log::warn!("Skipping non UTF-8 file name: {}", entry.path().display()),
                }
            }
            Err(e) => log::warn!("Failed to read entry: {e}"),
        }
    }

    files.sort();
    log::debug!("Catalogued {} directive files", files.len());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn populate(repo: &Path) {
        let root = repo.join("directive");
        fs::create_dir_all(root.join("reference/templates")).unwrap();
        fs::create_dir_all(root.join("empty_dir")).unwrap();
        fs::write(root.join("reference/agent_context.md"), "CTX").unwrap();
        fs::write(root.join("reference/agent_operating_procedure.md"), "AOP.").unwrap();
        fs::write(root.join("reference/templates/spec_template.md"), "SPEC").unwrap();
        fs::write(root.join(".notes"), "hidden").unwrap();
        fs::write(root.join("README.md"), "readme").unwrap();
    }

    #[test]
    fn lists_regular_files_sorted_with_root_prefix() {
        let temp = tempdir().unwrap();
        populate(temp.path());

        let files = list_files(&DirectiveRoot::expected(temp.path()));
        assert_eq!(
            files,
            vec![
                "directive/.notes",
                "directive/README.md",
                "directive/reference/agent_context.md",
                "directive/reference/agent_operating_procedure.md",
                "directive/reference/templates/spec_template.md",
            ]
        );
    }

    #[test]
    fn repeated_listing_is_stable() {
        let temp = tempdir().unwrap();
        populate(temp.path());
        let root = DirectiveRoot::expected(temp.path());

        assert_eq!(list_files(&root), list_files(&root));
    }

    #[test]
    fn missing_root_is_empty_not_error() {
        let temp = tempdir().unwrap();
        assert!(list_files(&DirectiveRoot::expected(temp.path())).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_listed() {
        let temp = tempdir().unwrap();
        populate(temp.path());
        fs::write(temp.path().join("secret.txt"), "outside").unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("secret.txt"),
            temp.path().join("directive/link.txt"),
        )
        .unwrap();

        let files = list_files(&DirectiveRoot::expected(temp.path()));
        assert!(!files.iter().any(|f| f.ends_with("link.txt")), "{files:?}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempdir().unwrap();
        populate(temp.path());
        let name = OsStr::from_bytes(b"bad-\xff.md");
        fs::write(temp.path().join("directive").join(name), "bytes").unwrap();

        let root = DirectiveRoot::expected(temp.path());
        let files = list_files(&root);
        assert_eq!(files.len(), 5, "{files:?}");
        assert!(!files.iter().any(|f| f.contains('\u{FFFD}')));
        for file in &files {
            assert!(crate::read_file(&root, file).is_ok(), "{file}");
        }
    }
}
