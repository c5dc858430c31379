use anyhow::Result;
use ignore::{DirEntry, Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension shared by test and production sources.
pub const SOURCE_EXTENSION: &str = ".java";

/// Depth-first walk over every regular file under `root`.
///
/// All of the `ignore` crate's filters are disabled: hidden files and
/// `.gitignore`d paths are visited like any other. Symlinks to regular
/// files are yielded; linked directories are not entered. Siblings are
/// visited in file-name order. A missing root yields nothing.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf>> {
    let walk: Option<Walk> = root.is_dir().then(|| {
        WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    });

    walk.into_iter().flatten().filter_map(|entry| match entry {
        Ok(entry) if is_regular_file(&entry) => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(e) => Some(Err(e.into())),
    })
}

fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        Some(ft) => ft.is_file(),
        None => false,
    }
}

/// Collect all test sources (files ending in `.java`) under `root`.
pub fn discover_test_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in walk_files(root) {
        let path = path?;
        let is_source = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SOURCE_EXTENSION));
        if is_source {
            files.push(path);
        }
    }
    debug!(root = %root.display(), count = files.len(), "discovered test files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "class X {}").unwrap();
    }

    #[test]
    fn test_discovers_nested_java_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a/b/c/DeepTest.java"));
        touch(&root.join("TopTest.java"));
        touch(&root.join("a/README.md"));
        touch(&root.join("a/Helper.java.bak"));

        let mut files = discover_test_files(root).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![root.join("TopTest.java"), root.join("a/b/c/DeepTest.java")]
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = discover_test_files(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_hidden_and_ignored_files_are_included() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "generated/\n").unwrap();
        touch(&root.join(".hidden/HiddenTest.java"));
        touch(&root.join("generated/GenTest.java"));

        let files = discover_test_files(root).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.contains(&root.join(".hidden/HiddenTest.java")));
        assert!(files.contains(&root.join("generated/GenTest.java")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_included() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::TempDir::new().unwrap();
        let real = dir.path().join("real");
        let root = dir.path().join("tests");
        touch(&real.join("FooTest.java"));
        touch(&real.join("nested/BarTest.java"));
        fs::create_dir_all(&root).unwrap();
        symlink(real.join("FooTest.java"), root.join("FooTest.java")).unwrap();
        // Linked directories are not entered
        symlink(real.join("nested"), root.join("nested")).unwrap();

        let files = discover_test_files(&root).unwrap();
        assert_eq!(files, vec![root.join("FooTest.java")]);
    }

    #[test]
    fn test_extension_is_only_filter() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        // No "Test" in the name, still a test source
        touch(&root.join("Fixtures.java"));

        let files = discover_test_files(root).unwrap();
        assert_eq!(files, vec![root.join("Fixtures.java")]);
    }
}
