use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::engine::discover::{SOURCE_EXTENSION, walk_files};
use crate::models::pairing::PairingSet;

/// Test-file suffixes, in priority order. The first that matches is stripped.
const TEST_SUFFIXES: [&str; 4] = ["Test.java", "Tests.java", "TestCase.java", "IT.java"];

/// Derive the production file name a test file is expected to cover.
///
/// `FooTest.java`, `FooTests.java`, `FooTestCase.java` and `FooIT.java`
/// all map to `Foo.java`. Anything else has its first `Test` replaced by
/// `.java`, which yields odd names such as `My.javaThing.java` for
/// `MyTestThing.java`; names without `Test` come back unchanged.
pub fn candidate_name(test_name: &str) -> String {
    for suffix in TEST_SUFFIXES {
        if let Some(stem) = test_name.strip_suffix(suffix) {
            return format!("{stem}{SOURCE_EXTENSION}");
        }
    }
    test_name.replacen("Test", SOURCE_EXTENSION, 1)
}

/// Depth-first search under `root` for a file named `name`, ignoring case.
/// The first hit in traversal order wins.
pub fn find_by_name(name: &str, root: &Path) -> Result<Option<PathBuf>> {
    let wanted = name.to_lowercase();
    for path in walk_files(root) {
        let path = path?;
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase() == wanted)
        {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Resolve the production counterpart of one test file.
pub fn resolve(test_file: &Path, production_root: &Path) -> Result<Option<PathBuf>> {
    let Some(test_name) = test_file.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let candidate = candidate_name(test_name);
    let found = find_by_name(&candidate, production_root)?;
    debug!(
        test = test_name,
        candidate = candidate.as_str(),
        matched = found.is_some(),
        "resolved pairing"
    );
    Ok(found)
}

/// Pair every test file with its production counterpart (or none).
pub fn resolve_all(test_files: &[PathBuf], production_root: &Path) -> Result<PairingSet> {
    let mut set = PairingSet::new();
    for test in test_files {
        let production = resolve(test, production_root)?;
        set.insert(test.clone(), production);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_candidate_recognized_suffixes() {
        assert_eq!(candidate_name("FooTest.java"), "Foo.java");
        assert_eq!(candidate_name("FooTests.java"), "Foo.java");
        assert_eq!(candidate_name("FooTestCase.java"), "Foo.java");
        assert_eq!(candidate_name("FooIT.java"), "Foo.java");
    }

    #[test]
    fn test_candidate_only_first_suffix_applies() {
        assert_eq!(candidate_name("FooTestTest.java"), "FooTest.java");
        // "IT.java" must not also be applied after "Test.java"
        assert_eq!(candidate_name("ITTest.java"), "IT.java");
    }

    #[test]
    fn test_candidate_fallback_replaces_first_test() {
        assert_eq!(candidate_name("MyTestThing.java"), "My.javaThing.java");
        assert_eq!(candidate_name("TestFoo.java"), ".javaFoo.java");
        assert_eq!(candidate_name("ATestBTest2.java"), "A.javaBTest2.java");
    }

    #[test]
    fn test_candidate_without_test_is_unchanged() {
        assert_eq!(candidate_name("Fixtures.java"), "Fixtures.java");
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(&dir.path().join("com/acme/calculator.JAVA"));

        let found = find_by_name("Calculator.java", dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join("com/acme/calculator.JAVA")));
    }

    #[test]
    fn test_find_by_name_first_match_in_traversal_order() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(&dir.path().join("b/Foo.java"));
        touch(&dir.path().join("a/Foo.java"));

        let found = find_by_name("Foo.java", dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join("a/Foo.java")));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_by_name_follows_symlinked_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let shared = dir.path().join("shared/Foo.java");
        touch(&shared);
        let main = dir.path().join("main");
        fs::create_dir_all(&main).unwrap();
        std::os::unix::fs::symlink(&shared, main.join("Foo.java")).unwrap();

        let found = find_by_name("foo.java", &main).unwrap();
        assert_eq!(found, Some(main.join("Foo.java")));
    }

    #[test]
    fn test_resolve_missing_production_root_is_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        let test = dir.path().join("FooTest.java");
        touch(&test);

        let found = resolve(&test, &dir.path().join("missing")).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_resolve_all_keeps_unmatched_entries() {
        let dir = tempfile::TempDir::new().unwrap();
        let tests = dir.path().join("test");
        let main = dir.path().join("main");
        touch(&tests.join("FooTest.java"));
        touch(&tests.join("BarTest.java"));
        touch(&main.join("pkg/Foo.java"));

        let files = vec![tests.join("FooTest.java"), tests.join("BarTest.java")];
        let set = resolve_all(&files, &main).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.matched(), 1);
        assert_eq!(
            set.get(&tests.join("FooTest.java")),
            Some(Some(main.join("pkg/Foo.java").as_path()))
        );
        assert_eq!(set.get(&tests.join("BarTest.java")), Some(None));
    }
}
