//! Locations for files written by tests.

use std::path::{Path, PathBuf};

/// `<workspace>/test_output`, shared by the tests of every crate.
pub fn test_output_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .join("test_output")
}

/// Path for a test output file, with its parent directories created.
///
/// `name` may contain subdirectories, e.g. `"iris/render.png"`.
///
/// # Panics
/// Panics if a directory cannot be created.
pub fn test_output_path(name: impl AsRef<Path>) -> PathBuf {
    let path = test_output_dir().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", parent.display(), e));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_is_at_workspace_root() {
        let dir = test_output_dir();
        assert!(dir.ends_with("test_output"));
        assert!(dir.parent().unwrap().join("common").is_dir());
    }

    #[test]
    fn nested_output_path_creates_parents() {
        let path = test_output_path("common/nested/output.txt");
        assert!(path.starts_with(test_output_dir()));
        assert!(path.parent().unwrap().is_dir());
    }
}
