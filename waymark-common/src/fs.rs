//! Small filesystem helpers shared by the pack walkers.

use std::path::{Path, PathBuf};

/// Recursively collect files under `root` whose names end in any of
/// `extensions`, sorted for deterministic processing order.
pub fn files_by_extension(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    collect(root, extensions, &mut out);
    out.sort();
    out
}

fn collect(dir: &Path, extensions: &[&str], out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, extensions, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if extensions.iter().any(|ext| name.ends_with(ext)) {
                out.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("top.poi"), "").unwrap();
        std::fs::write(nested.join("deep.poi"), "").unwrap();
        std::fs::write(nested.join("other.txt"), "").unwrap();

        let found = files_by_extension(dir.path(), &[".poi"]);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "poi"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let found = files_by_extension(Path::new("/nonexistent/waymark"), &[".poi"]);
        assert!(found.is_empty());
    }
}
