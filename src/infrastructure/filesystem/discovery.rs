use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find the repository roots directly nested under `root`.
///
/// A directory holding `marker` is reported and not descended into, and the
/// marker directories themselves are never walked. Results are in file name
/// order. Unreadable directories are logged and skipped.
pub fn discover_child_paths(root: &Path, marker: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir() && entry.file_name() != marker);

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(root = %root.display(), "skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.path().join(marker).exists() {
            tracing::debug!(path = %entry.path().display(), "found nested working copy");
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    found
}
