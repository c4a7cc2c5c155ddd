//! Implied folder reconstruction.
//!
//! The walker yields flat file paths; the manifest must also describe every
//! directory those paths imply, so the browser can render folder cards
//! without computing the tree itself. Folder derivation is a pure function
//! over the complete file list, run after all per-file work joins: for each
//! path, strip the last segment repeatedly and collect every non-root
//! remainder. A `BTreeSet` dedupes ancestors shared by many files and keeps
//! folder output deterministically ordered.

use crate::entry::{Entry, EntryKind, entry_id};
use crate::meta::{format_timestamp, modified_or_epoch};
use std::collections::BTreeSet;
use std::path::Path;

/// Collect every distinct ancestor directory of the given file paths.
///
/// The scan root itself (empty remainder) is never included. Closure holds
/// by construction: if `a/b` is an ancestor, so is `a`.
pub fn folder_paths<'a>(file_paths: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    let mut folders = BTreeSet::new();
    for path in file_paths {
        let mut remainder = path;
        while let Some((parent, _)) = remainder.rsplit_once('/') {
            folders.insert(parent.to_string());
            remainder = parent;
        }
    }
    folders
}

/// Synthesize folder entries for the ancestors of the given file entries.
///
/// Each folder uses the same id rule as files, its own directory mtime
/// (epoch when unreadable) and `size_bytes = 0` — the reference scanner
/// never aggregated descendant sizes and neither do we.
pub fn folder_entries(root: &Path, files: &[Entry]) -> Vec<Entry> {
    folder_paths(files.iter().map(|e| e.path.as_str()))
        .into_iter()
        .map(|path| {
            let modified = modified_or_epoch(&root.join(&path));
            let name = path.rsplit('/').next().unwrap_or(&path).to_string();
            Entry {
                id: entry_id(&path),
                name,
                path,
                kind: EntryKind::Folder,
                mime: None,
                size_bytes: 0,
                updated_at: format_timestamp(modified),
                checksum: None,
                thumbnail_path: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_entry_at(path: &str) -> Entry {
        Entry {
            id: entry_id(path),
            name: path.rsplit('/').next().unwrap().to_string(),
            path: path.to_string(),
            kind: EntryKind::Text,
            mime: Some("text/plain".into()),
            size_bytes: 1,
            updated_at: "1970-01-01T00:00:00.000Z".into(),
            checksum: None,
            thumbnail_path: None,
        }
    }

    #[test]
    fn deep_path_yields_full_ancestor_chain() {
        let folders = folder_paths(["a/b/c.txt"]);
        let expected: BTreeSet<String> = ["a", "a/b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(folders, expected);
    }

    #[test]
    fn shared_ancestors_deduplicated() {
        let folders = folder_paths(["Math/notes.txt", "Math/diagram.png", "Math/deep/x.csv"]);
        let expected: BTreeSet<String> =
            ["Math", "Math/deep"].iter().map(|s| s.to_string()).collect();
        assert_eq!(folders, expected);
    }

    #[test]
    fn root_level_files_imply_no_folders() {
        assert!(folder_paths(["readme.txt", "logo.png"]).is_empty());
    }

    #[test]
    fn closure_property_holds() {
        let folders = folder_paths(["x/y/z/w/file.bin"]);
        for folder in &folders {
            if let Some((parent, _)) = folder.rsplit_once('/') {
                assert!(folders.contains(parent), "missing ancestor {parent}");
            }
        }
        assert_eq!(folders.len(), 4);
    }

    #[test]
    fn no_folder_is_its_own_parent() {
        let folders = folder_paths(["a/a/a.txt"]);
        let expected: BTreeSet<String> = ["a", "a/a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(folders, expected);
    }

    #[test]
    fn folder_entries_have_folder_shape() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Math/deep")).unwrap();

        let files = vec![file_entry_at("Math/deep/data.csv")];
        let folders = folder_entries(tmp.path(), &files);

        assert_eq!(folders.len(), 2);
        let math = &folders[0];
        assert_eq!(math.path, "Math");
        assert_eq!(math.name, "Math");
        assert_eq!(math.kind, EntryKind::Folder);
        assert_eq!(math.size_bytes, 0);
        assert_eq!(math.mime, None);
        assert_eq!(math.checksum, None);
        assert_eq!(math.thumbnail_path, None);
        assert_eq!(math.id, entry_id("Math"));
        // Real directory: mtime is not the epoch fallback
        assert_ne!(math.updated_at, "1970-01-01T00:00:00.000Z");

        assert_eq!(folders[1].path, "Math/deep");
        assert_eq!(folders[1].name, "deep");
    }

    #[test]
    fn missing_directory_falls_back_to_epoch() {
        let tmp = TempDir::new().unwrap();
        // Entry references a directory that no longer exists on disk
        let files = vec![file_entry_at("ghost/file.txt")];
        let folders = folder_entries(tmp.path(), &files);
        assert_eq!(folders[0].updated_at, "1970-01-01T00:00:00.000Z");
    }
}
