//! Folder view of a flat project.
//!
//! Names like `js/app.js` are grouped under a virtual `js` folder; names
//! without a separator are top-level files.

use super::{FileRecord, ProjectStore, language::Language};
use std::cmp::Ordering;

/// A file as shown in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry<'a> {
    /// Name relative to its folder (the full name for top-level files)
    pub label: &'a str,
    pub record: &'a FileRecord,
}

/// A virtual folder keyed by the first path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder<'a> {
    pub name: &'a str,
    pub entries: Vec<TreeEntry<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectTree<'a> {
    /// Folders in first-seen order, entries in store order
    pub folders: Vec<Folder<'a>>,
    /// Top-level files ordered by [`compare_top_level`]
    pub top_level: Vec<TreeEntry<'a>>,
}

/// Split `name` into `(folder, rest)` when it has more than one segment.
fn split_folder(name: &str) -> Option<(&str, &str)> {
    let (head, rest) = name.trim_start_matches('/').split_once('/')?;
    let rest = rest.trim_start_matches('/');
    (!head.is_empty() && !rest.is_empty()).then_some((head, rest))
}

/// Order top-level files by category, alphabetically only among uncategorized ones.
pub fn compare_top_level(a: &FileRecord, b: &FileRecord) -> Ordering {
    let (la, lb) = (Language::classify(&a.name), Language::classify(&b.name));
    la.rank().cmp(&lb.rank()).then_with(|| {
        if la.rank() == Language::Plain.rank() {
            a.name.cmp(&b.name)
        } else {
            Ordering::Equal
        }
    })
}

/// Partition the store into folders and top-level files.
pub fn organize(store: &ProjectStore) -> ProjectTree<'_> {
    let mut tree = ProjectTree::default();

    for record in store.iter() {
        match split_folder(&record.name) {
            Some((folder, label)) => {
                let entry = TreeEntry { label, record };
                match tree.folders.iter_mut().find(|f| f.name == folder) {
                    Some(existing) => existing.entries.push(entry),
                    None => tree.folders.push(Folder { name: folder, entries: vec![entry] }),
                }
            }
            None => tree.top_level.push(TreeEntry { label: &record.name, record }),
        }
    }

    // `sort_by` is stable: equal ranks keep discovery order
    tree.top_level.sort_by(|a, b| compare_top_level(a.record, b.record));
    tree
}
