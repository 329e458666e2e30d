//! Virtual project store.
//!
//! The authoritative multi-file view of the current generated project. It is
//! built from marker-delimited text (see [`marker`]), edited in place, and
//! serialized back to the same format whenever the text has to leave the
//! process (project file, modify requests).
//!
//! # Example
//!
//! ```ignore
//! let mut store = ProjectStore::parse("// FILE: a.js\nfoo\n\n// FILE: b.js\nbar");
//! store.edit(1, "baz");
//! assert_eq!(store.serialize(), "// FILE: a.js\nfoo\n\n// FILE: b.js\nbaz");
//! ```

pub mod language;
pub mod marker;
pub mod tree;

pub use language::Language;
pub use marker::Ambiguity;
pub use tree::{ProjectTree, organize};

use serde::Serialize;

/// Name given to text that carries no usable marker.
pub const DEFAULT_FILE_NAME: &str = "Component.tsx";

/// One logical file of the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn language(&self) -> Language {
        Language::classify(&self.name)
    }
}

/// Ordered, name-unique collection of [`FileRecord`]s.
///
/// Order is discovery order; a record keeps its position when its content is
/// replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStore {
    files: Vec<FileRecord>,
}

impl ProjectStore {
    /// Parse marker-delimited text. Never fails.
    pub fn parse(blob: &str) -> Self {
        marker::parse(blob).0
    }

    /// Parse and also return what the tokenizer had to guess.
    pub fn parse_with_report(blob: &str) -> (Self, Vec<Ambiguity>) {
        marker::parse(blob)
    }

    /// Serialize back to marker-delimited text.
    pub fn serialize(&self) -> String {
        marker::serialize(&self.files)
    }

    pub(crate) fn from_records(files: Vec<FileRecord>) -> Self {
        Self { files }
    }

    pub(crate) fn single(name: &str, content: &str) -> Self {
        Self {
            files: vec![FileRecord::new(name, content)],
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileRecord> {
        self.files.get(index)
    }

    /// Index of the file named exactly `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&FileRecord> {
        self.position(name).map(|i| &self.files[i])
    }

    /// Replace the content at `index`.
    ///
    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn edit(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.files.get_mut(index) {
            Some(file) => {
                file.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Add a file, or replace the content of an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.files[index].content = content.into(),
            None => self.files.push(FileRecord::new(name, content)),
        }
    }

    pub fn organize(&self) -> ProjectTree<'_> {
        tree::organize(self)
    }
}

impl<'a> IntoIterator for &'a ProjectStore {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
