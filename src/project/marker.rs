//! Line-oriented tokenizer for marker-delimited project text.
//!
//! # Wire Format
//!
//! ```text
//! // FILE: index.html
//! <!DOCTYPE html>
//! ...
//!
//! // FILE: js/app.js
//! console.log("hi");
//! ```
//!
//! A marker is a whole line: optional indentation, the `//` comment prefix,
//! the `FILE:` keyword and a file name. Everything up to the next marker line
//! (or end of text) belongs to that file. There is no escaping, so a marker
//! line inside a file body always starts a new file. Marker-like text that
//! does *not* start a line is kept as content and reported as ambiguous.
//!
//! # States
//!
//! ```text
//!            marker line            marker line
//! Preamble ─────────────▶ Body(name) ─────────────▶ Body(name') ...
//!    │                        │
//!    └── other lines          └── other lines (content, inline markers reported)
//! ```

use super::{DEFAULT_FILE_NAME, FileRecord, ProjectStore};
use rustc_hash::FxHashMap;
use std::fmt;

/// Line-comment prefix that opens a marker.
pub const MARKER_PREFIX: &str = "//";

/// Keyword following the prefix.
pub const MARKER_KEYWORD: &str = "FILE:";

// ============================================================================
// Ambiguity Report
// ============================================================================

/// Input the tokenizer resolved silently.
///
/// None of these are errors: parsing always produces a store. They exist so
/// callers (the `check` command) can tell the user what was guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// A marker line with no file name; its body was dropped.
    EmptyName { line: usize },
    /// A later marker reused a name; its body replaced the earlier one.
    Duplicate { name: String, line: usize, first_line: usize },
    /// Marker-like text in the middle of a line, kept as file content.
    InlineMarker { name: String, line: usize },
    /// Non-blank text before the first marker, discarded.
    Preamble { lines: usize },
    /// `FILE:` appears but no marker produced a file; whole text kept as one file.
    NoValidMarker,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { line } => {
                write!(f, "line {line}: marker without a file name, content dropped")
            }
            Self::Duplicate { name, line, first_line } => write!(
                f,
                "line {line}: `{name}` already declared on line {first_line}, later content wins"
            ),
            Self::InlineMarker { name, line } => write!(
                f,
                "line {line}: marker-like text for `{name}` not at line start, kept as content"
            ),
            Self::Preamble { lines } => {
                write!(f, "{lines} line(s) before the first marker discarded")
            }
            Self::NoValidMarker => {
                write!(f, "`{MARKER_KEYWORD}` present but no valid marker, kept as a single file")
            }
        }
    }
}

// ============================================================================
// Marker Recognition
// ============================================================================

/// Return the file name if `line` is a marker line.
///
/// The name may be empty (`// FILE:`); callers decide what to do with it.
pub fn marker_name(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    let rest = line.trim_start().strip_prefix(MARKER_PREFIX)?;
    let rest = rest.trim_start().strip_prefix(MARKER_KEYWORD)?;
    Some(rest.trim())
}

/// Find marker-like text that does not start the line.
fn inline_marker(line: &str) -> Option<&str> {
    let lead = line.len() - line.trim_start().len();
    line.match_indices(MARKER_PREFIX)
        .filter(|(pos, _)| *pos > lead)
        .find_map(|(pos, _)| marker_name(&line[pos..]).filter(|name| !name.is_empty()))
}

/// Format the marker line for `name`.
pub fn marker_line(name: &str) -> String {
    format!("{MARKER_PREFIX} {MARKER_KEYWORD} {name}")
}

// ============================================================================
// Tokenizer
// ============================================================================

/// One marker and the byte range of its body.
struct Section<'a> {
    name: &'a str,
    line: usize,
    body: &'a str,
}

enum State<'a> {
    Preamble { non_blank: usize },
    Body { name: &'a str, line: usize, start: usize },
}

/// Split `blob` into marker sections in a single pass.
fn tokenize<'a>(blob: &'a str, report: &mut Vec<Ambiguity>) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut state = State::Preamble { non_blank: 0 };
    let mut offset = 0;

    for (idx, line) in blob.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let line_start = offset;
        offset += line.len();

        if let Some(name) = marker_name(line) {
            match state {
                State::Preamble { non_blank } if non_blank > 0 => {
                    report.push(Ambiguity::Preamble { lines: non_blank });
                }
                State::Preamble { .. } => {}
                State::Body { name: prev, line, start } => sections.push(Section {
                    name: prev,
                    line,
                    body: &blob[start..line_start],
                }),
            }
            state = State::Body { name, line: line_no, start: offset };
            continue;
        }

        match &mut state {
            State::Preamble { non_blank } => {
                if !line.trim().is_empty() {
                    *non_blank += 1;
                }
            }
            State::Body { .. } => {
                if let Some(name) = inline_marker(line) {
                    report.push(Ambiguity::InlineMarker { name: name.to_owned(), line: line_no });
                }
            }
        }
    }

    if let State::Body { name, line, start } = state {
        sections.push(Section { name, line, body: &blob[start..] });
    }

    sections
}

// ============================================================================
// Public API
// ============================================================================

/// Parse project text into a store, collecting what was resolved silently.
///
/// Never fails: text without a usable marker becomes a single
/// [`DEFAULT_FILE_NAME`] record holding the whole text verbatim.
pub fn parse(blob: &str) -> (ProjectStore, Vec<Ambiguity>) {
    let mut report = Vec::new();
    let sections = tokenize(blob, &mut report);

    let mut files: Vec<FileRecord> = Vec::with_capacity(sections.len());
    let mut seen: FxHashMap<&str, (usize, usize)> = FxHashMap::default();

    for section in sections {
        if section.name.is_empty() {
            report.push(Ambiguity::EmptyName { line: section.line });
            continue;
        }

        let content = section.body.trim().to_owned();
        match seen.get(section.name) {
            Some(&(index, first_line)) => {
                report.push(Ambiguity::Duplicate {
                    name: section.name.to_owned(),
                    line: section.line,
                    first_line,
                });
                files[index].content = content;
            }
            None => {
                seen.insert(section.name, (files.len(), section.line));
                files.push(FileRecord::new(section.name, content));
            }
        }
    }

    if files.is_empty() {
        if blob.contains(MARKER_KEYWORD) {
            report.push(Ambiguity::NoValidMarker);
        }
        return (ProjectStore::single(DEFAULT_FILE_NAME, blob), report);
    }

    (ProjectStore::from_records(files), report)
}

/// Serialize records back into marker format.
///
/// Inverse of [`parse`]. A lone [`DEFAULT_FILE_NAME`] record whose text
/// already parses back to itself is written verbatim, without a marker.
pub fn serialize(files: &[FileRecord]) -> String {
    if let [only] = files
        && only.name == DEFAULT_FILE_NAME
        && parse(&only.content).0.files() == files
    {
        return only.content.clone();
    }

    files
        .iter()
        .map(|file| format!("{}\n{}", marker_line(&file.name), file.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ============================================================================
// Tests
// ============================================================================
