//! The working session: current project, its file on disk and persistent state.
//!
//! # State Files
//!
//! ```text
//! <state_dir>/
//! ├── errors.json     ← failed generate/modify calls, oldest first
//! └── prompts.json    ← successful prompts, oldest first
//! ```
//!
//! The store is only replaced after the new text is parsed and the project
//! file has been written (temp file + rename). A failed generator call leaves
//! both untouched.

use crate::{
    config::WebConfig,
    generate::{GenerateError, Generator},
    log,
    project::{Ambiguity, ProjectStore},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs,
    path::{Path, PathBuf},
};

const ERROR_LOG: &str = "errors.json";
const PROMPT_HISTORY: &str = "prompts.json";

/// Which generator operation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Generate,
    Modify,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Modify => "modify",
        }
    }
}

/// A failed generator call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub at: DateTime<Local>,
    pub operation: Operation,
    pub kind: String,
    pub message: String,
    pub prompt: String,
}

/// A prompt that produced the current (or an earlier) project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub at: DateTime<Local>,
    pub operation: Operation,
    pub prompt: String,
    pub files: usize,
}

pub struct Session {
    store: ProjectStore,
    /// Project text as last read or written
    source: String,
    project_path: PathBuf,
    state_dir: PathBuf,
}

impl Session {
    /// Open the session described by `[project]`.
    pub fn open(config: &WebConfig) -> Result<Self> {
        Self::open_at(&config.project.path, config.state_dir())
    }

    /// Open with explicit paths; a missing project file means an empty store.
    pub fn open_at(project_path: &Path, state_dir: &Path) -> Result<Self> {
        let (store, source) = if project_path.exists() {
            let text = fs::read_to_string(project_path)
                .with_context(|| format!("failed to read {}", project_path.display()))?;
            (ProjectStore::parse(&text), text)
        } else {
            (ProjectStore::default(), String::new())
        };

        Ok(Self {
            store,
            source,
            project_path: project_path.to_path_buf(),
            state_dir: state_dir.to_path_buf(),
        })
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Raw project text, preamble included.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Re-read the project file and report marker problems.
    pub fn check(&self) -> Result<Vec<Ambiguity>> {
        if !self.project_path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.project_path)?;
        Ok(ProjectStore::parse_with_report(&text).1)
    }

    /// Replace the project with a freshly generated one.
    pub async fn apply_generate(
        &mut self,
        generator: &dyn Generator,
        prompt: &str,
    ) -> Result<&ProjectStore> {
        let result = generator.generate(prompt).await;
        self.settle(Operation::Generate, prompt, result)
    }

    /// Ask the generator to change the current project.
    pub async fn apply_modify(
        &mut self,
        generator: &dyn Generator,
        prompt: &str,
    ) -> Result<&ProjectStore> {
        let existing = self.store.serialize();
        let result = generator.modify(&existing, prompt).await;
        self.settle(Operation::Modify, prompt, result)
    }

    fn settle(
        &mut self,
        operation: Operation,
        prompt: &str,
        result: Result<String, GenerateError>,
    ) -> Result<&ProjectStore> {
        let text = match result {
            Ok(text) => text,
            Err(err) => {
                self.record_error(operation, prompt, &err)?;
                return Err(err).with_context(|| format!("{} failed", operation.as_str()));
            }
        };

        let store = ProjectStore::parse(&text);
        self.commit(store, text)?;
        self.record_prompt(operation, prompt)?;
        Ok(&self.store)
    }

    /// Replace one file's content and rewrite the project file.
    ///
    /// Returns `false` (and writes nothing) for an out-of-range index.
    pub fn edit(&mut self, index: usize, content: &str) -> Result<bool> {
        let mut next = self.store.clone();
        if !next.edit(index, content) {
            return Ok(false);
        }
        let text = next.serialize();
        self.commit(next, text)?;
        Ok(true)
    }

    /// Write `source` (which parses to `store`) and swap both in.
    fn commit(&mut self, store: ProjectStore, source: String) -> Result<()> {
        write_atomic(&self.project_path, source.as_bytes())
            .with_context(|| format!("failed to write {}", self.project_path.display()))?;
        self.store = store;
        self.source = source;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Error log
    // ------------------------------------------------------------------------

    fn record_error(
        &self,
        operation: Operation,
        prompt: &str,
        err: &GenerateError,
    ) -> Result<()> {
        log!("error"; "{} failed: {err}", operation.as_str());
        let mut errors = self.errors()?;
        errors.push(ErrorRecord {
            at: Local::now(),
            operation,
            kind: err.kind().to_string(),
            message: err.to_string(),
            prompt: prompt.to_string(),
        });
        self.write_state(ERROR_LOG, &errors)
    }

    pub fn errors(&self) -> Result<Vec<ErrorRecord>> {
        self.read_state(ERROR_LOG)
    }

    /// Remove every recorded error, returning how many there were.
    pub fn clear_errors(&self) -> Result<usize> {
        let count = self.errors()?.len();
        self.write_state::<ErrorRecord>(ERROR_LOG, &[])?;
        Ok(count)
    }

    // ------------------------------------------------------------------------
    // Prompt history
    // ------------------------------------------------------------------------

    fn record_prompt(&self, operation: Operation, prompt: &str) -> Result<()> {
        let mut history = self.history()?;
        history.push(PromptRecord {
            at: Local::now(),
            operation,
            prompt: prompt.to_string(),
            files: self.store.len(),
        });
        self.write_state(PROMPT_HISTORY, &history)
    }

    pub fn history(&self) -> Result<Vec<PromptRecord>> {
        self.read_state(PROMPT_HISTORY)
    }

    fn read_state<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.state_dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn write_state<T: Serialize>(&self, file: &str, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.state_dir)?;
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.state_dir.join(file), json.as_bytes())
    }
}

/// Write `bytes` to a sibling temp file, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .context("target path has no file name")?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&temp, bytes)?;
    if let Err(err) = fs::rename(&temp, path) {
        fs::remove_file(&temp).ok();
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Returns a fixed text, or fails with `RateLimited`.
    struct Scripted(Option<&'static str>);

    #[async_trait]
    impl Generator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> crate::generate::Result<String> {
            self.0.map(str::to_string).ok_or(GenerateError::RateLimited)
        }

        async fn modify(&self, existing: &str, _prompt: &str) -> crate::generate::Result<String> {
            self.0
                .map(|text| format!("{existing}\n\n{text}"))
                .ok_or(GenerateError::RateLimited)
        }
    }

    const PROJECT: &str = "// FILE: index.html\n<p>a</p>\n\n// FILE: script.js\nrun();\n\n// FILE: styles.css\np {}";

    fn session(dir: &TempDir) -> Session {
        let path = dir.path().join("project.txt");
        fs::write(&path, PROJECT).unwrap();
        Session::open_at(&path, &dir.path().join(".webforge")).unwrap()
    }

    #[test]
    fn test_open_missing_project_is_empty() {
        let dir = TempDir::new().unwrap();
        let session = Session::open_at(&dir.path().join("none.txt"), dir.path()).unwrap();
        assert!(session.store().is_empty());
        assert!(session.check().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_modify_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let before = session.store().clone();

        let err = session.apply_modify(&Scripted(None), "make it blue").await.unwrap_err();
        assert!(err.to_string().contains("modify failed"));

        assert_eq!(session.store(), &before);
        assert_eq!(fs::read_to_string(session.project_path()).unwrap(), PROJECT);

        let errors = session.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].operation, Operation::Modify);
        assert_eq!(errors[0].kind, "rate_limited");
        assert_eq!(errors[0].prompt, "make it blue");
        assert!(session.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_replaces_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let store = session
            .apply_generate(&Scripted(Some("// FILE: app.js\nnew();")), "an app")
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        let on_disk = fs::read_to_string(session.project_path()).unwrap();
        assert_eq!(on_disk, "// FILE: app.js\nnew();");

        let history = session.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, Operation::Generate);
        assert_eq!(history[0].files, 1);
    }

    #[tokio::test]
    async fn test_unmarked_output_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let output = "// FILE:\nsomething";

        let before = session
            .apply_generate(&Scripted(Some(output)), "broken")
            .await
            .unwrap()
            .clone();
        assert_eq!(before.get(0).unwrap().content, output);

        let reopened = Session::open_at(session.project_path(), &dir.path().join(".webforge")).unwrap();
        assert_eq!(reopened.store(), &before);
    }

    #[tokio::test]
    async fn test_generate_keeps_raw_text() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let output = "Here is your login page:\n\n// FILE: app.js\nnew();";

        session.apply_generate(&Scripted(Some(output)), "login").await.unwrap();

        assert_eq!(session.source(), output);
        assert_eq!(fs::read_to_string(session.project_path()).unwrap(), output);
        assert!(matches!(session.check().unwrap().as_slice(), [Ambiguity::Preamble { .. }]));
    }

    #[tokio::test]
    async fn test_modify_sends_current_text() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let store = session
            .apply_modify(&Scripted(Some("// FILE: extra.js\nmore();")), "add extra")
            .await
            .unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(store.get(3).unwrap().name, "extra.js");
    }

    #[test]
    fn test_edit_rewrites_only_that_section() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        assert!(session.edit(1, "other();").unwrap());
        let on_disk = fs::read_to_string(session.project_path()).unwrap();
        assert_eq!(
            on_disk,
            "// FILE: index.html\n<p>a</p>\n\n// FILE: script.js\nother();\n\n// FILE: styles.css\np {}"
        );
        assert_eq!(session.store().get(0).unwrap().content, "<p>a</p>");
    }

    #[test]
    fn test_edit_out_of_range_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        assert!(!session.edit(9, "x").unwrap());
        assert_eq!(fs::read_to_string(session.project_path()).unwrap(), PROJECT);
    }

    #[tokio::test]
    async fn test_clear_errors() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let _ = session.apply_generate(&Scripted(None), "x").await;
        let _ = session.apply_generate(&Scripted(None), "y").await;

        assert_eq!(session.clear_errors().unwrap(), 2);
        assert!(session.errors().unwrap().is_empty());
    }

    #[test]
    fn test_check_reports_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.txt");
        fs::write(&path, "// FILE: a.js\n1\n\n// FILE: a.js\n2").unwrap();
        let session = Session::open_at(&path, dir.path()).unwrap();

        let report = session.check().unwrap();
        assert!(matches!(report.as_slice(), [Ambiguity::Duplicate { .. }]));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert!(!dir.path().join("nested").join(".out.txt.tmp").exists());
    }
}
