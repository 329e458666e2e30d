//! webforge - generate, inspect and preview marker-delimited web projects.

mod cli;
mod config;
mod console;
mod generate;
mod logger;
mod pack;
mod preview;
mod project;
mod serve;
mod session;
mod utils;
mod watch;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, PromptArgs};
use config::{WebConfig, cfg, init_config};
use project::{ProjectStore, language::editor_mode, tree::TreeEntry};
use serve::{ServeState, serve_project};
use session::{Operation, Session};
use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    init_config(WebConfig::load(cli)?);
    let c = cfg();

    match &cli.command {
        Commands::Generate { args } => run_prompt(&c, Operation::Generate, args),
        Commands::Modify { args } => run_prompt(&c, Operation::Modify, args),
        Commands::Files => list_files(Session::open(&c)?.store()),
        Commands::Show { target } => show_file(Session::open(&c)?.store(), target),
        Commands::Edit { index, file } => edit_file(&c, *index, file.as_deref()),
        Commands::Check => check_project(&c),
        Commands::Preview { dir, .. } => write_preview(&c, dir.as_deref()),
        Commands::Export { dir } => {
            let dir = dir.clone().unwrap_or_else(|| c.project.output.join("site"));
            let count = pack::export(Session::open(&c)?.store(), &dir)?;
            log!("export"; "{count} files → {}", dir.display());
            Ok(())
        }
        Commands::Pack { output } => {
            let path = output.clone().unwrap_or_else(|| c.archive_path());
            let count = pack::write_archive(Session::open(&c)?.store(), &path)?;
            log!("pack"; "{count} files → {}", path.display());
            Ok(())
        }
        Commands::Serve { .. } => {
            let session = Session::open(&c)?;
            let state = ServeState::new(
                session.source(),
                c.preview.device,
                project_title(session.project_path()),
            );
            serve_project(Arc::new(state))
        }
        Commands::Errors { clear } => show_errors(&Session::open(&c)?, *clear),
        Commands::History => show_history(&Session::open(&c)?),
    }
}

/// Human title for the host page, from the project file name.
fn project_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Run one generate/modify request on a fresh Tokio runtime.
fn run_prompt(config: &WebConfig, operation: Operation, args: &PromptArgs) -> Result<()> {
    let mut session = Session::open(config)?;
    let prompt = args.text();

    if operation == Operation::Modify && session.store().is_empty() {
        bail!(
            "nothing to modify: {} is empty or missing, run `generate` first",
            session.project_path().display()
        );
    }

    let generator = generate::from_config(&config.llm, args.offline);
    log!(operation.as_str(); "asking {} ...", generator.name());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let count = runtime.block_on(async {
        let store = match operation {
            Operation::Generate => session.apply_generate(generator.as_ref(), &prompt).await,
            Operation::Modify => session.apply_modify(generator.as_ref(), &prompt).await,
        };
        store.map(ProjectStore::len)
    })?;

    log!(operation.as_str(); "{count} files written to {}", session.project_path().display());
    list_files(session.store())?;

    let report = session.check()?;
    for ambiguity in &report {
        log!("check"; "{ambiguity}");
    }
    Ok(())
}

fn print_entry(store: &ProjectStore, entry: &TreeEntry<'_>, indent: &str) {
    let language = entry.record.language();
    let index = store.position(&entry.record.name).unwrap_or_default();
    println!(
        "{indent}{} {:>3}  {}  ({}, {})",
        language.icon(),
        index,
        entry.label,
        language.name(),
        editor_mode(&entry.record.name)
    );
}

fn list_files(store: &ProjectStore) -> Result<()> {
    if store.is_empty() {
        log!("files"; "no files yet");
        return Ok(());
    }

    let tree = store.organize();
    for folder in &tree.folders {
        println!("📁 {}/", folder.name);
        for entry in &folder.entries {
            print_entry(store, entry, "   ");
        }
    }
    for entry in &tree.top_level {
        print_entry(store, entry, "");
    }
    Ok(())
}

fn show_file(store: &ProjectStore, target: &str) -> Result<()> {
    let record = match target.parse::<usize>() {
        Ok(index) => store.get(index),
        Err(_) => store.find(target),
    };
    let Some(record) = record else {
        bail!("no file `{target}` in the project");
    };

    println!("{}", record.content);
    Ok(())
}

fn edit_file(config: &WebConfig, index: usize, source: Option<&Path>) -> Result<()> {
    let mut session = Session::open(config)?;

    let content = match source {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if session.edit(index, &content)? {
        let name = &session.store().files()[index].name;
        log!("edit"; "{name} updated");
    } else {
        log!("edit"; "no file at index {index}, nothing changed");
    }
    Ok(())
}

fn check_project(config: &WebConfig) -> Result<()> {
    let session = Session::open(config)?;
    let report = session.check()?;

    if report.is_empty() {
        log!("check"; "{} files, no marker problems", session.store().len());
    } else {
        for ambiguity in &report {
            log!("check"; "{ambiguity}");
        }
    }
    Ok(())
}

fn write_preview(config: &WebConfig, dir: Option<&Path>) -> Result<()> {
    let session = Session::open(config)?;
    let dir: PathBuf = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.project.output.join("preview"));

    let doc = preview::write_preview(
        session.store(),
        session.source(),
        &config.preview,
        &project_title(session.project_path()),
        &dir,
    )?;

    if let preview::MarkupSource::Fallback(kind) = doc.source {
        log!("preview"; "no HTML file, showing the {kind:?} placeholder");
    }
    log!("preview"; "{}", dir.join("index.html").display());
    Ok(())
}

fn show_errors(session: &Session, clear: bool) -> Result<()> {
    if clear {
        let count = session.clear_errors()?;
        log!("errors"; "cleared {count} entries");
        return Ok(());
    }

    let errors = session.errors()?;
    if errors.is_empty() {
        log!("errors"; "no recorded errors");
    }
    for err in errors {
        println!(
            "{}  {:<8} {:<16} {}\n          prompt: {}",
            err.at.format("%Y-%m-%d %H:%M:%S"),
            err.operation.as_str(),
            err.kind,
            err.message,
            err.prompt
        );
    }
    Ok(())
}

fn show_history(session: &Session) -> Result<()> {
    let history = session.history()?;
    if history.is_empty() {
        log!("history"; "no prompts yet");
    }
    for record in history {
        println!(
            "{}  {:<8} {:>3} files  {}",
            record.at.format("%Y-%m-%d %H:%M:%S"),
            record.operation.as_str(),
            record.files,
            record.prompt
        );
    }
    Ok(())
}
