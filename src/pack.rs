//! Packaging: zip archive and plain directory export.
//!
//! Each record's name becomes its path inside the archive (or below the
//! export directory), directory segments included. Names are checked before
//! anything is written so a bad name never leaves a half-written tree.

use crate::{project::ProjectStore, session::write_atomic};
use anyhow::{Context, Result, bail};
use std::{
    fs,
    io::{Cursor, Write},
    path::{Component, Path, PathBuf},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Relative path for a record name, or an error for names that would escape.
pub fn safe_relative_path(name: &str) -> Result<PathBuf> {
    if name.is_empty() {
        bail!("empty file name");
    }
    if name.split('/').any(str::is_empty) {
        bail!("`{name}` has an empty path segment");
    }

    let path = PathBuf::from(name);
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => bail!("`{name}` points outside the project"),
            _ => bail!("`{name}` must be a relative path"),
        }
    }
    Ok(path)
}

fn check_names(store: &ProjectStore) -> Result<Vec<PathBuf>> {
    store
        .iter()
        .map(|file| safe_relative_path(&file.name))
        .collect()
}

/// Zip archive of every record, in store order.
pub fn archive_bytes(store: &ProjectStore) -> Result<Vec<u8>> {
    check_names(store)?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in store {
            zip.start_file(file.name.as_str(), options)
                .with_context(|| format!("failed to add {}", file.name))?;
            zip.write_all(file.content.as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buf.into_inner())
}

/// Write the archive to `path`, returning the number of entries.
pub fn write_archive(store: &ProjectStore, path: &Path) -> Result<usize> {
    let bytes = archive_bytes(store)?;
    write_atomic(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(store.len())
}

/// Write every record below `dir`, returning the number of files.
pub fn export(store: &ProjectStore, dir: &Path) -> Result<usize> {
    let paths = check_names(store)?;

    for (file, relative) in store.iter().zip(&paths) {
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.content)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }
    Ok(paths.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn store() -> ProjectStore {
        ProjectStore::parse(
            "// FILE: index.html\n<p>hi</p>\n\n// FILE: js/app.js\nrun();\n\n// FILE: README.md\n# App",
        )
    }

    #[test]
    fn test_safe_relative_path() {
        assert!(safe_relative_path("js/app.js").is_ok());
        assert!(safe_relative_path("../escape.js").is_err());
        assert!(safe_relative_path("a/../../b").is_err());
        assert!(safe_relative_path("/etc/passwd").is_err());
        assert!(safe_relative_path("a//b").is_err());
        assert!(safe_relative_path("").is_err());
    }

    #[test]
    fn test_archive_entries_in_order() {
        let bytes = archive_bytes(&store()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<_> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["index.html", "js/app.js", "README.md"]);

        let mut content = String::new();
        archive.by_name("js/app.js").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "run();");
    }

    #[test]
    fn test_write_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dist").join("web-project.zip");

        assert_eq!(write_archive(&store(), &path).unwrap(), 3);
        assert!(path.is_file());
    }

    #[test]
    fn test_export_keeps_folders() {
        let dir = TempDir::new().unwrap();

        assert_eq!(export(&store(), dir.path()).unwrap(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join("js").join("app.js")).unwrap(),
            "run();"
        );
    }

    #[test]
    fn test_export_rejects_before_writing() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::parse("// FILE: ok.js\n1\n\n// FILE: ../bad.js\n2");

        assert!(export(&store, &dir.path().join("site")).is_err());
        assert!(!dir.path().join("site").exists());
        assert!(archive_bytes(&store).is_err());
    }
}
