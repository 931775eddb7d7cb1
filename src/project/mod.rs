//! Directory layout contract and file loading.
//!
//! The extraction root is produced by an external collaborator and has a
//! fixed shape:
//!
//! ```text
//! <root>/Model/tables/*.tmdl            one file per table
//! <root>/Model/relationships.tmdl       aggregated relationships, or
//! <root>/Model/relationships/*.tmdl     one file per relationship
//! <root>/Mashup/Package/Formulas/Section1.m   primary formula section
//! <root>/**/*.m                         per-file query modules
//! <root>/Model/expressions.tmdl         expression declarations
//! ```
//!
//! Listings are sorted lexicographically so output is reproducible. A
//! missing directory or file is structural absence (empty listing); an
//! I/O failure while reading or walking is fatal.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ExtractError;

/// Extension of table-definition dialect files.
pub const TABLE_EXT: &str = "tmdl";

/// Extension of formula dialect files.
pub const MASHUP_EXT: &str = "m";

/// File name of the primary formula section document.
pub const SECTION_FILE_NAME: &str = "Section1.m";

/// Directory holding the primary formula section document.
pub const FORMULAS_DIR: &str = "Formulas";

/// Resolved paths inside one extraction root.
#[derive(Debug, Clone)]
pub struct ModelLayout {
    root: PathBuf,
}

impl ModelLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Model name: the root directory's base name.
    pub fn model_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("Model").join("tables")
    }

    pub fn relationships_file(&self) -> PathBuf {
        self.root.join("Model").join("relationships.tmdl")
    }

    pub fn relationships_dir(&self) -> PathBuf {
        self.root.join("Model").join("relationships")
    }

    pub fn expressions_file(&self) -> PathBuf {
        self.root.join("Model").join("expressions.tmdl")
    }

    pub fn section_file(&self) -> PathBuf {
        self.root
            .join("Mashup")
            .join("Package")
            .join(FORMULAS_DIR)
            .join(SECTION_FILE_NAME)
    }
}

/// Read a file fully as UTF-8. Open, read, release; failure is fatal.
pub fn read_text(path: &Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|e| ExtractError::file_read(path, e))
}

/// List `*.tmdl` files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list; any other listing failure is
/// fatal.
pub fn list_dialect_files(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ExtractError::dir_scan(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExtractError::dir_scan(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == TABLE_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recursively list `*.m` files under `root`, sorted by path, excluding
/// the primary section document (it is handled by its own source probe).
pub fn list_mashup_files(root: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => ExtractError::dir_scan(path, io),
                None => ExtractError::dir_scan(
                    root,
                    std::io::Error::other("walk cycle detected"),
                ),
            }
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().is_none_or(|ext| ext != MASHUP_EXT) {
            continue;
        }
        if is_section_file(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// The primary section document: `Section1.m` inside a `Formulas`
/// directory.
fn is_section_file(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == SECTION_FILE_NAME)
        && path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|n| n == FORMULAS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ModelLayout::new("/tmp/MyModel");
        assert_eq!(layout.model_name(), "MyModel");
        assert!(layout.tables_dir().ends_with("Model/tables"));
        assert!(
            layout
                .relationships_file()
                .ends_with("Model/relationships.tmdl")
        );
        assert!(
            layout
                .section_file()
                .ends_with("Mashup/Package/Formulas/Section1.m")
        );
    }

    #[test]
    fn test_section_file_detection() {
        assert!(is_section_file(Path::new(
            "/m/Mashup/Package/Formulas/Section1.m"
        )));
        assert!(!is_section_file(Path::new("/m/Other/Section1.m")));
        assert!(!is_section_file(Path::new(
            "/m/Mashup/Package/Formulas/Query.m"
        )));
    }

    #[test]
    fn test_missing_tables_dir_is_empty() {
        let files = list_dialect_files(Path::new("/nonexistent/tabex/tables")).unwrap();
        assert!(files.is_empty());
    }
}
