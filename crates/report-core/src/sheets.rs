//! Spreadsheet page lookup
//!
//! Sheets are matched by normalized name (trimmed, lower-cased). An exact
//! match wins; otherwise a containment match in either direction is accepted
//! only when exactly one candidate qualifies.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::artifact::PageArtifact;
use crate::error::AssemblyError;
use crate::manifest::normalize_name;

/// A lookup miss; the assembler degrades it to an empty page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No spreadsheet page named '{0}'")]
pub struct SheetNotFound(pub String);

pub trait SpreadsheetPageSource {
    /// Names of every available sheet
    fn sheet_names(&self) -> Vec<String>;

    fn lookup_page(&self, name: &str) -> Result<PageArtifact, SheetNotFound>;
}

/// Pick the candidate matching `name`, if the match is unambiguous
pub fn find_sheet_match<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return None;
    }

    let candidates: Vec<(&'a str, String)> = candidates
        .into_iter()
        .map(|c| (c, normalize_name(c)))
        .collect();

    if let Some((candidate, _)) = candidates.iter().find(|(_, norm)| *norm == wanted) {
        return Some(*candidate);
    }

    let partial: Vec<&'a str> = candidates
        .iter()
        .filter(|(_, norm)| {
            !norm.is_empty() && (norm.contains(wanted.as_str()) || wanted.contains(norm.as_str()))
        })
        .map(|(candidate, _)| *candidate)
        .collect();

    match partial.as_slice() {
        [only] => Some(*only),
        [] => None,
        many => {
            tracing::debug!(sheet = name, candidates = ?many, "ambiguous partial sheet match");
            None
        }
    }
}

/// Sheet PDFs held in memory, keyed by sheet name
#[derive(Debug, Clone, Default)]
pub struct InMemorySheetSource {
    pages: BTreeMap<String, Vec<u8>>,
}

impl InMemorySheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, pdf: Vec<u8>) {
        self.pages.insert(name.into(), pdf);
    }

    pub fn with_page(mut self, name: impl Into<String>, pdf: Vec<u8>) -> Self {
        self.insert(name, pdf);
        self
    }
}

impl SpreadsheetPageSource for InMemorySheetSource {
    fn sheet_names(&self) -> Vec<String> {
        self.pages.keys().cloned().collect()
    }

    fn lookup_page(&self, name: &str) -> Result<PageArtifact, SheetNotFound> {
        let key = find_sheet_match(name, self.pages.keys().map(String::as_str))
            .ok_or_else(|| SheetNotFound(name.to_string()))?;
        let bytes = self
            .pages
            .get(key)
            .cloned()
            .ok_or_else(|| SheetNotFound(name.to_string()))?;
        Ok(PageArtifact::from_pdf(key, bytes))
    }
}

/// One exported PDF per sheet in a directory, named by file stem
#[derive(Debug, Clone)]
pub struct DirectorySheetSource {
    dir: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectorySheetSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, AssemblyError> {
        let dir = dir.as_ref().to_path_buf();
        let unavailable = |reason: String| AssemblyError::SheetSourceUnavailable {
            path: dir.clone(),
            reason,
        };

        let listing = std::fs::read_dir(&dir).map_err(|e| unavailable(e.to_string()))?;

        let mut files = BTreeMap::new();
        for entry in listing {
            let path = entry.map_err(|e| unavailable(e.to_string()))?.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.insert(stem.to_string(), path.clone());
            }
        }

        tracing::info!(dir = %dir.display(), sheets = files.len(), "opened spreadsheet pages");
        Ok(Self { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SpreadsheetPageSource for DirectorySheetSource {
    fn sheet_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn lookup_page(&self, name: &str) -> Result<PageArtifact, SheetNotFound> {
        let stem = find_sheet_match(name, self.files.keys().map(String::as_str))
            .ok_or_else(|| SheetNotFound(name.to_string()))?;
        let path = self
            .files
            .get(stem)
            .ok_or_else(|| SheetNotFound(name.to_string()))?;

        match std::fs::read(path) {
            Ok(bytes) => Ok(PageArtifact::from_pdf(stem, bytes)),
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read sheet PDF: {}", e);
                Err(SheetNotFound(name.to_string()))
            }
        }
    }
}
