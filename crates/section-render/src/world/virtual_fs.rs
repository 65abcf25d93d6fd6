//! Sandboxed in-memory file store
//!
//! The section template and any mounted assets live here; compilation never
//! reads the real filesystem.

use std::collections::HashMap;

use typst::foundations::Bytes;
use typst::syntax::{FileId, Source, VirtualPath};

use crate::error::RenderError;

const MAIN_PATH: &str = "/main.typ";

#[derive(Debug, Default)]
pub struct VirtualFilesystem {
    files: HashMap<FileId, Bytes>,
}

impl VirtualFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the entry-point source and return its id
    pub fn mount_main(&mut self, content: String) -> FileId {
        let id = FileId::new(None, VirtualPath::new(MAIN_PATH));
        self.files.insert(id, content.into_bytes().into());
        id
    }

    /// Mount an additional file such as an image
    pub fn mount_file(&mut self, path: &str, content: Bytes) -> Result<FileId, RenderError> {
        if path.contains("..") {
            return Err(RenderError::PathSecurityViolation(format!(
                "path traversal in '{}'",
                path
            )));
        }

        let id = FileId::new(None, VirtualPath::new(normalize_path(path)));
        self.files.insert(id, content);
        Ok(id)
    }

    pub fn source(&self, id: FileId) -> Option<Source> {
        let bytes = self.files.get(&id)?;
        let text = std::str::from_utf8(bytes).ok()?;
        Some(Source::new(id, text.to_string()))
    }

    pub fn file(&self, id: FileId) -> Option<&Bytes> {
        self.files.get(&id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize_path(path: &str) -> String {
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_main() {
        let mut fs = VirtualFilesystem::new();
        let id = fs.mount_main("Hello".to_string());
        assert!(fs.source(id).unwrap().text().contains("Hello"));
    }

    #[test]
    fn test_path_traversal_blocked() {
        let mut fs = VirtualFilesystem::new();
        let result = fs.mount_file("../../etc/passwd", Bytes::from_static(&[]));
        assert!(matches!(result, Err(RenderError::PathSecurityViolation(_))));
        assert!(fs.is_empty());
    }

    #[test]
    fn test_mount_asset_normalizes_path() {
        let mut fs = VirtualFilesystem::new();
        let content: Bytes = vec![0x89u8, 0x50, 0x4E, 0x47].into();
        let id = fs.mount_file("images//logo.png", content.clone()).unwrap();
        assert_eq!(fs.file(id), Some(&content));
        assert_eq!(id, FileId::new(None, VirtualPath::new("/images/logo.png")));
    }
}
