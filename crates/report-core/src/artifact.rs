/// One rendered unit of the report: a sheet export or a generated section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifact {
    pub label: String,
    /// PDF bytes, empty for a zero-content artifact
    pub bytes: Vec<u8>,
    pub has_content: bool,
}

impl PageArtifact {
    pub fn from_pdf(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        let has_content = !bytes.is_empty();
        Self {
            label: label.into(),
            bytes,
            has_content,
        }
    }

    /// Stand-in for a sheet that was not found or a section that failed to render
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bytes: Vec::new(),
            has_content: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes_have_no_content() {
        assert!(!PageArtifact::from_pdf("x", Vec::new()).has_content);
        assert!(!PageArtifact::empty("x").has_content);
        assert!(PageArtifact::from_pdf("x", b"%PDF-1.7".to_vec()).has_content);
    }
}
