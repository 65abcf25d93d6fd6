//! Per-run record of degraded outcomes

use serde::Serialize;
use section_writer::ServiceErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedGeneration {
    pub section_id: String,
    pub kind: ServiceErrorKind,
    pub message: String,
}

/// Summary returned alongside the final document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunDiagnostics {
    pub failed_generations: Vec<FailedGeneration>,
    pub missing_sheets: Vec<String>,
    pub failed_renders: Vec<String>,
    /// Artifacts whose bytes were not a parseable PDF
    pub unreadable_artifacts: Vec<String>,
    /// Sections whose anchor could not be satisfied
    pub unpositioned_sections: Vec<String>,
    pub sheets_rendered: usize,
    pub sections_rendered: usize,
    pub pages_inspected: usize,
    pub blank_pages_dropped: usize,
}

impl RunDiagnostics {
    pub fn is_degraded(&self) -> bool {
        !self.failed_generations.is_empty()
            || !self.missing_sheets.is_empty()
            || !self.failed_renders.is_empty()
            || !self.unreadable_artifacts.is_empty()
    }

    pub fn log_summary(&self) {
        if self.is_degraded() {
            tracing::warn!(
                failed_generations = self.failed_generations.len(),
                missing_sheets = self.missing_sheets.len(),
                failed_renders = self.failed_renders.len(),
                unreadable = self.unreadable_artifacts.len(),
                blank_pages_dropped = self.blank_pages_dropped,
                "report assembled with degraded sections"
            );
        } else {
            tracing::info!(
                sheets = self.sheets_rendered,
                sections = self.sections_rendered,
                blank_pages_dropped = self.blank_pages_dropped,
                "report assembled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_flag() {
        let mut diagnostics = RunDiagnostics::default();
        diagnostics.blank_pages_dropped = 3;
        assert!(!diagnostics.is_degraded());

        diagnostics.missing_sheets.push("Ratios".into());
        assert!(diagnostics.is_degraded());
    }

    #[test]
    fn test_serializes_error_kind() {
        let diagnostics = RunDiagnostics {
            failed_generations: vec![FailedGeneration {
                section_id: "swot".into(),
                kind: ServiceErrorKind::QuotaExceeded,
                message: "credits".into(),
            }],
            ..RunDiagnostics::default()
        };
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["failed_generations"][0]["kind"], "quota_exceeded");
    }
}
