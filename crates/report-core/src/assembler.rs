//! Rendering resolved entries and merging them into one document

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use section_render::{RenderError, TypstSectionRenderer};
use section_writer::GenerationOutcome;
use serde::{Deserialize, Serialize};

use crate::artifact::PageArtifact;
use crate::diagnostics::{FailedGeneration, RunDiagnostics};
use crate::error::AssemblyError;
use crate::manifest::SectionManifest;
use crate::merge::merge_artifacts;
use crate::resolver::{ResolvedEntry, ResolvedSequence};
use crate::sheets::SpreadsheetPageSource;

/// Turns generated section text into PDF bytes
pub trait SectionRenderer {
    fn render_section(&self, title: &str, body: &str) -> Result<Vec<u8>, RenderError>;
}

impl SectionRenderer for TypstSectionRenderer {
    fn render_section(&self, title: &str, body: &str) -> Result<Vec<u8>, RenderError> {
        TypstSectionRenderer::render_section(self, title, body)
    }
}

fn default_drop_blank_pages() -> bool {
    true
}

/// Settings from the `[assembly]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Where rendered sections are written before merging; nothing is
    /// written when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default = "default_drop_blank_pages")]
    pub drop_blank_pages: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            drop_blank_pages: default_drop_blank_pages(),
        }
    }
}

/// The merged report and what went wrong on the way
#[derive(Debug, Clone)]
pub struct AssembledReport {
    pub document: Vec<u8>,
    pub page_count: usize,
    pub diagnostics: RunDiagnostics,
}

impl AssembledReport {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), AssemblyError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.document)?;
        tracing::info!(path = %path.display(), pages = self.page_count, "report written");
        Ok(())
    }
}

pub struct ReportAssembler<P, R> {
    sheets: P,
    renderer: R,
    options: AssemblyOptions,
}

impl<P: SpreadsheetPageSource> ReportAssembler<P, TypstSectionRenderer> {
    pub fn with_typst(sheets: P, options: AssemblyOptions) -> Self {
        Self::new(sheets, TypstSectionRenderer::new(), options)
    }
}

impl<P: SpreadsheetPageSource, R: SectionRenderer> ReportAssembler<P, R> {
    pub fn new(sheets: P, renderer: R, options: AssemblyOptions) -> Self {
        Self {
            sheets,
            renderer,
            options,
        }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Produce the artifact for one entry
    ///
    /// Missing sheets and failed renders become zero-content artifacts and
    /// are recorded in `diagnostics`.
    pub fn render(
        &self,
        entry: &ResolvedEntry,
        manifest: &SectionManifest,
        outcomes: &HashMap<String, GenerationOutcome>,
        diagnostics: &mut RunDiagnostics,
    ) -> PageArtifact {
        match entry {
            ResolvedEntry::Spreadsheet(name) => match self.sheets.lookup_page(name) {
                Ok(artifact) => {
                    diagnostics.sheets_rendered += 1;
                    artifact
                }
                Err(e) => {
                    tracing::warn!(
                        sheet = %name,
                        available = ?self.sheets.sheet_names(),
                        "{}",
                        e
                    );
                    diagnostics.missing_sheets.push(name.clone());
                    PageArtifact::empty(name.as_str())
                }
            },
            ResolvedEntry::Generated(id) => {
                let Some(outcome) = outcomes.get(id) else {
                    tracing::warn!(section_id = %id, "no generated content for section");
                    diagnostics.failed_renders.push(id.clone());
                    return PageArtifact::empty(id.as_str());
                };

                if let Some(error) = outcome.error() {
                    diagnostics.failed_generations.push(FailedGeneration {
                        section_id: id.clone(),
                        kind: error.kind,
                        message: error.message.clone(),
                    });
                }

                let title = manifest
                    .get(id)
                    .map(|e| e.title.as_str())
                    .unwrap_or(id.as_str());

                match self.renderer.render_section(title, outcome.text()) {
                    Ok(bytes) => {
                        diagnostics.sections_rendered += 1;
                        PageArtifact::from_pdf(id.as_str(), bytes)
                    }
                    Err(e) => {
                        tracing::warn!(section_id = %id, "section render failed: {}", e);
                        diagnostics.failed_renders.push(id.clone());
                        PageArtifact::empty(id.as_str())
                    }
                }
            }
        }
    }

    /// Render every entry in order and merge the results
    pub fn assemble(
        &self,
        sequence: &ResolvedSequence,
        manifest: &SectionManifest,
        outcomes: &HashMap<String, GenerationOutcome>,
    ) -> Result<AssembledReport, AssemblyError> {
        let mut diagnostics = RunDiagnostics {
            unpositioned_sections: sequence.unpositioned().to_vec(),
            ..RunDiagnostics::default()
        };

        let artifacts: Vec<PageArtifact> = sequence
            .iter()
            .map(|entry| self.render(entry, manifest, outcomes, &mut diagnostics))
            .collect();

        let scratch = match &self.options.scratch_dir {
            Some(root) => write_scratch(root, sequence, &artifacts),
            None => None,
        };

        let merged = merge_artifacts(&artifacts, self.options.drop_blank_pages);

        if let Some(dir) = scratch {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                tracing::warn!(dir = %dir.display(), "failed to clean up scratch files: {}", e);
            }
        }

        let merged = merged?;
        diagnostics.pages_inspected = merged.pages_inspected;
        diagnostics.blank_pages_dropped = merged.pages_dropped;
        diagnostics.unreadable_artifacts = merged.unreadable;
        diagnostics.log_summary();

        Ok(AssembledReport {
            document: merged.document,
            page_count: merged.page_count,
            diagnostics,
        })
    }
}

/// Write generated artifacts under a fresh run directory
///
/// Failures are logged and leave the run without scratch files.
fn write_scratch(
    root: &Path,
    sequence: &ResolvedSequence,
    artifacts: &[PageArtifact],
) -> Option<PathBuf> {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let dir = root.join(format!("report-{}-{}", stamp, std::process::id()));

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), "cannot create scratch directory: {}", e);
        return None;
    }

    for (index, (entry, artifact)) in sequence.iter().zip(artifacts).enumerate() {
        if !entry.is_generated() || !artifact.has_content {
            continue;
        }
        let stem: String = artifact
            .label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let path = dir.join(format!("{:03}_{}.pdf", index, stem));
        if let Err(e) = std::fs::write(&path, &artifact.bytes) {
            tracing::warn!(path = %path.display(), "failed to write scratch file: {}", e);
        }
    }

    tracing::debug!(dir = %dir.display(), "wrote scratch artifacts");
    Some(dir)
}
