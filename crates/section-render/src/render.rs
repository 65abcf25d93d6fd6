//! Synchronous Typst compilation to PDF

use typst::diag::{Severity, SourceDiagnostic};
use typst_pdf::PdfOptions;

use crate::error::RenderError;
use crate::markup::parse_blocks;
use crate::template::SECTION_TEMPLATE;
use crate::world::SectionWorld;

/// Compile a Typst source with the given `sys.inputs` to PDF bytes
pub fn compile_pdf(source: &str, inputs: &serde_json::Value) -> Result<Vec<u8>, RenderError> {
    let world = SectionWorld::new(source.to_string(), inputs)?;

    let warned = typst::compile(&world);
    for warning in &warned.warnings {
        tracing::debug!("typst warning: {}", warning.message);
    }

    let document = warned.output.map_err(|diagnostics| {
        RenderError::Compile(error_messages(&diagnostics))
    })?;

    let pdf = typst_pdf::pdf(&document, &PdfOptions::default())
        .map_err(|diagnostics| RenderError::Export(error_messages(&diagnostics).join("; ")))?;

    tracing::debug!(pages = document.pages.len(), bytes = pdf.len(), "compiled PDF");
    Ok(pdf)
}

fn error_messages(diagnostics: &[SourceDiagnostic]) -> Vec<String> {
    let messages: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| {
            if d.hints.is_empty() {
                d.message.to_string()
            } else {
                let hints: Vec<String> = d.hints.iter().map(|h| h.to_string()).collect();
                format!("{} (hint: {})", d.message, hints.join("; "))
            }
        })
        .collect();

    if messages.is_empty() {
        vec!["compilation failed with unknown error".to_string()]
    } else {
        messages
    }
}

/// Renders a generated section body under a title heading
#[derive(Debug, Clone, Copy, Default)]
pub struct TypstSectionRenderer;

impl TypstSectionRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_section(&self, title: &str, body: &str) -> Result<Vec<u8>, RenderError> {
        let blocks = parse_blocks(body);
        let inputs = serde_json::json!({
            "title": title,
            "blocks": serde_json::to_value(&blocks)?,
        });

        tracing::debug!(%title, blocks = blocks.len(), "rendering section");
        compile_pdf(SECTION_TEMPLATE, &inputs)
    }
}
