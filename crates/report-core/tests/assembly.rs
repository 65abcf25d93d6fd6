//! Assembly tests: ordering, degradation and blank-page removal

mod common;

use std::collections::HashMap;

use common::{page_labels, pdf_with_pages, FakeRenderer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use report_core::{
    merge_artifacts, resolve, AssemblyError, AssemblyOptions, InMemorySheetSource, PageArtifact,
    ReportAssembler, SectionAnchor, SectionManifest, SectionManifestEntry, SheetOrderEntry,
    SpreadsheetOrder,
};
use section_writer::{GenerationOutcome, ServiceError};

fn sheets(names: &[&str]) -> InMemorySheetSource {
    names.iter().fold(InMemorySheetSource::new(), |source, name| {
        source.with_page(*name, pdf_with_pages(&[Some(name)]))
    })
}

fn order(names: &[&str]) -> SpreadsheetOrder {
    SpreadsheetOrder::new(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| SheetOrderEntry::new(*n, i as u32 + 1))
            .collect(),
    )
    .unwrap()
}

fn generated(ids: &[&str]) -> HashMap<String, GenerationOutcome> {
    ids.iter()
        .map(|id| (id.to_string(), GenerationOutcome::Generated(format!("Body of {}", id))))
        .collect()
}

fn scenario_manifest() -> SectionManifest {
    SectionManifest::new(vec![
        SectionManifestEntry::new("intro", "intro", SectionAnchor::AfterSheet("Cover".into())),
        SectionManifestEntry::new("detail", "detail", SectionAnchor::AfterSection("intro".into())),
        SectionManifestEntry::new("wrap", "wrap", SectionAnchor::AtEnd),
    ])
    .unwrap()
}

#[test]
fn test_report_follows_resolved_order() {
    let manifest = scenario_manifest();
    let sequence = resolve(&order(&["Cover", "Summary"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover", "Summary"]),
        FakeRenderer::default(),
        AssemblyOptions::default(),
    );

    let report = assembler
        .assemble(&sequence, &manifest, &generated(&["intro", "detail", "wrap"]))
        .unwrap();

    // Each rendered section carries a blank separator page that is dropped
    assert_eq!(
        page_labels(&report.document),
        vec!["Cover", "intro", "detail", "Summary", "wrap"]
    );
    assert_eq!(report.page_count, 5);
    assert_eq!(report.diagnostics.blank_pages_dropped, 3);
    assert_eq!(report.diagnostics.sections_rendered, 3);
    assert_eq!(report.diagnostics.sheets_rendered, 2);
    assert!(!report.diagnostics.is_degraded());
}

#[test]
fn test_missing_sheet_anchor_lands_at_end() {
    let manifest = SectionManifest::new(vec![
        SectionManifestEntry::new("lost", "lost", SectionAnchor::AfterSheet("Nonexistent".into())),
        SectionManifestEntry::new("wrap", "wrap", SectionAnchor::AtEnd),
    ])
    .unwrap();
    let sequence = resolve(&order(&["Cover", "Summary"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover", "Summary"]),
        FakeRenderer::default(),
        AssemblyOptions::default(),
    );

    let report = assembler
        .assemble(&sequence, &manifest, &generated(&["lost", "wrap"]))
        .unwrap();

    assert_eq!(
        page_labels(&report.document),
        vec!["Cover", "Summary", "wrap", "lost"]
    );
    assert_eq!(report.diagnostics.unpositioned_sections, vec!["lost".to_string()]);
}

#[test]
fn test_missing_sheet_page_is_skipped() {
    let manifest = SectionManifest::new(vec![]).unwrap();
    let sequence = resolve(&order(&["Cover", "Ratios", "Summary"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover", "Summary"]),
        FakeRenderer::default(),
        AssemblyOptions::default(),
    );

    let report = assembler
        .assemble(&sequence, &manifest, &HashMap::new())
        .unwrap();

    assert_eq!(page_labels(&report.document), vec!["Cover", "Summary"]);
    assert_eq!(report.diagnostics.missing_sheets, vec!["Ratios".to_string()]);
    assert!(report.diagnostics.is_degraded());
}

#[test]
fn test_failed_generation_renders_placeholder() {
    let manifest = scenario_manifest();
    let sequence = resolve(&order(&["Cover"]), &manifest);
    let mut outcomes = generated(&["intro", "wrap"]);
    outcomes.insert(
        "detail".into(),
        GenerationOutcome::failed(ServiceError::timeout("no response")),
    );

    let renderer = FakeRenderer::default();
    let assembler = ReportAssembler::new(sheets(&["Cover"]), renderer, AssemblyOptions::default());
    let report = assembler.assemble(&sequence, &manifest, &outcomes).unwrap();

    assert_eq!(report.page_count, 4);
    assert_eq!(report.diagnostics.failed_generations.len(), 1);
    assert_eq!(report.diagnostics.failed_generations[0].section_id, "detail");
}

#[test]
fn test_render_failure_degrades_to_missing_page() {
    let manifest = scenario_manifest();
    let sequence = resolve(&order(&["Cover"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover"]),
        FakeRenderer::failing_on(&["detail"]),
        AssemblyOptions::default(),
    );

    let report = assembler
        .assemble(&sequence, &manifest, &generated(&["intro", "detail", "wrap"]))
        .unwrap();

    assert_eq!(page_labels(&report.document), vec!["Cover", "intro", "wrap"]);
    assert_eq!(report.diagnostics.failed_renders, vec!["detail".to_string()]);
}

#[test]
fn test_scratch_directory_cleaned_up() {
    let scratch = tempfile::tempdir().unwrap();
    let manifest = scenario_manifest();
    let sequence = resolve(&order(&["Cover"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover"]),
        FakeRenderer::default(),
        AssemblyOptions {
            scratch_dir: Some(scratch.path().to_path_buf()),
            drop_blank_pages: true,
        },
    );

    assembler
        .assemble(&sequence, &manifest, &generated(&["intro", "detail", "wrap"]))
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_nothing_to_show_is_empty_document() {
    let manifest = SectionManifest::new(vec![]).unwrap();
    let sequence = resolve(&order(&["Cover"]), &manifest);
    let assembler = ReportAssembler::new(
        InMemorySheetSource::new(),
        FakeRenderer::default(),
        AssemblyOptions::default(),
    );

    let result = assembler.assemble(&sequence, &manifest, &HashMap::new());
    assert!(matches!(result, Err(AssemblyError::EmptyDocument)));
}

#[test]
fn test_write_to_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = SectionManifest::new(vec![]).unwrap();
    let sequence = resolve(&order(&["Cover"]), &manifest);
    let assembler = ReportAssembler::new(
        sheets(&["Cover"]),
        FakeRenderer::default(),
        AssemblyOptions::default(),
    );
    let report = assembler
        .assemble(&sequence, &manifest, &HashMap::new())
        .unwrap();

    let path = dir.path().join("out").join("report.pdf");
    report.write_to(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), report.document);
}

// ============================================================
// Blank-page removal
// ============================================================

/// Pages per artifact: `true` carries text, `false` is blank
fn page_layout() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 1..5), 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn blank_pages_removed_in_order(layout in page_layout()) {
        let mut expected = Vec::new();
        let mut total = 0;
        let artifacts: Vec<PageArtifact> = layout
            .iter()
            .enumerate()
            .map(|(a, pages)| {
                let labels: Vec<Option<String>> = pages
                    .iter()
                    .enumerate()
                    .map(|(p, &has_text)| has_text.then(|| format!("A{}P{}", a, p)))
                    .collect();
                total += labels.len();
                expected.extend(labels.iter().flatten().cloned());
                let refs: Vec<Option<&str>> = labels.iter().map(|l| l.as_deref()).collect();
                PageArtifact::from_pdf(format!("artifact {}", a), pdf_with_pages(&refs))
            })
            .collect();

        match merge_artifacts(&artifacts, true) {
            Ok(outcome) => {
                prop_assert_eq!(outcome.page_count, expected.len());
                prop_assert_eq!(outcome.pages_dropped, total - expected.len());
                prop_assert_eq!(page_labels(&outcome.document), expected);
            }
            Err(AssemblyError::EmptyDocument) => prop_assert!(expected.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
