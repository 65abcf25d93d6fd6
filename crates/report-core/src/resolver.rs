//! Final page ordering
//!
//! Interleaves generated sections with the spreadsheet backbone according to
//! their anchors. Placement runs in three tiers:
//!
//! 1. each sheet, followed by the sections anchored after it (manifest order)
//! 2. sections anchored at the end
//! 3. everything still unplaced, in manifest order
//!
//! and every placed section is immediately followed, depth first, by the
//! sections anchored after it. The set of placed ids is the only guard
//! against revisiting, so anchor cycles still terminate.

use std::collections::HashSet;

use serde::Serialize;

use crate::manifest::{
    normalize_name, SectionAnchor, SectionManifest, SectionManifestEntry, SpreadsheetOrder,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ResolvedEntry {
    Spreadsheet(String),
    Generated(String),
}

impl ResolvedEntry {
    pub fn name(&self) -> &str {
        match self {
            ResolvedEntry::Spreadsheet(name) | ResolvedEntry::Generated(name) => name,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, ResolvedEntry::Generated(_))
    }
}

impl std::fmt::Display for ResolvedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedEntry::Spreadsheet(name) => write!(f, "sheet:{}", name),
            ResolvedEntry::Generated(id) => write!(f, "section:{}", id),
        }
    }
}

/// Duplicate-free page order covering every sheet and every section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSequence {
    entries: Vec<ResolvedEntry>,
    /// Sections placed only by the fallback tier
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unpositioned: Vec<String>,
}

impl ResolvedSequence {
    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unpositioned(&self) -> &[String] {
        &self.unpositioned
    }

    pub fn position(&self, entry: &ResolvedEntry) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }
}

impl<'a> IntoIterator for &'a ResolvedSequence {
    type Item = &'a ResolvedEntry;
    type IntoIter = std::slice::Iter<'a, ResolvedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

struct Placement<'m> {
    manifest: &'m SectionManifest,
    placed: HashSet<&'m str>,
    entries: Vec<ResolvedEntry>,
}

impl<'m> Placement<'m> {
    fn place(&mut self, entry: &'m SectionManifestEntry) {
        if !self.placed.insert(entry.section_id.as_str()) {
            return;
        }
        self.entries
            .push(ResolvedEntry::Generated(entry.section_id.clone()));

        let manifest = self.manifest;
        for child in manifest.entries() {
            if matches!(&child.anchor, SectionAnchor::AfterSection(parent) if *parent == entry.section_id)
            {
                self.place(child);
            }
        }
    }

    fn is_placed(&self, entry: &SectionManifestEntry) -> bool {
        self.placed.contains(entry.section_id.as_str())
    }
}

/// Compute the final order of sheets and generated sections
pub fn resolve(order: &SpreadsheetOrder, manifest: &SectionManifest) -> ResolvedSequence {
    let mut placement = Placement {
        manifest,
        placed: HashSet::new(),
        entries: Vec::with_capacity(order.len() + manifest.len()),
    };

    for sheet in order.entries() {
        placement
            .entries
            .push(ResolvedEntry::Spreadsheet(sheet.sheet_name.clone()));

        let key = normalize_name(&sheet.sheet_name);
        for entry in manifest.entries() {
            if let SectionAnchor::AfterSheet(name) = &entry.anchor {
                if normalize_name(name) == key {
                    placement.place(entry);
                }
            }
        }
    }

    for entry in manifest.entries() {
        if entry.anchor == SectionAnchor::AtEnd {
            placement.place(entry);
        }
    }

    let mut unpositioned = Vec::new();
    for entry in manifest.entries() {
        if !placement.is_placed(entry) {
            tracing::warn!(
                section_id = %entry.section_id,
                anchor = ?entry.anchor,
                "anchor target not found, appending section at the end"
            );
            unpositioned.push(entry.section_id.clone());
            placement.place(entry);
        }
    }

    tracing::debug!(
        entries = placement.entries.len(),
        unpositioned = unpositioned.len(),
        "resolved page order"
    );

    ResolvedSequence {
        entries: placement.entries,
        unpositioned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{SectionManifestEntry as Entry, SheetOrderEntry};
    use pretty_assertions::assert_eq;

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

    fn labels(sequence: &ResolvedSequence) -> Vec<String> {
        sequence.iter().map(|e| e.name().to_string()).collect()
    }

    #[test]
    fn test_sections_follow_sheets_and_chains() {
        let manifest = SectionManifest::new(vec![
            Entry::new("intro", "Intro", SectionAnchor::AfterSheet("Cover".into())),
            Entry::new("detail", "Detail", SectionAnchor::AfterSection("intro".into())),
            Entry::new("wrap", "Wrap", SectionAnchor::AtEnd),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover", "Summary"]), &manifest);
        assert_eq!(
            labels(&sequence),
            vec!["Cover", "intro", "detail", "Summary", "wrap"]
        );
        assert!(sequence.unpositioned().is_empty());
    }

    #[test]
    fn test_sheet_anchor_is_case_and_space_insensitive() {
        let manifest = SectionManifest::new(vec![Entry::new(
            "swot",
            "SWOT",
            SectionAnchor::AfterSheet("  cost of PROJECT ".into()),
        )])
        .unwrap();

        let sequence = resolve(&order(&["Cover", "Cost of Project", "Ratios"]), &manifest);
        assert_eq!(labels(&sequence), vec!["Cover", "Cost of Project", "swot", "Ratios"]);
    }

    #[test]
    fn test_missing_sheet_falls_back_to_end() {
        let manifest = SectionManifest::new(vec![
            Entry::new("lost", "Lost", SectionAnchor::AfterSheet("Nonexistent".into())),
            Entry::new("wrap", "Wrap", SectionAnchor::AtEnd),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover"]), &manifest);
        assert_eq!(labels(&sequence), vec!["Cover", "wrap", "lost"]);
        assert_eq!(sequence.unpositioned(), &["lost".to_string()]);
    }

    #[test]
    fn test_unknown_section_anchor_lands_after_at_end() {
        let manifest = SectionManifest::new(vec![
            Entry::new("orphan", "Orphan", SectionAnchor::AfterSection("ghost".into())),
            Entry::new("wrap", "Wrap", SectionAnchor::AtEnd),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover"]), &manifest);
        assert_eq!(labels(&sequence), vec!["Cover", "wrap", "orphan"]);
        assert_eq!(sequence.unpositioned(), &["orphan".to_string()]);
    }

    #[test]
    fn test_anchor_cycle_terminates() {
        let manifest = SectionManifest::new(vec![
            Entry::new("a", "A", SectionAnchor::AfterSection("b".into())),
            Entry::new("b", "B", SectionAnchor::AfterSection("a".into())),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover"]), &manifest);
        assert_eq!(labels(&sequence), vec!["Cover", "a", "b"]);
    }

    #[test]
    fn test_chain_is_depth_first() {
        let manifest = SectionManifest::new(vec![
            Entry::new("root", "Root", SectionAnchor::AfterSheet("Cover".into())),
            Entry::new("child1", "C1", SectionAnchor::AfterSection("root".into())),
            Entry::new("child2", "C2", SectionAnchor::AfterSection("root".into())),
            Entry::new("grand", "G", SectionAnchor::AfterSection("child1".into())),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover", "End"]), &manifest);
        assert_eq!(
            labels(&sequence),
            vec!["Cover", "root", "child1", "grand", "child2", "End"]
        );
    }

    #[test]
    fn test_at_end_entries_keep_chains() {
        let manifest = SectionManifest::new(vec![
            Entry::new("annex", "Annex", SectionAnchor::AfterSection("closing".into())),
            Entry::new("closing", "Closing", SectionAnchor::AtEnd),
        ])
        .unwrap();

        let sequence = resolve(&order(&["Cover"]), &manifest);
        assert_eq!(labels(&sequence), vec!["Cover", "closing", "annex"]);
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(ResolvedEntry::Spreadsheet("Cover".into()).to_string(), "sheet:Cover");
        assert_eq!(ResolvedEntry::Generated("intro".into()).to_string(), "section:intro");
    }
}
