//! Validated report inputs: the section manifest and the spreadsheet order

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;

/// Placement rule for a generated section
///
/// Serialized as `{"after_sheet": "Name"}`, `{"after_section": "id"}` or
/// `"at_end"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionAnchor {
    AfterSheet(String),
    AfterSection(String),
    AtEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionManifestEntry {
    pub section_id: String,
    pub title: String,
    pub anchor: SectionAnchor,
}

impl SectionManifestEntry {
    pub fn new(
        section_id: impl Into<String>,
        title: impl Into<String>,
        anchor: SectionAnchor,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            title: title.into(),
            anchor,
        }
    }
}

/// Generated sections in manifest order, with unique ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionManifest {
    entries: Vec<SectionManifestEntry>,
}

impl SectionManifest {
    pub fn new(entries: Vec<SectionManifestEntry>) -> Result<Self, AssemblyError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.section_id.as_str()) {
                return Err(AssemblyError::DuplicateSectionId(entry.section_id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of entries and validate it
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let entries: Vec<SectionManifestEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries)?)
    }

    pub fn entries(&self) -> &[SectionManifestEntry] {
        &self.entries
    }

    pub fn get(&self, section_id: &str) -> Option<&SectionManifestEntry> {
        self.entries.iter().find(|e| e.section_id == section_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetOrderEntry {
    pub sheet_name: String,
    pub sequence_position: u32,
}

impl SheetOrderEntry {
    pub fn new(sheet_name: impl Into<String>, sequence_position: u32) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            sequence_position,
        }
    }
}

/// The report backbone, sorted by position
///
/// Positions start at 1 and are unique; sheet names are unique after
/// trimming and lower-casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetOrder {
    entries: Vec<SheetOrderEntry>,
}

impl SpreadsheetOrder {
    pub fn new(mut entries: Vec<SheetOrderEntry>) -> Result<Self, AssemblyError> {
        if entries.is_empty() {
            return Err(AssemblyError::BackboneMissing(
                "no spreadsheet order supplied".to_string(),
            ));
        }

        let firsts = entries.iter().filter(|e| e.sequence_position == 1).count();
        if firsts != 1 {
            return Err(AssemblyError::BackboneMissing(format!(
                "expected exactly one sheet at position 1, found {}",
                firsts
            )));
        }

        entries.sort_by_key(|e| e.sequence_position);

        if entries[0].sequence_position == 0 {
            return Err(AssemblyError::InvalidSheetOrder(format!(
                "sheet '{}' has position 0; positions start at 1",
                entries[0].sheet_name
            )));
        }

        for pair in entries.windows(2) {
            if pair[0].sequence_position == pair[1].sequence_position {
                return Err(AssemblyError::InvalidSheetOrder(format!(
                    "position {} is used by both '{}' and '{}'",
                    pair[0].sequence_position, pair[0].sheet_name, pair[1].sheet_name
                )));
            }
        }

        let mut names = HashSet::new();
        for entry in &entries {
            if !names.insert(normalize_name(&entry.sheet_name)) {
                return Err(AssemblyError::InvalidSheetOrder(format!(
                    "sheet '{}' appears more than once",
                    entry.sheet_name
                )));
            }
        }

        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let entries: Vec<SheetOrderEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries)?)
    }

    /// Entries in ascending position order
    pub fn entries(&self) -> &[SheetOrderEntry] {
        &self.entries
    }

    /// The mandatory first page
    pub fn first(&self) -> &SheetOrderEntry {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trim and lower-case a sheet name for comparison
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
