//! Report ordering and assembly
//!
//! Takes a spreadsheet backbone (sheet PDFs in a fixed order) and a manifest
//! of generated sections anchored to sheets, to other sections or to the
//! end, and produces one merged PDF:
//!
//! - [`manifest`]: validated inputs
//! - [`resolver`]: anchor resolution into a final page order
//! - [`sheets`]: spreadsheet page lookup
//! - [`assembler`] and [`merge`]: rendering, blank-page removal and merging
//! - [`pipeline`]: the whole run, generation included

pub mod artifact;
pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod resolver;
pub mod sheets;

pub use artifact::PageArtifact;
pub use assembler::{AssembledReport, AssemblyOptions, ReportAssembler, SectionRenderer};
pub use config::{ReportConfig, ServiceSettings};
pub use diagnostics::{FailedGeneration, RunDiagnostics};
pub use error::AssemblyError;
pub use manifest::{
    SectionAnchor, SectionManifest, SectionManifestEntry, SheetOrderEntry, SpreadsheetOrder,
};
pub use merge::{merge_artifacts, page_has_text, MergeOutcome};
pub use pipeline::ReportPipeline;
pub use resolver::{resolve, ResolvedEntry, ResolvedSequence};
pub use sheets::{
    find_sheet_match, DirectorySheetSource, InMemorySheetSource, SheetNotFound,
    SpreadsheetPageSource,
};
