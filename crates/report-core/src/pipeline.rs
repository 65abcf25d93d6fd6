//! End-to-end report run
//!
//! validate → generate (manifest order) → resolve → assemble. Validation
//! runs before the first service call, so malformed inputs cost nothing.

use std::collections::HashMap;

use knowledge_index::KnowledgeIndex;
use section_writer::{GenerationOutcome, GenerationService, SectionContentGenerator};

use crate::assembler::{AssembledReport, ReportAssembler, SectionRenderer};
use crate::error::AssemblyError;
use crate::manifest::{SectionManifest, SectionManifestEntry, SheetOrderEntry, SpreadsheetOrder};
use crate::resolver::resolve;
use crate::sheets::SpreadsheetPageSource;

pub struct ReportPipeline<S, P, R> {
    generator: SectionContentGenerator<S>,
    assembler: ReportAssembler<P, R>,
    knowledge: Option<KnowledgeIndex>,
}

impl<S, P, R> ReportPipeline<S, P, R>
where
    S: GenerationService,
    P: SpreadsheetPageSource,
    R: SectionRenderer,
{
    pub fn new(generator: SectionContentGenerator<S>, assembler: ReportAssembler<P, R>) -> Self {
        Self {
            generator,
            assembler,
            knowledge: None,
        }
    }

    /// Supply reference material for prompt excerpts
    pub fn with_knowledge(mut self, knowledge: KnowledgeIndex) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn generator(&self) -> &SectionContentGenerator<S> {
        &self.generator
    }

    pub fn assembler(&self) -> &ReportAssembler<P, R> {
        &self.assembler
    }

    /// Validate raw inputs, then run the report
    pub fn run(
        &self,
        order: Vec<SheetOrderEntry>,
        manifest: Vec<SectionManifestEntry>,
        dataset: &serde_json::Value,
    ) -> Result<AssembledReport, AssemblyError> {
        let manifest = SectionManifest::new(manifest)?;
        let order = SpreadsheetOrder::new(order)?;
        self.run_validated(&order, &manifest, dataset)
    }

    pub fn run_validated(
        &self,
        order: &SpreadsheetOrder,
        manifest: &SectionManifest,
        dataset: &serde_json::Value,
    ) -> Result<AssembledReport, AssemblyError> {
        tracing::info!(
            sheets = order.len(),
            sections = manifest.len(),
            "starting report run"
        );

        let outcomes = self.generate_all(manifest, dataset);
        let sequence = resolve(order, manifest);
        self.assembler.assemble(&sequence, manifest, &outcomes)
    }

    /// Generate every manifest entry, one call at a time
    pub fn generate_all(
        &self,
        manifest: &SectionManifest,
        dataset: &serde_json::Value,
    ) -> HashMap<String, GenerationOutcome> {
        let total = manifest.len();
        manifest
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                tracing::info!(
                    "[{}/{}] generating {}",
                    i + 1,
                    total,
                    entry.section_id
                );
                let outcome = self.generator.generate(
                    &entry.section_id,
                    &entry.title,
                    dataset,
                    self.knowledge.as_ref(),
                );
                (entry.section_id.clone(), outcome)
            })
            .collect()
    }
}
