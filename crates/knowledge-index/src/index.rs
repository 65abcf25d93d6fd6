//! Keyword index over reference chunks
//!
//! The knowledge base maps each source id to its chunks. It is built once at
//! pipeline start (or loaded from a snapshot) and only read afterwards.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::{clean_text, split_page, Chunk, PageText};
use crate::config::ChunkingConfig;
use crate::error::IndexError;
use crate::sections::{extract_sections, DocumentSection};

/// Everything kept for one reference source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub chunks: Vec<Chunk>,
    pub page_count: usize,
    /// Cleaned text of every page that had any
    #[serde(default)]
    pub pages: Vec<PageText>,
    #[serde(default)]
    pub sections: Vec<DocumentSection>,
}

/// Persistable knowledge base
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub sources: BTreeMap<String, SourceEntry>,
    pub total_chunks: usize,
    pub total_pages: usize,
    /// Next chunk id to hand out; ids are unique across all sources
    #[serde(default)]
    pub next_chunk_id: u64,
}

impl KnowledgeBase {
    fn recount(&mut self) {
        self.total_chunks = self.sources.values().map(|s| s.chunks.len()).sum();
        self.total_pages = self.sources.values().map(|s| s.page_count).sum();
    }
}

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Number of distinct query terms found in the chunk
    pub score: usize,
    /// `score` divided by the number of distinct query terms
    pub match_ratio: f32,
}

/// Aggregate counters reported after ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub sources: usize,
    pub total_pages: usize,
    pub total_chunks: usize,
}

/// Ingests reference pages and answers keyword-relevance queries
#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    config: ChunkingConfig,
    base: KnowledgeBase,
}

impl KnowledgeIndex {
    pub fn new(config: ChunkingConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self {
            config,
            base: KnowledgeBase::default(),
        })
    }

    /// Wrap an existing knowledge base (e.g. one loaded from a snapshot)
    pub fn from_knowledge_base(
        config: ChunkingConfig,
        base: KnowledgeBase,
    ) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self { config, base })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.base
    }

    pub fn is_empty(&self) -> bool {
        self.base.total_chunks == 0
    }

    /// Clean, chunk and store the pages of one source
    ///
    /// Pages that clean down to nothing contribute zero chunks. Ingesting an
    /// already known source id replaces its previous chunks.
    pub fn ingest(&mut self, source_id: &str, pages: &[PageText]) -> usize {
        let mut chunks = Vec::new();
        let mut cleaned_pages = Vec::new();

        for page in pages {
            let cleaned = clean_text(&page.raw_text);
            if cleaned.is_empty() {
                tracing::debug!(source_id, page = page.page_number, "page has no text");
                continue;
            }
            let page_chunks = split_page(
                source_id,
                page.page_number,
                &cleaned,
                &self.config,
                self.base.next_chunk_id,
            );
            self.base.next_chunk_id += page_chunks.len() as u64;
            chunks.extend(page_chunks);
            cleaned_pages.push(PageText::new(page.page_number, cleaned));
        }

        let sections = extract_sections(pages);

        let added = chunks.len();
        let replaced = self.base.sources.insert(
            source_id.to_string(),
            SourceEntry {
                chunks,
                page_count: pages.len(),
                pages: cleaned_pages,
                sections,
            },
        );
        if replaced.is_some() {
            tracing::info!(source_id, "replaced previously ingested source");
        }
        self.base.recount();

        tracing::info!(
            source_id,
            pages = pages.len(),
            chunks = added,
            "ingested reference source"
        );
        added
    }

    /// Read a PDF from disk and ingest its pages
    pub fn ingest_pdf(&mut self, source_id: &str, path: &Path) -> Result<usize, IndexError> {
        let pages = crate::pdf::read_pdf_pages(source_id, path)?;
        Ok(self.ingest(source_id, &pages))
    }

    /// Rank chunks by the number of query terms they contain
    ///
    /// Ties on score are broken by match ratio, then by chunk id, so the
    /// result is fully deterministic.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let terms: BTreeSet<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() || top_k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .base
            .sources
            .values()
            .flat_map(|source| source.chunks.iter())
            .filter_map(|chunk| {
                let haystack = chunk.text.to_lowercase();
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score > 0).then(|| SearchHit {
                    chunk: chunk.clone(),
                    score,
                    match_ratio: score as f32 / terms.len() as f32,
                })
            })
            .collect();

        hits.sort_by(compare_hits);
        hits.truncate(top_k);
        hits
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            sources: self.base.sources.len(),
            total_pages: self.base.total_pages,
            total_chunks: self.base.total_chunks,
        }
    }

    /// Cleaned page texts of one source, in page order
    pub fn full_text(&self, source_id: &str) -> Option<String> {
        self.base.sources.get(source_id).map(|source| {
            source
                .pages
                .iter()
                .map(|p| p.raw_text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
    }

    /// Headed sections detected in one source
    pub fn sections(&self, source_id: &str) -> Option<&[DocumentSection]> {
        self.base
            .sources
            .get(source_id)
            .map(|source| source.sections.as_slice())
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), IndexError> {
        let json = serde_json::to_string_pretty(&self.base)?;
        fs::write(path, json).map_err(|e| IndexError::unavailable(path.display().to_string(), e))?;
        tracing::info!(path = %path.display(), "knowledge base snapshot saved");
        Ok(())
    }

    pub fn load_snapshot(config: ChunkingConfig, path: &Path) -> Result<Self, IndexError> {
        let source_id = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| IndexError::unavailable(&source_id, e))?;
        let mut base: KnowledgeBase =
            serde_json::from_str(&json).map_err(|e| IndexError::unavailable(&source_id, e))?;
        base.recount();

        tracing::info!(
            path = %path.display(),
            chunks = base.total_chunks,
            pages = base.total_pages,
            "knowledge base snapshot loaded"
        );
        Self::from_knowledge_base(config, base)
    }
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.match_ratio.total_cmp(&a.match_ratio))
        .then_with(|| a.chunk.id.cmp(&b.chunk.id))
}
