//! Knowledge index for reference documents
//!
//! This crate provides:
//! - Text cleaning and overlapping chunking of reference pages
//! - Deterministic keyword-overlap search over the chunks
//! - JSON snapshots of the knowledge base
//! - Heading-based section extraction
//!
//! Scoring is plain keyword overlap so that results are reproducible for a
//! fixed knowledge base and query.

pub mod chunk;
pub mod config;
pub mod error;
pub mod index;
pub mod pdf;
pub mod sections;

pub use chunk::{clean_text, split_page, Chunk, PageText};
pub use config::ChunkingConfig;
pub use error::IndexError;
pub use index::{IndexStats, KnowledgeBase, KnowledgeIndex, SearchHit, SourceEntry};
pub use sections::{extract_sections, DocumentSection};
