//! Narrative section generation
//!
//! Turns a section identifier plus a numeric dataset into report text by
//! calling an external text-generation service. Failures never abort the
//! caller: they come back as [`GenerationOutcome::Failed`] carrying a
//! placeholder that the report can still render.
//!
//! Calls are strictly sequential and separated by a blocking cooldown, since
//! the upstream services enforce request-rate limits.

pub mod error;
pub mod generator;
pub mod http;
pub mod prompt;
pub mod service;
pub mod templates;

pub use error::{ServiceError, ServiceErrorKind};
pub use generator::{GenerationOutcome, GeneratorConfig, SectionContentGenerator};
pub use http::{ChatCompletionsService, Provider, ServiceConfig};
pub use prompt::build_prompt;
pub use service::GenerationService;
pub use templates::{section_template, SectionTemplate, SECTION_TEMPLATES};

#[cfg(any(test, feature = "mock"))]
pub use service::ScriptedService;
