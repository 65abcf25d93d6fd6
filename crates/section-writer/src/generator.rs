//! Per-section generation with placeholder degradation

use std::time::Duration;

use knowledge_index::KnowledgeIndex;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::prompt::build_prompt;
use crate::service::GenerationService;
use crate::templates;

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_max_prompt_chars() -> usize {
    8000
}

fn default_use_knowledge() -> bool {
    true
}

fn default_knowledge_top_k() -> usize {
    5
}

/// Generation settings, loadable from the `[generation]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Blocking pause before every service call
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    /// Include reference excerpts when a knowledge index is supplied
    #[serde(default = "default_use_knowledge")]
    pub use_knowledge: bool,
    #[serde(default = "default_knowledge_top_k")]
    pub knowledge_top_k: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            max_prompt_chars: default_max_prompt_chars(),
            use_knowledge: default_use_knowledge(),
            knowledge_top_k: default_knowledge_top_k(),
        }
    }
}

impl GeneratorConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Set the cooldown; durations beyond `u64::MAX` milliseconds saturate
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Result of generating one section
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(String),
    /// The service failed; `placeholder` is rendered in place of the body
    Failed {
        error: ServiceError,
        placeholder: String,
    },
}

impl GenerationOutcome {
    pub fn failed(error: ServiceError) -> Self {
        let placeholder = format!("[Content generation failed: {}]", error.kind);
        GenerationOutcome::Failed { error, placeholder }
    }

    /// Body text to render, which is the placeholder on failure
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::Failed { placeholder, .. } => placeholder,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GenerationOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Produces section text through a [`GenerationService`]
pub struct SectionContentGenerator<S> {
    service: S,
    config: GeneratorConfig,
}

impl<S: GenerationService> SectionContentGenerator<S> {
    pub fn new(service: S) -> Self {
        Self::with_config(service, GeneratorConfig::default())
    }

    pub fn with_config(service: S, config: GeneratorConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Generate text for one section
    ///
    /// Sleeps the configured cooldown, then calls the service exactly once.
    /// Service failures are folded into [`GenerationOutcome::Failed`].
    pub fn generate(
        &self,
        section_id: &str,
        title: &str,
        dataset: &serde_json::Value,
        knowledge: Option<&KnowledgeIndex>,
    ) -> GenerationOutcome {
        let references = match knowledge {
            Some(index) if self.config.use_knowledge => {
                let query = templates::search_query(section_id);
                index.search(&query, self.config.knowledge_top_k)
            }
            _ => Vec::new(),
        };

        let prompt = build_prompt(
            section_id,
            title,
            dataset,
            &references,
            self.config.max_prompt_chars,
        );

        tracing::debug!(
            section_id,
            references = references.len(),
            prompt_chars = prompt.chars().count(),
            "requesting section content"
        );

        let cooldown = self.config.cooldown();
        if !cooldown.is_zero() {
            std::thread::sleep(cooldown);
        }

        match self.service.invoke(&prompt) {
            Ok(text) => {
                tracing::info!(section_id, chars = text.len(), "section generated");
                GenerationOutcome::Generated(text)
            }
            Err(error) => {
                tracing::warn!(
                    section_id,
                    service = self.service.name(),
                    kind = %error.kind,
                    "section generation failed: {}",
                    error.message
                );
                GenerationOutcome::failed(error)
            }
        }
    }
}
