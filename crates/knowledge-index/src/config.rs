//! Chunking parameters

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Window size and overlap used when splitting page text into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared by two consecutive windows
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Chunks whose trimmed length does not exceed this are discarded
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

fn default_min_chunk_chars() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            min_chunk_chars: default_min_chunk_chars(),
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, IndexError> {
        let config = Self {
            chunk_size,
            overlap,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_min_chunk_chars(mut self, min_chunk_chars: usize) -> Self {
        self.min_chunk_chars = min_chunk_chars;
        self
    }

    /// Distance between the starts of two consecutive windows
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.chunk_size == 0 {
            return Err(IndexError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(IndexError::InvalidConfig(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChunkingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step(), 800);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        assert!(ChunkingConfig::new(100, 100).is_err());
        assert!(ChunkingConfig::new(100, 150).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(100, 99).is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ChunkingConfig = serde_json::from_str(r#"{"chunk_size": 1500}"#).unwrap();
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.overlap, 200);
        assert_eq!(config.min_chunk_chars, 50);
    }
}
