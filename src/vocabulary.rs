use crate::error::PipelineError;
use std::collections::HashSet;
use std::path::Path;

/// Supplementary word list, one normalized word per line
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InitializationError(format!(
                "Failed to read vocabulary {:?}: {}",
                path, e
            ))
        })?;
        let vocabulary = Self::from_lines(&contents);
        tracing::info!("Loaded {} vocabulary words from {:?}", vocabulary.len(), path);
        Ok(vocabulary)
    }

    pub fn from_lines(contents: &str) -> Self {
        let words = contents
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        Self { words }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
