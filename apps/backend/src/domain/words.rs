//! Word source for board generation.

use std::collections::HashSet;
use std::path::Path;

const BUILTIN_WORDS: &str = include_str!("../../data/words.txt");

/// Deduplicated, lowercased words in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    /// The list shipped with the binary.
    pub fn builtin() -> Self {
        Self::from_text(BUILTIN_WORDS)
    }

    /// One word per line; blank lines are skipped and repeats dropped.
    pub fn from_text(text: &str) -> Self {
        let mut seen = HashSet::new();
        let words = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .filter(|word| seen.insert(word.clone()))
            .collect();
        Self { words }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WordPool {
    fn default() -> Self {
        Self::builtin()
    }
}
