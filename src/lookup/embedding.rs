//! Text embedding files: one `word f1 f2 ... fd` line per word.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Fixed-dimension word vectors, kept in file order.
///
/// File order matters: the similarity builder scans words in this order,
/// which pins down tie-breaking in the ranked lists.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    words: Vec<String>,
    vectors: Vec<Vec<f64>>,
    positions: HashMap<String, usize>,
}

impl EmbeddingTable {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            words: Vec::new(),
            vectors: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn load(path: &Path, dim: usize) -> Result<Self, EmbeddingError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, dim)
    }

    /// Parse embedding text. A line with the wrong field count or a
    /// non-numeric component fails the whole file; no partial vectors.
    pub fn parse(text: &str, dim: usize) -> Result<Self, EmbeddingError> {
        let mut table = Self::new(dim);

        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split(' ');
            let word = fields.next().unwrap_or_default();
            if word.is_empty() {
                return Err(EmbeddingError::Parse {
                    line: idx + 1,
                    reason: "missing word".to_string(),
                });
            }

            let mut vector = Vec::with_capacity(dim);
            for field in fields {
                let value: f64 = field.trim_end().parse().map_err(|_| EmbeddingError::Parse {
                    line: idx + 1,
                    reason: format!("non-numeric component {field:?}"),
                })?;
                vector.push(value);
            }
            if vector.len() != dim {
                return Err(EmbeddingError::Parse {
                    line: idx + 1,
                    reason: format!("expected {dim} components, found {}", vector.len()),
                });
            }

            table.insert(word, vector);
        }
        Ok(table)
    }

    pub fn insert(&mut self, word: &str, vector: Vec<f64>) {
        debug_assert_eq!(vector.len(), self.dim);
        if let Some(&pos) = self.positions.get(word) {
            self.vectors[pos] = vector;
        } else {
            self.positions.insert(word.to_string(), self.words.len());
            self.words.push(word.to_string());
            self.vectors.push(vector);
        }
    }

    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.positions
            .get(word)
            .map(|&pos| self.vectors[pos].as_slice())
    }

    /// Iterate (word, vector) pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.words
            .iter()
            .zip(&self.vectors)
            .map(|(w, v)| (w.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}
