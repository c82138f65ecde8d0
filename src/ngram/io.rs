//! LNNG file format: order + flat count records + index buckets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::{self, StoreError};

use super::{CountTable, NgramModel, WordIndex};

const MAGIC: &[u8; 4] = b"LNNG";
const VERSION: u8 = 1;

/// Flat serialization format for bincode. Index buckets are re-derived
/// from the first letter of each word on load, so only the word sequence
/// (bucket by bucket, first-seen order) is stored.
#[derive(Serialize, Deserialize)]
struct NgramModelData {
    order: u32,
    counts: Vec<CountRecord>,
    words: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct CountRecord {
    word: String,
    history: String,
    count: f64,
}

impl NgramModel {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut counts: Vec<CountRecord> = self
            .counts
            .iter()
            .map(|(word, history, count)| CountRecord {
                word: word.to_string(),
                history: history.to_string(),
                count,
            })
            .collect();
        // The count table iterates in hash order; sort so identical models
        // always encode to identical bytes.
        counts.sort_by(|a, b| a.word.cmp(&b.word).then_with(|| a.history.cmp(&b.history)));

        let words = self.index.all_words().map(str::to_string).collect();

        let data = NgramModelData {
            order: self.order as u32,
            counts,
            words,
        };
        store::encode(MAGIC, VERSION, &data)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let data: NgramModelData = store::decode(MAGIC, VERSION, bytes)?;

        let mut counts = CountTable::new();
        for record in &data.counts {
            counts.add(&record.word, &record.history, record.count);
        }

        let mut index = WordIndex::new();
        for word in &data.words {
            index.add(word);
        }

        Ok(Self::new(data.order as usize, counts, index))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = self.to_bytes()?;
        store::save_atomic(path, &bytes)
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
