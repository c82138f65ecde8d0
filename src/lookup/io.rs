//! LNLK file format for the similarity lookup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::{self, StoreError};

use super::{RankedList, SimilarityLookup};

const MAGIC: &[u8; 4] = b"LNLK";
const VERSION: u8 = 1;

/// Flat serialization format for bincode; only filled slots are stored.
#[derive(Serialize, Deserialize)]
struct LookupData {
    entries: Vec<LookupRecord>,
}

#[derive(Serialize, Deserialize)]
struct LookupRecord {
    word: String,
    candidates: Vec<CandidateRecord>,
}

#[derive(Serialize, Deserialize)]
struct CandidateRecord {
    word: String,
    score: f64,
}

impl SimilarityLookup {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut entries: Vec<LookupRecord> = self
            .lists
            .iter()
            .map(|(word, list)| LookupRecord {
                word: word.clone(),
                candidates: list
                    .entries()
                    .map(|(candidate, score)| CandidateRecord {
                        word: candidate.to_string(),
                        score,
                    })
                    .collect(),
            })
            .collect();
        // Hash order is not stable across runs; sort by word so identical
        // lookups always encode to identical bytes.
        entries.sort_by(|a, b| a.word.cmp(&b.word));
        store::encode(MAGIC, VERSION, &LookupData { entries })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let data: LookupData = store::decode(MAGIC, VERSION, bytes)?;
        let mut lookup = Self::default();
        for record in data.entries {
            let list: &mut RankedList = lookup.lists.entry(record.word).or_default();
            // Candidates were saved best-first; re-inserting in that order
            // reproduces the original slots, ties included.
            for candidate in record.candidates {
                list.insert(&candidate.word, candidate.score);
            }
        }
        Ok(lookup)
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

#[cfg(test)]
mod tests {
    use super::super::{build_lookup, EmbeddingTable};
    use super::*;

    #[test]
    fn test_save_and_open_round_trip() {
        let canonical = EmbeddingTable::parse("you 1.0 0.1\nbefore 0.1 1.0\n", 2).unwrap();
        let unnormalized = EmbeddingTable::parse("u 0.9 0.1\nb4 0.1 0.9\n", 2).unwrap();
        let lookup = build_lookup(&canonical, &unnormalized);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookup.lnlk");
        lookup.save(&path).unwrap();
        let loaded = SimilarityLookup::open(&path).unwrap();

        assert_eq!(loaded.len(), lookup.len());
        for (word, list) in lookup.iter() {
            let original: Vec<(&str, f64)> = list.entries().collect();
            let reloaded: Vec<(&str, f64)> =
                loaded.get(word).unwrap().entries().collect();
            assert_eq!(original, reloaded, "lists differ for {word}");
        }
    }

    #[test]
    fn test_to_bytes_is_deterministic() {
        let canonical = EmbeddingTable::parse("you 1.0 0.1\nbefore 0.1 1.0\n", 2).unwrap();
        let unnormalized = EmbeddingTable::parse("u 0.9 0.1\nb4 0.1 0.9\n", 2).unwrap();
        // Two builds populate the hash map in different hash orders; the
        // encoded bytes must still match.
        let a = build_lookup(&canonical, &unnormalized);
        let b = build_lookup(&canonical, &unnormalized);
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_open_rejects_wrong_magic() {
        // An LNNG body is not an LNLK body.
        let model = crate::ngram::extract_ngrams("i see you", 2);
        let bytes = model.to_bytes().unwrap();
        assert!(matches!(
            SimilarityLookup::from_bytes(&bytes),
            Err(StoreError::InvalidMagic)
        ));
    }
}
