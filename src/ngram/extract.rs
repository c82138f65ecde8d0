//! Corpus scan that produces the raw count table and the word index.

use tracing::debug;

use super::{CountTable, NgramModel, WordIndex};

/// Sentence-start marker for position `i` (most distant = START1).
pub(crate) fn start_marker(i: usize) -> String {
    format!("START{i}")
}

/// Extract all token sequences of length 0..n from a raw corpus.
///
/// The corpus is lowercased and lightly retokenized (punctuation spaced
/// out, `.` and `?` also end a sentence). Each sentence is padded with n
/// START markers and a single END marker, then every word past the padding
/// contributes one count per history length 0..n-1.
pub fn extract_ngrams(corpus: &str, order: usize) -> NgramModel {
    let text = corpus
        .to_lowercase()
        .replace('\t', "")
        .replace('-', " -")
        .replace(',', " ,")
        .replace('.', " .\n")
        .replace(';', " ;")
        .replace('?', " ?\n");

    let mut counts = CountTable::new();
    let mut index = WordIndex::new();

    for sentence in text.split('\n') {
        let tokens: Vec<&str> = sentence.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            continue;
        }

        let mut words: Vec<String> = (1..=order).map(start_marker).collect();
        words.extend(tokens.iter().map(|t| t.to_string()));
        words.push("END".to_string());

        for i in order..words.len() {
            let word = &words[i];
            index.add(word);

            for j in 0..order {
                let history = words[i - j..i].join(" ");
                counts.add(word, &history, 1.0);
            }
        }
    }

    debug!(
        order,
        words = counts.word_count(),
        "n-gram extraction finished"
    );
    NgramModel::new(order, counts, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bigrams_with_start_symbols() {
        let model = extract_ngrams("i see you", 2);
        let counts = model.counts();

        // Order-0 and order-1 histories for every word.
        assert_eq!(counts.count("i", ""), 1.0);
        assert_eq!(counts.count("i", "START2"), 1.0);
        assert_eq!(counts.count("see", "i"), 1.0);
        assert_eq!(counts.count("you", "see"), 1.0);
        assert_eq!(counts.count("END", "you"), 1.0);

        // n-token histories are never recorded.
        assert_eq!(counts.count("i", "START1 START2"), 0.0);
    }

    #[test]
    fn test_extract_builds_first_letter_index() {
        let model = extract_ngrams("i see you", 2);
        let index = model.index();
        assert_eq!(index.bucket('s').unwrap(), &["see".to_string()]);
        assert_eq!(index.bucket('y').unwrap(), &["you".to_string()]);
        assert!(index.bucket('z').is_none());
    }

    #[test]
    fn test_extract_splits_sentences_on_period() {
        let model = extract_ngrams("i see. you see", 2);
        let counts = model.counts();
        // "you" starts a fresh sentence, so its bigram history is START2.
        assert_eq!(counts.count("you", "START2"), 1.0);
        assert_eq!(counts.count("you", "see"), 0.0);
        // The period itself is a token followed by END.
        assert_eq!(counts.count(".", "see"), 1.0);
    }

    #[test]
    fn test_extract_counts_repeats() {
        let model = extract_ngrams("ha ha ha", 2);
        assert_eq!(model.counts().count("ha", "ha"), 2.0);
        assert_eq!(model.counts().count("ha", ""), 3.0);
    }

    #[test]
    fn test_extract_empty_corpus() {
        let model = extract_ngrams("", 2);
        assert!(model.counts().is_empty());
        assert!(model.index().is_empty());
    }
}
