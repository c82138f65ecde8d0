//! String-similarity primitives for candidate reranking (Sridhar 2015).

/// Score assigned when two consonant skeletons are identical.
///
/// The ratio form of [`lex_sim`] is bounded by 1 (LCSR is at most 1 and a
/// nonzero edit distance is at least 1), so this sorts identical-skeleton
/// pairs above every regular pair instead of dividing by zero.
pub const MAX_LEX_SIM: f64 = 2.0;

/// Consonant skeleton: the word with vowels (a e i o u y) removed.
pub fn skeleton(word: &str) -> String {
    word.chars()
        .filter(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
        .collect()
}

/// Length (in chars) of the longest contiguous substring of `a` that
/// occurs anywhere in `b`. Literal containment, not an alignment LCS.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let chars: Vec<char> = a.chars().collect();
    let mut longest = 0;
    for i in 0..chars.len() {
        for j in i + 1..=chars.len() {
            if j - i <= longest {
                continue;
            }
            let needle: String = chars[i..j].iter().collect();
            if b.contains(&needle) {
                longest = j - i;
            }
        }
    }
    longest
}

/// Longest common substring ratio: shared substring length over the longer
/// word's length. `lcsr(a, a) == 1.0` for any non-empty `a`.
pub fn lcsr(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    longest_common_substring(a, b) as f64 / max_len as f64
}

/// Unit-cost Levenshtein distance (insert/delete/substitute = 1).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            row[j + 1] = substitution.min(prev[j + 1] + 1).min(row[j] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Lexical similarity: LCSR over the edit distance of the consonant
/// skeletons. Identical skeletons score [`MAX_LEX_SIM`] rather than
/// dividing by zero.
pub fn lex_sim(a: &str, b: &str) -> f64 {
    let distance = levenshtein(&skeleton(a), &skeleton(b));
    if distance == 0 {
        return MAX_LEX_SIM;
    }
    lcsr(a, b) / distance as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_drops_all_vowels() {
        assert_eq!(skeleton("before"), "bfr");
        assert_eq!(skeleton("you"), "");
        assert_eq!(skeleton("rhythm"), "rhthm");
    }

    #[test]
    fn test_longest_common_substring() {
        assert_eq!(longest_common_substring("before", "fore"), 4);
        assert_eq!(longest_common_substring("abc", "xyz"), 0);
        assert_eq!(longest_common_substring("abc", "abc"), 3);
        assert_eq!(longest_common_substring("", "abc"), 0);
    }

    #[test]
    fn test_lcsr_identity_is_one() {
        for word in ["a", "you", "before", "normalization"] {
            assert_eq!(lcsr(word, word), 1.0);
        }
    }

    #[test]
    fn test_lcsr_divides_by_longer_word() {
        // "fore" inside "before": 4 / 6.
        assert!((lcsr("fore", "before") - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn test_lex_sim_identical_skeletons_maximal() {
        // skeleton("you") == skeleton("u") == "", distance 0.
        assert_eq!(lex_sim("you", "u"), MAX_LEX_SIM);
        assert_eq!(lex_sim("before", "before"), MAX_LEX_SIM);
    }

    #[test]
    fn test_lex_sim_regular_pair_bounded_by_one() {
        let sim = lex_sim("before", "b4");
        assert!(sim >= 0.0 && sim <= 1.0);
    }
}
