//! Text normalisation, phrase matching, and edit-distance similarity.
//!
//! Pure functions shared by the classifier, the transfer analyzer, and the
//! skill gap generator.

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Normalise a skill name: trim, lowercase, collapse inner whitespace.
pub fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalise free text into space-separated lowercase tokens.
///
/// Characters other than alphanumerics, `+` and `#` act as separators, so
/// `"Node.js"` becomes `"node js"` and `"C++"` stays `"c++"`. The result is
/// padded with a leading and trailing space so phrase lookups can match on
/// word boundaries with a plain substring search.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '+' || c == '#' {
            out.push(c);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

/// Whether `phrase` occurs in already-normalised `haystack` on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let needle = normalize_text(phrase);
    if needle.trim().is_empty() {
        return false;
    }
    haystack.contains(&needle)
}

/// Return the phrases from `phrases` found in normalised `haystack`, in list order.
pub fn matching_phrases<'a>(haystack: &str, phrases: &'a [String]) -> Vec<&'a str> {
    phrases
        .iter()
        .filter(|p| contains_phrase(haystack, p))
        .map(String::as_str)
        .collect()
}

// ---------------------------------------------------------------------------
// Edit distance
// ---------------------------------------------------------------------------

/// Levenshtein edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalised similarity in `0.0..=1.0`: `1 - distance / max_len`.
///
/// Comparison is case-insensitive. Two empty strings are not considered
/// similar (returns 0.0).
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_skill(a);
    let b = normalize_skill(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Best similarity of `needle` against any candidate, with the winner.
///
/// Ties keep the earliest candidate so results are deterministic.
pub fn best_match<'a>(needle: &str, candidates: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = normalized_similarity(needle, candidate);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate.as_str(), score));
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalisation --

    #[test]
    fn normalize_skill_collapses_whitespace() {
        assert_eq!(normalize_skill("  Machine   Learning "), "machine learning");
    }

    #[test]
    fn normalize_text_pads_and_splits_punctuation() {
        assert_eq!(normalize_text("Node.js & React!"), " node js react ");
        assert_eq!(normalize_text("C++ / C#"), " c++ c# ");
        assert_eq!(normalize_text(""), " ");
    }

    #[test]
    fn phrase_match_respects_word_boundaries() {
        let text = normalize_text("Building trust with clients");
        assert!(!contains_phrase(&text, "rust"));
        assert!(contains_phrase(&text, "trust"));
    }

    #[test]
    fn phrase_match_handles_multiword_phrases() {
        let text = normalize_text("Intro to Machine-Learning by Andrew Ng");
        assert!(contains_phrase(&text, "machine learning"));
        assert!(!contains_phrase(&text, "deep learning"));
    }

    #[test]
    fn empty_phrase_never_matches() {
        assert!(!contains_phrase(" anything ", "   "));
    }

    #[test]
    fn matching_phrases_preserves_list_order() {
        let phrases = vec!["b c".to_string(), "a".to_string(), "z".to_string()];
        let text = normalize_text("a b c");
        assert_eq!(matching_phrases(&text, &phrases), vec!["b c", "a"]);
    }

    // -- edit distance --

    #[test]
    fn levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn similarity_is_one_for_identical_strings() {
        assert!((normalized_similarity("Python", "python") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_of_javascript_and_typescript() {
        // 4 substitutions over 10 chars.
        let s = normalized_similarity("javascript", "typescript");
        assert!((s - 0.6).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn similarity_of_empty_strings_is_zero() {
        assert_eq!(normalized_similarity("", ""), 0.0);
    }

    #[test]
    fn best_match_prefers_first_on_tie() {
        let candidates = vec!["abd".to_string(), "abe".to_string()];
        let (winner, score) = best_match("abc", &candidates).unwrap();
        assert_eq!(winner, "abd");
        assert!(score > 0.6);
    }

    #[test]
    fn best_match_of_empty_list_is_none() {
        assert!(best_match("abc", &[]).is_none());
    }
}
