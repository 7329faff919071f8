//! Confidence scoring between a cleaned local query and a provider title.

use unicode_normalization::UnicodeNormalization;

/// Similarity between the local query and a candidate title, 0–100.
///
/// Both sides are NFKC case-folded and token-sorted before comparison, so
/// the score is insensitive to case, width variants, and token order. The
/// ratio itself is normalized Levenshtein (percentage of matching
/// characters after optimal alignment). An empty candidate or query
/// scores 0.
pub fn confidence(query: &str, candidate: &str) -> f64 {
    let a = token_sort_fold(query);
    let b = token_sort_fold(candidate);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a, &b) * 100.0
}

/// NFKC-fold, lowercase, split on whitespace, sort tokens, rejoin.
fn token_sort_fold(s: &str) -> String {
    let folded = s.nfkc().collect::<String>().to_lowercase();
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(confidence("The Matrix", "The Matrix"), 100.0);
    }

    #[test]
    fn case_differences_score_100() {
        assert_eq!(confidence("the matrix", "THE MATRIX"), 100.0);
    }

    #[test]
    fn token_order_is_ignored() {
        assert_eq!(confidence("Matrix The", "The Matrix"), 100.0);
    }

    #[test]
    fn empty_candidate_scores_0() {
        assert_eq!(confidence("The Matrix", ""), 0.0);
    }

    #[test]
    fn empty_query_scores_0() {
        assert_eq!(confidence("", "The Matrix"), 0.0);
        assert_eq!(confidence("", ""), 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        let pairs = [
            ("a", "completely different thing"),
            ("the matrix", "matrix reloaded"),
            ("x", "x"),
            ("some long title here", "short"),
        ];
        for (a, b) in pairs {
            let s = confidence(a, b);
            assert!((0.0..=100.0).contains(&s), "{a:?} vs {b:?} scored {s}");
        }
    }

    #[test]
    fn single_edit_ratio() {
        // "abc" vs "axc": one substitution over length 3.
        let s = confidence("abc", "axc");
        assert!((s - 66.666).abs() < 0.1, "got {s}");
    }

    #[test]
    fn extra_token_lowers_score() {
        // Sorted: "matrix the" vs "abc matrix the" — 4 edits over 14 chars.
        let s = confidence("The Matrix", "abc matrix the");
        assert!((s - 71.428).abs() < 0.1, "got {s}");
    }

    #[test]
    fn unrelated_titles_score_low() {
        assert!(confidence("The Matrix", "qqq www zzz") < 30.0);
    }

    #[test]
    fn fullwidth_input_folds_to_ascii() {
        assert_eq!(confidence("ＭＡＴＲＩＸ", "matrix"), 100.0);
    }
}
