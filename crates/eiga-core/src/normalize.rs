//! Filename cleaning pipeline for title search queries.
//!
//! Transforms a raw filename (plus optional caption) into the text sent to
//! the metadata provider: extension stripped, separators spaced out, junk
//! words removed, whitespace collapsed.

/// Video extensions recognized for suffix stripping.
const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "wmv"];

/// Build a search query from a filename and an optional caption.
///
/// Steps applied in order:
/// 1. Trailing video extension stripped from the filename
/// 2. Caption prepended (space-joined) when non-empty
/// 3. Underscores and dots replaced with spaces
/// 4. Junk word removal, iterated to a fixpoint
/// 5. Whitespace collapse
///
/// Always returns a string; empty input yields an empty string.
pub fn clean_query(filename: &str, caption: &str, junk_words: &[String]) -> String {
    let stem = strip_video_extension(filename);
    let combined = if caption.trim().is_empty() {
        stem.to_string()
    } else {
        format!("{caption} {stem}")
    };
    let separated = replace_separators(&combined);
    let cleaned = remove_junk_words(&separated, junk_words);
    collapse_whitespace(&cleaned)
}

// ── Step 1: extension stripping ───────────────────────────────────────

/// Strip a trailing video extension, case-insensitively.
///
/// Only a suffix match counts: "Title.mkv.torrent" keeps its name.
fn strip_video_extension(name: &str) -> &str {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)) {
            return stem;
        }
    }
    name
}

// ── Step 3: separator replacement ─────────────────────────────────────

/// Replace underscores and dots with spaces. Release names use both as
/// word separators.
fn replace_separators(s: &str) -> String {
    s.chars()
        .map(|c| if c == '_' || c == '.' { ' ' } else { c })
        .collect()
}

// ── Step 4: junk word removal ─────────────────────────────────────────

/// Remove every occurrence of every junk word, iterated until the text
/// stops changing. A single pass is not enough: removing one occurrence
/// can splice a new one together ("aabb" with junk "ab").
fn remove_junk_words(text: &str, junk_words: &[String]) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for word in junk_words {
            if !word.is_empty() {
                next = remove_all_ci(&next, word);
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Remove all non-overlapping occurrences of `word`, ASCII case-insensitive.
fn remove_all_ci(text: &str, word: &str) -> String {
    let needle: Vec<char> = word.chars().collect();
    let haystack: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < haystack.len() {
        if matches_at(&haystack, i, &needle) {
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn matches_at(haystack: &[char], pos: usize, needle: &[char]) -> bool {
    pos + needle.len() <= haystack.len()
        && haystack[pos..pos + needle.len()]
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

// ── Step 5: whitespace collapse ───────────────────────────────────────

/// Trim and collapse whitespace runs to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
