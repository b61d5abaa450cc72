use crate::models::Recommendation;

/// Lexical patterns mapping reference words to zero-based list positions.
///
/// Evaluated strictly in this order, first match wins: ordinal words, bare
/// digits, hash-prefixed digits, cardinal words. Input containing several
/// matching keys resolves by table order, not by position in the sentence
/// (so "play 10" hits "1" before "10" when the first slot is in range).
const REFERENCE_PATTERNS: [(&str, usize); 40] = [
    ("first", 0),
    ("second", 1),
    ("third", 2),
    ("fourth", 3),
    ("fifth", 4),
    ("sixth", 5),
    ("seventh", 6),
    ("eighth", 7),
    ("ninth", 8),
    ("tenth", 9),
    ("1", 0),
    ("2", 1),
    ("3", 2),
    ("4", 3),
    ("5", 4),
    ("6", 5),
    ("7", 6),
    ("8", 7),
    ("9", 8),
    ("10", 9),
    ("#1", 0),
    ("#2", 1),
    ("#3", 2),
    ("#4", 3),
    ("#5", 4),
    ("#6", 5),
    ("#7", 6),
    ("#8", 7),
    ("#9", 8),
    ("#10", 9),
    ("one", 0),
    ("two", 1),
    ("three", 2),
    ("four", 3),
    ("five", 4),
    ("six", 5),
    ("seven", 6),
    ("eight", 7),
    ("nine", 8),
    ("ten", 9),
];

/// Whether this turn is a candidate play command.
///
/// A lexical heuristic, not a parse: any occurrence of "play" or "watch"
/// counts, but only when there are recommendations to reference.
pub fn is_play_command(user_text: &str, recent: &[Recommendation]) -> bool {
    if recent.is_empty() {
        return false;
    }
    let lowered = user_text.to_lowercase();
    lowered.contains("play") || lowered.contains("watch")
}

/// Resolves which prior recommendation the user means.
///
/// Tries the lexical position table first, then falls back to matching a
/// recommendation title as a substring of the input. Returns `None` when
/// neither applies; callers treat that as a fresh recommendation request.
pub fn resolve_reference<'a>(
    user_text: &str,
    recent: &'a [Recommendation],
) -> Option<&'a Recommendation> {
    let lowered = user_text.to_lowercase();

    for (pattern, position) in REFERENCE_PATTERNS {
        if lowered.contains(pattern) && position < recent.len() {
            tracing::info!(
                position = position + 1,
                title = %recent[position].title,
                "Resolved recommendation by position"
            );
            return Some(&recent[position]);
        }
    }

    for movie in recent {
        if lowered.contains(&movie.title.to_lowercase()) {
            tracing::info!(title = %movie.title, "Resolved recommendation by title");
            return Some(movie);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendations(titles: &[&str]) -> Vec<Recommendation> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| Recommendation {
                title: title.to_string(),
                year: Some(2000 + i as i32),
                genres: "Drama".to_string(),
                key: format!("k{}", i + 1),
                summary: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_play_command_requires_recommendations() {
        assert!(!is_play_command("play the first one", &[]));
        assert!(is_play_command(
            "play the first one",
            &recommendations(&["Up"])
        ));
    }

    #[test]
    fn test_play_command_matches_watch() {
        let recs = recommendations(&["Up"]);
        assert!(is_play_command("let's WATCH something", &recs));
        assert!(!is_play_command("tell me more", &recs));
    }

    #[test]
    fn test_ordinal_word_resolution() {
        let recs = recommendations(&["M0", "M1", "M2"]);
        let resolved = resolve_reference("play the second one", &recs).unwrap();
        assert_eq!(resolved.title, "M1");
    }

    #[test]
    fn test_hash_digit_resolution() {
        let recs = recommendations(&["M0", "M1", "M2"]);
        let resolved = resolve_reference("play #3", &recs).unwrap();
        assert_eq!(resolved.title, "M2");
    }

    #[test]
    fn test_bare_digit_resolution() {
        let recs = recommendations(&["M0", "M1", "M2"]);
        let resolved = resolve_reference("play 1", &recs).unwrap();
        assert_eq!(resolved.title, "M0");
    }

    #[test]
    fn test_table_order_decides_ambiguity() {
        // "play 10" also contains "1"; the table reaches "1" first, so the
        // first slot wins even though the user likely meant the tenth.
        let recs = recommendations(&[
            "M0", "M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "M9",
        ]);
        let resolved = resolve_reference("play 10", &recs).unwrap();
        assert_eq!(resolved.title, "M0");
    }

    #[test]
    fn test_table_mappings() {
        assert!(REFERENCE_PATTERNS.contains(&("first", 0)));
        assert!(REFERENCE_PATTERNS.contains(&("#10", 9)));
        assert!(REFERENCE_PATTERNS.contains(&("ten", 9)));
    }

    #[test]
    fn test_table_endpoints() {
        let recs = recommendations(&[
            "M0", "M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "M9",
        ]);
        assert_eq!(resolve_reference("first", &recs).unwrap().title, "M0");
        assert_eq!(resolve_reference("watch ten", &recs).unwrap().title, "M9");
        // "#10" contains "1", which the table reaches before "#10".
        assert_eq!(resolve_reference("play #10", &recs).unwrap().title, "M0");
    }

    #[test]
    fn test_out_of_range_position_not_selected() {
        // "tenth" maps to slot 9 but only three items exist; its substring
        // "ten" is equally out of range, so nothing resolves.
        let recs = recommendations(&["M0", "M1", "M2"]);
        assert!(resolve_reference("play the tenth one", &recs).is_none());
    }

    #[test]
    fn test_title_substring_fallback() {
        let recs = recommendations(&["Inception", "Up"]);
        let resolved = resolve_reference("play Up", &recs).unwrap();
        assert_eq!(resolved.key, "k2");
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let recs = recommendations(&["The Matrix"]);
        let resolved = resolve_reference("watch THE MATRIX again", &recs).unwrap();
        assert_eq!(resolved.title, "The Matrix");
    }

    #[test]
    fn test_unresolved_reference() {
        let recs = recommendations(&["Inception", "Up"]);
        assert!(resolve_reference("play something I haven't seen", &recs).is_none());
    }
}
