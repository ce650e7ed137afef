/// Keyword-overlap relevance scoring.
///
/// The score is the fraction of distinct query words found in the course text, plus a
/// flat bonus when the whole query appears verbatim, capped at 1.0.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Added when the lowercased query is a literal substring of the course text.
pub const PHRASE_BONUS: f32 = 0.3;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Distinct lowercase `\w+` runs of `text`.
pub fn tokenize(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Score `query` against an already projected course text. Always in `[0, 1]`.
pub fn score(query: &str, course_text: &str) -> f32 {
    let query_words = tokenize(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let course_words = tokenize(course_text);

    let common = query_words.intersection(&course_words).count();
    let mut score = common as f32 / query_words.len() as f32;

    if course_text.to_lowercase().contains(&query.to_lowercase()) {
        score += PHRASE_BONUS;
    }

    score.min(1.0)
}
