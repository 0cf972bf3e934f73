//! Text relevance scoring
//!
//! Scores how well a display field matches a query on a 0..=100 scale. The
//! first matching rule wins:
//!
//! | Rule | Score |
//! |---|---|
//! | equal (case-insensitive) | 100 |
//! | text starts with query | 80 |
//! | query is a whole word in text | 60 |
//! | query is a substring of text | 40 |
//! | otherwise | normalized Levenshtein similarity, as a percentage |

/// Score for a case-insensitive exact match
pub const EXACT: u8 = 100;
/// Score when the text starts with the query
pub const PREFIX: u8 = 80;
/// Score when the query is a space-delimited word of the text
pub const WHOLE_WORD: u8 = 60;
/// Score when the query appears anywhere in the text
pub const SUBSTRING: u8 = 40;

/// Score `text` against `query`
///
/// An empty query scores 0 against anything but an empty text.
pub fn score(text: &str, query: &str) -> u8 {
    let text = text.to_lowercase();
    let query = query.to_lowercase();

    if query.is_empty() {
        return if text.is_empty() { EXACT } else { 0 };
    }

    if text == query {
        EXACT
    } else if text.starts_with(&query) {
        PREFIX
    } else if contains_word(&text, &query) {
        WHOLE_WORD
    } else if text.contains(&query) {
        SUBSTRING
    } else {
        similarity(&text, &query)
    }
}

/// `query` occurs in `text` bounded by spaces or the string edges
fn contains_word(text: &str, query: &str) -> bool {
    text.match_indices(query).any(|(start, _)| {
        let end = start + query.len();
        let left_ok = start == 0 || text[..start].ends_with(' ');
        let right_ok = end == text.len() || text[end..].starts_with(' ');
        left_ok && right_ok
    })
}

fn similarity(text: &str, query: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(text, query);
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
