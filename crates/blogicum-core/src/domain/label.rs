//! Short display labels for records.

/// Words kept in a record label.
const LABEL_WORDS: usize = 3;

/// Keep at most `max_words` whitespace-separated words of `text`.
///
/// Text that is already short enough is returned unchanged, including its
/// original spacing.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        text.to_string()
    }
}

/// `"(<id>) <first words>"` label used in logs and listings.
pub fn short_label(id: impl std::fmt::Display, text: &str) -> String {
    format!("({}) {}", id, truncate_words(text, LABEL_WORDS))
}
