use regex::Regex;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("word pattern compiles"))
}

pub fn is_token(current: &str, min_len: usize) -> bool {
    if current.chars().count() < min_len {
        return false;
    }
    if current.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if let Some(first_char) = current.chars().next() {
        if first_char.is_ascii_digit() {
            return false;
        }
    }
    true
}

/// Splits free text into lowercase word tokens for the index.
pub fn process_text(text: &str, min_len: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|mat| mat.as_str())
        .filter(|token| is_token(token, min_len))
        .map(|token| token.to_string())
        .collect()
}
