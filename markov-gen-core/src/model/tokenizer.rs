use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::punctuation::Punctuation;

/// A run of quotes, with the whitespace (or string boundary) on either side.
static QUOTE_RUN: LazyLock<Regex> = LazyLock::new(|| {
	// The pattern is a constant, compiling it cannot fail
	Regex::new(r"(\s|^)?'+(\s|$)?").unwrap()
});

/// Characters dropped once quote runs are collapsed.
const STRIPPED: [char; 4] = ['*', '(', ')', '"'];

/// Cleans raw text before tokenization.
///
/// - A quote run touching whitespace (or the start/end of the text) loses its
///   quotes and keeps the whitespace it touched.
/// - A quote run inside a word (`don't`, `dogs's`) collapses to a single `'`.
/// - Then removes `*`, `(`, `)` and `"` everywhere. A quote next to one of
///   these is not at a word boundary, so `"'Tis` keeps its apostrophe.
pub fn clean(text: &str) -> String {
	QUOTE_RUN
		.replace_all(text, |caps: &Captures| match (caps.get(1), caps.get(2)) {
			(Some(start), _) => start.as_str().to_owned(),
			(None, Some(end)) => end.as_str().to_owned(),
			(None, None) => "'".to_owned(),
		})
		.chars()
		.filter(|c| !STRIPPED.contains(c))
		.collect()
}

/// Splits cleaned text into word and terminal-punctuation tokens.
///
/// Whitespace only separates tokens. Every terminal mark becomes a token
/// of its own, wherever it appears. No token is ever empty.
pub fn split(text: &str, punctuation: &Punctuation) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut word = String::new();

	for c in text.chars() {
		if c.is_whitespace() {
			if !word.is_empty() {
				tokens.push(std::mem::take(&mut word));
			}
		} else if punctuation.contains(c) {
			if !word.is_empty() {
				tokens.push(std::mem::take(&mut word));
			}
			tokens.push(c.to_string());
		} else {
			word.push(c);
		}
	}

	if !word.is_empty() {
		tokens.push(word);
	}

	tokens
}

/// Cleans then splits `text`.
pub fn tokenize(text: &str, punctuation: &Punctuation) -> Vec<String> {
	split(&clean(text), punctuation)
}
