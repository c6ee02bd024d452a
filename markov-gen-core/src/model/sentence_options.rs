use super::punctuation::Punctuation;
use super::sampler::DEFAULT_MAXLEN;

/// Caller-level policy for generating sentences.
///
/// The sampler happily returns sentences cut short at `maxlen`. Callers that
/// only want complete or long enough sentences describe it here, and the
/// generator retries up to `nb_try` times to satisfy them.
///
/// # Invariants
/// - `maxlen` is always >= 1
#[derive(Clone, Debug, PartialEq)]
pub struct SentenceOptions {
	/// Maximum number of words in one sentence.
	maxlen: usize,

	/// Minimum number of words for a sentence to be accepted.
	pub min_words: usize,

	/// Only accept sentences ending with terminal punctuation.
	pub require_terminal: bool,

	/// Extra attempts when a sentence is rejected.
	pub nb_try: usize,
}

impl Default for SentenceOptions {
	fn default() -> Self {
		Self { maxlen: DEFAULT_MAXLEN, min_words: 0, require_terminal: false, nb_try: 0 }
	}
}

impl SentenceOptions {
	/// Accepts only punctuation-terminated sentences of at least `min_words`
	/// words, retrying up to `nb_try` times.
	pub fn complete(min_words: usize, nb_try: usize) -> Self {
		Self { min_words, require_terminal: true, nb_try, ..Self::default() }
	}

	pub fn maxlen(&self) -> usize {
		self.maxlen
	}

	/// Sets the maximum sentence length.
	///
	/// # Errors
	/// Returns an error if `maxlen` is 0.
	pub fn set_maxlen(&mut self, maxlen: usize) -> Result<(), String> {
		if maxlen == 0 {
			return Err("maxlen must be >= 1".to_owned());
		}
		self.maxlen = maxlen;
		Ok(())
	}

	/// Returns `true` if `sentence` satisfies this policy.
	pub fn accepts(&self, sentence: &str, punctuation: &Punctuation) -> bool {
		if self.require_terminal && !sentence.chars().last().is_some_and(|c| punctuation.contains(c)) {
			return false;
		}
		sentence.split_whitespace().count() >= self.min_words
	}
}
