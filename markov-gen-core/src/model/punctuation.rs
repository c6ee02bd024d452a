use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Default sentence-terminal marks.
pub const DEFAULT_TERMINALS: [char; 3] = ['.', '?', '!'];

/// Characters the cleaning pass rewrites or removes; they can never be terminals.
const RESERVED: [char; 5] = ['*', '(', ')', '"', '\''];

/// Returns `true` if `token` is exactly one default terminal mark.
pub fn is_terminal_punctuation(token: &str) -> bool {
	let mut chars = token.chars();
	matches!((chars.next(), chars.next()), (Some(c), None) if DEFAULT_TERMINALS.contains(&c))
}

/// The set of sentence-terminal punctuation marks.
///
/// A terminal mark ends a sentence during training and generation, and is
/// always emitted by the tokenizer as a token of its own.
///
/// # Invariants
/// - The set is never empty
/// - No mark is whitespace or a character handled by the cleaning pass
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Punctuation {
	marks: Vec<char>,
}

impl Default for Punctuation {
	fn default() -> Self {
		Self { marks: DEFAULT_TERMINALS.to_vec() }
	}
}

impl Punctuation {
	/// Builds a custom terminal set.
	///
	/// # Errors
	/// Returns `InvalidPunctuation` if `marks` is empty, or contains whitespace
	/// or one of `*()"'`.
	pub fn new(marks: &str) -> Result<Self> {
		let mut set: Vec<char> = Vec::new();
		for c in marks.chars() {
			if c.is_whitespace() || RESERVED.contains(&c) {
				return Err(ChainError::InvalidPunctuation(format!("'{}' cannot be a terminal mark", c)));
			}
			if !set.contains(&c) {
				set.push(c);
			}
		}
		if set.is_empty() {
			return Err(ChainError::InvalidPunctuation("set is empty".to_owned()));
		}
		Ok(Self { marks: set })
	}

	/// Returns `true` if `c` is one of the terminal marks.
	pub fn contains(&self, c: char) -> bool {
		self.marks.contains(&c)
	}

	/// Returns `true` if `token` is a single terminal mark.
	pub fn is_terminal(&self, token: &str) -> bool {
		let mut chars = token.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => self.contains(c),
			_ => false,
		}
	}

	/// Returns `true` if any token of `tokens` is a terminal mark.
	pub fn any_terminal<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
		tokens.iter().any(|t| self.is_terminal(t.as_ref()))
	}

	pub fn marks(&self) -> &[char] {
		&self.marks
	}
}
