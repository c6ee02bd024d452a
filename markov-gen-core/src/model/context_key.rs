use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered run of `order` word tokens used to look up continuations.
///
/// Equal sequences of equal tokens are the same key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContextKey(Vec<String>);

impl ContextKey {
	pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
		Self(tokens.iter().map(|t| t.as_ref().to_owned()).collect())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn tokens(&self) -> &[String] {
		&self.0
	}

	/// Drops the first token and appends `word`, giving the next key of the walk.
	pub fn slide(&self, word: &str) -> Self {
		let mut tokens: Vec<String> = self.0.iter().skip(1).cloned().collect();
		tokens.push(word.to_owned());
		Self(tokens)
	}
}

impl From<Vec<String>> for ContextKey {
	fn from(tokens: Vec<String>) -> Self {
		Self(tokens)
	}
}

impl fmt::Display for ContextKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({})", self.0.join(", "))
	}
}
