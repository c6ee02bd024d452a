use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::context_key::ContextKey;
use super::punctuation::Punctuation;
use super::state::State;
use super::tokenizer;
use crate::error::{ChainError, Result};

/// A word-level Markov chain of a fixed order.
///
/// The `Chain` maps every context key (`order` consecutive words) to the
/// tokens observed right after it, and remembers which keys started a
/// sentence so that generation can be seeded from them.
///
/// # Responsibilities
/// - Build the transition table and the opener list from raw text
/// - Merge with another chain of the same order
/// - Serialize to and validate from bytes
///
/// # Invariants
/// - `order` is always >= 1
/// - No key contains terminal punctuation
/// - Every state has at least one follower
/// - Every opener is a key of `states`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Chain {
	/// Number of words in one context key.
	order: usize,

	/// Keys that started a sentence, in training order (duplicates kept).
	openers: Vec<ContextKey>,

	/// Mapping from a context key to its state.
	states: HashMap<ContextKey, State>,
}

impl Chain {
	/// Creates an empty chain of the given order.
	///
	/// # Errors
	/// Returns `InvalidOrder` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(ChainError::InvalidOrder(order));
		}
		Ok(Self { order, openers: Vec::new(), states: HashMap::new() })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn openers(&self) -> &[ContextKey] {
		&self.openers
	}

	/// Number of distinct context keys.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn contains_key(&self, key: &ContextKey) -> bool {
		self.states.contains_key(key)
	}

	pub fn state(&self, key: &ContextKey) -> Option<&State> {
		self.states.get(key)
	}

	/// Observed followers of `key`, in training order.
	pub fn followers(&self, key: &ContextKey) -> Option<&[String]> {
		self.states.get(key).map(State::followers)
	}

	/// Iterates over `(key, followers)` pairs in no particular order.
	pub fn transitions(&self) -> impl Iterator<Item = (&ContextKey, &[String])> {
		self.states.iter().map(|(k, s)| (k, s.followers()))
	}

	/// Tokenizes `text` and trains the chain with it.
	///
	/// Can be called multiple times; every call only adds entries.
	/// Returns the number of transitions recorded.
	pub fn train(&mut self, text: &str, punctuation: &Punctuation) -> usize {
		let tokens = tokenizer::tokenize(text, punctuation);
		self.train_tokens(&tokens, punctuation)
	}

	/// Trains the chain on an already tokenized text.
	///
	/// The last `order` tokens never start a key since they have no follower.
	/// A terminal mark at the start of the window flags the next key as a
	/// sentence opener. Windows holding a mark anywhere else straddle a
	/// sentence boundary and are skipped.
	pub fn train_tokens<S: AsRef<str>>(&mut self, tokens: &[S], punctuation: &Punctuation) -> usize {
		let mut opener = true;
		let mut added = 0;
		let openers_before = self.openers.len();

		for ix in 0..tokens.len().saturating_sub(self.order) {
			if punctuation.is_terminal(tokens[ix].as_ref()) {
				opener = true;
				continue;
			}

			let window = &tokens[ix..ix + self.order];
			if punctuation.any_terminal(window) {
				continue;
			}

			let key = ContextKey::new(window);
			if opener {
				self.openers.push(key.clone());
				opener = false;
			}

			self.states
				.entry(key.clone())
				.or_insert_with(|| State::new(key))
				.add_follower(tokens[ix + self.order].as_ref());
			added += 1;
		}

		debug!(
			"Trained on {} tokens: {} transitions, {} openers, {} keys total",
			tokens.len(),
			added,
			self.openers.len() - openers_before,
			self.states.len()
		);
		added
	}

	/// Merges another chain into this one.
	///
	/// Openers and followers of `other` are appended after the existing ones,
	/// so merging partial chains in order is the same as training their texts
	/// one after another.
	///
	/// # Errors
	/// Returns `OrderMismatch` if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(ChainError::OrderMismatch { expected: self.order, actual: other.order });
		}

		self.openers.extend(other.openers.iter().cloned());
		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state).map_err(ChainError::Malformed)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	/// Checks every chain invariant against the given terminal set.
	///
	/// # Errors
	/// Returns `Malformed` describing the first violation found.
	pub fn validate(&self, punctuation: &Punctuation) -> Result<()> {
		if self.order == 0 {
			return Err(ChainError::Malformed("order is 0".to_owned()));
		}

		for (key, state) in &self.states {
			if key.len() != self.order {
				return Err(ChainError::Malformed(format!("key {} has {} tokens, expected {}", key, key.len(), self.order)));
			}
			if punctuation.any_terminal(key.tokens()) {
				return Err(ChainError::Malformed(format!("key {} contains punctuation", key)));
			}
			if state.key() != key {
				return Err(ChainError::Malformed(format!("state {} stored under key {}", state.key(), key)));
			}
			if state.followers().is_empty() {
				return Err(ChainError::Malformed(format!("key {} has no followers", key)));
			}
		}

		for opener in &self.openers {
			if !self.states.contains_key(opener) {
				return Err(ChainError::Malformed(format!("opener {} is not a known key", opener)));
			}
		}

		Ok(())
	}

	/// Serializes the chain with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes and validates a chain.
	///
	/// # Errors
	/// Returns `Serialization` if the bytes do not decode, `Malformed` if the
	/// decoded chain breaks an invariant.
	pub fn from_bytes(bytes: &[u8], punctuation: &Punctuation) -> Result<Self> {
		let chain: Self = postcard::from_bytes(bytes)?;
		chain.validate(punctuation)?;
		Ok(chain)
	}

	/// Writes the serialized chain to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = self.to_bytes()?;
		std::fs::write(&path, bytes)?;
		info!("Saved chain of order {} ({} keys) to {}", self.order, self.len(), path.as_ref().display());
		Ok(())
	}

	/// Reads and validates a chain from `path`.
	pub fn load<P: AsRef<Path>>(path: P, punctuation: &Punctuation) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		let chain = Self::from_bytes(&bytes, punctuation)?;
		info!("Loaded chain of order {} ({} keys) from {}", chain.order, chain.len(), path.as_ref().display());
		Ok(chain)
	}
}
