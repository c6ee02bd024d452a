use rand::Rng;
use rand::seq::IndexedRandom;

use serde::{Deserialize, Serialize};

use super::context_key::ContextKey;

/// Represents a state in the word chain.
///
/// A `State` corresponds to one context key and stores every token observed
/// right after it, in training order. Duplicates are kept: a continuation
/// seen three times is three times as likely to be drawn.
///
/// ## Invariants
/// - All followers belong to the same `key`
/// - A state stored in a chain always has at least one follower
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct State {
	/// Context key this state continues.
	key: ContextKey,
	/// Observed next tokens, a multiset in training order.
	/// Example: ["sat", "ran", "sat"]
	followers: Vec<String>,
}

impl State {
	/// Creates a new state for the given key, with no followers yet.
	pub fn new(key: ContextKey) -> Self {
		Self { key, followers: Vec::new() }
	}

	pub fn key(&self) -> &ContextKey {
		&self.key
	}

	pub fn followers(&self) -> &[String] {
		&self.followers
	}

	/// Records one occurrence of `next` after this key.
	pub fn add_follower(&mut self, next: &str) {
		self.followers.push(next.to_owned());
	}

	/// Draws a follower uniformly from the multiset.
	///
	/// Returns `None` if the state has no followers.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.followers.choose(rng).map(String::as_str)
	}

	/// Appends the followers of another state with the same key.
	///
	/// # Errors
	/// Returns an error if the keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("Key mismatch: {} vs {}", self.key, other.key));
		}
		self.followers.extend(other.followers.iter().cloned());
		Ok(())
	}
}
