use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::chain::Chain;
use super::context_key::ContextKey;
use super::punctuation::Punctuation;
use crate::error::{ChainError, Result};

/// Maximum number of words in a sentence when the caller does not say.
pub const DEFAULT_MAXLEN: usize = 30;

/// Random walk over a [`Chain`].
///
/// The sampler owns the current seed (the key the walk resumes from) and its
/// random source. It never owns the chain: the same chain can be sampled by
/// several samplers, one per caller.
#[derive(Debug)]
pub struct Sampler<R = StdRng> {
	rng: R,
	seed: Option<ContextKey>,
	punctuation: Punctuation,
}

impl Sampler<StdRng> {
	/// Creates a sampler seeded from the operating system.
	pub fn from_os_rng(punctuation: Punctuation) -> Self {
		Self::new(StdRng::from_os_rng(), punctuation)
	}
}

impl<R: Rng> Sampler<R> {
	/// Creates a sampler drawing from `rng`.
	pub fn new(rng: R, punctuation: Punctuation) -> Self {
		Self { rng, seed: None, punctuation }
	}

	/// Key the next word will be drawn from, if any.
	pub fn seed(&self) -> Option<&ContextKey> {
		self.seed.as_ref()
	}

	/// Forgets the current seed; the next draw reseeds.
	pub fn reset(&mut self) {
		self.seed = None;
	}

	pub fn punctuation(&self) -> &Punctuation {
		&self.punctuation
	}

	/// Picks one opener uniformly and makes it the current seed.
	///
	/// Openers seen more often during training are proportionally more likely.
	///
	/// # Errors
	/// Returns `EmptyOpeners` if the chain never recorded a sentence start.
	pub fn randomize_seed(&mut self, chain: &Chain) -> Result<ContextKey> {
		let opener = chain.openers().choose(&mut self.rng).ok_or(ChainError::EmptyOpeners)?.clone();
		self.seed = Some(opener.clone());
		Ok(opener)
	}

	/// Draws the word following the current seed and slides the seed forward.
	///
	/// A missing seed, or one the chain cannot continue (wrong length, unknown
	/// key, or a key ending on punctuation), is silently replaced by a random
	/// opener first.
	pub fn next_word(&mut self, chain: &Chain) -> Result<String> {
		let current = self
			.seed
			.as_ref()
			.filter(|seed| seed.len() == chain.order())
			.and_then(|seed| chain.state(seed));

		let state = match current {
			Some(state) => state,
			None => {
				let seed = self.randomize_seed(chain)?;
				chain
					.state(&seed)
					.ok_or_else(|| ChainError::Malformed(format!("opener {} is not a known key", seed)))?
			}
		};

		let word = state
			.predict(&mut self.rng)
			.ok_or_else(|| ChainError::Malformed(format!("key {} has no followers", state.key())))?
			.to_owned();

		self.seed = Some(state.key().slide(&word));
		Ok(word)
	}

	/// Generates one sentence of at most `maxlen` words.
	///
	/// Starts from a fresh opener and draws words until a terminal mark comes
	/// up, which is glued to the last word, or until `maxlen` words are
	/// reached, in which case the sentence is returned unterminated.
	/// An opener longer than `maxlen` is cut down to `maxlen` words.
	///
	/// # Errors
	/// - `InvalidMaxLen` if `maxlen` is 0.
	/// - `EmptyOpeners` if the chain is untrained.
	pub fn next_sentence(&mut self, chain: &Chain, maxlen: usize) -> Result<String> {
		if maxlen == 0 {
			return Err(ChainError::InvalidMaxLen);
		}

		let opener = self.randomize_seed(chain)?;
		let mut words: Vec<String> = opener.tokens().iter().take(maxlen).cloned().collect();

		while words.len() < maxlen {
			let word = self.next_word(chain)?;
			if self.punctuation.is_terminal(&word) {
				if let Some(last) = words.last_mut() {
					last.push_str(&word);
				}
				break;
			}
			words.push(word);
		}

		Ok(words.join(" "))
	}
}
