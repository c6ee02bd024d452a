use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::SystemTime;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::punctuation::Punctuation;
use crate::error::{ChainError, Result};
use crate::io::{build_output_path, read_text};

/// Size and modification time of a training text when its cache was built.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct SourceStamp {
	len: u64,
	modified: Option<SystemTime>,
}

impl SourceStamp {
	fn of<P: AsRef<Path>>(path: P) -> Result<Self> {
		let metadata = fs::metadata(path)?;
		Ok(Self { len: metadata.len(), modified: metadata.modified().ok() })
	}
}

/// Content of a `.bin` cache file.
///
/// The chain is only valid for the text it was built from and for the
/// terminal set used to tokenize it.
#[derive(Serialize, Deserialize, Debug)]
struct CorpusCache {
	source: SourceStamp,
	punctuation: Punctuation,
	chain: Chain,
}

impl CorpusCache {
	fn read<P: AsRef<Path>>(path: P, punctuation: &Punctuation) -> Result<Self> {
		let bytes = fs::read(path)?;
		let cache: Self = postcard::from_bytes(&bytes)?;
		cache.chain.validate(punctuation)?;
		Ok(cache)
	}

	fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		fs::write(path, postcard::to_stdvec(self)?)?;
		Ok(())
	}

	/// Why the cache cannot be used for this request, if it cannot.
	fn staleness(&self, source: &SourceStamp, order: usize, punctuation: &Punctuation) -> Option<String> {
		if self.chain.order() != order {
			Some(format!("order {}, expected {}", self.chain.order(), order))
		} else if &self.punctuation != punctuation {
			Some(format!("built with terminals {:?}, expected {:?}", self.punctuation.marks(), punctuation.marks()))
		} else if &self.source != source {
			Some("text changed since the cache was built".to_owned())
		} else {
			None
		}
	}
}

/// Loads the chain of a text file, going through a binary cache.
///
/// - `text_path` is the raw training text.
/// - If `<stem>.bin` exists next to it, was built from the text as it is now
///   (same size and modification time), with the same terminal set and the
///   requested order, its chain is returned.
/// - Otherwise the text is read, trained, and the cache is (re)written.
pub fn load_or_build<P: AsRef<Path>>(text_path: P, order: usize, punctuation: &Punctuation) -> Result<Chain> {
	let cache_path = build_output_path(&text_path, "bin")?;
	let source = SourceStamp::of(&text_path)?;

	if cache_path.exists() {
		match CorpusCache::read(&cache_path, punctuation) {
			Ok(cache) => match cache.staleness(&source, order, punctuation) {
				None => {
					info!("Using cached chain {}", cache_path.display());
					return Ok(cache.chain);
				}
				Some(reason) => warn!("Cache {} is stale ({}): rebuilding", cache_path.display(), reason),
			},
			Err(e) => warn!("Cache {} rejected ({}): rebuilding", cache_path.display(), e),
		}
	}

	let text = read_text(&text_path)?;
	let mut chain = Chain::new(order)?;
	let added = chain.train(&text, punctuation);
	info!("Built chain from {}: {} transitions", text_path.as_ref().display(), added);

	let cache = CorpusCache { source, punctuation: punctuation.clone(), chain };
	cache.write(&cache_path)?;
	Ok(cache.chain)
}

/// Trains one chain from several independent texts in parallel.
///
/// # Behavior
/// - Splits the texts into contiguous chunks (at most one per CPU).
/// - Each thread trains a partial chain on its chunk, text after text.
/// - Partial chains are merged back in chunk order, so the result is the
///   same as training every text sequentially in the given order.
///
/// # Errors
/// - `InvalidOrder` if `order` is 0.
/// - `Worker` if a thread dies before sending its chain.
pub fn build_parallel(texts: &[String], order: usize, punctuation: &Punctuation) -> Result<Chain> {
	let mut final_chain = Chain::new(order)?;
	if texts.is_empty() {
		return Ok(final_chain);
	}

	let chunks = num_cpus::get().max(1).min(texts.len());
	let chunk_size = texts.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	let mut spawned = 0;
	for (index, chunk) in texts.chunks(chunk_size).enumerate() {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();
		let punctuation = punctuation.clone();
		spawned += 1;

		thread::spawn(move || {
			// Order was validated above
			let Ok(mut partial) = Chain::new(order) else { return };
			for text in &chunk {
				partial.train(text, &punctuation);
			}
			// The receiver outlives every worker
			let _ = tx.send((index, partial));
		});
	}
	drop(tx);

	let mut partials: Vec<Option<Chain>> = vec![None; spawned];
	for (index, partial) in rx.iter() {
		partials[index] = Some(partial);
	}

	for (index, partial) in partials.into_iter().enumerate() {
		let partial = partial.ok_or_else(|| ChainError::Worker(format!("chunk {} was not trained", index)))?;
		final_chain.merge(&partial)?;
	}

	info!("Trained {} texts on {} threads: {} keys", texts.len(), spawned, final_chain.len());
	Ok(final_chain)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parallel_equals_sequential() {
		let texts: Vec<String> = (0..37)
			.map(|i| format!("Text {i} starts here. It has {} words! Does text {i} end?", i % 5))
			.collect();

		let mut sequential = Chain::new(2).unwrap();
		for text in &texts {
			sequential.train(text, &Punctuation::default());
		}

		let parallel = build_parallel(&texts, 2, &Punctuation::default()).unwrap();
		assert_eq!(parallel, sequential);
	}

	#[test]
	fn no_texts_give_an_empty_chain() {
		let chain = build_parallel(&[], 3, &Punctuation::default()).unwrap();
		assert!(chain.is_empty());
		assert_eq!(chain.order(), 3);
	}

	#[test]
	fn cache_is_stale_on_any_mismatch() {
		let source = SourceStamp { len: 12, modified: None };
		let mut chain = Chain::new(2).unwrap();
		chain.train("Hello there world.", &Punctuation::default());
		let cache = CorpusCache { source: source.clone(), punctuation: Punctuation::default(), chain };

		assert_eq!(cache.staleness(&source, 2, &Punctuation::default()), None);
		assert!(cache.staleness(&source, 1, &Punctuation::default()).is_some());
		assert!(cache.staleness(&source, 2, &Punctuation::new(".?!;").unwrap()).is_some());
		let edited = SourceStamp { len: 13, modified: None };
		assert!(cache.staleness(&edited, 2, &Punctuation::default()).is_some());
	}

	#[test]
	fn order_zero_is_rejected() {
		let texts = vec!["a b.".to_owned()];
		assert!(matches!(build_parallel(&texts, 0, &Punctuation::default()), Err(ChainError::InvalidOrder(0))));
	}
}
