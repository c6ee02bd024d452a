use crate::error::{ChainError, Result};
use crate::io;
use crate::model::chain::Chain;
use crate::model::corpus;
use crate::model::punctuation::Punctuation;
use crate::model::sampler::Sampler;
use crate::model::sentence_options::SentenceOptions;
use log::info;
use rand::Rng;
use rand::rngs::StdRng;
use std::path::Path;

/// High-level generator: one chain, one walk over it.
///
/// # Responsibilities
/// - Train the chain from texts, files or whole folders
/// - Save and load the chain
/// - Generate words and sentences, optionally under a `SentenceOptions` policy
#[derive(Debug)]
pub struct Generator<R = StdRng> {
	chain: Chain,
	sampler: Sampler<R>,
	sources: Vec<String>,
}

impl Generator<StdRng> {
	/// Creates an untrained generator of the given order, with the default
	/// terminal punctuation and an OS-seeded random source.
	pub fn new(order: usize) -> Result<Self> {
		Ok(Self {
			chain: Chain::new(order)?,
			sampler: Sampler::from_os_rng(Punctuation::default()),
			sources: Vec::new(),
		})
	}

	/// Creates a generator trained on every `.txt` file of a directory.
	///
	/// # Parameters
	/// - `folder`: Path to a directory containing text files.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Behavior
	/// - Each file goes through its `.bin` cache (see [`corpus::load_or_build`]).
	/// - Files are trained in name order; the source name is the file stem.
	///
	/// # Errors
	/// - Returns an error if the path does not exist or is not a directory.
	/// - Returns an error if a file fails to load.
	pub fn from_folder<P: AsRef<Path>>(folder: P, order: usize) -> Result<Self> {
		let mut generator = Self::new(order)?;

		let string_path = folder.as_ref().to_str().ok_or_else(|| {
			ChainError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid folder path"))
		})?;
		let folder = io::normalize_folder(string_path);

		if !folder.is_dir() {
			return Err(ChainError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Expected a directory, got: {}", folder.display()),
			)));
		}

		for file in io::list_files(&folder, "txt")? {
			generator.train_file(folder.join(&file))?;
		}

		Ok(generator)
	}
}

impl<R: Rng> Generator<R> {
	/// Creates an untrained generator drawing from `rng`.
	pub fn with_rng(order: usize, punctuation: Punctuation, rng: R) -> Result<Self> {
		Ok(Self {
			chain: Chain::new(order)?,
			sampler: Sampler::new(rng, punctuation),
			sources: Vec::new(),
		})
	}

	pub fn chain(&self) -> &Chain {
		&self.chain
	}

	pub fn order(&self) -> usize {
		self.chain.order()
	}

	pub fn punctuation(&self) -> &Punctuation {
		self.sampler.punctuation()
	}

	/// Names of the files trained into the chain, in training order.
	pub fn source_names(&self) -> &[String] {
		&self.sources
	}

	/// Trains the chain on `text`. Returns the number of transitions recorded.
	pub fn train(&mut self, text: &str) -> usize {
		self.chain.train(text, self.sampler.punctuation())
	}

	/// Trains the chain on several independent texts in parallel.
	///
	/// Equivalent to calling [`Generator::train`] on each text in order.
	pub fn train_many(&mut self, texts: &[String]) -> Result<()> {
		let partial = corpus::build_parallel(texts, self.chain.order(), self.sampler.punctuation())?;
		self.chain.merge(&partial)
	}

	/// Trains the chain on a text file, through its binary cache.
	pub fn train_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let partial = corpus::load_or_build(&path, self.chain.order(), self.sampler.punctuation())?;
		self.chain.merge(&partial)?;
		self.sources.push(io::get_filename(&path)?);
		Ok(())
	}

	/// Saves the chain to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		self.chain.save(path)
	}

	/// Replaces the chain with the one stored at `path`.
	///
	/// The current chain is kept if loading fails. On success the current
	/// seed and the source names are cleared (a snapshot is not a corpus),
	/// and the order becomes the loaded chain's order.
	pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let chain = Chain::load(&path, self.sampler.punctuation())?;
		self.replace_chain(chain)
	}

	/// Swaps in an already built chain after validating it.
	pub fn replace_chain(&mut self, chain: Chain) -> Result<()> {
		chain.validate(self.sampler.punctuation())?;
		info!("Replacing chain of order {} by chain of order {}", self.chain.order(), chain.order());
		self.chain = chain;
		self.sampler.reset();
		self.sources.clear();
		Ok(())
	}

	/// Picks a random sentence opener as the current seed.
	pub fn randomize_seed(&mut self) -> Result<()> {
		self.sampler.randomize_seed(&self.chain).map(|_| ())
	}

	/// Draws the next word of the ongoing walk.
	pub fn next_word(&mut self) -> Result<String> {
		self.sampler.next_word(&self.chain)
	}

	/// Generates one sentence of at most `maxlen` words.
	pub fn next_sentence(&mut self, maxlen: usize) -> Result<String> {
		self.sampler.next_sentence(&self.chain, maxlen)
	}

	/// Generates a sentence under a caller policy.
	///
	/// # Behavior
	/// - Calls `next_sentence` with `options.maxlen()`.
	/// - While the sentence is rejected by `options`, retries up to `nb_try` times.
	/// - Returns the first accepted sentence, or the last attempt if all fail.
	pub fn sentence(&mut self, options: &SentenceOptions) -> Result<String> {
		let mut sentence = self.next_sentence(options.maxlen())?;
		let mut nb_try = options.nb_try;

		while nb_try > 0 && !options.accepts(&sentence, self.sampler.punctuation()) {
			sentence = self.next_sentence(options.maxlen())?;
			nb_try -= 1;
		}

		Ok(sentence)
	}
}
