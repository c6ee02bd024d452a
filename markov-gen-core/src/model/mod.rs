//! Top-level module for the word chain system.
//!
//! - Tokenization of raw text (`tokenizer`, `punctuation`)
//! - The chain itself (`Chain`, `State`, `ContextKey`)
//! - Random walks over a chain (`Sampler`)
//! - Corpus loading and parallel training (`corpus`)
//! - A high-level generation interface (`Generator`, `SentenceOptions`)

/// High-level interface owning a chain and a walk over it.
pub mod generator;

/// Word-level Markov chain: training, merging and persistence.
pub mod chain;

/// Context keys: the fixed-length word windows of a chain.
pub mod context_key;

/// Text-file loading through a binary cache, and parallel training.
pub mod corpus;

/// The terminal punctuation set and its predicate.
pub mod punctuation;

/// Random walk producing words and sentences from a chain.
pub mod sampler;

/// Caller policy for accepting generated sentences.
pub mod sentence_options;

/// Per-key followers, with uniform sampling.
mod state;

/// Cleaning and splitting of raw text.
pub mod tokenizer;

pub use state::State;
