//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - A tokenizer turning raw text into word and punctuation tokens
//! - A chain of configurable order, trained cumulatively from texts
//! - A sentence sampler seeded from observed sentence openers
//! - Binary persistence of trained chains
//! - Lexical similarity between documents

/// Chain model, training and generation.
pub mod model;

/// Document vocabulary overlap.
pub mod similarity;

/// I/O utilities (file loading, path helpers).
pub mod io;

/// Error type shared by the crate.
pub mod error;

pub use error::{ChainError, Result};
pub use model::chain::Chain;
pub use model::context_key::ContextKey;
pub use model::generator::Generator;
pub use model::punctuation::{Punctuation, is_terminal_punctuation};
pub use model::sampler::{DEFAULT_MAXLEN, Sampler};
pub use model::sentence_options::SentenceOptions;
