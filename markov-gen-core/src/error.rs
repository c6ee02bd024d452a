use thiserror::Error;

/// Errors raised by chain training, generation and persistence.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Generation needed a seed but no sentence opener was ever recorded.
	#[error("No openers present, cannot seed the generator")]
	EmptyOpeners,

	/// The order of a chain must be at least 1.
	#[error("Invalid order: {0} (must be >= 1)")]
	InvalidOrder(usize),

	/// A sentence cannot be limited to zero words.
	#[error("Invalid maximum sentence length: must be >= 1")]
	InvalidMaxLen,

	/// The terminal punctuation set was rejected.
	#[error("Invalid punctuation set: {0}")]
	InvalidPunctuation(String),

	/// Two chains of different orders cannot be combined.
	#[error("Order mismatch: expected {expected}, got {actual}")]
	OrderMismatch { expected: usize, actual: usize },

	/// Decoded state does not describe a valid chain.
	#[error("Malformed chain data: {0}")]
	Malformed(String),

	/// A parallel training worker died before reporting its chain.
	#[error("Training worker failed: {0}")]
	Worker(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] postcard::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ChainError>;
