use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

/// Runtime settings of the HTTP server, read from `MARKOV_GEN_*` variables.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Folder holding `.txt` corpora, their `.bin` caches and `.chain` snapshots.
	pub data_dir: PathBuf,
	/// Order used until a request asks for another one.
	pub order: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self { host: "127.0.0.1".to_owned(), port: 5000, data_dir: PathBuf::from("./data"), order: 2 }
	}
}

impl ServerConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Builds the configuration from any key lookup.
	///
	/// Missing keys keep their defaults; unparseable values are logged and
	/// ignored.
	pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
		let defaults = Self::default();
		Self {
			host: lookup("MARKOV_GEN_HOST").unwrap_or(defaults.host),
			port: parse_or(&lookup, "MARKOV_GEN_PORT", defaults.port),
			data_dir: lookup("MARKOV_GEN_DATA").map(PathBuf::from).unwrap_or(defaults.data_dir),
			order: match parse_or(&lookup, "MARKOV_GEN_ORDER", defaults.order) {
				0 => {
					warn!("MARKOV_GEN_ORDER must be >= 1, using {}", defaults.order);
					defaults.order
				}
				order => order,
			},
		}
	}
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
	T: FromStr + Copy + std::fmt::Display,
	F: Fn(&str) -> Option<String>,
{
	match lookup(key) {
		None => default,
		Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
			warn!("Invalid value {:?} for {}, using {}", raw, key, default);
			default
		}),
	}
}
