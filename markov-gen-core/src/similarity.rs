use std::cmp::Ordering;
use std::collections::HashSet;

/// Lowercases `text`, drops ASCII punctuation and collapses whitespace runs.
pub fn clean_document(text: &str) -> String {
	let lowered: String = text
		.chars()
		.filter(|c| !c.is_ascii_punctuation())
		.flat_map(char::to_lowercase)
		.collect();
	lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Set of unique words of a document, after cleaning.
pub fn word_set(text: &str) -> HashSet<String> {
	clean_document(text).split_whitespace().map(str::to_owned).collect()
}

/// Overlap between two vocabularies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Similarity {
	/// Words present in both documents.
	pub shared_words: usize,
	/// `shared_words` divided by the size of the smaller vocabulary.
	pub ratio: f64,
}

/// Compares two vocabularies.
///
/// The ratio is relative to the smaller vocabulary, so a short text fully
/// contained in a long one scores 1.0. Empty vocabularies score 0.0.
pub fn compare(first: &HashSet<String>, second: &HashSet<String>) -> Similarity {
	let shared_words = first.intersection(second).count();
	let smallest = first.len().min(second.len());
	let ratio = if smallest == 0 { 0.0 } else { shared_words as f64 / smallest as f64 };
	Similarity { shared_words, ratio }
}

/// Similarity of one unordered pair of named documents.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentPair {
	pub first: String,
	pub second: String,
	pub similarity: Similarity,
}

/// All unordered pairs of a document collection.
#[derive(Clone, Debug, Default)]
pub struct PairRanking {
	pairs: Vec<DocumentPair>,
}

impl PairRanking {
	pub fn pairs(&self) -> &[DocumentPair] {
		&self.pairs
	}

	/// The `n` most similar pairs, by ratio.
	pub fn top_by_similarity(&self, n: usize) -> Vec<&DocumentPair> {
		self.top(n, |a, b| b.similarity.ratio.total_cmp(&a.similarity.ratio))
	}

	/// The `n` pairs sharing the most words.
	pub fn top_by_shared(&self, n: usize) -> Vec<&DocumentPair> {
		self.top(n, |a, b| b.similarity.shared_words.cmp(&a.similarity.shared_words))
	}

	fn top<F>(&self, n: usize, order: F) -> Vec<&DocumentPair>
	where
		F: Fn(&DocumentPair, &DocumentPair) -> Ordering,
	{
		let mut sorted: Vec<&DocumentPair> = self.pairs.iter().collect();
		// Stable sort: ties keep the collection order
		sorted.sort_by(|a, b| order(a, b));
		sorted.truncate(n);
		sorted
	}
}

/// Compares every unordered pair of distinct documents.
///
/// `documents` are `(name, text)` pairs. A document is never compared with
/// itself, and each pair appears once.
pub fn rank_pairs(documents: &[(String, String)]) -> PairRanking {
	let vocabularies: Vec<HashSet<String>> = documents.iter().map(|(_, text)| word_set(text)).collect();

	let mut pairs = Vec::new();
	for i in 0..documents.len() {
		for j in i + 1..documents.len() {
			pairs.push(DocumentPair {
				first: documents[i].0.clone(),
				second: documents[j].0.clone(),
				similarity: compare(&vocabularies[i], &vocabularies[j]),
			});
		}
	}

	PairRanking { pairs }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn docs(items: &[(&str, &str)]) -> Vec<(String, String)> {
		items.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect()
	}

	#[test]
	fn cleaning_lowercases_and_strips_punctuation() {
		assert_eq!(clean_document("Hello,   World!\n\nIt's  me."), "hello world its me");
	}

	#[test]
	fn contained_document_is_fully_similar() {
		let short = word_set("the cat");
		let long = word_set("The cat sat on the mat.");
		let s = compare(&short, &long);
		assert_eq!(s.shared_words, 2);
		assert_eq!(s.ratio, 1.0);
	}

	#[test]
	fn empty_document_scores_zero() {
		let s = compare(&word_set(""), &word_set("anything"));
		assert_eq!(s, Similarity { shared_words: 0, ratio: 0.0 });
	}

	#[test]
	fn every_pair_once() {
		let ranking = rank_pairs(&docs(&[("a", "x y"), ("b", "x z"), ("c", "q")]));
		let names: Vec<(&str, &str)> = ranking.pairs().iter().map(|p| (p.first.as_str(), p.second.as_str())).collect();
		assert_eq!(names, vec![("a", "b"), ("a", "c"), ("b", "c")]);
	}

	#[test]
	fn rankings_sort_descending() {
		let ranking = rank_pairs(&docs(&[
			("big", "a b c d e f g h"),
			("half", "a b c d x y z w"),
			("tiny", "a"),
		]));

		let by_ratio = ranking.top_by_similarity(1);
		assert_eq!(by_ratio.len(), 1);
		assert_eq!((by_ratio[0].first.as_str(), by_ratio[0].second.as_str()), ("big", "tiny"));

		let by_shared = ranking.top_by_shared(5);
		assert_eq!(by_shared.len(), 3);
		assert_eq!(by_shared[0].similarity.shared_words, 4);
	}
}
