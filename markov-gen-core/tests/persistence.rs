use std::fs;

use markov_gen_core::model::corpus;
use markov_gen_core::{Chain, ChainError, Generator, Punctuation, SentenceOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;

const ALICE: &str = "Alice was beginning to get very tired. Alice was sitting by her sister! \
	What is the use of a book, thought Alice? She was considering in her own mind.";

const ROCKS: &str = "The rock was very hard. The rock was sitting by the river. \
	What is the use of a rock? Nobody knows.";

fn seeded(order: usize) -> Generator {
	Generator::with_rng(order, Punctuation::default(), StdRng::seed_from_u64(2024)).unwrap()
}

#[test]
fn save_then_load_reproduces_the_chain() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("alice.chain");

	let mut original = seeded(2);
	original.train(ALICE);
	original.save(&path).unwrap();

	let mut restored = seeded(1);
	restored.load(&path).unwrap();

	assert_eq!(restored.order(), 2);
	assert_eq!(restored.chain(), original.chain());
	assert_eq!(restored.chain().openers(), original.chain().openers());
	assert!(restored.source_names().is_empty());
}

#[test]
fn loading_garbage_keeps_the_current_chain() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("broken.chain");
	fs::write(&path, b"definitely not a chain").unwrap();

	let mut generator = seeded(2);
	generator.train(ALICE);
	let before = generator.chain().clone();

	assert!(generator.load(&path).is_err());
	assert_eq!(generator.chain(), &before);
	assert!(generator.next_sentence(30).is_ok());
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
	let dir = tempfile::tempdir().unwrap();
	let mut generator = seeded(2);
	assert!(matches!(generator.load(dir.path().join("nope.chain")), Err(ChainError::Io(_))));
}

fn trained_with(text: &str, order: usize, punctuation: &Punctuation) -> Chain {
	let mut chain = Chain::new(order).unwrap();
	chain.train(text, punctuation);
	chain
}

#[test]
fn corpus_cache_is_written_and_reused() {
	let dir = tempfile::tempdir().unwrap();
	let text = dir.path().join("alice.txt");
	fs::write(&text, ALICE).unwrap();

	let built = corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();
	assert!(dir.path().join("alice.bin").exists());

	// Same size and modification time: the text is taken as unchanged
	let modified = fs::metadata(&text).unwrap().modified().unwrap();
	fs::write(&text, ALICE.replace("Alice", "Bruce")).unwrap();
	fs::File::options().write(true).open(&text).unwrap().set_modified(modified).unwrap();

	let cached = corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();
	assert_eq!(cached, built);
}

#[test]
fn corpus_cache_is_rebuilt_when_the_text_changes() {
	let dir = tempfile::tempdir().unwrap();
	let text = dir.path().join("alice.txt");
	fs::write(&text, ALICE).unwrap();
	corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();

	fs::write(&text, ROCKS).unwrap();
	let rebuilt = corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();
	assert_eq!(rebuilt, trained_with(ROCKS, 2, &Punctuation::default()));
}

#[test]
fn corpus_cache_of_another_order_is_rebuilt() {
	let dir = tempfile::tempdir().unwrap();
	let text = dir.path().join("rocks.txt");
	fs::write(&text, ROCKS).unwrap();

	corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();
	let rebuilt = corpus::load_or_build(&text, 1, &Punctuation::default()).unwrap();
	assert_eq!(rebuilt, trained_with(ROCKS, 1, &Punctuation::default()));

	// The rewritten cache now serves order 1
	let cached = corpus::load_or_build(&text, 1, &Punctuation::default()).unwrap();
	assert_eq!(cached, rebuilt);
}

#[test]
fn corpus_cache_of_another_terminal_set_is_rebuilt() {
	let dir = tempfile::tempdir().unwrap();
	let text = dir.path().join("list.txt");
	fs::write(&text, "first item ; second item ; third item.").unwrap();

	let with_semicolon = Punctuation::new(".?!;").unwrap();
	let built = corpus::load_or_build(&text, 1, &with_semicolon).unwrap();
	assert_eq!(built.openers().len(), 3);

	let rebuilt = corpus::load_or_build(&text, 1, &Punctuation::default()).unwrap();
	assert_eq!(rebuilt, trained_with("first item ; second item ; third item.", 1, &Punctuation::default()));
	assert_eq!(rebuilt.openers().len(), 1);
}

#[test]
fn corrupted_cache_is_rebuilt() {
	let dir = tempfile::tempdir().unwrap();
	let text = dir.path().join("rocks.txt");
	fs::write(&text, ROCKS).unwrap();
	fs::write(dir.path().join("rocks.bin"), [1u8, 2, 3]).unwrap();

	let chain = corpus::load_or_build(&text, 2, &Punctuation::default()).unwrap();
	assert_eq!(chain, trained_with(ROCKS, 2, &Punctuation::default()));
}

#[test]
fn folder_generator_trains_every_text_in_name_order() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("b_rocks.txt"), ROCKS).unwrap();
	fs::write(dir.path().join("a_alice.txt"), ALICE).unwrap();
	fs::write(dir.path().join("notes.md"), "ignored. entirely.").unwrap();

	let mut generator = Generator::from_folder(dir.path(), 2).unwrap();
	assert_eq!(generator.source_names(), &["a_alice", "b_rocks"]);

	let mut expected = Chain::new(2).unwrap();
	expected.train(ALICE, &Punctuation::default());
	expected.train(ROCKS, &Punctuation::default());
	assert_eq!(generator.chain(), &expected);

	let sentence = generator.sentence(&SentenceOptions::complete(2, 50)).unwrap();
	assert!(!sentence.is_empty());
}

#[test]
fn folder_generator_requires_a_directory() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("file.txt");
	fs::write(&file, ALICE).unwrap();
	assert!(Generator::from_folder(&file, 2).is_err());
}
