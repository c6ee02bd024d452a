use markov_gen_core::io::read_folder;
use markov_gen_core::similarity::{DocumentPair, rank_pairs};

const RESULTS: usize = 5;

fn print_pair(pair: &DocumentPair) {
    println!(
        "{} and {} have {} words in common and are {:.2}% similar.",
        pair.first,
        pair.second,
        pair.similarity.shared_words,
        pair.similarity.ratio * 100.0
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Every .txt file of the "data" directory, reduced to its set of unique words
    let documents = read_folder("./data", "txt")?;
    log::info!("Comparing {} documents", documents.len());

    let ranking = rank_pairs(&documents);

    println!("Sorted by percent similarity (to the shortest text):");
    for pair in ranking.top_by_similarity(RESULTS) {
        print_pair(pair);
    }

    println!();
    println!("Sorted by words in common:");
    for pair in ranking.top_by_shared(RESULTS) {
        print_pair(pair);
    }

    Ok(())
}
