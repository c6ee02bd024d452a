use std::fs;

use log::info;
use markov_gen_core::{Generator, SentenceOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Train an order-2 chain on every .txt file of the "data" directory
    // A .bin cache is written next to each text and reused on the next run
    let mut app: Generator = Generator::from_folder("./data", 2)?;
    info!("Trained on: {}", app.source_names().join(", "));

    // Save the whole chain, then load it back (replaces the chain wholesale)
    app.save("./data/train.chain")?;
    app.load("./data/train.chain")?;

    // A raw sentence may stop at maxlen words without punctuation
    println!("Raw: {}", app.next_sentence(30)?);

    // Only keep complete sentences of at least 6 words,
    // long sentences have a better chance of being "new"
    let mut options = SentenceOptions::complete(6, 100);
    options.set_maxlen(30)?;

    // maxlen cannot be 0
    match options.set_maxlen(0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("maxlen 0 is invalid, must be >= 1"),
    }

    // A corpus without enough long sentences would never fill the list
    let mut sentences = Vec::new();
    let mut total_words = 0;
    let mut attempts = 0;
    while sentences.len() < 100 && attempts < 1000 {
        let sentence = app.sentence(&options)?;
        if options.accepts(&sentence, app.punctuation()) {
            total_words += sentence.split_whitespace().count();
            sentences.push(sentence);
        }
        attempts += 1;
    }
    if sentences.is_empty() {
        return Err("No complete sentence could be generated".into());
    }
    println!("Average length: {:.2}", total_words as f64 / sentences.len() as f64);

    for (i, sentence) in sentences.iter().take(10).enumerate() {
        println!("Generated sentence {}: {}", i + 1, sentence);
    }

    fs::write("out.txt", sentences.join("\n") + "\n")?;
    Ok(())
}
