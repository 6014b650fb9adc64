use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsmtag::Model;

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// Print the accumulated score of each tag after it
    #[arg(long)]
    scores: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Loading model file");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let tagger = model.tagger();

    info!("Start tagging");
    let mut out = BufWriter::new(stdout().lock());
    let mut n_words = 0;
    let start = Instant::now();
    for line in stdin().lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let predictions = tagger.predict(&words);
        n_words += words.len();
        let mut tagged = Vec::with_capacity(words.len());
        for (word, p) in words.iter().zip(&predictions) {
            if args.scores {
                tagged.push(format!("{}/{}/{:.3}", word, p.tag(), p.score()));
            } else {
                tagged.push(format!("{}/{}", word, p.tag()));
            }
        }
        writeln!(out, "{}", tagged.join(" "))?;
    }
    out.flush()?;
    let duration = start.elapsed();
    info!(
        elapsed_sec = duration.as_secs_f64(),
        words_per_sec = n_words as f64 / duration.as_secs_f64(),
        "Finish tagging"
    );

    Ok(())
}
