use std::fs::File;
use std::io::stdin;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsmtag::{read_tagged_sentences, Evaluator, Model, Weights};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the tagging accuracy of vsmtag.")]
struct Args {
    /// The model file to evaluate
    #[arg(long)]
    model: PathBuf,

    /// Ignore the stored weights and vote with weight 1.0 on every table
    #[arg(long)]
    uniform_weights: bool,
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
    let mut model = Model::read(&mut f)?;
    if args.uniform_weights {
        model.set_weights(Weights::default())?;
    }

    let gold = read_tagged_sentences(stdin().lock())?;
    let evaluator = Evaluator::new(&gold);
    info!(
        sentences = gold.len(),
        tokens = evaluator.n_tokens(),
        "Start evaluation"
    );

    let tagger = model.tagger();
    info!(weights = ?tagger.weights(), "Start tagging");
    let accuracy = evaluator.evaluate(&tagger);
    println!("Accuracy: {}", accuracy);

    Ok(())
}
