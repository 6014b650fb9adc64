use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsmtag::{read_tagged_sentences, GridSearchTrainer, TaggedSentence};

#[derive(Parser, Debug)]
#[command(about = "A program to train part-of-speech tagging models of vsmtag.")]
struct Args {
    /// A training corpus with one `word tag` pair per line and blank lines between sentences
    #[arg(long)]
    trn: PathBuf,

    /// A development corpus in the same format, used to select the weights
    #[arg(long)]
    dev: PathBuf,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The number of threads evaluating weight combinations
    #[arg(long, default_value = "1")]
    n_threads: usize,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn load(path: &Path) -> Result<Vec<TaggedSentence>, Box<dyn std::error::Error>> {
    info!(?path, "Loading dataset");
    let f = BufReader::new(File::open(path)?);
    let sentences = read_tagged_sentences(f)?;
    info!(sentences = sentences.len(), "Loaded dataset");
    Ok(sentences)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let trn = load(&args.trn)?;
    let dev = load(&args.dev)?;

    info!("Start training");
    let result = GridSearchTrainer::new()
        .n_threads(args.n_threads)
        .train(&trn, &dev)?;
    info!("Finish training");

    let mut f = zstd::Encoder::new(File::create(&args.model)?, 19)?;
    f.multithread(args.zstd_workers)?;
    result.model.write(&mut f)?;
    f.finish()?;
    info!(path = ?args.model, "Wrote model");

    println!("{}", result.accuracy);

    Ok(())
}
