use std::fs::File;
use std::io::{prelude::*, stdout, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsmtag::{read_documents, Document, Metric, SimilarityMatcher, TfIdfVectorizer, Weighting};

#[derive(Parser, Debug)]
#[command(about = "A program to match each query document with its most similar reference.")]
struct Args {
    /// A JSON array of `{"source", "tokens"}` records to find matches for
    #[arg(long)]
    query: PathBuf,

    /// A JSON array of `{"source", "tokens"}` records to match against
    #[arg(long)]
    reference: PathBuf,

    /// Similarity measure: {cosine, euclidean}
    #[arg(long, default_value = "cosine")]
    metric: Metric,

    /// Term weighting: {tfidf, sublinear, augmented}
    #[arg(long, default_value = "tfidf")]
    weighting: Weighting,

    /// The constant of the augmented weighting, in [0, 1]
    #[arg(long)]
    alpha: Option<f64>,

    /// The file to write `<query> -> <reference>` lines to (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load(path: &Path) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
    info!(?path, "Loading documents");
    let docs = read_documents(BufReader::new(File::open(path)?))?;
    info!(documents = docs.len(), "Loaded documents");
    Ok(docs)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let weighting = match (args.weighting, args.alpha) {
        (Weighting::Augmented { .. }, Some(alpha)) => Weighting::augmented(alpha)?,
        (_, Some(_)) => return Err("--alpha requires --weighting augmented".into()),
        (weighting, None) => weighting,
    };
    let vectorizer = TfIdfVectorizer::new().weighting(weighting);

    let queries = vectorizer.vectorize(&load(&args.query)?);
    let references = vectorizer.vectorize(&load(&args.reference)?);

    let matcher = SimilarityMatcher::new(args.metric);
    let matches = matcher.match_all(&queries, &references);

    let mut out: Box<dyn Write> = match args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };
    for m in &matches {
        writeln!(out, "{} -> {}", m.query, m.reference)?;
    }
    out.flush()?;

    let n_same = matches.iter().filter(|m| m.query == m.reference).count();
    info!(
        queries = queries.len(),
        matched = matches.len(),
        same_id = n_same,
        ?weighting,
        metric = ?matcher.metric(),
        "Finish matching"
    );

    Ok(())
}
