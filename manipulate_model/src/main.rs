use std::fs;
use std::hash::Hash;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsmtag::{Context, FeatureTable, Model, PairKey, TrigramKey};

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output all feature tables as CSV
    #[arg(long)]
    dump_tables: Option<PathBuf>,

    /// Output the weights as CSV
    #[arg(long)]
    dump_weights: Option<PathBuf>,

    /// Replace the weights with the ones in a CSV file written by --dump-weights
    #[arg(long)]
    replace_weights: Option<PathBuf>,

    /// Override the weight of the current-word table
    #[arg(long)]
    current_word: Option<f64>,

    /// Override the weight of the previous-tag table
    #[arg(long)]
    prev_tag: Option<f64>,

    /// Override the weight of the next-tag table queried with the previous tag
    #[arg(long)]
    prev_tag_next: Option<f64>,

    /// Override the weight of the previous-word table
    #[arg(long)]
    prev_word: Option<f64>,

    /// Override the weight of the next-word table
    #[arg(long)]
    next_word: Option<f64>,
}

#[derive(Serialize)]
struct TableRecord<'a> {
    table: &'static str,
    context: String,
    tag: &'a str,
    probability: f64,
}

#[derive(Deserialize, Serialize)]
struct WeightRecord {
    name: String,
    weight: f64,
}

trait ContextLabel {
    fn label(&self) -> String;
}

impl ContextLabel for String {
    fn label(&self) -> String {
        self.clone()
    }
}

impl ContextLabel for Context {
    fn label(&self) -> String {
        self.to_string()
    }
}

impl ContextLabel for PairKey {
    fn label(&self) -> String {
        format!("{} {}", self.0, self.1)
    }
}

impl ContextLabel for TrigramKey {
    fn label(&self) -> String {
        format!("{} {} {}", self.0, self.1, self.2)
    }
}

fn dump_table<K, W>(
    wtr: &mut csv::Writer<W>,
    name: &'static str,
    table: &FeatureTable<K>,
) -> Result<(), Box<dyn std::error::Error>>
where
    K: ContextLabel + Eq + Hash,
    W: Write,
{
    for (key, probs) in table.iter() {
        let context = key.label();
        for p in probs {
            wtr.serialize(TableRecord {
                table: name,
                context: context.clone(),
                tag: p.tag(),
                probability: p.prob(),
            })?;
        }
    }
    Ok(())
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
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let mut model = Model::read(&mut f)?;

    if let Some(path) = args.dump_tables {
        info!(?path, "Saving feature tables");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        let tables = model.tables();
        dump_table(&mut wtr, "current_word", tables.current_word())?;
        dump_table(&mut wtr, "prev_tag", tables.prev_tag())?;
        dump_table(&mut wtr, "next_tag", tables.next_tag())?;
        dump_table(&mut wtr, "prev_word", tables.prev_word())?;
        dump_table(&mut wtr, "next_word", tables.next_word())?;
        dump_table(&mut wtr, "prev_word_word", tables.prev_word_word())?;
        dump_table(&mut wtr, "next_word_word", tables.next_word_word())?;
        dump_table(&mut wtr, "prev_tag_word", tables.prev_tag_word())?;
        dump_table(&mut wtr, "trigram", tables.trigram())?;
        wtr.flush()?;
    }

    if let Some(path) = args.dump_weights {
        info!(?path, "Saving weights");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        let w = model.weights();
        for (name, weight) in [
            ("current_word", w.current_word),
            ("prev_tag", w.prev_tag),
            ("prev_tag_next", w.prev_tag_next),
            ("prev_word", w.prev_word),
            ("next_word", w.next_word),
        ] {
            wtr.serialize(WeightRecord {
                name: name.to_string(),
                weight,
            })?;
        }
        wtr.flush()?;
    }

    let mut weights = model.weights();

    if let Some(path) = args.replace_weights {
        info!(?path, "Loading weights");
        let mut rdr = csv::Reader::from_reader(fs::File::open(path)?);
        for result in rdr.deserialize() {
            let record: WeightRecord = result?;
            let slot = match record.name.as_str() {
                "current_word" => &mut weights.current_word,
                "prev_tag" => &mut weights.prev_tag,
                "prev_tag_next" => &mut weights.prev_tag_next,
                "prev_word" => &mut weights.prev_word,
                "next_word" => &mut weights.next_word,
                name => return Err(format!("unknown weight name: {name}").into()),
            };
            *slot = record.weight;
        }
    }

    for (value, slot) in [
        (args.current_word, &mut weights.current_word),
        (args.prev_tag, &mut weights.prev_tag),
        (args.prev_tag_next, &mut weights.prev_tag_next),
        (args.prev_word, &mut weights.prev_word),
        (args.next_word, &mut weights.next_word),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }

    if weights != model.weights() {
        info!(?weights, "Replacing weights");
        model.set_weights(weights)?;
    }

    if let Some(path) = args.model_out {
        info!(?path, "Saving model file");
        let mut f = zstd::Encoder::new(fs::File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
