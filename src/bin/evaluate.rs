extern crate clap;
extern crate failure;
extern crate rand;
extern crate rand_xorshift;
extern crate recoeval;
extern crate serde_json;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recoeval::data::GroupBy;
use recoeval::datasets::{
    load_interactions, load_predictions, load_raw_interactions, write_classes, write_interactions,
    write_labeled, ColumnNames,
};
use recoeval::encoding::{encode_user_item, EncodedInteractions};
use recoeval::evaluation::{ranking_metrics, rating_metrics};
use recoeval::sampling::NegativeSampler;
use recoeval::split::{chrono_split, stratified_split};
use recoeval::EvaluationError;

#[derive(Parser)]
#[command(name = "evaluate")]
#[command(about = "Offline evaluation of recommender models", long_about = None)]
#[command(version)]
struct Cli {
    /// Column holding user ids
    #[arg(long, global = true, default_value = "user_id")]
    user_col: String,

    /// Column holding item ids
    #[arg(long, global = true, default_value = "item_id")]
    item_col: String,

    /// Column holding ratings or scores
    #[arg(long, global = true, default_value = "rating")]
    rating_col: String,

    /// Column holding timestamps
    #[arg(long, global = true, default_value = "timestamp")]
    timestamp_col: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Chrono,
    Stratified,
}

#[derive(Clone, Copy, ValueEnum)]
enum Group {
    User,
    Item,
}

impl From<Group> for GroupBy {
    fn from(group: Group) -> Self {
        match group {
            Group::User => GroupBy::User,
            Group::Item => GroupBy::Item,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw interactions and split them per user or item
    Split {
        /// Raw interactions CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory; partition i is written to split_i.csv and the
        /// id mappings to users.csv and items.csv
        #[arg(short, long)]
        output: PathBuf,

        /// Partition ratios, summing to 1
        #[arg(long, value_delimiter = ',', default_value = "0.8,0.2")]
        ratios: Vec<f64>,

        /// Splitting strategy
        #[arg(long, value_enum, default_value = "chrono")]
        strategy: Strategy,

        /// Grouping column
        #[arg(long, value_enum, default_value = "user")]
        group_by: Group,
    },

    /// Encode raw interactions and write them with sampled negatives
    Negatives {
        /// Raw interactions CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV of user_id,item_id,label rows; id mappings are written
        /// next to it with .users.csv and .items.csv extensions
        #[arg(short, long)]
        output: PathBuf,

        /// Ratings at or above this value are positive feedback
        #[arg(long, default_value = "1.0")]
        threshold: f32,

        /// Negatives drawn per positive
        #[arg(long, default_value = "1.0")]
        ratio: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u8,
    },

    /// Score predictions against held-out ground truth
    Score {
        /// Encoded ground-truth CSV
        #[arg(short, long)]
        truth: PathBuf,

        /// Encoded predictions CSV; scores are read from the rating column
        #[arg(short, long)]
        predictions: PathBuf,

        /// Cut-off for ranking metrics
        #[arg(short, long, default_value = "10")]
        k: usize,
    },
}

impl Cli {
    fn columns(&self) -> ColumnNames {
        ColumnNames::default()
            .user(&self.user_col)
            .item(&self.item_col)
            .rating(&self.rating_col)
            .timestamp(&self.timestamp_col)
    }
}

fn write_encoders(
    encoded: &EncodedInteractions,
    users: &Path,
    items: &Path,
) -> Result<(), failure::Error> {
    write_classes(File::create(users)?, &encoded.user_encoder)?;
    write_classes(File::create(items)?, &encoded.item_encoder)?;

    info!(
        "Wrote id mappings for {} users to {} and {} items to {}",
        encoded.num_users(),
        users.display(),
        encoded.num_items(),
        items.display()
    );

    Ok(())
}

fn split(
    columns: &ColumnNames,
    input: &Path,
    output: &Path,
    ratios: &[f64],
    strategy: Strategy,
    group_by: GroupBy,
) -> Result<(), failure::Error> {
    let encoded = encode_user_item(&load_raw_interactions(input, columns)?)?;

    let splits = match strategy {
        Strategy::Chrono => chrono_split(&encoded.interactions, ratios, group_by)?,
        Strategy::Stratified => stratified_split(&encoded.interactions, ratios, group_by)?,
    };

    ::std::fs::create_dir_all(output)?;

    for (idx, split) in splits.iter().enumerate() {
        let path = output.join(format!("split_{}.csv", idx));
        write_interactions(File::create(&path)?, split)?;
        info!("Wrote {} rows to {}", split.len(), path.display());
    }

    write_encoders(
        &encoded,
        &output.join("users.csv"),
        &output.join("items.csv"),
    )
}

fn negatives(
    columns: &ColumnNames,
    input: &Path,
    output: &Path,
    threshold: f32,
    ratio: f64,
    seed: u8,
) -> Result<(), failure::Error> {
    let encoded = encode_user_item(&load_raw_interactions(input, columns)?)?;

    let samples = NegativeSampler::new(threshold)
        .ratio_neg_per_user(ratio)
        .rng(XorShiftRng::from_seed([seed; 16]))
        .sample(encoded.interactions.data())?;

    write_labeled(File::create(output)?, &samples)?;
    info!("Wrote {} labelled rows to {}", samples.len(), output.display());

    write_encoders(
        &encoded,
        &output.with_extension("users.csv"),
        &output.with_extension("items.csv"),
    )
}

fn score(
    columns: &ColumnNames,
    truth: &Path,
    predictions: &Path,
    k: usize,
) -> Result<(), failure::Error> {
    let truth = load_interactions(truth, columns)?;
    let predictions = load_predictions(predictions, columns)?;

    let ranking = ranking_metrics(truth.data(), &predictions, k)?;
    let rating = match rating_metrics(truth.data(), &predictions) {
        Ok(rating) => Some(rating.rounded()),
        Err(EvaluationError::EmptyJoin) => {
            warn!("Predictions cover no ground-truth pair; skipping rating metrics");
            None
        }
        Err(error) => return Err(error.into()),
    };

    let report = serde_json::json!({
        "k": k,
        "ranking": ranking.rounded(),
        "rating": rating,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn main() -> Result<(), failure::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(::std::io::stderr))
        .init();

    let cli = Cli::parse();
    let columns = cli.columns();

    match cli.command {
        Commands::Split {
            ref input,
            ref output,
            ref ratios,
            strategy,
            group_by,
        } => split(&columns, input, output, ratios, strategy, group_by.into()),
        Commands::Negatives {
            ref input,
            ref output,
            threshold,
            ratio,
            seed,
        } => negatives(&columns, input, output, threshold, ratio, seed),
        Commands::Score {
            ref truth,
            ref predictions,
            k,
        } => score(&columns, truth, predictions, k),
    }
}
