use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fretdrill::chord::{parse_chord, PairKey};
use fretdrill::rating::Rating;
use fretdrill::store::{AddOutcome, ChordStore};
use fretdrill::{persist, select};

#[derive(Parser)]
#[command(name = "fretdrill", version, about = "Guitar chord-changes practice tracker")]
struct Cli {
    /// Path to the save file
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add learned chords to the store
    Add {
        /// Chord names, e.g. A Bm C#7
        chords: Vec<String>,
    },

    /// List known chords in the order they were learned
    Chords,

    /// Show every chord pair with its high score, average, and last play
    Pairs,

    /// Pick a pair to practice
    Pick {
        /// Bias selection toward pairs with low high scores
        #[arg(short, long)]
        weighted: bool,

        /// Weighting offset (smaller = stronger bias, default from config)
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Record a finished drill's score for a pair
    Score {
        /// First chord of the pair
        chord_a: String,

        /// Second chord of the pair
        chord_b: String,

        /// Combined changes counted in 60 seconds
        score: u32,
    },

    /// Show practice statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = fretdrill::config::AppConfig::load();

    // Resolve save-file path: CLI > config > XDG default
    let data_path = cli
        .file
        .or(config.data_path.clone())
        .unwrap_or_else(fretdrill::config::default_data_path);
    log::info!("Save file: {}", data_path.display());

    let mut store = persist::load(&data_path)
        .with_context(|| format!("Failed to load {}", data_path.display()))?;

    match cli.command {
        Commands::Add { chords } => {
            if chords.is_empty() {
                anyhow::bail!("No chords given. Pass chord names, e.g. `fretdrill add A Bm C#7`.");
            }

            let mut added = Vec::new();
            let mut duplicate = Vec::new();
            let mut invalid = Vec::new();
            for raw in &chords {
                match store.add_chord(raw) {
                    AddOutcome::Added => added.push(raw.as_str()),
                    AddOutcome::Duplicate => duplicate.push(raw.as_str()),
                    AddOutcome::Invalid => invalid.push(raw.as_str()),
                }
            }

            if !added.is_empty() {
                persist::save(&store, &data_path).context("Failed to save")?;
                println!("Added: {}", added.join(" "));
            }
            if !duplicate.is_empty() {
                println!("Already known: {}", duplicate.join(" "));
            }
            if !invalid.is_empty() {
                println!("Not valid chords: {}", invalid.join(" "));
            }
        }

        Commands::Chords => {
            if store.chords().is_empty() {
                println!("No chords yet. Add some with `fretdrill add`.");
                return Ok(());
            }
            for chord in store.chords() {
                println!("{chord}");
            }
        }

        Commands::Pairs => {
            if store.scores().is_empty() {
                println!("No pairs yet. Add at least two chords first.");
                return Ok(());
            }
            print_pairs_table(&store);
        }

        Commands::Pick { weighted, offset } => {
            let mut rng = rand::thread_rng();
            let key = if weighted {
                let offset = offset.unwrap_or(config.offset);
                select::weighted_random(&store, &mut rng, offset)
            } else {
                select::random_key(&store, &mut rng)
            }
            .context("Nothing to pick")?;

            println!("Practice: {}", key);
            println!("High score to beat: {}", store.highscore(&key));
        }

        Commands::Score { chord_a, chord_b, score } => {
            let a = parse_chord(&chord_a)
                .with_context(|| format!("{chord_a:?} is not a valid chord"))?;
            let b = parse_chord(&chord_b)
                .with_context(|| format!("{chord_b:?} is not a valid chord"))?;
            let key = PairKey::new(a, b)
                .context("A pair needs two different chords")?;

            let old_high = store.highscore(&key);
            if !store.add_score(&key, score, None) {
                anyhow::bail!(
                    "No such pair {key}. Add both chords first with `fretdrill add`."
                );
            }
            persist::save(&store, &data_path).context("Failed to save")?;

            println!("Recorded {score} for {key} ({})", Rating::for_score(score).label());
            if score > old_high {
                println!("New high score! (previous: {old_high})");
            }
        }

        Commands::Stats => {
            println!("Practice Statistics");
            println!("===================");
            println!("Known chords:      {}", store.chords().len());
            println!("Chord pairs:       {}", store.scores().len());
            println!("Recorded attempts: {}", store.total_attempts());

            let played = store
                .scores()
                .keys()
                .filter(|k| store.last_played(k).is_some())
                .count();
            println!("Pairs practiced:   {played}");
        }
    }

    Ok(())
}

/// Print every pair with its high score, average, rating band, and the
/// most recent play.
fn print_pairs_table(store: &ChordStore) {
    println!(
        "{:<12} {:>5} {:>7}  {:<8} {}",
        "Pair", "High", "Avg", "Rating", "Last played"
    );
    println!("{}", "-".repeat(52));

    for key in store.scores().keys() {
        let high = store.highscore(key);
        println!(
            "{:<12} {:>5} {:>7.1}  {:<8} {}",
            key.to_string(),
            high,
            store.avgscore(key),
            Rating::for_score(high).label(),
            store
                .last_played(key)
                .map(format_ts)
                .unwrap_or_else(|| "never".to_string()),
        );
    }
}

/// Render a seconds-since-epoch timestamp as a local-agnostic UTC date.
fn format_ts(ts: f64) -> String {
    DateTime::<Utc>::from_timestamp_millis((ts * 1000.0) as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{ts}"))
}
