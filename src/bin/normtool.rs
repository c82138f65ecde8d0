use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use lexnorm::lm::{DiscountConstants, LanguageModel};
use lexnorm::lookup::{build_lookup, EmbeddingTable, SimilarityLookup};
use lexnorm::ngram::{extract_ngrams, NgramModel};
use lexnorm::normalizer::{read_records, write_records, Normalizer};

#[derive(Parser)]
#[command(name = "normtool", about = "Lexical normalization pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract n-gram counts and the first-letter word index from a corpus
    ExtractNgrams {
        /// Path to the corpus text file
        corpus: PathBuf,
        /// Destination for the LNNG model file
        output: PathBuf,
        /// Order of the n-gram model
        #[arg(short = 'n', long, default_value = "2")]
        order: usize,
    },

    /// Build the similarity lookup from embedding files
    BuildLookup {
        /// Path to the canonical embeddings (word f1 ... fd per line)
        canonical: PathBuf,
        /// Path to the unnormalized embeddings
        unnormalized: PathBuf,
        /// Destination for the LNLK lookup file
        output: PathBuf,
        /// Embedding dimensionality
        #[arg(short, long)]
        dim: usize,
    },

    /// Normalize the records in a JSON file
    Normalize {
        /// Path to the LNNG model file
        model_file: PathBuf,
        /// Path to the LNLK lookup file
        lookup_file: PathBuf,
        /// Path to the JSON file with unnormalized records
        input_file: PathBuf,
        /// Destination for the normalized JSON records
        output_file: PathBuf,
        /// Reproduce the reference discount-assignment slip
        #[arg(long)]
        legacy_discounts: bool,
    },

    /// Print the smoothed probability of a word given a context
    Score {
        /// Path to the LNNG model file
        model_file: PathBuf,
        /// The word to score
        word: String,
        /// Context tokens, oldest first
        context: Vec<String>,
        /// Reproduce the reference discount-assignment slip
        #[arg(long)]
        legacy_discounts: bool,
    },
}

fn open_model(path: &PathBuf) -> NgramModel {
    NgramModel::open(path).unwrap_or_else(|e| {
        eprintln!("Failed to open n-gram model at {}: {}", path.display(), e);
        process::exit(1);
    })
}

fn estimate_discounts(model: &NgramModel, legacy: bool) -> DiscountConstants {
    if legacy {
        DiscountConstants::estimate_legacy(model.counts(), model.order())
    } else {
        DiscountConstants::estimate(model.counts(), model.order())
    }
}

fn main() {
    // No-op unless built with the trace feature; the trace file lands in
    // the working directory.
    lexnorm::init_tracing(Path::new("."));

    let cli = Cli::parse();

    match cli.command {
        Command::ExtractNgrams {
            corpus,
            output,
            order,
        } => {
            let text = fs::read_to_string(&corpus).unwrap_or_else(|e| {
                eprintln!("Failed to read corpus at {}: {}", corpus.display(), e);
                process::exit(1);
            });
            let model = extract_ngrams(&text, order);
            model.save(&output).unwrap_or_else(|e| {
                eprintln!("Failed to save model to {}: {}", output.display(), e);
                process::exit(1);
            });
            println!(
                "Extracted {} words (order {}) to {}",
                model.counts().word_count(),
                order,
                output.display()
            );
        }

        Command::BuildLookup {
            canonical,
            unnormalized,
            output,
            dim,
        } => {
            let canonical_vecs = EmbeddingTable::load(&canonical, dim).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to load canonical embeddings at {}: {}",
                    canonical.display(),
                    e
                );
                process::exit(1);
            });
            let unnormalized_vecs =
                EmbeddingTable::load(&unnormalized, dim).unwrap_or_else(|e| {
                    eprintln!(
                        "Failed to load unnormalized embeddings at {}: {}",
                        unnormalized.display(),
                        e
                    );
                    process::exit(1);
                });

            let lookup = build_lookup(&canonical_vecs, &unnormalized_vecs);
            lookup.save(&output).unwrap_or_else(|e| {
                eprintln!("Failed to save lookup to {}: {}", output.display(), e);
                process::exit(1);
            });
            println!(
                "Built lookup for {} unnormalized words to {}",
                lookup.len(),
                output.display()
            );
        }

        Command::Normalize {
            model_file,
            lookup_file,
            input_file,
            output_file,
            legacy_discounts,
        } => {
            let model = open_model(&model_file);
            let lookup = SimilarityLookup::open(&lookup_file).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to open lookup at {}: {}",
                    lookup_file.display(),
                    e
                );
                process::exit(1);
            });
            let mut records = read_records(&input_file).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to read records at {}: {}",
                    input_file.display(),
                    e
                );
                process::exit(1);
            });

            let discounts = estimate_discounts(&model, legacy_discounts);
            let lm = LanguageModel::new(model.counts(), discounts);
            let normalizer = Normalizer::new(&lm, model.index(), &lookup, model.order());

            normalizer.normalize_records(&mut records);

            write_records(&output_file, &records).unwrap_or_else(|e| {
                eprintln!(
                    "Failed to write records to {}: {}",
                    output_file.display(),
                    e
                );
                process::exit(1);
            });
            println!(
                "Normalized {} records to {}",
                records.len(),
                output_file.display()
            );
        }

        Command::Score {
            model_file,
            word,
            context,
            legacy_discounts,
        } => {
            let model = open_model(&model_file);
            let discounts = estimate_discounts(&model, legacy_discounts);
            let lm = LanguageModel::new(model.counts(), discounts);
            println!(
                "P({} | {}) = {}",
                word,
                context.join(" "),
                lm.probability(&word, &context)
            );
        }
    }
}
