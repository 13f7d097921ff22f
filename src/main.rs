use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use clinic_rank::config;
use clinic_rank::output;
use clinic_rank::rating::{self, RatingConfig};
use clinic_rank::store::{self, ClinicFilter, ClinicStore};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_INPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_STALE: i32 = 5;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List clinics ranked by composite score (default if no subcommand)
    List {
        /// Only clinics in this city (case-insensitive)
        #[arg(long)]
        city: Option<String>,

        /// Only clinics whose slug matches this glob (e.g. "dent-*")
        #[arg(long)]
        slug: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Show at most this many clinics
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one clinic with a breakdown of every index
    Show {
        slug: String,
    },
    /// Rate a signals file (YAML or JSON) without storing anything
    Score {
        path: PathBuf,
    },
    /// Add or update clinics from a YAML or JSON file
    Import {
        path: PathBuf,
    },
    /// Remove a clinic from the store
    Remove {
        slug: String,
    },
    /// Recompute stored indices with the current rating config
    Rescore,
    /// List clinics whose stored indices are out of date
    Check,
    /// Write a config file with the default rating constants
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "clinic-rank")]
#[command(about = "Rate and rank dental clinics", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/clinic-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the clinic store (overrides the config file)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,clinic_rank=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::List {
        city: None,
        slug: None,
        format: OutputFormat::Table,
        limit: None,
    });

    // Init runs before config loading so a broken config can be replaced
    if let Commands::Init { force } = command {
        let path = match cli.config {
            Some(p) => p,
            None => match config::get_config_path() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            },
        };
        if let Err(e) = config::write_default_config(&path, force) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Wrote default config to {}", path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    let app_config = match config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate rating config at startup
    let rating_config = app_config.effective_rating();
    if let Err(errors) = rating::validate_rating(&rating_config) {
        eprintln!("Rating config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    // Score touches no store
    if let Commands::Score { path } = &command {
        score_file(path, &rating_config);
        std::process::exit(EXIT_SUCCESS);
    }

    let store_path = match config::resolve_store_path(cli.store, &app_config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Store error: {:#}", e);
            std::process::exit(EXIT_STORE);
        }
    };
    let mut clinics = match store::load_store(&store_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Store error: {:#}", e);
            std::process::exit(EXIT_STORE);
        }
    };

    let code = match command {
        Commands::List {
            city,
            slug,
            format,
            limit,
        } => list(&clinics, city.as_deref(), slug.as_deref(), format, limit),
        Commands::Show { slug } => show(&clinics, &slug, &rating_config),
        Commands::Import { path } => import(&mut clinics, &store_path, &path, &rating_config),
        Commands::Remove { slug } => remove(&mut clinics, &store_path, &slug),
        Commands::Rescore => rescore(&mut clinics, &store_path, &rating_config),
        Commands::Check => check(&clinics, &rating_config),
        Commands::Score { .. } | Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

fn persist(store_path: &Path, clinics: &ClinicStore) -> Result<(), i32> {
    store::save_store(store_path, clinics).map_err(|e| {
        eprintln!("Store error: {:#}", e);
        EXIT_STORE
    })
}

fn score_file(path: &Path, rating_config: &RatingConfig) {
    let signals = match store::read_signals(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };
    if let Err(errors) = rating::validate_signals(&signals) {
        eprintln!("Invalid signals in {}:", path.display());
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_INPUT);
    }

    let explanation = rating::explain_ratings(&signals, rating_config);
    println!(
        "{}",
        output::format_explanation(&explanation, output::should_use_colors())
    );
}

fn list(
    clinics: &ClinicStore,
    city: Option<&str>,
    slug: Option<&str>,
    format: OutputFormat,
    limit: Option<usize>,
) -> i32 {
    let filter = match ClinicFilter::new(city, slug) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_INPUT;
        }
    };

    let mut ranked = clinics.ranked(&filter);
    if let Some(n) = limit {
        ranked.truncate(n);
    }
    tracing::debug!(total = clinics.len(), shown = ranked.len(), "listing clinics");

    match format {
        OutputFormat::Table => {
            println!(
                "{}",
                output::format_ranked_table(&ranked, output::should_use_colors())
            );
        }
        OutputFormat::Tsv => {
            let tsv = output::format_tsv(&ranked);
            if !tsv.is_empty() {
                println!("{}", tsv);
            }
        }
        OutputFormat::Json => match output::format_json(&ranked) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{:#}", e);
                return EXIT_STORE;
            }
        },
    }
    EXIT_SUCCESS
}

fn show(clinics: &ClinicStore, slug: &str, rating_config: &RatingConfig) -> i32 {
    let Some(record) = clinics.get(slug) else {
        eprintln!("No clinic with slug '{}'", slug);
        return EXIT_NOT_FOUND;
    };

    if record.is_stale(rating_config) {
        tracing::warn!(slug, "stored indices are out of date; run `clinic-rank rescore`");
    }

    let explanation = rating::explain_ratings(&record.signals, rating_config);
    println!(
        "{}",
        output::format_clinic_detail(record, &explanation, output::should_use_colors())
    );
    EXIT_SUCCESS
}

/// Import is all-or-nothing: one invalid record leaves the store untouched
fn import(
    clinics: &mut ClinicStore,
    store_path: &Path,
    path: &Path,
    rating_config: &RatingConfig,
) -> i32 {
    let records = match store::read_clinic_records(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let (inserted, updated) = match clinics.import_all(records, rating_config, Utc::now()) {
        Ok(counts) => counts,
        Err(errors) => {
            eprintln!("Invalid clinics in {}:", path.display());
            for error in errors {
                eprintln!("  - {}", error);
            }
            return EXIT_INPUT;
        }
    };

    if let Err(code) = persist(store_path, clinics) {
        return code;
    }

    println!(
        "Imported {} clinics ({} new, {} updated)",
        inserted + updated,
        inserted,
        updated
    );
    EXIT_SUCCESS
}

fn remove(clinics: &mut ClinicStore, store_path: &Path, slug: &str) -> i32 {
    if !clinics.remove(slug) {
        eprintln!("No clinic with slug '{}'", slug);
        return EXIT_NOT_FOUND;
    }
    if let Err(code) = persist(store_path, clinics) {
        return code;
    }
    println!("Removed {}", slug);
    EXIT_SUCCESS
}

fn rescore(clinics: &mut ClinicStore, store_path: &Path, rating_config: &RatingConfig) -> i32 {
    let changed = clinics.rescore(rating_config, Utc::now());
    if changed > 0 {
        if let Err(code) = persist(store_path, clinics) {
            return code;
        }
    }
    println!("Rescored {} of {} clinics", changed, clinics.len());
    EXIT_SUCCESS
}

fn check(clinics: &ClinicStore, rating_config: &RatingConfig) -> i32 {
    let stale = clinics.stale(rating_config);
    if stale.is_empty() {
        println!("All {} clinics are up to date", clinics.len());
        return EXIT_SUCCESS;
    }

    for record in &stale {
        println!("{}", record.slug);
    }
    eprintln!(
        "{} of {} clinics have out-of-date indices. Run `clinic-rank rescore`.",
        stale.len(),
        clinics.len()
    );
    EXIT_STALE
}
