// src/main.rs
//
// Command line front end
//
// Every command prints JSON on stdout. Failures print an ErrorResponse and
// exit with a non-zero status.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use coffee_tracker::application::commands::*;
use coffee_tracker::application::{
    AppState, CommandResult, CreateCoffeeDto, ErrorResponse, ListCoffeesDto, UpdateCoffeeDto,
};
use coffee_tracker::config::AppConfig;

// ============================================================================
// CLI
// ============================================================================

/// Coffee tasting log with optional cloud sync
#[derive(Parser, Debug)]
#[command(name = "coffee-tracker")]
#[command(version)]
struct Cli {
    /// Local database file (overrides COFFEE_TRACKER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Remote backend URL (overrides SUPABASE_URL)
    #[arg(long, global = true)]
    supabase_url: Option<String>,

    /// Remote backend API key (overrides SUPABASE_ANON_KEY)
    #[arg(long, global = true)]
    supabase_key: Option<String>,

    /// Remote request timeout in milliseconds (overrides COFFEE_TRACKER_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List entries
    List {
        /// Case-insensitive match on roaster or description
        #[arg(long)]
        search: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// date, rating, roaster, price-low-high, price-high-low or value
        #[arg(long)]
        sort: Option<String>,
        /// Group by roaster and preparation variant
        #[arg(long)]
        grouped: bool,
    },
    /// Show one entry with its derived figures
    Show { id: i64 },
    /// Add an entry
    Add(EntryArgs),
    /// Change fields of an entry; an empty value clears a text field
    Update {
        id: i64,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete an entry
    Delete { id: i64 },
    /// Copy an entry as a new preparation variant
    Vary { id: i64 },
    /// Collection statistics
    Stats,
    /// Active backend and local storage details
    Info,
    /// Export the collection to FILE, or to stdout
    Export { file: Option<PathBuf> },
    /// Import an export file, replacing the collection unless --merge
    Import {
        file: PathBuf,
        #[arg(long)]
        merge: bool,
    },
    /// Replace the collection with the bundled sample data
    Reset,
    /// Fill fields that older entries are missing
    Upgrade,
    /// Copy the local snapshot to the remote backend
    Migrate,
    /// Delete every remote entry
    ClearRemote {
        #[arg(long)]
        pin: String,
    },
    /// Check the access PIN against the remote backend
    VerifyPin { pin: String },
}

#[derive(Args, Debug)]
struct EntryArgs {
    #[arg(long)]
    roaster: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    favorite: bool,
    /// Bought pre-ground
    #[arg(long)]
    grinded: bool,
    #[arg(long)]
    grinding_time: Option<String>,
    #[arg(long)]
    grinding_degree: Option<String>,
    /// Grams per brew
    #[arg(long)]
    coffee_amount: Option<String>,
    /// Cups per brew
    #[arg(long)]
    servings: Option<String>,
    #[arg(long)]
    arabica: Option<i32>,
    #[arg(long)]
    crema_rating: Option<u8>,
    #[arg(long)]
    taste_rating: Option<u8>,
    #[arg(long)]
    taste_notes: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    comment: Option<String>,
    /// Comma-separated country codes
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    roast_level: Option<String>,
    #[arg(long)]
    brewing_method: Option<String>,
    #[arg(long)]
    recommended_method: Option<String>,
    #[arg(long)]
    price: Option<String>,
    /// Package size in grams
    #[arg(long)]
    package_size: Option<u32>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    preparation_notes: Option<String>,
    #[arg(long)]
    coffee_group: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    roaster: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    favorite: Option<bool>,
    #[arg(long)]
    grinded: Option<bool>,
    #[arg(long)]
    grinding_time: Option<String>,
    #[arg(long)]
    grinding_degree: Option<String>,
    #[arg(long)]
    coffee_amount: Option<String>,
    #[arg(long)]
    servings: Option<String>,
    #[arg(long)]
    arabica: Option<i32>,
    #[arg(long)]
    crema_rating: Option<u8>,
    #[arg(long)]
    taste_rating: Option<u8>,
    #[arg(long)]
    taste_notes: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    comment: Option<String>,
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    roast_level: Option<String>,
    #[arg(long)]
    brewing_method: Option<String>,
    #[arg(long)]
    recommended_method: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    package_size: Option<u32>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    preparation_notes: Option<String>,
    #[arg(long)]
    coffee_group: Option<String>,
}

impl From<EntryArgs> for CreateCoffeeDto {
    fn from(args: EntryArgs) -> Self {
        Self {
            roaster: args.roaster,
            description: args.description,
            favorite: args.favorite,
            grinded: args.grinded,
            grinding_time: args.grinding_time,
            grinding_degree: args.grinding_degree,
            coffee_amount: args.coffee_amount,
            servings: args.servings,
            percent_arabica: args.arabica,
            crema_rating: args.crema_rating,
            taste_rating: args.taste_rating,
            taste_notes: args.taste_notes,
            url: args.url,
            comment: args.comment,
            origin: args.origin,
            roast_level: args.roast_level,
            brewing_method: args.brewing_method,
            recommended_method: args.recommended_method,
            price: args.price,
            package_size: args.package_size,
            currency: args.currency,
            preparation_notes: args.preparation_notes,
            coffee_group: args.coffee_group,
        }
    }
}

impl From<UpdateArgs> for UpdateCoffeeDto {
    fn from(args: UpdateArgs) -> Self {
        Self {
            roaster: args.roaster,
            description: args.description,
            favorite: args.favorite,
            grinded: args.grinded,
            grinding_time: args.grinding_time,
            grinding_degree: args.grinding_degree,
            coffee_amount: args.coffee_amount,
            servings: args.servings,
            percent_arabica: args.arabica,
            crema_rating: args.crema_rating,
            taste_rating: args.taste_rating,
            taste_notes: args.taste_notes,
            url: args.url,
            comment: args.comment,
            origin: args.origin,
            roast_level: args.roast_level,
            brewing_method: args.brewing_method,
            recommended_method: args.recommended_method,
            price: args.price,
            package_size: args.package_size,
            currency: args.currency,
            preparation_notes: args.preparation_notes,
            coffee_group: args.coffee_group,
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

/// Filter used when `RUST_LOG` is unset
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // 1. CONFIGURATION
    let mut config = AppConfig::from_env()?
        .with_remote(cli.supabase_url.clone(), cli.supabase_key.clone());
    if let Some(path) = cli.db.clone() {
        config = config.with_database_path(path);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    log::debug!("Using database at {}", config.database_path.display());

    // 2. STATE
    let state = AppState::initialize(&config)?;

    // 3. COMMAND
    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::List {
            search,
            favorites,
            sort,
            grouped,
        } => {
            let dto = ListCoffeesDto {
                search,
                favorites_only: favorites,
                sort,
            };
            if grouped {
                emit(list_coffees_grouped(state, dto).await)
            } else {
                emit(list_coffees(state, dto).await)
            }
        }
        Command::Show { id } => emit(get_coffee(state, id).await),
        Command::Add(args) => emit(create_coffee(state, args.into()).await),
        Command::Update { id, fields } => emit(update_coffee(state, id, fields.into()).await),
        Command::Delete { id } => emit(delete_coffee(state, id).await),
        Command::Vary { id } => emit(create_variation(state, id).await),
        Command::Stats => emit(get_statistics(state).await),
        Command::Info => emit(storage_info(state).await),
        Command::Export { file: Some(path) } => emit(export_to_file(state, &path).await),
        Command::Export { file: None } => emit(export_collection(state).await),
        Command::Import { file, merge } => emit(import_from_file(state, &file, merge).await),
        Command::Reset => emit(reset_collection(state).await),
        Command::Upgrade => emit(upgrade_collection(state).await),
        Command::Migrate => emit(migrate_to_remote(state).await),
        Command::ClearRemote { pin } => emit(clear_remote(state, &pin).await.map(|()| Done::new())),
        Command::VerifyPin { pin } => emit(verify_pin(state, &pin).await),
    }
}

#[derive(Serialize)]
struct Done {
    success: bool,
}

impl Done {
    fn new() -> Self {
        Self { success: true }
    }
}

/// Print the command result as JSON
fn emit<T: Serialize>(result: CommandResult<T>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            report(&error);
            println!("{}", serde_json::to_string_pretty(&error)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(error: &ErrorResponse) {
    if error.error_type.is_warning() {
        log::warn!("{}", error.message);
    } else {
        log::error!("{}", error.message);
    }
}
