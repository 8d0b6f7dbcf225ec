//! Command-line driver for `places_core`.
//!
//! # Responsibility
//! - Wire configuration, logging and the SQLite store into the repositories.
//! - Print results as one JSON document per line.

use clap::{Parser, Subcommand};
use log::error;
use places_core::{
    init_logging, ComponentsQuery, Document, PlaceRepository, PlacesConfig, Point, SortSpec,
};
use serde_json::Value;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "places", version, about = "Query geographic places in a document store")]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `store.path` from the configuration.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bulk-load a JSON array of place documents.
    Load { file: PathBuf },
    /// Print one place by id.
    Get { id: String },
    /// List places in store order.
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print the flattened address components view.
    Components {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        limit: Option<u64>,
        /// Field path to sort ascending by, e.g. `address_components.long_name`.
        #[arg(long)]
        sort_by: Option<String>,
    },
    /// Print distinct country names.
    Countries,
    /// Print ids of places in the given country code.
    IdsByCountry { code: String },
    /// Print places near a point, nearest first.
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long)]
        max_meters: Option<f64>,
    },
    /// Manage the 2dsphere index on `geometry.geolocation`.
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Debug, Subcommand)]
enum IndexAction {
    Create,
    Drop,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => PlacesConfig::load(path)?,
        None => PlacesConfig::default(),
    };
    if let Some(db) = cli.db {
        config.store.path = Some(db);
    }
    init_logging(&config.logging)?;

    let conn = config.store.open()?;
    let places = PlaceRepository::new(config.store.places(&conn));

    match cli.command {
        Command::Load { file } => {
            let inserted = places.load_all(BufReader::new(File::open(&file)?))?;
            println!("{}", serde_json::json!({ "inserted": inserted }));
        }
        Command::Get { id } => match places.find_by_id(&id)? {
            Some(place) => print_document(&place.to_document()),
            None => return Err(format!("place `{id}` not found").into()),
        },
        Command::List { offset, limit } => {
            for place in places.find_all(offset, limit)? {
                print_document(&place?.to_document());
            }
        }
        Command::Components {
            offset,
            limit,
            sort_by,
        } => {
            let query = ComponentsQuery {
                sort: sort_by.map(SortSpec::ascending),
                offset,
                limit,
            };
            for row in places.address_components(&query)? {
                print_document(&row?);
            }
        }
        Command::Countries => {
            for name in places.country_names()? {
                println!("{}", Value::String(name));
            }
        }
        Command::IdsByCountry { code } => {
            for id in places.find_ids_by_country_code(&code)? {
                println!("{}", Value::String(id.to_string()));
            }
        }
        Command::Near {
            lng,
            lat,
            max_meters,
        } => {
            for doc in places.near(&Point::new(lng, lat), max_meters)? {
                print_document(&doc?);
            }
        }
        Command::Index { action } => match action {
            IndexAction::Create => println!("{}", places.create_geo_index()?),
            IndexAction::Drop => places.drop_geo_index()?,
        },
    }
    Ok(())
}

fn print_document(doc: &Document) {
    println!("{}", Value::Object(doc.clone()));
}
