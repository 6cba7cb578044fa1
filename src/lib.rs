//! topo-sync: keep the transit topo entity store in step with the
//! transport.data.gouv.fr catalog.
//!
//! The tool lists the catalog's datasets, makes sure the entity store holds
//! one producer per dataset, and imports every GTFS resource of the
//! public-transit datasets through the external `import-gtfs` tool.
//!
//! # Modules
//!
//! - [`catalog`]: catalog model and fetching
//! - [`store`]: the entity store operations and their implementations
//! - [`sync`]: producer resolution, creation and resource import
//! - [`config`]: run settings
//! - [`error`]: error types for topo-sync operations

pub mod catalog;
pub mod config;
pub mod error;
pub mod log;
pub mod store;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::TopoSyncError;

use config::{CatalogSource, Programs, Settings};
use store::{CommandStore, EntityStore};
use sync::{ImportOptions, SyncContext};

/// The topo-sync CLI application.
#[derive(Parser)]
#[command(name = "topo-sync")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags shared by every subcommand.
#[derive(clap::Args)]
struct GlobalArgs {
    /// Wikibase API endpoint of the entity store.
    #[arg(long, global = true, default_value = config::DEFAULT_API)]
    api: String,

    /// SPARQL endpoint of the entity store.
    #[arg(long, global = true, default_value = config::DEFAULT_SPARQL)]
    sparql: String,

    /// Catalog endpoint listing the datasets.
    #[arg(long, global = true, default_value = config::DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Read the catalog from a JSON file instead of the endpoint.
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Identifier of the data_gouv_url property. Created on first use when unset.
    #[arg(long, global = true)]
    property_id: Option<String>,

    /// Entity store command-line tool.
    #[arg(long, global = true, default_value = "entities")]
    entities_bin: String,

    /// Store pre-seeding tool.
    #[arg(long, global = true, default_value = "prepopulate")]
    prepopulate_bin: String,

    /// GTFS import tool.
    #[arg(long, global = true, default_value = "import-gtfs")]
    import_gtfs_bin: String,
}

impl GlobalArgs {
    fn into_settings(self) -> Settings {
        let catalog = match self.catalog_file {
            Some(path) => CatalogSource::File(path),
            None => CatalogSource::Remote(self.catalog_url),
        };

        Settings {
            api: self.api,
            sparql: self.sparql,
            catalog,
            property_id: self.property_id,
            programs: Programs {
                entities: self.entities_bin,
                prepopulate: self.prepopulate_bin,
                import_gtfs: self.import_gtfs_bin,
            },
            ..Default::default()
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Pre-seed the entity store.
    Prepopulate,
    /// Create the data_gouv_url property and print its identifier.
    CreateDataGouvUrlProp,
    /// Create one producer per catalog dataset.
    CreateAllProducer,
    /// Import the GTFS resources of every public-transit dataset.
    ImportAllRessources(ImportArgs),
    /// Run prepopulate, create-data-gouv-url-prop and create-all-producer.
    Init,
}

/// Arguments for the import-all-ressources subcommand.
#[derive(clap::Args)]
struct ImportArgs {
    /// Re-import feeds already present in the store.
    #[arg(long = "override")]
    override_existing: bool,

    /// Exit non-zero if any import failed.
    #[arg(long)]
    fail_on_error: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the topo-sync CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TopoSyncError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("topo-sync {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Synchronize the transport.data.gouv.fr catalog with the transit topo entity store.");
        println!();
        println!("Run 'topo-sync --help' for usage information.");
        return Ok(());
    };

    log::init();

    let settings = cli.global.into_settings();
    let mut store = CommandStore::new(&settings);
    let mut ctx = SyncContext::new(settings);

    match command {
        Commands::Prepopulate => store.prepopulate(),
        Commands::CreateDataGouvUrlProp => run_create_property(&mut ctx, &mut store),
        Commands::CreateAllProducer => run_create_all_producer(&mut ctx, &mut store),
        Commands::ImportAllRessources(args) => run_import(&mut ctx, &mut store, args),
        Commands::Init => run_init(&mut ctx, &mut store),
    }
}

fn run_create_property(
    ctx: &mut SyncContext,
    store: &mut dyn EntityStore,
) -> Result<(), TopoSyncError> {
    let id = ctx.create_property(store)?;
    println!("{id}");
    Ok(())
}

fn run_create_all_producer(
    ctx: &mut SyncContext,
    store: &mut dyn EntityStore,
) -> Result<(), TopoSyncError> {
    let datasets = catalog::load_catalog(&ctx.settings().catalog)?;
    let summary = ctx.create_all_producers(store, &datasets)?;
    println!("{summary}");
    Ok(())
}

fn run_import(
    ctx: &mut SyncContext,
    store: &mut dyn EntityStore,
    args: ImportArgs,
) -> Result<(), TopoSyncError> {
    if !matches!(args.output.as_str(), "text" | "json") {
        return Err(TopoSyncError::UnsupportedOutput(format!(
            "'{}' (supported: text, json)",
            args.output
        )));
    }

    let datasets = catalog::load_catalog(&ctx.settings().catalog)?;
    let opts = ImportOptions {
        override_existing: args.override_existing,
    };
    let report = ctx.import_all(store, &datasets, &opts)?;

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report).map_err(TopoSyncError::ReportWrite)?;
            println!("{json}");
        }
        _ => print!("{report}"),
    }

    // Partial failures only change the exit status when asked to.
    if args.fail_on_error && !report.is_clean() {
        return Err(TopoSyncError::ImportFailures {
            count: report.failure_count(),
        });
    }
    Ok(())
}

fn run_init(ctx: &mut SyncContext, store: &mut dyn EntityStore) -> Result<(), TopoSyncError> {
    store.prepopulate()?;
    run_create_property(ctx, store)?;
    run_create_all_producer(ctx, store)
}
