//! spectra CLI
//!
//! Command-line interface for maintaining a local spectroscopic line
//! catalogue synchronised from VAMDC data nodes.

mod commands;
mod error;
mod logging;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub(crate) use error::CliError;
pub(crate) use logging::log_blank;

#[derive(Parser)]
#[command(name = "spectra")]
#[command(about = "Maintain a local spectroscopic line catalogue", long_about = None)]
struct Cli {
    /// Catalogue database (defaults to the settings file, then the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalogue database
    Init,

    /// Check nodes for newer data without importing anything
    Check {
        /// Species ids to check (e.g., XCDMS-28); all when omitted
        #[arg(value_delimiter = ',')]
        species: Vec<String>,

        /// Delete species the node no longer offers
        #[arg(long)]
        delete_archived: bool,
    },

    /// Synchronise the catalogue with its nodes
    Update {
        /// Species ids to update; all eligible species when omitted
        #[arg(value_delimiter = ',')]
        species: Vec<String>,

        /// Re-import every species that is not kept, whatever its status
        #[arg(short, long)]
        force: bool,

        /// Only look for new species
        #[arg(long, conflicts_with = "update_only")]
        insert_only: bool,

        /// Do not look for new species
        #[arg(long)]
        update_only: bool,

        /// Skip the last-modified check
        #[arg(long)]
        no_check: bool,

        /// Delete species the node no longer offers
        #[arg(long)]
        delete_archived: bool,
    },

    /// Add placeholders for species a node offers but the catalogue lacks
    Discover {
        /// Nodes to search besides those already in the catalogue (name or identifier)
        #[arg(short, long, value_delimiter = ',')]
        nodes: Vec<String>,
    },

    /// List species records
    List {
        /// Only records of this species id
        #[arg(short, long)]
        species: Option<String>,

        /// Only records with this status (e.g., "Update Failed")
        #[arg(long)]
        status: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show catalogue statistics
    Stats,

    /// Delete a species with all of its records and transitions
    Delete {
        /// Species id (e.g., XCDMS-28)
        species: String,

        /// Actually delete
        #[arg(long)]
        confirm: bool,
    },

    /// Protect a record from automatic updates, or lift the protection
    Keep {
        #[command(subcommand)]
        action: KeepAction,
    },

    /// Search transitions by frequency
    Lines {
        /// Lower frequency bound in MHz
        fmin: f64,

        /// Upper frequency bound in MHz
        fmax: f64,

        /// Maximum number of lines to print
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Show settings and known nodes
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum KeepAction {
    /// Mark a record as kept
    Set {
        /// Record id
        id: i64,
    },

    /// Return a kept record to automatic updates
    Clear {
        /// Record id
        id: i64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Print the settings file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Init => commands::init::run_init(cli.db),
        Commands::Check {
            species,
            delete_archived,
        } => commands::sync::run_check(cli.db, species, delete_archived, cli.quiet),
        Commands::Update {
            species,
            force,
            insert_only,
            update_only,
            no_check,
            delete_archived,
        } => {
            let flags = commands::sync::UpdateFlags {
                species,
                force,
                insert_only,
                update_only,
                check_freshness: !no_check,
                delete_archived,
            };
            commands::sync::run_update(cli.db, flags, cli.quiet)
        }
        Commands::Discover { nodes } => commands::sync::run_discover(cli.db, nodes, cli.quiet),
        Commands::List {
            species,
            status,
            json,
        } => commands::list::run_list(cli.db, species, status, json),
        Commands::Stats => commands::stats::run_stats(cli.db),
        Commands::Delete { species, confirm } => {
            commands::delete::run_delete(cli.db, &species, confirm)
        }
        Commands::Keep { action } => match action {
            KeepAction::Set { id } => commands::keep::run_keep(cli.db, id, true),
            KeepAction::Clear { id } => commands::keep::run_keep(cli.db, id, false),
        },
        Commands::Lines { fmin, fmax, limit } => {
            commands::lines::run_lines(cli.db, fmin, fmax, limit)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(cli.db),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
