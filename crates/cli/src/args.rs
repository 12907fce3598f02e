//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use inventario_core::ActorId;

#[derive(Debug, Parser)]
#[command(name = "inventario", about = "Inventory ledger with an audited stock-out log", version)]
pub struct Cli {
    /// Actor recorded on stock-outs (UUID). Omit for anonymous movements.
    #[arg(long, global = true, env = "INVENTARIO_ACTOR")]
    pub actor: Option<ActorId>,

    /// JSON configuration file; INVENTARIO_* variables still override it.
    #[arg(long, global = true, env = "INVENTARIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides INVENTARIO_DATABASE_URL.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Print results as pretty JSON.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every item.
    List,
    /// Add an item.
    Add {
        name: String,
        code: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Delete an item by id or code.
    Delete { item: String },
    /// Overwrite an item's quantity (no movement is recorded).
    SetQuantity {
        item: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Take units out of an item and record the movement.
    Out {
        item: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
        #[arg(long, short)]
        observation: Option<String>,
    },
    /// Stock-out several items from a CSV file: item,quantity[,observation].
    /// The first row is a header; bad lines are counted and skipped.
    OutBatch { file: PathBuf },
    /// Import items from a CSV file: name,code,quantity. The first row is a header.
    Import { file: PathBuf },
    /// Show the most recent movements, newest first.
    Movements {
        #[arg(long)]
        limit: Option<usize>,
    },
}
