use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use thrift_core::units::{ImperialPrecision, Unit};

#[derive(Parser, Debug)]
#[command(name = "thrift")]
#[command(bin_name = "thrift")]
#[command(version, about = "Track woodworking projects, cut lists and material inventory", long_about = None)]
pub(crate) struct Opts {
    #[command(subcommand)]
    pub(crate) command: Command,

    /// Directory holding the saved state. Defaults to the platform data directory.
    #[arg(long, env = "THRIFT_DATA_DIR", global = true)]
    pub(crate) data_dir: Option<PathBuf>,

    /// Quiet period after the last change before state is written
    #[arg(long, value_name = "MILLISECONDS", default_value_t = 500, global = true)]
    pub(crate) debounce_ms: u64,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<WarnLevel>,
}

impl Opts {
    pub(crate) fn resolve_data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("thrift"))
                .ok_or_else(|| anyhow::anyhow!("No platform data directory, pass --data-dir")),
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Parse a measurement, e.g. '5 1/2"' or '19 mm'
    Parse {
        text: String,

        /// Unit assumed when the text has no suffix. Defaults to the saved preference.
        #[arg(long)]
        unit: Option<Unit>,

        /// Print the measurement as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a measurement to another unit
    Convert {
        text: String,

        /// Target unit ('inch' or 'mm')
        #[arg(long)]
        to: Unit,

        #[arg(long)]
        unit: Option<Unit>,
    },
    /// Check whether two measurements are equal within tolerance
    Compare {
        a: String,

        b: String,

        #[arg(long)]
        unit: Option<Unit>,
    },
    /// List the material catalog
    Catalog,
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Manage a project's cut list
    Cutlist {
        #[command(subcommand)]
        command: CutlistCommand,
    },
    /// Manage material inventory
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
    /// Show or change preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Write a backup of all data
    Backup {
        /// Backup file. Printed to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a backup
    Restore { file: PathBuf },
    /// Start over with a blank state
    Reset {
        /// Confirm that all projects and inventory should be discarded
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum ProjectCommand {
    /// Create a project with the next free "New Project" name
    Add,
    /// List projects
    List,
    /// Edit a project's name, description or image URLs
    Edit {
        /// Project id or name
        project: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Image URL. Repeat to set several; replaces the existing list.
        #[arg(long = "image-url", action = clap::ArgAction::Append)]
        image_urls: Vec<String>,
    },
    /// Show a project and its cut list
    Show {
        /// Project id or name
        project: String,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum CutlistCommand {
    /// Add an item to a project's cut list
    Add {
        /// Project id or name
        project: String,

        #[command(flatten)]
        row: RowArgs,

        /// Keep the grain running along the length
        #[arg(long)]
        grain: bool,
    },
    /// Change an item in a project's cut list
    Update {
        /// Project id or name
        project: String,

        /// Cut-list item id
        item: uuid::Uuid,

        #[command(flatten)]
        row: RowEditArgs,

        /// Keep the grain running along the length
        #[arg(long)]
        grain: Option<bool>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum InventoryCommand {
    /// Add material to the inventory
    Add {
        #[command(flatten)]
        row: RowArgs,
    },
    /// Change an inventory entry
    Update {
        /// Inventory item id
        item: uuid::Uuid,

        #[command(flatten)]
        row: RowEditArgs,
    },
    /// List the inventory
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum PrefsCommand {
    /// Show preferences
    Show,
    /// Set the unit assumed for measurements without a suffix
    Unit { unit: Unit },
    /// Set the rounding used when showing inches (32 or 64)
    Precision { precision: ImperialPrecision },
}

/// A complete row
#[derive(Debug, Args)]
pub(crate) struct RowArgs {
    /// Material name as listed by 'thrift catalog'
    #[arg(long)]
    pub(crate) material: String,

    #[arg(long)]
    pub(crate) thickness: String,

    #[arg(long)]
    pub(crate) width: String,

    #[arg(long)]
    pub(crate) length: String,

    #[arg(long, default_value_t = 1)]
    pub(crate) quantity: u32,
}

/// Changes to an existing row
#[derive(Debug, Args)]
pub(crate) struct RowEditArgs {
    #[arg(long)]
    pub(crate) material: Option<String>,

    #[arg(long)]
    pub(crate) thickness: Option<String>,

    #[arg(long)]
    pub(crate) width: Option<String>,

    #[arg(long)]
    pub(crate) length: Option<String>,

    #[arg(long)]
    pub(crate) quantity: Option<u32>,
}
