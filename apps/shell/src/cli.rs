use clap::{Parser, Subcommand};
use razed::domain::{Element, Faction};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "razed",
    version,
    about = "Inspect the tome catalog and drive character progression"
)]
pub struct Cli {
    /// Configuration file; `razed.toml` in the working directory when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate the catalog, then print a summary.
    Check,
    /// List every tome in catalog order.
    List,
    /// Show one tome definition.
    Show { tome: String },
    /// Create a character and print its id.
    New {
        #[arg(long)]
        faction: Option<Faction>,
        /// Defaults to `characters.default_starting_credits`.
        #[arg(long)]
        credits: Option<u64>,
        /// Seed faction, element and credits from a catalog background.
        #[arg(long, conflicts_with_all = ["faction", "credits", "element"])]
        background: Option<String>,
        /// Also selects the Elemental path.
        #[arg(long)]
        element: Option<Element>,
    },
    /// Learn a tome for a stored character.
    Learn { character: String, tome: String },
    /// Print a character's progression and what it can learn next.
    Status { character: String },
}
