//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Manage a remote employee or movie catalog")]
pub struct Cli {
    /// API root, e.g. `http://localhost:3000/api` (overrides CATALOG_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Collection to manage: `employees` or `movies` (overrides CATALOG_KIND)
    #[arg(long, global = true)]
    pub kind: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List records, optionally filtered and sorted
    List {
        /// Case-insensitive search term
        #[arg(long, short, default_value = "")]
        search: String,

        /// Field to sort by; prefix with `-` for descending
        #[arg(long, short = 'o', allow_hyphen_values = true)]
        sort: Option<String>,
    },

    /// Create a record
    Create {
        /// Field assignment, repeatable: `--field name=Ada`
        #[arg(long = "field", short = 'f', value_parser = parse_assignment)]
        fields: Vec<(String, String)>,

        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an existing record; unspecified fields keep their values
    Update {
        id: String,

        #[arg(long = "field", short = 'f', value_parser = parse_assignment)]
        fields: Vec<(String, String)>,

        /// Replacement image; the current one is kept if omitted
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete a record
    Delete { id: String },
}

/// Parse `name=value`. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}
