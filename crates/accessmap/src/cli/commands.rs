//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Server command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Override the configured bind address (e.g. 0.0.0.0:8080)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Load the built-in sample data into empty tables before serving
    #[arg(long)]
    pub seed: bool,
}

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Load this JSON file instead of the built-in dataset
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Nearby query arguments.
#[derive(Debug, Args)]
pub struct NearbyCommand {
    /// What to look for
    #[arg(value_enum)]
    pub kind: NearbyKind,

    /// Latitude of the query point
    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,

    /// Longitude of the query point
    #[arg(long, allow_hyphen_values = true)]
    pub lng: String,

    /// Search radius in kilometres (defaults to the configured radius)
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Records a nearby query can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NearbyKind {
    /// Operational, accessible lifts
    Lifts,
    /// Accessibility notes
    Notes,
}

/// Session management commands.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Create or refresh a user and print a new session token
    Issue {
        /// Identity-provider subject of the user
        open_id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },

    /// Revoke a session token
    Revoke {
        /// The raw token
        token: String,
    },

    /// Revoke every session of a user
    RevokeAll {
        /// Identity-provider subject of the user
        open_id: String,
    },

    /// Delete expired sessions
    Prune,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
