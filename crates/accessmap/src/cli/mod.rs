//! Command-line interface for accessmap.
//!
//! This module provides the CLI structure for the `accessmap` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, NearbyCommand, NearbyKind, SeedCommand, ServeCommand, SessionCommand,
    StatusCommand,
};

use crate::logging::Verbosity;

/// accessmap - barrier-free facility data for Hong Kong
///
/// Serves lifts, footbridges, zebra crossings, the pedestrian network,
/// crowd-sourced accessibility notes and lift status reports over HTTP.
#[derive(Debug, Parser)]
#[command(name = "accessmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Load sample facility data into empty tables
    Seed(SeedCommand),

    /// Query lifts or notes around a point
    Nearby(NearbyCommand),

    /// Issue and revoke sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), "accessmap");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["accessmap", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(
            parse(&["accessmap", "-q", "status"]).verbosity(),
            Verbosity::Quiet
        );
        assert_eq!(
            parse(&["accessmap", "-vv", "status"]).verbosity(),
            Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_serve() {
        let cli = parse(&["accessmap", "serve", "--bind", "0.0.0.0:8080", "--seed"]);
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080"));
                assert!(cmd.seed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_seed_with_file() {
        let cli = parse(&["accessmap", "seed", "--file", "/tmp/data.json"]);
        match cli.command {
            Command::Seed(cmd) => assert_eq!(cmd.file, Some(PathBuf::from("/tmp/data.json"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_nearby() {
        let cli = parse(&[
            "accessmap",
            "nearby",
            "lifts",
            "--lat",
            "22.3193",
            "--lng",
            "114.1694",
            "-r",
            "0.5",
        ]);
        match cli.command {
            Command::Nearby(cmd) => {
                assert_eq!(cmd.kind, NearbyKind::Lifts);
                assert_eq!(cmd.lat, "22.3193");
                assert_eq!(cmd.radius, Some(0.5));
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_nearby_negative_coordinates() {
        let cli = parse(&[
            "accessmap", "nearby", "notes", "--lat", "-33.86", "--lng", "151.2",
        ]);
        match cli.command {
            Command::Nearby(cmd) => assert_eq!(cmd.lat, "-33.86"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_session_issue() {
        let cli = parse(&["accessmap", "session", "issue", "alice", "--admin"]);
        assert!(matches!(
            cli.command,
            Command::Session(SessionCommand::Issue { admin: true, .. })
        ));

        let cli = parse(&["accessmap", "session", "revoke-all", "alice"]);
        assert!(matches!(
            cli.command,
            Command::Session(SessionCommand::RevokeAll { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["accessmap", "-c", "/custom/config.toml", "status", "--json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_nearby_requires_coordinates() {
        assert!(Cli::try_parse_from(["accessmap", "nearby", "lifts"]).is_err());
    }
}
