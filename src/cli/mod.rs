//! Command-line interface for brewpress.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// brewpress - content backend for a small business website
#[derive(Parser)]
#[command(name = "brewpress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C (default)
    Serve,

    /// Apply migrations, create the admin account, and seed default content
    Init,

    /// Write all website content to a JSON export file
    Export {
        /// Destination file
        path: PathBuf,
    },

    /// Load website content from a JSON export file
    Import {
        /// Export file to read
        path: PathBuf,
    },

    /// Print a bcrypt hash at the configured cost
    HashPassword {
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["brewpress"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_export_takes_a_path() {
        let cli = Cli::try_parse_from(["brewpress", "export", "backup.json"]).unwrap();
        match cli.command {
            Some(Commands::Export { path }) => assert_eq!(path, PathBuf::from("backup.json")),
            _ => panic!("expected export command"),
        }

        assert!(Cli::try_parse_from(["brewpress", "import"]).is_err());
    }

    #[test]
    fn test_hash_password_subcommand_name() {
        let cli = Cli::try_parse_from(["brewpress", "hash-password", "s3cret-pass"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::HashPassword { .. })));
    }
}
