//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// pressroom - schema migration runner and development tooling
#[derive(Parser, Debug)]
#[command(name = "pressroom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the migration ledger directory
    #[arg(short, long, global = true, default_value = "migrations")]
    pub ledger_dir: String,

    /// Database connection URL. Falls back to PRESSROOM_DIRECT_DATABASE_URL,
    /// then DATABASE_URL. Use the direct (non-pooled) endpoint for migrations.
    #[arg(
        short,
        long,
        global = true,
        env = "PRESSROOM_DIRECT_DATABASE_URL",
        hide_env_values = true
    )]
    pub database_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage schema migrations
    Migrate(MigrateArgs),

    /// Reset the posts table to the fixed development dataset
    Seed,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateCommand {
    /// Apply all pending ledger entries, oldest first
    Deploy,

    /// Report the apply state of every ledger entry without writing
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_args() {
        // Validates the entire command tree: short flag conflicts,
        // duplicate args, and other clap definition errors.
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_migrate_deploy_with_overrides() {
        let cli = Cli::try_parse_from([
            "pressroom",
            "--ledger-dir",
            "db/ledger",
            "--database-url",
            "postgresql://localhost:5432/pressroom",
            "migrate",
            "deploy",
        ])
        .expect("should parse");

        assert_eq!(cli.global.ledger_dir, "db/ledger");
        assert!(cli.global.database_url.is_some());
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                command: MigrateCommand::Deploy
            })
        ));
    }
}
