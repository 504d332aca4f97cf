//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{assignee_cmd, import_cmd, inspect_cmd};

#[derive(Parser)]
#[command(name = "mt-vikunja")]
#[command(author, version, about = "Import Meistertask exports into Vikunja")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import an export (.zip, .json or .csv) into Vikunja
    Import(import_cmd::ImportArgs),

    /// Write an assignee map template from a CSV export
    AssigneeMap {
        /// CSV export to read assignee names from
        #[arg(long)]
        input: PathBuf,

        /// Where to write the JSON template
        #[arg(long)]
        output: PathBuf,
    },

    /// Show what an export contains without contacting Vikunja
    Inspect {
        /// Export to inspect
        #[arg(long)]
        input: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("mt-vikunja starting");

    match cli.command {
        Commands::Import(args) => {
            output.verbose_ctx(
                "import",
                &format!("Importing {} (dry_run={})", args.input.display(), args.dry_run),
            );
            import_cmd::run(args, &output)?
        }

        Commands::AssigneeMap { input, output: path } => {
            assignee_cmd::run(&output, &input, &path)?
        }

        Commands::Inspect { input } => inspect_cmd::run(&output, &input)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_flags() {
        let cli = Cli::try_parse_from([
            "mt-vikunja",
            "--format",
            "json",
            "import",
            "--input",
            "export.csv",
            "--dry-run",
            "--limit-tasks",
            "5",
            "--purge-project",
            "--purge-confirm",
            "YES",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.dry_run);
        assert_eq!(args.limit_tasks, Some(5));
        assert!(args.purge_project);
        assert_eq!(args.purge_confirm.as_deref(), Some("YES"));
    }
}
