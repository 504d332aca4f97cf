//! `import` command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use crate::config::{Connection, ConnectionArgs};
use crate::import::{ImportOptions, ImportReport, Importer};
use crate::remote::{Client, DryRunTransport, HttpTransport, Transport};
use crate::source::{load_assignee_map, load_export, AssigneeMap};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the export (.zip, .json or .csv)
    #[arg(long)]
    pub input: PathBuf,

    /// Vikunja base URL, e.g. https://vikunja.example.com
    #[arg(long, env = "VIKUNJA_BASE_URL")]
    pub base_url: Option<String>,

    /// Vikunja API token
    #[arg(long, env = "VIKUNJA_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// .env file with VIKUNJA_BASE_URL / VIKUNJA_API_TOKEN
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Import into an existing project instead of creating one
    #[arg(long)]
    pub project_id: Option<i64>,

    /// Print the API calls without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Disable TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Log failed steps and keep going
    #[arg(long)]
    pub continue_on_error: bool,

    /// Skip checklists and their items
    #[arg(long)]
    pub skip_checklists: bool,

    /// Skip labels and label assignments
    #[arg(long)]
    pub skip_labels: bool,

    /// Log HTTP requests, statuses and error bodies
    #[arg(long)]
    pub debug_http: bool,

    /// JSON file mapping assignee names to Vikunja user IDs
    #[arg(long)]
    pub assignee_map: Option<PathBuf>,

    /// Delimiter separating comments inside one cell
    #[arg(long)]
    pub comment_delimiter: Option<String>,

    /// Delete all tasks and all but one bucket in the target project first
    #[arg(long)]
    pub purge_project: bool,

    /// Must be YES for --purge-project to run
    #[arg(long)]
    pub purge_confirm: Option<String>,

    /// Only import the first N tasks
    #[arg(long)]
    pub limit_tasks: Option<usize>,
}

impl ImportArgs {
    fn connection_args(&self) -> ConnectionArgs {
        ConnectionArgs {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            env_file: Some(self.env_file.clone()),
            insecure: self.insecure,
        }
    }

    fn options(&self, assignee_map: AssigneeMap) -> ImportOptions {
        ImportOptions {
            project_id: self.project_id,
            continue_on_error: self.continue_on_error,
            skip_labels: self.skip_labels,
            skip_checklists: self.skip_checklists,
            assignee_map,
            comment_delimiter: self.comment_delimiter.clone(),
            purge_project: self.purge_project,
            purge_confirm: self.purge_confirm.clone(),
            limit_tasks: self.limit_tasks,
        }
    }
}

pub fn run(args: ImportArgs, output: &Output) -> Result<()> {
    let connection = Connection::load(&args.connection_args())?;
    output.verbose_ctx(
        "import",
        &format!(
            "Target {} (verify_ssl={})",
            connection.base_url, connection.verify_ssl
        ),
    );

    let export = load_export(&args.input)
        .with_context(|| format!("Failed to load export: {}", args.input.display()))?;
    output.verbose_ctx(
        "import",
        &format!(
            "Loaded {} sections, {} tasks, {} labels",
            export.sections.len(),
            export.tasks.len(),
            export.labels.len()
        ),
    );

    let assignee_map = match &args.assignee_map {
        Some(path) => load_assignee_map(path)
            .with_context(|| format!("Failed to load assignee map: {}", path.display()))?,
        None => AssigneeMap::new(),
    };

    let transport: Box<dyn Transport> = if args.dry_run {
        Box::new(DryRunTransport::new(*output))
    } else {
        let http_output = if args.debug_http {
            output.with_verbose()
        } else {
            *output
        };
        Box::new(HttpTransport::new(&connection.http_settings(), http_output)?)
    };

    let options = args.options(assignee_map);
    let report = Importer::new(Client::new(transport), &options, *output).run(&export)?;

    print_report(output, &report);
    Ok(())
}

fn print_report(output: &Output, report: &ImportReport) {
    if output.is_json() {
        output.data(report);
        return;
    }

    println!();
    for line in report.lines() {
        println!("{}", line);
    }
    if report.dry_run {
        println!("Dry run complete; nothing was sent.");
    } else {
        println!("Import complete.");
    }
}
