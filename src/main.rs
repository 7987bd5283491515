use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh2csv::config::{DEFAULT_DATE_FORMAT, DEFAULT_OUTPUT_FILE};
use gh2csv::models::{IssueState, RepoId};
use gh2csv::{Config, ExportConfig, ExportSummary};

#[derive(Parser, Debug)]
#[command(name = "gh2csv")]
#[command(version)]
#[command(about = "Convert GitHub issues to a CSV file")]
#[command(after_help = "Columns: Number, Title, State, Author, Labels (\"; \"-separated), \
Milestone, Comments, Created At, Closed At, Updated At, URL, then one \"Label: <name>\" \
column per repository label with --include-labels.\n\n\
Requires GITHUB_TOKEN in the environment (or a .env file).")]
struct Args {
    /// Repository to retrieve issues from (e.g. rcbops/rpc-openstack)
    repository: String,

    /// Way to format the dates when present (strftime syntax)
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Name of file to write the results to
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,

    /// Whether issues are closed, open, or both
    #[arg(long, value_enum, default_value_t = IssueState::All)]
    issue_state: IssueState,

    /// Include pull requests in the output
    #[arg(long)]
    include_pull_requests: bool,

    /// Add a true/false column for every label defined in the repository
    #[arg(long)]
    include_labels: bool,

    /// Only include issues with this label; repeat to require several labels
    #[arg(long = "filter-label", value_name = "LABEL")]
    filter_labels: Vec<String>,

    /// Keep created/closed dates as reported even if they are out of order
    #[arg(long)]
    skip_date_normalization: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            println!(
                "Exported {} issues to {}",
                summary.rows_written,
                summary.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gh2csv=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

async fn run(args: Args) -> gh2csv::Result<ExportSummary> {
    // Everything below is validated before the first request goes out.
    let repository: RepoId = args.repository.parse()?;
    let config = Config::from_env()?;

    let export = ExportConfig {
        repository,
        date_format: args.date_format,
        output_path: args.output_file,
        state: args.issue_state,
        include_pull_requests: args.include_pull_requests,
        include_labels: args.include_labels,
        filter_labels: args.filter_labels,
        normalize_dates: !args.skip_date_normalization,
    };

    tracing::info!("Exporting issues of {} to {}", export.repository, export.output_path.display());
    gh2csv::export(&config, export).await
}
