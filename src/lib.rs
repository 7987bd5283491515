pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod export;

pub use config::{Config, ExportConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use export::{ExportSummary, IssueExporter, IssueSource};

/// Exports every issue of `export.repository` to `export.output_path`.
///
/// Configuration problems (empty token, bad date format, unusable output path)
/// are reported before any request is sent.
pub async fn export(config: &Config, export: ExportConfig) -> Result<ExportSummary> {
    let client = GitHubClient::from_config(config)?;
    IssueExporter::new(client, export)?.export().await
}
