use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::filter::IssueFilter;
use crate::export::row::{DateFormat, RowProjector};
use crate::export::writer::write_csv;
use crate::models::{Issue, IssueState, Label, RepoId};

/// Where issues come from. Implemented by [`crate::GitHubClient`].
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Every issue of `repo` in `state`, in the order the API returned them.
    async fn fetch_issues(&self, repo: &RepoId, state: IssueState) -> Result<Vec<Issue>>;
    async fn fetch_labels(&self, repo: &RepoId) -> Result<Vec<Label>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows_written: usize,
    pub issues_fetched: usize,
    pub output_path: PathBuf,
}

pub struct IssueExporter<S> {
    source: S,
    config: ExportConfig,
    date_format: DateFormat,
}

impl<S: IssueSource> IssueExporter<S> {
    /// Validates `config` up front so bad input fails before any request is made.
    pub fn new(source: S, config: ExportConfig) -> Result<Self> {
        let date_format = DateFormat::parse(&config.date_format)?;
        config.validate_output_path()?;
        Ok(Self {
            source,
            config,
            date_format,
        })
    }

    pub async fn export(&self) -> Result<ExportSummary> {
        let repo = &self.config.repository;

        let mut projector = RowProjector::new(self.date_format.clone(), self.config.normalize_dates);
        if self.config.include_labels {
            let labels = self.source.fetch_labels(repo).await?;
            tracing::info!("Adding {} label columns", labels.len());
            projector = projector.with_label_columns(&labels);
        }

        let spinner = fetch_spinner(repo);
        let issues = self.source.fetch_issues(repo, self.config.state).await;
        spinner.finish_and_clear();
        let issues = issues?;
        tracing::info!("Fetched {} issues from {}", issues.len(), repo);

        let filter = IssueFilter {
            include_pull_requests: self.config.include_pull_requests,
            required_labels: self.config.filter_labels.clone(),
        };

        let rows = issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .map(|issue| projector.project(issue))
            .collect::<Result<Vec<_>>>()?;

        let skipped = issues.len() - rows.len();
        if skipped > 0 {
            tracing::info!("Skipped {} issues excluded by filters", skipped);
        }

        let rows_written = write_csv(&self.config.output_path, &projector.header(), rows)?;
        tracing::info!(
            "Wrote {} rows to {}",
            rows_written,
            self.config.output_path.display()
        );

        Ok(ExportSummary {
            rows_written,
            issues_fetched: issues.len(),
            output_path: self.config.output_path.clone(),
        })
    }
}

fn fetch_spinner(repo: &RepoId) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching issues for {}", repo));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        issues: Vec<Issue>,
        labels: Vec<Label>,
        fail_with_auth: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IssueSource for FakeSource {
        async fn fetch_issues(&self, _repo: &RepoId, _state: IssueState) -> Result<Vec<Issue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_auth {
                return Err(Error::Authentication {
                    status: 401,
                    message: "Bad credentials".to_string(),
                });
            }
            Ok(self.issues.clone())
        }

        async fn fetch_labels(&self, _repo: &RepoId) -> Result<Vec<Label>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.labels.clone())
        }
    }

    fn issue(number: u64, labels: &[&str], pull_request: bool) -> Issue {
        let labels: Vec<_> = labels.iter().map(|name| json!({ "name": name })).collect();
        let mut value = json!({
            "number": number,
            "title": format!("Issue {}", number),
            "state": "open",
            "html_url": format!("https://github.com/octo/widgets/issues/{}", number),
            "user": {"login": "alice"},
            "labels": labels,
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-01-05T00:00:00Z",
            "closed_at": null
        });
        if pull_request {
            value["pull_request"] = json!({});
        }
        serde_json::from_value(value).unwrap()
    }

    fn config(dir: &tempfile::TempDir) -> ExportConfig {
        ExportConfig::new("octo/widgets".parse().unwrap(), dir.path().join("issues.csv"))
            .with_date_format("%Y-%m-%d")
    }

    #[tokio::test]
    async fn test_export_writes_all_issues_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource {
            issues: vec![issue(3, &[], false), issue(1, &["bug"], false)],
            ..Default::default()
        };

        let summary = IssueExporter::new(source, config(&dir))
            .unwrap()
            .export()
            .await
            .unwrap();

        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.issues_fetched, 2);
        let content = std::fs::read_to_string(dir.path().join("issues.csv")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("3,Issue 3,open,alice,,"));
        assert!(lines[2].starts_with("1,Issue 1,open,alice,bug,"));
    }

    #[tokio::test]
    async fn test_invalid_date_format_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let result = IssueExporter::new(FakeSource::default(), config(&dir).with_date_format("%Q"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.csv");
        std::fs::write(&path, "previous export\n").unwrap();

        let source = FakeSource {
            fail_with_auth: true,
            ..Default::default()
        };
        let err = IssueExporter::new(source, config(&dir))
            .unwrap()
            .export()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Authentication { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous export\n");
    }

    #[tokio::test]
    async fn test_filters_and_label_columns() {
        let dir = tempfile::tempdir().unwrap();
        let labels: Vec<Label> =
            serde_json::from_value(json!([{"name": "ui"}, {"name": "bug"}])).unwrap();
        let source = FakeSource {
            issues: vec![
                issue(1, &["bug"], false),
                issue(2, &["bug", "ui"], true),
                issue(3, &["ui"], false),
            ],
            labels,
            ..Default::default()
        };
        let mut cfg = config(&dir);
        cfg.include_labels = true;
        cfg.filter_labels = vec!["bug".to_string()];

        let exporter = IssueExporter::new(source, cfg).unwrap();
        let summary = exporter.export().await.unwrap();

        assert_eq!(summary.issues_fetched, 3);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(exporter.source.calls.load(Ordering::SeqCst), 2);

        let content = std::fs::read_to_string(dir.path().join("issues.csv")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[0].ends_with(",URL,Label: bug,Label: ui"));
        assert!(lines[1].ends_with(",true,false"));
    }
}
