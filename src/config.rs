use crate::error::{Error, Result};
use crate::models::{IssueState, RepoId};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";
pub const DEFAULT_OUTPUT_FILE: &str = "gh2csv.csv";

/// Connection settings for the GitHub API, read from the environment by the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token = env::var("GITHUB_TOKEN")
            .map_err(|_| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        if github_token.trim().is_empty() {
            return Err(Error::Config(
                "GITHUB_TOKEN environment variable is empty".to_string(),
            ));
        }

        let api_url = env::var("GITHUB_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout = env::var("GH2CSV_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            github_token,
            api_url,
            request_timeout,
        })
    }
}

/// What to export and how to render it.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub repository: RepoId,
    pub date_format: String,
    pub output_path: PathBuf,
    pub state: IssueState,
    pub include_pull_requests: bool,
    pub include_labels: bool,
    pub filter_labels: Vec<String>,
    pub normalize_dates: bool,
}

impl ExportConfig {
    pub fn new(repository: RepoId, output_path: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            output_path: output_path.into(),
            state: IssueState::All,
            include_pull_requests: false,
            include_labels: false,
            filter_labels: Vec::new(),
            normalize_dates: true,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Checks the output location without touching the network. A scratch file
    /// is created and removed again to make sure the directory is writable.
    pub fn validate_output_path(&self) -> Result<()> {
        let path = &self.output_path;
        if path.as_os_str().is_empty() {
            return Err(Error::Config("output file path is empty".to_string()));
        }
        if path.is_dir() {
            return Err(Error::Config(format!(
                "output path {} is a directory",
                path.display()
            )));
        }

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(Error::Config(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }

        tempfile::NamedTempFile::new_in(&parent).map_err(|e| {
            Error::Config(format!(
                "output directory {} is not writable: {}",
                parent.display(),
                e
            ))
        })?;

        Ok(())
    }
}
