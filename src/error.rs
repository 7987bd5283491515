use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Not found ({status}): {message}")]
    NotFound { status: u16, message: String },

    #[error("Rate limit exceeded ({status}): {message}{}", reset_hint(.reset_at))]
    RateLimited {
        status: u16,
        reset_at: Option<DateTime<Utc>>,
        message: String,
    },

    #[error("GitHub API error ({status}): {message}")]
    GitHubApi { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

fn reset_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(" (quota resets at {})", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

impl Error {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 2,
            Error::Authentication { .. } => 3,
            Error::NotFound { .. } => 4,
            Error::RateLimited { .. } => 5,
            Error::Io(_) | Error::Csv(_) => 6,
            Error::GitHubApi { .. }
            | Error::Network(_)
            | Error::Serialization(_)
            | Error::InvalidHeader(_) => 1,
        }
    }
}
