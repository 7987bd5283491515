pub mod client;
pub mod rate_limit;
pub mod paginator;

pub use client::GitHubClient;
pub use rate_limit::RateLimitStatus;
pub use paginator::Paginator;
