use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::header::HeaderMap;

/// Quota information reported by GitHub on every API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitStatus {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let limit = header_value::<u32>(headers, "x-ratelimit-limit");
        let remaining = header_value::<u32>(headers, "x-ratelimit-remaining");
        let reset_at = header_value::<i64>(headers, "x-ratelimit-reset")
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// True once less than a tenth of the hourly quota is left.
    pub fn is_low(&self) -> bool {
        match (self.limit, self.remaining) {
            (Some(limit), Some(remaining)) => limit > 0 && remaining.saturating_mul(10) < limit,
            _ => false,
        }
    }

    /// When the quota becomes available again, preferring `retry-after` for secondary limits.
    pub fn reset_hint(&self, headers: &HeaderMap) -> Option<DateTime<Utc>> {
        header_value::<i64>(headers, "retry-after")
            .and_then(Duration::try_seconds)
            .map(|delay| Utc::now() + delay)
            .or(self.reset_at)
    }

    pub fn log(&self) {
        if let (Some(limit), Some(remaining)) = (self.limit, self.remaining) {
            tracing::debug!("Rate limit: {}/{} remaining", remaining, limit);
        }
        if self.is_low() {
            tracing::warn!(
                "GitHub API quota is running low ({} requests left, resets at {})",
                self.remaining.unwrap_or_default(),
                self.reset_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
