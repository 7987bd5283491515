use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An issue as returned by `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub user: Option<IssueAuthor>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub pull_request: Option<PullRequestRef>,
}

impl Issue {
    /// The issues endpoint also lists pull requests; those carry a `pull_request` object.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    pub fn author_login(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAuthor {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_issue_with_nulls() {
        let issue: Issue = serde_json::from_value(json!({
            "number": 7,
            "title": "Crash on start",
            "state": "open",
            "html_url": "https://github.com/octo/widgets/issues/7",
            "user": null,
            "labels": [{"name": "bug", "color": "d73a4a"}],
            "milestone": null,
            "comments": 2,
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-01-03T00:00:00Z",
            "closed_at": null
        }))
        .unwrap();

        assert_eq!(issue.number, 7);
        assert_eq!(issue.author_login(), "");
        assert!(issue.has_label("bug"));
        assert!(!issue.is_pull_request());
        assert!(issue.closed_at.is_none());
    }

    #[test]
    fn test_pull_request_marker() {
        let issue: Issue = serde_json::from_value(json!({
            "number": 8,
            "title": "Fix crash",
            "state": "closed",
            "html_url": "https://github.com/octo/widgets/pull/8",
            "user": {"login": "alice"},
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-01-03T00:00:00Z",
            "closed_at": "2024-01-03T00:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/octo/widgets/pulls/8"}
        }))
        .unwrap();

        assert!(issue.is_pull_request());
        assert_eq!(issue.author_login(), "alice");
        assert!(issue.labels.is_empty());
    }
}
