use crate::models::Issue;

/// Decides which fetched issues become rows.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub include_pull_requests: bool,
    /// An issue must carry every one of these labels.
    pub required_labels: Vec<String>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        if !self.include_pull_requests && issue.is_pull_request() {
            return false;
        }
        self.required_labels.iter().all(|label| issue.has_label(label))
    }
}
