use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Issue, Label};

/// Header of the fixed columns, in output order.
pub const BASE_COLUMNS: [&str; 11] = [
    "Number",
    "Title",
    "State",
    "Author",
    "Labels",
    "Milestone",
    "Comments",
    "Created At",
    "Closed At",
    "Updated At",
    "URL",
];

pub const LABEL_SEPARATOR: &str = "; ";
pub const LABEL_COLUMN_PREFIX: &str = "Label: ";

/// A strftime pattern that has been checked for unknown specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

impl DateFormat {
    pub fn parse(pattern: &str) -> Result<Self> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!("invalid date format '{}'", pattern)));
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn format(&self, timestamp: &DateTime<Utc>) -> Result<String> {
        let mut out = String::new();
        write!(out, "{}", timestamp.format(&self.0)).map_err(|_| {
            Error::Config(format!("date format '{}' cannot render {}", self.0, timestamp))
        })?;
        Ok(out)
    }

    fn format_opt(&self, timestamp: Option<&DateTime<Utc>>) -> Result<String> {
        timestamp.map_or_else(|| Ok(String::new()), |t| self.format(t))
    }
}

/// Flattens issues into CSV rows matching [`RowProjector::header`].
#[derive(Debug, Clone)]
pub struct RowProjector {
    date_format: DateFormat,
    label_columns: Vec<String>,
    normalize_dates: bool,
}

impl RowProjector {
    pub fn new(date_format: DateFormat, normalize_dates: bool) -> Self {
        Self {
            date_format,
            label_columns: Vec::new(),
            normalize_dates,
        }
    }

    /// Adds one boolean column per label, sorted by name.
    pub fn with_label_columns(mut self, labels: &[Label]) -> Self {
        let mut names: Vec<String> = labels.iter().map(|l| l.name.clone()).collect();
        names.sort();
        names.dedup();
        self.label_columns = names;
        self
    }

    pub fn header(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(
                self.label_columns
                    .iter()
                    .map(|l| format!("{}{}", LABEL_COLUMN_PREFIX, l)),
            )
            .collect()
    }

    pub fn project(&self, issue: &Issue) -> Result<Vec<String>> {
        let mut lifecycle = [Some(issue.created_at), issue.closed_at];
        if self.normalize_dates {
            normalize_sequential_dates(&mut lifecycle);
        }
        let [created_at, closed_at] = lifecycle;

        let labels = issue
            .labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(LABEL_SEPARATOR);

        let mut row = vec![
            issue.number.to_string(),
            issue.title.clone(),
            issue.state.clone(),
            issue.author_login().to_string(),
            labels,
            issue
                .milestone
                .as_ref()
                .map(|m| m.title.clone())
                .unwrap_or_default(),
            issue.comments.to_string(),
            self.date_format.format_opt(created_at.as_ref())?,
            self.date_format.format_opt(closed_at.as_ref())?,
            self.date_format.format(&issue.updated_at)?,
            issue.html_url.clone(),
        ];

        row.extend(
            self.label_columns
                .iter()
                .map(|name| issue.has_label(name).to_string()),
        );

        Ok(row)
    }
}

/// Makes a chain of lifecycle dates non-decreasing.
///
/// Each date later than the earliest non-null date after it is pulled back to
/// that date. Missing dates stay missing.
pub fn normalize_sequential_dates(dates: &mut [Option<DateTime<Utc>>]) {
    for i in 0..dates.len() {
        let next_earliest = dates[i + 1..].iter().flatten().min().copied();
        let Some(next_earliest) = next_earliest else {
            break;
        };
        if let Some(date) = dates[i] {
            if date > next_earliest {
                dates[i] = Some(next_earliest);
            }
        }
    }
}
