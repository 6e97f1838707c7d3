use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type BookId = i64;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCounts {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub approved: Option<u64>,
    #[serde(default)]
    pub pending: Option<u64>,
    #[serde(default)]
    pub rejected: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    #[serde(default)]
    pub authors: Option<u64>,
    #[serde(default)]
    pub readers: Option<u64>,
    #[serde(default)]
    pub subscribed_readers: Option<u64>,
}

/// Platform-wide counters shown on the dashboard tab.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub books: Option<BookCounts>,
    #[serde(default)]
    pub users: Option<UserCounts>,
}

/// A book waiting for an admin decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub submitted_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummaryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Read-only projection shared by the reader, author and book-summary lists.
pub trait ListEntry {
    fn name(&self) -> Option<&str>;
    fn title(&self) -> Option<&str> {
        None
    }
    fn full_name(&self) -> Option<String> {
        None
    }
    fn email(&self) -> Option<&str> {
        None
    }
    fn description(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<&str>;
    fn is_active_flag(&self) -> Option<bool>;

    fn display_name(&self, index: usize) -> String {
        non_empty(self.name())
            .or_else(|| non_empty(self.title()))
            .map(str::to_string)
            .or_else(|| self.full_name().filter(|n| !n.is_empty()))
            .unwrap_or_else(|| format!("Item {}", index + 1))
    }

    fn detail(&self) -> String {
        non_empty(self.email())
            .or_else(|| non_empty(self.description()))
            .unwrap_or("No additional information")
            .to_string()
    }

    fn status_label(&self) -> Option<String> {
        if let Some(status) = non_empty(self.status()) {
            return Some(status.to_string());
        }
        self.is_active_flag().map(|active| {
            if active { "Active" } else { "Inactive" }.to_string()
        })
    }

    fn is_active(&self) -> bool {
        self.status() == Some("active") || self.is_active_flag() == Some(true)
    }
}

impl ListEntry for UserSummary {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn full_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        Some(format!("{first} {last}").trim().to_string())
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn is_active_flag(&self) -> Option<bool> {
        self.is_active
    }
}

impl ListEntry for BookSummaryEntry {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn is_active_flag(&self) -> Option<bool> {
        self.is_active
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub text: String,
    pub kind: NotificationKind,
}

/// Accepts RFC 3339, naive ISO timestamps (read as UTC) and bare dates.
/// Anything unparseable becomes `None` instead of failing the surrounding list.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
