use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::store::DashboardState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Dashboard,
    Pending,
    Authors,
    Readers,
    Summary,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Dashboard,
        DashboardTab::Pending,
        DashboardTab::Authors,
        DashboardTab::Readers,
        DashboardTab::Summary,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DashboardTab::Dashboard => "dashboard",
            DashboardTab::Pending => "pending",
            DashboardTab::Authors => "authors",
            DashboardTab::Readers => "readers",
            DashboardTab::Summary => "summary",
        }
    }

    /// Label computed from the live collections; never cached.
    pub fn label(&self, state: &DashboardState) -> String {
        match self {
            DashboardTab::Dashboard => "Dashboard".to_string(),
            DashboardTab::Pending => format!("Pending Books ({})", state.pending.len()),
            DashboardTab::Authors => format!("Authors ({})", state.authors.len()),
            DashboardTab::Readers => format!("Readers ({})", state.readers.len()),
            DashboardTab::Summary => format!("Books ({})", state.books_summary.len()),
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTab(pub String);

impl fmt::Display for UnknownTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tab {:?}", self.0)
    }
}

impl std::error::Error for UnknownTab {}

impl FromStr for DashboardTab {
    type Err = UnknownTab;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        DashboardTab::ALL
            .into_iter()
            .find(|tab| tab.id().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownTab(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabLabel {
    pub tab: DashboardTab,
    pub label: String,
    pub active: bool,
}

pub fn tab_labels(state: &DashboardState) -> Vec<TabLabel> {
    DashboardTab::ALL
        .into_iter()
        .map(|tab| TabLabel {
            tab,
            label: tab.label(state),
            active: tab == state.active_tab,
        })
        .collect()
}
