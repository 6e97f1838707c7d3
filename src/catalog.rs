//! Reader catalog: the book list readers browse, with client-side filters and
//! search.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{lenient_timestamp, BookId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFile {
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBook {
    pub id: BookId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<CatalogAuthor>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_free: Option<bool>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub book_files: Vec<BookFile>,
}

impl CatalogBook {
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.upload_date.or(self.created_at)
    }

    pub fn is_free_to_read(&self) -> bool {
        self.is_free == Some(true) || self.price == Some(0.0)
    }

    pub fn has_audio(&self) -> bool {
        self.book_files
            .first()
            .and_then(|file| file.audio_path.as_deref())
            .is_some_and(|path| !path.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFilter {
    #[default]
    All,
    Top,
    Recent,
    Free,
    Audio,
}

impl CatalogFilter {
    pub const ALL: [CatalogFilter; 5] = [
        CatalogFilter::All,
        CatalogFilter::Top,
        CatalogFilter::Recent,
        CatalogFilter::Free,
        CatalogFilter::Audio,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CatalogFilter::All => "all",
            CatalogFilter::Top => "top",
            CatalogFilter::Recent => "recent",
            CatalogFilter::Free => "free",
            CatalogFilter::Audio => "audio",
        }
    }

    /// `top` is served by its own endpoint; everything else filters the full list.
    pub fn uses_top_endpoint(&self) -> bool {
        matches!(self, CatalogFilter::Top)
    }

    pub fn apply(&self, mut books: Vec<CatalogBook>) -> Vec<CatalogBook> {
        match self {
            CatalogFilter::All | CatalogFilter::Top => books,
            CatalogFilter::Recent => {
                books.sort_by(|a, b| newest_first(a.published_at(), b.published_at()));
                books
            }
            CatalogFilter::Free => books.into_iter().filter(CatalogBook::is_free_to_read).collect(),
            CatalogFilter::Audio => books.into_iter().filter(CatalogBook::has_audio).collect(),
        }
    }
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for CatalogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter {:?}", self.0)
    }
}

impl std::error::Error for UnknownFilter {}

impl FromStr for CatalogFilter {
    type Err = UnknownFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        CatalogFilter::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownFilter(raw.to_string()))
    }
}

/// Case-insensitive match on title or author name. Empty queries match all.
pub fn matches_search(book: &CatalogBook, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    book.title.to_lowercase().contains(&needle)
        || book
            .author_name()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
}

pub fn search<'a>(books: &'a [CatalogBook], query: &str) -> Vec<&'a CatalogBook> {
    books.iter().filter(|book| matches_search(book, query)).collect()
}
