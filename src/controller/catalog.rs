use std::collections::HashSet;

use tracing::{info, warn};

use crate::catalog::{search, CatalogBook, CatalogFilter};
use crate::models::BookId;
use crate::services::{CatalogService, ServiceResult};

/// Reader-facing book list: one filter, one search box, a set of likes.
pub struct CatalogController<S: CatalogService> {
    service: S,
    filter: CatalogFilter,
    search: String,
    books: Vec<CatalogBook>,
    liked: HashSet<BookId>,
}

impl<S: CatalogService> CatalogController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            filter: CatalogFilter::All,
            search: String::new(),
            books: Vec::new(),
            liked: HashSet::new(),
        }
    }

    pub fn filter(&self) -> CatalogFilter {
        self.filter
    }

    /// Switches filter, clears the search box and reloads.
    pub async fn set_filter(&mut self, filter: CatalogFilter) -> ServiceResult<()> {
        self.filter = filter;
        self.search.clear();
        self.load().await
    }

    pub async fn load(&mut self) -> ServiceResult<()> {
        let fetched = if self.filter.uses_top_endpoint() {
            self.service.top_books().await
        } else {
            self.service.books_with_files().await
        };
        match fetched {
            Ok(books) => {
                self.books = self.filter.apply(books);
                info!(filter = %self.filter, count = self.books.len(), "catalog loaded");
                Ok(())
            }
            Err(err) => {
                warn!(filter = %self.filter, error = %err, "catalog load failed");
                Err(err)
            }
        }
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn visible(&self) -> Vec<&CatalogBook> {
        search(&self.books, &self.search)
    }

    /// Returns whether the book is liked after the toggle.
    pub fn toggle_like(&mut self, id: BookId) -> bool {
        if self.liked.remove(&id) {
            false
        } else {
            self.liked.insert(id);
            true
        }
    }

    pub fn is_liked(&self, id: BookId) -> bool {
        self.liked.contains(&id)
    }
}
