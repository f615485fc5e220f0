//! Page-number pagination.

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Default number of documents per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Documents per page.
    #[serde(default = "default_page_size", alias = "limit")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Build a page request, rejecting zero values and clamping the size.
    pub fn new(page: u64, page_size: u64) -> AppResult<Self> {
        Self { page, page_size }.validated()
    }

    /// Check bounds on a deserialized request.
    pub fn validated(self) -> AppResult<Self> {
        if self.page == 0 {
            return Err(AppError::invalid("page", "must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(AppError::invalid("pageSize", "must be at least 1"));
        }
        Ok(Self {
            page: self.page,
            page_size: self.page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page - 1
    }

    /// Number of documents skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.index() * self.page_size
    }

    /// Number of pages needed for `total_docs` documents.
    #[must_use]
    pub const fn total_pages(&self, total_docs: u64) -> u64 {
        total_docs.div_ceil(self.page_size)
    }

    /// Reject a page past the last one.
    ///
    /// The first page of an empty result is valid; any other page beyond
    /// `total_pages` is an [`AppError::InvalidPage`].
    pub fn ensure_in_range(&self, total_docs: u64) -> AppResult<()> {
        let total_pages = self.total_pages(total_docs);
        if self.page > total_pages.max(1) {
            return Err(AppError::InvalidPage {
                page: self.page,
                total_pages,
            });
        }
        Ok(())
    }
}

/// A page of documents plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u64>,
    pub prev_page: Option<u64>,
    /// 1-based position of the first document of this page.
    pub paging_counter: u64,
}

impl<T> Paginated<T> {
    /// Wrap `docs` fetched for `request` out of `total_docs` matches.
    #[must_use]
    pub fn new(docs: Vec<T>, request: PageRequest, total_docs: u64) -> Self {
        let total_pages = request.total_pages(total_docs);
        let has_next_page = request.page < total_pages;
        let has_prev_page = request.page > 1;
        Self {
            docs,
            total_docs,
            limit: request.page_size,
            page: request.page,
            total_pages,
            has_next_page,
            has_prev_page,
            next_page: if has_next_page {
                Some(request.page + 1)
            } else {
                None
            },
            prev_page: if has_prev_page {
                Some(request.page - 1)
            } else {
                None
            },
            paging_counter: request.offset() + 1,
        }
    }

    /// Transform the documents while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            docs: self.docs.into_iter().map(f).collect(),
            total_docs: self.total_docs,
            limit: self.limit,
            page: self.page,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            next_page: self.next_page,
            prev_page: self.prev_page,
            paging_counter: self.paging_counter,
        }
    }

    /// Replace the documents wholesale, keeping the metadata.
    #[must_use]
    pub fn with_docs<U>(self, docs: Vec<U>) -> Paginated<U> {
        Paginated {
            docs,
            total_docs: self.total_docs,
            limit: self.limit,
            page: self.page,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            next_page: self.next_page,
            prev_page: self.prev_page,
            paging_counter: self.paging_counter,
        }
    }
}
