use serde::{Deserialize, Serialize};

/// Default page size used by the list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// A list response that may or may not be paginated.
///
/// Paginated endpoints return `{count, next, previous, results}`; the rest
/// return a bare array. Both decode into `Page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Paginated {
        #[serde(default)]
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    List(Vec<T>),
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Page::Paginated { results, .. } => results,
            Page::List(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Paginated { results, .. } => results,
            Page::List(items) => items,
        }
    }

    /// Total across all pages; for a bare list, its length.
    pub fn total_count(&self) -> u64 {
        match self {
            Page::Paginated { count, .. } => *count,
            Page::List(items) => items.len() as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Page::Paginated { next: Some(_), .. })
    }
}

/// Page cursor for a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: 0,
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size as u64) as u32
    }

    pub fn can_go_to(&self, page: u32) -> bool {
        page > 0 && page <= self.total_pages()
    }

    /// Move to `page` if it is in range. Returns whether the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        if self.can_go_to(page) && page != self.page {
            self.page = page;
            true
        } else {
            false
        }
    }

    /// 1-based index of the first row on the current page. Page 0 reads as page 1.
    pub fn first_index(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            self.page.saturating_sub(1) as u64 * self.page_size as u64 + 1
        }
    }

    pub fn last_index(&self) -> u64 {
        (self.page.max(1) as u64 * self.page_size as u64).min(self.total_count)
    }

    pub fn update_from<T>(&mut self, page: &Page<T>) {
        self.total_count = page.total_count();
    }
}
