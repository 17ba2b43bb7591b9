//! Cursor pagination shared by listing and searching.
//!
//! A page token is the identifier of the last row of the previous page. Each
//! query fetches one row more than the page size; the surplus row only tells
//! us whether another page exists and is never returned.

use serde::{Deserialize, Serialize};

use super::error::CatalogError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Clamps a caller-supplied page size into `[1, MAX_PAGE_SIZE]`.
///
/// Non-positive values select `DEFAULT_PAGE_SIZE`.
pub fn clamp_page_size(requested: i32) -> u64 {
    if requested <= 0 {
        return DEFAULT_PAGE_SIZE;
    }
    (requested as u64).min(MAX_PAGE_SIZE)
}

/// Normalized paging parameters for one list or search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page_size: u64,
    page_token: Option<String>,
}

impl PageRequest {
    pub fn new(page_size: i32, page_token: Option<&str>) -> Self {
        Self {
            page_size: clamp_page_size(page_size),
            page_token: page_token
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn first(page_size: i32) -> Self {
        Self::new(page_size, None)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// `None` on the first page.
    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    /// Rows to fetch: one more than the page size.
    pub fn fetch_limit(&self) -> u64 {
        self.page_size + 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(0)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Identifier of the last item when more rows follow; `None` at the end.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}

/// Turns up to `page_size + 1` ordered rows into a page.
pub fn seal_page<T>(mut rows: Vec<T>, page_size: u64, id_of: impl Fn(&T) -> &str) -> Page<T> {
    let page_size = page_size as usize;
    if rows.len() <= page_size {
        return Page {
            items: rows,
            next_page_token: None,
        };
    }

    rows.truncate(page_size);
    let next_page_token = rows.last().map(|row| id_of(row).to_string());
    Page {
        items: rows,
        next_page_token,
    }
}

/// Paginates a fully ordered in-process result set.
///
/// Resumes strictly after the token row; a token that is not part of
/// `ordered` is rejected rather than restarting from the top.
pub fn paginate<T>(
    ordered: Vec<T>,
    request: &PageRequest,
    id_of: impl Fn(&T) -> &str,
) -> Result<Page<T>, CatalogError> {
    let start = match request.page_token() {
        None => 0,
        Some(token) => {
            let position = ordered
                .iter()
                .position(|row| id_of(row) == token)
                .ok_or_else(|| CatalogError::InvalidPageToken(token.to_string()))?;
            position + 1
        }
    };

    let rows: Vec<T> = ordered
        .into_iter()
        .skip(start)
        .take(request.fetch_limit() as usize)
        .collect();

    Ok(seal_page(rows, request.page_size(), id_of))
}
