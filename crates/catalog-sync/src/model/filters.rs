//! List filters and the paging contract shared by the remote and local read paths.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    Author,
    CreatedAt,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Query for a page of books.
///
/// `search` is a case-insensitive substring match on title, author and ISBN.
/// `category` matches exactly. `available` filters on the derived flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFilters {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for BookFilters {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            available: None,
            page: default_page(),
            per_page: default_per_page(),
            sort: SortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl BookFilters {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    pub fn sorted_by(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    /// Page number with 0 treated as 1.
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn effective_per_page(&self) -> u32 {
        self.per_page.max(1)
    }

    /// Query-string pairs for `GET /books`. Empty filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(available) = self.available {
            let value = if available { "available" } else { "unavailable" };
            pairs.push(("availability", value.to_string()));
        }
        pairs.push(("page", self.effective_page().to_string()));
        pairs.push(("per_page", self.effective_per_page().to_string()));
        if self.sort != SortKey::default() || self.direction != SortDirection::default() {
            pairs.push(("sort_by", self.sort.as_str().to_string()));
            pairs.push(("sort_order", self.direction.as_str().to_string()));
        }
        pairs
    }
}

/// Where a read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Remote,
    LocalSnapshot,
}

impl Provenance {
    pub fn is_offline(&self) -> bool {
        matches!(self, Provenance::LocalSnapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub provenance: Provenance,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32, provenance: Provenance) -> Self {
        let per_page = per_page.max(1);
        Self {
            items,
            total,
            page: page.max(1),
            per_page,
            last_page: last_page(total, per_page),
            provenance,
        }
    }
}

/// `max(1, ceil(total / per_page))`.
pub fn last_page(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// A single-record read and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub item: T,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// The remote service accepted the write.
    Confirmed,
    /// Applied locally and queued for replay.
    Unconfirmed,
}

/// Result of a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Written<T> {
    pub item: T,
    pub confirmation: Confirmation,
}

impl<T> Written<T> {
    pub fn confirmed(item: T) -> Self {
        Self {
            item,
            confirmation: Confirmation::Confirmed,
        }
    }

    pub fn unconfirmed(item: T) -> Self {
        Self {
            item,
            confirmation: Confirmation::Unconfirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmation == Confirmation::Confirmed
    }
}
