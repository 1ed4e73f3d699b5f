//! Offline reads: the remote list semantics reproduced over the snapshot.

use crate::model::{BookFilters, BookRecord, PagedResult, Provenance, SortDirection, SortKey};
use std::cmp::Ordering;

fn matches(book: &BookRecord, filters: &BookFilters) -> bool {
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        let hit = book.title.to_lowercase().contains(&term)
            || book.author.to_lowercase().contains(&term)
            || book
                .isbn
                .as_deref()
                .is_some_and(|isbn| isbn.to_lowercase().contains(&term));
        if !hit {
            return false;
        }
    }
    if let Some(category) = filters.category.as_deref().filter(|c| !c.is_empty()) {
        if book.category != category {
            return false;
        }
    }
    if let Some(available) = filters.available {
        if (book.available_copies > 0) != available {
            return false;
        }
    }
    true
}

fn compare(a: &BookRecord, b: &BookRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Filters, sorts and paginates `records` like `GET /books` would.
///
/// A page past the end yields no items but the same `total` and `last_page`.
pub fn query_snapshot(records: &[BookRecord], filters: &BookFilters) -> PagedResult<BookRecord> {
    let mut hits: Vec<&BookRecord> = records.iter().filter(|b| matches(b, filters)).collect();
    hits.sort_by(|a, b| {
        let order = compare(a, b, filters.sort);
        match filters.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });

    let page = filters.effective_page();
    let per_page = filters.effective_per_page();
    let total = hits.len() as u64;
    let skip = (page as usize - 1).saturating_mul(per_page as usize);
    let items = hits
        .into_iter()
        .skip(skip)
        .take(per_page as usize)
        .map(|b| b.clone().normalized())
        .collect();

    PagedResult::new(items, total, page, per_page, Provenance::LocalSnapshot)
}
