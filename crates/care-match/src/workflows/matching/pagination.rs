//! Slicing and counting over filtered result sets.
//!
//! The total always reflects the full filtered set, independent of the slice
//! returned. When no recognized sort key is supplied, results keep their
//! creation (insertion) order; that is the documented deterministic default.

use serde::Serialize;

use super::domain::MatchingRequest;
use super::domain::ProfileUpdateRequest;

/// Page coordinates supplied by the caller. `page_number` is 1-based; the
/// boundary rejects values below 1 before this type is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: usize,
    /// Explicit override; operations fall back to their configured default
    /// when absent.
    pub page_size: Option<usize>,
}

impl PageRequest {
    pub fn first() -> Self {
        Self {
            page_number: 1,
            page_size: None,
        }
    }
}

/// One slice of a filtered set plus the unsliced total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page_number: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

/// Slice an already-filtered, already-ordered set. `total` counts the whole
/// input; pages past the end yield an empty slice with the same total.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest, default_size: usize) -> Page<T> {
    let page_size = request.page_size.unwrap_or(default_size).max(1);
    let page_number = request.page_number.max(1);
    let total = items.len();

    let start = (page_number - 1).saturating_mul(page_size);
    let sliced = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    };

    Page {
        items: sliced,
        total,
        page_number,
        page_size,
    }
}

/// Sort keys recognized by the request list operations. Unrecognized keys
/// fall back to creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestSort {
    #[default]
    CreatedAt,
}

impl RequestSort {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "created_at" | "created" | "date" => Self::CreatedAt,
            _ => Self::CreatedAt,
        }
    }
}

pub(crate) fn order_matching_requests(
    requests: &mut [MatchingRequest],
    sort: RequestSort,
    descending: bool,
) {
    match sort {
        RequestSort::CreatedAt => requests.sort_by_key(|request| request.created_at),
    }
    if descending {
        requests.reverse();
    }
}

pub(crate) fn order_profile_requests(
    requests: &mut [ProfileUpdateRequest],
    sort: RequestSort,
    descending: bool,
) {
    match sort {
        RequestSort::CreatedAt => requests.sort_by_key(|request| request.created_at),
    }
    if descending {
        requests.reverse();
    }
}
