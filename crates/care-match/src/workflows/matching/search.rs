//! Normalized provider-search predicate.
//!
//! The normalization rules here are policy, not accidents: a zero review
//! score means "no score filter", and any age-range input that does not form
//! a valid non-degenerate range disables the age filter instead of failing
//! the search.

use super::domain::ProviderListing;

/// Composable predicate over provider listings. Built once per search, then
/// evaluated by the in-memory store adapter; a SQL adapter would translate
/// the accessor values into query clauses instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderFilter {
    name_term: Option<String>,
    address_term: Option<String>,
    min_review_score: Option<f32>,
    age_range: Option<(u8, u8)>,
}

impl ProviderFilter {
    /// Build a filter from raw, possibly-invalid query parameters.
    ///
    /// * `term` / `address_term`: case-insensitive substring matches on full
    ///   name and address; empty or whitespace-only input counts as absent.
    /// * `min_review_score`: `0` is the sentinel for "unset", not "score >= 0".
    /// * `age_from` / `age_to`: applied only when both bounds are present,
    ///   non-negative with a positive upper bound, and `age_from <= age_to`.
    ///   Anything else (including the degenerate `-1`/`0` sentinel pair) is
    ///   treated as "no age filter" rather than an error.
    pub fn build(
        term: &str,
        address_term: &str,
        min_review_score: f32,
        age_from: Option<i32>,
        age_to: Option<i32>,
    ) -> Self {
        Self {
            name_term: normalize_term(term),
            address_term: normalize_term(address_term),
            min_review_score: (min_review_score > 0.0).then_some(min_review_score),
            age_range: normalize_age_range(age_from, age_to),
        }
    }

    /// True when no filter was set; the search degenerates to "all listings".
    pub fn is_unfiltered(&self) -> bool {
        self.name_term.is_none()
            && self.address_term.is_none()
            && self.min_review_score.is_none()
            && self.age_range.is_none()
    }

    pub fn name_term(&self) -> Option<&str> {
        self.name_term.as_deref()
    }

    pub fn address_term(&self) -> Option<&str> {
        self.address_term.as_deref()
    }

    pub fn min_review_score(&self) -> Option<f32> {
        self.min_review_score
    }

    pub fn age_range(&self) -> Option<(u8, u8)> {
        self.age_range
    }

    /// Evaluate the filter against a listing. All provided filters AND
    /// together; omitted filters are no-ops.
    pub fn matches(&self, listing: &ProviderListing) -> bool {
        if let Some(term) = &self.name_term {
            if !listing.full_name.to_lowercase().contains(term) {
                return false;
            }
        }

        if let Some(term) = &self.address_term {
            if !listing.address.to_lowercase().contains(term) {
                return false;
            }
        }

        if let Some(min) = self.min_review_score {
            if listing.review_score < min {
                return false;
            }
        }

        // A listing qualifies when it can serve the whole requested range.
        if let Some((from, to)) = self.age_range {
            if listing.start_age > from || listing.end_age < to {
                return false;
            }
        }

        true
    }
}

fn normalize_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn normalize_age_range(age_from: Option<i32>, age_to: Option<i32>) -> Option<(u8, u8)> {
    let (from, to) = match (age_from, age_to) {
        (Some(from), Some(to)) => (from, to),
        _ => return None,
    };

    // -1 lower / 0 upper is the "unset" sentinel pair.
    if from < 0 || to <= 0 {
        return None;
    }
    if from > to || to > u8::MAX as i32 {
        return None;
    }

    Some((from as u8, to as u8))
}
