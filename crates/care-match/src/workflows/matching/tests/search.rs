use crate::workflows::matching::search::ProviderFilter;

use super::common::listing;

#[test]
fn zero_review_score_is_the_unset_sentinel() {
    let filter = ProviderFilter::build("", "", 0.0, None, None);
    assert!(filter.min_review_score().is_none());

    let unrated = listing("p1", "A", "Anywhere", 0.0, 1, 10);
    assert!(filter.matches(&unrated));
}

#[test]
fn positive_review_score_filters() {
    let filter = ProviderFilter::build("", "", 4.0, None, None);
    assert!(filter.matches(&listing("p1", "A", "X", 4.5, 1, 10)));
    assert!(!filter.matches(&listing("p2", "B", "X", 3.9, 1, 10)));
}

#[test]
fn inverted_age_range_disables_the_age_filter() {
    let filter = ProviderFilter::build("", "", 0.0, Some(7), Some(3));
    assert!(filter.age_range().is_none());
    // Permissive fallback: everything matches rather than nothing.
    assert!(filter.matches(&listing("p1", "A", "X", 0.0, 1, 2)));
}

#[test]
fn degenerate_sentinel_pair_disables_the_age_filter() {
    let filter = ProviderFilter::build("", "", 0.0, Some(-1), Some(0));
    assert!(filter.age_range().is_none());
    assert!(filter.is_unfiltered());
}

#[test]
fn single_bound_disables_the_age_filter() {
    assert!(ProviderFilter::build("", "", 0.0, Some(3), None)
        .age_range()
        .is_none());
    assert!(ProviderFilter::build("", "", 0.0, None, Some(5))
        .age_range()
        .is_none());
}

#[test]
fn valid_age_range_requires_the_listing_to_cover_it() {
    let filter = ProviderFilter::build("", "", 0.0, Some(3), Some(5));
    assert_eq!(filter.age_range(), Some((3, 5)));

    assert!(filter.matches(&listing("p1", "A", "X", 0.0, 3, 5)));
    assert!(filter.matches(&listing("p2", "B", "X", 0.0, 1, 8)));
    // Partial overlap is not enough.
    assert!(!filter.matches(&listing("p3", "C", "X", 0.0, 4, 8)));
    assert!(!filter.matches(&listing("p4", "D", "X", 0.0, 1, 4)));
}

#[test]
fn name_and_address_terms_match_case_insensitive_substrings() {
    let filter = ProviderFilter::build("morning", "new york", 0.0, None, None);
    let hit = listing("p1", "Morningside Care", "401 W 118th St, New York", 0.0, 1, 10);
    let wrong_address = listing("p2", "Morningside Care", "Hoboken", 0.0, 1, 10);
    let wrong_name = listing("p3", "Harbor Kids", "New York", 0.0, 1, 10);

    assert!(filter.matches(&hit));
    assert!(!filter.matches(&wrong_address));
    assert!(!filter.matches(&wrong_name));
}

#[test]
fn blank_terms_count_as_absent() {
    let filter = ProviderFilter::build("   ", "\t", 0.0, None, None);
    assert!(filter.is_unfiltered());
}

#[test]
fn provided_filters_and_together() {
    let filter = ProviderFilter::build("", "york", 3.0, Some(2), Some(4));
    let hit = listing("p1", "A", "New York", 4.0, 1, 6);
    assert!(filter.matches(&hit));

    assert!(!filter.matches(&listing("p2", "A", "New York", 2.0, 1, 6)));
    assert!(!filter.matches(&listing("p3", "A", "Chicago", 4.0, 1, 6)));
    assert!(!filter.matches(&listing("p4", "A", "New York", 4.0, 3, 6)));
}
