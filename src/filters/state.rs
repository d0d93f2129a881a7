//! Filter state synchronized with the page location
//!
//! [`FilterQueryState`] keeps the in-memory criteria and the location's query
//! string in step. Each mutation normalizes its input, commits the new
//! criteria, re-encodes and replaces the location in one call, so the only
//! state visible between calls is the synchronized one.

use super::{
    codec::{decode_with_report, encode, normalize_price, split_list},
    models::{FilterCriteria, FilterUpdate},
    query::{compile_query, QueryDescription},
};
use indexmap::IndexSet;

/// The navigable location whose query string mirrors the filters.
pub trait QueryLocation {
    /// Current query string, without the leading `?`.
    fn current(&self) -> String;

    /// Replaces the query string in place. There is no history entry.
    fn replace(&mut self, query: &str);
}

/// A location held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocation {
    query: String,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            query: query.strip_prefix('?').map(str::to_string).unwrap_or(query),
            replacements: 0,
        }
    }

    /// How many times the query string has been replaced.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    /// Simulates a navigation event that sets a new query string.
    pub fn navigate(&mut self, query: impl Into<String>) {
        *self = Self {
            replacements: self.replacements,
            ..Self::new(query)
        };
    }
}

impl QueryLocation for MemoryLocation {
    fn current(&self) -> String {
        self.query.clone()
    }

    fn replace(&mut self, query: &str) {
        self.query = query.to_string();
        self.replacements += 1;
    }
}

/// Authoritative filter, sort and pagination criteria of the product list.
pub struct FilterQueryState<L: QueryLocation> {
    criteria: FilterCriteria,
    encoded: String,
    location: L,
    page_size: u32,
    fallback_count: u64,
}

impl<L: QueryLocation> FilterQueryState<L> {
    /// Derives criteria from the location and rewrites it in canonical form.
    pub fn new(location: L, page_size: u32) -> Self {
        let mut state = Self {
            criteria: FilterCriteria::with_page_size(page_size),
            encoded: String::new(),
            location,
            page_size: page_size.max(1),
            fallback_count: 0,
        };
        state.navigate();
        state
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Last query string written to the location.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Number of malformed query values that have been defaulted so far.
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }

    /// True when the criteria, the last encoding and the location agree.
    pub fn is_synchronized(&self) -> bool {
        encode(&self.criteria) == self.encoded && self.location.current() == self.encoded
    }

    /// Re-derives the criteria after the location changed externally.
    pub fn navigate(&mut self) -> &FilterCriteria {
        let current = self.location.current();
        let decoded = decode_with_report(&current, self.page_size);
        self.fallback_count += decoded.fallbacks.len() as u64;
        self.criteria = decoded.criteria;
        self.encoded = encode(&self.criteria);
        if self.encoded != current.strip_prefix('?').unwrap_or(&current) {
            self.location.replace(&self.encoded);
        }
        &self.criteria
    }

    /// Merges `update` into the current criteria and re-encodes.
    ///
    /// Changing any filter or the sort order without naming a page goes back
    /// to page 1.
    pub fn update(&mut self, update: FilterUpdate) -> &FilterCriteria {
        let mut next = self.criteria.clone();
        let reset_page = update.touches_results() && update.page.is_none();

        if let Some(search) = update.search_text {
            next.search_text = search.trim().to_string();
        }
        if let Some(ids) = update.category_ids {
            next.category_ids = normalize_category_ids(&ids);
        }
        if let Some(brands) = update.brands {
            next.brands = brands.into_iter().collect();
        }
        if let Some(min) = update.price_min {
            next.price_min = min.and_then(|p| checked_price("priceMin", p));
        }
        if let Some(max) = update.price_max {
            next.price_max = max.and_then(|p| checked_price("priceMax", p));
        }
        if let Some(in_stock) = update.in_stock_only {
            next.in_stock_only = in_stock;
        }
        if let Some(sort_key) = update.sort_key {
            next.sort_key = sort_key;
        }
        if let Some(page) = update.page {
            next.page = page.max(1);
        } else if reset_page {
            next.page = 1;
        }

        self.commit(next)
    }

    /// Resets every field to its default except the sort order.
    pub fn clear(&mut self) -> &FilterCriteria {
        let mut next = FilterCriteria::with_page_size(self.page_size);
        next.sort_key = self.criteria.sort_key;
        self.commit(next)
    }

    /// Compiles the current criteria for the product-listing collaborator.
    pub fn compile(&self) -> QueryDescription {
        compile_query(&self.criteria)
    }

    fn commit(&mut self, next: FilterCriteria) -> &FilterCriteria {
        self.criteria = next;
        self.encoded = encode(&self.criteria);
        self.location.replace(&self.encoded);
        &self.criteria
    }
}

/// Trims ids, splits any that contain the list delimiter and drops repeats.
fn normalize_category_ids(ids: &[String]) -> IndexSet<String> {
    ids.iter()
        .flat_map(|id| split_list(id))
        .map(String::from)
        .collect()
}

fn checked_price(field: &'static str, price: f64) -> Option<f64> {
    let normalized = normalize_price(price);
    if normalized.is_none() {
        tracing::warn!(field, price, "ignoring invalid price bound");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::models::{Brand, SortKey};

    fn state(query: &str) -> FilterQueryState<MemoryLocation> {
        FilterQueryState::new(MemoryLocation::new(query), 12)
    }

    #[test]
    fn new_canonicalizes_location() {
        let s = state("?page=1&sortBy=bogus&search=%20bars%20&utm=1");
        assert_eq!(s.encoded(), "search=bars");
        assert_eq!(s.location().current(), "search=bars");
        assert_eq!(s.fallback_count(), 1);
        assert!(s.is_synchronized());
    }

    #[test]
    fn canonical_location_is_not_rewritten() {
        let s = state("search=bars&page=2");
        assert_eq!(s.location().replacements(), 0);
    }

    #[test]
    fn update_replaces_only_given_fields() {
        let mut s = state("search=bars&brands=Toyama&minPrice=5&page=3");
        s.update(FilterUpdate {
            brands: Some(vec![Brand::Buffalo, Brand::Toyama, Brand::Buffalo]),
            ..Default::default()
        });

        let c = s.criteria();
        assert_eq!(c.search_text, "bars");
        assert_eq!(c.price_min, Some(5.0));
        assert_eq!(c.page, 1);
        assert_eq!(
            s.location().current(),
            "search=bars&brands=Buffalo%2CToyama&minPrice=5"
        );
        assert!(s.is_synchronized());
    }

    #[test]
    fn update_can_unset_price_bounds() {
        let mut s = state("minPrice=5&maxPrice=50");
        s.update(FilterUpdate {
            price_min: Some(None),
            ..Default::default()
        });
        assert_eq!(s.criteria().price_min, None);
        assert_eq!(s.criteria().price_max, Some(50.0));
        assert_eq!(s.encoded(), "maxPrice=50");
    }

    #[test]
    fn update_normalizes_inputs() {
        let mut s = state("");
        s.update(FilterUpdate {
            search_text: Some("  gel  ".into()),
            category_ids: Some(vec![" c1 ".into(), "c2,c3".into(), "c1".into(), "".into()]),
            price_max: Some(Some(-3.0)),
            page: Some(0),
            ..Default::default()
        });
        let c = s.criteria();
        assert_eq!(c.search_text, "gel");
        assert_eq!(c.category_ids.iter().collect::<Vec<_>>(), ["c1", "c2", "c3"]);
        assert_eq!(c.price_max, None);
        assert_eq!(c.page, 1);
    }

    #[test]
    fn page_only_update_keeps_filters() {
        let mut s = state("search=bars");
        s.update(FilterUpdate {
            page: Some(4),
            ..Default::default()
        });
        assert_eq!(s.encoded(), "search=bars&page=4");
    }

    #[test]
    fn every_update_replaces_without_history() {
        let mut s = state("");
        for page in 2..=4 {
            s.update(FilterUpdate {
                page: Some(page),
                ..Default::default()
            });
        }
        assert_eq!(s.location().replacements(), 3);
        assert_eq!(s.location().current(), "page=4");
    }

    #[test]
    fn clear_preserves_sort_and_is_idempotent() {
        let mut s = state("search=x&categories=a&inStock=true&sortBy=price-desc&page=5");
        s.clear();
        let once = s.criteria().clone();
        assert_eq!(once.sort_key, SortKey::PriceDesc);
        assert!(!once.has_active_filters());
        assert_eq!(once.page, 1);
        assert_eq!(s.encoded(), "sortBy=price-desc");

        s.clear();
        assert_eq!(s.criteria(), &once);
        assert_eq!(s.encoded(), "sortBy=price-desc");
    }

    #[test]
    fn navigate_rederives_from_location() {
        let mut s = state("search=bars");
        s.location_mut().navigate("?brands=Tssaper&page=2");
        s.navigate();
        assert_eq!(s.criteria().search_text, "");
        assert_eq!(s.criteria().page, 2);
        assert!(s.has_active_filters());
        assert!(s.is_synchronized());
    }

    #[test]
    fn compile_uses_current_criteria() {
        let s = state("minPrice=50&maxPrice=10");
        assert!(s.compile().matches_nothing());
    }
}
