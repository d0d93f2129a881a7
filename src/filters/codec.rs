//! URL query-string codec for [`FilterCriteria`]
//!
//! Decoding never fails: a malformed value falls back to its field default
//! and is reported as a [`DecodeFallback`]. Encoding is canonical: fields at
//! their default are omitted, keys are written in a fixed order and sets are
//! comma-joined in insertion order, so `encode(decode(x))` is a fixed point.

use super::models::{Brand, FilterCriteria, SortKey};
use crate::error::DecodeFallback;
use indexmap::IndexSet;
use url::form_urlencoded;

pub const KEY_SEARCH: &str = "search";
pub const KEY_CATEGORIES: &str = "categories";
pub const KEY_BRANDS: &str = "brands";
pub const KEY_MIN_PRICE: &str = "minPrice";
pub const KEY_MAX_PRICE: &str = "maxPrice";
pub const KEY_IN_STOCK: &str = "inStock";
pub const KEY_SORT_BY: &str = "sortBy";
pub const KEY_PAGE: &str = "page";

const LIST_DELIMITER: char = ',';

/// Criteria together with the fields that had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub criteria: FilterCriteria,
    pub fallbacks: Vec<DecodeFallback>,
}

/// Parses a query string (with or without a leading `?`).
pub fn decode(query: &str, page_size: u32) -> FilterCriteria {
    decode_with_report(query, page_size).criteria
}

/// Like [`decode`], also returning every malformed field that was defaulted.
pub fn decode_with_report(query: &str, page_size: u32) -> Decoded {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut criteria = FilterCriteria::with_page_size(page_size);
    let mut fallbacks = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        // The first occurrence of a key wins, as with `URLSearchParams.get`.
        if seen.iter().any(|k| *k == key) {
            continue;
        }
        seen.push(key.to_string());

        let mut fallback = |key: &'static str| {
            tracing::debug!(key, raw = %value, "malformed query value, using default");
            fallbacks.push(DecodeFallback {
                key,
                raw: value.to_string(),
            });
        };

        match &*key {
            KEY_SEARCH => criteria.search_text = value.trim().to_string(),
            KEY_CATEGORIES => criteria.category_ids = split_list(&value).map(String::from).collect(),
            KEY_BRANDS => match parse_brands(&value) {
                Some(brands) => criteria.brands = brands,
                None => fallback(KEY_BRANDS),
            },
            KEY_MIN_PRICE => match parse_price(&value) {
                Ok(price) => criteria.price_min = price,
                Err(()) => fallback(KEY_MIN_PRICE),
            },
            KEY_MAX_PRICE => match parse_price(&value) {
                Ok(price) => criteria.price_max = price,
                Err(()) => fallback(KEY_MAX_PRICE),
            },
            KEY_IN_STOCK => match &*value {
                "true" => criteria.in_stock_only = true,
                "" | "false" => {}
                _ => fallback(KEY_IN_STOCK),
            },
            KEY_SORT_BY => match SortKey::from_token(&value) {
                Some(sort_key) => criteria.sort_key = sort_key,
                None if value.is_empty() => {}
                None => fallback(KEY_SORT_BY),
            },
            KEY_PAGE => match value.parse::<u32>() {
                Ok(page) if page >= 1 => criteria.page = page,
                _ if value.is_empty() => {}
                _ => fallback(KEY_PAGE),
            },
            _ => {}
        }
    }

    Decoded {
        criteria,
        fallbacks,
    }
}

/// Renders the canonical query string (no leading `?`).
pub fn encode(criteria: &FilterCriteria) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in encode_pairs(criteria) {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}

/// The non-default fields as ordered key/value pairs.
pub fn encode_pairs(criteria: &FilterCriteria) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    if !criteria.search_text.is_empty() {
        pairs.push((KEY_SEARCH, criteria.search_text.clone()));
    }
    if !criteria.category_ids.is_empty() {
        let joined = criteria
            .category_ids
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        pairs.push((KEY_CATEGORIES, joined));
    }
    if !criteria.brands.is_empty() {
        let joined = criteria
            .brands
            .iter()
            .map(|b| b.as_token())
            .collect::<Vec<_>>()
            .join(",");
        pairs.push((KEY_BRANDS, joined));
    }
    if let Some(min) = criteria.price_min {
        pairs.push((KEY_MIN_PRICE, format_price(min)));
    }
    if let Some(max) = criteria.price_max {
        pairs.push((KEY_MAX_PRICE, format_price(max)));
    }
    if criteria.in_stock_only {
        pairs.push((KEY_IN_STOCK, "true".to_string()));
    }
    if criteria.sort_key != SortKey::default() {
        pairs.push((KEY_SORT_BY, criteria.sort_key.as_token().to_string()));
    }
    if criteria.page != 1 {
        pairs.push((KEY_PAGE, criteria.page.to_string()));
    }

    pairs
}

/// Splits a delimited list, trimming items and dropping empty ones.
pub(crate) fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// All tokens must be known brands; any unknown token defaults the field.
fn parse_brands(raw: &str) -> Option<IndexSet<Brand>> {
    split_list(raw).map(Brand::from_token).collect()
}

/// Empty means unset; anything else must be a finite, non-negative decimal.
fn parse_price(raw: &str) -> Result<Option<f64>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(price) => normalize_price(price).map(Some).ok_or(()),
        Err(_) => Err(()),
    }
}

/// Rejects negative or non-finite prices and folds `-0` into `0`.
pub(crate) fn normalize_price(price: f64) -> Option<f64> {
    (price.is_finite() && price >= 0.0).then_some(price + 0.0)
}

/// Shortest decimal that parses back to the same value.
fn format_price(price: f64) -> String {
    price.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SIZE: u32 = 12;

    #[test]
    fn empty_query_decodes_to_defaults() {
        let criteria = decode("", PAGE_SIZE);
        assert_eq!(criteria, FilterCriteria::with_page_size(PAGE_SIZE));
        assert_eq!(criteria.page, 1);
        assert_eq!(encode(&criteria), "");
    }

    #[test]
    fn decodes_every_field() {
        let decoded = decode_with_report(
            "?search=%20whey%20protein%20&categories=c2,c1&brands=Toyama,Buffalo\
             &minPrice=10.5&maxPrice=200&inStock=true&sortBy=price-asc&page=3",
            PAGE_SIZE,
        );
        assert!(decoded.fallbacks.is_empty());

        let c = decoded.criteria;
        assert_eq!(c.search_text, "whey protein");
        assert_eq!(c.category_ids.iter().collect::<Vec<_>>(), ["c2", "c1"]);
        assert_eq!(
            c.brands.iter().copied().collect::<Vec<_>>(),
            [Brand::Toyama, Brand::Buffalo]
        );
        assert_eq!(c.price_min, Some(10.5));
        assert_eq!(c.price_max, Some(200.0));
        assert!(c.in_stock_only);
        assert_eq!(c.sort_key, SortKey::PriceAsc);
        assert_eq!(c.page, 3);
    }

    #[test]
    fn encode_is_canonical() {
        let mut c = FilterCriteria::with_page_size(PAGE_SIZE);
        c.search_text = "whey protein".into();
        c.category_ids.insert("c2".into());
        c.category_ids.insert("c1".into());
        c.brands.insert(Brand::Toyama);
        c.price_min = Some(10.0);
        c.in_stock_only = true;
        c.sort_key = SortKey::NameDesc;
        c.page = 2;

        assert_eq!(
            encode(&c),
            "search=whey+protein&categories=c2%2Cc1&brands=Toyama&minPrice=10\
             &inStock=true&sortBy=name-desc&page=2"
        );
    }

    #[test]
    fn malformed_values_fall_back_per_field() {
        let decoded = decode_with_report(
            "search=ok&minPrice=cheap&maxPrice=-5&brands=Toyama,Acme\
             &sortBy=popularity&page=0&inStock=yes&utm_source=x",
            PAGE_SIZE,
        );
        let c = &decoded.criteria;
        assert_eq!(c.search_text, "ok");
        assert_eq!(c.price_min, None);
        assert_eq!(c.price_max, None);
        assert!(c.brands.is_empty());
        assert_eq!(c.sort_key, SortKey::CreatedAtDesc);
        assert_eq!(c.page, 1);
        assert!(!c.in_stock_only);

        let keys: Vec<_> = decoded.fallbacks.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            [KEY_MIN_PRICE, KEY_MAX_PRICE, KEY_BRANDS, KEY_SORT_BY, KEY_PAGE, KEY_IN_STOCK]
        );
        assert_eq!(encode(c), "search=ok");
    }

    #[test]
    fn page_one_is_omitted() {
        let c = decode("page=1", PAGE_SIZE);
        assert_eq!(c.page, 1);
        assert_eq!(encode(&c), "");
        assert_eq!(decode("page=01", PAGE_SIZE).page, 1);
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let c = decode("page=4&page=9", PAGE_SIZE);
        assert_eq!(c.page, 4);
    }

    #[test]
    fn list_items_are_trimmed_and_deduplicated() {
        let c = decode("categories=a,%20b,,a,", PAGE_SIZE);
        assert_eq!(c.category_ids.iter().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(encode(&c), "categories=a%2Cb");
    }

    #[test]
    fn prices_round_trip_exactly() {
        for price in [0.0, 0.1, 19.99, 1e-7, 123456789.125, 1e21] {
            let mut c = FilterCriteria::with_page_size(PAGE_SIZE);
            c.price_max = Some(price);
            assert_eq!(decode(&encode(&c), PAGE_SIZE).price_max, Some(price));
        }
        assert_eq!(decode("minPrice=-0", PAGE_SIZE).price_min, Some(0.0));
        assert_eq!(decode("minPrice=inf", PAGE_SIZE).price_min, None);
    }

    #[test]
    fn empty_values_mean_absent_without_fallback() {
        let decoded = decode_with_report("search=&minPrice=&sortBy=&page=&inStock=", PAGE_SIZE);
        assert!(decoded.fallbacks.is_empty());
        assert_eq!(decoded.criteria, FilterCriteria::with_page_size(PAGE_SIZE));
    }
}
