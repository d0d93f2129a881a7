//! Property tests for the query codec and the cart stock rules

use proptest::prelude::*;
use std::sync::Arc;

use storefront_sync::cart::{CartStore, Product};
use storefront_sync::catalog::{InMemoryCatalog, ProductRecord};
use storefront_sync::error::CartError;
use storefront_sync::filters::{
    compile_query, decode, encode, Brand, FilterCriteria, FilterQueryState, MemoryLocation,
    SortKey,
};
use storefront_sync::storage::MemoryStorage;

const PAGE_SIZE: u32 = 12;

/// Query strings built from real keys with a mix of valid and junk values.
fn query_string() -> impl Strategy<Value = String> {
    let key = prop::sample::select(vec![
        "search",
        "categories",
        "brands",
        "minPrice",
        "maxPrice",
        "inStock",
        "sortBy",
        "page",
        "utm_source",
    ]);
    let value = prop_oneof![
        "[ -~]{0,12}",
        prop::sample::select(vec![
            "Toyama,Buffalo",
            "Tssaper",
            "Acme",
            "price-desc",
            "name-asc",
            "true",
            "false",
            "12.50",
            "-4",
            "NaN",
            "0",
            "3",
            " a , b ,, a ",
        ])
        .prop_map(String::from),
    ];
    prop::collection::vec((key, value), 0..8).prop_map(|pairs| {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs {
            serializer.append_pair(k, &v);
        }
        serializer.finish()
    })
}

fn criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        "[a-z ]{0,10}",
        prop::collection::vec("[a-z0-9-]{1,6}", 0..4),
        prop::collection::vec(prop::sample::select(Brand::ALL.to_vec()), 0..3),
        prop::option::of(0.0f64..10_000.0),
        prop::option::of(0.0f64..10_000.0),
        any::<bool>(),
        prop::sample::select(SortKey::ALL.to_vec()),
        1u32..500,
    )
        .prop_map(|(search, cats, brands, min, max, in_stock, sort_key, page)| {
            let mut c = FilterCriteria::with_page_size(PAGE_SIZE);
            c.search_text = search.trim().to_string();
            c.category_ids = cats.into_iter().collect();
            c.brands = brands.into_iter().collect();
            c.price_min = min;
            c.price_max = max;
            c.in_stock_only = in_stock;
            c.sort_key = sort_key;
            c.page = page;
            c
        })
}

proptest! {
    #[test]
    fn encode_of_decode_is_a_fixed_point(raw in query_string()) {
        let once = encode(&decode(&raw, PAGE_SIZE));
        let twice = encode(&decode(&once, PAGE_SIZE));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn decoded_criteria_round_trip(raw in query_string()) {
        let c = decode(&raw, PAGE_SIZE);
        prop_assert_eq!(decode(&encode(&c), PAGE_SIZE), c);
    }

    #[test]
    fn well_formed_criteria_round_trip(c in criteria()) {
        prop_assert_eq!(decode(&encode(&c), PAGE_SIZE), c);
    }

    #[test]
    fn clear_keeps_sort_and_is_idempotent(raw in query_string()) {
        let mut state = FilterQueryState::new(MemoryLocation::new(raw), PAGE_SIZE);
        let sort_key = state.criteria().sort_key;

        state.clear();
        let once = state.criteria().clone();
        let mut expected = FilterCriteria::with_page_size(PAGE_SIZE);
        expected.sort_key = sort_key;
        prop_assert_eq!(&once, &expected);

        state.clear();
        prop_assert_eq!(state.criteria(), &once);
        prop_assert!(state.is_synchronized());
    }

    #[test]
    fn inverted_range_matches_no_product(
        min in 1.0f64..1_000.0,
        gap in 0.01f64..500.0,
        prices in prop::collection::vec(0.0f64..2_000.0, 0..20),
    ) {
        let mut c = FilterCriteria::with_page_size(PAGE_SIZE);
        c.price_min = Some(min);
        c.price_max = Some((min - gap).max(0.0));

        let catalog = InMemoryCatalog::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, price)| ProductRecord {
                    id: i.to_string(),
                    name: format!("p{i}"),
                    brand: "Buffalo".into(),
                    category_id: None,
                    price: *price,
                    stock: 1,
                    image_url: String::new(),
                    created_at: String::new(),
                })
                .collect(),
        );
        let page = catalog.fetch(&compile_query(&c));
        prop_assert_eq!(page.total_count, 0);
    }

    #[test]
    fn repeated_adds_cap_at_stock_limit(adds in 0usize..20, stock_limit in 1u32..10) {
        let mut cart = CartStore::open(Arc::new(MemoryStorage::new()));
        let product = Product {
            id: "p".into(),
            name: "P".into(),
            brand: "Toyama".into(),
            price: 3.0,
            image_url: String::new(),
        };

        let mut successes = 0u32;
        for _ in 0..adds {
            match cart.add(&product, stock_limit) {
                Ok(_) => successes += 1,
                Err(e) => {
                    prop_assert!(
                        matches!(e, CartError::StockExceeded { .. }),
                        "unexpected rejection {:?}",
                        e
                    );
                }
            }
        }

        let quantity = cart.line("p").map_or(0, |l| l.quantity);
        prop_assert_eq!(quantity, successes.min(stock_limit));
        prop_assert_eq!(quantity as usize, adds.min(stock_limit as usize));
    }
}
