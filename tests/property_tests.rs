//! Property-based tests for the catalog wire formats.
//!
//! These tests use proptest to verify invariants across a wide range of inputs,
//! helping to catch edge cases that unit tests might miss.

use base64::{engine::general_purpose, Engine as _};
use catalog_api::handlers::products::ProductPayload;
use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::json;

// Strategies for generating test data
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28).prop_map(|(year, month, day)| {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
    })
}

fn price_string_strategy() -> impl Strategy<Value = String> {
    (0u64..1_000_000, 0u8..100).prop_map(|(units, cents)| format!("{}.{:02}", units, cents))
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}".prop_map(|s| s)
}

// Property: the dd-MM-yyyy wire format round-trips losslessly
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn release_date_wire_format_round_trips(date in date_strategy()) {
        let formatted = date.format("%d-%m-%Y").to_string();
        prop_assert_eq!(formatted.len(), 10, "unexpected width: {}", formatted);

        let parsed = NaiveDate::parse_from_str(&formatted, "%d-%m-%Y");
        prop_assert_eq!(parsed, Ok(date));
    }

    #[test]
    fn payload_release_date_parses_from_wire_form(date in date_strategy()) {
        let wire = date.format("%d-%m-%Y").to_string();
        let payload: ProductPayload =
            serde_json::from_value(json!({ "releaseDate": wire }))
                .expect("wire-form date deserializes");
        prop_assert_eq!(payload.release_date, Some(date));
    }

    #[test]
    fn payload_rejects_iso_release_dates(date in date_strategy()) {
        let iso = date.format("%Y-%m-%d").to_string();
        let result = serde_json::from_value::<ProductPayload>(json!({ "releaseDate": iso }));
        prop_assert!(result.is_err(), "ISO date should be rejected: {}", iso);
    }
}

// Property: decimal prices survive the string wire form exactly
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn string_prices_parse_exactly(price_str in price_string_strategy()) {
        let payload: ProductPayload =
            serde_json::from_value(json!({ "price": price_str.clone() }))
                .expect("string price deserializes");

        let price = payload.price.expect("price present");
        prop_assert!(!price.is_sign_negative());
        // Decimal keeps the scale it was parsed with, so the rendering is exact
        prop_assert_eq!(price.to_string(), price_str);
    }

    #[test]
    fn numeric_prices_are_accepted(units in 0u32..100_000, cents in 0u8..100) {
        let number = f64::from(units) + f64::from(cents) / 100.0;
        let payload: ProductPayload =
            serde_json::from_value(json!({ "price": number }))
                .expect("numeric price deserializes");
        let price = payload.price.expect("price present");
        prop_assert!(!price.is_sign_negative());
    }
}

// Property: base64 image payloads decode back to the original bytes
proptest! {
    #[test]
    fn image_bytes_round_trip_through_base64(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let encoded = general_purpose::STANDARD.encode(&bytes);
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .expect("base64 output decodes");
        prop_assert_eq!(decoded, bytes);
    }
}

// Property: the search keyword normalization used by the store layer
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn keyword_lowercasing_is_idempotent(keyword in keyword_strategy()) {
        let once = keyword.to_lowercase();
        prop_assert_eq!(once.clone(), once.to_lowercase());
    }

    #[test]
    fn uppercased_keyword_still_matches_lowercased_haystack(keyword in keyword_strategy()) {
        let haystack = format!("prefix {} suffix", keyword).to_lowercase();
        let probe = keyword.to_uppercase().to_lowercase();
        prop_assert!(haystack.contains(&probe), "{} not found in {}", probe, haystack);
    }
}
