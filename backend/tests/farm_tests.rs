//! Farm registration tests
//!
//! Tests for farm field validation including:
//! - Geographic coordinate bounds
//! - Name and area constraints
//! - Supported crop types

use proptest::prelude::*;

use rust_decimal::Decimal;
use shared::types::SUPPORTED_CROPS;
use shared::validation::{
    validate_area_hectares, validate_crop_type, validate_farm_name, validate_latitude,
    validate_longitude,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Coordinates across the globe are accepted
    #[test]
    fn test_world_coordinates_valid() {
        let coords = [
            (dec("-1.2921"), dec("36.8219")),   // Nairobi
            (dec("14.4974"), dec("-87.6383")),  // Honduras
            (dec("30.9010"), dec("75.8573")),   // Punjab
            (dec("-23.5505"), dec("-46.6333")), // São Paulo
        ];

        for (lat, lon) in coords {
            assert!(validate_latitude(lat).is_ok());
            assert!(validate_longitude(lon).is_ok());
        }
    }

    /// The poles and the antimeridian are the inclusive edges
    #[test]
    fn test_coordinate_bounds_are_inclusive() {
        assert!(validate_latitude(dec("90")).is_ok());
        assert!(validate_latitude(dec("-90")).is_ok());
        assert!(validate_longitude(dec("180")).is_ok());
        assert!(validate_longitude(dec("-180")).is_ok());

        assert!(validate_latitude(dec("90.0001")).is_err());
        assert!(validate_latitude(dec("-90.0001")).is_err());
        assert!(validate_longitude(dec("180.0001")).is_err());
        assert!(validate_longitude(dec("-180.0001")).is_err());
    }

    /// Names must be non-blank and fit the column
    #[test]
    fn test_farm_name_constraints() {
        assert!(validate_farm_name("North Field").is_ok());
        assert!(validate_farm_name(&"x".repeat(100)).is_ok());

        assert!(validate_farm_name("").is_err());
        assert!(validate_farm_name("   ").is_err());
        assert!(validate_farm_name(&"x".repeat(101)).is_err());
    }

    /// Every supported crop is accepted verbatim
    #[test]
    fn test_supported_crops_accepted() {
        for crop in SUPPORTED_CROPS {
            assert!(validate_crop_type(crop).is_ok(), "{} should be accepted", crop);
        }
    }

    /// Unknown crops and case variants are rejected
    #[test]
    fn test_unknown_crops_rejected() {
        assert!(validate_crop_type("banana").is_err());
        assert!(validate_crop_type("").is_err());

        for crop in SUPPORTED_CROPS {
            let upper = crop.to_uppercase();
            assert!(
                validate_crop_type(&upper).is_err(),
                "{} should be rejected",
                upper
            );
        }
    }

    /// Area must be positive and within the supported ceiling
    #[test]
    fn test_area_constraints() {
        assert!(validate_area_hectares(dec("0.01")).is_ok());
        assert!(validate_area_hectares(dec("2.5")).is_ok());
        assert!(validate_area_hectares(dec("100000")).is_ok());

        assert!(validate_area_hectares(Decimal::ZERO).is_err());
        assert!(validate_area_hectares(dec("-1")).is_err());
        assert!(validate_area_hectares(dec("100000.01")).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for in-range latitudes at four decimal places
    fn latitude_strategy() -> impl Strategy<Value = Decimal> {
        (-900_000i64..=900_000).prop_map(|n| Decimal::new(n, 4))
    }

    /// Strategy for in-range longitudes at four decimal places
    fn longitude_strategy() -> impl Strategy<Value = Decimal> {
        (-1_800_000i64..=1_800_000).prop_map(|n| Decimal::new(n, 4))
    }

    /// Strategy for latitudes beyond either pole
    fn out_of_range_latitude_strategy() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            (900_001i64..=2_000_000).prop_map(|n| Decimal::new(n, 4)),
            (-2_000_000i64..=-900_001).prop_map(|n| Decimal::new(n, 4)),
        ]
    }

    /// Strategy for plausible farmed areas in hectares
    fn area_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for printable farm names
    fn farm_name_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,60}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any coordinate pair inside the bounds is accepted
        #[test]
        fn prop_in_range_coordinates_accepted(
            lat in latitude_strategy(),
            lon in longitude_strategy()
        ) {
            prop_assert!(validate_latitude(lat).is_ok());
            prop_assert!(validate_longitude(lon).is_ok());
        }

        /// Latitudes past a pole are always rejected
        #[test]
        fn prop_out_of_range_latitudes_rejected(
            lat in out_of_range_latitude_strategy()
        ) {
            prop_assert!(validate_latitude(lat).is_err());
        }

        /// Names starting with a letter are always accepted
        #[test]
        fn prop_printable_names_accepted(name in farm_name_strategy()) {
            prop_assert!(validate_farm_name(&name).is_ok());
        }

        /// Whitespace-only names are always rejected
        #[test]
        fn prop_blank_names_rejected(name in " {1,10}") {
            prop_assert!(validate_farm_name(&name).is_err());
        }

        /// Positive areas up to the ceiling are accepted
        #[test]
        fn prop_in_range_areas_accepted(area in area_strategy()) {
            prop_assert!(validate_area_hectares(area).is_ok());
        }

        /// Zero and negative areas are rejected
        #[test]
        fn prop_non_positive_areas_rejected(n in -1_000_000i64..=0) {
            prop_assert!(validate_area_hectares(Decimal::new(n, 2)).is_err());
        }

        /// Crop validation agrees with the supported list exactly
        #[test]
        fn prop_crop_membership_decides(crop in "[a-z]{3,12}") {
            let accepted = validate_crop_type(&crop).is_ok();
            prop_assert_eq!(accepted, SUPPORTED_CROPS.contains(&crop.as_str()));
        }

        /// Every supported crop passes by construction
        #[test]
        fn prop_supported_crops_pass(
            crop in prop::sample::select(SUPPORTED_CROPS)
        ) {
            prop_assert!(validate_crop_type(crop).is_ok());
        }
    }
}
