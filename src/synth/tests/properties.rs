// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Algebraic properties of the synthesis engine.

use proptest::prelude::*;

use guc_synth::{Domain, ParameterDescriptor, classify, mutate, normalize, quote, synthesize};

fn bounded_desc(name: &str, current: String, min: String, max: String) -> ParameterDescriptor {
    ParameterDescriptor {
        min_val: Some(min),
        max_val: Some(max),
        ..ParameterDescriptor::new(name, current)
    }
}

proptest! {
    #[test]
    fn boolean_mutation_toggles(current in "(on|off|ON|OFF|On|Off)") {
        let desc = ParameterDescriptor::new("enable_seqscan", current.clone());
        prop_assert_eq!(classify(&desc), Domain::Boolean);
        let result = synthesize(&desc);
        prop_assert!(result.test_value == "on" || result.test_value == "off");
        prop_assert_ne!(result.test_value, current.to_ascii_lowercase());
    }

    #[test]
    fn bounded_integers_stay_in_range(
        min in -1000i64..1000,
        width in 1i64..10_000,
        offset in 0i64..10_000,
    ) {
        let max = min + width;
        let value = min + offset % (width + 1);
        let desc = bounded_desc(
            "shared_knob",
            value.to_string(),
            min.to_string(),
            max.to_string(),
        );
        let result = mutate(Domain::Integer, &desc);
        let mutated: i64 = result.parse().unwrap();
        prop_assert!(mutated >= min && mutated <= max);
        prop_assert_ne!(mutated, value);
    }

    #[test]
    fn bounded_floats_stay_in_range_and_move(
        min in -1000.0f64..1000.0,
        width in 0.01f64..1000.0,
        frac in 0.0f64..=1.0,
    ) {
        let max = min + width;
        let value = min + width * frac;
        let desc = bounded_desc(
            "shared_knob",
            value.to_string(),
            min.to_string(),
            max.to_string(),
        );
        let result = mutate(Domain::Float, &desc);
        let mutated: f64 = result.parse().unwrap();
        prop_assert!(mutated >= min - 1e-9 && mutated <= max + 1e-9);
        prop_assert!((mutated - value).abs() > 1e-4);
    }

    #[test]
    fn unbounded_integers_always_move(value: i32) {
        let desc = ParameterDescriptor::new("work_mem", value.to_string());
        let result = mutate(Domain::Integer, &desc);
        let mutated: i64 = result.parse().unwrap();
        prop_assert_ne!(mutated, i64::from(value));
    }

    #[test]
    fn normalize_is_idempotent(base in "[a-zA-Z0-9_,./ -]{0,24}", wrap in 0usize..4) {
        let raw = match wrap {
            0 => base,
            1 => format!("'{}'", base),
            2 => format!("\"{}\"", base),
            _ => format!("'\"{}\"'", base),
        };
        prop_assert_eq!(normalize(&normalize(&raw)), normalize(&raw));
    }

    #[test]
    fn quoting_preserves_comparison(base in "[a-zA-Z0-9_,./ -]{0,24}") {
        let quoted = quote(Domain::String, base.clone());
        prop_assert!(quoted.is_quoted);
        prop_assert_eq!(normalize(&quoted.test_value), normalize(&base));
    }

    #[test]
    fn excluded_parameters_compare_equal(current in "[a-zA-Z0-9_,./ -]{0,24}") {
        let desc = ParameterDescriptor::new("TimeZone", current.clone());
        let result = synthesize(&desc);
        prop_assert_eq!(normalize(&result.test_value), normalize(&current));
    }
}
