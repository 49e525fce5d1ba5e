// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Per-domain value mutation.
//!
//! Each strategy produces the raw body of the test value; quoting is applied
//! separately. Mutation never fails: parses are guarded and every branch has
//! a terminal fallback, so the worst outcome for an unrecognized parameter is
//! an unchanged (but well-formed) value.

use crate::classify::Domain;
use crate::descriptor::ParameterDescriptor;

/// How close a float must be to a bound to count as sitting on it.
const FLOAT_BOUNDARY_EPSILON: f64 = 1e-4;

/// Produces a raw test value for `desc` in the given domain.
pub fn mutate(domain: Domain, desc: &ParameterDescriptor) -> String {
    let current = desc.current();
    match domain {
        // Excluded parameters are handled by the exclusion policy before
        // mutation; treat a direct call as a pass-through.
        Domain::Excluded => current.into(),
        Domain::Boolean => mutate_boolean(current),
        Domain::Integer => match current.parse::<i32>() {
            Ok(value) => mutate_integer(
                &desc.name,
                i64::from(value),
                desc.min_val.as_deref(),
                desc.max_val.as_deref(),
            ),
            Err(_) => mutate_string(&desc.name, current),
        },
        Domain::Float => match current.parse::<f64>() {
            Ok(value) => mutate_float(
                &desc.name,
                value,
                desc.min_val.as_deref(),
                desc.max_val.as_deref(),
            ),
            Err(_) => mutate_string(&desc.name, current),
        },
        Domain::String => mutate_string(&desc.name, current),
    }
}

fn mutate_boolean(current: &str) -> String {
    if current.eq_ignore_ascii_case("on") {
        "off".into()
    } else {
        "on".into()
    }
}

fn parse_bound_i64(bound: Option<&str>) -> Option<i64> {
    bound
        .filter(|b| !b.is_empty())
        .and_then(|b| b.parse::<i32>().ok())
        .map(i64::from)
}

fn parse_bound_f64(bound: Option<&str>) -> Option<f64> {
    bound.filter(|b| !b.is_empty()).and_then(|b| b.parse().ok())
}

// Integer mutation ///////////////////////////////////////////////////////////

/// Per-name rules for integer parameters with known narrow domains.
///
/// A rule returning `None` defers to the magnitude-tiered default for that
/// value.
type IntegerRule = fn(i64) -> Option<String>;

static INTEGER_RULES: &[(&str, IntegerRule)] = &[
    // Effort scale 1..10.
    ("geqo_effort", |v| {
        Some((if v >= 5 { v - 2 } else { v + 2 }).to_string())
    }),
    // Lower bound 2; stay near the usual setting.
    ("geqo_threshold", |v| {
        Some((if v >= 12 { "10" } else { "12" }).into())
    }),
    // Worker-count controls have small practical ceilings.
    ("max_parallel_workers_per_gather", worker_count),
    ("max_parallel_workers", worker_count),
    ("max_worker_processes", worker_count),
    // 0 disables rotation; switch it on.
    ("log_rotation_age", |v| (v == 0).then(|| "1440".into())),
    ("log_rotation_size", |v| (v == 0).then(|| "10240".into())),
    // Valid range -15..3.
    ("extra_float_digits", |v| {
        Some(if v >= 0 {
            (if v >= 2 { "-1" } else { "2" }).into()
        } else {
            "0".into()
        })
    }),
    // -1 disables sampling.
    ("log_min_duration_sample", |v| {
        Some(match v {
            -1 => "100".into(),
            0 => "50".into(),
            _ => "-1".into(),
        })
    }),
    // -1 means unlimited; toggle between unlimited and 1GB (in kB).
    ("temp_file_limit", |v| {
        Some(match v {
            -1 => "1048576".into(),
            v if v > 0 => "-1".into(),
            _ => "1048576".into(),
        })
    }),
];

fn worker_count(v: i64) -> Option<String> {
    Some(if v == 0 {
        "2".into()
    } else if v < 4 {
        (v + 1).to_string()
    } else {
        (v - 1).to_string()
    })
}

fn mutate_integer(name: &str, value: i64, min_val: Option<&str>, max_val: Option<&str>) -> String {
    // Server-reported bounds beat any name-based guess.
    if let (Some(min), Some(max)) = (parse_bound_i64(min_val), parse_bound_i64(max_val)) {
        return midpoint_quarter_int(value, min, max).to_string();
    }

    if let Some(result) = INTEGER_RULES
        .iter()
        .find(|(rule_name, _)| *rule_name == name)
        .and_then(|(_, rule)| rule(value))
    {
        return result;
    }

    // Write-flush thresholds are capped at 256 8kB blocks.
    if name.contains("flush_after") {
        let blocks = if value == 0 {
            "128"
        } else if value > 128 {
            "64"
        } else {
            "128"
        };
        return blocks.into();
    }
    // Delay knobs tend to have small ceilings; only the disabled case needs
    // special treatment.
    if name.contains("_delay") && value == 0 {
        return "10".into();
    }

    integer_default(name, value)
}

/// Picks a differing value inside `[min, max]` without semantic knowledge of
/// the parameter: step off an exact bound by one, otherwise move a quarter of
/// the range toward the middle, clamped to the bounds.
fn midpoint_quarter_int(value: i64, min: i64, max: i64) -> i64 {
    let stepped = if value == min {
        (min + 1).min(max)
    } else if value == max {
        (max - 1).max(min)
    } else if value < (min + max) / 2 {
        (value + (max - min) / 4).min(max)
    } else {
        (value - (max - min) / 4).max(min)
    };
    // A range narrower than four makes the quarter step vanish; fall back to
    // a single step so the result still differs.
    if stepped == value {
        if value < max { value + 1 } else { value - 1 }
    } else {
        stepped
    }
}

/// The bounds-free default: step size scales with the magnitude of the value
/// itself, `-1` flips to a small enabling value, `0` is enabled with a size
/// guessed from the name, and values near `i32::MAX` are halved to stay clear
/// of overflow.
fn integer_default(name: &str, value: i64) -> String {
    match value {
        -1 => "2".into(),
        0 => {
            if name.contains("debug")
                || name.contains("trace")
                || name.contains("log_")
                || name.contains("_level")
            {
                "1".into()
            } else if name.contains("timeout")
                || name.contains("_time")
                || name.contains("_size")
                || name.contains("_mem")
                || name.contains("_limit")
                || name.contains("_buffers")
            {
                "1000".into()
            } else {
                "10".into()
            }
        }
        1..=10 => (if value >= 5 { value - 2 } else { value + 2 }).to_string(),
        11..=100 => (value + 10).to_string(),
        101..=10_000 => (value + 100).to_string(),
        10_001..=100_000 => (value + 1000).to_string(),
        v if v > 100_000 && v < i64::from(i32::MAX) / 2 => (v + 10_000).to_string(),
        v => (v / 2).max(0).to_string(),
    }
}

// Float mutation /////////////////////////////////////////////////////////////

/// Per-name rules for float parameters whose domains are too narrow for the
/// generic strategies.
type FloatRule = fn(f64) -> String;

static FLOAT_RULES: &[(&str, FloatRule)] = &[
    // Valid range 1.5..2.0.
    ("geqo_selection_bias", |v| {
        (if v >= 1.8 { "1.5" } else { "2.0" }).into()
    }),
    // Valid range 0.0..1.0.
    ("geqo_seed", |v| (if v == 0.0 { "0.5" } else { "0.0" }).into()),
    ("cursor_tuple_fraction", |v| {
        (if v <= 0.3 { "0.5" } else { "0.1" }).into()
    }),
];

fn mutate_float(name: &str, value: f64, min_val: Option<&str>, max_val: Option<&str>) -> String {
    if let Some((_, rule)) = FLOAT_RULES.iter().find(|(rule_name, _)| *rule_name == name) {
        return rule(value);
    }

    if let (Some(min), Some(max)) = (parse_bound_f64(min_val), parse_bound_f64(max_val)) {
        let quarter = (max - min) * 0.25;
        let stepped = if (value - min).abs() < FLOAT_BOUNDARY_EPSILON {
            (min + quarter).min(max)
        } else if (value - max).abs() < FLOAT_BOUNDARY_EPSILON {
            (max - quarter).max(min)
        } else if value < (min + max) / 2.0 {
            (value + quarter).min(max)
        } else {
            (value - quarter).max(min)
        };
        return format_float(stepped);
    }

    // Planner costs and fractions: an additive nudge sized to the value's
    // natural scale stays inside any plausible range.
    if name.contains("_cost") || name.contains("_fraction") {
        return if value < 1.0 {
            format_float(value + 0.01)
        } else {
            format_float(value + 1.0)
        };
    }

    if value == 0.0 {
        "1.0".into()
    } else {
        format_float(value * 1.5)
    }
}

/// Formats a float so that it remains recognizably float-shaped: integral
/// values keep one fractional digit.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

// String mutation ////////////////////////////////////////////////////////////

/// Per-name alternatives for string parameters with known legal value sets.
/// Each rule toggles between the two most common legal values.
type StringRule = fn(&str) -> String;

static STRING_RULES: &[(&str, StringRule)] = &[
    ("DateStyle", |v| {
        (if v.contains("MDY") { "ISO, DMY" } else { "ISO, MDY" }).into()
    }),
    ("IntervalStyle", |v| {
        (if v == "postgres" { "sql_standard" } else { "postgres" }).into()
    }),
    ("TimeZone", toggle_timezone),
    ("log_timezone", toggle_timezone),
    ("default_text_search_config", |v| {
        let config = if v.contains("simple") {
            "pg_catalog.english"
        } else {
            "pg_catalog.simple"
        };
        config.into()
    }),
    ("search_path", |v| {
        let path = if v.contains("public") {
            "pg_catalog, public"
        } else {
            "public, pg_catalog"
        };
        path.into()
    }),
    ("bytea_output", |v| {
        (if v == "hex" { "escape" } else { "hex" }).into()
    }),
    ("xmlbinary", |v| {
        (if v == "base64" { "hex" } else { "base64" }).into()
    }),
    ("xmloption", |v| {
        (if v == "content" { "document" } else { "content" }).into()
    }),
    ("constraint_exclusion", |v| {
        (if v == "partition" { "on" } else { "partition" }).into()
    }),
    ("default_transaction_isolation", |v| {
        let level = if v.contains("read committed") {
            "serializable"
        } else {
            "read committed"
        };
        level.into()
    }),
    ("session_replication_role", |v| {
        (if v == "origin" { "replica" } else { "origin" }).into()
    }),
    ("backslash_quote", |v| {
        (if v == "safe_encoding" { "on" } else { "safe_encoding" }).into()
    }),
    ("log_min_messages", toggle_message_level),
    ("client_min_messages", toggle_message_level),
    ("log_min_error_statement", |v| {
        (if v == "error" { "warning" } else { "error" }).into()
    }),
    ("log_statement", |v| {
        (if v == "none" { "all" } else { "none" }).into()
    }),
    ("log_error_verbosity", |v| {
        (if v == "default" { "verbose" } else { "default" }).into()
    }),
    ("trace_recovery_messages", |v| {
        (if v == "log" { "notice" } else { "log" }).into()
    }),
    ("application_name", |v| {
        if v.is_empty() {
            "test_app".into()
        } else {
            format!("{}_modified", v)
        }
    }),
];

fn toggle_timezone(v: &str) -> String {
    (if v == "UTC" { "PRC" } else { "UTC" }).into()
}

fn toggle_message_level(v: &str) -> String {
    (if v == "warning" { "notice" } else { "warning" }).into()
}

fn mutate_string(name: &str, current: &str) -> String {
    if current.is_empty() {
        return "test_value".into();
    }
    // Locale settings are left unchanged: a synthesized locale may not exist
    // on the runtime host.
    if name.starts_with("lc_") {
        return current.into();
    }
    if let Some((_, rule)) = STRING_RULES.iter().find(|(rule_name, _)| *rule_name == name) {
        return rule(current);
    }
    // Unconstrained free-form string: any synthesized value might be illegal,
    // so leave it unchanged and let the quoter make it well-formed.
    current.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(name: &str, current: &str, min: &str, max: &str) -> ParameterDescriptor {
        ParameterDescriptor {
            min_val: Some(min.into()),
            max_val: Some(max.into()),
            ..ParameterDescriptor::new(name, current)
        }
    }

    #[test]
    fn boolean_is_exhaustive() {
        assert_eq!(mutate_boolean("on"), "off");
        assert_eq!(mutate_boolean("Off"), "on");
    }

    #[test]
    fn integer_bounds_step_off_the_edges() {
        assert_eq!(midpoint_quarter_int(1, 1, 10), 2);
        assert_eq!(midpoint_quarter_int(10, 1, 10), 9);
        // Lower half moves up a quarter of the range, upper half moves down.
        assert_eq!(midpoint_quarter_int(100, 0, 1000), 350);
        assert_eq!(midpoint_quarter_int(900, 0, 1000), 650);
    }

    #[test]
    fn integer_bounds_never_return_the_input() {
        // A quarter of a narrow range truncates to zero.
        assert_eq!(midpoint_quarter_int(1, 0, 3), 2);
        assert_eq!(midpoint_quarter_int(2, 0, 3), 3);
    }

    #[test]
    fn integer_bounds_survive_extreme_ranges() {
        let result = midpoint_quarter_int(12, 2, i64::from(i32::MAX));
        assert!(result > 2 && result < i64::from(i32::MAX));
        assert_ne!(result, 12);
    }

    #[test]
    fn bounds_beat_name_rules() {
        let desc = bounded("geqo_effort", "5", "1", "10");
        // Midpoint-quarter applies, not the named small-integer rule: 5 sits
        // at the midpoint of [1, 10], so it moves down a quarter of the range.
        assert_eq!(mutate(Domain::Integer, &desc), "3");
    }

    #[test]
    fn unparseable_bounds_fall_through() {
        let desc = bounded("geqo_effort", "5", "1.5", "10");
        assert_eq!(mutate(Domain::Integer, &desc), "3");
    }

    #[test]
    fn integer_sentinels() {
        let mutate_int =
            |name, current| mutate(Domain::Integer, &ParameterDescriptor::new(name, current));
        assert_eq!(mutate_int("temp_file_limit", "-1"), "1048576");
        assert_eq!(mutate_int("temp_file_limit", "1048576"), "-1");
        assert_eq!(mutate_int("log_min_duration_sample", "-1"), "100");
        assert_eq!(mutate_int("log_rotation_age", "0"), "1440");
        assert_eq!(mutate_int("extra_float_digits", "1"), "2");
        assert_eq!(mutate_int("extra_float_digits", "3"), "-1");
        assert_eq!(mutate_int("max_parallel_workers", "8"), "7");
        assert_eq!(mutate_int("backend_flush_after", "0"), "128");
        assert_eq!(mutate_int("vacuum_cost_delay", "0"), "10");
    }

    #[test]
    fn integer_magnitude_tiers() {
        let step = |current: &str| {
            mutate(
                Domain::Integer,
                &ParameterDescriptor::new("some_setting", current),
            )
        };
        assert_eq!(step("-1"), "2");
        assert_eq!(step("0"), "10");
        assert_eq!(step("7"), "5");
        assert_eq!(step("3"), "5");
        assert_eq!(step("50"), "60");
        assert_eq!(step("200"), "300");
        assert_eq!(step("20000"), "21000");
        assert_eq!(step("200000"), "210000");
        // Near i32::MAX the value is halved instead of incremented.
        assert_eq!(step("2000000000"), "1000000000");
    }

    #[test]
    fn zero_integer_guesses_scale_from_name() {
        let step = |name: &str| mutate(Domain::Integer, &ParameterDescriptor::new(name, "0"));
        assert_eq!(step("trace_notify_level"), "1");
        assert_eq!(step("log_temp_bytes"), "1");
        assert_eq!(step("some_timeout"), "1000");
        assert_eq!(step("sort_mem_limit"), "1000");
        assert_eq!(step("geqo_pool_size"), "1000");
        assert_eq!(step("unrecognized_knob"), "10");
    }

    #[test]
    fn float_bounds_use_quarter_steps() {
        // 0.5 sits at the midpoint of [0, 1] and moves down a quarter.
        let desc = bounded("jit_above_cost_ratio", "0.5", "0", "1");
        assert_eq!(mutate(Domain::Float, &desc), "0.25");
        let desc = bounded("jit_above_cost_ratio", "0.0", "0", "1");
        assert_eq!(mutate(Domain::Float, &desc), "0.25");
        let desc = bounded("jit_above_cost_ratio", "1.0", "0", "1");
        assert_eq!(mutate(Domain::Float, &desc), "0.75");
    }

    #[test]
    fn float_named_rules_override_bounds() {
        let desc = bounded("geqo_seed", "0.0", "0", "1");
        assert_eq!(mutate(Domain::Float, &desc), "0.5");
        let desc = bounded("cursor_tuple_fraction", "0.1", "0", "1");
        assert_eq!(mutate(Domain::Float, &desc), "0.5");
        assert_eq!(
            mutate(
                Domain::Float,
                &ParameterDescriptor::new("geqo_selection_bias", "2.0")
            ),
            "1.5"
        );
    }

    #[test]
    fn cost_and_fraction_nudges() {
        let mutate_float =
            |name, current| mutate(Domain::Float, &ParameterDescriptor::new(name, current));
        assert_eq!(mutate_float("cpu_tuple_cost", "0.01"), "0.02");
        assert_eq!(mutate_float("random_page_cost", "4.0"), "5.0");
        assert_eq!(mutate_float("parallel_setup_cost", "1000.0"), "1001.0");
    }

    #[test]
    fn float_defaults() {
        let mutate_float =
            |name, current| mutate(Domain::Float, &ParameterDescriptor::new(name, current));
        assert_eq!(mutate_float("some_ratio", "0.0"), "1.0");
        assert_eq!(mutate_float("some_ratio", "2.0"), "3.0");
        assert_eq!(mutate_float("some_ratio", "1.5"), "2.25");
    }

    #[test]
    fn string_alternatives() {
        let mutate_str =
            |name, current| mutate(Domain::String, &ParameterDescriptor::new(name, current));
        assert_eq!(mutate_str("search_path", "public"), "pg_catalog, public");
        assert_eq!(
            mutate_str("search_path", "pg_catalog"),
            "public, pg_catalog"
        );
        assert_eq!(mutate_str("bytea_output", "hex"), "escape");
        assert_eq!(mutate_str("xmloption", "content"), "document");
        assert_eq!(
            mutate_str("default_transaction_isolation", "read committed"),
            "serializable"
        );
        assert_eq!(mutate_str("log_min_messages", "warning"), "notice");
        assert_eq!(mutate_str("log_statement", "none"), "all");
        assert_eq!(mutate_str("application_name", "app"), "app_modified");
        assert_eq!(mutate_str("application_name", ""), "test_value");
    }

    #[test]
    fn locales_pass_through() {
        for name in ["lc_messages", "lc_monetary", "lc_numeric", "lc_time"] {
            assert_eq!(
                mutate(Domain::String, &ParameterDescriptor::new(name, "C")),
                "C"
            );
        }
    }

    #[test]
    fn unknown_strings_pass_through() {
        assert_eq!(
            mutate(
                Domain::String,
                &ParameterDescriptor::new("ssl_ciphers", "HIGH:MEDIUM:+3DES:!aNULL")
            ),
            "HIGH:MEDIUM:+3DES:!aNULL"
        );
    }
}
