// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A hand-maintained list of settable parameters.
//!
//! Used when the live catalog is unreachable, e.g. when the pooler under
//! test restricts access to `pg_settings`. Defaults reflect a stock server
//! configuration and may drift from the target; the live path is preferred.
//!
//! Session-killing timeouts (`statement_timeout`, `lock_timeout`, the idle
//! timeouts) and driver-negotiated settings (`client_encoding`, `DateStyle`,
//! `TimeZone`, `IntervalStyle`) are deliberately absent, as are settings
//! removed from recent server versions.

use crate::GucParameter;

/// A parameter with a known default and a legal, differing test value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinParameter {
    /// The parameter name.
    pub name: &'static str,
    /// The stock default, as a `SET` literal.
    pub default_value: &'static str,
    /// The test literal. Equal to the default for locale settings, which are
    /// kept unchanged to avoid naming a locale absent on the host.
    pub test_value: &'static str,
}

pub static BUILTIN_PARAMETERS: &[BuiltinParameter] = &[
    // Memory and resource settings.
    p("extra_float_digits", "1", "3"),
    p("work_mem", "4096", "8192"),
    p("maintenance_work_mem", "65536", "131072"),
    p("temp_file_limit", "-1", "1048576"),
    p("vacuum_cost_delay", "0", "10"),
    p("vacuum_cost_limit", "200", "400"),
    p("vacuum_cost_page_hit", "1", "2"),
    // Locale settings: kept at the C locale on both sides.
    p("lc_messages", "'C'", "'C'"),
    p("lc_monetary", "'C'", "'C'"),
    p("lc_numeric", "'C'", "'C'"),
    p("lc_time", "'C'", "'C'"),
    p(
        "default_text_search_config",
        "'pg_catalog.simple'",
        "'pg_catalog.english'",
    ),
    p("search_path", "'public'", "'pg_catalog, public'"),
    // Boolean switches.
    p("standard_conforming_strings", "on", "off"),
    p("escape_string_warning", "on", "off"),
    p("synchronize_seqscans", "on", "off"),
    p("enable_seqscan", "on", "off"),
    p("enable_indexscan", "on", "off"),
    p("enable_bitmapscan", "on", "off"),
    p("enable_tidscan", "on", "off"),
    p("enable_sort", "on", "off"),
    p("enable_hashjoin", "on", "off"),
    p("enable_mergejoin", "on", "off"),
    p("enable_nestloop", "on", "off"),
    p("enable_material", "on", "off"),
    p("enable_hashagg", "on", "off"),
    p("enable_parallel_append", "on", "off"),
    p("enable_parallel_hash", "on", "off"),
    p("enable_partition_pruning", "on", "off"),
    p("enable_partitionwise_join", "off", "on"),
    p("enable_partitionwise_aggregate", "off", "on"),
    p("enable_gathermerge", "on", "off"),
    p("constraint_exclusion", "'partition'", "'on'"),
    // Planner cost settings.
    p("seq_page_cost", "1.0", "2.0"),
    p("random_page_cost", "4.0", "2.0"),
    p("cpu_tuple_cost", "0.01", "0.02"),
    p("cpu_index_tuple_cost", "0.005", "0.01"),
    p("cpu_operator_cost", "0.0025", "0.005"),
    p("parallel_tuple_cost", "0.1", "0.2"),
    p("parallel_setup_cost", "1000.0", "2000.0"),
    p("min_parallel_table_scan_size", "8388608", "4194304"),
    p("min_parallel_index_scan_size", "524288", "262144"),
    p("effective_cache_size", "524288", "1048576"),
    // Planner shape settings.
    p("default_statistics_target", "100", "200"),
    p("from_collapse_limit", "8", "16"),
    p("join_collapse_limit", "8", "16"),
    p("cursor_tuple_fraction", "0.1", "0.5"),
    p("geqo_threshold", "12", "10"),
    p("geqo_effort", "5", "3"),
    p("geqo_pool_size", "0", "100"),
    p("geqo_generations", "0", "100"),
    // Valid range 1.5..2.0.
    p("geqo_selection_bias", "2.0", "1.5"),
    // Valid range 0.0..1.0.
    p("geqo_seed", "0.0", "0.5"),
    // Logging settings.
    p("log_min_messages", "'warning'", "'notice'"),
    p("log_min_error_statement", "'error'", "'warning'"),
    p("log_min_duration_statement", "-1", "1000"),
    p("log_statement", "'none'", "'all'"),
    p("log_duration", "off", "on"),
    p("log_error_verbosity", "'default'", "'verbose'"),
    p("log_lock_waits", "off", "on"),
    p("log_temp_files", "-1", "0"),
    p("log_timezone", "'UTC'", "'PRC'"),
    p("application_name", "''", "'test_app'"),
    // Client connection settings.
    p("deadlock_timeout", "1000", "2000"),
    p("max_locks_per_transaction", "64", "128"),
    p("max_pred_locks_per_transaction", "64", "128"),
    p("array_nulls", "on", "off"),
    p("backslash_quote", "'safe_encoding'", "'on'"),
    p(
        "default_transaction_isolation",
        "'read committed'",
        "'serializable'",
    ),
    p("default_transaction_read_only", "off", "on"),
    p("default_transaction_deferrable", "off", "on"),
    p("session_replication_role", "'origin'", "'replica'"),
    // Output format settings.
    p("bytea_output", "'hex'", "'escape'"),
    p("xmlbinary", "'base64'", "'hex'"),
    p("xmloption", "'content'", "'document'"),
    // Miscellaneous settings.
    p("gin_fuzzy_search_limit", "0", "1000"),
    p("gin_pending_list_limit", "4096", "8192"),
    p("vacuum_freeze_min_age", "50000000", "100000000"),
    p("vacuum_freeze_table_age", "150000000", "200000000"),
    p("vacuum_multixact_freeze_min_age", "5000000", "10000000"),
    p(
        "vacuum_multixact_freeze_table_age",
        "150000000",
        "200000000",
    ),
    p("transform_null_equals", "off", "on"),
    p("quote_all_identifiers", "off", "on"),
    p("row_security", "on", "off"),
    p("check_function_bodies", "on", "off"),
    p("lo_compat_privileges", "off", "on"),
    p("operator_precedence_warning", "off", "on"),
    p("trace_notify", "off", "on"),
    p("trace_recovery_messages", "'log'", "'notice'"),
    p("trace_sort", "off", "on"),
];

const fn p(
    name: &'static str,
    default_value: &'static str,
    test_value: &'static str,
) -> BuiltinParameter {
    BuiltinParameter {
        name,
        default_value,
        test_value,
    }
}

/// Returns the builtin list in the shape the harness consumes.
pub fn builtin_parameters() -> Vec<GucParameter> {
    BUILTIN_PARAMETERS
        .iter()
        .map(|b| GucParameter {
            name: b.name.into(),
            current_value: b.default_value.into(),
            test_value: b.test_value.into(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use guc_synth::normalize;

    use super::*;

    #[test]
    fn names_are_unique_and_nonempty() {
        let mut seen = BTreeSet::new();
        for b in BUILTIN_PARAMETERS {
            assert!(!b.name.is_empty());
            assert!(seen.insert(b.name), "duplicate builtin {}", b.name);
        }
    }

    #[test]
    fn test_values_differ_except_for_locales() {
        for b in BUILTIN_PARAMETERS {
            if b.name.starts_with("lc_") {
                assert_eq!(b.default_value, b.test_value);
            } else {
                assert_ne!(
                    normalize(b.default_value),
                    normalize(b.test_value),
                    "{} has no distinct test value",
                    b.name
                );
            }
        }
    }

    #[test]
    fn no_session_killing_timeouts() {
        for banned in [
            "statement_timeout",
            "lock_timeout",
            "idle_in_transaction_session_timeout",
            "idle_session_timeout",
        ] {
            assert!(BUILTIN_PARAMETERS.iter().all(|b| b.name != banned));
        }
    }
}
