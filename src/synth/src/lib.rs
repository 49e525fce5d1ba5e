// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Test-value synthesis for PostgreSQL configuration parameters.
//!
//! Given the metadata of an arbitrary configuration parameter (name, current
//! value, optional unit and bounds, declared type), this crate deterministically
//! produces a second value that differs from the current one, stays within the
//! parameter's validity domain, and is formatted so that it can be interpolated
//! directly into a `SET <name> = <literal>` statement.
//!
//! The pipeline is classify → mutate → quote:
//!
//! * [`classify`] sniffs the shape of the current value into a [`Domain`].
//!   Parameters whose mutation would break the driving session (encodings,
//!   date formats, session identity) classify as [`Domain::Excluded`] and pass
//!   through unchanged.
//! * [`mutate`] picks a differing, in-range raw value for the domain,
//!   consulting the server-reported bounds and a set of per-name rules for
//!   parameters with known narrow domains.
//! * [`quote`] formats the raw value as a bare token or single-quoted literal.
//!
//! [`synthesize`] runs the whole pipeline. The engine is pure and infallible:
//! every parse is guarded, every branch has a terminal fallback, and a value
//! the engine cannot safely mutate degrades to "unchanged but quoted".
//!
//! [`normalize`] is the comparison-side dual: it canonicalizes a value read
//! back from `SHOW` (never quoted) and an emitted literal (possibly quoted)
//! into a common form.

mod classify;
mod descriptor;
mod exclude;
mod literal;
mod mutate;

pub use crate::classify::{Domain, classify};
pub use crate::descriptor::{ParameterDescriptor, VarType};
pub use crate::exclude::{excluded_value, is_excluded};
pub use crate::literal::{MutationResult, normalize, quote};
pub use crate::mutate::mutate;

/// Synthesizes a test literal for the described parameter.
///
/// The result differs from the current value unless the parameter is
/// excluded from mutation, in which case the current value is passed through
/// (quoted) so that a downstream `SET` is a no-op.
pub fn synthesize(desc: &ParameterDescriptor) -> MutationResult {
    match classify(desc) {
        Domain::Excluded => MutationResult {
            test_value: excluded_value(desc.current()),
            is_quoted: true,
        },
        domain => quote(domain, mutate(domain, desc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str, current: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(name, current)
    }

    #[test]
    fn boolean_toggles() {
        assert_eq!(synthesize(&desc("enable_seqscan", "on")).test_value, "off");
        assert_eq!(synthesize(&desc("enable_seqscan", "off")).test_value, "on");
        assert!(!synthesize(&desc("enable_seqscan", "on")).is_quoted);
    }

    #[test]
    fn small_integer_steps_down() {
        let result = synthesize(&ParameterDescriptor {
            var_type: Some(VarType::Integer),
            ..desc("geqo_effort", "5")
        });
        assert_eq!(result.test_value, "3");
        assert!(!result.is_quoted);
    }

    #[test]
    fn cost_float_nudges_up() {
        let result = synthesize(&ParameterDescriptor {
            min_val: Some("0".into()),
            var_type: Some(VarType::Real),
            ..desc("random_page_cost", "4.0")
        });
        assert_eq!(result.test_value, "5.0");
        assert!(!result.is_quoted);
    }

    #[test]
    fn known_string_gets_alternative() {
        let result = synthesize(&desc("search_path", "public"));
        assert_eq!(result.test_value, "'pg_catalog, public'");
        assert!(result.is_quoted);
    }

    #[test]
    fn excluded_passes_through_quoted() {
        let result = synthesize(&desc("client_encoding", "UTF8"));
        assert_eq!(result.test_value, "'UTF8'");
        assert!(result.is_quoted);
        assert_eq!(normalize(&result.test_value), "UTF8");
    }

    #[test]
    fn disabled_sentinel_enables() {
        let result = synthesize(&ParameterDescriptor {
            var_type: Some(VarType::Integer),
            ..desc("temp_file_limit", "-1")
        });
        assert_eq!(result.test_value, "1048576");
    }

    #[test]
    fn synthesized_value_always_differs_unless_excluded() {
        for (name, current) in [
            ("enable_seqscan", "on"),
            ("work_mem", "4096"),
            ("seq_page_cost", "1.0"),
            ("bytea_output", "hex"),
            ("application_name", ""),
        ] {
            let d = desc(name, current);
            let result = synthesize(&d);
            assert_ne!(
                normalize(&result.test_value),
                normalize(current),
                "{name} did not change"
            );
        }
    }
}
