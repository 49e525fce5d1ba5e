// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Literal formatting and value normalization.

use crate::classify::Domain;

/// A synthesized test value, ready for interpolation into a `SET` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// The literal text, including quotes if `is_quoted` is set.
    pub test_value: String,
    /// Whether the literal is a single-quoted string.
    pub is_quoted: bool,
}

/// Reports whether `s` is enclosed in a matching pair of single quotes.
pub(crate) fn is_single_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'')
}

/// Formats a raw value as a literal for its domain.
///
/// Boolean and numeric values are bare tokens. String values are wrapped in
/// single quotes unless the chosen value already carries a matching pair, in
/// which case it passes through unchanged. Excluded values are formatted like
/// strings, since their pass-through current value obeys the same rules.
pub fn quote(domain: Domain, body: String) -> MutationResult {
    match domain {
        Domain::Boolean | Domain::Integer | Domain::Float => MutationResult {
            test_value: body,
            is_quoted: false,
        },
        Domain::String | Domain::Excluded => {
            let test_value = if is_single_quoted(&body) {
                body
            } else {
                format!("'{}'", body)
            };
            MutationResult {
                test_value,
                is_quoted: true,
            }
        }
    }
}

/// Canonicalizes a raw value for equality comparison.
///
/// A value queried via `SHOW` is never quoted, while an emitted string
/// literal is, so comparisons go through this canonical form: trim, strip one
/// enclosing pair of single quotes, strip one enclosing pair of double
/// quotes, trim again.
pub fn normalize(raw: &str) -> String {
    let mut value = raw.trim();
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value = &value[1..value.len() - 1];
    }
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = &value[1..value.len() - 1];
    }
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_domains_are_bare() {
        for domain in [Domain::Boolean, Domain::Integer, Domain::Float] {
            let result = quote(domain, "42".into());
            assert_eq!(result.test_value, "42");
            assert!(!result.is_quoted);
        }
    }

    #[test]
    fn strings_are_quoted_once() {
        let result = quote(Domain::String, "pg_catalog, public".into());
        assert_eq!(result.test_value, "'pg_catalog, public'");
        assert!(result.is_quoted);

        let already = quote(Domain::String, "'C'".into());
        assert_eq!(already.test_value, "'C'");
        assert!(already.is_quoted);
    }

    #[test]
    fn empty_string_becomes_empty_literal() {
        assert_eq!(quote(Domain::String, String::new()).test_value, "''");
    }

    #[test]
    fn normalize_strips_quotes_and_space() {
        assert_eq!(normalize("  on "), "on");
        assert_eq!(normalize("'ISO, MDY'"), "ISO, MDY");
        assert_eq!(normalize("\"UTC\""), "UTC");
        assert_eq!(normalize("' padded '"), "padded");
        assert_eq!(normalize("''"), "");
        assert_eq!(normalize("'"), "'");
    }

    #[test]
    fn normalize_is_idempotent_on_show_output() {
        for value in ["on", "4096", "'read committed'", " \"UTC\" ", ""] {
            assert_eq!(normalize(value), normalize(&normalize(value)));
        }
    }

    #[test]
    fn quoting_round_trips_through_normalize() {
        for value in ["public", "ISO, DMY", "", "test_app"] {
            let quoted = quote(Domain::String, value.to_string());
            assert_eq!(normalize(&quoted.test_value), normalize(value));
        }
    }
}
