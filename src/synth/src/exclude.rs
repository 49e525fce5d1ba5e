// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The deny-list of parameters that must not be mutated.

use uncased::UncasedStr;

use crate::literal::is_single_quoted;

/// Parameters whose mutation is unsafe for the session that issues the `SET`.
///
/// Client drivers negotiate `client_encoding` and expect the date/time display
/// formats they configured; `session_authorization` and `role` change the
/// session's identity; `default_tablespace` may name a tablespace that does
/// not exist on the target. Matching is case-insensitive because several of
/// these have nonstandard capitalization for historical reasons.
static EXCLUDED_PARAMETERS: &[&str] = &[
    "client_encoding",
    "DateStyle",
    "TimeZone",
    "IntervalStyle",
    "session_authorization",
    "role",
    "default_tablespace",
];

/// Reports whether `name` is excluded from mutation.
pub fn is_excluded(name: &str) -> bool {
    let name = UncasedStr::new(name);
    EXCLUDED_PARAMETERS
        .iter()
        .any(|excluded| UncasedStr::new(excluded) == name)
}

/// Returns the pass-through literal for an excluded parameter.
///
/// The current value is wrapped in single quotes unless it already carries a
/// matching pair; an empty or missing value becomes the empty literal `''`.
pub fn excluded_value(current_value: &str) -> String {
    if current_value.is_empty() {
        return "''".into();
    }
    if is_single_quoted(current_value) {
        current_value.into()
    } else {
        format!("'{}'", current_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert!(is_excluded("DateStyle"));
        assert!(is_excluded("datestyle"));
        assert!(is_excluded("TIMEZONE"));
        assert!(is_excluded("client_encoding"));
        assert!(is_excluded("Role"));
        assert!(!is_excluded("work_mem"));
        assert!(!is_excluded("log_timezone"));
    }

    #[test]
    fn excluded_value_quotes_once() {
        assert_eq!(excluded_value("UTF8"), "'UTF8'");
        assert_eq!(excluded_value("'UTF8'"), "'UTF8'");
        assert_eq!(excluded_value(""), "''");
        // A lone quote is not a matching pair.
        assert_eq!(excluded_value("'"), "'''");
    }
}
