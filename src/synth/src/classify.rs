// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Syntactic classification of parameter values.

use crate::descriptor::ParameterDescriptor;
use crate::exclude::is_excluded;

/// The value domain chosen for a parameter.
///
/// The domain drives which mutation strategy applies and whether the
/// resulting literal is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// The parameter must not be mutated; its value passes through unchanged.
    Excluded,
    /// An on/off switch.
    Boolean,
    /// A value that parses as a 32-bit integer.
    Integer,
    /// A value that parses as a float but not as an integer.
    Float,
    /// Everything else, including empty values.
    String,
}

/// Classifies a parameter by the shape of its current value.
///
/// Classification is purely syntactic: the declared variable type and the
/// reported bounds only refine behavior inside a domain already chosen by
/// shape, because upstream type metadata may be coarse or missing. The
/// integer parse is attempted before the float parse, so a real-typed
/// parameter whose current value happens to have no decimal point (say `2`)
/// classifies as `Integer` while a sibling reporting `2.0` classifies as
/// `Float`.
pub fn classify(desc: &ParameterDescriptor) -> Domain {
    if is_excluded(&desc.name) {
        return Domain::Excluded;
    }
    let current = desc.current();
    if current.is_empty() {
        return Domain::String;
    }
    if current.eq_ignore_ascii_case("on") || current.eq_ignore_ascii_case("off") {
        return Domain::Boolean;
    }
    if current.parse::<i32>().is_ok() {
        return Domain::Integer;
    }
    if current.parse::<f64>().is_ok() {
        return Domain::Float;
    }
    Domain::String
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_value(name: &str, current: &str) -> Domain {
        classify(&ParameterDescriptor::new(name, current))
    }

    #[test]
    fn exclusion_wins_over_shape() {
        assert_eq!(classify_value("TimeZone", "UTC"), Domain::Excluded);
        assert_eq!(classify_value("client_encoding", "UTF8"), Domain::Excluded);
    }

    #[test]
    fn empty_is_string() {
        assert_eq!(classify_value("application_name", ""), Domain::String);
    }

    #[test]
    fn booleans_are_case_insensitive() {
        assert_eq!(classify_value("enable_seqscan", "on"), Domain::Boolean);
        assert_eq!(classify_value("enable_seqscan", "OFF"), Domain::Boolean);
        assert_eq!(classify_value("enable_seqscan", "On"), Domain::Boolean);
    }

    #[test]
    fn numbers_classify_by_shape() {
        assert_eq!(classify_value("work_mem", "4096"), Domain::Integer);
        assert_eq!(classify_value("temp_file_limit", "-1"), Domain::Integer);
        assert_eq!(classify_value("seq_page_cost", "1.0"), Domain::Float);
        assert_eq!(classify_value("cpu_operator_cost", "0.0025"), Domain::Float);
        // No decimal point, so the integer parse wins even for real-typed
        // parameters.
        assert_eq!(classify_value("seq_page_cost", "2"), Domain::Integer);
        // Out of 32-bit range falls through to the float parse.
        assert_eq!(classify_value("some_big_value", "3000000000"), Domain::Float);
    }

    #[test]
    fn everything_else_is_string() {
        assert_eq!(classify_value("search_path", "public"), Domain::String);
        assert_eq!(classify_value("log_statement", "none"), Domain::String);
    }
}
