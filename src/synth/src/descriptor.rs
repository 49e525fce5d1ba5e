// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Parameter metadata as reported by the server.

use std::str::FromStr;

/// The metadata of a single configuration parameter, in the shape reported by
/// the `pg_settings` catalog view.
///
/// Descriptors are constructed fresh per call from external metadata and have
/// no persistent identity. Missing catalog columns are represented as `None`;
/// the engine treats a missing current value like an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// The parameter name, e.g. `work_mem`.
    pub name: String,
    /// The current value, as reported by `pg_settings.setting`.
    pub current_value: Option<String>,
    /// The implicit unit of the value, e.g. `kB` or `ms`, if any.
    pub unit: Option<String>,
    /// The minimum allowed value, for numeric parameters.
    pub min_val: Option<String>,
    /// The maximum allowed value, for numeric parameters.
    pub max_val: Option<String>,
    /// The variable type declared by the server.
    ///
    /// Kept for completeness of the metadata record. Synthesis classifies by
    /// the shape of the current value instead, because upstream type metadata
    /// may be coarse or missing.
    pub var_type: Option<VarType>,
}

impl ParameterDescriptor {
    /// Creates a descriptor carrying only a name and a current value.
    pub fn new<N, V>(name: N, current_value: V) -> ParameterDescriptor
    where
        N: Into<String>,
        V: Into<String>,
    {
        ParameterDescriptor {
            name: name.into(),
            current_value: Some(current_value.into()),
            unit: None,
            min_val: None,
            max_val: None,
            var_type: None,
        }
    }

    /// Returns the current value, treating a missing value as empty.
    pub fn current(&self) -> &str {
        self.current_value.as_deref().unwrap_or("")
    }
}

/// The variable type the server declares for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// An on/off switch.
    Bool,
    /// A (possibly unit-bearing) integer.
    Integer,
    /// A floating-point number.
    Real,
    /// Free-form text.
    String,
    /// One of a closed set of alternatives.
    Enum,
}

impl FromStr for VarType {
    type Err = ();

    fn from_str(s: &str) -> Result<VarType, ()> {
        match s.to_ascii_lowercase().as_str() {
            "bool" => Ok(VarType::Bool),
            "integer" => Ok(VarType::Integer),
            "real" => Ok(VarType::Real),
            "string" => Ok(VarType::String),
            "enum" => Ok(VarType::Enum),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_type_parses_catalog_names() {
        assert_eq!("bool".parse(), Ok(VarType::Bool));
        assert_eq!("Integer".parse(), Ok(VarType::Integer));
        assert_eq!("real".parse(), Ok(VarType::Real));
        assert_eq!("string".parse(), Ok(VarType::String));
        assert_eq!("enum".parse(), Ok(VarType::Enum));
        assert_eq!("interval".parse::<VarType>(), Err(()));
    }

    #[test]
    fn missing_value_reads_as_empty() {
        let desc = ParameterDescriptor {
            current_value: None,
            ..ParameterDescriptor::new("application_name", "")
        };
        assert_eq!(desc.current(), "");
    }
}
