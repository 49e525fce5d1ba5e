// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Discovery of settable configuration parameters.
//!
//! The live path queries `pg_settings` for parameters a regular session may
//! set, pre-filtered to exclude settings whose mutation would break the
//! driving connection, and pairs each parameter with a synthesized test
//! literal. When the catalog view is unavailable (some poolers restrict it),
//! [`builtin_parameters`] supplies a hand-maintained list instead.

use anyhow::Context;
use tokio_postgres::Client;
use tracing::debug;

use guc_synth::{ParameterDescriptor, synthesize};

mod builtin;

pub use crate::builtin::{BUILTIN_PARAMETERS, BuiltinParameter, builtin_parameters};

/// A settable parameter paired with its synthesized test literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GucParameter {
    /// The parameter name.
    pub name: String,
    /// The value reported by the catalog at discovery time.
    pub current_value: String,
    /// A differing, legally assignable literal for `SET <name> = <literal>`.
    pub test_value: String,
}

/// Selects user-settable parameters, excluding:
///
/// * internal (`pg_*`) and extension (dotted) parameters;
/// * settings client drivers negotiate or depend on;
/// * session identity and server-level settings;
/// * settings removed from recent server versions;
/// * timeouts that could kill the very session driving the test.
const SETTABLE_PARAMETERS: &str = "\
SELECT name, setting, unit, min_val, max_val, vartype \
FROM pg_settings \
WHERE context IN ('user', 'superuser') \
AND name NOT LIKE 'pg_%' \
AND name NOT LIKE '%.%' \
AND name NOT IN (\
    'client_encoding', \
    'DateStyle', \
    'TimeZone', \
    'IntervalStyle', \
    'session_authorization', \
    'role', \
    'listen_addresses', \
    'port', \
    'max_connections', \
    'shared_buffers', \
    'wal_level', \
    'max_wal_senders', \
    'max_replication_slots', \
    'default_tablespace', \
    'default_with_oids', \
    'replacement_sort_tuples', \
    'vacuum_cleanup_index_scale_factor', \
    'idle_in_transaction_session_timeout', \
    'idle_session_timeout', \
    'statement_timeout', \
    'lock_timeout'\
) \
ORDER BY name \
LIMIT $1";

/// Fetches up to `limit` settable parameters from the server's catalog, each
/// paired with a synthesized test value.
pub async fn fetch_parameters(
    client: &Client,
    limit: i64,
) -> Result<Vec<GucParameter>, anyhow::Error> {
    let rows = client
        .query(SETTABLE_PARAMETERS, &[&limit])
        .await
        .context("querying pg_settings")?;

    let mut params = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.get("name");
        let desc = ParameterDescriptor {
            name: name.clone(),
            current_value: row.get("setting"),
            unit: row.get("unit"),
            min_val: row.get("min_val"),
            max_val: row.get("max_val"),
            var_type: row
                .get::<_, Option<String>>("vartype")
                .and_then(|t| t.parse().ok()),
        };
        let result = synthesize(&desc);
        debug!(
            "{}: {:?} -> {}",
            name,
            desc.current(),
            result.test_value
        );
        params.push(GucParameter {
            current_value: desc.current().into(),
            test_value: result.test_value,
            name,
        });
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_excludes_session_killing_settings() {
        for name in [
            "'statement_timeout'",
            "'idle_session_timeout'",
            "'session_authorization'",
            "'client_encoding'",
        ] {
            assert!(
                SETTABLE_PARAMETERS.contains(name),
                "{name} missing from the deny-list"
            );
        }
        assert!(SETTABLE_PARAMETERS.contains("context IN ('user', 'superuser')"));
    }
}
