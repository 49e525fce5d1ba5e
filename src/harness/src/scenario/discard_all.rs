// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `DISCARD ALL` after a batch of out-of-transaction `SET`s must leave both
//! a reusing session and a replacement backend at the defaults. Runs over
//! the simple protocol only, since `DISCARD ALL` drops prepared statements.

use tracing::info;

use crate::scenario::{Context, render_values, show_all};

const PARAMETERS: &[(&str, &str)] = &[
    ("standard_conforming_strings", "off"),
    ("IntervalStyle", "sql_standard"),
    ("DateStyle", "ISO, DMY"),
    ("extra_float_digits", "3"),
];

const NAMES: &[&str] = &[
    "standard_conforming_strings",
    "IntervalStyle",
    "DateStyle",
    "extra_float_digits",
];

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    info!("session 1: set {} parameters, then DISCARD ALL", NAMES.len());
    let conn1 = cx.connect(1).await?;
    let defaults = show_all(&conn1, NAMES).await?;
    cx.checks.note("defaults", render_values(&defaults));

    for (name, value) in PARAMETERS {
        conn1.execute(&format!("SET {name} = {value}")).await?;
    }
    let backend1 = conn1.backend_info().await?;
    cx.checks.note("backend serving session 1", &backend1);
    cx.checks
        .note("after SET", render_values(&show_all(&conn1, NAMES).await?));

    conn1.execute("DISCARD ALL").await?;
    conn1.close().await;
    cx.settle().await;

    info!("session 2: the reused backend must be at the defaults");
    let conn2 = cx.connect(2).await?;
    conn2.execute("BEGIN").await?;
    let backend2 = conn2.backend_info().await?;
    cx.checks.check(
        "backend reused by session 2",
        format!("pid {}", backend1.pid),
        format!("pid {}", backend2.pid),
        backend1.pid == backend2.pid,
    );
    let values2 = show_all(&conn2, NAMES).await?;
    cx.checks.check(
        "all parameters at the defaults for session 2",
        render_values(&defaults),
        render_values(&values2),
        values2 == defaults,
    );
    cx.pause().await;

    info!("session 1 reconnects: a fresh backend must also be at the defaults");
    let conn1 = cx.connect(1).await?;
    let backend1_new = conn1.backend_info().await?;
    cx.checks.check(
        "fresh backend assigned",
        format!("pid other than {}", backend1.pid),
        format!("pid {}", backend1_new.pid),
        backend1_new.pid != backend1.pid,
    );
    let values1 = show_all(&conn1, NAMES).await?;
    cx.checks.check(
        "all parameters at the defaults after DISCARD ALL",
        render_values(&defaults),
        render_values(&values1),
        values1 == defaults,
    );

    conn2.execute("COMMIT").await?;
    conn2.close().await;
    conn1.close().await;
    Ok(())
}
