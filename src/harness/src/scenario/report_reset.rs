// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `RESET` of a report parameter (`TimeZone`) must restore the recorded
//! default, both on the session's own backends and for sessions that later
//! reuse them.

use tracing::info;

use crate::scenario::Context;

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    info!("session 1: record the default, then set TimeZone = UTC");
    let conn1 = cx.connect(1).await?;
    let default_tz = conn1.show("TimeZone").await?;
    cx.checks.note("default TimeZone", &default_tz);

    conn1.execute("SET TimeZone = UTC").await?;
    let after_set = conn1.show("TimeZone").await?;
    cx.checks
        .check("SET takes effect", "UTC", &after_set, after_set == "UTC");
    let backend1 = conn1.backend_info().await?;
    cx.checks.note("backend serving session 1", &backend1);
    cx.pause().await;

    info!("session 2: the reused backend must show the default again");
    let conn2 = cx.connect(2).await?;
    conn2.execute("BEGIN").await?;
    let backend2 = conn2.backend_info().await?;
    cx.checks.check(
        "backend reused by session 2",
        format!("pid {}", backend1.pid),
        format!("pid {}", backend2.pid),
        backend1.pid == backend2.pid,
    );
    let tz2 = conn2.show("TimeZone").await?;
    cx.checks.check(
        "TimeZone restored for session 2",
        &default_tz,
        &tz2,
        tz2 == default_tz,
    );
    cx.pause().await;

    info!("session 1 again: UTC must follow to the fresh backend");
    conn1.execute("BEGIN").await?;
    let backend1_new = conn1.backend_info().await?;
    cx.checks
        .note("backend serving session 1 now", &backend1_new);
    let tz1 = conn1.show("TimeZone").await?;
    cx.checks
        .check("TimeZone still UTC", "UTC", &tz1, tz1 == "UTC");
    conn1.execute("COMMIT").await?;

    info!("session 1: RESET TimeZone outside a transaction");
    conn1.execute("RESET TimeZone").await?;
    let tz_reset = conn1.show("TimeZone").await?;
    cx.checks.check(
        "RESET restores the default",
        &default_tz,
        &tz_reset,
        tz_reset == default_tz,
    );
    cx.pause().await;

    conn2.execute("COMMIT").await?;
    cx.pause().await;

    info!("session 1 once more: reuse session 2's backend at the default");
    conn1.execute("BEGIN").await?;
    let backend_final = conn1.backend_info().await?;
    let tz_final = conn1.show("TimeZone").await?;
    cx.checks.check(
        "released backend reused at the default",
        format!("pid {} with TimeZone {default_tz}", backend2.pid),
        format!("pid {} with TimeZone {tz_final}", backend_final.pid),
        backend_final.pid == backend2.pid && tz_final == default_tz,
    );
    conn1.execute("COMMIT").await?;

    conn2.close().await;
    conn1.close().await;
    Ok(())
}
