// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A report parameter (`DateStyle`) set outside a transaction must follow
//! the session: reset for other sessions that reuse the backend, re-applied
//! when the session lands on a fresh backend, and left untouched for the
//! session that held the backend in between.

use tracing::info;

use crate::scenario::Context;

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    info!("session 1: set DateStyle outside a transaction");
    let conn1 = cx.connect(1).await?;
    let initial = conn1.show("DateStyle").await?;
    cx.checks.check(
        "startup pins the date format",
        "ISO, MDY",
        &initial,
        initial.contains("ISO") && initial.contains("MDY"),
    );
    conn1.execute("SET DateStyle = ISO, DMY").await?;
    let backend1 = conn1.backend_info().await?;
    cx.checks.note("backend serving session 1", &backend1);
    cx.checks
        .note("DateStyle after SET", conn1.show("DateStyle").await?);
    cx.pause().await;

    info!("session 2: expect the reused backend to show the default");
    let conn2 = cx.connect(2).await?;
    conn2.execute("BEGIN").await?;
    let backend2 = conn2.backend_info().await?;
    cx.checks.check(
        "backend reused by session 2",
        format!("pid {}", backend1.pid),
        format!("pid {}", backend2.pid),
        backend1.pid == backend2.pid,
    );
    let style2 = conn2.show("DateStyle").await?;
    cx.checks.check(
        "DateStyle reset on the reused backend",
        &initial,
        &style2,
        style2 == initial,
    );
    cx.pause().await;

    info!("session 1 again: expect the new backend to carry ISO, DMY");
    conn1.execute("BEGIN").await?;
    let backend1_new = conn1.backend_info().await?;
    cx.checks.check(
        "fresh backend assigned to session 1",
        format!("pid other than {}", backend1.pid),
        format!("pid {}", backend1_new.pid),
        backend1_new.pid != backend1.pid,
    );
    let style1 = conn1.show("DateStyle").await?;
    cx.checks.check(
        "DateStyle synchronized to the fresh backend",
        "ISO, DMY",
        &style1,
        style1.contains("ISO") && style1.contains("DMY"),
    );
    conn1.execute("COMMIT").await?;

    info!("session 2 finishes: its own view must be unchanged");
    let style2_final = conn2.show("DateStyle").await?;
    cx.checks.check(
        "session 2 still sees the default",
        "ISO, MDY",
        &style2_final,
        style2_final.contains("ISO") && style2_final.contains("MDY"),
    );
    conn2.execute("COMMIT").await?;

    conn2.close().await;
    conn1.close().await;
    Ok(())
}
