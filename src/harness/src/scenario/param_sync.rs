// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A non-report session parameter set in a committed transaction must be
//! reset before the backend serves another session, and re-applied when the
//! original session lands on a fresh backend.

use tracing::info;

use crate::scenario::Context;

const PARAMETER: &str = "extra_float_digits";

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    info!("session 1: set {PARAMETER} inside a committed transaction");
    let conn1 = cx.connect(1).await?;
    conn1.execute("BEGIN").await?;
    let initial = conn1.show(PARAMETER).await?;
    cx.checks.note("initial value", &initial);
    conn1.execute(&format!("SET {PARAMETER} = 3")).await?;
    let backend1 = conn1.backend_info().await?;
    cx.checks.note("backend serving session 1", &backend1);
    conn1.execute("COMMIT").await?;

    // Outside a transaction the backend goes back to the pool.
    cx.settle().await;

    info!("session 2: expect the same backend with the parameter reset");
    let conn2 = cx.connect(2).await?;
    conn2.execute("BEGIN").await?;
    let backend2 = conn2.backend_info().await?;
    cx.checks.check(
        "backend reused by session 2",
        format!("pid {}", backend1.pid),
        format!("pid {}", backend2.pid),
        backend1.pid == backend2.pid,
    );
    let value2 = conn2.show(PARAMETER).await?;
    cx.checks.check(
        "parameter reset on the reused backend",
        &initial,
        &value2,
        initial == value2,
    );
    // Session 2 keeps its transaction open so the backend stays occupied.
    cx.pause().await;

    info!("session 1 again: expect a fresh backend with the parameter re-applied");
    conn1.execute("BEGIN").await?;
    let backend1_new = conn1.backend_info().await?;
    cx.checks.check(
        "fresh backend assigned to session 1",
        format!("pid other than {}", backend1.pid),
        format!("pid {}", backend1_new.pid),
        backend1_new.pid != backend1.pid,
    );
    let value1 = conn1.show(PARAMETER).await?;
    cx.checks.check(
        "parameter re-applied on the fresh backend",
        "3",
        &value1,
        value1 == "3",
    );
    conn1.execute("COMMIT").await?;

    conn2.close().await;
    conn1.close().await;
    Ok(())
}
