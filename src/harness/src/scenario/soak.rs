// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Leak check: two sessions hammer SET/RESET in a loop. The harness can only
//! observe errors and timing; memory is watched externally, so the sessions
//! can optionally be held open afterwards.

use std::time::Instant;

use tracing::{info, warn};

use crate::scenario::{Checks, Context};
use crate::session::Session;

const LOOP_A: &[&str] = &[
    "SET DateStyle = ISO, DMY",
    "SET extra_float_digits = 3",
    "RESET DateStyle",
    "RESET ALL",
];

// The second session omits the single-parameter RESET so the pooler sees a
// different SET/RESET mix on the same pool.
const LOOP_B: &[&str] = &[
    "SET DateStyle = ISO, DMY",
    "SET extra_float_digits = 3",
    "RESET ALL",
];

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    let iterations = cx.run.soak_iterations;

    let conn1 = cx.connect(1).await?;
    soak_one(&mut cx.checks, &conn1, LOOP_A, iterations).await?;

    let conn2 = cx.connect(2).await?;
    soak_one(&mut cx.checks, &conn2, LOOP_B, iterations).await?;

    if !cx.run.soak_hold.is_zero() {
        info!(
            "holding both connections open for {} for external memory observation",
            humantime::format_duration(cx.run.soak_hold)
        );
        tokio::time::sleep(cx.run.soak_hold).await;
    }

    conn2.close().await;
    conn1.close().await;
    Ok(())
}

async fn soak_one(
    checks: &mut Checks,
    conn: &Session,
    statements: &[&str],
    iterations: u32,
) -> Result<(), anyhow::Error> {
    let backend = conn.backend_info().await?;
    checks.note(
        &format!("backend serving session {}", conn.id()),
        &backend,
    );

    let start = Instant::now();
    let mut errors = 0u32;
    for i in 1..=iterations {
        for sql in statements {
            if let Err(err) = conn.execute(sql).await {
                errors += 1;
                warn!("iteration {i}: {sql}: {err}");
            }
        }
        if i % 100 == 0 {
            info!("session {}: {i}/{iterations} iterations", conn.id());
        }
        if errors > 10 {
            warn!("too many errors; stopping the loop early");
            break;
        }
    }
    let elapsed = start.elapsed();
    checks.note(
        &format!("session {} timing", conn.id()),
        format!(
            "{iterations} iterations in {elapsed:.2?} ({:.2?} per iteration)",
            elapsed / iterations.max(1)
        ),
    );
    checks.check(
        &format!("session {} soak loop free of errors", conn.id()),
        "0 errors",
        format!("{errors} errors"),
        errors == 0,
    );

    // Backend churn during the loop is worth knowing about but is the
    // pooler's prerogative.
    let backend_final = conn.backend_info().await?;
    if backend_final.pid != backend.pid {
        checks.note(
            &format!("session {} backend changed during the loop", conn.id()),
            format!("pid {} -> {}", backend.pid, backend_final.pid),
        );
    }
    Ok(())
}
