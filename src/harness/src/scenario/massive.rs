// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Bulk synchronization: set every discoverable parameter to a synthesized
//! value, then verify reset-on-reuse and re-sync-on-replacement for a
//! representative sample. Values are compared through [`normalize`], since a
//! queried value is never quoted while an emitted literal may be.

use tracing::{info, warn};

use guc_catalog::{GucParameter, builtin_parameters, fetch_parameters};
use guc_synth::normalize;

use crate::scenario::Context;
use crate::session::Session;

/// Parameters checked individually after the bulk SET. Checking all of them
/// would mean hundreds of `SHOW` round trips through the pooler.
const SAMPLE: &[&str] = &[
    "extra_float_digits",
    "work_mem",
    "statement_timeout",
    "enable_seqscan",
    "application_name",
];

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    let conn1 = cx.connect(1).await?;

    let params = match fetch_parameters(conn1.client(), cx.run.param_limit).await {
        Ok(params) if !params.is_empty() => params,
        Ok(_) => {
            warn!("catalog returned no parameters; using the builtin list");
            builtin_parameters()
        }
        Err(err) => {
            warn!("catalog unavailable ({err:#}); using the builtin list");
            builtin_parameters()
        }
    };
    cx.checks.note("parameters to set", params.len());

    let sample: Vec<&GucParameter> = SAMPLE
        .iter()
        .filter_map(|name| params.iter().find(|p| &p.name == name))
        .collect();
    for p in &sample {
        cx.checks
            .note(&format!("sample default {}", p.name), &p.current_value);
    }

    info!("session 1: bulk SET of {} parameters", params.len());
    let mut set_ok = 0;
    let mut set_failed = 0;
    for p in &params {
        let sql = format!("SET {} = {}", p.name, p.test_value);
        match conn1.execute(&sql).await {
            Ok(()) => set_ok += 1,
            Err(err) => {
                set_failed += 1;
                warn!("cannot set {} = {}: {err}", p.name, p.test_value);
            }
        }
    }
    // Individual rejections are reported but do not fail the scenario; the
    // interesting behavior is what happens to the accepted ones.
    cx.checks
        .note("bulk SET", format!("{set_ok} ok, {set_failed} rejected"));
    let backend1 = conn1.backend_info().await?;
    cx.checks.note("backend serving session 1", &backend1);
    cx.pause().await;

    info!("session 2: sampled parameters must be back at their defaults");
    let conn2 = cx.connect(2).await?;
    conn2.execute("BEGIN").await?;
    let backend2 = conn2.backend_info().await?;
    cx.checks.check(
        "backend reused by session 2",
        format!("pid {}", backend1.pid),
        format!("pid {}", backend2.pid),
        backend1.pid == backend2.pid,
    );
    let mismatches = compare_sample(&conn2, &sample, |p| &p.current_value).await?;
    cx.checks.check(
        "sampled parameters reset on the reused backend",
        "0 mismatches",
        render_mismatches(&mismatches),
        mismatches.is_empty(),
    );
    cx.pause().await;

    info!("session 1 again: sampled parameters must follow to the fresh backend");
    conn1.execute("BEGIN").await?;
    let backend1_new = conn1.backend_info().await?;
    cx.checks.check(
        "fresh backend assigned to session 1",
        format!("pid other than {}", backend1.pid),
        format!("pid {}", backend1_new.pid),
        backend1_new.pid != backend1.pid,
    );
    let mismatches = compare_sample(&conn1, &sample, |p| &p.test_value).await?;
    cx.checks.check(
        "sampled parameters synchronized to the fresh backend",
        "0 mismatches",
        render_mismatches(&mismatches),
        mismatches.is_empty(),
    );
    conn1.execute("COMMIT").await?;

    conn2.execute("COMMIT").await?;
    conn2.close().await;
    conn1.close().await;
    Ok(())
}

/// Compares each sampled parameter's live value against `expected`,
/// returning the mismatches as `name: actual != expected` lines.
async fn compare_sample(
    conn: &Session,
    sample: &[&GucParameter],
    expected: impl Fn(&GucParameter) -> &str,
) -> Result<Vec<String>, anyhow::Error> {
    let mut mismatches = Vec::new();
    for p in sample {
        let actual = conn.show(&p.name).await?;
        let want = expected(p);
        if normalize(&actual) != normalize(want) {
            mismatches.push(format!("{}: {} != {}", p.name, actual, want));
        }
    }
    Ok(mismatches)
}

fn render_mismatches(mismatches: &[String]) -> String {
    if mismatches.is_empty() {
        "0 mismatches".into()
    } else {
        mismatches.join("; ")
    }
}
