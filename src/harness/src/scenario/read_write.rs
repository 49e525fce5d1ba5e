// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! On a pooler that routes writers and readers separately, session
//! parameters must survive the switch: values set on the writer follow the
//! session to the reader backend, and `RESET ALL` restores the defaults on
//! the way back.

use tracing::info;

use guc_synth::normalize;

use crate::scenario::Context;

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    info!("session 1: expect a writer backend first");
    let conn1 = cx.connect(1).await?;
    let backend1 = conn1.backend_info_with_recovery().await?;
    cx.checks.check(
        "first backend is a writer",
        "pg_is_in_recovery() = false",
        format!("pg_is_in_recovery() = {}", backend1.in_recovery),
        !backend1.in_recovery,
    );

    let default_style = conn1.show("DateStyle").await?;
    let default_digits = conn1.show("extra_float_digits").await?;
    let default_path = conn1.show("search_path").await?;
    cx.checks.note(
        "writer defaults",
        format!(
            "DateStyle={default_style}, extra_float_digits={default_digits}, \
             search_path={default_path}"
        ),
    );

    conn1.execute("SET DateStyle = ISO, DMY").await?;
    conn1.execute("SET extra_float_digits = 2").await?;
    conn1.execute("SET search_path = 'myschema, public'").await?;
    cx.pause().await;

    info!("switch the session to read-only");
    conn1
        .execute("SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY")
        .await?;
    let backend2 = conn1.backend_info_with_recovery().await?;
    cx.checks.note("backend after switch", &backend2);
    cx.checks.check(
        "session switched to a reader",
        format!(
            "pg_is_in_recovery() = true or port = {}",
            cx.run.reader_port
        ),
        format!(
            "pg_is_in_recovery() = {}, port = {:?}",
            backend2.in_recovery, backend2.port
        ),
        backend2.in_recovery || backend2.port == Some(cx.run.reader_port),
    );

    let style = conn1.show("DateStyle").await?;
    let digits = conn1.show("extra_float_digits").await?;
    let path = conn1.show("search_path").await?;
    cx.checks.check(
        "parameters followed the session to the reader",
        "DateStyle=ISO, DMY, extra_float_digits=2, search_path=myschema, public",
        format!("DateStyle={style}, extra_float_digits={digits}, search_path={path}"),
        normalize(&style) == "ISO, DMY"
            && normalize(&digits) == "2"
            && normalize(&path) == "myschema, public",
    );
    cx.pause().await;

    info!("RESET ALL and switch back to read-write");
    conn1.execute("RESET ALL").await?;
    conn1
        .execute("SET SESSION CHARACTERISTICS AS TRANSACTION READ WRITE")
        .await?;

    let style = conn1.show("DateStyle").await?;
    let digits = conn1.show("extra_float_digits").await?;
    let path = conn1.show("search_path").await?;
    cx.checks.check(
        "parameters restored to the defaults",
        format!(
            "DateStyle={default_style}, extra_float_digits={default_digits}, \
             search_path={default_path}"
        ),
        format!("DateStyle={style}, extra_float_digits={digits}, search_path={path}"),
        normalize(&style) == normalize(&default_style)
            && normalize(&digits) == normalize(&default_digits)
            && normalize(&path) == normalize(&default_path),
    );

    conn1.close().await;
    Ok(())
}
