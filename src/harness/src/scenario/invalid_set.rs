// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Setting an unknown parameter must surface a database error with a usable
//! message. A pooler that queues session state may report the error on the
//! `SET` itself or defer it to the next statement; both are acceptable, and
//! the checkpoint records which one happened.

use tracing::info;

use crate::scenario::Context;

pub(crate) async fn run(cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    let conn = cx.connect(1).await?;

    info!("issue a SET for a parameter that does not exist");
    let mut stage = None;
    let mut message = String::new();
    if let Err(err) = conn.execute("SET no_such_parameter = 1").await {
        stage = Some("SET");
        message = err.to_string();
    } else {
        // Some poolers apply queued session state lazily; the next statement
        // must surface the error instead.
        info!("SET was accepted; the next statement must fail");
        if let Err(err) = conn.execute("SELECT 2").await {
            stage = Some("next statement");
            message = err.to_string();
        }
    }

    match stage {
        Some(stage) => {
            cx.checks.note("error stage", stage);
            cx.checks.check(
                "invalid SET surfaces a database error",
                "an error with a nonempty message",
                &message,
                !message.is_empty(),
            );
        }
        None => {
            cx.checks.check(
                "invalid SET surfaces a database error",
                "an error from SET or the following statement",
                "no error was reported",
                false,
            );
        }
    }

    conn.close().await;
    Ok(())
}
