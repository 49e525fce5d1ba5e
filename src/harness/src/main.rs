// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Entry point for the parameter-synchronization harness.

use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use guc_harness::config::{Args, Command};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("guc_harness=info,guc_catalog=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match &args.command {
        Some(Command::List) => {
            guc_harness::list_scenarios();
            Ok(true)
        }
        Some(Command::Params { limit }) => guc_harness::preview_params(&args, *limit)
            .await
            .map(|()| true),
        None => guc_harness::run_scenarios(&args).await,
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{err:#}");
            process::exit(2);
        }
    }
}
