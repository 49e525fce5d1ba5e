// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Diagnostic harness for session-parameter synchronization across a
//! PostgreSQL connection pooler.
//!
//! A pooler maps many client sessions onto a smaller, reused set of server
//! backends. Every scenario here drives a few client sessions through
//! SET/SHOW/RESET statements, uses `pg_backend_pid()` to detect when the
//! pooler reuses or replaces a backend, and asserts that per-session
//! configuration parameters are reset and re-applied at the right moments.
//! Scenarios run over both the simple and the extended query protocol, since
//! poolers track session state separately for the two paths.

use anyhow::bail;
use owo_colors::OwoColorize;
use tracing::warn;

use guc_catalog::{builtin_parameters, fetch_parameters};

use crate::config::Args;
use crate::report::TestResult;
use crate::scenario::{Checks, Context, SCENARIOS, Scenario};
use crate::session::{Protocol, Session};

pub mod config;
mod report;
mod scenario;
pub mod session;

/// Runs the selected scenarios over the selected protocols and prints the
/// summary table. Returns whether everything passed.
pub async fn run_scenarios(args: &Args) -> Result<bool, anyhow::Error> {
    let run = &args.run;
    let selected: Vec<&Scenario> = if run.scenarios.is_empty() {
        SCENARIOS.iter().collect()
    } else {
        let mut selected = Vec::new();
        for name in &run.scenarios {
            match scenario::find(name) {
                Some(s) => selected.push(s),
                None => bail!(
                    "unknown scenario {name}; available: {}",
                    SCENARIOS
                        .iter()
                        .map(|s| s.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }
        selected
    };

    let mut results = Vec::new();
    'scenarios: for scenario in selected {
        for &protocol in args.protocol.protocols() {
            if scenario.simple_only && protocol == Protocol::Extended {
                continue;
            }
            println!(
                "\n{} {} {}",
                "scenario".bold(),
                scenario.name.bold(),
                format!("({protocol} protocol)").dimmed()
            );
            let mut cx = Context {
                url: &args.url,
                run,
                protocol,
                checks: Checks::new(),
            };
            let result = match scenario::run(scenario.name, &mut cx).await {
                Ok(()) => TestResult {
                    scenario: scenario.name.into(),
                    case: format!("{} ({protocol} protocol)", scenario.description),
                    expected: "all checks pass".into(),
                    actual: cx.checks.summary(),
                    passed: cx.checks.passed(),
                },
                Err(err) => {
                    warn!("scenario {} did not finish: {err:#}", scenario.name);
                    TestResult {
                        scenario: scenario.name.into(),
                        case: format!("{} ({protocol} protocol)", scenario.description),
                        expected: "all checks pass".into(),
                        actual: format!("error: {err:#}"),
                        passed: false,
                    }
                }
            };
            let passed = result.passed;
            results.push(result);
            if !passed && run.fail_fast {
                warn!("stopping after the first failure (--fail-fast)");
                break 'scenarios;
            }
        }
    }

    report::print_summary(&results);
    Ok(results.iter().all(|r| r.passed))
}

/// Prints the parameters and synthesized test values that the bulk scenario
/// would use, without mutating any session state.
pub async fn preview_params(args: &Args, limit: i64) -> Result<(), anyhow::Error> {
    let session = Session::connect(&args.url, Protocol::Extended, 1).await?;
    let params = match fetch_parameters(session.client(), limit).await {
        Ok(params) if !params.is_empty() => params,
        Ok(_) => {
            warn!("catalog returned no parameters; showing the builtin list");
            builtin_parameters()
        }
        Err(err) => {
            warn!("catalog unavailable ({err:#}); showing the builtin list");
            builtin_parameters()
        }
    };

    // No styling inside the width-formatted fields: escape codes would throw
    // off the column alignment.
    println!("{:<36} {:<24} {:<24}", "name", "current", "test value");
    println!("{}", "-".repeat(86));
    for p in &params {
        println!(
            "{:<36} {:<24} {:<24}",
            p.name,
            truncate(&p.current_value, 24),
            truncate(&p.test_value, 24)
        );
    }
    println!("{}", "-".repeat(86));
    println!("total: {} parameters", params.len());

    session.close().await;
    Ok(())
}

/// Prints the scenario registry.
pub fn list_scenarios() {
    for s in SCENARIOS {
        let proto = if s.simple_only {
            " (simple protocol only)"
        } else {
            ""
        };
        println!("{:<20} {}{}", s.name, s.description, proto);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
