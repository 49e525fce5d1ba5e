// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The scenario registry and the per-run checkpoint recorder.
//!
//! Every scenario drives one or more client sessions through the pooler and
//! records numbered checkpoints. A failing checkpoint marks the scenario
//! failed but does not abort it; an `Err` from a scenario indicates the
//! infrastructure broke (connection refused, protocol error), not that the
//! pooler misbehaved.

use std::fmt;

use anyhow::bail;
use owo_colors::OwoColorize;

use crate::config::RunArgs;
use crate::session::{Protocol, Session, SessionError};

mod discard_all;
mod invalid_set;
mod massive;
mod param_sync;
mod read_write;
mod report_reset;
mod report_sync;
mod reset_all;
mod soak;
mod txn_set;

/// A runnable scenario.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    /// Scenarios involving `DISCARD ALL` drop prepared statements and can
    /// only run over the simple protocol.
    pub simple_only: bool,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "param-sync",
        description: "session parameter is reset on backend reuse and re-applied on a fresh backend",
        simple_only: false,
    },
    Scenario {
        name: "report-param-sync",
        description: "report parameter (DateStyle) follows the session across backends",
        simple_only: false,
    },
    Scenario {
        name: "report-param-reset",
        description: "RESET restores the recorded default across backends",
        simple_only: false,
    },
    Scenario {
        name: "reset-all",
        description: "RESET ALL clears every pending parameter for reuse and fresh backends",
        simple_only: false,
    },
    Scenario {
        name: "discard-all",
        description: "DISCARD ALL clears every pending parameter (simple protocol only)",
        simple_only: true,
    },
    Scenario {
        name: "set-in-transaction",
        description: "SET inside a transaction is not synchronized to other backends",
        simple_only: false,
    },
    Scenario {
        name: "massive-sync",
        description: "catalog-driven bulk SET across backend reuse and replacement",
        simple_only: false,
    },
    Scenario {
        name: "read-write-switch",
        description: "parameters survive the pooler switching between writer and reader",
        simple_only: false,
    },
    Scenario {
        name: "invalid-set",
        description: "an invalid SET surfaces a database error",
        simple_only: false,
    },
    Scenario {
        name: "soak",
        description: "repeated SET/RESET loop as a leak check",
        simple_only: false,
    },
];

/// Looks up a scenario by name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

/// Dispatches a scenario by name.
pub(crate) async fn run(name: &str, cx: &mut Context<'_>) -> Result<(), anyhow::Error> {
    match name {
        "param-sync" => param_sync::run(cx).await,
        "report-param-sync" => report_sync::run(cx).await,
        "report-param-reset" => report_reset::run(cx).await,
        "reset-all" => reset_all::run(cx).await,
        "discard-all" => discard_all::run(cx).await,
        "set-in-transaction" => txn_set::run(cx).await,
        "massive-sync" => massive::run(cx).await,
        "read-write-switch" => read_write::run(cx).await,
        "invalid-set" => invalid_set::run(cx).await,
        "soak" => soak::run(cx).await,
        other => bail!("unknown scenario: {other}"),
    }
}

/// Shared state for one scenario run.
pub(crate) struct Context<'a> {
    pub url: &'a str,
    pub run: &'a RunArgs,
    pub protocol: Protocol,
    pub checks: Checks,
}

impl Context<'_> {
    /// Opens a numbered client session over this run's protocol.
    pub async fn connect(&self, id: usize) -> Result<Session, SessionError> {
        Session::connect(self.url, self.protocol, id).await
    }

    /// Waits for the pooler to reclaim a released backend.
    pub async fn settle(&self) {
        tokio::time::sleep(self.run.settle).await;
    }

    /// Short pause between steps of a scenario.
    pub async fn pause(&self) {
        tokio::time::sleep(self.run.pause).await;
    }
}

/// `SHOW`s each named parameter in order, returning `name=value` pairs.
pub(crate) async fn show_all(
    conn: &Session,
    names: &[&str],
) -> Result<Vec<(String, String)>, SessionError> {
    let mut values = Vec::with_capacity(names.len());
    for name in names {
        values.push((name.to_string(), conn.show(name).await?));
    }
    Ok(values)
}

/// Renders `name=value` pairs for checkpoint output.
pub(crate) fn render_values(values: &[(String, String)]) -> String {
    values
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Records the numbered checkpoints of one scenario run.
pub(crate) struct Checks {
    next: usize,
    failures: Vec<String>,
}

impl Checks {
    pub fn new() -> Checks {
        Checks {
            next: 0,
            failures: Vec::new(),
        }
    }

    /// Records a checkpoint and returns whether it passed.
    pub fn check(
        &mut self,
        label: &str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
        passed: bool,
    ) -> bool {
        self.next += 1;
        if passed {
            println!(
                "  {} {:2}: {} ... {}",
                "check".cyan(),
                self.next,
                label,
                "ok".green()
            );
        } else {
            println!(
                "  {} {:2}: {} ... {}",
                "check".cyan(),
                self.next,
                label,
                "FAILED".red().bold()
            );
            println!("        expected: {expected}");
            println!("        actual:   {actual}");
            self.failures.push(format!("check {} ({label})", self.next));
        }
        passed
    }

    /// Prints an observation that does not affect the verdict.
    pub fn note(&self, label: &str, value: impl fmt::Display) {
        println!("  {} {label}: {value}", "note".blue());
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// A one-line account of the run, suitable for the summary table.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            "all checks passed".into()
        } else {
            self.failures.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        for (i, a) in SCENARIOS.iter().enumerate() {
            for b in &SCENARIOS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_resolves_known_names() {
        assert!(find("param-sync").is_some());
        assert!(find("soak").is_some());
        assert!(find("no-such-scenario").is_none());
    }

    #[test]
    fn checks_aggregate_failures() {
        let mut checks = Checks::new();
        assert!(checks.check("first", "a", "a", true));
        assert!(!checks.check("second", "a", "b", false));
        assert!(!checks.passed());
        assert!(checks.summary().contains("check 2 (second)"));
    }
}
