// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Result records and the summary table.

use owo_colors::OwoColorize;

/// The outcome of one scenario run under one protocol.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// The scenario category, e.g. `report-param-sync`.
    pub scenario: String,
    /// The specific case, including the protocol.
    pub case: String,
    /// What was expected.
    pub expected: String,
    /// What happened; on failure, which checks failed.
    pub actual: String,
    pub passed: bool,
}

const SCENARIO_WIDTH: usize = 24;
const CASE_WIDTH: usize = 46;
const RESULT_WIDTH: usize = 8;
// "║ " + scenario + " │ " + case + " │ " + result + " ║"
const CONTENT_WIDTH: usize = SCENARIO_WIDTH + CASE_WIDTH + RESULT_WIDTH + 8;

/// Prints the box-drawn summary table with pass/fail counts.
pub fn print_summary(results: &[TestResult]) {
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    let rate = if results.is_empty() {
        100.0
    } else {
        passed as f64 * 100.0 / results.len() as f64
    };

    let horizontal = "═".repeat(CONTENT_WIDTH);
    println!();
    println!("{}", format!("╔{horizontal}╗").cyan());
    println!(
        "{}{}{}",
        "║".cyan(),
        centered("parameter synchronization results", CONTENT_WIDTH).bold(),
        "║".cyan()
    );
    println!("{}", format!("╠{horizontal}╣").cyan());
    println!(
        "{} {} │ {} │ {} {}",
        "║".cyan(),
        pad("scenario", SCENARIO_WIDTH).bold(),
        pad("case", CASE_WIDTH).bold(),
        pad("result", RESULT_WIDTH).bold(),
        "║".cyan()
    );
    println!("{}", format!("╠{horizontal}╣").cyan());
    for result in results {
        let status = if result.passed {
            format!("{}", pad("✓ pass", RESULT_WIDTH).green())
        } else {
            format!("{}", pad("✗ fail", RESULT_WIDTH).red())
        };
        println!(
            "{} {} │ {} │ {} {}",
            "║".cyan(),
            pad(&result.scenario, SCENARIO_WIDTH),
            pad(&result.case, CASE_WIDTH),
            status,
            "║".cyan()
        );
    }
    println!("{}", format!("╠{horizontal}╣").cyan());
    let summary = format!(
        "total: {} │ passed: {} │ failed: {} │ pass rate: {:.2}%",
        results.len(),
        passed,
        failed,
        rate
    );
    println!(
        "{} {}{}",
        "║".cyan(),
        pad(&summary, CONTENT_WIDTH - 1),
        "║".cyan()
    );
    println!("{}", format!("╚{horizontal}╝").cyan());
    println!();

    for result in results.iter().filter(|r| !r.passed) {
        println!(
            "{} {} ({}): expected {}; got {}",
            "failure:".red().bold(),
            result.scenario,
            result.case,
            result.expected,
            result.actual
        );
    }
}

/// Pads or truncates to an exact display width. The "✓"/"✗" marks are single
/// width, so character count is a good enough proxy here.
fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count > width {
        let truncated: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{truncated}…")
    } else {
        format!("{s}{}", " ".repeat(width - count))
    }
}

fn centered(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count >= width {
        return pad(s, width);
    }
    let left = (width - count) / 2;
    let right = width - count - left;
    format!("{}{s}{}", " ".repeat(left), " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_is_exact() {
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdef", 5).chars().count(), 5);
        assert_eq!(pad("", 3), "   ");
    }

    #[test]
    fn centered_is_exact() {
        let c = centered("ab", 6);
        assert_eq!(c.chars().count(), 6);
        assert!(c.contains("ab"));
    }
}
