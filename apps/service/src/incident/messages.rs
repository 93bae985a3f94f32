//! Alert message composition. Only called on an error-state transition;
//! steady states never produce messages.

use crate::monitoring::CheckOutcome;
use crate::rules::{Operator, Rule};

/// Format elapsed seconds as a `DdHhMmSs` downtime string.
pub fn format_downtime(mut seconds: i64) -> String {
    let days = seconds / (24 * 60 * 60);
    seconds %= 24 * 60 * 60;
    let hours = seconds / (60 * 60);
    seconds %= 60 * 60;
    let minutes = seconds / 60;
    seconds %= 60;

    format!("{days}d {hours}h {minutes}m {seconds}s")
}

/// One line per distinct failure reason, plus a PASS/FAIL content line
/// when the mismatch flag fired or when nothing else did and a content
/// operator exists. Unsupported operators get named explicitly instead
/// of a PASS/FAIL verdict.
pub fn compose(rule: &Rule, outcome: &CheckOutcome, downtime_seconds: i64) -> Vec<String> {
    let url = &rule.url;
    let mut messages = Vec::new();

    if outcome.status_code != 0 {
        messages.push(format!("FAIL: {url} returned code {}", outcome.status_code));
    }
    if outcome.timed_out {
        messages.push(format!("FAIL: {url} timed out"));
    }
    if let Some(err) = &outcome.transport_error {
        messages.push(format!("FAIL: The request to {url} failed with: {err}"));
    }
    if !outcome.content_mismatch && !messages.is_empty() {
        return messages;
    }

    let failed = outcome.content_mismatch;
    let content = &rule.content;
    let downtime = format_downtime(downtime_seconds);

    match &rule.operator {
        Operator::None => {}
        Operator::Includes => messages.push(if failed {
            format!("FAIL: The content of {url} did not include \"{content}\"")
        } else {
            format!(
                "PASS: {url} is responding and confirmed to include \"{content}\" (Downtime: {downtime})"
            )
        }),
        Operator::NotIncludes => messages.push(if failed {
            format!("FAIL: The content of {url} included \"{content}\"")
        } else {
            format!(
                "PASS: {url} is responding and confirmed to not include \"{content}\" (Downtime: {downtime})"
            )
        }),
        Operator::Matches => messages.push(if failed {
            format!("FAIL: The content of {url} did not match \"{content}\"")
        } else {
            format!(
                "PASS: {url} is responding and confirmed to match \"{content}\" (Downtime: {downtime})"
            )
        }),
        Operator::NotMatches => messages.push(if failed {
            format!("FAIL: The content of {url} matched \"{content}\"")
        } else {
            format!(
                "PASS: {url} is responding and confirmed to not match \"{content}\" (Downtime: {downtime})"
            )
        }),
        Operator::Unsupported(token) => {
            messages.push(format!("The rule for {url} refers to an unsupported operator {token}"));
        }
    }

    messages
}
