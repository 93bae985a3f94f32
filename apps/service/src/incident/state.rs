//! Error-state transitions. The engine diffs the stored record against a
//! fresh check outcome and decides what to persist and what to say.

use super::messages;
use crate::monitoring::CheckOutcome;
use crate::rules::Rule;
use crate::store::{IncidentRecord, NO_ERROR};

/// What the caller should do with the store for this rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    None,
    Upsert,
    Delete,
}

#[derive(Debug)]
pub struct Evaluation {
    pub record: IncidentRecord,
    pub persistence: Persistence,
    pub messages: Vec<String>,
}

/// Diff one outcome against the previous record.
///
/// Steady states (error predicate unchanged, expiring flag unchanged) are
/// suppressed entirely: no write, no messages. Entering an error stamps
/// `first_error_at = now`; exiting clears it and reports the downtime.
/// An expiring-flag flip forces a persistence write on its own but never
/// produces messages. A record that ends up empty is deleted rather than
/// upserted.
pub fn evaluate(
    rule: &Rule,
    previous: Option<&IncidentRecord>,
    outcome: &CheckOutcome,
    now_ms: i64,
) -> Evaluation {
    let prev_time = previous.map(|r| r.first_error_at).unwrap_or(NO_ERROR);
    let prev_expiring = previous.map(|r| r.expiring).unwrap_or(false);

    let is_error = outcome.is_error();
    let was_active = prev_time != NO_ERROR || prev_expiring;
    let expiring_changed = prev_expiring != outcome.cert_expiring;

    // Steady healthy or steady error: suppressed to avoid alert spam
    if was_active == is_error && !expiring_changed {
        return Evaluation {
            record: IncidentRecord {
                url: rule.url.clone(),
                first_error_at: prev_time,
                expiring: prev_expiring,
            },
            persistence: Persistence::None,
            messages: Vec::new(),
        };
    }

    let entering = prev_time == NO_ERROR && is_error;
    let exiting = prev_time != NO_ERROR && !is_error;

    let first_error_at = if entering {
        now_ms
    } else if exiting {
        NO_ERROR
    } else {
        prev_time
    };

    let record =
        IncidentRecord { url: rule.url.clone(), first_error_at, expiring: outcome.cert_expiring };

    let persistence = if entering || exiting || expiring_changed {
        if record.is_empty() { Persistence::Delete } else { Persistence::Upsert }
    } else {
        Persistence::None
    };

    // Messages are composed only at the entry/exit boundary
    let messages = if entering || exiting {
        let downtime_seconds =
            if prev_time != NO_ERROR { (now_ms - prev_time) / 1000 } else { 0 };
        messages::compose(rule, outcome, downtime_seconds)
    } else {
        Vec::new()
    };

    Evaluation { record, persistence, messages }
}
