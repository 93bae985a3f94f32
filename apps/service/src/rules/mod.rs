//! Monitoring rules and their pass/fail criteria.
//!
//! A rule arrives as one space-separated record:
//! `timeout_seconds retries contact_bitfield url operator content...`
//! where `content` is the remainder of the record. Records live in DNS
//! TXT rdata, so the transport bounds them near 4 KB.

pub mod source;

use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// Comparison applied to the response body. The `!` prefix of the raw
/// token negates the base operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `=` - body must contain the content string
    Includes,
    /// `!=` - body must not contain the content string
    NotIncludes,
    /// `~` - body must match the content pattern
    Matches,
    /// `!~` - body must not match the content pattern
    NotMatches,
    /// Record carried no operator field; content checking is skipped
    None,
    /// Anything else. Kept verbatim so the failure message can name it.
    Unsupported(String),
}

impl Operator {
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            None => Self::None,
            Some("=") => Self::Includes,
            Some("!=") => Self::NotIncludes,
            Some("~") => Self::Matches,
            Some("!~") => Self::NotMatches,
            Some(other) => Self::Unsupported(other.to_string()),
        }
    }

    /// Evaluate the operator against a response body, returning true on
    /// mismatch. Unsupported operators always mismatch so a garbled rule
    /// surfaces as a visible failure instead of silently passing.
    pub fn mismatch(&self, body: &str, content: &str) -> bool {
        match self {
            Self::Includes => !body.contains(content),
            Self::NotIncludes => body.contains(content),
            Self::Matches => !pattern_matches(content, body),
            Self::NotMatches => pattern_matches(content, body),
            Self::None => false,
            Self::Unsupported(_) => true,
        }
    }
}

fn pattern_matches(pattern: &str, body: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(body),
        Err(err) => {
            warn!("invalid content pattern {pattern:?}: {err}");
            false
        }
    }
}

/// One monitored endpoint. Re-parsed from the rule source every cycle,
/// never persisted.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Max wait per attempt
    pub timeout: Duration,
    /// Remaining retry budget for timeouts and transport errors
    pub retries: u32,
    /// Bit i set means contact at ordinal i gets notified
    pub contact_bitfield: u64,
    pub url: String,
    pub operator: Operator,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum RuleParseError {
    #[error("record has fewer than four fields")]
    MissingFields,
    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid probe url {0:?}")]
    InvalidUrl(String),
}

impl Rule {
    /// Parse a single rule record. The content field may itself contain
    /// spaces; it is rejoined with single spaces.
    pub fn parse_record(record: &str) -> Result<Self, RuleParseError> {
        let mut fields = record.split_whitespace();

        let timeout = fields.next().ok_or(RuleParseError::MissingFields)?;
        let retries = fields.next().ok_or(RuleParseError::MissingFields)?;
        let bitfield = fields.next().ok_or(RuleParseError::MissingFields)?;
        let url = fields.next().ok_or(RuleParseError::MissingFields)?;
        let operator = Operator::parse(fields.next());
        let content = fields.collect::<Vec<_>>().join(" ");

        let timeout: u64 = parse_number(timeout, "timeout")?;
        let retries: u32 = parse_number(retries, "retries")?;
        let contact_bitfield: u64 = parse_number(bitfield, "contact_bitfield")?;

        // The scheme decides plain vs encrypted transport, so anything
        // else is unusable as a probe target
        let is_probe_url = url::Url::parse(url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_probe_url {
            return Err(RuleParseError::InvalidUrl(url.to_string()));
        }

        Ok(Self {
            timeout: Duration::from_secs(timeout),
            retries,
            contact_bitfield,
            url: url.to_string(),
            operator,
            content,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> Result<T, RuleParseError> {
    value.parse().map_err(|_| RuleParseError::InvalidNumber { field, value: value.to_string() })
}

/// Parse every record from one rule source. Malformed records are logged
/// and skipped so the rest of the source still runs.
pub fn parse_rules(records: &[String]) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(records.len());
    for record in records {
        match Rule::parse_record(record) {
            Ok(rule) => rules.push(rule),
            Err(err) => warn!("skipping malformed rule record {record:?}: {err}"),
        }
    }
    rules
}
