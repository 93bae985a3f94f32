//! Recipient fan-out. Bit i of a rule's contact bitfield addresses the
//! contact at ordinal i of the configured contact list.

use std::collections::BTreeMap;

/// Pending alert lines per contact address, accumulated across all rules
/// of one cycle so each contact receives a single batched send.
pub type MessageBatches = BTreeMap<String, Vec<String>>;

/// Append a rule's messages to every addressed contact's batch. Set bits
/// are walked low-to-high; bits past the end of the contact list are
/// silently ignored.
pub fn route(
    bitfield: u64,
    contacts: &[String],
    messages: &[String],
    batches: &mut MessageBatches,
) {
    if messages.is_empty() {
        return;
    }

    let mut bits = bitfield;
    let mut ordinal = 0usize;
    while bits != 0 {
        if bits & 1 == 1 {
            if let Some(contact) = contacts.get(ordinal) {
                batches.entry(contact.clone()).or_default().extend_from_slice(messages);
            }
        }
        bits >>= 1;
        ordinal += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts() -> Vec<String> {
        vec!["a@example.com".into(), "b@example.com".into(), "https://hooks.example/x".into()]
    }

    #[test]
    fn bitfield_101_routes_to_first_and_third() {
        let mut batches = MessageBatches::new();

        route(0b101, &contacts(), &["FAIL: down".to_string()], &mut batches);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches["a@example.com"], vec!["FAIL: down"]);
        assert_eq!(batches["https://hooks.example/x"], vec!["FAIL: down"]);
        assert!(!batches.contains_key("b@example.com"));
    }

    #[test]
    fn out_of_range_bits_are_ignored() {
        let mut batches = MessageBatches::new();

        route(0b1000_0010, &contacts(), &["FAIL: down".to_string()], &mut batches);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches["b@example.com"], vec!["FAIL: down"]);
    }

    #[test]
    fn batches_accumulate_in_rule_order() {
        let mut batches = MessageBatches::new();

        route(0b001, &contacts(), &["first".to_string()], &mut batches);
        route(0b011, &contacts(), &["second".to_string(), "third".to_string()], &mut batches);

        assert_eq!(batches["a@example.com"], vec!["first", "second", "third"]);
        assert_eq!(batches["b@example.com"], vec!["second", "third"]);
    }

    #[test]
    fn empty_message_lists_create_no_batches() {
        let mut batches = MessageBatches::new();
        route(0b111, &contacts(), &[], &mut batches);
        assert!(batches.is_empty());
    }
}
