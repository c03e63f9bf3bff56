//! Thread resolution: pick a deal's email thread and find the counterparty in it.

use tracing::debug;

use crate::pipeline::types::{EmailThread, Message, Rejection};

/// A deal's thread reduced to what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedThread {
    /// First recipient in the thread that is not the operator.
    pub contact: String,
    /// Valid messages (from/to/ts present) in thread order.
    pub messages: Vec<Message>,
}

impl ResolvedThread {
    /// Last valid message in thread order; its body drives tone inference.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// First thread whose `deal_id` matches. Later duplicates are ignored.
pub fn find_thread<'a>(threads: &'a [EmailThread], deal_id: &str) -> Option<&'a EmailThread> {
    let mut matching = threads.iter().filter(|t| t.deal_id == deal_id);
    let first = matching.next()?;
    let extra = matching.count();
    if extra > 0 {
        debug!(deal_id = %deal_id, extra, "Multiple threads for deal, using the first");
    }
    Some(first)
}

/// Resolve the thread for `deal_id` (checks 4-5 of qualification).
pub fn resolve_thread(
    threads: &[EmailThread],
    deal_id: &str,
    self_email: &str,
) -> Result<ResolvedThread, Rejection> {
    let thread = find_thread(threads, deal_id)
        .filter(|t| !t.thread.is_empty())
        .ok_or(Rejection::NoThread)?;

    let messages: Vec<Message> = thread
        .thread
        .iter()
        .filter(|m| m.is_valid())
        .cloned()
        .collect();
    if messages.is_empty() {
        return Err(Rejection::NoValidMessages);
    }

    let contact = messages
        .iter()
        .filter_map(Message::to_addr)
        .find(|to| *to != self_email)
        .map(str::to_string)
        .ok_or(Rejection::NoExternalContact)?;

    Ok(ResolvedThread { contact, messages })
}

#[cfg(test)]
mod tests {
    use super::*;

    const AE: &str = "ae@nudge.ai";

    fn thread(deal_id: &str, messages: Vec<Message>) -> EmailThread {
        EmailThread {
            deal_id: deal_id.into(),
            thread: messages,
        }
    }

    #[test]
    fn resolves_contact_and_valid_messages() {
        let threads = vec![thread(
            "OPP-123",
            vec![
                Message::new(AE, "marie.cfo@acme.com", "2025-07-01T09:00:00Z").with_body("Hello"),
                Message {
                    from: Some("marie.cfo@acme.com".into()),
                    to: Some(AE.into()),
                    ts: None,
                    body: Some("dropped".into()),
                },
                Message::new("marie.cfo@acme.com", AE, "2025-07-01T09:45:00Z").with_body("Hi back"),
            ],
        )];

        let resolved = resolve_thread(&threads, "OPP-123", AE).unwrap();
        assert_eq!(resolved.contact, "marie.cfo@acme.com");
        assert_eq!(resolved.messages.len(), 2);
        assert_eq!(resolved.latest().unwrap().body_text(), "Hi back");
    }

    #[test]
    fn contact_skips_operator_address() {
        let threads = vec![thread(
            "OPP-1",
            vec![
                Message::new("cto@acme.com", AE, "2025-07-01T08:00:00Z"),
                Message::new(AE, "cto@acme.com", "2025-07-01T09:00:00Z"),
            ],
        )];
        let resolved = resolve_thread(&threads, "OPP-1", AE).unwrap();
        assert_eq!(resolved.contact, "cto@acme.com");
    }

    #[test]
    fn first_matching_thread_wins() {
        let threads = vec![
            thread("OPP-9", vec![Message::new(AE, "other@x.com", "2025-07-01T09:00:00Z")]),
            thread("OPP-1", vec![Message::new(AE, "first@acme.com", "2025-07-01T09:00:00Z")]),
            thread("OPP-1", vec![Message::new(AE, "second@acme.com", "2025-07-01T09:00:00Z")]),
        ];
        assert_eq!(find_thread(&threads, "OPP-1").unwrap().thread[0].to_addr(), Some("first@acme.com"));
        assert_eq!(resolve_thread(&threads, "OPP-1", AE).unwrap().contact, "first@acme.com");
    }

    #[test]
    fn empty_first_thread_is_not_replaced_by_later_match() {
        let threads = vec![
            thread("OPP-1", vec![]),
            thread("OPP-1", vec![Message::new(AE, "b@acme.com", "2025-07-01T09:00:00Z")]),
        ];
        assert_eq!(resolve_thread(&threads, "OPP-1", AE), Err(Rejection::NoThread));
    }

    #[test]
    fn missing_thread_is_rejected() {
        assert_eq!(resolve_thread(&[], "OPP-1", AE), Err(Rejection::NoThread));
    }

    #[test]
    fn thread_without_valid_messages_is_rejected() {
        let threads = vec![thread("OPP-1", vec![Message::default()])];
        assert_eq!(resolve_thread(&threads, "OPP-1", AE), Err(Rejection::NoValidMessages));
    }

    #[test]
    fn thread_addressed_only_to_operator_has_no_contact() {
        let threads = vec![thread(
            "OPP-1",
            vec![
                Message::new("cfo@acme.com", AE, "2025-07-01T09:00:00Z"),
                Message::new("cfo@acme.com", AE, "2025-07-02T09:00:00Z"),
            ],
        )];
        assert_eq!(
            resolve_thread(&threads, "OPP-1", AE),
            Err(Rejection::NoExternalContact)
        );
    }

    #[test]
    fn unset_operator_identity_takes_first_recipient() {
        let threads = vec![thread(
            "OPP-1",
            vec![Message::new("cfo@acme.com", AE, "2025-07-01T09:00:00Z")],
        )];
        assert_eq!(resolve_thread(&threads, "OPP-1", "").unwrap().contact, AE);
    }
}
