//! Email thread parsing.
//!
//! A broken email file degrades to "no threads" and a broken entry is
//! skipped. Deals still load either way.

use serde_json::Value;
use tracing::warn;

use crate::pipeline::types::{EmailThread, Message};

/// Parse the email threads document. Never fails.
pub fn parse_emails(content: &str) -> Vec<EmailThread> {
    let document: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Invalid JSON in email file, using no threads");
            return Vec::new();
        }
    };

    let Value::Array(entries) = document else {
        warn!("Email file is not a list, using no threads");
        return Vec::new();
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let thread = parse_entry(entry);
            if thread.is_none() {
                warn!(index = idx, "Invalid email entry, skipping");
            }
            thread
        })
        .collect()
}

fn parse_entry(entry: Value) -> Option<EmailThread> {
    let Value::Object(mut map) = entry else {
        return None;
    };

    let deal_id = match map.remove("deal_id")? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let Value::Array(raw_messages) = map.remove("thread")? else {
        return None;
    };

    let thread = raw_messages
        .into_iter()
        .map(|m| serde_json::from_value::<Message>(m).unwrap_or_default())
        .collect();

    Some(EmailThread { deal_id, thread })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_threads_in_order() {
        let json = r#"[
            {"deal_id": "OPP-123", "thread": [
                {"from": "ae@nudge.ai", "to": "marie.cfo@acme.com", "ts": "2025-07-01T09:00:00Z", "body": "Hello"},
                {"from": "marie.cfo@acme.com", "to": "ae@nudge.ai", "ts": "2025-07-01T09:45:00Z"}
            ]},
            {"deal_id": "OPP-456", "thread": []}
        ]"#;
        let threads = parse_emails(json);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].deal_id, "OPP-123");
        assert_eq!(threads[0].thread.len(), 2);
        assert_eq!(threads[0].thread[0].body_text(), "Hello");
        assert!(threads[0].thread[1].body.is_none());
        assert!(threads[1].thread.is_empty());
    }

    #[test]
    fn invalid_json_yields_no_threads() {
        assert!(parse_emails("{not json").is_empty());
    }

    #[test]
    fn non_list_document_yields_no_threads() {
        assert!(parse_emails(r#"{"deal_id": "OPP-1", "thread": []}"#).is_empty());
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let json = r#"[
            "just a string",
            {"thread": []},
            {"deal_id": "OPP-1"},
            {"deal_id": null, "thread": []},
            {"deal_id": "OPP-2", "thread": "nope"},
            {"deal_id": "OPP-3", "thread": [{}]}
        ]"#;
        let threads = parse_emails(json);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].deal_id, "OPP-3");
        assert!(!threads[0].thread[0].is_valid());
    }

    #[test]
    fn non_object_messages_become_invalid() {
        let json = r#"[{"deal_id": 7, "thread": [42, {"from": "a@x.com", "to": "b@y.com", "ts": "2025-07-01"}]}]"#;
        let threads = parse_emails(json);
        assert_eq!(threads[0].deal_id, "7");
        assert!(!threads[0].thread[0].is_valid());
        assert!(threads[0].thread[1].is_valid());
    }
}
