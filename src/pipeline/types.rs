//! Shared types for the deal-scoring pipeline.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ── CRM ─────────────────────────────────────────────────────────────

/// One deal row from the CRM export.
///
/// Rows are validated at the load boundary (amount parsed, columns present).
/// `last_activity` stays raw: an unparseable timestamp is a data-quality
/// warning at scoring time, not a load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub deal_id: String,
    pub deal_name: String,
    pub stage: String,
    pub amount_eur: u64,
    /// ISO-8601 timestamp, possibly with a `Z` suffix.
    pub last_activity: String,
}

impl Deal {
    /// A deal without a stage or a name never qualifies.
    pub fn has_details(&self) -> bool {
        !self.stage.trim().is_empty() && !self.deal_name.trim().is_empty()
    }
}

// ── Email ───────────────────────────────────────────────────────────

/// One message of an email thread.
///
/// Every field is optional on the wire; non-string values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ts: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,
}

impl Message {
    pub fn new(from: &str, to: &str, ts: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            ts: Some(ts.to_string()),
            body: None,
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Valid only when sender, recipient and timestamp are all present.
    pub fn is_valid(&self) -> bool {
        present(&self.from) && present(&self.to) && present(&self.ts)
    }

    pub fn from_addr(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to_addr(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// An email thread tied to a deal. Several threads may share a `deal_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailThread {
    pub deal_id: String,
    /// Messages in the order they were recorded, not necessarily by timestamp.
    #[serde(default)]
    pub thread: Vec<Message>,
}

/// Everything one run reads: deals and threads, loaded once up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub deals: Vec<Deal>,
    pub threads: Vec<EmailThread>,
}

// ── Tone ────────────────────────────────────────────────────────────

/// Communication style inferred from the buyer's latest message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Formal,
    Casual,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Output ──────────────────────────────────────────────────────────

/// The outreach suggestion produced for one qualifying deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nudge {
    pub deal_id: String,
    /// The counterparty address.
    pub contact: String,
    /// Generated message text.
    pub nudge: String,
    /// `idle_days × amount_eur`.
    pub urgency: u64,
    /// Median reply latency in minutes, one decimal. `+inf` when never observed.
    #[serde(with = "reply_speed_serde")]
    pub reply_speed: f64,
    pub tone: Tone,
}

/// JSON has no infinity: `+inf` goes out as `null` and `null` comes back as `+inf`.
mod reply_speed_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

// ── Qualification outcome ───────────────────────────────────────────

/// Why a deal produced no nudge. Checks run in this order; the first failure wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Empty `stage` or `deal_name`.
    MissingDetails,
    NotIdle { idle_days: i64, min_idle_days: i64 },
    LowUrgency { urgency: u64, min_urgency: u64 },
    /// No thread for the deal, or the thread has no messages.
    NoThread,
    /// The thread exists but none of its messages has from/to/ts.
    NoValidMessages,
    /// Every valid message is addressed to the operator.
    NoExternalContact,
}

impl Rejection {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingDetails => "missing_details",
            Self::NotIdle { .. } => "not_idle",
            Self::LowUrgency { .. } => "low_urgency",
            Self::NoThread => "no_thread",
            Self::NoValidMessages => "no_valid_messages",
            Self::NoExternalContact => "no_external_contact",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDetails => f.write_str("invalid stage or deal_name"),
            Self::NotIdle {
                idle_days,
                min_idle_days,
            } => write!(f, "idle_days={idle_days} < {min_idle_days}"),
            Self::LowUrgency {
                urgency,
                min_urgency,
            } => write!(f, "urgency={urgency} <= {min_urgency}"),
            Self::NoThread => f.write_str("no email thread"),
            Self::NoValidMessages => f.write_str("no valid messages in thread"),
            Self::NoExternalContact => f.write_str("no external contact in thread"),
        }
    }
}
