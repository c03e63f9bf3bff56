//! Qualification filter: the deal-level checks that run before any thread lookup.
//!
//! Order is fixed: details → idle days → urgency. The first failing check
//! decides the `Rejection` a caller sees.

use chrono::{DateTime, Utc};

use crate::config::NudgeConfig;
use crate::pipeline::scoring::idle_days;
use crate::pipeline::types::{Deal, Rejection};

/// Scores of a deal that passed the deal-level checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedDeal {
    pub idle_days: i64,
    pub urgency: u64,
}

/// Urgency score: idle days weighted by deal value.
pub fn urgency(idle_days: i64, amount_eur: u64) -> u64 {
    u64::try_from(idle_days)
        .unwrap_or(0)
        .saturating_mul(amount_eur)
}

/// Run checks 1-3 against a deal at reference time `now`.
pub fn qualify_deal(
    deal: &Deal,
    config: &NudgeConfig,
    now: DateTime<Utc>,
) -> Result<QualifiedDeal, Rejection> {
    if !deal.has_details() {
        return Err(Rejection::MissingDetails);
    }

    let idle_days = idle_days(&deal.last_activity, now);
    if idle_days < config.min_idle_days {
        return Err(Rejection::NotIdle {
            idle_days,
            min_idle_days: config.min_idle_days,
        });
    }

    let urgency = urgency(idle_days, deal.amount_eur);
    if urgency <= config.min_urgency {
        return Err(Rejection::LowUrgency {
            urgency,
            min_urgency: config.min_urgency,
        });
    }

    Ok(QualifiedDeal { idle_days, urgency })
}
