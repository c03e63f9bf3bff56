//! Nudge processor: turns CRM deals and email threads into nudges, in deal order.
//!
//! Flow per deal, in source order:
//! 1. Qualification (details → idle days → urgency)
//! 2. Thread resolution (thread → valid messages → external contact)
//! 3. Reply speed + tone inference on the resolved thread
//! 4. Message generation → `Nudge`
//!
//! A rejected deal is logged and skipped; it never affects other deals.
//! Only a data source failure empties the whole run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::NudgeConfig;
use crate::data::DataSource;
use crate::generator::{MessageGenerator, NudgeRequest};
use crate::pipeline::qualify::qualify_deal;
use crate::pipeline::resolver::resolve_thread;
use crate::pipeline::scoring::{reply_speed, round_to_tenth};
use crate::pipeline::types::{Dataset, Deal, EmailThread, Nudge, Rejection, Tone};
use crate::tone::ToneInference;

/// A deal that produced no nudge, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDeal {
    pub deal_id: String,
    pub reason: Rejection,
}

/// Outcome of one run over a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Nudges in deal source order.
    pub nudges: Vec<Nudge>,
    pub skipped: Vec<SkippedDeal>,
}

/// Sequences qualification, resolution, tone and generation over all deals.
pub struct NudgeProcessor {
    config: NudgeConfig,
    tone: Arc<dyn ToneInference>,
    generator: Arc<dyn MessageGenerator>,
}

impl NudgeProcessor {
    pub fn new(
        config: NudgeConfig,
        tone: Arc<dyn ToneInference>,
        generator: Arc<dyn MessageGenerator>,
    ) -> Self {
        Self {
            config,
            tone,
            generator,
        }
    }

    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    /// Load from `source` and run. A load failure yields no nudges.
    pub async fn process(&self, source: &dyn DataSource, now: DateTime<Utc>) -> Vec<Nudge> {
        match source.load().await {
            Ok(dataset) => self.run(&dataset, now).await,
            Err(e) => {
                error!(source = source.name(), error = %e, "Error loading data, producing no nudges");
                Vec::new()
            }
        }
    }

    /// Run over an already loaded dataset.
    pub async fn run(&self, dataset: &Dataset, now: DateTime<Utc>) -> Vec<Nudge> {
        self.run_with_report(dataset, now).await.nudges
    }

    /// Run and keep the skip decisions alongside the nudges.
    pub async fn run_with_report(&self, dataset: &Dataset, now: DateTime<Utc>) -> RunReport {
        let total = dataset.deals.len();
        info!(deals = total, threads = dataset.threads.len(), "Processing deals");

        let mut report = RunReport::default();
        for deal in &dataset.deals {
            match self.process_deal(deal, &dataset.threads, now).await {
                Ok(nudge) => report.nudges.push(nudge),
                Err(reason) => {
                    info!(
                        deal_id = %deal.deal_id,
                        check = reason.label(),
                        reason = %reason,
                        "Deal skipped"
                    );
                    report.skipped.push(SkippedDeal {
                        deal_id: deal.deal_id.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            nudges = report.nudges.len(),
            skipped = report.skipped.len(),
            total,
            "Deal processing complete"
        );
        report
    }

    async fn process_deal(
        &self,
        deal: &Deal,
        threads: &[EmailThread],
        now: DateTime<Utc>,
    ) -> Result<Nudge, Rejection> {
        let qualified = qualify_deal(deal, &self.config, now)?;
        let resolved = resolve_thread(threads, &deal.deal_id, &self.config.self_email)?;

        let speed = reply_speed(&resolved.messages, &self.config.self_email, &resolved.contact);
        let tone = match resolved.latest() {
            Some(message) => self.tone.infer_tone(message.body_text()).await,
            None => Tone::Formal,
        };

        debug!(
            deal_id = %deal.deal_id,
            idle_days = qualified.idle_days,
            urgency = qualified.urgency,
            reply_speed = speed,
            tone = %tone,
            "Deal qualified"
        );

        let request = NudgeRequest {
            deal_id: deal.deal_id.clone(),
            contact: resolved.contact.clone(),
            tone,
            reply_speed: speed,
            deal_name: deal.deal_name.clone(),
            stage: deal.stage.clone(),
        };
        let text = self.generator.generate(&request).await;

        Ok(Nudge {
            deal_id: request.deal_id,
            contact: request.contact,
            nudge: text,
            urgency: qualified.urgency,
            reply_speed: round_to_tenth(speed),
            tone,
        })
    }
}
