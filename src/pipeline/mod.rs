//! Deal pipeline.
//!
//! Every CRM deal flows through:
//! 1. `qualify::qualify_deal()`: details, idle days, urgency
//! 2. `resolver::resolve_thread()`: matching thread, valid messages, contact
//! 3. `scoring::reply_speed()` + tone inference on the latest message
//! 4. `processor::NudgeProcessor`: generation and assembly into `Nudge`s
//!
//! Deals that fail a check are skipped, never fatal to the batch.

pub mod processor;
pub mod qualify;
pub mod resolver;
pub mod scoring;
pub mod types;
