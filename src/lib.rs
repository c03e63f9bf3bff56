//! Mini Nudge Agent: finds stalled CRM deals and drafts follow-up nudges.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod generator;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod tone;
