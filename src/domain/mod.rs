//! Domain layer: event types, stored records and errors.
//!
//! # Module Organization
//!
//! - `webhook` - Inbound events, event kinds, store records, validation outcomes
//! - `recovery` - Replay windows, run statistics and recovery errors

pub mod recovery;
pub mod webhook;
