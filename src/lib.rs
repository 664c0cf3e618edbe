//! Payment Webhooks - Ingestion and Reconciliation Service
//!
//! This crate verifies inbound Stripe webhooks, rejects duplicate and
//! out-of-order deliveries against a TTL'd key-value Event Store, routes
//! accepted events to typed handlers, and replays missed events over a
//! time window.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
