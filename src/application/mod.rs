//! Application layer - Command handlers orchestrating the ports.

pub mod handlers;
