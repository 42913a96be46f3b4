//! Inbound request handlers.

pub mod http;
