//! Order service
//!
//! Accepts purchase orders over HTTP, persists them locally, and decrements
//! stock in a remote inventory service. A staged order is only committed
//! once every inventory adjustment has succeeded.

pub mod auth;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod interfaces;
pub mod model;
pub mod services;
pub mod storage;
pub mod utils;
