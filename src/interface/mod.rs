//! Interface layer - External interfaces
//!
//! This layer handles:
//! - REST control API for the operator dashboard
//! - Prometheus scrape endpoint
//! - Request/response formatting

pub mod api;
