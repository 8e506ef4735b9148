//! Client for a bulk email PDF retrieval server.
//!
//! Submits a job over HTTP, polls its progress on a fixed interval, and
//! reconciles each snapshot into display state for a terminal front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod logging;
