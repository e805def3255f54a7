//! TeeClaim library - tee-time booking automation
//!
//! This module exports internal components for integration testing.

pub mod booking;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod dates;
pub mod orchestrator;
pub mod redact;
pub mod release;
pub mod retry;
pub mod times;
pub mod webdriver;
