//! # Core Runtime Module
//!
//! Foundational infrastructure for the sync daemon:
//! - Configuration loading and validation
//! - Logging and tracing setup
//!
//! ## Overview
//!
//! This crate owns everything the daemon needs before the first API
//! call: the YAML settings model with exhaustive startup validation,
//! and the `tracing` subscriber conventions used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{LogFormat, ScheduleSettings, Settings};
pub use error::{Error, Result};
