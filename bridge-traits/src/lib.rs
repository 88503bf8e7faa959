//! # Transport Bridge Traits
//!
//! Seam traits between the sync core and the outside world.
//!
//! ## Overview
//!
//! This crate defines the two capabilities the core consumes through trait
//! objects so that tests can substitute deterministic implementations:
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP execution (the real
//!   implementation lives in `bridge-reqwest`)
//! - [`Clock`](time::Clock) - Wall-clock source, injectable so schedule
//!   computations stay testable without real time
//!
//! ## Error Handling
//!
//! Transport failures are reported as [`BridgeError`](error::BridgeError).
//! The variants deliberately separate timeouts and connection failures from
//! other transport problems: the API layer treats the former as retryable
//! and the latter as fatal.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; implementations are shared across the
//! per-job tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod time;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use time::{Clock, FixedClock, SystemClock};
