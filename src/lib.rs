//! Cucumber steps for checking the status, content type and body a website serves.

#![allow(clippy::multiple_crate_versions)]
#![deny(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::disallowed_methods)]
#![deny(clippy::expect_used)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::panic)]
#![deny(clippy::perf)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::unreachable)]
#![deny(clippy::unwrap_used)]
#![deny(warnings)]
#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod harness;
pub mod status_codes;
// cucumber's step registration expands to undocumented inventory statics
#[allow(missing_docs, unsafe_code)]
pub mod steps;

pub use client::{FetchedResponse, HttpFetch, UreqFetcher};
pub use config::{HarnessConfig, StaleResponsePolicy};
pub use error::HarnessError;
pub use harness::HttpAssertionHarness;
