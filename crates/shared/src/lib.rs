//! Types shared between the workout API client and its hosts.

pub mod domain;
pub mod error;
pub mod metrics;
pub mod protocol;
