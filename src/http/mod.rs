//! HTTP transport for archive downloads.

mod client;

pub use client::{FETCH_TIMEOUT, HttpClient};
