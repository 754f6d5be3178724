//! REST outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ResourceApi`
//! port.

mod http_api;

pub use http_api::RestResourceApi;
