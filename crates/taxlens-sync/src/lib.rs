//! Transport to the tax computation service.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{CalcClient, SyncError};
