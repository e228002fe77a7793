//! REST API endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`DhanClient`](crate::client::DhanClient) via `impl` blocks. All methods
//! handle JSON serialization, HTTP transport, and error mapping automatically.
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`option_chain`] | 2 | Option chain, expiry lists |

pub mod option_chain;
