//! Request, response and derived types.
//!
//! ## Organization
//!
//! - [`enums`]: Shared enumerations (exchange segments, option side)
//! - [`instrument`]: Underlyings and the raw rows they are loaded from
//! - [`option_chain`]: Option chain and expiry list wire types, strike keys
//! - [`analytics`]: Derived per-strike ratio table and chain totals
//! - [`opening`]: Opening snapshot and support/resistance levels
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod analytics;
pub mod enums;
pub mod instrument;
pub mod opening;
pub mod option_chain;

pub use enums::*;
