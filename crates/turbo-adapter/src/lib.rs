//! Adapter contract between the Inertia protocol core and a host server.
//!
//! The protocol core only ever sees `dyn Adapter`:
//! - `Adapter` - Capability interface over one request/response pair
//! - `HostAdapter` - Implementation for the `turbo-host` binding
//! - `JsonBody` - Object-safe serialization seam used by `Adapter::json`
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_adapter::{Adapter, HostAdapter};
//!
//! let adapter = HostAdapter::new(request, reply.clone());
//! if adapter.header("X-Inertia").is_some() {
//!     adapter.json(&page);
//! } else {
//!     adapter.html(&shell);
//! }
//! ```

mod adapter;
mod error;
mod host;

pub use adapter::*;
pub use error::*;
pub use host::*;
