//! Host binding for the turbo-inertia request pipeline.
//!
//! This crate provides the host-side objects the pipeline wraps:
//! - `HostRequest` - Read-only view of an incoming `http::Request`
//! - `Reply` - Buffered, shareable response handle
//! - `Session` - Mutable per-request key-value bag placed by a session layer
//! - `RequestId` - Request identifier for log correlation

mod error;
mod reply;
mod request;
mod session;

pub use error::*;
pub use reply::*;
pub use request::*;
pub use session::*;
