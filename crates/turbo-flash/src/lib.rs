//! Session-backed flash messages.
//!
//! A `Flash` is the per-request view over the `flash` field of the session
//! bag. It is attached once per request, before the protocol core is built,
//! so shared-data providers can read validation errors and banner messages.
//!
//! Reads never consume an entry. Clearing consumed messages is explicit
//! (`Flash::remove` / `Flash::clear`) and left to the application.

mod error;
mod flash;

pub use error::*;
pub use flash::*;
