//! Ordered request pipeline.
//!
//! Steps declare what they need and what they add to the exchange. The
//! sequencer rejects misordered registrations up front and re-checks each
//! step's needs at run time, so a request never reaches a step whose
//! upstream facility is absent.

mod sequencer;
mod step;
mod steps;

pub use sequencer::*;
pub use step::*;
pub use steps::*;
