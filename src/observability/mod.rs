//! Observability subsystem.
//!
//! Every component logs through one [`BodyLogger`] built at startup.

pub mod format;
pub mod logging;

pub use logging::BodyLogger;
