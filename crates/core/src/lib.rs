//! Domain types shared by every sensord crate.
//!
//! Pure data definitions and validation only -- no I/O, no async. Everything
//! here can be tested in isolation.

pub mod error;
pub mod reading;
pub mod types;

pub use error::CoreError;
pub use reading::{Reading, ReadingValue, SensorKind};
