//! Sensor acquisition and the timer-driven sampling loops.
//!
//! One [`runner::run`] task per sensor kind acquires a reading from its
//! [`probe::SensorProbe`], appends it to the reading store, and publishes it
//! to the broadcast hub. Acquisition and validation failures are contained
//! per tick; the loop only stops on cancellation.

pub mod probe;
pub mod probes;
pub mod runner;

pub use probe::{AcquisitionError, SensorProbe};
pub use runner::{run, sample_and_distribute, spawn};
