//! Live reading distribution.

pub mod hub;

pub use hub::ReadingHub;
