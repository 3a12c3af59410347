#![forbid(unsafe_code)]

pub mod model;
pub mod pacing;
pub mod tags;
pub mod time;

pub use time::Clock;
