//! Event delivery: direct callbacks plus an optional broadcast bus.

pub mod bus;
pub mod callbacks;

pub use bus::EventBus;
pub use callbacks::EventCallbacks;
