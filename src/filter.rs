//! Hysteresis filters for the front panel controls.
//!
//! Every filter is polled once per loop iteration with a fresh sample and reports
//! a change by returning `Some(new value)`. They are never touched from edge handlers.
pub mod deadband;
pub mod discrete;
pub mod switch;

pub use deadband::Deadband;
pub use discrete::Discretizer;
pub use switch::SwitchDebouncer;
