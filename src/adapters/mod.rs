//! Driven adapters behind the port traits.
//!
//! `log_sink` and `snapshot` are pure std and always available; the
//! Raspberry Pi peripherals in `hardware` need the `hardware` feature.

pub mod composite;
pub mod log_sink;
pub mod snapshot;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use composite::HardwareAdapter;
