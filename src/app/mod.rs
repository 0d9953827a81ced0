//! Application core: port traits, outbound events, and the controller.

pub mod events;
pub mod ports;
pub mod service;
