//! Hydrostat controller library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. Peripheral access lives behind port traits; the real
//! Raspberry Pi adapters are only compiled with the `hardware` feature.

#![deny(unused_must_use)]

pub mod alerts;
pub mod app;
pub mod config;
pub mod control;
pub mod dosing;
pub mod sensors;
pub mod state;

mod error;

pub mod adapters;

pub use error::{Error, LinkError, Result, SensorError};
