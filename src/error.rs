//! Unified error types for the controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform. Port implementations
//! return the subsystem variants; the library surfaces `crate::Result`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the library funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A sensor port could not be read.
    Sensor(SensorError),
    /// The serial link to a pump controller failed.
    Link(LinkError),
    /// Peripheral construction failed at startup.
    Init(String),
    /// Configuration is invalid or could not be loaded.
    Config(String),
    /// The snapshot sink could not persist the control state.
    Snapshot(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Snapshot(e) => write!(f, "snapshot: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC conversion returned an error or timed out.
    AcquisitionFailed,
    /// GPIO read/write on the port failed.
    GpioFailed,
    /// Probe returned data that failed its integrity check (e.g. 1-wire CRC).
    BadData,
    /// Raw value outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcquisitionFailed => write!(f, "acquisition failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::BadData => write!(f, "probe data failed integrity check"),
            Self::OutOfRange => write!(f, "raw value out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The write side of the link failed.
    SendFailed,
    /// The read side of the link failed.
    RecvFailed,
    /// No response line arrived within the link timeout.
    Timeout,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed => write!(f, "send failed"),
            Self::RecvFailed => write!(f, "receive failed"),
            Self::Timeout => write!(f, "response timeout"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Library-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
