//! Port traits: the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Two layers of traits. The *capability* traits wrap one raw transport
//! each (an ADC channel, a 1-wire probe, an echo timer, a serial link);
//! the sensor and pump drivers are generic over them. The *domain* ports
//! (`SensorPort`, `ActuatorPort`, `EventSink`, `SnapshotSink`) are what
//! the controller consumes, so the entire loop runs against mock
//! adapters in tests without touching hardware.

use std::time::Duration;

use crate::dosing::PumpId;
use crate::state::{ControlState, SensorReadings};
use crate::{LinkError, SensorError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Capability traits (one raw transport each)
// ───────────────────────────────────────────────────────────────

/// One analog input channel producing 10-bit raw samples (0–1023).
pub trait AnalogSource {
    /// Acquire a single raw conversion. Bounded-duration.
    fn sample(&mut self) -> Result<u16, SensorError>;

    /// Release the underlying transport. Best-effort, idempotent.
    fn close(&mut self) {}
}

/// A digital temperature probe reporting Celsius directly.
pub trait TempProbe {
    /// One conversion. Bounded-duration.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;

    fn close(&mut self) {}
}

/// Ultrasonic time-of-flight: trigger a pulse and time the echo.
pub trait EchoTimer {
    /// Fire one pulse and return the echo high-duration. When the echo
    /// never arrives the implementation returns whatever elapsed before
    /// `timeout` fired, a degraded reading rather than an error.
    fn measure(&mut self, timeout: Duration) -> Result<Duration, SensorError>;

    fn close(&mut self) {}
}

/// Duplex line-oriented byte channel to one dosing controller.
pub trait ActuatorLink {
    /// Write raw bytes to the link.
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Read one newline-terminated line, trimmed, bounded by the link
    /// timeout chosen at construction.
    fn recv_line(&mut self) -> Result<String, LinkError>;

    fn close(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Domain ports
// ───────────────────────────────────────────────────────────────

/// Read-side port: the controller calls this once per cycle.
///
/// Implementations never fail a whole cycle for one flaky sensor;
/// individual faults are logged and replaced with the defined fallback
/// values. An `Err` here means the port itself is unusable and the
/// cycle is abandoned (the loop backs off and retries).
pub trait SensorPort {
    /// Read every sensor, temperature first (TDS compensation needs it).
    fn read_all(&mut self) -> crate::Result<SensorReadings>;

    /// Release all underlying transports. Best-effort, shutdown path.
    fn release(&mut self);
}

/// Write-side port: the controller commands the dosing pumps.
pub trait ActuatorPort {
    /// Issue one dose. Returns true only on an acknowledged command;
    /// never raises, failures are logged by the implementation.
    fn dose(&mut self, pump: PumpId, amount_ml: f32) -> bool;

    /// Emergency stop, fire-and-forget. Must not fail even when the
    /// link is unusable: it runs on the shutdown path.
    fn stop(&mut self, pump: PumpId);
}

/// The controller emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (log stream, test buffer, ...).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Persists the latest control state for the external monitor.
///
/// Implementations must replace the previous snapshot atomically so a
/// reader never observes a partially written record.
pub trait SnapshotSink {
    fn store(&mut self, state: &ControlState) -> crate::Result<()>;
}
