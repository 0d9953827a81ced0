//! Outbound application events.
//!
//! The controller emits these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them; the
//! shipped adapter writes them to the log stream.

use crate::dosing::PumpId;
use crate::state::SensorReadings;

/// Structured events emitted by the control loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started.
    Started,

    /// One cycle's sensor readings, in physical units.
    Readings(SensorReadings),

    /// A dose command was issued. `acked` is false when the pump
    /// controller did not acknowledge; the hysteresis state commits
    /// either way and the condition is re-evaluated next cycle.
    DoseRequested {
        pump: PumpId,
        amount_ml: f32,
        acked: bool,
    },

    /// A pump's hysteresis flag toggled.
    PumpStateChanged { pump: PumpId, active: bool },

    /// A threshold breach. Re-emitted every cycle while it holds.
    Alert(Alert),

    /// The shutdown sequence has completed.
    Stopped,
}

/// Threshold breaches checked every cycle. Not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    LowWaterLevel { level_cm: f32, min_cm: f32 },
    HighTemperature { temp_c: f32, max_c: f32 },
    LowTemperature { temp_c: f32, min_c: f32 },
}
