//! Threshold alert checks.
//!
//! Stateless: every cycle each breach is re-emitted for as long as the
//! condition holds. No deduplication or escalation window: the log
//! stream is the record, and downstream tooling does its own
//! rate-limiting if it needs any.

use crate::app::events::{Alert, AppEvent};
use crate::app::ports::EventSink;
use crate::config::SystemConfig;
use crate::state::SensorReadings;

pub struct AlertMonitor {
    min_water_level: f32,
    min_temp: f32,
    max_temp: f32,
}

impl AlertMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_water_level: config.min_water_level,
            min_temp: config.min_temp,
            max_temp: config.max_temp,
        }
    }

    /// Evaluate this cycle's readings and emit an event per breach.
    pub fn check(&self, readings: &SensorReadings, sink: &mut impl EventSink) {
        if readings.water_level_cm < self.min_water_level {
            sink.emit(&AppEvent::Alert(Alert::LowWaterLevel {
                level_cm: readings.water_level_cm,
                min_cm: self.min_water_level,
            }));
        }

        if readings.temperature_c > self.max_temp {
            sink.emit(&AppEvent::Alert(Alert::HighTemperature {
                temp_c: readings.temperature_c,
                max_c: self.max_temp,
            }));
        } else if readings.temperature_c < self.min_temp {
            sink.emit(&AppEvent::Alert(Alert::LowTemperature {
                temp_c: readings.temperature_c,
                min_c: self.min_temp,
            }));
        }
    }
}
