//! Event sink adapter that writes application events to the log stream.
//!
//! Alert-level events land at `warn!` so log scrapers can key on the
//! level; lifecycle and state transitions at `info!`; per-cycle noise
//! at `debug!` (the controller already emits a readings summary line).

use log::{debug, info, warn};

use crate::app::events::{Alert, AppEvent};
use crate::app::ports::EventSink;

#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("controller started"),
            AppEvent::Stopped => info!("controller stopped"),
            AppEvent::Readings(r) => debug!("{r:?}"),
            AppEvent::DoseRequested {
                pump,
                amount_ml,
                acked: true,
            } => debug!("{pump} dose of {amount_ml}ml acknowledged"),
            AppEvent::DoseRequested {
                pump,
                amount_ml,
                acked: false,
            } => warn!("{pump} dose of {amount_ml}ml was not acknowledged"),
            AppEvent::PumpStateChanged { pump, active } => {
                info!(
                    "{pump} pump {}",
                    if *active { "active" } else { "inactive" }
                );
            }
            AppEvent::Alert(alert) => match alert {
                Alert::LowWaterLevel { level_cm, min_cm } => {
                    warn!("LOW WATER LEVEL: {level_cm:.1}cm (minimum {min_cm:.1}cm)");
                }
                Alert::HighTemperature { temp_c, max_c } => {
                    warn!("HIGH TEMPERATURE: {temp_c:.1}°C (maximum {max_c:.1}°C)");
                }
                Alert::LowTemperature { temp_c, min_c } => {
                    warn!("LOW TEMPERATURE: {temp_c:.1}°C (minimum {min_c:.1}°C)");
                }
            },
        }
    }
}
