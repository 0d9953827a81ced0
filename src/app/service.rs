//! Application service, the hexagonal core.
//!
//! [`Controller`] owns the control state, the per-pump hysteresis
//! machines and the alert monitor. All I/O flows through port traits
//! injected at call sites, making the entire loop testable with mock
//! adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        Controller         │ ──▶ SnapshotSink
//! ActuatorPort ◀── │  hysteresis · alerts      │
//!                  └──────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{error, info, warn};

use crate::alerts::AlertMonitor;
use crate::config::SystemConfig;
use crate::control::hysteresis::{NutrientHysteresis, PhHysteresis};
use crate::dosing::PumpId;
use crate::state::{ControlState, SensorReadings};

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, SnapshotSink};

/// Wait after a cycle-level fault before trying again.
const CYCLE_FAULT_BACKOFF: Duration = Duration::from_secs(10);

/// Granularity at which the inter-cycle sleep polls the shutdown flag.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// The control loop and its decision state.
pub struct Controller {
    config: SystemConfig,
    state: ControlState,
    nutrient: NutrientHysteresis,
    ph: PhHysteresis,
    alerts: AlertMonitor,
    cycle_count: u64,
    fault_backoff: Duration,
}

impl Controller {
    pub fn new(config: SystemConfig) -> Self {
        let alerts = AlertMonitor::new(&config);
        Self {
            config,
            state: ControlState::default(),
            nutrient: NutrientHysteresis::new(),
            ph: PhHysteresis::new(),
            alerts,
            cycle_count: 0,
            fault_backoff: CYCLE_FAULT_BACKOFF,
        }
    }

    /// Override the wait after a failed cycle (tests run with a short
    /// one so a recovery can be observed without the full 10 s).
    pub fn with_fault_backoff(mut self, backoff: Duration) -> Self {
        self.fault_backoff = backoff;
        self
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle: read sensors → persist snapshot →
    /// dosing hysteresis → alert checks.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    ///
    /// An `Err` means the sensor port itself was unusable; the run loop
    /// backs off and retries. Everything below that severity is handled
    /// in place (logged, fallback values, unacknowledged doses).
    pub fn cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        snapshot: &mut impl SnapshotSink,
        sink: &mut impl EventSink,
    ) -> crate::Result<()> {
        self.cycle_count += 1;

        // 1. Acquire, temperature first (TDS compensation needs it).
        let readings = hw.read_all()?;
        self.state.record(&readings, Utc::now());
        info!(
            "sensor readings - TDS: {:.0} ppm, pH: {:.2}, Temp: {:.1}°C, Level: {:.1}cm",
            readings.tds_ppm, readings.ph, readings.temperature_c, readings.water_level_cm
        );
        sink.emit(&AppEvent::Readings(readings));

        // 2. Persist for the external monitor. Best-effort: the pump
        // flags written here are the ones committed last cycle.
        if let Err(e) = snapshot.store(&self.state) {
            warn!("snapshot store failed: {e}");
        }

        // 3. Dosing decisions.
        self.control_nutrients(&readings, hw, sink);
        self.control_ph(&readings, hw, sink);

        // 4. Threshold alerts.
        self.alerts.check(&readings, sink);

        Ok(())
    }

    fn control_nutrients(
        &mut self,
        readings: &SensorReadings,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let was_active = self.nutrient.is_active();
        if self
            .nutrient
            .evaluate(readings.tds_ppm, self.config.target_tds_min)
        {
            info!("TDS low ({:.0} ppm), dosing nutrients", readings.tds_ppm);
            let acked = hw.dose(PumpId::Nutrient, self.config.nutrient_dose_ml);
            sink.emit(&AppEvent::DoseRequested {
                pump: PumpId::Nutrient,
                amount_ml: self.config.nutrient_dose_ml,
                acked,
            });
        } else if was_active && !self.nutrient.is_active() {
            info!("TDS recovered ({:.0} ppm)", readings.tds_ppm);
        }
        self.sync_flag(PumpId::Nutrient, sink);
    }

    fn control_ph(
        &mut self,
        readings: &SensorReadings,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let was_active = self.ph.is_active();
        if self.ph.evaluate(
            readings.ph,
            self.config.target_ph_min,
            self.config.target_ph_max,
        ) {
            info!("pH high ({:.2}), dosing pH down", readings.ph);
            let acked = hw.dose(PumpId::Ph, self.config.ph_dose_ml);
            sink.emit(&AppEvent::DoseRequested {
                pump: PumpId::Ph,
                amount_ml: self.config.ph_dose_ml,
                acked,
            });
        } else if was_active && !self.ph.is_active() {
            info!("pH normalized ({:.2})", readings.ph);
        }
        self.sync_flag(PumpId::Ph, sink);
    }

    /// Mirror a hysteresis flag into the published state, emitting a
    /// transition event on change.
    fn sync_flag(&mut self, pump: PumpId, sink: &mut impl EventSink) {
        let (flag, active) = match pump {
            PumpId::Nutrient => (
                &mut self.state.nutrient_pump_active,
                self.nutrient.is_active(),
            ),
            PumpId::Ph => (&mut self.state.ph_pump_active, self.ph.is_active()),
        };
        if *flag != active {
            *flag = active;
            sink.emit(&AppEvent::PumpStateChanged { pump, active });
        }
    }

    // ── Run loop ──────────────────────────────────────────────

    /// Execute cycles until `shutdown` is observed, then perform the
    /// ordered shutdown sequence: stop both pumps (regardless of their
    /// flags), release the sensor ports, emit `Stopped`.
    ///
    /// A cycle fault never terminates the process: it is logged and the
    /// loop resumes after a 10 second backoff. Fixed sleep, not
    /// fixed-rate scheduling: the chemistry moves on a scale of
    /// minutes, so drift is acceptable.
    pub fn run(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        snapshot: &mut impl SnapshotSink,
        sink: &mut impl EventSink,
        shutdown: &AtomicBool,
    ) {
        info!("starting hydroponic control loop");
        sink.emit(&AppEvent::Started);

        while !shutdown.load(Ordering::SeqCst) {
            let pause = match self.cycle(hw, snapshot, sink) {
                Ok(()) => Duration::from_secs(self.config.update_interval_secs),
                Err(e) => {
                    error!("control cycle failed: {e}");
                    self.fault_backoff
                }
            };
            interruptible_sleep(shutdown, pause);
        }

        self.stop(hw, sink);
    }

    /// The shutdown sequence. Also runs standalone when the loop never
    /// executed a cycle (shutdown requested before the first read).
    pub fn stop(&mut self, hw: &mut (impl SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        info!("stopping hydroponic controller");
        hw.stop(PumpId::Nutrient);
        hw.stop(PumpId::Ph);
        hw.release();
        sink.emit(&AppEvent::Stopped);
    }

    // ── Queries ───────────────────────────────────────────────

    /// The latest published control state.
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}

/// Sleep for `total`, polling the shutdown flag so delivery mid-sleep
/// wakes the loop within one slice.
fn interruptible_sleep(shutdown: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while !shutdown.load(Ordering::SeqCst) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interruptible_sleep_returns_promptly_when_flagged() {
        let shutdown = AtomicBool::new(true);
        let started = Instant::now();
        interruptible_sleep(&shutdown, Duration::from_secs(60));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn interruptible_sleep_completes_short_waits() {
        let shutdown = AtomicBool::new(false);
        let started = Instant::now();
        interruptible_sleep(&shutdown, Duration::from_millis(30));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
