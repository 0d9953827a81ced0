//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorReadings`]
//! each cycle. Drivers are generic over the capability traits in
//! [`crate::app::ports`], so tests inject scripted transports.

pub mod level;
pub mod ph;
pub mod tds;
pub mod temperature;

use std::thread;
use std::time::Duration;

use crate::app::ports::{AnalogSource, EchoTimer, TempProbe};
use crate::state::SensorReadings;
use crate::SensorError;

use level::LevelSensor;
use ph::PhSensor;
use tds::TdsSensor;
use temperature::TemperatureSensor;

/// Raw conversions averaged per analog read. Stored calibration factors
/// were collected with these exact constants; they are not tunables.
pub const SAMPLE_COUNT: u32 = 10;
/// Inter-sample delay within one averaged read.
pub const SAMPLE_DELAY: Duration = Duration::from_millis(10);

/// Take [`SAMPLE_COUNT`] conversions with the fixed inter-sample delay
/// and return their arithmetic mean. Amortises ADC and bus jitter.
pub(crate) fn averaged_sample<A: AnalogSource>(adc: &mut A) -> Result<f32, SensorError> {
    let mut sum: u32 = 0;
    for i in 0..SAMPLE_COUNT {
        sum += u32::from(adc.sample()?);
        if i + 1 < SAMPLE_COUNT {
            thread::sleep(SAMPLE_DELAY);
        }
    }
    Ok(sum as f32 / SAMPLE_COUNT as f32)
}

/// Aggregates all sensor drivers and produces a unified reading set.
pub struct SensorHub<Ta, Pa, Tp, Et>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
{
    pub tds: TdsSensor<Ta>,
    pub ph: PhSensor<Pa>,
    pub temperature: TemperatureSensor<Tp>,
    pub level: LevelSensor<Et>,
}

impl<Ta, Pa, Tp, Et> SensorHub<Ta, Pa, Tp, Et>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
{
    /// Construct a new hub from pre-built drivers (built where transport
    /// ownership is established).
    pub fn new(
        tds: TdsSensor<Ta>,
        ph: PhSensor<Pa>,
        temperature: TemperatureSensor<Tp>,
        level: LevelSensor<Et>,
    ) -> Self {
        Self {
            tds,
            ph,
            temperature,
            level,
        }
    }

    /// Read every sensor. Temperature first, since the TDS compensation
    /// formula consumes it. Individual faults are logged inside each
    /// driver and replaced with its fallback value.
    pub fn read_all(&mut self) -> SensorReadings {
        let temperature_c = self.temperature.read();
        let tds_ppm = self.tds.read(temperature_c);
        let ph = self.ph.read();
        let water_level_cm = self.level.read();

        SensorReadings {
            tds_ppm,
            ph,
            temperature_c,
            water_level_cm,
        }
    }

    /// Release every underlying transport. Best-effort shutdown path.
    pub fn release(&mut self) {
        self.tds.release();
        self.ph.release();
        self.temperature.release();
        self.level.release();
    }
}
