//! pH probe driver.
//!
//! The probe's amplifier outputs ~2.5 V at pH 7.0 and swings ~0.18 V
//! per pH unit. An affine calibration (slope/offset from the two-point
//! procedure) corrects probe drift; see
//! [`CalibrationParams::ph_two_point`](crate::config::CalibrationParams::ph_two_point).

use log::error;

use crate::app::ports::AnalogSource;

use super::averaged_sample;

const ADC_MAX: f32 = 1023.0;
const V_REF: f32 = 3.3;
/// Amplifier output at pH 7.0.
const MID_VOLTAGE: f32 = 2.5;
/// Volts per pH unit.
const VOLTS_PER_PH: f32 = 0.18;

/// Fallback when the channel cannot be read: neutral.
const FALLBACK_PH: f32 = 7.0;

/// Pure transform: averaged raw sample → calibrated pH in [0, 14].
pub fn raw_to_ph(avg_raw: f32, slope: f32, offset: f32) -> f32 {
    let voltage = avg_raw / ADC_MAX * V_REF;
    let raw_ph = 7.0 + (MID_VOLTAGE - voltage) / VOLTS_PER_PH;
    (raw_ph * slope + offset).clamp(0.0, 14.0)
}

pub struct PhSensor<A: AnalogSource> {
    adc: A,
    slope: f32,
    offset: f32,
}

impl<A: AnalogSource> PhSensor<A> {
    pub fn new(adc: A, slope: f32, offset: f32) -> Self {
        Self { adc, slope, offset }
    }

    /// Averaged, calibrated pH. Logs and returns neutral 7.0 on fault.
    pub fn read(&mut self) -> f32 {
        match averaged_sample(&mut self.adc) {
            Ok(avg) => raw_to_ph(avg, self.slope, self.offset),
            Err(e) => {
                error!("pH sensor read failed: {e}");
                FALLBACK_PH
            }
        }
    }

    pub fn release(&mut self) {
        self.adc.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensorError;

    #[test]
    fn midpoint_voltage_is_neutral() {
        // 2.5 V corresponds to raw 2.5/3.3*1023 = 775.
        let raw = MID_VOLTAGE / V_REF * ADC_MAX;
        let ph = raw_to_ph(raw, 1.0, 0.0);
        assert!((ph - 7.0).abs() < 0.01, "got {ph}");
    }

    #[test]
    fn lower_voltage_reads_alkaline() {
        // The probe is inverting: less voltage = higher pH.
        let acid = raw_to_ph(900.0, 1.0, 0.0);
        let alkaline = raw_to_ph(500.0, 1.0, 0.0);
        assert!(alkaline > acid);
    }

    #[test]
    fn output_always_in_range() {
        for raw in [0.0, 1.0, 511.5, 1023.0] {
            let ph = raw_to_ph(raw, 1.0, 0.0);
            assert!((0.0..=14.0).contains(&ph), "raw {raw} gave {ph}");
        }
        // Even a hostile calibration cannot escape the clamp.
        assert!(raw_to_ph(0.0, 100.0, -50.0) <= 14.0);
        assert!(raw_to_ph(1023.0, 100.0, -50.0) >= 0.0);
    }

    #[test]
    fn read_falls_back_to_neutral_on_fault() {
        struct Broken;
        impl AnalogSource for Broken {
            fn sample(&mut self) -> Result<u16, SensorError> {
                Err(SensorError::AcquisitionFailed)
            }
        }
        let mut sensor = PhSensor::new(Broken, 1.0, 0.0);
        assert!((sensor.read() - 7.0).abs() < f32::EPSILON);
    }
}
