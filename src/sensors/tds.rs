//! TDS (total dissolved solids) sensor driver.
//!
//! Reads an averaged 10-bit sample from its analog channel, compensates
//! for water temperature, and maps voltage to ppm through the probe
//! vendor's cubic polynomial scaled by the stored calibration factor.

use log::error;

use crate::app::ports::AnalogSource;

use super::averaged_sample;

const ADC_MAX: f32 = 1023.0;
const V_REF: f32 = 3.3;

/// Pure transform: averaged raw sample + water temperature → ppm.
///
/// The compensation coefficient normalises conductivity to 25 °C at
/// 2 % per degree. Output is clamped non-negative; the polynomial dips
/// slightly below zero near the origin.
pub fn raw_to_ppm(avg_raw: f32, temperature_c: f32, calibration_factor: f32) -> f32 {
    let voltage = avg_raw / ADC_MAX * V_REF;
    let coefficient = 1.0 + 0.02 * (temperature_c - 25.0);
    let v = voltage / coefficient;
    let ppm = (133.42 * v.powi(3) - 255.86 * v.powi(2) + 857.39 * v) * calibration_factor;
    ppm.max(0.0)
}

pub struct TdsSensor<A: AnalogSource> {
    adc: A,
    calibration_factor: f32,
}

impl<A: AnalogSource> TdsSensor<A> {
    pub fn new(adc: A, calibration_factor: f32) -> Self {
        Self {
            adc,
            calibration_factor,
        }
    }

    /// Averaged, temperature-compensated reading in ppm.
    /// On an acquisition fault, logs and returns 0 so the control loop
    /// always has a usable value.
    pub fn read(&mut self, temperature_c: f32) -> f32 {
        match averaged_sample(&mut self.adc) {
            Ok(avg) => raw_to_ppm(avg, temperature_c, self.calibration_factor),
            Err(e) => {
                error!("TDS sensor read failed: {e}");
                0.0
            }
        }
    }

    pub fn release(&mut self) {
        self.adc.close();
    }
}
