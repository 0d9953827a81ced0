//! Ultrasonic water level sensor (HC-SR04 style time-of-flight).
//!
//! One pulse per call, no averaging loop. Distance follows from the
//! echo high-duration at the speed of sound.
//!
//! A missing echo is reported as whatever elapsed before the 40 ms
//! deadline, which after the transport's own bookkeeping tends toward a
//! near-zero duration, so a dead sensor reads as ~0 cm and trips the
//! low-water alert rather than going silent.

use std::time::Duration;

use log::error;

use crate::app::ports::EchoTimer;

/// Speed of sound in air at ~20 °C, cm/s.
const SPEED_OF_SOUND_CM_S: f32 = 34_300.0;

/// Longest plausible echo wait (~6.8 m of range).
pub const ECHO_TIMEOUT: Duration = Duration::from_millis(40);

/// Pure transform: echo high-duration → one-way distance in cm.
pub fn echo_to_cm(echo: Duration) -> f32 {
    echo.as_secs_f32() * SPEED_OF_SOUND_CM_S / 2.0
}

pub struct LevelSensor<E: EchoTimer> {
    echo: E,
}

impl<E: EchoTimer> LevelSensor<E> {
    pub fn new(echo: E) -> Self {
        Self { echo }
    }

    /// Distance to the water surface in cm. Logs and returns 0 on a
    /// transport fault.
    pub fn read(&mut self) -> f32 {
        match self.echo.measure(ECHO_TIMEOUT) {
            Ok(echo) => echo_to_cm(echo),
            Err(e) => {
                error!("water level read failed: {e}");
                0.0
            }
        }
    }

    pub fn release(&mut self) {
        self.echo.close();
    }
}
