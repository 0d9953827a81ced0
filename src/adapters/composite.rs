//! Composes the sensor hub and both dosing pumps behind the domain
//! ports. Generic over the capability traits, so the same composition
//! serves the real Raspberry Pi peripherals and scripted test doubles.

use crate::app::ports::{
    ActuatorLink, ActuatorPort, AnalogSource, EchoTimer, SensorPort, TempProbe,
};
use crate::dosing::{DosingPump, PumpId};
use crate::sensors::SensorHub;
use crate::state::SensorReadings;

pub struct HardwareAdapter<Ta, Pa, Tp, Et, Ln, Lp>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
    Ln: ActuatorLink,
    Lp: ActuatorLink,
{
    sensors: SensorHub<Ta, Pa, Tp, Et>,
    nutrient: DosingPump<Ln>,
    ph: DosingPump<Lp>,
}

impl<Ta, Pa, Tp, Et, Ln, Lp> HardwareAdapter<Ta, Pa, Tp, Et, Ln, Lp>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
    Ln: ActuatorLink,
    Lp: ActuatorLink,
{
    /// Build from pre-constructed drivers. The pump identities are
    /// fixed here: the first link drives the nutrient pump, the second
    /// the pH pump.
    pub fn new(sensors: SensorHub<Ta, Pa, Tp, Et>, nutrient_link: Ln, ph_link: Lp) -> Self {
        Self {
            sensors,
            nutrient: DosingPump::new(nutrient_link, PumpId::Nutrient),
            ph: DosingPump::new(ph_link, PumpId::Ph),
        }
    }

    /// Decompose into the owned drivers (test teardown).
    #[allow(clippy::type_complexity)]
    pub fn into_parts(self) -> (SensorHub<Ta, Pa, Tp, Et>, DosingPump<Ln>, DosingPump<Lp>) {
        (self.sensors, self.nutrient, self.ph)
    }
}

impl<Ta, Pa, Tp, Et, Ln, Lp> SensorPort for HardwareAdapter<Ta, Pa, Tp, Et, Ln, Lp>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
    Ln: ActuatorLink,
    Lp: ActuatorLink,
{
    fn read_all(&mut self) -> crate::Result<SensorReadings> {
        // The hub substitutes fallbacks for individual faults, so a
        // full reading set is always available.
        Ok(self.sensors.read_all())
    }

    fn release(&mut self) {
        self.sensors.release();
        self.nutrient.release();
        self.ph.release();
    }
}

impl<Ta, Pa, Tp, Et, Ln, Lp> ActuatorPort for HardwareAdapter<Ta, Pa, Tp, Et, Ln, Lp>
where
    Ta: AnalogSource,
    Pa: AnalogSource,
    Tp: TempProbe,
    Et: EchoTimer,
    Ln: ActuatorLink,
    Lp: ActuatorLink,
{
    fn dose(&mut self, pump: PumpId, amount_ml: f32) -> bool {
        match pump {
            PumpId::Nutrient => self.nutrient.dose(amount_ml),
            PumpId::Ph => self.ph.dose(amount_ml),
        }
    }

    fn stop(&mut self, pump: PumpId) {
        match pump {
            PumpId::Nutrient => self.nutrient.stop(),
            PumpId::Ph => self.ph.stop(),
        }
    }
}
