//! Dosing hysteresis state machines.
//!
//! One two-state machine per pump, evaluated once per cycle. A dose is
//! a one-shot pulse, not a continuous pump run: the ACTIVE flag marks
//! "a correction is in flight, wait for the chemistry to respond", and
//! clearing it sends no actuator command.
//!
//! The machines are pure: they decide, the controller acts. The flag
//! commits on the INACTIVE→ACTIVE transition whether or not the dose
//! command is later acknowledged; an unacknowledged dose is re-examined
//! next cycle through the unchanged measurement, not retried blindly.

/// Nutrient dosing: dose when TDS drops below the target minimum,
/// stand down once it recovers.
#[derive(Debug, Default)]
pub struct NutrientHysteresis {
    active: bool,
}

impl NutrientHysteresis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one cycle. Returns true when a dose should be issued
    /// (exactly once per downward crossing).
    pub fn evaluate(&mut self, tds_ppm: f32, target_min: f32) -> bool {
        if !self.active && tds_ppm < target_min {
            self.active = true;
            return true;
        }
        if self.active && tds_ppm >= target_min {
            self.active = false;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// pH correction: dose pH-down when above the band, stand down once the
/// reading is back inside it.
///
/// Deliberately asymmetric: `ph < target_min` takes no action. The
/// enclosure carries only a pH-down reservoir; drifting low is left to
/// the operator via the alert log.
#[derive(Debug, Default)]
pub struct PhHysteresis {
    active: bool,
}

impl PhHysteresis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one cycle. Returns true when a pH-down dose should be
    /// issued.
    pub fn evaluate(&mut self, ph: f32, target_min: f32, target_max: f32) -> bool {
        if !self.active && ph > target_max {
            self.active = true;
            return true;
        }
        if self.active && ph >= target_min && ph <= target_max {
            self.active = false;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
