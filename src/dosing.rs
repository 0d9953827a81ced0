//! Dosing pump command protocol.
//!
//! Each [`DosingPump`] owns exactly one serial link to a peristaltic
//! pump controller and one fixed identity. The wire protocol is
//! line-oriented ASCII:
//!
//! ```text
//! -> DOSE <id> <amount_ml>\n
//! <- ACK
//! -> STOP\n                  (no response expected)
//! ```
//!
//! `dose` reports failure through its return value and never raises;
//! `stop` is fire-and-forget and must survive an unusable link because
//! it runs on the shutdown path.

use std::fmt;

use log::{error, info, warn};

use crate::app::ports::ActuatorLink;

/// Fixed actuator identity, also the wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpId {
    Nutrient,
    Ph,
}

impl PumpId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nutrient => "nutrient",
            Self::Ph => "ph",
        }
    }
}

impl fmt::Display for PumpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct DosingPump<L: ActuatorLink> {
    link: L,
    id: PumpId,
}

impl<L: ActuatorLink> DosingPump<L> {
    pub fn new(link: L, id: PumpId) -> Self {
        Self { link, id }
    }

    pub fn id(&self) -> PumpId {
        self.id
    }

    /// Issue one dose command and wait for the acknowledgement line.
    /// True only for an exact `ACK`; every other outcome is logged and
    /// reported as false. The caller does not retry within a cycle;
    /// the hysteresis condition is simply re-evaluated next time.
    pub fn dose(&mut self, amount_ml: f32) -> bool {
        // Whole-millilitre doses serialize without a fraction, matching
        // what the pump firmware was tested against.
        let command = format!("DOSE {} {}\n", self.id, amount_ml);
        if let Err(e) = self.link.send(command.as_bytes()) {
            error!("{} pump: dose command send failed: {e}", self.id);
            return false;
        }

        match self.link.recv_line() {
            Ok(line) if line == "ACK" => {
                info!("dosed {amount_ml}ml of {}", self.id);
                true
            }
            Ok(line) => {
                warn!("{} pump: unexpected response: {line:?}", self.id);
                false
            }
            Err(e) => {
                error!("{} pump: no acknowledgement: {e}", self.id);
                false
            }
        }
    }

    /// Emergency stop. No acknowledgement is awaited; a send failure is
    /// logged and swallowed.
    pub fn stop(&mut self) {
        if let Err(e) = self.link.send(b"STOP\n") {
            error!("{} pump: stop command send failed: {e}", self.id);
        }
    }

    /// Release the underlying link.
    pub fn release(&mut self) {
        self.link.close();
    }

    /// Surrender the link (test teardown).
    pub fn into_link(self) -> L {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkError;

    /// Records sent lines; replies with a scripted response.
    struct ScriptedLink {
        sent: Vec<String>,
        reply: Result<String, LinkError>,
    }

    impl ScriptedLink {
        fn replying(reply: Result<String, LinkError>) -> Self {
            Self {
                sent: Vec::new(),
                reply,
            }
        }
    }

    impl ActuatorLink for ScriptedLink {
        fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
            self.sent.push(String::from_utf8_lossy(bytes).into_owned());
            Ok(())
        }
        fn recv_line(&mut self) -> Result<String, LinkError> {
            self.reply.clone()
        }
    }

    #[test]
    fn dose_sends_wire_format_and_accepts_ack() {
        let link = ScriptedLink::replying(Ok("ACK".to_string()));
        let mut pump = DosingPump::new(link, PumpId::Nutrient);
        assert!(pump.dose(10.0));
        assert_eq!(pump.link.sent, vec!["DOSE nutrient 10\n"]);
    }

    #[test]
    fn fractional_amounts_keep_their_fraction() {
        let link = ScriptedLink::replying(Ok("ACK".to_string()));
        let mut pump = DosingPump::new(link, PumpId::Ph);
        assert!(pump.dose(2.5));
        assert_eq!(pump.link.sent, vec!["DOSE ph 2.5\n"]);
    }

    #[test]
    fn non_ack_response_is_failure() {
        let link = ScriptedLink::replying(Ok("BUSY".to_string()));
        let mut pump = DosingPump::new(link, PumpId::Ph);
        assert!(!pump.dose(5.0));
    }

    #[test]
    fn timeout_is_failure() {
        let link = ScriptedLink::replying(Err(LinkError::Timeout));
        let mut pump = DosingPump::new(link, PumpId::Nutrient);
        assert!(!pump.dose(10.0));
    }

    #[test]
    fn stop_survives_a_dead_link() {
        struct DeadLink;
        impl ActuatorLink for DeadLink {
            fn send(&mut self, _bytes: &[u8]) -> Result<(), LinkError> {
                Err(LinkError::SendFailed)
            }
            fn recv_line(&mut self) -> Result<String, LinkError> {
                Err(LinkError::RecvFailed)
            }
        }
        let mut pump = DosingPump::new(DeadLink, PumpId::Nutrient);
        pump.stop(); // must not panic or block
    }

    #[test]
    fn stop_sends_bare_stop_line() {
        let link = ScriptedLink::replying(Ok(String::new()));
        let mut pump = DosingPump::new(link, PumpId::Ph);
        pump.stop();
        assert_eq!(pump.link.sent, vec!["STOP\n"]);
    }
}
