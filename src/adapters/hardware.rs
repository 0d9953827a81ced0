//! Raspberry Pi peripheral adapters (`hardware` feature).
//!
//! The only module in the crate that touches real transports:
//! an MCP3008 ADC on SPI0 for the analog probes, a DS18B20 on the
//! 1-wire sysfs interface for water temperature, an HC-SR04 on two
//! GPIOs for the level sounder, and one USB-serial link per pump
//! controller (a Pico running the dosing firmware).

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::app::ports::{ActuatorLink, AnalogSource, EchoTimer, TempProbe};
use crate::sensors::level::LevelSensor;
use crate::sensors::ph::PhSensor;
use crate::sensors::tds::TdsSensor;
use crate::sensors::temperature::TemperatureSensor;
use crate::sensors::SensorHub;
use crate::{config::CalibrationParams, Error, LinkError, SensorError};

use super::composite::HardwareAdapter;

// ── MCP3008 ADC channel ───────────────────────────────────────

const SPI_CLOCK_HZ: u32 = 1_350_000;

/// One channel of the MCP3008, single-ended. Each channel opens its
/// own handle on the shared SPI device.
pub struct Mcp3008Channel {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Channel {
    pub fn new(channel: u8) -> crate::Result<Self> {
        debug_assert!(channel < 8);
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| Error::Init(format!("SPI open for ADC channel {channel}: {e}")))?;
        Ok(Self { spi, channel })
    }
}

impl AnalogSource for Mcp3008Channel {
    fn sample(&mut self) -> Result<u16, SensorError> {
        // Start bit, single-ended mode + channel, one clocking byte.
        let tx = [0x01, (0x08 + self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|_| SensorError::AcquisitionFailed)?;
        Ok((u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]))
    }
}

// ── DS18B20 1-wire probe ──────────────────────────────────────

const W1_DEVICES: &str = "/sys/bus/w1/devices";

/// DS18B20 via the kernel w1 sysfs interface.
pub struct Ds18b20Probe {
    path: PathBuf,
}

impl Ds18b20Probe {
    /// Bind to the first 28-* device on the bus.
    pub fn first() -> crate::Result<Self> {
        let entries = fs::read_dir(W1_DEVICES)
            .map_err(|e| Error::Init(format!("1-wire bus not available: {e}")))?;
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with("28-") {
                return Ok(Self {
                    path: entry.path().join("w1_slave"),
                });
            }
        }
        Err(Error::Init("no DS18B20 found on the 1-wire bus".into()))
    }
}

impl TempProbe for Ds18b20Probe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let text = fs::read_to_string(&self.path).map_err(|_| SensorError::AcquisitionFailed)?;
        let mut lines = text.lines();
        let crc_line = lines.next().ok_or(SensorError::BadData)?;
        if !crc_line.trim_end().ends_with("YES") {
            return Err(SensorError::BadData);
        }
        let data_line = lines.next().ok_or(SensorError::BadData)?;
        let milli: i32 = data_line
            .rsplit_once("t=")
            .and_then(|(_, t)| t.trim().parse().ok())
            .ok_or(SensorError::BadData)?;
        Ok(milli as f32 / 1000.0)
    }
}

// ── HC-SR04 echo timer ────────────────────────────────────────

pub struct HcSr04 {
    trigger: OutputPin,
    echo: InputPin,
}

impl HcSr04 {
    pub fn new(trigger_pin: u8, echo_pin: u8) -> crate::Result<Self> {
        let gpio = Gpio::new().map_err(|e| Error::Init(format!("GPIO open: {e}")))?;
        let mut trigger = gpio
            .get(trigger_pin)
            .map_err(|e| Error::Init(format!("trigger pin {trigger_pin}: {e}")))?
            .into_output();
        let echo = gpio
            .get(echo_pin)
            .map_err(|e| Error::Init(format!("echo pin {echo_pin}: {e}")))?
            .into_input();
        trigger.set_low();
        // Transducer settling time after the line is driven low.
        thread::sleep(Duration::from_millis(500));
        Ok(Self { trigger, echo })
    }
}

impl EchoTimer for HcSr04 {
    fn measure(&mut self, timeout: Duration) -> Result<Duration, SensorError> {
        // 10 µs trigger pulse.
        self.trigger.set_high();
        thread::sleep(Duration::from_micros(10));
        self.trigger.set_low();

        let deadline = Instant::now() + timeout;
        while self.echo.is_low() && Instant::now() < deadline {}
        let rise = Instant::now();
        while self.echo.is_high() && Instant::now() < deadline {}

        // When the echo never arrives this is the remaining slice at
        // the deadline, i.e. close to zero: a degraded low reading
        // rather than an error, so a dead sounder trips the low-water
        // alert instead of going dark.
        Ok(rise.elapsed())
    }
}

// ── Serial pump link ──────────────────────────────────────────

const PUMP_BAUD: u32 = 9600;
const PUMP_LINK_TIMEOUT: Duration = Duration::from_secs(1);

pub struct SerialPumpLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialPumpLink {
    pub fn open(path: &str) -> crate::Result<Self> {
        let port = serialport::new(path, PUMP_BAUD)
            .timeout(PUMP_LINK_TIMEOUT)
            .open()
            .map_err(|e| Error::Init(format!("pump link {path}: {e}")))?;
        // The Pico resets when the port opens; wait for its firmware.
        thread::sleep(Duration::from_secs(2));
        info!("connected to pump controller at {path}");
        Ok(Self { port })
    }
}

impl ActuatorLink for SerialPumpLink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port
            .write_all(bytes)
            .and_then(|()| self.port.flush())
            .map_err(|_| LinkError::SendFailed)
    }

    fn recv_line(&mut self) -> Result<String, LinkError> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => return Err(LinkError::Timeout),
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => line.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Err(LinkError::Timeout),
                Err(_) => return Err(LinkError::RecvFailed),
            }
        }
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }
}

// ── Assembled Raspberry Pi adapter ────────────────────────────

/// The concrete adapter the binary runs against.
pub type PiHardware = HardwareAdapter<
    Mcp3008Channel,
    Mcp3008Channel,
    Ds18b20Probe,
    HcSr04,
    SerialPumpLink,
    SerialPumpLink,
>;

/// Wiring of the enclosure (BCM pin numbers / device paths).
pub struct Wiring {
    pub tds_adc_channel: u8,
    pub ph_adc_channel: u8,
    pub ultrasonic_trigger_pin: u8,
    pub ultrasonic_echo_pin: u8,
    pub nutrient_pump_port: &'static str,
    pub ph_pump_port: &'static str,
}

impl Default for Wiring {
    fn default() -> Self {
        Self {
            tds_adc_channel: 0,
            ph_adc_channel: 1,
            ultrasonic_trigger_pin: 15,
            ultrasonic_echo_pin: 18,
            nutrient_pump_port: "/dev/ttyACM0",
            ph_pump_port: "/dev/ttyACM1",
        }
    }
}

/// Construct every peripheral. Any failure here is a fatal startup
/// fault; there is no degraded mode without a full sensor set.
pub fn build(wiring: &Wiring, calibration: &CalibrationParams) -> crate::Result<PiHardware> {
    info!("initializing sensors");
    let tds = TdsSensor::new(
        Mcp3008Channel::new(wiring.tds_adc_channel)?,
        calibration.tds_factor,
    );
    let ph = PhSensor::new(
        Mcp3008Channel::new(wiring.ph_adc_channel)?,
        calibration.ph_slope,
        calibration.ph_offset,
    );
    let temperature = TemperatureSensor::new(Ds18b20Probe::first()?);
    let level = LevelSensor::new(HcSr04::new(
        wiring.ultrasonic_trigger_pin,
        wiring.ultrasonic_echo_pin,
    )?);
    let sensors = SensorHub::new(tds, ph, temperature, level);

    info!("initializing pump controllers");
    let nutrient_link = SerialPumpLink::open(wiring.nutrient_pump_port)?;
    let ph_link = SerialPumpLink::open(wiring.ph_pump_port)?;

    Ok(HardwareAdapter::new(sensors, nutrient_link, ph_link))
}
