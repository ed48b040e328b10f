//! Ports - the hardware and network capabilities the core consumes
//!
//! These traits define the interface between the station logic and whatever
//! is wired to the MCU. Keep them simple - embedded HALs differ wildly and
//! every adapter should be a few lines.
//!
//! ## Port Overview
//!
//! - [`RegisterBus`]: register-addressed sensor bus (I2C or SPI)
//! - [`AnalogSampler`]: battery voltage ADC channel
//! - [`Network`]: wireless link plus HTTP request primitives
//! - [`Sender`]: one uplink transport; the transmission buffer only sees this
//! - [`ShutdownSignal`]: external interrupt observed between cycles
//!
//! The clock port lives in [`crate::time::Clock`].

use alloc::string::String;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{BusError, NodeResult};
use crate::record::BufferedEntry;

/// Register-addressed bus to the environmental sensor
///
/// `read` must support both single-byte reads (chip identity, dig_H1) and
/// the 8-byte burst read of the data block.
pub trait RegisterBus {
    /// Fill `buf` with consecutive registers starting at `register`
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write one byte to `register`
    fn write(&mut self, register: u8, value: u8) -> Result<(), BusError>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read(register, buf)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        (**self).write(register, value)
    }
}

/// One analog channel, full scale 0..=65535
pub trait AnalogSampler {
    /// Read the raw 16-bit conversion result
    fn read_u16(&mut self) -> NodeResult<u16>;
}

/// WiFi station credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credentials {
    /// Network name
    pub ssid: String,
    /// Pre-shared key
    pub password: String,
}

impl Credentials {
    /// Build credentials from anything string-like
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self { ssid: ssid.into(), password: password.into() }
    }
}

/// Status line and body of an HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Shorthand constructor
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Wireless link and the request primitives used by the uplink senders
///
/// `begin_connect` only starts association; the bounded wait lives in
/// [`crate::link::connect`] so every adapter gets the same timeout handling.
pub trait Network {
    /// Start associating with the given network
    fn begin_connect(&mut self, credentials: &Credentials);

    /// Whether the link is currently up
    fn is_connected(&self) -> bool;

    /// Drop the link and power the radio down
    fn disconnect(&mut self);

    /// Issue a GET request
    fn send_get(&mut self, url: &str) -> NodeResult<HttpResponse>;

    /// Issue a POST request with a body and extra headers
    fn send_post(
        &mut self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> NodeResult<HttpResponse>;
}

/// A single uplink transport
///
/// Implementations own their transport details (URL layout, encoding,
/// success status). The transmission buffer depends on nothing else.
pub trait Sender {
    /// Deliver one entry; any error leaves the entry buffered
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()>;

    /// Release the transport before the station sleeps (radio off, say)
    fn idle(&mut self) {}
}

impl<S: Sender + ?Sized> Sender for &mut S {
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()> {
        (**self).send(entry)
    }

    fn idle(&mut self) {
        (**self).idle()
    }
}

/// External request to stop the station, observed only between cycles
pub trait ShutdownSignal {
    /// True once shutdown has been requested
    fn requested(&self) -> bool;
}

impl ShutdownSignal for AtomicBool {
    fn requested(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: ShutdownSignal + ?Sized> ShutdownSignal for &T {
    fn requested(&self) -> bool {
        (**self).requested()
    }
}

/// Signal that never fires; for bounded test runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverShutdown;

impl ShutdownSignal for NeverShutdown {
    fn requested(&self) -> bool {
        false
    }
}
