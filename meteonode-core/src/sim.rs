//! Simulated hardware for tests, demos and bench runs
//!
//! Every port the station consumes has a double here:
//!
//! - [`SimBus`]: 256-byte register map preloaded with a BME280 identity,
//!   calibration and one raw sample; failure injection; write log
//! - [`SimAdc`]: battery at a fixed voltage behind the default divider
//! - [`SimClock`]: manual time; sleeping advances it instantly
//! - [`SimNetwork`]: scripted association and HTTP statuses; request log
//! - [`SimSender`]: uplink that is either up or down; delivery log
//!
//! The doubles keep the station loop deterministic, so cycle tests run in
//! microseconds and assert on exact timestamps.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::calibration::CalibrationCoefficients;
use crate::compensation::RawSample;
use crate::constants::power::{ADC_FULL_SCALE, ADC_REFERENCE_VOLTAGE_V, VOLTAGE_DIVIDER_RATIO};
use crate::constants::sensor::*;
use crate::errors::{BusError, NodeError, NodeResult};
use crate::ports::{AnalogSampler, Credentials, HttpResponse, Network, RegisterBus, Sender};
use crate::record::BufferedEntry;
use crate::time::{Clock, Timestamp};

/// Datasheet example trimming with typical humidity coefficients
pub const REFERENCE_CALIBRATION: CalibrationCoefficients = CalibrationCoefficients {
    dig_t1: 27504,
    dig_t2: 26435,
    dig_t3: -1000,
    dig_p1: 36477,
    dig_p2: -10685,
    dig_p3: 3024,
    dig_p4: 2855,
    dig_p5: 140,
    dig_p6: -7,
    dig_p7: 15500,
    dig_p8: -14600,
    dig_p9: 6000,
    dig_h1: 75,
    dig_h2: 362,
    dig_h3: 0,
    dig_h4: 313,
    dig_h5: 50,
    dig_h6: 30,
};

/// Raw sample giving 25.08 °C, 1006.53 hPa and 55.0 %RH with [`REFERENCE_CALIBRATION`]
pub const REFERENCE_SAMPLE: RawSample = RawSample {
    pressure: 415148,
    temperature: 519888,
    humidity: 30000,
};

/// Register-level BME280 double
#[derive(Debug, Clone)]
pub struct SimBus {
    registers: [u8; 256],
    writes: Vec<(u8, u8)>,
    reads: u32,
    failing_reads: u32,
    failing_writes: u32,
    fault: BusError,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new(&REFERENCE_CALIBRATION, REFERENCE_SAMPLE)
    }
}

impl SimBus {
    /// Healthy device with the given trimming and sample
    pub fn new(calibration: &CalibrationCoefficients, sample: RawSample) -> Self {
        let mut bus = Self {
            registers: [0; 256],
            writes: Vec::new(),
            reads: 0,
            failing_reads: 0,
            failing_writes: 0,
            fault: BusError::Nack,
        };
        bus.registers[REG_CHIP_ID as usize] = BME280_CHIP_ID;
        bus.set_calibration(calibration);
        bus.set_raw_sample(sample);
        bus
    }

    /// Encode trimming into the NVM registers
    pub fn set_calibration(&mut self, c: &CalibrationCoefficients) {
        let words: [u16; 12] = [
            c.dig_t1,
            c.dig_t2 as u16,
            c.dig_t3 as u16,
            c.dig_p1,
            c.dig_p2 as u16,
            c.dig_p3 as u16,
            c.dig_p4 as u16,
            c.dig_p5 as u16,
            c.dig_p6 as u16,
            c.dig_p7 as u16,
            c.dig_p8 as u16,
            c.dig_p9 as u16,
        ];
        let base = REG_CALIB_TP as usize;
        for (i, w) in words.iter().enumerate() {
            let [lo, hi] = w.to_le_bytes();
            self.registers[base + 2 * i] = lo;
            self.registers[base + 2 * i + 1] = hi;
        }

        self.registers[REG_CALIB_H1 as usize] = c.dig_h1;

        let [h2_lo, h2_hi] = c.dig_h2.to_le_bytes();
        let h = [
            h2_lo,
            h2_hi,
            c.dig_h3,
            (c.dig_h4 >> 4) as u8,
            ((c.dig_h4 & 0x0F) as u8) | (((c.dig_h5 & 0x0F) as u8) << 4),
            (c.dig_h5 >> 4) as u8,
            c.dig_h6 as u8,
        ];
        let base = REG_CALIB_H2 as usize;
        self.registers[base..base + CALIB_H_LEN].copy_from_slice(&h);
    }

    /// Place a raw sample in the data block
    pub fn set_raw_sample(&mut self, sample: RawSample) {
        let base = REG_DATA as usize;
        self.registers[base..base + DATA_BURST_LEN].copy_from_slice(&sample.to_burst());
    }

    /// Overwrite one register
    pub fn set_register(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;
    }

    /// Current register contents
    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    /// Fail the next `count` reads with `fault`
    pub fn fail_next_reads(&mut self, count: u32, fault: BusError) {
        self.failing_reads = count;
        self.fault = fault;
    }

    /// Fail the next `count` writes with `fault`
    pub fn fail_next_writes(&mut self, count: u32, fault: BusError) {
        self.failing_writes = count;
        self.fault = fault;
    }

    /// Stop injecting failures
    pub fn heal(&mut self) {
        self.failing_reads = 0;
        self.failing_writes = 0;
    }

    /// Every `(register, value)` written, in order
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Number of read transactions, failed ones included
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl RegisterBus for SimBus {
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.reads = self.reads.saturating_add(1);
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(self.fault);
        }

        let start = register as usize;
        let end = start + buf.len();
        let src = self
            .registers
            .get(start..end)
            .ok_or(BusError::Other("read past end of register map"))?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(self.fault);
        }

        self.writes.push((register, value));
        if register != REG_SOFT_RESET {
            self.registers[register as usize] = value;
        }
        Ok(())
    }
}

/// Battery ADC double behind the default 3.3 V / 2.0 divider
#[derive(Debug, Clone)]
pub struct SimAdc {
    voltage: f32,
    failing: u32,
    reads: u32,
}

impl SimAdc {
    /// Battery at `voltage`
    pub fn at_voltage(voltage: f32) -> Self {
        Self { voltage, failing: 0, reads: 0 }
    }

    /// Change the simulated battery voltage
    pub fn set_voltage(&mut self, voltage: f32) {
        self.voltage = voltage;
    }

    /// Fail the next `count` reads
    pub fn fail_next(&mut self, count: u32) {
        self.failing = count;
    }

    /// Number of conversions requested
    pub fn reads(&self) -> u32 {
        self.reads
    }

    /// Raw count for the current voltage
    pub fn raw(&self) -> u16 {
        let full_scale_v = ADC_REFERENCE_VOLTAGE_V * VOLTAGE_DIVIDER_RATIO;
        let counts = self.voltage / full_scale_v * ADC_FULL_SCALE + 0.5;
        if counts <= 0.0 {
            0
        } else if counts >= ADC_FULL_SCALE {
            u16::MAX
        } else {
            counts as u16
        }
    }
}

impl Default for SimAdc {
    fn default() -> Self {
        Self::at_voltage(3.9)
    }
}

impl AnalogSampler for SimAdc {
    fn read_u16(&mut self) -> NodeResult<u16> {
        self.reads = self.reads.saturating_add(1);
        if self.failing > 0 {
            self.failing -= 1;
            return Err(NodeError::Adc);
        }
        Ok(self.raw())
    }
}

/// Manual clock; `sleep_ms` advances time and is logged
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Timestamp,
    sleeps: Vec<u64>,
}

impl SimClock {
    /// Clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock at an arbitrary start time
    pub fn starting_at(now: Timestamp) -> Self {
        Self { now, sleeps: Vec::new() }
    }

    /// Move time forward without logging a sleep
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }

    /// Every sleep requested, in order
    pub fn sleeps(&self) -> &[u64] {
        &self.sleeps
    }

    /// Forget the sleep log
    pub fn clear_sleeps(&mut self) {
        self.sleeps.clear();
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> Timestamp {
        self.now
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
        self.advance(ms);
    }
}

/// One request seen by [`SimNetwork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRequest {
    /// `"GET"` or `"POST"`
    pub method: &'static str,
    /// Full URL
    pub url: String,
    /// Body (empty for GET)
    pub body: String,
    /// Extra headers
    pub headers: Vec<(String, String)>,
}

/// Scripted wireless link and HTTP endpoint
#[derive(Debug, Clone)]
pub struct SimNetwork {
    connected: Cell<bool>,
    pending_polls: Cell<Option<u32>>,
    associate_after: Option<u32>,
    default_status: u16,
    script: VecDeque<NodeResult<u16>>,
    requests: Vec<SimRequest>,
    connect_attempts: u32,
    disconnects: u32,
}

impl SimNetwork {
    fn with_link(connected: bool, associate_after: Option<u32>) -> Self {
        Self {
            connected: Cell::new(connected),
            pending_polls: Cell::new(None),
            associate_after,
            default_status: 200,
            script: VecDeque::new(),
            requests: Vec::new(),
            connect_attempts: 0,
            disconnects: 0,
        }
    }

    /// Link up and re-associating instantly after a disconnect
    pub fn online() -> Self {
        Self::with_link(true, Some(0))
    }

    /// Link down; association never completes
    pub fn offline() -> Self {
        Self::with_link(false, None)
    }

    /// Association completes after `polls` negative status checks
    pub fn associate_after_polls(mut self, polls: u32) -> Self {
        self.associate_after = Some(polls);
        self
    }

    /// Switch between [`SimNetwork::online`] and [`SimNetwork::offline`] behaviour
    pub fn set_online(&mut self, online: bool) {
        self.connected.set(online);
        self.pending_polls.set(None);
        self.associate_after = if online { Some(0) } else { None };
    }

    /// Status for requests not covered by the script
    pub fn respond_with(&mut self, status: u16) {
        self.default_status = status;
    }

    /// Queue the outcome of the next request
    pub fn queue_response(&mut self, outcome: NodeResult<u16>) {
        self.script.push_back(outcome);
    }

    /// Every request delivered to the endpoint
    pub fn requests(&self) -> &[SimRequest] {
        &self.requests
    }

    /// `begin_connect` calls
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// `disconnect` calls
    pub fn disconnects(&self) -> u32 {
        self.disconnects
    }

    fn respond(&mut self, request: SimRequest) -> NodeResult<HttpResponse> {
        if !self.connected.get() {
            return Err(NodeError::NotConnected);
        }
        self.requests.push(request);
        let status = self.script.pop_front().unwrap_or(Ok(self.default_status))?;
        Ok(HttpResponse::new(status, ""))
    }
}

impl Default for SimNetwork {
    fn default() -> Self {
        Self::online()
    }
}

impl Network for SimNetwork {
    fn begin_connect(&mut self, _credentials: &Credentials) {
        self.connect_attempts = self.connect_attempts.saturating_add(1);
        match self.associate_after {
            Some(0) => self.connected.set(true),
            Some(polls) => self.pending_polls.set(Some(polls)),
            None => {}
        }
    }

    fn is_connected(&self) -> bool {
        if self.connected.get() {
            return true;
        }
        match self.pending_polls.get() {
            Some(0) => {
                self.pending_polls.set(None);
                self.connected.set(true);
                true
            }
            Some(left) => {
                self.pending_polls.set(Some(left - 1));
                false
            }
            None => false,
        }
    }

    fn disconnect(&mut self) {
        self.connected.set(false);
        self.pending_polls.set(None);
        self.disconnects = self.disconnects.saturating_add(1);
    }

    fn send_get(&mut self, url: &str) -> NodeResult<HttpResponse> {
        self.respond(SimRequest {
            method: "GET",
            url: String::from(url),
            body: String::new(),
            headers: Vec::new(),
        })
    }

    fn send_post(
        &mut self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> NodeResult<HttpResponse> {
        self.respond(SimRequest {
            method: "POST",
            url: String::from(url),
            body: String::from(body),
            headers: headers
                .iter()
                .map(|(k, v)| (String::from(*k), String::from(*v)))
                .collect(),
        })
    }
}

/// Transport-free uplink double
#[derive(Debug, Clone, Default)]
pub struct SimSender {
    online: bool,
    attempts: u32,
    idles: u32,
    delivered: Vec<BufferedEntry>,
}

impl SimSender {
    /// Uplink that accepts everything
    pub fn online() -> Self {
        Self { online: true, ..Self::default() }
    }

    /// Uplink that refuses everything with `NotConnected`
    pub fn offline() -> Self {
        Self::default()
    }

    /// Bring the uplink up or down
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Entries accepted, in delivery order
    pub fn delivered(&self) -> &[BufferedEntry] {
        &self.delivered
    }

    /// Send calls, failed ones included
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `idle` calls
    pub fn idles(&self) -> u32 {
        self.idles
    }
}

impl Sender for SimSender {
    fn send(&mut self, entry: &BufferedEntry) -> NodeResult<()> {
        self.attempts = self.attempts.saturating_add(1);
        if !self.online {
            return Err(NodeError::NotConnected);
        }
        self.delivered.push(*entry);
        Ok(())
    }

    fn idle(&mut self) {
        self.idles = self.idles.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_registers_round_trip() {
        let bus = SimBus::default();
        let mut tp = [0u8; CALIB_TP_LEN];
        tp.copy_from_slice(&bus.registers[0x88..0x88 + CALIB_TP_LEN]);
        let mut h = [0u8; CALIB_H_LEN];
        h.copy_from_slice(&bus.registers[0xE1..0xE1 + CALIB_H_LEN]);

        let decoded = CalibrationCoefficients::from_registers(&tp, bus.register(REG_CALIB_H1), &h);
        assert_eq!(decoded, REFERENCE_CALIBRATION);
    }

    #[test]
    fn negative_humidity_coefficients_round_trip() {
        let calib = CalibrationCoefficients { dig_h4: -1, dig_h5: -2048, dig_h6: -10, ..REFERENCE_CALIBRATION };
        let bus = SimBus::new(&calib, REFERENCE_SAMPLE);
        let mut h = [0u8; CALIB_H_LEN];
        h.copy_from_slice(&bus.registers[0xE1..0xE1 + CALIB_H_LEN]);

        let decoded = CalibrationCoefficients::from_registers(&[0; CALIB_TP_LEN], 0, &h);
        assert_eq!((decoded.dig_h4, decoded.dig_h5, decoded.dig_h6), (-1, -2048, -10));
    }

    #[test]
    fn adc_counts_for_voltage() {
        assert_eq!(SimAdc::at_voltage(0.0).raw(), 0);
        assert_eq!(SimAdc::at_voltage(6.6).raw(), u16::MAX);
        assert_eq!(SimAdc::at_voltage(3.3).raw(), 32768);
    }

    #[test]
    fn offline_network_refuses_requests() {
        let mut net = SimNetwork::offline();
        assert_eq!(net.send_get("http://x").unwrap_err(), NodeError::NotConnected);
        assert!(net.requests().is_empty());
    }

    #[test]
    fn scripted_statuses_then_default() {
        let mut net = SimNetwork::online();
        net.queue_response(Ok(500));
        net.queue_response(Err(NodeError::Transport { reason: "reset" }));

        assert_eq!(net.send_get("u").unwrap().status, 500);
        assert!(net.send_get("u").is_err());
        assert_eq!(net.send_get("u").unwrap().status, 200);
        assert_eq!(net.requests().len(), 3);
    }
}
