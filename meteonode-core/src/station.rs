//! Station Orchestrator
//!
//! ## Cycle State Machine
//!
//! ```text
//!            ┌────────────────────────────────────────────────────┐
//!            ▼                                                    │
//!  Init ──► Read ──► Compensate ──► Annotate ──► Transmit ──► Sleep
//!            │                                                    ▲
//!            └─ failure ─► ErrorCount ─┬────────────────────────┤
//!                                      └─ ≥ threshold ─► ResetAttempt
//!
//!  shutdown requested (cycle start / after sleep) ──► Shutdown (one drain)
//! ```
//!
//! ## Session State
//!
//! Counters and timestamps live in an explicit [`StationSession`] owned by
//! the [`Station`] rather than in globals, so a cycle can be driven from a
//! test with simulated hardware and asserted on exactly.
//!
//! ## Invariants
//!
//! - The fine temperature produced by compensation lives inside one
//!   [`CompensatedReading`] and is dropped at the end of the cycle.
//! - The battery is read after every successful compensation, regardless of
//!   how earlier cycles went.
//! - The sleep duration is recomputed every cycle from a fresh battery
//!   sample; nothing is cached.
//! - A cycle in flight is never aborted; shutdown is only observed between
//!   cycles.

use crate::battery::{BatteryMonitor, BatteryStatus};
use crate::compensation::CompensatedReading;
use crate::config::{ConfigError, NodeConfig};
use crate::constants::power::FAILED_RESET_SLEEP_MULTIPLIER;
use crate::constants::time::MS_PER_SECOND;
use crate::constants::DEFAULT_BUFFER_CAPACITY;
use crate::derived::{dew_point, sea_level_pressure};
use crate::errors::{NodeError, NodeResult};
use crate::plausibility::check_reading;
use crate::ports::{AnalogSampler, RegisterBus, Sender, ShutdownSignal};
use crate::record::{RecordCounters, StationRecord};
use crate::sensor::Bme280;
use crate::time::{elapsed_ms, whole_seconds, Clock, Timestamp};
use crate::transmit::{SendOutcome, TransmissionBuffer};

/// Where the station is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Constructed or initializing
    Init,
    /// Burst-reading the sensor
    Read,
    /// Converting raw values
    Compensate,
    /// Attaching battery status and derived values
    Annotate,
    /// Sending or buffering
    Transmit,
    /// Suspended between cycles
    Sleep,
    /// Recording a failed read
    ErrorCount,
    /// Soft-resetting the sensor
    ResetAttempt,
    /// Final drain; terminal
    Shutdown,
}

/// Counters and timestamps for one station run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StationSession {
    /// Successful reads
    pub reading_count: u32,
    /// Failed reads since start
    pub error_count: u32,
    /// Failed reads since the last success or sensor reset
    pub consecutive_failures: u32,
    /// Sensor resets attempted
    pub resets: u32,
    /// Station clock at `init`
    pub startup_ms: Timestamp,
    /// Station clock at the last successful read
    pub last_read_ms: Option<Timestamp>,
}

impl StationSession {
    /// Whole seconds since `init`
    pub fn uptime_s(&self, now: Timestamp) -> u64 {
        whole_seconds(elapsed_ms(self.startup_ms, now))
    }
}

/// What a cycle did with its reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Read and delivered
    Transmitted(StationRecord),
    /// Read, delivery failed, record buffered
    Buffered(StationRecord, NodeError),
    /// No reading this cycle
    ReadFailed(NodeError),
}

/// Result of [`Station::run_cycle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Reading outcome
    pub outcome: CycleOutcome,
    /// Sleep decided for this cycle, in seconds
    pub sleep_s: u32,
    /// Outcome of a sensor reset, if one was attempted
    pub reset: Option<NodeResult<()>>,
}

/// Result of [`Station::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles completed
    pub cycles: u32,
    /// Buffered entries delivered by the shutdown drain
    pub drained: usize,
    /// Entries still buffered at exit
    pub remaining: usize,
}

/// Component health snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// A fresh sensor read
    pub sensor: NodeResult<CompensatedReading>,
    /// A fresh battery read
    pub battery: NodeResult<BatteryStatus>,
    /// Entries waiting in the buffer
    pub buffered: usize,
    /// Failed sends since the last success
    pub transmit_failures: u32,
    /// Session counters
    pub session: StationSession,
}

/// The weather node: sensor, battery, uplink and clock under one owner
pub struct Station<B, A, S, C, const N: usize = DEFAULT_BUFFER_CAPACITY>
where
    B: RegisterBus,
    A: AnalogSampler,
    S: Sender,
    C: Clock,
{
    sensor: Bme280<B>,
    battery: BatteryMonitor<A>,
    buffer: TransmissionBuffer<N>,
    sender: S,
    clock: C,
    config: NodeConfig,
    session: StationSession,
    phase: CyclePhase,
}

impl<B, A, S, C, const N: usize> Station<B, A, S, C, N>
where
    B: RegisterBus,
    A: AnalogSampler,
    S: Sender,
    C: Clock,
{
    /// Assemble a station; touches no hardware
    ///
    /// The configuration is validated first: misordered battery thresholds
    /// would put the charge percentage outside 0..=100.
    pub fn new(bus: B, adc: A, sender: S, clock: C, config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let battery = BatteryMonitor::new(adc, config.battery);
        Ok(Self {
            sensor: Bme280::new(bus),
            battery,
            buffer: TransmissionBuffer::new(),
            sender,
            clock,
            config,
            session: StationSession::default(),
            phase: CyclePhase::Init,
        })
    }

    /// Start the session clock and bring the sensor up
    ///
    /// A failed sensor init is returned but not fatal: reads fail until the
    /// reset threshold triggers a re-initialization.
    pub fn init(&mut self) -> NodeResult<()> {
        self.phase = CyclePhase::Init;
        self.session.startup_ms = self.clock.now_ms();

        node_info!(
            "Station '{}' starting, interval {} s",
            self.config.station.name,
            self.config.sampling.read_interval_s
        );

        let result = self.sensor.init(&mut self.clock);
        if let Err(_e) = &result {
            node_warn!("Sensor init failed: {}", _e);
        }
        result
    }

    /// Read, check, offset, derive and annotate one record
    ///
    /// Failures are counted in the session before being returned.
    pub fn acquire_reading(&mut self) -> NodeResult<StationRecord> {
        match self.try_acquire() {
            Ok(record) => {
                self.session.reading_count = self.session.reading_count.saturating_add(1);
                self.session.consecutive_failures = 0;
                self.session.last_read_ms = Some(self.clock.now_ms());
                Ok(record)
            }
            Err(e) => {
                self.phase = CyclePhase::ErrorCount;
                self.session.error_count = self.session.error_count.saturating_add(1);
                self.session.consecutive_failures = self.session.consecutive_failures.saturating_add(1);
                node_warn!(
                    "Sensor read failed ({}), {} consecutive",
                    e,
                    self.session.consecutive_failures
                );
                Err(e)
            }
        }
    }

    fn try_acquire(&mut self) -> NodeResult<StationRecord> {
        self.phase = CyclePhase::Read;
        let reading = self.sensor.read()?;

        self.phase = CyclePhase::Compensate;
        check_reading(&reading)?;
        let adjusted = self.apply_offsets(reading);
        let dew = dew_point(adjusted.temperature, adjusted.humidity);
        let sea_level = sea_level_pressure(adjusted.pressure, self.config.station.elevation_m);

        self.phase = CyclePhase::Annotate;
        let battery = self.battery.status()?;

        let counters = RecordCounters {
            reading_count: self.session.reading_count,
            error_count: self.session.error_count,
            uptime_s: self.session.uptime_s(self.clock.now_ms()),
        };
        let record = StationRecord::new(&adjusted, dew, sea_level, &battery, counters);

        node_debug!(
            "Reading #{}: {} °C, {} %RH, {} hPa, battery {} V ({})",
            record.reading_count,
            record.temperature,
            record.humidity,
            record.pressure,
            record.battery_voltage,
            record.battery_state
        );
        Ok(record)
    }

    fn apply_offsets(&self, reading: CompensatedReading) -> CompensatedReading {
        let offsets = &self.config.offsets;
        let mut adjusted = reading;
        adjusted.temperature += offsets.temperature;
        adjusted.pressure += offsets.pressure;
        adjusted.humidity = (adjusted.humidity + offsets.humidity).clamp(0.0, 100.0);
        adjusted
    }

    /// Fresh battery status
    pub fn battery_status(&mut self) -> NodeResult<BatteryStatus> {
        self.battery.status()
    }

    /// Drain the backlog, then send `record` or buffer it
    pub fn transmit(&mut self, record: StationRecord) -> SendOutcome {
        self.phase = CyclePhase::Transmit;
        let now = self.clock.now_ms();
        self.buffer.send_or_buffer(record, now, &mut self.sender)
    }

    /// Offer every buffered entry to the sender; returns how many went out
    pub fn flush(&mut self) -> usize {
        self.buffer.flush(&mut self.sender)
    }

    /// One full cycle up to, but not including, the sleep
    pub fn run_cycle(&mut self) -> CycleReport {
        let outcome = match self.acquire_reading() {
            Ok(record) => match self.transmit(record) {
                SendOutcome::Sent => CycleOutcome::Transmitted(record),
                SendOutcome::Buffered(e) => CycleOutcome::Buffered(record, e),
            },
            Err(e) => CycleOutcome::ReadFailed(e),
        };

        let mut sleep_s = self.battery.suggested_sleep_seconds(self.config.sampling.read_interval_s);

        let mut reset = None;
        if self.session.consecutive_failures >= self.config.sampling.max_read_failures {
            let result = self.reset_sensor();
            if result.is_err() {
                sleep_s = sleep_s.saturating_mul(FAILED_RESET_SLEEP_MULTIPLIER);
            }
            reset = Some(result);
        }

        CycleReport { outcome, sleep_s, reset }
    }

    fn reset_sensor(&mut self) -> NodeResult<()> {
        self.phase = CyclePhase::ResetAttempt;
        self.session.resets = self.session.resets.saturating_add(1);
        node_warn!(
            "Too many sensor failures ({}), attempting reset",
            self.session.consecutive_failures
        );

        match self.sensor.soft_reset(&mut self.clock) {
            Ok(()) => {
                node_info!("Sensor reset succeeded");
                self.session.consecutive_failures = 0;
                Ok(())
            }
            Err(e) => {
                node_warn!("Sensor reset failed ({}), extending sleep", e);
                Err(e)
            }
        }
    }

    /// Idle the uplink and suspend for `secs`
    pub fn sleep(&mut self, secs: u32) {
        self.phase = CyclePhase::Sleep;
        node_debug!("Sleeping {} s", secs);
        self.sender.idle();
        self.clock.sleep_ms(secs as u64 * MS_PER_SECOND);
    }

    /// Run cycles until `signal` fires, then drain once and stop
    pub fn run<Sig: ShutdownSignal + ?Sized>(&mut self, signal: &Sig) -> RunSummary {
        let mut cycles = 0u32;

        // checked at cycle start, which is also right after each sleep
        while !signal.requested() {
            let report = self.run_cycle();
            cycles = cycles.saturating_add(1);
            self.sleep(report.sleep_s);
        }

        let drained = self.shutdown();
        RunSummary { cycles, drained, remaining: self.buffer.len() }
    }

    /// One best-effort drain, then release the uplink
    pub fn shutdown(&mut self) -> usize {
        self.phase = CyclePhase::Shutdown;
        node_info!("Shutdown requested, {} entries buffered", self.buffer.len());

        let drained = if self.buffer.is_empty() { 0 } else { self.flush() };
        self.sender.idle();
        drained
    }

    /// Read every component without touching the session counters
    pub fn diagnostics(&mut self) -> Diagnostics {
        Diagnostics {
            sensor: self.sensor.read(),
            battery: self.battery.status(),
            buffered: self.buffer.len(),
            transmit_failures: self.buffer.consecutive_failures(),
            session: self.session,
        }
    }

    /// Session counters
    pub fn session(&self) -> &StationSession {
        &self.session
    }

    /// Current phase
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Transmission buffer
    pub fn buffer(&self) -> &TransmissionBuffer<N> {
        &self.buffer
    }

    /// Active configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The sensor driver
    pub fn sensor_mut(&mut self) -> &mut Bme280<B> {
        &mut self.sensor
    }

    /// The battery monitor
    pub fn battery_mut(&mut self) -> &mut BatteryMonitor<A> {
        &mut self.battery
    }

    /// The uplink
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// The uplink, mutably
    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    /// The clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The clock, mutably
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::battery::BatteryState;
    use crate::errors::BusError;
    use crate::sim::{SimAdc, SimBus, SimClock, SimSender};

    type TestStation = Station<SimBus, SimAdc, SimSender, SimClock, 8>;

    fn station(volts: f32) -> TestStation {
        let mut s = Station::new(
            SimBus::default(),
            SimAdc::at_voltage(volts),
            SimSender::online(),
            SimClock::new(),
            NodeConfig::default(),
        )
        .unwrap();
        s.init().unwrap();
        s
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = NodeConfig::default();
        config.battery.critical_voltage = 4.5;

        let result: Result<TestStation, _> = Station::new(
            SimBus::default(),
            SimAdc::default(),
            SimSender::online(),
            SimClock::new(),
            config,
        );
        assert!(matches!(result, Err(ConfigError::ThresholdOrder)));
    }

    #[test]
    fn successful_cycle_transmits() {
        let mut s = station(3.9);
        let report = s.run_cycle();

        let CycleOutcome::Transmitted(record) = report.outcome else {
            panic!("expected transmission, got {:?}", report.outcome);
        };
        assert_eq!(record.temperature, 25.08);
        assert_eq!(record.pressure, 1006.53);
        assert_eq!(record.reading_count, 0);
        assert_eq!(record.battery_state, BatteryState::Normal);
        assert_eq!(report.sleep_s, 300);
        assert_eq!(s.session().reading_count, 1);
        assert_eq!(s.sender().delivered().len(), 1);
    }

    #[test]
    fn offline_cycle_buffers() {
        let mut s = station(3.9);
        s.sender_mut().set_online(false);

        let report = s.run_cycle();
        assert!(matches!(report.outcome, CycleOutcome::Buffered(_, NodeError::NotConnected)));
        assert_eq!(s.buffer().len(), 1);
    }

    #[test]
    fn low_battery_doubles_sleep() {
        assert_eq!(station(3.2).run_cycle().sleep_s, 600);
        assert_eq!(station(2.9).run_cycle().sleep_s, 1200);
    }

    #[test]
    fn reset_after_threshold() {
        let mut s = station(3.9);
        s.sensor_mut().bus_mut().fail_next_reads(5, BusError::Nack);

        for _ in 0..4 {
            let report = s.run_cycle();
            assert!(matches!(report.outcome, CycleOutcome::ReadFailed(_)));
            assert!(report.reset.is_none());
        }
        let report = s.run_cycle();
        assert_eq!(report.reset, Some(Ok(())));
        assert_eq!(report.sleep_s, 300);
        assert_eq!(s.session().consecutive_failures, 0);
        assert_eq!(s.session().error_count, 5);
        assert_eq!(s.session().resets, 1);

        assert!(matches!(s.run_cycle().outcome, CycleOutcome::Transmitted(_)));
    }

    #[test]
    fn failed_reset_doubles_sleep() {
        let mut s = station(3.9).with_threshold(1);
        s.sensor_mut().bus_mut().fail_next_reads(1, BusError::Nack);
        s.sensor_mut().bus_mut().fail_next_writes(1, BusError::Interrupted);

        let report = s.run_cycle();
        assert!(matches!(report.reset, Some(Err(NodeError::Bus { .. }))));
        assert_eq!(report.sleep_s, 600);
    }

    #[test]
    fn sleep_idles_uplink_and_advances_clock() {
        let mut s = station(3.9);
        let before = s.clock().now_ms();
        s.sleep(300);
        assert_eq!(s.clock().now_ms() - before, 300_000);
        assert_eq!(s.phase(), CyclePhase::Sleep);
        assert_eq!(s.sender().idles(), 1);
    }

    impl TestStation {
        fn with_threshold(mut self, failures: u32) -> Self {
            self.config.sampling.max_read_failures = failures;
            self
        }
    }
}
