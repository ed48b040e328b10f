//! Error Types for the Station Core
//!
//! ## Design Philosophy
//!
//! Station errors follow the same rules as every other value that crosses a
//! cycle boundary on a small MCU:
//!
//! 1. **Small Size**: variants carry a few scalars and `&'static str` reasons,
//!    never owned strings, so an error can sit in a stats struct for free.
//!
//! 2. **Copy Semantics**: errors are returned from the hot read/transmit path
//!    and matched by the orchestrator without move gymnastics.
//!
//! 3. **Classified, not fatal**: every variant maps onto an [`ErrorKind`].
//!    Nothing in the core is unrecoverable; calibration can be reloaded and
//!    the rolling voltage window rebuilt from scratch.
//!
//! ## Error Kinds
//!
//! ### Transient
//! - `Bus`: register read/write failed on the sensor bus
//! - `ChipIdMismatch`: something answered, but it is not a BME280
//! - `NotInitialized`: read attempted before calibration was loaded
//! - `Adc`: battery sampler failed
//! - `Implausible`: reading outside the sensor envelope (or zero pressure)
//!
//! ### Connectivity
//! - `ConnectTimeout`, `NotConnected`, `Transport`, `Rejected`, `Serialization`
//!
//! Connectivity errors never lose data: the transmission buffer keeps the
//! reading and retries on the next cycle.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use meteonode_core::{ErrorKind, NodeError};
//!
//! fn on_failure(err: NodeError, consecutive: &mut u32) {
//!     match err.kind() {
//!         ErrorKind::Transient => {
//!             // count it; the station resets the sensor at the threshold
//!             *consecutive += 1;
//!         }
//!         ErrorKind::Connectivity => {
//!             // reading is already buffered, nothing to escalate
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for station operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Failure class used by the orchestrator to decide on escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local hardware hiccup; retried with a counter, reset at a threshold
    Transient,
    /// Link or uplink trouble; always results in buffering
    Connectivity,
}

/// Low-level register bus failure reported by a [`crate::ports::RegisterBus`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No device acknowledged the address
    #[error("device did not acknowledge")]
    Nack,

    /// Transfer started but did not complete
    #[error("bus transfer interrupted")]
    Interrupted,

    /// Anything else the HAL reports
    #[error("bus fault: {0}")]
    Other(&'static str),
}

/// Station errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NodeError {
    /// Register access on the sensor bus failed
    #[error("bus error at register {register:#04x}: {reason}")]
    Bus {
        /// Register that was being accessed
        register: u8,
        /// Underlying bus failure
        reason: BusError,
    },

    /// Chip identity register did not hold the expected value
    #[error("chip id {found:#04x}, expected {expected:#04x}")]
    ChipIdMismatch {
        /// Value read from the identity register
        found: u8,
        /// Value a BME280 reports
        expected: u8,
    },

    /// Sensor used before calibration was loaded
    #[error("sensor not initialized")]
    NotInitialized,

    /// Analog sampler failed to produce a value
    #[error("battery ADC read failed")]
    Adc,

    /// Compensated reading is physically implausible
    #[error("implausible reading: {reason}")]
    Implausible {
        /// What was wrong with it
        reason: &'static str,
    },

    /// Wireless link did not come up in time
    #[error("connect timed out after {waited_ms} ms")]
    ConnectTimeout {
        /// How long the link was polled
        waited_ms: u64,
    },

    /// Send attempted without a link
    #[error("not connected")]
    NotConnected,

    /// Request could not be delivered
    #[error("transport failure: {reason}")]
    Transport {
        /// Transport-level description
        reason: &'static str,
    },

    /// Endpoint answered with a non-success status
    #[error("endpoint rejected upload with status {status}")]
    Rejected {
        /// HTTP status code returned
        status: u16,
    },

    /// Payload could not be encoded
    #[error("payload serialization failed")]
    Serialization,
}

impl NodeError {
    /// Classify the error for escalation decisions
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Bus { .. }
            | Self::ChipIdMismatch { .. }
            | Self::NotInitialized
            | Self::Adc
            | Self::Implausible { .. } => ErrorKind::Transient,
            Self::ConnectTimeout { .. }
            | Self::NotConnected
            | Self::Transport { .. }
            | Self::Rejected { .. }
            | Self::Serialization => ErrorKind::Connectivity,
        }
    }

    /// The link itself is down, so further sends this cycle cannot succeed
    ///
    /// An HTTP rejection or an encoding failure concerns one payload only.
    pub fn is_link_down(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout { .. } | Self::NotConnected | Self::Transport { .. }
        )
    }

    /// Shorthand for wrapping a bus failure with the register it hit
    pub fn bus(register: u8, reason: BusError) -> Self {
        Self::Bus { register, reason }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus { register, .. } =>
                defmt::write!(fmt, "Bus error at {=u8:#x}", register),
            Self::ChipIdMismatch { found, expected } =>
                defmt::write!(fmt, "Chip id {=u8:#x}, expected {=u8:#x}", found, expected),
            Self::NotInitialized =>
                defmt::write!(fmt, "Sensor not initialized"),
            Self::Adc =>
                defmt::write!(fmt, "ADC read failed"),
            Self::Implausible { reason } =>
                defmt::write!(fmt, "Implausible: {}", reason),
            Self::ConnectTimeout { waited_ms } =>
                defmt::write!(fmt, "Connect timeout after {} ms", waited_ms),
            Self::NotConnected =>
                defmt::write!(fmt, "Not connected"),
            Self::Transport { reason } =>
                defmt::write!(fmt, "Transport: {}", reason),
            Self::Rejected { status } =>
                defmt::write!(fmt, "Rejected with {}", status),
            Self::Serialization =>
                defmt::write!(fmt, "Serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_side_errors_are_transient() {
        assert_eq!(NodeError::bus(0xF7, BusError::Nack).kind(), ErrorKind::Transient);
        assert_eq!(
            NodeError::ChipIdMismatch { found: 0x58, expected: 0x60 }.kind(),
            ErrorKind::Transient
        );
        assert_eq!(NodeError::Adc.kind(), ErrorKind::Transient);
    }

    #[test]
    fn uplink_errors_are_connectivity() {
        assert_eq!(NodeError::ConnectTimeout { waited_ms: 30_000 }.kind(), ErrorKind::Connectivity);
        assert_eq!(NodeError::Rejected { status: 500 }.kind(), ErrorKind::Connectivity);
        assert_eq!(NodeError::NotConnected.kind(), ErrorKind::Connectivity);
    }

    #[test]
    fn only_link_failures_count_as_link_down() {
        assert!(NodeError::ConnectTimeout { waited_ms: 30_000 }.is_link_down());
        assert!(NodeError::NotConnected.is_link_down());
        assert!(NodeError::Transport { reason: "reset" }.is_link_down());
        assert!(!NodeError::Rejected { status: 503 }.is_link_down());
        assert!(!NodeError::Serialization.is_link_down());
        assert!(!NodeError::Adc.is_link_down());
    }

    #[test]
    fn display_names_the_register() {
        let msg = std::format!("{}", NodeError::bus(0xD0, BusError::Nack));
        assert!(msg.contains("0xd0"));
    }
}
