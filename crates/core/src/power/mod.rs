//! Battery state sensing.
//!
//! [`PowerSource`] is the seam between the monitor loop and the host: the
//! loop consumes a typed result instead of fishing readings out of swallowed
//! exceptions. [`sensor::BatterySensor`] is the production implementation.

pub mod sensor;

/// A best-effort snapshot of battery charge and AC state.
///
/// Either field is `None` when the host cannot answer. Produced fresh on
/// every sample; no identity, no mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerReading {
    /// Charge percentage, 0..=100.
    pub percent: Option<u8>,
    /// True when drawing AC power.
    pub plugged: Option<bool>,
}

impl PowerReading {
    pub fn new(percent: u8, plugged: bool) -> Self {
        Self {
            percent: Some(percent),
            plugged: Some(plugged),
        }
    }

    /// A reading with both fields unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.percent.is_none() && self.plugged.is_none()
    }
}

/// Queries the host battery state. Polled once per monitor tick.
pub trait PowerSource: Send {
    fn query(&mut self) -> Result<PowerReading, SensorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// No battery or no usable power backend on this host. Expected on some
    /// machines; callers log this at debug, never as an error.
    #[error("no usable power source implementation")]
    Unavailable,
    #[error("battery probe failed: {0}")]
    Probe(#[from] battery::Error),
    #[error("platform power query failed: {0}")]
    Platform(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reading() {
        let reading = PowerReading::unknown();
        assert!(reading.is_unknown());
        assert_eq!(reading.percent, None);
        assert_eq!(reading.plugged, None);
    }

    #[test]
    fn partial_reading_is_not_unknown() {
        let reading = PowerReading {
            percent: Some(50),
            plugged: None,
        };
        assert!(!reading.is_unknown());
    }

    #[test]
    fn readings_compare_by_value() {
        assert_eq!(PowerReading::new(80, true), PowerReading::new(80, true));
        assert_ne!(PowerReading::new(80, true), PowerReading::new(80, false));
        assert_ne!(PowerReading::new(80, true), PowerReading::unknown());
    }
}
