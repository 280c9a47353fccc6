use super::AlertEvent;
use crate::config::GuardianConfig;
use crate::power::PowerReading;

/// Maps a power reading to at most one alert. Pure and idempotent; holds
/// only the configured thresholds.
///
/// Rules are checked most-urgent first, so a reading that satisfies both the
/// full and high conditions yields the full alert.
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    full: u8,
    high: u8,
    low: u8,
}

impl ThresholdPolicy {
    pub fn new(cfg: &GuardianConfig) -> Self {
        Self {
            full: cfg.full_threshold,
            high: cfg.high_threshold,
            low: cfg.low_threshold,
        }
    }

    /// Evaluate one reading. Unknown percent or plugged state yields no
    /// event: the policy cannot act on what it does not know.
    pub fn evaluate(&self, reading: PowerReading) -> Option<AlertEvent> {
        let percent = reading.percent?;
        let plugged = reading.plugged?;

        if plugged && percent >= self.full {
            Some(AlertEvent::urgent(format!(
                "⚡ Battery is {percent}% - Unplug now!"
            )))
        } else if plugged && percent >= self.high {
            Some(AlertEvent::normal(format!(
                "⚡ Battery is {percent}% - Unplug the charger!"
            )))
        } else if !plugged && percent <= self.low {
            Some(AlertEvent::normal(format!(
                "🔋 Battery is {percent}% - Plug in soon!"
            )))
        } else {
            None
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(&GuardianConfig::default())
    }
}
