use crate::power::PowerReading;

/// The sole anti-spam gate. Remembers the last sample and reports whether a
/// new one differs in percent or plugged state.
///
/// Only raw readings are compared, never policy output: an unchanged reading
/// that still satisfies an alert condition stays suppressed, while a changed
/// reading is re-evaluated even when the previous alert was suppressed or
/// identical in spirit. A toggle between unknown and a concrete reading
/// counts as a change; the policy still declines unknown fields.
#[derive(Debug, Default)]
pub struct StateChangeDetector {
    last_reading: Option<PowerReading>,
}

impl StateChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and report whether it differs from the previous
    /// sample. The first sample always counts as a change.
    pub fn observe(&mut self, current: PowerReading) -> bool {
        let changed = self.last_reading != Some(current);
        self.last_reading = Some(current);
        changed
    }

    pub fn last_reading(&self) -> Option<PowerReading> {
        self.last_reading
    }
}
