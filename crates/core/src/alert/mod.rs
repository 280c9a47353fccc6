//! Alert types and the sink seam.
//!
//! The monitor loop produces [`AlertEvent`]s through the threshold policy
//! and hands them to a single [`AlertSink`]; platform frontends vary behind
//! that interface (notification + sound on the desktop, plain recording in
//! tests).

pub mod detector;
pub mod policy;

/// One user-facing alert. Produced by the threshold policy, consumed exactly
/// once per qualifying state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub message: String,
    pub urgent: bool,
}

impl AlertEvent {
    pub fn normal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            urgent: false,
        }
    }

    pub fn urgent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            urgent: true,
        }
    }
}

/// Delivers an alert to the user. Best-effort: the monitor loop logs
/// failures and carries on; a failed dispatch still counts as attempted.
pub trait AlertSink: Send + Sync {
    fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("notification delivery failed: {0}")]
    Notification(String),
    #[error("sound playback failed: {0}")]
    Sound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_constructors() {
        let event = AlertEvent::normal("plug in soon");
        assert_eq!(event.message, "plug in soon");
        assert!(!event.urgent);

        let event = AlertEvent::urgent("unplug now");
        assert!(event.urgent);
    }
}
