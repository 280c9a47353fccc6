//! Desktop alert delivery: an auto-dismissing notification plus a sound
//! cue per dispatch.

use notify_rust::{Notification, Timeout};

use guardian_core::alert::{AlertEvent, AlertSink, SinkError};

use crate::sound;

const NOTIFICATION_SUMMARY: &str = "Battery Alert!";
const NOTIFICATION_TIMEOUT_MS: u32 = 10_000;

pub struct DesktopSink;

impl DesktopSink {
    /// Show a plain informational notification, outside the alert path
    /// (used by the tray's Show command).
    pub fn announce(title: &str, body: &str) {
        if let Err(e) = Notification::new().summary(title).body(body).show() {
            tracing::warn!(error = %e, "status notification failed");
        }
    }
}

impl AlertSink for DesktopSink {
    fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError> {
        // Sound first, then the toast, matching the original cadence. Both
        // are attempted even if the first fails.
        let cue = sound::play(event.urgent);

        let mut toast = Notification::new();
        toast
            .summary(NOTIFICATION_SUMMARY)
            .body(&event.message)
            .timeout(Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS));
        #[cfg(all(unix, not(target_os = "macos")))]
        toast.urgency(if event.urgent {
            notify_rust::Urgency::Critical
        } else {
            notify_rust::Urgency::Normal
        });
        toast
            .show()
            .map_err(|e| SinkError::Notification(e.to_string()))?;

        cue
    }
}
