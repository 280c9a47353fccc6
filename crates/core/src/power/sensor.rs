//! Production battery probe: the portable `battery` crate first, then a
//! platform power-status call when the portable backend has nothing to say.

use super::{PowerReading, PowerSource, SensorError};

/// Samples the first battery reported by the portable backend and falls back
/// to a platform-specific power-status query when that backend reports no
/// usable device. Fallback misses are an expected condition on some hosts
/// and are never logged as errors.
pub struct BatterySensor {
    manager: Option<battery::Manager>,
}

impl BatterySensor {
    pub fn new() -> Self {
        let manager = match battery::Manager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                tracing::debug!(error = %e, "portable battery backend unavailable");
                None
            }
        };
        Self { manager }
    }

    fn query_portable(&self) -> Result<PowerReading, SensorError> {
        let manager = self.manager.as_ref().ok_or(SensorError::Unavailable)?;
        let battery = manager
            .batteries()?
            .next()
            .ok_or(SensorError::Unavailable)??;

        let percent = (battery.state_of_charge().value * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8;
        // The portable backend reports charge flow, not the AC line itself;
        // charging or full implies the charger is attached.
        let plugged = match battery.state() {
            battery::State::Charging | battery::State::Full => Some(true),
            battery::State::Discharging | battery::State::Empty => Some(false),
            _ => None,
        };

        Ok(PowerReading {
            percent: Some(percent),
            plugged,
        })
    }
}

impl Default for BatterySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for BatterySensor {
    fn query(&mut self) -> Result<PowerReading, SensorError> {
        match self.query_portable() {
            Ok(reading) => Ok(reading),
            Err(SensorError::Unavailable) => {
                tracing::debug!("portable probe found no battery, trying platform fallback");
                platform::query()
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(windows)]
mod platform {
    use super::{PowerReading, SensorError};
    use windows::Win32::System::Power::{GetSystemPowerStatus, SYSTEM_POWER_STATUS};

    pub(super) fn query() -> Result<PowerReading, SensorError> {
        let mut status = SYSTEM_POWER_STATUS::default();
        unsafe { GetSystemPowerStatus(&mut status) }
            .map_err(|e| SensorError::Platform(e.to_string()))?;

        // 255 means the battery percentage is unknown to the OS.
        if status.BatteryLifePercent == 255 {
            return Ok(PowerReading::unknown());
        }
        Ok(PowerReading {
            percent: Some(status.BatteryLifePercent.min(100)),
            plugged: Some(status.ACLineStatus == 1),
        })
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::{PowerReading, SensorError};
    use std::path::Path;

    /// Reads sysfs directly: `Mains` supplies report the AC line, `Battery`
    /// supplies report capacity.
    pub(super) fn query() -> Result<PowerReading, SensorError> {
        let root = Path::new("/sys/class/power_supply");
        if !root.exists() {
            return Err(SensorError::Unavailable);
        }

        let entries =
            std::fs::read_dir(root).map_err(|e| SensorError::Platform(e.to_string()))?;
        let mut percent = None;
        let mut plugged = None;
        for entry in entries {
            let path = entry
                .map_err(|e| SensorError::Platform(e.to_string()))?
                .path();
            let kind = std::fs::read_to_string(path.join("type")).unwrap_or_default();
            match kind.trim() {
                "Mains" => {
                    if let Ok(online) = std::fs::read_to_string(path.join("online")) {
                        plugged = Some(online.trim() == "1");
                    }
                }
                "Battery" => {
                    if let Some(value) = std::fs::read_to_string(path.join("capacity"))
                        .ok()
                        .and_then(|raw| raw.trim().parse::<u8>().ok())
                    {
                        percent = Some(value.min(100));
                    }
                }
                _ => {}
            }
        }

        if percent.is_none() && plugged.is_none() {
            return Err(SensorError::Unavailable);
        }
        Ok(PowerReading { percent, plugged })
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
mod platform {
    use super::{PowerReading, SensorError};

    pub(super) fn query() -> Result<PowerReading, SensorError> {
        Err(SensorError::Unavailable)
    }
}
