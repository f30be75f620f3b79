//! Layered configuration for the reactor PLC, supervisor, and coordinator
//! binaries (§7.4).
//!
//! Precedence, lowest to highest: built-in [`Default`], `~/.config/scada/config.toml`,
//! project `scada.toml`, local `scada.local.toml` (gitignored), `SCADA_*`
//! environment variables. Trip thresholds and watchdog timeouts are
//! configurable here; PID gains and the burn-rate ramp fraction are not —
//! the spec calls those tunable constants, not user-visible configuration.

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

use serde::{Deserialize, Serialize};

/// Root configuration shared across all three node roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScadaConfig {
    pub reactor: ReactorConfig,
    pub supervisor: SupervisorConfig,
    pub coordinator: CoordinatorConfig,
    pub timeouts: TimeoutsConfig,
    pub thresholds: ThresholdsConfig,
}

/// Reactor-PLC role configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    /// Local (listen_channel) UDP address this PLC binds.
    pub bind_addr: String,
    /// Supervisor's (reply_channel) UDP address.
    pub supervisor_addr: String,
    pub unit_id: u32,
    pub lim_br10: u32,
    pub blade_count: u32,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:7100".to_string(),
            supervisor_addr: "127.0.0.1:7000".to_string(),
            unit_id: 1,
            lim_br10: 1000,
            blade_count: 8,
        }
    }
}

/// Supervisor role configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub bind_addr: String,
    pub session_queue_capacity: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:7000".to_string(), session_queue_capacity: 256 }
    }
}

/// Coordinator CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub supervisor_addr: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { supervisor_addr: "127.0.0.1:7000".to_string() }
    }
}

/// Tick period, watchdog timeouts, and status cadence (§4.2, §5.1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub tick_period_ms: u64,
    pub plc_watchdog_s: f64,
    pub supervisor_watchdog_s: f64,
    /// Full telemetry packet every N ticks (§4.2: "every 4 ticks").
    pub status_cadence_ticks: u32,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 50,
            plc_watchdog_s: 3.0,
            supervisor_watchdog_s: 5.0,
            status_cadence_ticks: 4,
        }
    }
}

/// RPS trip thresholds (§4.1 defaults).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub high_temp_k: f64,
    pub low_coolant_fraction: f64,
    pub high_waste_fraction: f64,
    pub high_heated_coolant_fraction: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high_temp_k: 1200.0,
            low_coolant_fraction: 0.10,
            high_waste_fraction: 0.80,
            high_heated_coolant_fraction: 0.80,
        }
    }
}

impl ScadaConfig {
    pub fn load() -> anyhow::Result<Self> {
        ConfigLoader::new().load()
    }

    pub fn load_from_dir(project_dir: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_thresholds() {
        let config = ScadaConfig::default();
        assert_eq!(config.thresholds.high_temp_k, 1200.0);
        assert_eq!(config.thresholds.low_coolant_fraction, 0.10);
        assert_eq!(config.timeouts.plc_watchdog_s, 3.0);
        assert_eq!(config.timeouts.status_cadence_ticks, 4);
    }
}
