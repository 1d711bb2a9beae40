//! TOML-based application configuration.
//!
//! Holds the calibration tables and notification preferences. Stored at
//! `~/.config/sunguard/config.toml`; every field has a default so a partial
//! file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::exposure::{ExposureCalibration, SkinExposureModel};
use crate::forecast::{ForecastConfig, ForecastWindowPlanner, PROTECTION_UV_THRESHOLD};
use crate::notify::DecisionConfig;
use crate::sunscreen::{ProtectionDurations, ProtectionTracker};

/// Notification preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether the platform permission has been granted.
    #[serde(default = "default_true")]
    pub permission_granted: bool,
    #[serde(default = "default_true")]
    pub leave_home: bool,
    #[serde(default = "default_true")]
    pub reapply: bool,
    /// UV index at which alerts fire.
    #[serde(default = "default_uv_threshold")]
    pub uv_threshold: f64,
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: u32,
}

fn default_true() -> bool {
    true
}
fn default_uv_threshold() -> f64 {
    PROTECTION_UV_THRESHOLD
}
fn default_ledger_capacity() -> u32 {
    64
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            permission_granted: true,
            leave_home: true,
            reapply: true,
            uv_threshold: default_uv_threshold(),
            ledger_capacity: default_ledger_capacity(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sunguard/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Burn-time calibration tables.
    #[serde(default)]
    pub exposure: ExposureCalibration,
    #[serde(default)]
    pub sunscreen: ProtectionDurations,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving. The new value must
    /// have the same JSON type as the existing one.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// [`Self::apply`] then save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn model(&self) -> SkinExposureModel {
        SkinExposureModel::new(self.exposure.clone())
    }

    pub fn tracker(&self) -> ProtectionTracker {
        ProtectionTracker::new(self.sunscreen.clone())
    }

    pub fn planner(&self) -> ForecastWindowPlanner {
        ForecastWindowPlanner::new(self.model(), self.forecast.clone())
    }

    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            uv_threshold: self.notifications.uv_threshold,
            leave_home_enabled: self.notifications.leave_home,
            reapply_enabled: self.notifications.reapply,
            ledger_capacity: self.notifications.ledger_capacity as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::FitzpatrickType;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[sunscreen]\nactive_multiplier = 0.25\n").unwrap();
        assert_eq!(parsed.sunscreen.active_multiplier, 0.25);
        assert_eq!(parsed.sunscreen.base_duration_min, 120);
        assert_eq!(parsed.forecast.reference_skin_type, FitzpatrickType::II);
        assert!(parsed.notifications.leave_home);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("sunscreen.base_duration_min").as_deref(), Some("120"));
        assert_eq!(cfg.get("notifications.reapply").as_deref(), Some("true"));
        assert_eq!(cfg.get("forecast.reference_skin_type").as_deref(), Some("ii"));
        assert!(cfg.get("sunscreen.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("notifications.leave_home", "false").unwrap();
        cfg.apply("notifications.uv_threshold", "4.5").unwrap();
        cfg.apply("sunscreen.base_duration_min", "90").unwrap();
        assert!(!cfg.decision_config().leave_home_enabled);
        assert_eq!(cfg.decision_config().uv_threshold, 4.5);
        assert_eq!(cfg.sunscreen.base_duration_min, 90);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("notifications.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("notifications.reapply", "sometimes");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert!(cfg.notifications.reapply);
    }

    #[test]
    fn builders_carry_settings() {
        let mut cfg = Config::default();
        cfg.apply("forecast.sample_interval_min", "30").unwrap();
        assert_eq!(cfg.planner().config().sample_interval_min, 30);
        assert_eq!(cfg.tracker().durations().base_duration_min, 120);
        assert_eq!(cfg.decision_config().ledger_capacity, 64);
    }
}
