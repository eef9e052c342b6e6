//! Tunables for the portal, the gesture glue and the MQTT feed
//!
//! Everything is plain serde data with defaults, so a config file only needs
//! the keys it wants to change.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::Result;

/// Particle burst fired when the portal opens or closes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    /// Number of emission points
    pub emit_points: usize,
    /// Embers emitted at each point
    pub embers_per_point: usize,
    /// Upper bound of the ember speed range
    pub spread: f32,
    /// Emission points are jittered by up to this many pixels per axis
    pub position_jitter: i32,
    /// Spores spawned around the center
    pub spores: usize,
    /// Spores land within `spore_extent * radius` of the center per axis
    pub spore_extent: f32,
}

impl BurstConfig {
    /// Gentle inward burst fired on open
    pub fn opening() -> Self {
        Self {
            emit_points: 60,
            embers_per_point: 6,
            spread: 60.0,
            position_jitter: 10,
            spores: 100,
            spore_extent: 0.5,
        }
    }

    /// Heavy shockwave fired on close
    pub fn closing() -> Self {
        Self {
            emit_points: 80,
            embers_per_point: 8,
            spread: 200.0,
            position_jitter: 0,
            spores: 120,
            spore_extent: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub max_particles: usize,
    pub max_spores: usize,
    /// Base radius is `min(width, height) / radius_divisor`
    pub radius_divisor: u32,
    pub open_burst: BurstConfig,
    pub close_burst: BurstConfig,
    /// `open_amount` per second while opening
    pub opening_rate: f32,
    /// `open_amount` per second while closing
    pub closing_rate: f32,
    /// Twist multiplier per reference tick
    pub twist_decay: f32,
    /// Tick rate `twist_decay` is expressed at
    pub reference_fps: f32,
    /// Lightning only appears above this `open_amount`
    pub lightning_threshold: f32,
    pub lightning_segments: usize,
    pub displacement_seed: u64,
    pub glow_kernel: usize,
    pub scanline_alpha: f32,
    /// Barrel bow of the CRT pass; 0 leaves the geometry untouched
    pub crt_curvature: f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            max_particles: 800,
            max_spores: 400,
            radius_divisor: 6,
            open_burst: BurstConfig::opening(),
            close_burst: BurstConfig::closing(),
            opening_rate: 1.2,
            closing_rate: 1.8,
            twist_decay: 0.92,
            reference_fps: 30.0,
            lightning_threshold: 0.03,
            lightning_segments: 6,
            displacement_seed: 0,
            glow_kernel: 51,
            scanline_alpha: 0.06,
            crt_curvature: 0.0,
        }
    }
}

/// Thresholds used to turn gesture signals into portal commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Normalized two-hand spread that opens the portal
    pub open_distance: f32,
    /// Minimum |rotation| (radians) that counts as a twist
    pub twist_threshold: f32,
    pub twist_gain: f32,
    /// Seconds without hands before the effect switches off
    pub hand_absence_timeout: f32,
    /// Seconds between automatic open/close toggles in demo mode
    pub demo_interval: f32,
    pub upside_down_radius_divisor: u32,
    pub normal_radius_divisor: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            open_distance: 0.25,
            twist_threshold: 0.05,
            twist_gain: 0.8,
            hand_absence_timeout: 1.5,
            demo_interval: 3.0,
            upside_down_radius_divisor: 5,
            normal_radius_divisor: 6,
        }
    }
}

/// Broker the gesture feed subscribes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            topic: "riftgate/gestures".to_string(),
        }
    }
}

/// Top-level application config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub control: ControlConfig,
    pub mqtt: Option<MqttConfig>,
}

impl AppConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load config, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("riftgate-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"portal": {"max_particles": 100}}"#).unwrap();
        assert_eq!(config.portal.max_particles, 100);
        assert_eq!(config.portal.max_spores, 400);
        assert_eq!(config.portal.open_burst, BurstConfig::opening());
        assert_eq!(config.control, ControlConfig::default());
        assert!(config.mqtt.is_none());
        assert_eq!(config.portal.crt_curvature, 0.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let mut config = AppConfig::default();
        config.control.twist_gain = 1.5;
        config.mqtt = Some(MqttConfig::default());
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors() {
        let missing = AppConfig::load(temp_path("does-not-exist"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let path = temp_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let invalid = AppConfig::load(&path);
        assert!(matches!(invalid, Err(Error::Json(_))));
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
        let _ = fs::remove_file(&path);
    }
}
