use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "joytest_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixels scrolled per wheel notch
    pub scroll_factor: f32,
    /// Initial rumble strength for the test, 0.0 to 1.0
    pub rumble_strength: f32,
    /// Initial rumble length for the test
    pub rumble_length_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_factor: 20.0,
            rumble_strength: 0.5,
            rumble_length_ms: 1000,
        }
    }
}

impl Settings {
    /// Read settings next to the executable, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::read(&path) {
            Ok(settings) => {
                log::info!("Loaded config from {:?}", path);
                settings
            }
            Err(e) => {
                log::error!("Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&contents)?;
        settings.rumble_strength = settings.rumble_strength.clamp(0.0, 1.0);
        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILENAME)
    }
}
