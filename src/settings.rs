//! Game settings and preferences
//!
//! Persisted separately from game saves. Survival mode stays locked until the
//! campaign boss has been beaten once.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Player preferences, unlocks and dev toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Name submitted with scores
    pub player_name: String,
    /// Last mode picked at the title screen
    pub last_mode: Mode,
    /// Set when the campaign boss goes down
    pub survival_unlocked: bool,

    // === Dev toggles ===
    /// Hitbox overlay
    pub show_hitboxes: bool,
    /// Dev speed multiplier (1.0 = normal)
    pub speed_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Anonymous".to_string(),
            last_mode: Mode::Campaign,
            survival_unlocked: false,
            show_hitboxes: false,
            speed_scale: 1.0,
        }
    }
}

impl Settings {
    /// A mode is playable once unlocked; campaign always is
    pub fn mode_available(&self, mode: Mode) -> bool {
        match mode {
            Mode::Campaign => true,
            Mode::Survival => self.survival_unlocked,
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Settings file unreadable ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file; failures are logged and ignored
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize settings: {e}");
                return;
            }
        };
        match std::fs::write(path, json) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {e}"),
        }
    }
}
