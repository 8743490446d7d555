use std::fs;
use std::io;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::appliers::Subsystem;

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_reload_xresources() -> bool {
    true
}

/// Tool settings (~/.desktheme/settings.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also append log records to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    /// Subsystems to leave alone: "xresources", "kde", "gnome", "gtk", "qt"
    #[serde(default)]
    pub skip_subsystems: Vec<String>,
    /// Run xrdb after all subsystems are applied
    #[serde(default = "default_reload_xresources")]
    pub reload_xresources: bool,
    /// Interpret prefer-dark-theme the same way for GNOME, GTK and Qt
    #[serde(default)]
    pub consistent_dark_preference: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            skip_subsystems: Vec::new(),
            reload_xresources: default_reload_xresources(),
            consistent_dark_preference: false,
        }
    }
}

impl Settings {
    /// Returns the config directory path (~/.desktheme)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".desktheme"))
    }

    /// Returns the config file path (~/.desktheme/settings.json)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Loads settings; a missing file gives defaults silently, a broken one
    /// gives defaults and a warning on stderr (the logger is not up yet).
    pub fn load() -> Self {
        match Self::load_with_error() {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Warning: {}. Using default settings.", e);
                Self::default()
            }
        }
    }

    /// Returns Ok(defaults) when no settings file exists
    pub fn load_with_error() -> Result<Self, String> {
        let Some(config_path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read settings file: {}", e))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content)
            .map_err(|e| format!("Invalid JSON in settings.json: {}", e))
    }

    /// Saves settings to the config file using atomic write pattern
    pub fn save(&self) -> io::Result<PathBuf> {
        let Some(config_dir) = Self::config_dir() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            ));
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
            // Set directory permissions to user-only on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                let _ = fs::set_permissions(&config_dir, perms);
            }
        }

        let config_path = config_dir.join("settings.json");
        let temp_path = config_dir.join("settings.json.tmp");
        let content = serde_json::to_string_pretty(self)?;

        // Atomic write: write to temp file first, then rename
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &config_path)?;

        Ok(config_path)
    }

    /// Parsed `skip_subsystems`; unknown names are logged and ignored
    pub fn skipped_subsystems(&self) -> Vec<Subsystem> {
        self.skip_subsystems
            .iter()
            .filter_map(|name| {
                let parsed = Subsystem::from_key(name);
                if parsed.is_none() {
                    log::warn!("Unknown subsystem in skip_subsystems: {:?}", name);
                }
                parsed
            })
            .collect()
    }
}
