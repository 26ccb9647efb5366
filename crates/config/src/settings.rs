// Application settings
// Loaded from ~/.config/neuralcalc/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default Gemini model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// AI-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Whether the assistant panel and `ask` command are enabled
    pub enabled: bool,

    /// Model identifier (empty = DEFAULT_MODEL)
    pub model: String,

    /// API base URL override (empty = DEFAULT_ENDPOINT)
    pub endpoint: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: String::new(),
            endpoint: None,
        }
    }
}

impl AiSettings {
    /// Get the effective model (user-specified or default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.model
        }
    }

    /// Get the effective API base URL
    pub fn effective_endpoint(&self) -> &str {
        match self.endpoint.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_ENDPOINT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default angle unit at startup ("deg" or "rad")
    #[serde(rename = "calculator.angleUnit")]
    pub angle_unit: String,

    /// Maximum history entries kept in memory (0 = unbounded)
    #[serde(rename = "calculator.historyLimit")]
    pub history_limit: usize,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            angle_unit: "deg".to_string(),
            history_limit: 0,
            ai: AiSettings::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neuralcalc");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(path);
            return settings;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        eprintln!("Error parsing settings.json: {}", e);
                        eprintln!("Using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading settings.json: {}", e);
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Save to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Calculator
    // Angle unit at startup: "deg" or "rad"
    "calculator.angleUnit": "deg",
    // History entries kept in memory (0 = unbounded)
    "calculator.historyLimit": 0,

    // AI assistant
    // The API key is stored in the system keychain or the
    // NEURALCALC_GEMINI_KEY environment variable, never in this file
    "ai": {
        "enabled": true,
        "model": "",
        "endpoint": null
    }
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            eprintln!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.angle_unit, "deg");
        assert_eq!(settings.history_limit, 0);
        assert!(settings.ai.enabled);
    }

    #[test]
    fn test_effective_model_falls_back() {
        let mut ai = AiSettings::default();
        assert_eq!(ai.effective_model(), DEFAULT_MODEL);
        ai.model = "gemini-2.5-pro".to_string();
        assert_eq!(ai.effective_model(), "gemini-2.5-pro");
    }

    #[test]
    fn test_effective_endpoint_falls_back() {
        let mut ai = AiSettings::default();
        assert_eq!(ai.effective_endpoint(), DEFAULT_ENDPOINT);
        ai.endpoint = Some(String::new());
        assert_eq!(ai.effective_endpoint(), DEFAULT_ENDPOINT);
        ai.endpoint = Some("http://localhost:9000".to_string());
        assert_eq!(ai.effective_endpoint(), "http://localhost:9000");
    }

    #[test]
    fn test_parse_with_comments() {
        let raw = r#"{
    // comment line
    "calculator.angleUnit": "rad",
    "ai": { "enabled": false, "model": "m", "endpoint": null }
}"#;
        let cleaned: String = raw
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        let settings: Settings = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(settings.angle_unit, "rad");
        assert!(!settings.ai.enabled);
        assert_eq!(settings.ai.model, "m");
    }

    #[test]
    fn test_unknown_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.angle_unit, "deg");
        assert!(settings.ai.enabled);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.angle_unit = "rad".to_string();
        settings.history_limit = 25;
        settings.ai.model = "gemini-2.5-pro".to_string();
        settings.save_to(&path).unwrap();

        // The dotted rename keys must survive serialization
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"calculator.angleUnit\""));
        assert!(raw.contains("\"calculator.historyLimit\""));

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.angle_unit, "rad");
        assert_eq!(loaded.history_limit, 25);
        assert_eq!(loaded.ai.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_load_from_missing_path_writes_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings::load_from(&path);
        assert_eq!(settings.angle_unit, "deg");

        // The generated file carries comments and still reloads cleanly
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.lines().any(|line| line.trim().starts_with("//")));
        let reloaded = Settings::load_from(&path);
        assert_eq!(reloaded.angle_unit, "deg");
        assert_eq!(reloaded.history_limit, 0);
        assert!(reloaded.ai.enabled);
    }
}
