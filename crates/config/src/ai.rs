// AI configuration and secrets management
//
// The Gemini API key is stored using:
// 1. System keychain (preferred)
// 2. NEURALCALC_GEMINI_KEY environment variable (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "neuralcalc";

/// Keychain account name for the Gemini key
const KEYCHAIN_ACCOUNT: &str = "ai/gemini";

/// Environment variable checked when the keychain has no key
pub const ENV_KEY_NAME: &str = "NEURALCALC_GEMINI_KEY";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Get the Gemini API key
///
/// Checks in order:
/// 1. System keychain
/// 2. NEURALCALC_GEMINI_KEY environment variable
pub fn get_api_key() -> KeyLookup {
    // Try keychain first
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    // Fall back to environment variable
    if let Ok(key) = env::var(ENV_KEY_NAME) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store the API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT)
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_key: &str) -> Result<(), String> {
    Err(format!(
        "Keychain support not enabled. Set the {} environment variable instead.",
        ENV_KEY_NAME
    ))
}

/// Delete the API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key() -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT)
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key() -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved AI Configuration (single source of truth)
// ============================================================================

/// The effective AI configuration, fully resolved from all sources.
/// This is the single source of truth for runtime assistant behavior.
#[derive(Debug, Clone)]
pub struct ResolvedAiConfig {
    /// Effective model (resolved from settings or default)
    pub model: String,
    /// Effective API base URL
    pub endpoint: String,
    /// API key (if available)
    pub api_key: Option<String>,
    /// Source of the API key
    pub key_source: KeySource,
    /// Overall status
    pub status: AiConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

/// Status of the AI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiConfigStatus {
    /// Assistant disabled in settings
    Disabled,
    /// Configuration is valid and a key is present
    Ready,
    /// Assistant is enabled but no API key was found
    MissingKey,
}

impl AiConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl ResolvedAiConfig {
    /// Resolve the effective assistant configuration from settings.
    /// This is the single entry point for all AI config resolution.
    pub fn from_settings(settings: &crate::settings::AiSettings) -> Self {
        let model = settings.effective_model().to_string();
        let endpoint = settings.effective_endpoint().to_string();

        if !settings.enabled {
            return Self {
                model,
                endpoint,
                api_key: None,
                key_source: KeySource::None,
                status: AiConfigStatus::Disabled,
                blocking_reason: Some("Assistant is disabled in settings".to_string()),
            };
        }

        let lookup = get_api_key();
        match lookup.key {
            Some(key) => Self {
                model,
                endpoint,
                api_key: Some(key),
                key_source: lookup.source,
                status: AiConfigStatus::Ready,
                blocking_reason: None,
            },
            None => Self {
                model,
                endpoint,
                api_key: None,
                key_source: KeySource::None,
                status: AiConfigStatus::MissingKey,
                blocking_reason: Some(format!(
                    "No API key found. Store one in the keychain or set {}",
                    ENV_KEY_NAME
                )),
            },
        }
    }

    /// Load settings and resolve in one call (convenience method)
    pub fn load() -> Self {
        let settings = crate::settings::Settings::load();
        Self::from_settings(&settings.ai)
    }
}

// ============================================================================
// Diagnostics (for CLI doctor and debugging)
// ============================================================================

/// Diagnostic information about assistant configuration
#[derive(Debug)]
pub struct AiDiagnostics {
    pub model: String,
    pub endpoint: String,
    pub status: AiConfigStatus,
    pub blocking_reason: Option<String>,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
}

impl AiDiagnostics {
    /// Create diagnostics from resolved config
    pub fn from_resolved(config: &ResolvedAiConfig) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            status: config.status,
            blocking_reason: config.blocking_reason.clone(),
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
        }
    }
}

impl std::fmt::Display for AiDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Assistant Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Status:             {}", self.status.as_str())?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocking reason:    {}", reason)?;
        }
        writeln!(f, "Model:              {}", self.model)?;
        writeln!(f, "Endpoint:           {}", self.endpoint)?;
        writeln!(f, "Key present:        {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:         {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available: {}", if self.keychain_available { "yes" } else { "no" })?;

        Ok(())
    }
}
