//! Configuration types.
//!
//! Everything is read from the process environment once at startup. A `.env`
//! file in the working directory is honored but never overrides variables
//! that are already exported.

use std::net::SocketAddr;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_WORKSPACE_DIR: &str = "./workspace";
pub const DEFAULT_UI_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Google key variables, checked in this order.
pub const GOOGLE_KEY_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY", "GOOGLE_GENAI_API_KEY"];

/// Credentials and model selection for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// `None` when no key variable is set. Resolving an agent for this
    /// provider then fails with a configuration error.
    pub api_key: Option<SecretString>,
    pub model: String,
    /// Alternate API base URL (OpenAI-compatible gateways).
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Workspace root as configured. Canonicalized by the workspace store.
    pub workspace_dir: PathBuf,
    /// Only origin allowed to make cross-origin requests.
    pub ui_origin: String,
    pub bind: SocketAddr,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl AppConfig {
    /// Load `.env` (if present) and read the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = var("MD_ASSIST_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "MD_ASSIST_BIND".to_string(),
                message: format!("'{}' is not a socket address: {}", bind_raw, e),
            })?;

        let mut openai = ProviderSettings::new(
            var("OPENAI_API_KEY").map(SecretString::from),
            var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        );
        if let Some(base_url) = var("OPENAI_BASE_URL") {
            openai = openai.with_base_url(base_url);
        }

        let google_key = GOOGLE_KEY_VARS.iter().copied().find_map(var);
        let gemini_model = var("GOOGLE_ADK_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini = ProviderSettings::new(
            google_key.map(SecretString::from),
            gemini_model
                .strip_prefix("models/")
                .unwrap_or(&gemini_model),
        );

        Ok(Self {
            workspace_dir: PathBuf::from(
                var("WORKSPACE_DIR").unwrap_or_else(|| DEFAULT_WORKSPACE_DIR.to_string()),
            ),
            ui_origin: var("UI_ORIGIN").unwrap_or_else(|| DEFAULT_UI_ORIGIN.to_string()),
            bind,
            openai,
            gemini,
        })
    }
}
