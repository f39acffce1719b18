use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_CATALOG_PATH: &str = "data.json";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_INSTITUTION: &str = "University of Agriculture, Faisalabad";

/// Application configuration loaded explicitly from environment variables.
///
/// The three credentials are mandatory: the process refuses to start without them.
/// Everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Twilio account identifier for the WhatsApp sender.
    pub twilio_account_sid: String,
    /// Twilio auth token.
    pub twilio_auth_token: String,
    /// Google Generative Language API key.
    pub google_api_key: String,
    /// Path to the JSON program catalog.
    pub catalog_path: String,
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Institution named in the assistant's instructions.
    pub institution: String,
}

impl Config {
    /// Required:
    /// - `TWILIO_ACCOUNT_SID`
    /// - `TWILIO_AUTH_TOKEN`
    /// - `GOOGLE_API_KEY`
    ///
    /// Optional:
    /// - `CATALOG_PATH` (default: "data.json")
    /// - `LISTEN_ADDR` (default: "0.0.0.0:8000")
    /// - `ASSISTANT_INSTITUTION` (default: "University of Agriculture, Faisalabad")
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let twilio_account_sid = required("TWILIO_ACCOUNT_SID");
        let twilio_auth_token = required("TWILIO_AUTH_TOKEN");
        let google_api_key = required("GOOGLE_API_KEY");

        let (Some(twilio_account_sid), Some(twilio_auth_token), Some(google_api_key)) =
            (twilio_account_sid.clone(), twilio_auth_token.clone(), google_api_key.clone())
        else {
            let missing: Vec<&str> = [
                ("TWILIO_ACCOUNT_SID", twilio_account_sid.is_none()),
                ("TWILIO_AUTH_TOKEN", twilio_auth_token.is_none()),
                ("GOOGLE_API_KEY", google_api_key.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let optional = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            twilio_account_sid,
            twilio_auth_token,
            google_api_key,
            catalog_path: optional("CATALOG_PATH", DEFAULT_CATALOG_PATH),
            listen_addr: optional("LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
            institution: optional("ASSISTANT_INSTITUTION", DEFAULT_INSTITUTION),
        })
    }

    pub fn catalog_path(&self) -> PathBuf {
        Path::new(&self.catalog_path).to_path_buf()
    }

    pub fn gemini_configured(&self) -> bool {
        !self.google_api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn loads_required_and_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("GOOGLE_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(config.twilio_account_sid, "AC123");
        assert_eq!(config.twilio_auth_token, "secret");
        assert_eq!(config.catalog_path, "data.json");
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.institution, "University of Agriculture, Faisalabad");
        assert!(config.gemini_configured());
    }

    #[test]
    fn optional_overrides_apply() {
        let config = Config::from_lookup(lookup_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("GOOGLE_API_KEY", "key"),
            ("CATALOG_PATH", "/srv/programs.json"),
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("ASSISTANT_INSTITUTION", "Example University"),
        ]))
        .unwrap();
        assert_eq!(config.catalog_path(), PathBuf::from("/srv/programs.json"));
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.institution, "Example University");
    }

    #[test]
    fn missing_credentials_are_all_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "   "),
        ]))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("TWILIO_AUTH_TOKEN"), "{message}");
        assert!(message.contains("GOOGLE_API_KEY"), "{message}");
        assert!(!message.contains("TWILIO_ACCOUNT_SID"), "{message}");
    }
}
