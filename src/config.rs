use std::env;
use std::path::PathBuf;

use crate::api::AuthScheme;
use crate::error::AppError;
use crate::i18n::Language;

pub const DEFAULT_API_BASE_URL: &str = "https://nidalb.onrender.com";
pub const DEFAULT_SESSION_FILE: &str = "supnum_vote_session.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub language: Language,
    pub auth_scheme: AuthScheme,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API_BASE_URL must be an http(s) URL, got {}",
                api_base_url
            )));
        }

        let session_file = get("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        let language = match get("UI_LANGUAGE") {
            Some(raw) => raw.parse::<Language>().map_err(AppError::Config)?,
            None => Language::default(),
        };

        let auth_scheme = match get("ADMIN_AUTH_SCHEME") {
            Some(raw) => raw.parse::<AuthScheme>().map_err(AppError::Config)?,
            None => AuthScheme::default(),
        };

        Ok(Self { api_base_url, session_file, language, auth_scheme })
    }
}
