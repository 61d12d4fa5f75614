use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

use crate::workflow::projector::Locale;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_decide_per_min: u32,

    pub default_page_size: usize,
    pub max_page_size: usize,
    pub role_cache_ttl_secs: u64,
    pub display_locale: Locale,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let display_locale = match lookup("DISPLAY_LOCALE") {
            Some(code) => Locale::from_code(&code)
                .ok_or_else(|| anyhow!("DISPLAY_LOCALE must be th or en, got {code:?}"))?,
            None => Locale::default(),
        };

        let config = Self {
            server_addr: required(&lookup, "SERVER_ADDR")?,
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            rate_protected_per_min: parsed(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            rate_decide_per_min: parsed(&lookup, "RATE_DECIDE_PER_MIN", 60)?,

            default_page_size: parsed(&lookup, "DEFAULT_PAGE_SIZE", 10)?,
            max_page_size: parsed(&lookup, "MAX_PAGE_SIZE", 100)?,
            role_cache_ttl_secs: parsed(&lookup, "ROLE_CACHE_TTL_SECS", 3600)?,
            display_locale,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        if config.default_page_size == 0 || config.max_page_size == 0 {
            return Err(anyhow!("page sizes must be positive"));
        }

        Ok(config)
    }

    /// Page size for a list call, defaulted and capped.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    lookup(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} is not valid ({raw:?}): {e}")),
        None => Ok(default),
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SERVER_ADDR", "0.0.0.0:8080"),
        ("DATABASE_URL", "mysql://root@localhost/hr"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.rate_protected_per_min, 1000);
        assert_eq!(config.rate_decide_per_min, 60);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.display_locale, Locale::Th);
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn missing_required_key_is_named() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn bad_numbers_and_locales_are_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_PAGE_SIZE", "lots"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("MAX_PAGE_SIZE"));

        let mut vars = REQUIRED.to_vec();
        vars.push(("DISPLAY_LOCALE", "fr"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("DEFAULT_PAGE_SIZE", "0"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn page_size_is_capped() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(500)), 100);
        assert_eq!(config.page_size(Some(0)), 1);
    }
}
