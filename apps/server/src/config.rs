use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use finboard_market_data::FMP_DEFAULT_BASE_URL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Base64 or 32-character JWT secret. A random key is generated when absent.
    pub secret_key: Option<String>,
    pub access_token_ttl: Duration,
    pub fmp_api_key: String,
    pub fmp_base_url: String,
    pub quote_cache_ttl: Duration,
}

impl Config {
    /// Reads `FB_*` variables, loading a `.env` file first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr: SocketAddr = get("FB_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid FB_LISTEN_ADDR")?;
        let cors_allow = get("FB_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = get("FB_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid FB_REQUEST_TIMEOUT_MS")?;
        let token_ttl_secs: u64 = get("FB_ACCESS_TOKEN_TTL_SECS", "86400")
            .parse()
            .context("Invalid FB_ACCESS_TOKEN_TTL_SECS")?;
        if token_ttl_secs == 0 {
            return Err(anyhow!("FB_ACCESS_TOKEN_TTL_SECS must be greater than 0"));
        }
        let quote_ttl_secs: u64 = get("FB_QUOTE_CACHE_TTL_SECS", "60")
            .parse()
            .context("Invalid FB_QUOTE_CACHE_TTL_SECS")?;

        Ok(Self {
            listen_addr,
            db_path: get("FB_DB_PATH", "./db/app.db"),
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            secret_key: lookup("FB_SECRET_KEY").filter(|s| !s.trim().is_empty()),
            access_token_ttl: Duration::from_secs(token_ttl_secs),
            fmp_api_key: get("FB_FMP_API_KEY", ""),
            fmp_base_url: get("FB_FMP_BASE_URL", FMP_DEFAULT_BASE_URL),
            quote_cache_ttl: Duration::from_secs(quote_ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.db_path, "./db/app.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.secret_key.is_none());
        assert_eq!(config.access_token_ttl, Duration::from_secs(86400));
        assert_eq!(config.fmp_base_url, FMP_DEFAULT_BASE_URL);
        assert_eq!(config.quote_cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn cors_origins_split_and_trimmed() {
        let config = config_from(&[(
            "FB_CORS_ALLOW_ORIGINS",
            "http://a.test, http://b.test ,",
        )])
        .unwrap();
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config_from(&[("FB_LISTEN_ADDR", "nowhere")]).is_err());
        assert!(config_from(&[("FB_REQUEST_TIMEOUT_MS", "soon")]).is_err());
        assert!(config_from(&[("FB_ACCESS_TOKEN_TTL_SECS", "0")]).is_err());
    }
}
